//! Price data access port trait.

use crate::domain::bar::PriceSeries;
use crate::domain::error::BacksimError;

/// Supplies the ordered, gap-free series the engine consumes. Adapters own
/// sorting and gap-filling; the returned series has already passed
/// [`PriceSeries::new`] validation.
pub trait DataPort {
    fn fetch(&self) -> Result<PriceSeries, BacksimError>;
}
