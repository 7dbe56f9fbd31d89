//! Domain error types.
//!
//! Insufficient cash or position are not errors anywhere in backsim: a
//! simulation that cannot afford a trade simply records no trade. Error
//! variants exist only for malformed input and broken configuration.

/// Top-level error type for backsim.
#[derive(Debug, thiserror::Error)]
pub enum BacksimError {
    #[error("invalid order: {reason}")]
    InvalidOrder { reason: String },

    #[error("unknown indicator '{name}'")]
    UnknownIndicator { name: String },

    #[error("malformed input: {reason}")]
    MalformedInput { reason: String },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&BacksimError> for std::process::ExitCode {
    fn from(err: &BacksimError) -> Self {
        let code: u8 = match err {
            BacksimError::Io(_) => 1,
            BacksimError::ConfigParse { .. }
            | BacksimError::ConfigMissing { .. }
            | BacksimError::ConfigInvalid { .. } => 2,
            BacksimError::Data { .. } | BacksimError::MalformedInput { .. } => 3,
            BacksimError::InvalidOrder { .. } => 4,
            BacksimError::UnknownIndicator { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
