use clap::Parser;
use backsim::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
