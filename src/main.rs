use clap::Parser;
use sharpefolio::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
