mod cli;
mod error;
mod facts;
mod formatter;
mod output;
mod providers;

use cli::Cli;
use output::{exit_code, print_error};
use providers::collect_and_print;
use tracing::{debug, Level};
use tracing_subscriber::EnvFilter;

/// Logs go to stderr so they never mix with the printed facts.
/// `FACTER_LOG` overrides the level chosen by `-v`.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let filter = EnvFilter::try_from_env("FACTER_LOG")
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let config = Cli::parse_args().config();
    init_logging(config.verbosity);
    debug!(?config, "Starting fact collection");

    match collect_and_print(&config) {
        Ok(report) => {
            let failed = report.failed();
            if !failed.is_empty() {
                debug!(?failed, "Some providers did not report facts");
            }
        }
        Err(e) => {
            print_error(&e.to_string());
            std::process::exit(exit_code(&e));
        }
    }
}
