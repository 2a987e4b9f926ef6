use protochain::cli;
use std::process;

fn main() {
    cli::init_logging();
    if let Err(code) = cli::run_main() {
        process::exit(code);
    }
}
