use pagesnap::cli::Cli;
use pagesnap::logging;

fn main() {
    // Initialize logging as early as possible.
    logging::init();

    // Parse CLI and run the pipeline.
    if let Err(err) = Cli::run_from_args() {
        eprintln!("pagesnap error: {:#}", err);
        std::process::exit(1);
    }
}
