mod args;
mod cli;
#[cfg(feature = "tui")]
mod tui;

use args::Args;
use std::process;

fn main() {
    env_logger::init();
    let args = Args::parse().unwrap_or_else(|e| e.exit());

    #[cfg(feature = "tui")]
    let result = if args.no_tui {
        cli::run(args)
    } else {
        tui::run(args)
    };

    #[cfg(not(feature = "tui"))]
    let result = cli::run(args);

    if let Err(error) = result {
        eprintln!("Error: {}", error);
        process::exit(1);
    }
}
