//! Running without the TUI.

use crate::args::Args;
use lifeblocks_lib::Error;
use std::{fs::File, io::BufWriter};

/// Runs the given number of generations, prints the board, and saves it if
/// asked to.
pub(crate) fn run(args: Args) -> Result<(), Error> {
    let mut universe = args.universe;
    for _ in 0..args.generations.unwrap_or(0) {
        universe.tick();
    }

    print!("{}", universe.plaintext());
    println!(
        "Gen: {}  Cells: {}",
        universe.generation(),
        universe.population()
    );

    if let Some(path) = args.output {
        universe.save(BufWriter::new(File::create(&path)?))?;
        println!("Saved to {}", path.display());
    }
    Ok(())
}
