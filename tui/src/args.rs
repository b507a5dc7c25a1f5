//! Parsing command-line arguments.

use clap::{
    command,
    error::{ErrorKind, Result as ClapResult},
    value_parser, Arg, Error,
};
use lifeblocks_lib::{Config, Memento, Point, TickRate, Universe};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::{
    fs,
    path::{Path, PathBuf},
};

fn positive(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) => Err(String::from("must be a positive integer")),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

fn density(s: &str) -> Result<f64, String> {
    let density = s.parse::<f64>().map_err(|e| e.to_string())?;
    if (0.0..=1.0).contains(&density) {
        Ok(density)
    } else {
        Err(String::from("density must be between 0 and 1"))
    }
}

/// Moves a pattern to the middle of a `width` × `width` board.
///
/// Returns `None` if the pattern is too large to be moved without
/// overflowing.
fn centered(memento: Memento, width: i32) -> Option<Memento> {
    let (min, max) = match memento.bounds() {
        Some(bounds) => bounds,
        None => return Some(memento),
    };
    let offset = |min: i32, max: i32| {
        let span = max.checked_sub(min)?.checked_add(1)?;
        (width.checked_sub(span)? / 2).checked_sub(min)
    };
    memento.checked_translate(offset(min.x, max.x)?, offset(min.y, max.y)?)
}

/// Reads a pattern file: RLE if the extension says so, a saved board
/// otherwise.
fn read_pattern(path: &Path) -> Result<Memento, lifeblocks_lib::Error> {
    let is_rle = path
        .extension()
        .map_or(false, |extension| extension.eq_ignore_ascii_case("rle"));
    if is_rle {
        Memento::from_rle(&fs::read_to_string(path)?)
    } else {
        Memento::read_from(fs::File::open(path)?)
    }
}

/// A random soup filling the whole board.
fn soup(width: i32, density: f64, seed: Option<u64>) -> Memento {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    (0..width)
        .flat_map(|y| (0..width).map(move |x| Point::new(x, y)))
        .filter(|_| rng.gen_bool(density))
        .collect()
}

/// A struct to store the parse results.
pub(crate) struct Args {
    pub(crate) universe: Universe,
    pub(crate) generations: Option<u64>,
    pub(crate) output: Option<PathBuf>,
    #[cfg(feature = "tui")]
    pub(crate) no_tui: bool,
}

impl Args {
    /// Parses the command-line arguments, and sets up the universe.
    pub(crate) fn parse() -> ClapResult<Self> {
        #[allow(unused_mut)]
        let mut app = command!()
            .long_about(
                "Conway's Game of Life on a finite board with hard edges\n\
                 \n\
                 The board is a tree of square blocks. It is GRID_SIZE^DEPTH \
                 cells wide.\n\
                 \n\
                 The board is displayed in Plaintext format.\n\
                 * Dead cells are represented by `.`;\n\
                 * Living cells are represented by `o`.\n",
            )
            .arg(
                Arg::new("PATTERN")
                    .help("Pattern to start with")
                    .long_help(
                        "Pattern to start with\n\
                         Either an RLE file (with the extension `.rle`), or a board saved \
                         by this program. The pattern is moved to the middle of the board.\n",
                    )
                    .index(1)
                    .value_parser(value_parser!(PathBuf)),
            )
            .arg(
                Arg::new("CONFIG")
                    .help("TOML file to read the configuration from")
                    .long_help(
                        "TOML file to read the configuration from\n\
                         Keys: grid_size, depth, history_limit, tick_rate. \
                         Options given on the command line take precedence.\n",
                    )
                    .short('c')
                    .long("config")
                    .value_parser(value_parser!(PathBuf)),
            )
            .arg(
                Arg::new("GRIDSIZE")
                    .help("Number of rows and columns in every block [default: 8]")
                    .short('g')
                    .long("grid-size")
                    .value_parser(positive),
            )
            .arg(
                Arg::new("DEPTH")
                    .help("Number of levels of blocks [default: 2]")
                    .short('d')
                    .long("depth")
                    .value_parser(positive),
            )
            .arg(
                Arg::new("HISTORY")
                    .help("Number of generations that can be undone [default: 1024]")
                    .long_help(
                        "Number of generations that can be undone [default: 1024]\n\
                         If this value is set to 0, the whole history is kept.\n",
                    )
                    .long("history")
                    .value_parser(value_parser!(usize)),
            )
            .arg(
                Arg::new("RATE")
                    .help("How fast the board runs [default: medium]")
                    .short('r')
                    .long("rate")
                    .value_parser(["halt", "agonizing", "slow", "medium", "fast"]),
            )
            .arg(
                Arg::new("RANDOM")
                    .help("Fills the board with a random soup of the given density")
                    .long("random")
                    .value_parser(density),
            )
            .arg(
                Arg::new("SEED")
                    .help("Seed of the random soup")
                    .long("seed")
                    .requires("RANDOM")
                    .value_parser(value_parser!(u64)),
            )
            .arg(
                Arg::new("GENERATIONS")
                    .help("Runs this many generations, prints the board, and quits")
                    .short('n')
                    .long("generations")
                    .value_parser(value_parser!(u64)),
            )
            .arg(
                Arg::new("OUTPUT")
                    .help("Where to save the board")
                    .long_help(
                        "Where to save the board\n\
                         Without the TUI, the board is saved after the last generation.\n\
                         In the TUI, the board is saved when [s] is pressed \
                         (to `lifeblocks.json` if not given).\n",
                    )
                    .short('o')
                    .long("output")
                    .value_parser(value_parser!(PathBuf)),
            );

        #[cfg(feature = "tui")]
        {
            app = app.arg(
                Arg::new("NOTUI")
                    .help("Runs without entering the TUI")
                    .long("no-tui")
                    .action(clap::ArgAction::SetTrue),
            );
        }

        let matches = app.try_get_matches()?;

        let mut config = match matches.get_one::<PathBuf>("CONFIG") {
            Some(path) => {
                let text = fs::read_to_string(path).map_err(|e| {
                    Error::raw(
                        ErrorKind::Io,
                        format!("cannot read {}: {}\n", path.display(), e),
                    )
                })?;
                toml::from_str::<Config>(&text).map_err(|e| {
                    Error::raw(
                        ErrorKind::InvalidValue,
                        format!("invalid configuration in {}: {}\n", path.display(), e),
                    )
                })?
            }
            None => Config::default(),
        };

        if let Some(&grid_size) = matches.get_one::<usize>("GRIDSIZE") {
            config = config.set_grid_size(grid_size);
        }
        if let Some(&depth) = matches.get_one::<usize>("DEPTH") {
            config = config.set_depth(depth);
        }
        if let Some(&history_limit) = matches.get_one::<usize>("HISTORY") {
            config = config.set_history_limit(match history_limit {
                0 => None,
                i => Some(i),
            });
        }
        if let Some(rate) = matches.get_one::<String>("RATE") {
            let rate = rate
                .parse::<TickRate>()
                .map_err(|e| Error::raw(ErrorKind::InvalidValue, format!("{}\n", e)))?;
            config = config.set_tick_rate(rate);
        }

        let mut universe = config
            .universe()
            .map_err(|e| Error::raw(ErrorKind::InvalidValue, format!("{}\n", e)))?;
        let width = universe.width_in_cells();

        if let Some(path) = matches.get_one::<PathBuf>("PATTERN") {
            let memento = read_pattern(path).map_err(|e| {
                Error::raw(
                    ErrorKind::Io,
                    format!("cannot load {}: {}\n", path.display(), e),
                )
            })?;
            let memento = centered(memento, width).ok_or_else(|| {
                Error::raw(
                    ErrorKind::InvalidValue,
                    format!("the pattern in {} is too large\n", path.display()),
                )
            })?;
            if memento.iter().any(|point| point.x < 0 || point.y < 0) {
                log::warn!("The pattern does not fit on a {0}×{0} board", width);
            }
            universe
                .restore(memento)
                .map_err(|e| Error::raw(ErrorKind::Io, format!("{}\n", e)))?;
        }

        if let Some(&density) = matches.get_one::<f64>("RANDOM") {
            let seed = matches.get_one::<u64>("SEED").copied();
            universe
                .merge(soup(width, density, seed))
                .map_err(|e| Error::raw(ErrorKind::Io, format!("{}\n", e)))?;
        }

        let generations = matches.get_one::<u64>("GENERATIONS").copied();
        let output = matches.get_one::<PathBuf>("OUTPUT").cloned();

        #[cfg(feature = "tui")]
        let no_tui = matches.get_flag("NOTUI") || generations.is_some();

        Ok(Args {
            universe,
            generations,
            output,
            #[cfg(feature = "tui")]
            no_tui,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centering() {
        let blinker: Memento = [(10, 3), (11, 3), (12, 3)]
            .iter()
            .map(|&point| Point::from(point))
            .collect();
        assert_eq!(
            centered(blinker.clone(), 9),
            Some(blinker.translate(-7, 1))
        );
        assert_eq!(centered(Memento::new(), 9), Some(Memento::new()));

        let wide = blinker.translate(0, 2);
        assert_eq!(centered(wide.clone(), 1), Some(wide.translate(-11, -5)));
    }

    #[test]
    fn centering_far_apart_cells() {
        let far: Memento = [(i32::MIN, 0), (i32::MAX, 0)]
            .iter()
            .map(|&point| Point::from(point))
            .collect();
        assert_eq!(centered(far, 64), None);

        let far: Memento = [(0, i32::MIN), (0, 0)]
            .iter()
            .map(|&point| Point::from(point))
            .collect();
        assert_eq!(centered(far, 64), None);
    }

    #[test]
    fn values() {
        assert_eq!(positive("3"), Ok(3));
        assert!(positive("0").is_err());
        assert!(positive("-1").is_err());
        assert_eq!(density("0.5"), Ok(0.5));
        assert!(density("1.5").is_err());
    }
}
