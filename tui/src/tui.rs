//! The TUI.

use crate::args::Args;
use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseButton,
        MouseEvent, MouseEventKind,
    },
    execute, queue,
    style::{Attribute, Print, SetAttribute},
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use lifeblocks_lib::{BoardView, Change, Clock, Error, Point, TickRate, Universe};
use std::{
    fs::File,
    io::{self, BufReader, BufWriter, Stdout, Write},
    path::PathBuf,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex, MutexGuard, PoisonError,
    },
    time::Duration,
};

/// How long to wait for a key before drawing the next frame.
const FRAME: Duration = Duration::from_millis(15);

/// The terminal in raw mode, on the alternate screen.
///
/// Dropping it puts the terminal back, however the TUI quits.
struct Screen {
    stdout: Stdout,
}

impl Screen {
    fn enter() -> io::Result<Self> {
        let mut stdout = io::stdout();
        terminal::enable_raw_mode()?;
        execute!(
            stdout,
            EnterAlternateScreen,
            EnableMouseCapture,
            cursor::Hide
        )?;
        Ok(Screen { stdout })
    }
}

impl Drop for Screen {
    fn drop(&mut self) {
        let _ = execute!(
            self.stdout,
            cursor::Show,
            DisableMouseCapture,
            LeaveAlternateScreen
        );
        let _ = terminal::disable_raw_mode();
    }
}

struct App {
    universe: Arc<Mutex<Universe>>,
    view: BoardView,
    clock: Clock,
    /// Set by the universe whenever the board changes.
    dirty: Arc<AtomicBool>,
    output: PathBuf,
    message: Option<String>,
}

impl App {
    fn new(args: Args) -> Result<Self, Error> {
        let mut universe = args.universe;
        let dirty = Arc::new(AtomicBool::new(true));
        universe.attach({
            let dirty = Arc::clone(&dirty);
            move |_: &Change| dirty.store(true, Ordering::Relaxed)
        });
        let view = universe.view();
        let rate = universe.config().tick_rate;
        let universe = Arc::new(Mutex::new(universe));
        let clock = Clock::for_universe(Arc::clone(&universe), rate)?;
        Ok(App {
            universe,
            view,
            clock,
            dirty,
            output: args
                .output
                .unwrap_or_else(|| PathBuf::from("lifeblocks.json")),
            message: None,
        })
    }

    fn universe(&self) -> MutexGuard<'_, Universe> {
        self.universe.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn save(&self) -> Result<(), Error> {
        let file = BufWriter::new(File::create(&self.output)?);
        self.universe().save(file)
    }

    /// Loads the saved board, replacing the current one, or on top of it.
    fn load(&self, merged: bool) -> Result<(), Error> {
        let file = BufReader::new(File::open(&self.output)?);
        let mut universe = self.universe();
        if merged {
            universe.merge_load(file)
        } else {
            universe.load(file)
        }
    }

    /// Flips the cell under the mouse. The board starts on the second row
    /// of the terminal.
    fn click(&mut self, column: u16, row: u16) {
        let point = match row.checked_sub(1) {
            Some(y) => Point::new(i32::from(column), i32::from(y)),
            None => return,
        };
        if self.universe().toggle(point).is_ok() {
            self.message = None;
            self.dirty.store(true, Ordering::Relaxed);
        }
    }

    /// Handles a key. Returns `false` when it is time to quit.
    fn key(&mut self, code: KeyCode) -> bool {
        self.message = None;
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return false,
            KeyCode::Char(' ') | KeyCode::Enter => {
                if self.clock.is_running() {
                    self.clock.halt();
                } else {
                    self.clock.resume();
                }
            }
            KeyCode::Char('n') => {
                self.clock.halt();
                self.clock.single_step();
            }
            KeyCode::Char('1') => self.clock.set_tick_rate(TickRate::Agonizing),
            KeyCode::Char('2') => self.clock.set_tick_rate(TickRate::Slow),
            KeyCode::Char('3') => self.clock.set_tick_rate(TickRate::Medium),
            KeyCode::Char('4') => self.clock.set_tick_rate(TickRate::Fast),
            KeyCode::Char('u') => {
                self.clock.halt();
                if !self.universe().undo() {
                    self.message = Some(String::from("Nothing to undo."));
                }
            }
            KeyCode::Char('c') => {
                self.clock.halt();
                self.universe().clear();
            }
            KeyCode::Char('s') => {
                self.message = Some(match self.save() {
                    Ok(()) => format!("Saved to {}.", self.output.display()),
                    Err(e) => format!("Cannot save to {}: {}", self.output.display(), e),
                });
            }
            KeyCode::Char(c @ ('l' | 'm')) => {
                self.clock.halt();
                self.message = Some(match self.load(c == 'm') {
                    Ok(()) => format!("Loaded {}.", self.output.display()),
                    Err(e) => format!("Cannot load {}: {}", self.output.display(), e),
                });
            }
            _ => return true,
        }
        self.dirty.store(true, Ordering::Relaxed);
        true
    }

    fn draw(&self, stdout: &mut Stdout) -> Result<(), Error> {
        if !self.dirty.swap(false, Ordering::Relaxed) {
            return Ok(());
        }
        let (columns, rows) = terminal::size()?;
        let height = i32::from(rows.saturating_sub(2));
        let width = i32::from(columns);

        let frame = self.view.try_read(|board| {
            let size = board.width_in_cells();
            let lines = (0..size.min(height))
                .map(|y| {
                    (0..size.min(width))
                        .map(|x| match board.is_alive_at(Point::new(x, y)) {
                            Some(true) => 'o',
                            _ => '.',
                        })
                        .collect::<String>()
                })
                .collect::<Vec<_>>();
            (lines, self.view.generation(), board.population())
        });
        let (lines, generation, population) = match frame {
            Some(frame) => frame,
            None => {
                // A generation is being committed; draw it next frame.
                self.dirty.store(true, Ordering::Relaxed);
                return Ok(());
            }
        };

        let top = format!("Gen: {}  Cells: {}", generation, population);
        let bottom = match &self.message {
            Some(message) => message.clone(),
            None if self.clock.is_running() => format!(
                "Running ({}). [space] pause  [1-4] speed  [q] quit",
                self.clock.tick_rate()
            ),
            None => String::from(
                "Paused. [space] resume  [n] step  [u] undo  [c] clear  [s] save  \
                 [l] load  [m] merge  [click] toggle  [q] quit",
            ),
        };

        let columns = usize::from(columns);
        queue!(
            stdout,
            Clear(ClearType::All),
            cursor::MoveTo(0, 0),
            SetAttribute(Attribute::Reverse),
            Print(format!("{:<1$}", top, columns)),
            SetAttribute(Attribute::Reset),
        )?;
        for (y, line) in lines.iter().enumerate() {
            queue!(stdout, cursor::MoveTo(0, y as u16 + 1), Print(line))?;
        }
        queue!(
            stdout,
            cursor::MoveTo(0, rows.saturating_sub(1)),
            SetAttribute(Attribute::Reverse),
            Print(format!("{:<1$}", bottom, columns)),
            SetAttribute(Attribute::Reset),
        )?;
        stdout.flush()?;
        Ok(())
    }
}

/// Runs the board in the TUI until [q] is pressed, then prints it.
pub(crate) fn run(args: Args) -> Result<(), Error> {
    let mut app = App::new(args)?;
    {
        let mut screen = Screen::enter()?;
        loop {
            if event::poll(FRAME)? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        if !app.key(key.code) {
                            break;
                        }
                    }
                    Event::Mouse(MouseEvent {
                        kind: MouseEventKind::Down(MouseButton::Left),
                        column,
                        row,
                        ..
                    }) => app.click(column, row),
                    Event::Resize(_, _) => app.dirty.store(true, Ordering::Relaxed),
                    _ => (),
                }
            }
            app.draw(&mut screen.stdout)?;
        }
    }
    app.clock.halt();
    let universe = app.universe();
    print!("{}", universe.plaintext());
    println!(
        "Gen: {}  Cells: {}",
        universe.generation(),
        universe.population()
    );
    Ok(())
}
