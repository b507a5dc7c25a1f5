use lifeblocks_lib::{Change, Config, Error as LifeError, Memento, Point, Storable, TickRate};
use std::{
    error::Error,
    panic::{self, AssertUnwindSafe},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
    thread,
    time::Duration,
};

fn glider() -> Memento {
    [(1, 0), (2, 1), (0, 2), (1, 2), (2, 2)]
        .iter()
        .map(|&point| Point::from(point))
        .collect()
}

#[test]
fn default_config() -> Result<(), Box<dyn Error>> {
    let config = Config::default();
    assert_eq!(config.grid_size, 8);
    assert_eq!(config.depth, 2);
    assert_eq!(config.history_limit, Some(1024));
    assert_eq!(config.tick_rate, TickRate::Medium);

    let universe = config.universe()?;
    assert_eq!(universe.width_in_cells(), 64);
    assert_eq!(universe.population(), 0);
    assert_eq!(universe.generation(), 0);
    assert_eq!(universe.history_len(), 1);
    Ok(())
}

#[test]
fn config_from_json() -> Result<(), Box<dyn Error>> {
    let config: Config = serde_json::from_str(r#"{"grid_size": 4, "tick_rate": "Fast"}"#)?;
    assert_eq!(
        config,
        Config::default()
            .set_grid_size(4)
            .set_tick_rate(TickRate::Fast)
    );
    Ok(())
}

#[test]
fn invalid_config() {
    assert!(matches!(
        Config::new(1, 2).universe(),
        Err(LifeError::GridSizeError(1))
    ));
    assert!(matches!(
        Config::new(4, 0).universe(),
        Err(LifeError::DepthError)
    ));
    assert!(matches!(
        Config::new(1 << 16, 2).universe(),
        Err(LifeError::BoardTooLarge(65536, 2))
    ));
    assert!(matches!(
        Config::new(2, 64).universe(),
        Err(LifeError::BoardTooLarge(2, 64))
    ));
}

#[test]
fn toggle() -> Result<(), Box<dyn Error>> {
    let mut universe = Config::new(4, 2).universe()?;
    assert!(universe.toggle(Point::new(15, 0))?);
    assert!(universe.is_alive(Point::new(15, 0))?);
    assert_eq!(universe.population(), 1);
    assert!(!universe.toggle(Point::new(15, 0))?);
    assert_eq!(universe.population(), 0);

    assert!(matches!(
        universe.toggle(Point::new(16, 0)),
        Err(LifeError::OutOfBoard(Point { x: 16, y: 0 }))
    ));
    assert!(matches!(
        universe.is_alive(Point::new(0, -1)),
        Err(LifeError::OutOfBoard(_))
    ));
    Ok(())
}

#[test]
fn toggled_cells_evolve() -> Result<(), Box<dyn Error>> {
    let mut universe = Config::new(4, 2).universe()?;
    for x in 3..6 {
        universe.toggle(Point::new(x, 4))?;
    }
    assert!(universe.tick());
    for y in 3..6 {
        assert!(universe.is_alive(Point::new(4, y))?);
    }
    assert_eq!(universe.population(), 3);
    Ok(())
}

#[test]
fn memento_round_trip() -> Result<(), Box<dyn Error>> {
    let mut universe = Config::new(4, 2).universe()?;
    universe.restore(glider().translate(3, 2))?;
    let memento = universe.memento()?;
    assert_eq!(memento, glider().translate(3, 2));

    universe.clear();
    assert_eq!(universe.population(), 0);
    universe.restore(memento.clone())?;
    assert_eq!(universe.memento()?, memento);
    Ok(())
}

#[test]
fn save_and_load() -> Result<(), Box<dyn Error>> {
    let mut universe = Config::new(4, 2).universe()?;
    universe.restore(glider())?;
    let mut bytes = Vec::new();
    universe.save(&mut bytes)?;

    let mut other = Config::new(4, 2).universe()?;
    other.restore(glider().translate(8, 8))?;
    other.load(&bytes[..])?;
    assert_eq!(other.memento()?, glider());
    Ok(())
}

#[test]
fn merge_load() -> Result<(), Box<dyn Error>> {
    let mut bytes = Vec::new();
    glider().flush(&mut bytes)?;

    let mut universe = Config::new(4, 2).universe()?;
    universe.restore(glider().translate(8, 8))?;
    universe.merge_load(&bytes[..])?;

    let mut expected = glider();
    expected.extend(glider().translate(8, 8).iter().copied());
    assert_eq!(universe.memento()?, expected);

    // Both gliders are alive after loading.
    universe.tick();
    assert_eq!(universe.population(), 10);
    Ok(())
}

#[test]
fn json_format() -> Result<(), Box<dyn Error>> {
    let memento: Memento = [Point::new(1, 2), Point::new(0, 5)].iter().copied().collect();
    let mut bytes = Vec::new();
    memento.flush(&mut bytes)?;
    assert_eq!(
        String::from_utf8(bytes)?,
        r#"{"live_cells":[{"x":0,"y":5},{"x":1,"y":2}]}"#
    );

    let mut loaded = Memento::new();
    loaded.load(&br#"{"live_cells":[{"x":1,"y":2},{"x":0,"y":5}]}"#[..])?;
    assert_eq!(loaded, memento);
    Ok(())
}

#[test]
fn malformed_stream() -> Result<(), Box<dyn Error>> {
    let mut universe = Config::new(4, 2).universe()?;
    universe.restore(glider())?;

    for input in [&b"not json"[..], &br#"{"live_cells":[{"x":1}]}"#[..], &b""[..]] {
        assert!(matches!(universe.load(input), Err(LifeError::Io(_))));
        assert!(matches!(universe.merge_load(input), Err(LifeError::Io(_))));
        assert!(matches!(Memento::read_from(input), Err(LifeError::Io(_))));
    }
    assert_eq!(universe.memento()?, glider());
    Ok(())
}

#[test]
fn load_off_the_board() -> Result<(), Box<dyn Error>> {
    let mut universe = Config::new(2, 2).universe()?;
    // Only (3, 1), (2, 3) and (3, 3) are on the 4×4 board.
    universe.restore(glider().translate(2, 1))?;
    assert_eq!(universe.population(), 3);
    assert!(universe.memento()?.is_alive(Point::new(3, 1)));
    assert!(!universe.memento()?.is_alive(Point::new(4, 2)));
    Ok(())
}

#[test]
fn undo() -> Result<(), Box<dyn Error>> {
    let mut universe = Config::new(8, 2).universe()?;
    assert!(!universe.undo());

    universe.restore(glider().translate(5, 5))?;
    let mut generations = vec![universe.memento()?];
    for _ in 0..3 {
        universe.tick();
        generations.push(universe.memento()?);
    }
    assert_eq!(universe.generation(), 3);
    assert_eq!(universe.history_len(), 4);

    generations.pop();
    while let Some(memento) = generations.pop() {
        assert!(universe.undo());
        assert_eq!(universe.memento()?, memento);
    }
    assert_eq!(universe.generation(), 0);
    assert!(!universe.undo());
    assert_eq!(universe.memento()?, glider().translate(5, 5));

    // The board still runs after undoing.
    for _ in 0..4 {
        universe.tick();
    }
    assert_eq!(universe.memento()?, glider().translate(6, 6));
    Ok(())
}

#[test]
fn history_limit() -> Result<(), Box<dyn Error>> {
    let mut universe = Config::new(8, 2)
        .set_history_limit(Some(2))
        .universe()?;
    universe.restore(glider())?;
    for _ in 0..5 {
        universe.tick();
    }
    assert_eq!(universe.history_len(), 3);
    assert!(universe.undo());
    assert!(universe.undo());
    assert!(!universe.undo());
    assert_eq!(universe.generation(), 3);
    Ok(())
}

#[test]
fn unbounded_history() -> Result<(), Box<dyn Error>> {
    let mut universe = Config::new(4, 2).set_history_limit(None).universe()?;
    for _ in 0..2000 {
        universe.tick();
    }
    assert_eq!(universe.history_len(), 2001);
    Ok(())
}

#[test]
fn observers() -> Result<(), Box<dyn Error>> {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut universe = Config::new(4, 2).universe()?;

    let first = universe.attach({
        let log = Arc::clone(&log);
        move |change: &Change| log.lock().unwrap().push((1, *change))
    });
    universe.attach({
        let log = Arc::clone(&log);
        move |change: &Change| log.lock().unwrap().push((2, *change))
    });
    assert_eq!(universe.observer_count(), 2);

    let point = Point::new(3, 3);
    universe.toggle(point)?;
    assert!(universe.tick());
    // Nothing left to change.
    assert!(!universe.tick());
    assert!(universe.detach(first));
    assert!(!universe.detach(first));
    universe.clear();
    universe.undo();

    assert_eq!(
        *log.lock().unwrap(),
        vec![
            (1, Change::Toggled(point)),
            (2, Change::Toggled(point)),
            (1, Change::Ticked { generation: 1 }),
            (2, Change::Ticked { generation: 1 }),
            (2, Change::Cleared),
            (2, Change::Undone),
        ]
    );
    Ok(())
}

#[test]
fn gate_fast_path() -> Result<(), Box<dyn Error>> {
    let mut universe = Config::new(4, 2).universe()?;
    universe.restore(glider())?;
    let view = universe.view();

    assert_eq!(view.try_read(|board| board.population()), Some(5));
    view.gate().close();
    assert_eq!(view.try_read(|board| board.population()), None);
    view.gate().open();
    assert_eq!(view.try_read(|board| board.population()), Some(5));
    Ok(())
}

#[test]
fn reader_waits_for_writer() -> Result<(), Box<dyn Error>> {
    let mut universe = Config::new(4, 2).universe()?;
    universe.restore(glider())?;
    let view = universe.view();

    view.gate().close();
    let reader = thread::spawn({
        let view = view.clone();
        move || view.read(|board| board.plaintext())
    });
    thread::sleep(Duration::from_millis(50));
    assert!(!reader.is_finished());
    view.gate().open();
    assert_eq!(reader.join().unwrap(), universe.plaintext());
    Ok(())
}

#[test]
fn writer_waits_for_reader() -> Result<(), Box<dyn Error>> {
    let universe = Config::new(4, 2).universe()?;
    let view = universe.view();
    let closed = Arc::new(AtomicBool::new(false));

    let guard = view.gate().enter();
    let writer = thread::spawn({
        let view = view.clone();
        let closed = Arc::clone(&closed);
        move || {
            view.gate().close();
            closed.store(true, Ordering::SeqCst);
        }
    });
    thread::sleep(Duration::from_millis(50));
    assert!(!closed.load(Ordering::SeqCst));
    drop(guard);
    writer.join().unwrap();
    assert!(closed.load(Ordering::SeqCst));
    assert!(!view.gate().is_open());
    Ok(())
}

#[test]
fn panicking_writer_opens_the_gate() -> Result<(), Box<dyn Error>> {
    let universe = Config::new(4, 2).universe()?;
    let view = universe.view();

    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        view.gate().closed(|| panic!("the writer failed"));
    }));
    assert!(result.is_err());
    assert!(view.gate().is_open());
    assert_eq!(view.try_read(|board| board.population()), Some(0));
    Ok(())
}

#[test]
fn view_knows_the_generation() -> Result<(), Box<dyn Error>> {
    let mut universe = Config::new(4, 2).universe()?;
    universe.restore(glider())?;
    let view = universe.view();
    let status = |view: &lifeblocks_lib::BoardView| {
        view.try_read(|board| (view.generation(), board.population()))
    };
    assert_eq!(status(&view), Some((0, 5)));

    universe.tick();
    universe.tick();
    assert_eq!(status(&view), Some((2, 5)));
    assert!(universe.undo());
    assert_eq!(status(&view), Some((1, 5)));

    // A still board does not notify the observers, but still counts.
    universe.clear();
    universe.tick();
    assert_eq!(status(&view), Some((2, 0)));

    // The renderer does not need the universe itself.
    let shared = Arc::new(Mutex::new(universe));
    let _writer = shared.lock().unwrap();
    assert_eq!(status(&view), Some((2, 0)));
    Ok(())
}

#[test]
fn view_follows_ticks() -> Result<(), Box<dyn Error>> {
    let mut universe = Config::new(4, 2).universe()?;
    universe.restore(glider())?;
    let view = universe.view();
    for _ in 0..4 {
        universe.tick();
    }
    let seen = view.read(|board| board.create_memento())?;
    assert_eq!(seen, glider().translate(1, 1));
    Ok(())
}

#[test]
fn redraws() -> Result<(), Box<dyn Error>> {
    let mut universe = Config::new(4, 2).universe()?;
    universe.restore(
        [(5, 5), (5, 6), (6, 5), (6, 6)]
            .iter()
            .map(|&point| Point::from(point))
            .collect(),
    )?;
    assert!(universe.board().take_redraw());

    // The block is still: the board quiets down, but asks for one last
    // redraw first.
    universe.tick();
    assert!(!universe.board().is_active());
    assert!(universe.board().take_redraw());
    assert!(!universe.board().take_redraw());
    universe.tick();
    assert!(!universe.board().take_redraw());
    Ok(())
}

#[cfg(feature = "read-rle")]
#[test]
fn rle() -> Result<(), Box<dyn Error>> {
    let memento = Memento::from_rle("x = 3, y = 3, rule = B3/S23\nbo$2bo$3o!")?;
    assert_eq!(memento, glider());
    assert_eq!(
        memento.bounds(),
        Some((Point::new(0, 0), Point::new(2, 2)))
    );
    Ok(())
}

#[cfg(feature = "read-rle")]
#[test]
fn rle_out_of_range() {
    let result = Memento::from_rle("x = 0, y = 0\n4294967296bo!");
    assert!(matches!(result, Err(LifeError::Io(_))));
}

#[test]
fn memento_helpers() {
    let glider = glider();
    assert_eq!(glider.population(), 5);
    assert!(!glider.is_empty());
    assert!(Memento::new().is_empty());
    assert_eq!(Memento::new().bounds(), None);
    assert_eq!(
        glider.translate(-1, 3).bounds(),
        Some((Point::new(-1, 3), Point::new(1, 5)))
    );
    assert_eq!(glider.plaintext(3, 3), ".o.\n..o\nooo\n");
    assert_eq!(glider.checked_translate(-1, 3), Some(glider.translate(-1, 3)));
    assert_eq!(glider.checked_translate(i32::MAX, 0), None);
    assert_eq!(glider.checked_translate(0, i32::MIN), Some(glider.translate(0, i32::MIN)));
    assert_eq!(Point::new(0, -1).checked_translate(0, i32::MIN), None);
}
