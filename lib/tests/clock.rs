use lifeblocks_lib::{Clock, Config, Point, TickRate};
use std::{
    error::Error,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    thread,
    time::{Duration, Instant},
};

/// Waits until `condition` holds, for at most two seconds.
fn wait_for<F: FnMut() -> bool>(mut condition: F) -> bool {
    let start = Instant::now();
    while start.elapsed() < Duration::from_secs(2) {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    condition()
}

#[test]
fn tick_rates() {
    for rate in [
        TickRate::Halt,
        TickRate::Agonizing,
        TickRate::Slow,
        TickRate::Medium,
        TickRate::Fast,
    ] {
        assert_eq!(rate.to_string().parse::<TickRate>(), Ok(rate));
    }
    assert_eq!("FAST".parse::<TickRate>(), Ok(TickRate::Fast));
    assert!("warp".parse::<TickRate>().is_err());

    assert_eq!(TickRate::Halt.period(), None);
    assert_eq!(TickRate::Agonizing.period(), Some(Duration::from_millis(500)));
    assert_eq!(TickRate::Slow.period(), Some(Duration::from_millis(150)));
    assert_eq!(TickRate::Medium.period(), Some(Duration::from_millis(70)));
    assert_eq!(TickRate::Fast.period(), Some(Duration::from_millis(30)));
    assert_eq!(TickRate::default(), TickRate::Medium);
}

#[test]
fn single_step_while_halted() -> Result<(), Box<dyn Error>> {
    let mut universe = Config::new(4, 2).universe()?;
    for x in 3..6 {
        universe.toggle(Point::new(x, 4))?;
    }
    let universe = Arc::new(Mutex::new(universe));
    let clock = Clock::for_universe(Arc::clone(&universe), TickRate::Halt)?;
    assert!(!clock.is_running());

    thread::sleep(Duration::from_millis(50));
    assert_eq!(universe.lock().unwrap().generation(), 0);

    clock.single_step();
    assert!(wait_for(|| universe.lock().unwrap().generation() == 1));
    thread::sleep(Duration::from_millis(100));
    assert_eq!(universe.lock().unwrap().generation(), 1);
    assert!(universe.lock().unwrap().is_alive(Point::new(4, 3))?);
    Ok(())
}

#[test]
fn halt_and_resume() -> Result<(), Box<dyn Error>> {
    let count = Arc::new(AtomicUsize::new(0));
    let clock = Clock::new(TickRate::Fast, {
        let count = Arc::clone(&count);
        move || {
            count.fetch_add(1, Ordering::SeqCst);
        }
    })?;
    assert!(clock.is_running());
    assert!(wait_for(|| count.load(Ordering::SeqCst) >= 3));

    clock.halt();
    assert!(!clock.is_running());
    assert_eq!(clock.tick_rate(), TickRate::Halt);
    thread::sleep(Duration::from_millis(50));
    let halted = count.load(Ordering::SeqCst);
    thread::sleep(Duration::from_millis(150));
    assert_eq!(count.load(Ordering::SeqCst), halted);

    clock.resume();
    assert_eq!(clock.tick_rate(), TickRate::Fast);
    assert!(wait_for(|| count.load(Ordering::SeqCst) > halted));
    Ok(())
}

#[test]
fn first_tick_is_immediate() -> Result<(), Box<dyn Error>> {
    let count = Arc::new(AtomicUsize::new(0));
    let _clock = Clock::new(TickRate::Agonizing, {
        let count = Arc::clone(&count);
        move || {
            count.fetch_add(1, Ordering::SeqCst);
        }
    })?;
    assert!(wait_for(|| count.load(Ordering::SeqCst) == 1));
    thread::sleep(Duration::from_millis(100));
    assert_eq!(count.load(Ordering::SeqCst), 1);
    Ok(())
}

#[test]
fn drop_stops_ticking() -> Result<(), Box<dyn Error>> {
    let count = Arc::new(AtomicUsize::new(0));
    let clock = Clock::new(TickRate::Fast, {
        let count = Arc::clone(&count);
        move || {
            count.fetch_add(1, Ordering::SeqCst);
        }
    })?;
    assert!(wait_for(|| count.load(Ordering::SeqCst) >= 1));
    drop(clock);
    let stopped = count.load(Ordering::SeqCst);
    thread::sleep(Duration::from_millis(100));
    assert_eq!(count.load(Ordering::SeqCst), stopped);
    Ok(())
}
