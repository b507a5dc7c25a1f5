use lifeblocks_lib::{Config, Memento, Point, Universe};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::error::Error;

fn pattern(cells: &[(i32, i32)]) -> Memento {
    cells.iter().map(|&point| Point::from(point)).collect()
}

fn universe(grid_size: usize, depth: usize, memento: &Memento) -> Result<Universe, Box<dyn Error>> {
    let mut universe = Config::new(grid_size, depth).universe()?;
    universe.restore(memento.clone())?;
    Ok(universe)
}

fn glider() -> Memento {
    pattern(&[(1, 0), (2, 1), (0, 2), (1, 2), (2, 2)])
}

#[test]
fn block() -> Result<(), Box<dyn Error>> {
    let block = pattern(&[(5, 5), (5, 6), (6, 5), (6, 6)]);
    let mut universe = universe(8, 2, &block)?;
    for _ in 0..4 {
        assert!(!universe.tick());
        assert_eq!(universe.memento()?, block);
    }
    Ok(())
}

#[test]
fn blinker() -> Result<(), Box<dyn Error>> {
    let horizontal = pattern(&[(6, 7), (7, 7), (8, 7)]);
    let vertical = pattern(&[(7, 6), (7, 7), (7, 8)]);
    let mut universe = universe(8, 2, &horizontal)?;
    for _ in 0..3 {
        assert!(universe.tick());
        assert_eq!(universe.memento()?, vertical);
        assert!(universe.tick());
        assert_eq!(universe.memento()?, horizontal);
    }
    Ok(())
}

#[test]
fn blinker_plaintext() -> Result<(), Box<dyn Error>> {
    let mut universe = universe(2, 2, &pattern(&[(1, 0), (1, 1), (1, 2)]))?;
    assert_eq!(universe.plaintext(), ".o..\n.o..\n.o..\n....\n");
    universe.tick();
    assert_eq!(universe.plaintext(), "....\nooo.\n....\n....\n");
    Ok(())
}

#[test]
fn beacon() -> Result<(), Box<dyn Error>> {
    let beacon = pattern(&[(1, 1), (2, 1), (1, 2), (4, 3), (3, 4), (4, 4)]);
    let full = pattern(&[
        (1, 1),
        (2, 1),
        (1, 2),
        (2, 2),
        (3, 3),
        (4, 3),
        (3, 4),
        (4, 4),
    ]);
    let mut universe = universe(4, 2, &full)?;
    universe.tick();
    assert_eq!(universe.memento()?, beacon);
    universe.tick();
    assert_eq!(universe.memento()?, full);
    Ok(())
}

#[test]
fn toad() -> Result<(), Box<dyn Error>> {
    let toad = pattern(&[(3, 3), (4, 3), (5, 3), (2, 4), (3, 4), (4, 4)]).translate(4, 4);
    let mut universe = universe(4, 2, &toad)?;
    universe.tick();
    assert_ne!(universe.memento()?, toad);
    assert_eq!(universe.population(), 6);
    universe.tick();
    assert_eq!(universe.memento()?, toad);
    Ok(())
}

#[test]
fn glider_moves() -> Result<(), Box<dyn Error>> {
    let glider = glider().translate(10, 10);
    let mut universe = universe(8, 2, &glider)?;
    for _ in 0..4 {
        universe.tick();
    }
    assert_eq!(universe.memento()?, glider.translate(1, 1));
    assert_eq!(universe.generation(), 4);
    Ok(())
}

#[test]
fn glider_crosses_blocks() -> Result<(), Box<dyn Error>> {
    // 64 cells wide, with block edges every 4 and 16 cells.
    let glider = glider().translate(1, 1);
    let mut universe = universe(4, 3, &glider)?;
    for step in 1..=55 {
        for _ in 0..4 {
            universe.tick();
        }
        assert_eq!(universe.memento()?, glider.translate(step, step), "step {}", step);
    }
    Ok(())
}

#[test]
fn glider_dies_at_the_edge() -> Result<(), Box<dyn Error>> {
    let glider = glider().translate(4, 4);
    let mut universe = universe(2, 3, &glider)?;
    for _ in 0..40 {
        universe.tick();
    }
    // The glider turns into a block in the corner.
    assert_eq!(
        universe.memento()?,
        pattern(&[(6, 6), (6, 7), (7, 6), (7, 7)])
    );
    Ok(())
}

/// Plain full-board simulation with hard edges.
struct Reference {
    width: i32,
    cells: Vec<bool>,
}

impl Reference {
    fn new(width: i32, memento: &Memento) -> Self {
        let mut cells = vec![false; (width * width) as usize];
        for point in memento {
            cells[(point.y * width + point.x) as usize] = true;
        }
        Reference { width, cells }
    }

    fn is_alive(&self, x: i32, y: i32) -> bool {
        x >= 0
            && y >= 0
            && x < self.width
            && y < self.width
            && self.cells[(y * self.width + x) as usize]
    }

    fn step(&mut self) {
        let mut next = vec![false; self.cells.len()];
        for y in 0..self.width {
            for x in 0..self.width {
                let count = (-1..=1)
                    .flat_map(|dy| (-1..=1).map(move |dx| (dx, dy)))
                    .filter(|&(dx, dy)| (dx, dy) != (0, 0) && self.is_alive(x + dx, y + dy))
                    .count();
                let alive = self.is_alive(x, y);
                next[(y * self.width + x) as usize] = count == 3 || (alive && count == 2);
            }
        }
        self.cells = next;
    }

    fn memento(&self) -> Memento {
        (0..self.width)
            .flat_map(|y| (0..self.width).map(move |x| Point::new(x, y)))
            .filter(|point| self.is_alive(point.x, point.y))
            .collect()
    }
}

fn compare_with_reference(grid_size: usize, depth: usize, seed: u64) -> Result<(), Box<dyn Error>> {
    let mut universe = Config::new(grid_size, depth).universe()?;
    let width = universe.width_in_cells();
    let mut rng = StdRng::seed_from_u64(seed);
    let soup: Memento = (0..width)
        .flat_map(|y| (0..width).map(move |x| Point::new(x, y)))
        .filter(|_| rng.gen_bool(0.35))
        .collect();
    universe.restore(soup.clone())?;
    let mut reference = Reference::new(width, &soup);

    for generation in 1..=120 {
        universe.tick();
        reference.step();
        assert_eq!(
            universe.memento()?,
            reference.memento(),
            "grid size {}, depth {}, generation {}",
            grid_size,
            depth,
            generation
        );
    }
    Ok(())
}

#[test]
fn reference_two_levels() -> Result<(), Box<dyn Error>> {
    compare_with_reference(8, 2, 1)
}

#[test]
fn reference_three_levels() -> Result<(), Box<dyn Error>> {
    compare_with_reference(3, 3, 2)
}

#[test]
fn reference_binary_tree() -> Result<(), Box<dyn Error>> {
    compare_with_reference(2, 5, 3)
}

#[test]
fn reference_single_level() -> Result<(), Box<dyn Error>> {
    compare_with_reference(20, 1, 4)
}
