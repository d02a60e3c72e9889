//! Random puzzle generation.
//!
//! Draws a color permutation, a start rotation and a trap offset per
//! cylinder. Cylinder 4 never starts at notch 0 and its trap is redrawn
//! until it does not sit under the waiting marble, so a fresh puzzle can
//! neither fall straight through nor strike on the first look.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::Serialize;

use crate::config::{Color, PuzzleConfiguration, NUM_CYLINDERS, NUM_NOTCHES, TRAP_BOUNDS};
use crate::engine::is_trap_primed;
use crate::error::PuzzleError;
use crate::rotation::trap;
use crate::state::PuzzleState;

/// Index of the cylinder the marble enters through.
const ENTRY_CYLINDER: usize = NUM_CYLINDERS - 1;

/// A configuration together with the state play starts from.
#[derive(Debug, Clone, Serialize)]
pub struct Puzzle {
    pub config: PuzzleConfiguration,
    pub start: PuzzleState,
}

impl Puzzle {
    /// Pairs a configuration with a start state, rejecting starts that are
    /// already solved or already rest on a trap.
    pub fn new(config: PuzzleConfiguration, start: PuzzleState) -> Result<Self, PuzzleError> {
        if start.is_solved() {
            return Err(PuzzleError::invalid("start state is already solved"));
        }
        if is_trap_primed(&config, &start.rotation, start.level) {
            return Err(PuzzleError::invalid(format!(
                "marble starts on a trap ({start})"
            )));
        }
        Ok(Self { config, start })
    }
}

/// Generates a puzzle from `rng`.
pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Result<Puzzle, PuzzleError> {
    let mut colors = Color::ALL;
    colors.shuffle(rng);

    let mut rotation = [0i32; NUM_CYLINDERS];
    let mut traps = [0i32; NUM_CYLINDERS];
    for cylinder in 0..NUM_CYLINDERS {
        let lowest = if cylinder == ENTRY_CYLINDER { 1 } else { 0 };
        rotation[cylinder] = rng.random_range(lowest..NUM_NOTCHES);
        traps[cylinder] = rng.random_range(TRAP_BOUNDS[cylinder].clone());
    }

    let mut config = PuzzleConfiguration::new(colors, traps)?;
    while trap(&config, &rotation, ENTRY_CYLINDER) == 0 {
        traps[ENTRY_CYLINDER] = rng.random_range(TRAP_BOUNDS[ENTRY_CYLINDER].clone());
        config = PuzzleConfiguration::new(colors, traps)?;
    }

    let start = PuzzleState::new(rotation);
    let color_names: Vec<&str> = config.colors().iter().map(Color::as_str).collect();
    log::info!("colors: {}", color_names.join(", "));
    log::info!("traps: {:?}", config.traps());
    log::info!("start: {start}");

    Puzzle::new(config, start)
}

/// Generates the puzzle for `seed`; the same seed always yields the same puzzle.
pub fn generate_seeded(seed: u64) -> Result<Puzzle, PuzzleError> {
    let mut rng = Pcg32::seed_from_u64(seed);
    generate(&mut rng)
}
