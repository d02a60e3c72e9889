//! Marble Tumble Solver Library
//!
//! Models a puzzle of five colored, notched cylinders that a marble has to
//! fall through. Every press turns each cylinder by an amount that depends
//! on its color and on the last seconds digit of the clock; the marble falls
//! through aligned gaps and is reset with a strike when it lands on a trap.
//!
//! Provides the transition rules shared by live and automated play, state
//! identity for deduplication, a random generator, and a Dijkstra search for
//! the fastest press schedule that never triggers a trap.

pub mod config;
pub mod engine;
pub mod error;
pub mod generator;
pub mod identity;
pub mod rotation;
pub mod solver;
pub mod state;

pub use config::{Color, PuzzleConfiguration};
pub use engine::{apply, replay, Outcome, Step};
pub use error::PuzzleError;
pub use generator::{generate, generate_seeded, Puzzle};
pub use rotation::Digit;
pub use solver::{solve, solve_with_cancel, ScheduleResult};
pub use state::{MarbleLevel, PuzzleState};
