//! Mutable puzzle state: cylinder rotations, marble level and last press.

use std::fmt;

use serde::Serialize;

use crate::config::NUM_CYLINDERS;
use crate::rotation::{residue, Digit};

/// How far the marble still has to fall.
///
/// The marble enters through cylinder 4 and leaves through cylinder 0.
/// `5` means it has not entered yet; `1..=4` means it sits in the gap of
/// cylinder `level` and meets cylinder `level - 1` next; `0` means it has
/// left the puzzle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct MarbleLevel(u8);

impl MarbleLevel {
    /// The marble waits outside the puzzle.
    pub const START: MarbleLevel = MarbleLevel(NUM_CYLINDERS as u8);
    /// The marble has exited; the puzzle is solved.
    pub const EXITED: MarbleLevel = MarbleLevel(0);

    pub const fn new(level: u8) -> Option<Self> {
        if level as usize <= NUM_CYLINDERS {
            Some(MarbleLevel(level))
        } else {
            None
        }
    }

    #[inline]
    pub const fn get(self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn is_exited(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_start(self) -> bool {
        self.0 as usize == NUM_CYLINDERS
    }

    /// The cylinder the marble meets next, or `None` once it has exited.
    #[inline]
    pub const fn next_cylinder(self) -> Option<usize> {
        if self.0 == 0 {
            None
        } else {
            Some(self.0 as usize - 1)
        }
    }

    /// The marble after falling through one more cylinder.
    #[inline]
    pub(crate) const fn lower(self) -> Self {
        MarbleLevel(self.0 - 1)
    }
}

impl fmt::Display for MarbleLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Everything that changes while the puzzle is played.
///
/// Rotations are kept raw so a presentation layer can animate from one
/// press to the next; only their residues modulo the notch count matter for
/// the puzzle itself. Use [`crate::identity`] to compare states.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PuzzleState {
    pub rotation: [i32; NUM_CYLINDERS],
    pub level: MarbleLevel,
    /// Digit of the most recent press; `None` before the first press.
    pub last_digit: Option<Digit>,
}

impl PuzzleState {
    /// A fresh state with the marble outside the puzzle and no press recorded.
    pub fn new(rotation: [i32; NUM_CYLINDERS]) -> Self {
        Self {
            rotation,
            level: MarbleLevel::START,
            last_digit: None,
        }
    }

    /// Notch positions of every cylinder, each in `0..NUM_NOTCHES`.
    pub fn residues(&self) -> [i32; NUM_CYLINDERS] {
        self.rotation.map(residue)
    }

    #[inline]
    pub fn is_solved(&self) -> bool {
        self.level.is_exited()
    }
}

impl fmt::Display for PuzzleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rotations: Vec<String> = self.rotation.iter().map(i32::to_string).collect();
        write!(f, "rotations: {}; marble: {}", rotations.join(", "), self.level)?;
        if let Some(digit) = self.last_digit {
            write!(f, "; last press: {digit}")?;
        }
        Ok(())
    }
}
