//! Puzzle configuration: cylinder colors and trap offsets.
//!
//! Cylinders are indexed 0 to 4; the marble enters through cylinder 4 and
//! exits through cylinder 0. Each cylinder carries a
//! color, which selects its column in the rotation table, and a trap notch
//! at a fixed offset from its gap.

use std::fmt;
use std::ops::RangeInclusive;

use serde::Serialize;

use crate::error::PuzzleError;

/// Number of cylinders the marble must pass through.
pub const NUM_CYLINDERS: usize = 5;

/// Number of notch positions around each cylinder.
pub const NUM_NOTCHES: i32 = 10;

/// Allowed trap offsets per cylinder.
///
/// Narrow on cylinder 0, nearly the full circle from cylinder 2 down.
pub const TRAP_BOUNDS: [RangeInclusive<i32>; NUM_CYLINDERS] = [3..=7, 2..=8, 1..=9, 1..=9, 1..=9];

/// The five cylinder colors, in rotation-table column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Red,
    Yellow,
    Green,
    Blue,
    Silver,
}

impl Color {
    pub const ALL: [Color; NUM_CYLINDERS] = [
        Color::Red,
        Color::Yellow,
        Color::Green,
        Color::Blue,
        Color::Silver,
    ];

    /// Column of this color in [`crate::rotation::ROTATION_DELTAS`].
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Color::Red => "red",
            Color::Yellow => "yellow",
            Color::Green => "green",
            Color::Blue => "blue",
            Color::Silver => "silver",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable description of one puzzle instance.
///
/// Fields are private so every instance has passed validation: colors form
/// a permutation and every trap offset lies inside its cylinder's bounds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PuzzleConfiguration {
    colors: [Color; NUM_CYLINDERS],
    traps: [i32; NUM_CYLINDERS],
}

impl PuzzleConfiguration {
    pub fn new(
        colors: [Color; NUM_CYLINDERS],
        traps: [i32; NUM_CYLINDERS],
    ) -> Result<Self, PuzzleError> {
        for (i, color) in colors.iter().enumerate() {
            if colors[..i].contains(color) {
                return Err(PuzzleError::invalid(format!(
                    "color {color} assigned to more than one cylinder"
                )));
            }
        }

        for (cylinder, (&trap, bounds)) in traps.iter().zip(TRAP_BOUNDS.iter()).enumerate() {
            if !bounds.contains(&trap) {
                return Err(PuzzleError::invalid(format!(
                    "trap offset {trap} on cylinder {cylinder} outside {}..={}",
                    bounds.start(),
                    bounds.end()
                )));
            }
        }

        Ok(Self { colors, traps })
    }

    /// Builds a configuration from color indices (0 = red .. 4 = silver).
    pub fn from_indices(
        color_indices: [usize; NUM_CYLINDERS],
        traps: [i32; NUM_CYLINDERS],
    ) -> Result<Self, PuzzleError> {
        let mut colors = [Color::Red; NUM_CYLINDERS];
        for (slot, &index) in colors.iter_mut().zip(color_indices.iter()) {
            *slot = Color::from_index(index)
                .ok_or_else(|| PuzzleError::invalid(format!("unknown color index {index}")))?;
        }
        Self::new(colors, traps)
    }

    #[inline]
    pub fn colors(&self) -> &[Color; NUM_CYLINDERS] {
        &self.colors
    }

    #[inline]
    pub fn color_of(&self, cylinder: usize) -> Color {
        self.colors[cylinder]
    }

    #[inline]
    pub fn traps(&self) -> &[i32; NUM_CYLINDERS] {
        &self.traps
    }

    #[inline]
    pub fn trap_offset(&self, cylinder: usize) -> i32 {
        self.traps[cylinder]
    }

    #[inline]
    pub const fn num_notches(&self) -> i32 {
        NUM_NOTCHES
    }
}

impl fmt::Display for PuzzleConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let colors: Vec<&str> = self.colors.iter().map(Color::as_str).collect();
        let traps: Vec<String> = self.traps.iter().map(i32::to_string).collect();
        write!(
            f,
            "colors: {}; traps: {}",
            colors.join(", "),
            traps.join(", ")
        )
    }
}
