//! Timing digits and the rotation table.
//!
//! Pressing the puzzle while the last seconds digit of the clock reads `d`
//! turns every cylinder by `ROTATION_DELTAS[d][color]` notches.

use std::fmt;

use serde::Serialize;

use crate::config::{PuzzleConfiguration, NUM_CYLINDERS, NUM_NOTCHES};

/// Number of distinct timing slots.
pub const NUM_DIGITS: usize = 10;

/// Per-digit, per-color rotation in notches.
///
/// Rows are timing digits 0-9, columns are colors in [`crate::config::Color`]
/// order (red, yellow, green, blue, silver). Every row is a permutation of
/// `-2..=2`.
pub const ROTATION_DELTAS: [[i32; NUM_CYLINDERS]; NUM_DIGITS] = [
    [-1, 1, -2, 0, 2],
    [-2, 1, 2, -1, 0],
    [1, 0, 2, -2, -1],
    [0, -1, -2, 1, 2],
    [2, 0, 1, -1, -2],
    [1, -2, -1, 2, 0],
    [-2, 2, 0, 1, -1],
    [0, -1, 1, 2, -2],
    [-1, 2, 0, -2, 1],
    [2, -2, -1, 0, 1],
];

/// The last seconds digit of the clock at the moment of a press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Digit(u8);

impl Digit {
    /// All ten digits in ascending order.
    pub const ALL: [Digit; NUM_DIGITS] = [
        Digit(0),
        Digit(1),
        Digit(2),
        Digit(3),
        Digit(4),
        Digit(5),
        Digit(6),
        Digit(7),
        Digit(8),
        Digit(9),
    ];

    /// Returns `None` unless `value` is in `0..=9`.
    pub const fn new(value: u8) -> Option<Self> {
        if value < NUM_DIGITS as u8 {
            Some(Digit(value))
        } else {
            None
        }
    }

    #[inline]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Rotation applied to a cylinder of each color by a press on this digit.
    #[inline]
    pub fn deltas(self) -> &'static [i32; NUM_CYLINDERS] {
        &ROTATION_DELTAS[self.0 as usize]
    }
}

impl fmt::Display for Digit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reduces a raw rotation to a notch position in `0..NUM_NOTCHES`.
#[inline(always)]
pub fn residue(value: i32) -> i32 {
    value.rem_euclid(NUM_NOTCHES)
}

/// Position of the open notch on `cylinder`.
#[inline(always)]
pub fn gap(rotation: &[i32; NUM_CYLINDERS], cylinder: usize) -> i32 {
    residue(rotation[cylinder])
}

/// Position of the trap notch on `cylinder`.
#[inline(always)]
pub fn trap(config: &PuzzleConfiguration, rotation: &[i32; NUM_CYLINDERS], cylinder: usize) -> i32 {
    residue(rotation[cylinder] + config.trap_offset(cylinder))
}

/// Turns every cylinder by its color's delta for `digit`.
pub fn rotate(
    config: &PuzzleConfiguration,
    rotation: &[i32; NUM_CYLINDERS],
    digit: Digit,
) -> [i32; NUM_CYLINDERS] {
    let deltas = digit.deltas();
    let mut rotated = *rotation;
    for (cylinder, value) in rotated.iter_mut().enumerate() {
        *value += deltas[config.color_of(cylinder).index()];
    }
    rotated
}
