//! Transition engine: the single rule set shared by live play and replay.
//!
//! A press rotates every cylinder, lets the marble fall through every gap
//! that lines up beneath it, and then checks whether the marble now sits on
//! a trap notch. Nothing here holds state; every function is a pure
//! mapping from its inputs.

use std::fmt;

use serde::Serialize;

use crate::config::{PuzzleConfiguration, NUM_CYLINDERS};
use crate::error::PuzzleError;
use crate::rotation::{gap, rotate, trap, Digit};
use crate::state::{MarbleLevel, PuzzleState};

/// Index of the cylinder the marble enters first and that receives the nudge.
const ENTRY_CYLINDER: usize = NUM_CYLINDERS - 1;

/// What a press did to the puzzle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Outcome {
    /// The marble is still inside the puzzle and free.
    Continue,
    /// The marble landed on the trap of cylinder `at_level`. The marble is
    /// back outside the puzzle and cylinder 4 has been turned by `nudge`.
    Strike { at_level: usize, nudge: i32 },
    /// The marble left through cylinder 0.
    Solved,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Continue => f.write_str("continue"),
            Outcome::Strike { at_level, nudge } => {
                write!(f, "strike at cylinder {at_level} (nudge {nudge:+})")
            }
            Outcome::Solved => f.write_str("solved"),
        }
    }
}

/// Result of one press.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Step {
    pub state: PuzzleState,
    pub outcome: Outcome,
    /// Marble level before the press, for animating the fall.
    pub fell_from: MarbleLevel,
}

/// Notch position the marble currently rests at.
///
/// Outside the puzzle the marble sits at position 0; inside it sits in the
/// gap of the cylinder it last fell into.
#[inline]
pub fn marble_position(rotation: &[i32; NUM_CYLINDERS], level: MarbleLevel) -> i32 {
    if level.is_start() {
        0
    } else {
        gap(rotation, level.get() as usize)
    }
}

/// Drops the marble through every consecutive gap aligned with its position.
///
/// Settling an already settled position returns the same level.
pub fn settle(rotation: &[i32; NUM_CYLINDERS], level: MarbleLevel) -> MarbleLevel {
    let mut level = level;
    while let Some(next) = level.next_cylinder() {
        if gap(rotation, next) != marble_position(rotation, level) {
            break;
        }
        level = level.lower();
    }
    level
}

/// Whether the trap of the next cylinder sits exactly under the marble.
///
/// A settled state for which this holds is a strike; the solver treats such
/// states as dead ends.
pub fn is_trap_primed(
    config: &PuzzleConfiguration,
    rotation: &[i32; NUM_CYLINDERS],
    level: MarbleLevel,
) -> bool {
    match level.next_cylinder() {
        Some(next) => trap(config, rotation, next) == marble_position(rotation, level),
        None => false,
    }
}

/// Correction applied to cylinder 4 when the marble is reset after a strike.
///
/// Keeps the reset marble from facing a gap or trap at position 0 on the
/// entry cylinder, which would otherwise replay the strike.
pub fn strike_nudge(config: &PuzzleConfiguration, rotation: &[i32; NUM_CYLINDERS]) -> i32 {
    let entry_gap = gap(rotation, ENTRY_CYLINDER);
    let entry_trap = trap(config, rotation, ENTRY_CYLINDER);

    if (entry_gap == 0 && entry_trap == 1) || (entry_trap == 0 && entry_gap == 1) {
        1
    } else if entry_gap == 0 || entry_trap == 0 {
        -1
    } else {
        0
    }
}

/// Applies one press at `digit` to `state`.
///
/// Fails with [`PuzzleError::InvalidState`] if the puzzle is already solved.
pub fn apply(
    config: &PuzzleConfiguration,
    state: &PuzzleState,
    digit: Digit,
) -> Result<Step, PuzzleError> {
    if state.is_solved() {
        return Err(PuzzleError::invalid("press on an already solved puzzle"));
    }

    let mut rotation = rotate(config, &state.rotation, digit);
    let level = settle(&rotation, state.level);

    let (level, outcome) = if is_trap_primed(config, &rotation, level) {
        // the trap check above only succeeds when a next cylinder exists
        let at_level = level.get() as usize - 1;
        let nudge = strike_nudge(config, &rotation);
        rotation[ENTRY_CYLINDER] += nudge;
        log::debug!("press at {digit}: marble caught by trap at level {at_level}");
        (MarbleLevel::START, Outcome::Strike { at_level, nudge })
    } else if level.is_exited() {
        log::debug!("press at {digit}: marble exits, puzzle solved");
        (level, Outcome::Solved)
    } else {
        if level != state.level {
            log::debug!("press at {digit}: marble falls to level {level}");
        }
        (level, Outcome::Continue)
    };

    Ok(Step {
        state: PuzzleState {
            rotation,
            level,
            last_digit: Some(digit),
        },
        outcome,
        fell_from: state.level,
    })
}

/// Presses each digit in order, exactly as live play would.
///
/// Strikes do not stop the replay. Pressing after the puzzle is solved is an
/// error, as for [`apply`].
pub fn replay(
    config: &PuzzleConfiguration,
    start: &PuzzleState,
    digits: &[Digit],
) -> Result<Vec<Step>, PuzzleError> {
    let mut steps = Vec::with_capacity(digits.len());
    let mut state = *start;

    for &digit in digits {
        let step = apply(config, &state, digit)?;
        state = step.state;
        steps.push(step);
    }

    Ok(steps)
}
