//! State identity for search deduplication.
//!
//! Raw rotations drift without bound as presses accumulate, so two states
//! are the same puzzle position when their rotation residues, marble level
//! and last press digit all match. [`StateKey`] holds exactly that
//! normalized form and carries its own equality and hash.

use std::hash::{Hash, Hasher};

use crate::config::NUM_CYLINDERS;
use crate::rotation::{residue, Digit};
use crate::state::{MarbleLevel, PuzzleState};

/// Multiplier seed and step for the rolling hash over residues.
const HASH_SEED: u64 = 63_689;
const HASH_STEP: u64 = 378_551;
const HASH_INIT: u64 = 12;
/// Weight of the last press digit, distinct from the level term.
const DIGIT_WEIGHT: u64 = 17;

/// Canonical form of a [`PuzzleState`].
#[derive(Debug, Clone, Copy)]
pub struct StateKey {
    residues: [u8; NUM_CYLINDERS],
    level: MarbleLevel,
    last_digit: Option<Digit>,
}

impl StateKey {
    pub fn new(state: &PuzzleState) -> Self {
        Self {
            residues: state.rotation.map(|value| residue(value) as u8),
            level: state.level,
            last_digit: state.last_digit,
        }
    }

    /// The normalized state this key stands for.
    pub fn state(&self) -> PuzzleState {
        PuzzleState {
            rotation: self.residues.map(i32::from),
            level: self.level,
            last_digit: self.last_digit,
        }
    }

    #[inline]
    pub fn level(&self) -> MarbleLevel {
        self.level
    }
}

impl From<&PuzzleState> for StateKey {
    fn from(state: &PuzzleState) -> Self {
        Self::new(state)
    }
}

impl PartialEq for StateKey {
    fn eq(&self, other: &Self) -> bool {
        self.residues == other.residues
            && self.level == other.level
            && self.last_digit == other.last_digit
    }
}

impl Eq for StateKey {}

impl Hash for StateKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(state_hash(self));
    }
}

/// Polynomial hash over the residues plus level and last-digit terms.
///
/// Deterministic across runs and platforms.
pub fn state_hash(key: &StateKey) -> u64 {
    let mut multiplier = HASH_SEED;
    let mut hash = HASH_INIT;

    for &r in &key.residues {
        hash = hash.wrapping_mul(multiplier).wrapping_add(u64::from(r));
        multiplier = multiplier.wrapping_mul(HASH_STEP);
    }

    // no press yet hashes as digit -1
    let digit_term = key.last_digit.map_or(0, |d| u64::from(d.get()) + 1);

    hash.wrapping_add(u64::from(key.level.get()))
        .wrapping_add(DIGIT_WEIGHT.wrapping_mul(digit_term))
}

/// Whether two states denote the same puzzle position.
pub fn equivalent(a: &PuzzleState, b: &PuzzleState) -> bool {
    StateKey::new(a) == StateKey::new(b)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rustc_hash::FxHashSet;

    use super::*;

    fn arb_state() -> impl Strategy<Value = PuzzleState> {
        (
            prop::array::uniform5(-1000i32..1000),
            0u8..=5,
            prop::option::of(0u8..10),
        )
            .prop_map(|(rotation, level, digit)| PuzzleState {
                rotation,
                level: MarbleLevel::new(level).unwrap(),
                last_digit: digit.and_then(Digit::new),
            })
    }

    #[test]
    fn test_rotation_multiples_of_notch_count_are_equivalent() {
        let a = PuzzleState::new([1, 2, 3, 4, 5]);
        let b = PuzzleState::new([11, -8, 23, -16, 105]);
        assert!(equivalent(&a, &b));
        assert_eq!(state_hash(&StateKey::new(&a)), state_hash(&StateKey::new(&b)));
    }

    #[test]
    fn test_level_and_digit_distinguish_states() {
        let base = PuzzleState::new([1, 2, 3, 4, 5]);

        let mut lower = base;
        lower.level = MarbleLevel::new(4).unwrap();
        assert!(!equivalent(&base, &lower));

        let mut pressed = base;
        pressed.last_digit = Digit::new(0);
        assert!(!equivalent(&base, &pressed));
        assert_ne!(state_hash(&StateKey::new(&base)), state_hash(&StateKey::new(&pressed)));
    }

    #[test]
    fn test_key_state_is_normalized() {
        let state = PuzzleState::new([-1, 12, 0, 9, -30]);
        let key = StateKey::new(&state);
        assert_eq!(key.state().rotation, [9, 2, 0, 9, 0]);
        assert!(equivalent(&key.state(), &state));
    }

    #[test]
    fn test_set_deduplicates_equivalent_states() {
        let mut seen: FxHashSet<StateKey> = FxHashSet::default();
        assert!(seen.insert(StateKey::new(&PuzzleState::new([0, 0, 0, 0, 1]))));
        assert!(!seen.insert(StateKey::new(&PuzzleState::new([10, -10, 20, 0, 11]))));
        assert!(seen.insert(StateKey::new(&PuzzleState::new([0, 0, 0, 0, 2]))));
        assert_eq!(seen.len(), 2);
    }

    proptest! {
        #[test]
        fn prop_equivalence_is_reflexive_and_symmetric(a in arb_state(), b in arb_state()) {
            prop_assert!(equivalent(&a, &a));
            prop_assert_eq!(equivalent(&a, &b), equivalent(&b, &a));
        }

        #[test]
        fn prop_shifted_rotation_keeps_identity(
            state in arb_state(),
            turns in prop::array::uniform5(-50i32..50),
        ) {
            let mut shifted = state;
            for (value, turn) in shifted.rotation.iter_mut().zip(turns) {
                *value += turn * 10;
            }
            prop_assert!(equivalent(&state, &shifted));
            prop_assert_eq!(
                state_hash(&StateKey::new(&state)),
                state_hash(&StateKey::new(&shifted))
            );
        }

        #[test]
        fn prop_equivalence_is_transitive(
            a in arb_state(),
            first in prop::array::uniform5(-50i32..50),
            second in prop::array::uniform5(-50i32..50),
        ) {
            let mut b = a;
            let mut c = a;
            for i in 0..NUM_CYLINDERS {
                b.rotation[i] += first[i] * 10;
                c.rotation[i] += second[i] * 10;
            }
            prop_assert!(equivalent(&a, &b));
            prop_assert!(equivalent(&b, &c));
            prop_assert!(equivalent(&a, &c));
        }

        #[test]
        fn prop_equal_keys_hash_equal(a in arb_state(), b in arb_state()) {
            let (ka, kb) = (StateKey::new(&a), StateKey::new(&b));
            if ka == kb {
                prop_assert_eq!(state_hash(&ka), state_hash(&kb));
            }
        }
    }
}
