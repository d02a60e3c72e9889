//! Minimum-time press schedule search.
//!
//! Dijkstra over a lazily expanded graph:
//! - Nodes are normalized [`StateKey`]s; rotations never grow past one turn
//! - Each node has ten outgoing edges, one per timing digit, built on demand
//! - A node whose marble already sits on a trap has no edges at all, so every
//!   strike-bound branch is a dead end and the search never models resets
//! - Edge weights are the real time needed to reach the digit again, with a
//!   discount for presses that drop the marble through several cylinders
//! - FxHashSet/FxHashMap for the visited set and best known costs
//! - Ties between equal costs pop in insertion order

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicBool, Ordering};

use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;

use crate::config::PuzzleConfiguration;
use crate::engine::{is_trap_primed, settle};
use crate::error::PuzzleError;
use crate::identity::StateKey;
use crate::rotation::{residue, rotate, Digit, NUM_DIGITS};
use crate::state::{MarbleLevel, PuzzleState};

/// Cost units per second of waiting.
pub const COST_PER_SECOND: u32 = 60;

/// Number of timing slots in one full clock cycle.
const CYCLE_SECONDS: u32 = NUM_DIGITS as u32;

/// How often (in expanded states) search progress is logged.
const PROGRESS_INTERVAL: usize = 250_000;

/// One outgoing edge of a search node.
#[derive(Debug, Clone, Copy)]
pub struct Edge {
    pub digit: Digit,
    /// Successor with the marble settled but no trap check applied.
    pub state: PuzzleState,
    pub wait: u32,
    pub cost: u32,
}

/// One press of a schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Press {
    pub digit: Digit,
    /// Seconds to wait after the previous press for this digit to come up.
    pub wait: u32,
    pub cost: u32,
    pub from: MarbleLevel,
    pub to: MarbleLevel,
}

/// Optimal schedule found by [`solve`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleResult {
    pub presses: Vec<Press>,
    pub total_cost: u32,
    /// Number of states expanded by the search.
    pub explored: usize,
}

impl ScheduleResult {
    /// The timing digits to press, in order.
    pub fn digits(&self) -> Vec<Digit> {
        self.presses.iter().map(|press| press.digit).collect()
    }

    /// Total seconds spent waiting for each digit, ignoring the discount.
    pub fn total_wait(&self) -> u32 {
        self.presses.iter().map(|press| press.wait).sum()
    }
}

/// Seconds until `digit` next shows on a countdown clock last pressed at `last`.
///
/// The first press is treated as one second away.
#[inline]
pub fn wait_seconds(last: Option<Digit>, digit: Digit) -> u32 {
    match last {
        None => 1,
        Some(last) if digit < last => u32::from(last.get() - digit.get()),
        Some(last) => u32::from(last.get()) + CYCLE_SECONDS - u32::from(digit.get()),
    }
}

/// Weight of the edge pressing `digit` that drops the marble `dropped` levels.
#[inline]
pub fn edge_cost(last: Option<Digit>, digit: Digit, dropped: u8) -> u32 {
    let cost = COST_PER_SECOND * wait_seconds(last, digit);
    let dropped = u32::from(dropped);
    if dropped > 1 && dropped <= cost {
        cost / dropped
    } else {
        cost
    }
}

/// Outgoing edges of `state`, in digit order.
///
/// Returns `None` when the marble has exited or already rests on a trap;
/// such states are terminal in the search graph.
pub fn successors(config: &PuzzleConfiguration, state: &PuzzleState) -> Option<[Edge; NUM_DIGITS]> {
    if state.is_solved() || is_trap_primed(config, &state.rotation, state.level) {
        return None;
    }

    Some(Digit::ALL.map(|digit| {
        let rotation = rotate(config, &state.rotation, digit).map(residue);
        let level = settle(&rotation, state.level);
        let dropped = state.level.get() - level.get();
        Edge {
            digit,
            state: PuzzleState {
                rotation,
                level,
                last_digit: Some(digit),
            },
            wait: wait_seconds(state.last_digit, digit),
            cost: edge_cost(state.last_digit, digit, dropped),
        }
    }))
}

/// A node in the search arena with a back-pointer along its best path.
struct SearchNode {
    key: StateKey,
    parent: Option<(usize, Press)>,
}

/// Finds the cheapest schedule that solves the puzzle from `start`.
pub fn solve(config: &PuzzleConfiguration, start: &PuzzleState) -> Result<ScheduleResult, PuzzleError> {
    let never = AtomicBool::new(false);
    solve_with_cancel(config, start, &never)
}

/// Like [`solve`], but checks `cancel` before every frontier pop.
///
/// Raising the flag from another thread makes the search return
/// [`PuzzleError::CancellationRequested`].
pub fn solve_with_cancel(
    config: &PuzzleConfiguration,
    start: &PuzzleState,
    cancel: &AtomicBool,
) -> Result<ScheduleResult, PuzzleError> {
    if start.is_solved() {
        return Err(PuzzleError::invalid("puzzle is already solved"));
    }
    if is_trap_primed(config, &start.rotation, start.level) {
        log::warn!("start state already rests on a trap: {start}");
        return Err(PuzzleError::UnreachableSolution { explored: 0 });
    }

    let root = StateKey::new(start);
    let mut arena = vec![SearchNode {
        key: root,
        parent: None,
    }];
    let mut best_costs: FxHashMap<StateKey, u32> = FxHashMap::default();
    let mut visited: FxHashSet<StateKey> = FxHashSet::default();
    let mut frontier: BinaryHeap<Reverse<(u32, u64, usize)>> = BinaryHeap::new();
    let mut sequence = 0u64;
    let mut explored = 0usize;

    best_costs.insert(root, 0);
    frontier.push(Reverse((0, sequence, 0)));

    while let Some(Reverse((cost, _, node_index))) = frontier.pop() {
        if cancel.load(Ordering::Relaxed) {
            log::debug!("search cancelled after {explored} states");
            return Err(PuzzleError::CancellationRequested);
        }

        let key = arena[node_index].key;
        // stale entry: this state was already expanded at a lower cost
        if !visited.insert(key) {
            continue;
        }
        explored += 1;
        if explored % PROGRESS_INTERVAL == 0 {
            log::debug!("expanded {explored} states, frontier {}", frontier.len());
        }

        if key.level().is_exited() {
            let presses = trace_path(&arena, node_index);
            log::debug!(
                "solved in {} presses, cost {cost}, {explored} states expanded",
                presses.len()
            );
            return Ok(ScheduleResult {
                presses,
                total_cost: cost,
                explored,
            });
        }

        let state = key.state();
        let Some(edges) = successors(config, &state) else {
            continue;
        };

        for edge in edges {
            let next_key = StateKey::new(&edge.state);
            if visited.contains(&next_key) {
                continue;
            }
            let next_cost = cost + edge.cost;
            if best_costs.get(&next_key).is_some_and(|&known| known <= next_cost) {
                continue;
            }
            best_costs.insert(next_key, next_cost);

            let press = Press {
                digit: edge.digit,
                wait: edge.wait,
                cost: edge.cost,
                from: state.level,
                to: edge.state.level,
            };
            arena.push(SearchNode {
                key: next_key,
                parent: Some((node_index, press)),
            });
            sequence += 1;
            frontier.push(Reverse((next_cost, sequence, arena.len() - 1)));
        }
    }

    log::warn!("search exhausted {explored} states without solving the puzzle");
    Err(PuzzleError::UnreachableSolution { explored })
}

/// Collects the presses leading to `node_index`, first press first.
fn trace_path(arena: &[SearchNode], node_index: usize) -> Vec<Press> {
    let mut presses = Vec::new();
    let mut current = node_index;
    while let Some((parent, press)) = arena[current].parent {
        presses.push(press);
        current = parent;
    }
    presses.reverse();
    presses
}
