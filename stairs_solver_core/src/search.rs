//! Best-first search over boards.

use std::{
    cmp::Ordering,
    collections::{BinaryHeap, HashSet},
    rc::Rc,
};

use serde::{Deserialize, Serialize};

use crate::{
    Direction, Position,
    bag::Bag,
    board::{Board, Goal, RuleError},
    command::{Action, legal_actions, replay},
    entity::CharacterKind,
};

/// Ranks boards for the frontier. Lower scores are expanded first.
pub trait Heuristic {
    fn score(&self, board: &Board) -> i32;

    /// Boards for which this returns true are never enqueued. It must not
    /// reject a board from which the goal is still reachable.
    fn unsolvable(&self, board: &Board) -> bool {
        board.unsolvable()
    }
}

/// Rewards a character of `kind` facing `facing`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacingBonus {
    pub kind: CharacterKind,
    pub facing: Direction,
    pub bonus: i32,
}

/// Distance to the goal with a few tunable nudges.
///
/// For the stairs goal the base score is the Chebyshev distance from the
/// protagonist to the stairs. For a formation goal it is the number of
/// target slots nobody occupies. `cleared_traps_bonus` is subtracted once no
/// trap remains, and each matching [`FacingBonus`] is subtracted as well.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalDistance {
    pub cleared_traps_bonus: i32,
    pub facing_bonuses: Vec<FacingBonus>,
}

impl Default for GoalDistance {
    fn default() -> Self {
        GoalDistance {
            cleared_traps_bonus: 5,
            facing_bonuses: Vec::new(),
        }
    }
}

impl Heuristic for GoalDistance {
    fn score(&self, board: &Board) -> i32 {
        let mut score = match &board.level().goal {
            Goal::ReachStairs => board
                .protagonist()
                .map_or(i32::MAX, |p| p.position.chebyshev(board.stairs.position)),
            Goal::Formation(target) => {
                let current: Bag<(CharacterKind, Position)> = board
                    .characters
                    .iter()
                    .map(|c| (c.kind, c.position))
                    .collect();
                (target - &current).len() as i32
            }
        };

        if board.traps.is_empty() {
            score = score.saturating_sub(self.cleared_traps_bonus);
        }
        for bonus in &self.facing_bonuses {
            if board
                .characters
                .iter()
                .any(|c| c.kind == bonus.kind && c.facing == bonus.facing)
            {
                score = score.saturating_sub(bonus.bonus);
            }
        }
        score
    }
}

/// Knobs of a search run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Give up after expanding this many boards. `None` searches until the
    /// frontier is empty.
    pub max_expansions: Option<usize>,
    /// Emit a progress event every this many expansions. Zero disables it.
    pub progress_interval: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            max_expansions: None,
            progress_interval: 10_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SolveError {
    #[error("no solution: the search space was exhausted after expanding {expanded} boards")]
    Exhausted { expanded: usize },
    #[error("search inconclusive: gave up after expanding {limit} boards")]
    BudgetExceeded { limit: usize },
    #[error(transparent)]
    Rule(#[from] RuleError),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchStats {
    /// Boards taken off the frontier.
    pub expanded: usize,
    /// Distinct boards seen, the initial one included.
    pub discovered: usize,
}

/// One edge of a solution path: the action and the board it produced.
#[derive(Debug, Clone)]
pub struct Step {
    pub action: Action,
    pub board: Board,
}

/// A path from the initial board to a solved one.
#[derive(Debug, Clone)]
pub struct Solution {
    pub initial: Board,
    pub steps: Vec<Step>,
    pub stats: SearchStats,
}

impl Solution {
    pub fn actions(&self) -> impl Iterator<Item = &Action> {
        self.steps.iter().map(|step| &step.action)
    }

    /// The solved board, or the initial one when it was already solved.
    pub fn final_board(&self) -> &Board {
        self.steps
            .last()
            .map_or(&self.initial, |step| &step.board)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Executes the action list again from the initial board.
    pub fn replay(&self) -> Result<Board, RuleError> {
        replay(&self.initial, self.actions())
    }
}

/// A discovered board and the edge it was first reached by.
struct Node {
    board: Rc<Board>,
    parent: Option<(usize, Action)>,
    depth: usize,
}

/// Frontier entry. `index` is the discovery order, which also breaks ties.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Candidate {
    score: i32,
    index: usize,
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap behavior
        other
            .score
            .cmp(&self.score)
            .then_with(|| other.index.cmp(&self.index))
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Best-first search driven by a [`Heuristic`].
///
/// A board keeps the predecessor it was first discovered from, even if a
/// later path to it looks better. The search therefore finds a solution, not
/// necessarily a short one.
#[derive(Debug, Clone)]
pub struct Solver<H = GoalDistance> {
    heuristic: H,
    config: SolverConfig,
}

impl Solver<GoalDistance> {
    pub fn new(config: SolverConfig) -> Self {
        Solver::with_heuristic(GoalDistance::default(), config)
    }
}

impl<H: Heuristic> Solver<H> {
    pub fn with_heuristic(heuristic: H, config: SolverConfig) -> Self {
        Solver { heuristic, config }
    }

    pub fn solve(&self, initial: &Board) -> Result<Solution, SolveError> {
        let start = Rc::new(initial.clone());
        let mut nodes = vec![Node {
            board: Rc::clone(&start),
            parent: None,
            depth: 0,
        }];
        let mut visited: HashSet<Rc<Board>> = HashSet::new();
        visited.insert(Rc::clone(&start));
        let mut frontier = BinaryHeap::new();
        frontier.push(Candidate {
            score: self.heuristic.score(&start),
            index: 0,
        });

        let mut stats = SearchStats {
            expanded: 0,
            discovered: 1,
        };
        tracing::info!(
            score = self.heuristic.score(&start),
            characters = start.characters.len(),
            held_items = start.inventory.len(),
            "searching"
        );

        while let Some(Candidate { score, index }) = frontier.pop() {
            let current = Rc::clone(&nodes[index].board);
            if current.solved() {
                let solution = Solution {
                    initial: initial.clone(),
                    steps: reconstruct(&nodes, index),
                    stats,
                };
                tracing::info!(
                    steps = solution.len(),
                    expanded = stats.expanded,
                    discovered = stats.discovered,
                    "solved"
                );
                return Ok(solution);
            }

            if let Some(limit) = self.config.max_expansions {
                if stats.expanded >= limit {
                    tracing::info!(limit, "expansion budget exhausted");
                    return Err(SolveError::BudgetExceeded { limit });
                }
            }
            stats.expanded += 1;
            if self.config.progress_interval > 0
                && stats.expanded % self.config.progress_interval == 0
            {
                tracing::debug!(
                    expanded = stats.expanded,
                    frontier = frontier.len(),
                    visited = visited.len(),
                    score,
                    depth = nodes[index].depth,
                    "search progress"
                );
            }

            let depth = nodes[index].depth + 1;
            for action in legal_actions(&current)? {
                let next = action.execute(&current)?;
                if next == *current || self.heuristic.unsolvable(&next) {
                    continue;
                }
                if visited.contains(&next) {
                    continue;
                }

                let next = Rc::new(next);
                let next_index = nodes.len();
                visited.insert(Rc::clone(&next));
                frontier.push(Candidate {
                    score: self.heuristic.score(&next),
                    index: next_index,
                });
                nodes.push(Node {
                    board: next,
                    parent: Some((index, action)),
                    depth,
                });
                stats.discovered += 1;
            }
        }

        tracing::info!(expanded = stats.expanded, "frontier empty");
        Err(SolveError::Exhausted {
            expanded: stats.expanded,
        })
    }
}

/// Walks parent links back from `index` to the root.
fn reconstruct(nodes: &[Node], mut index: usize) -> Vec<Step> {
    let mut steps = Vec::new();
    while let Some((parent, action)) = &nodes[index].parent {
        steps.push(Step {
            action: action.clone(),
            board: Board::clone(&nodes[index].board),
        });
        index = *parent;
    }
    steps.reverse();
    steps
}
