//! Fill-in crossword solving as a constraint satisfaction problem: node consistency, AC-3 arc
//! consistency, and backtracking search with MRV/degree slot ordering and least-constraining
//! value ordering.

pub mod assignment;
pub mod consistency;
pub mod domain;
pub mod loader;
pub mod puzzle;
pub mod render;
pub mod search;
pub mod vocabulary;

pub use assignment::{verify_assignment, Assignment, Choice, Violation};
pub use loader::{load_structure, load_words, parse_structure, parse_words, LoadError};
pub use puzzle::{Direction, PuzzleError, PuzzleModel, Slot, SlotId};
pub use render::{render_grid, save_grid};
pub use search::{solve, FillFailure, FillSuccess, Propagation, SolveOptions, Statistics};
pub use vocabulary::{Vocabulary, Word, WordId};

/// The expected maximum length for a single slot. Longer slots still work; this only sizes
/// inline storage.
pub const MAX_SLOT_LENGTH: usize = 21;

/// How many search states to visit between checks of the abort flag and the deadline.
pub const INTERRUPT_FREQUENCY: u64 = 10;
