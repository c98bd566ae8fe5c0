//! Grid geometry: which slots a structure contains and where they cross. Everything here is
//! computed once at construction and never mutated afterwards.

use bit_set::BitSet;
use smallvec::SmallVec;
use std::collections::{HashMap, HashSet};
use std::fmt::{Debug, Display, Formatter};
use thiserror::Error;

use crate::MAX_SLOT_LENGTH;

/// An identifier for a given slot, based on its index in the model's `slot_configs` field.
pub type SlotId = usize;

/// Zero-indexed (row, col) coords for a cell in the grid, where row = 0 is the top row.
pub type GridCoord = (usize, usize);

/// Direction that a slot is facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    Across,
    Down,
}

/// A word position in the grid. Two slots are the same slot iff all four fields match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Slot {
    pub row: usize,
    pub col: usize,
    pub direction: Direction,
    pub length: usize,
}

impl Slot {
    pub fn new(row: usize, col: usize, direction: Direction, length: usize) -> Slot {
        Slot { row, col, direction, length }
    }

    /// Generate the coords for each cell of this slot.
    pub fn cell_coords(&self) -> Vec<GridCoord> {
        (0..self.length)
            .map(|cell_idx| match self.direction {
                Direction::Across => (self.row, self.col + cell_idx),
                Direction::Down => (self.row + cell_idx, self.col),
            })
            .collect()
    }
}

impl Display for Slot {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let direction = match self.direction {
            Direction::Across => "across",
            Direction::Down => "down",
        };
        write!(f, "{}-cell {} slot at ({}, {})", self.length, direction, self.row, self.col)
    }
}

/// A crossing between one slot and another, referencing the other slot's id and the location of
/// the intersection within the other slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Crossing {
    pub other_slot_id: SlotId,
    pub other_slot_cell: usize,
}

/// A slot together with the facts derived from the grid around it.
pub struct SlotConfig {
    pub id: SlotId,
    pub slot: Slot,

    /// One entry per cell of the slot, `Some` where another slot passes through that cell.
    pub crossings: SmallVec<[Option<Crossing>; MAX_SLOT_LENGTH]>,

    /// Ids of every slot with at least one crossing into this one.
    pub neighbors: BitSet,
}

impl Debug for SlotConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlotConfig")
            .field("id", &self.id)
            .field("slot", &self.slot)
            .field("crossings", &self.crossings)
            .finish()
    }
}

/// Structural problems that make a grid unusable. These are reported when the model is built,
/// never during search.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PuzzleError {
    #[error("grid must have at least one row and one column")]
    EmptyGrid,

    #[error("row {row} has {found} cells but the first row has {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("{0} is too short; slots need at least 2 cells")]
    SlotTooShort(Slot),

    #[error("{slot} runs outside the {width}x{height} grid")]
    SlotOutOfBounds {
        slot: Slot,
        width: usize,
        height: usize,
    },

    #[error("{0} is listed more than once")]
    DuplicateSlot(Slot),

    #[error("{first} and {second} both cover cell {cell:?}")]
    ConflictingSlots {
        first: Slot,
        second: Slot,
        cell: GridCoord,
    },
}

/// The immutable description of a puzzle: its fillable cells, its slots, and the overlaps
/// between them.
pub struct PuzzleModel {
    width: usize,
    height: usize,
    structure: Vec<Vec<bool>>,
    slot_configs: Vec<SlotConfig>,
    slot_ids_by_slot: HashMap<Slot, SlotId>,
}

impl Debug for PuzzleModel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PuzzleModel")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("slot_configs", &self.slot_configs)
            .finish()
    }
}

impl PuzzleModel {
    /// Derive every slot from a fillable/blocked matrix. Each maximal run of two or more
    /// fillable cells in a row (column) becomes an across (down) slot; lone cells belong to no
    /// slot in that direction.
    pub fn from_structure(structure: Vec<Vec<bool>>) -> Result<PuzzleModel, PuzzleError> {
        let height = structure.len();
        let width = structure.first().map_or(0, Vec::len);
        if height == 0 || width == 0 {
            return Err(PuzzleError::EmptyGrid);
        }
        for (row, line) in structure.iter().enumerate() {
            if line.len() != width {
                return Err(PuzzleError::RaggedRow {
                    row,
                    expected: width,
                    found: line.len(),
                });
            }
        }

        let mut slots: Vec<Slot> = vec![];

        for row in 0..height {
            for col in 0..width {
                if !structure[row][col] {
                    continue;
                }

                if col == 0 || !structure[row][col - 1] {
                    let length = (col..width).take_while(|&c| structure[row][c]).count();
                    if length > 1 {
                        slots.push(Slot::new(row, col, Direction::Across, length));
                    }
                }

                if row == 0 || !structure[row - 1][col] {
                    let length = (row..height).take_while(|&r| structure[r][col]).count();
                    if length > 1 {
                        slots.push(Slot::new(row, col, Direction::Down, length));
                    }
                }
            }
        }

        PuzzleModel::build(width, height, structure, slots)
    }

    /// Build a model from explicitly positioned slots. Cells covered by a slot are fillable and
    /// everything else is blocked.
    pub fn from_slots(
        width: usize,
        height: usize,
        slots: &[Slot],
    ) -> Result<PuzzleModel, PuzzleError> {
        if height == 0 || width == 0 {
            return Err(PuzzleError::EmptyGrid);
        }

        let mut seen: HashSet<Slot> = HashSet::with_capacity(slots.len());
        let mut structure = vec![vec![false; width]; height];

        for &slot in slots {
            if slot.length < 2 {
                return Err(PuzzleError::SlotTooShort(slot));
            }

            let fits = match slot.direction {
                Direction::Across => slot.row < height && slot.col + slot.length <= width,
                Direction::Down => slot.col < width && slot.row + slot.length <= height,
            };
            if !fits {
                return Err(PuzzleError::SlotOutOfBounds { slot, width, height });
            }

            if !seen.insert(slot) {
                return Err(PuzzleError::DuplicateSlot(slot));
            }

            for (row, col) in slot.cell_coords() {
                structure[row][col] = true;
            }
        }

        PuzzleModel::build(width, height, structure, slots.to_vec())
    }

    /// Assign ids in a fixed order and work out crossings and neighbor sets.
    fn build(
        width: usize,
        height: usize,
        structure: Vec<Vec<bool>>,
        mut slots: Vec<Slot>,
    ) -> Result<PuzzleModel, PuzzleError> {
        // Row-major by start cell, across before down.
        slots.sort();

        // For each cell, which (slot id, cell index within slot) pairs pass through it.
        let mut entries_by_loc: HashMap<GridCoord, SmallVec<[(SlotId, usize); 2]>> =
            HashMap::new();

        for (slot_id, slot) in slots.iter().enumerate() {
            for (cell_idx, loc) in slot.cell_coords().into_iter().enumerate() {
                let entries = entries_by_loc.entry(loc).or_default();

                if let Some(&(other_slot_id, _)) = entries
                    .iter()
                    .find(|&&(other_slot_id, _)| slots[other_slot_id].direction == slot.direction)
                {
                    return Err(PuzzleError::ConflictingSlots {
                        first: slots[other_slot_id],
                        second: *slot,
                        cell: loc,
                    });
                }

                entries.push((slot_id, cell_idx));
            }
        }

        let slot_count = slots.len();
        let slot_configs: Vec<SlotConfig> = slots
            .iter()
            .enumerate()
            .map(|(slot_id, &slot)| {
                let crossings: SmallVec<[Option<Crossing>; MAX_SLOT_LENGTH]> = slot
                    .cell_coords()
                    .iter()
                    .map(|loc| {
                        entries_by_loc[loc]
                            .iter()
                            .find(|&&(other_slot_id, _)| other_slot_id != slot_id)
                            .map(|&(other_slot_id, other_slot_cell)| Crossing {
                                other_slot_id,
                                other_slot_cell,
                            })
                    })
                    .collect();

                let mut neighbors = BitSet::with_capacity(slot_count);
                for crossing in crossings.iter().flatten() {
                    neighbors.insert(crossing.other_slot_id);
                }

                SlotConfig {
                    id: slot_id,
                    slot,
                    crossings,
                    neighbors,
                }
            })
            .collect();

        let slot_ids_by_slot = slots
            .iter()
            .enumerate()
            .map(|(slot_id, &slot)| (slot, slot_id))
            .collect();

        Ok(PuzzleModel {
            width,
            height,
            structure,
            slot_configs,
            slot_ids_by_slot,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn is_fillable(&self, row: usize, col: usize) -> bool {
        self.structure
            .get(row)
            .and_then(|line| line.get(col))
            .copied()
            .unwrap_or(false)
    }

    pub fn slot_count(&self) -> usize {
        self.slot_configs.len()
    }

    /// All slots, indexed by `SlotId`.
    pub fn slots(&self) -> impl Iterator<Item = &Slot> + '_ {
        self.slot_configs.iter().map(|slot_config| &slot_config.slot)
    }

    pub fn slot(&self, slot_id: SlotId) -> &Slot {
        &self.slot_configs[slot_id].slot
    }

    pub fn slot_configs(&self) -> &[SlotConfig] {
        &self.slot_configs
    }

    pub fn slot_id(&self, slot: &Slot) -> Option<SlotId> {
        self.slot_ids_by_slot.get(slot).copied()
    }

    pub fn crossings(&self, slot_id: SlotId) -> &[Option<Crossing>] {
        &self.slot_configs[slot_id].crossings
    }

    pub fn neighbors(&self, slot_id: SlotId) -> &BitSet {
        &self.slot_configs[slot_id].neighbors
    }

    /// Number of slots crossing this one.
    pub fn degree(&self, slot_id: SlotId) -> usize {
        self.slot_configs[slot_id].neighbors.len()
    }

    /// The cell index within `a` and within `b` where the two slots cross, if they do.
    pub fn overlap(&self, a: SlotId, b: SlotId) -> Option<(usize, usize)> {
        self.slot_configs[a]
            .crossings
            .iter()
            .enumerate()
            .find_map(|(cell_idx, crossing_opt)| match crossing_opt {
                Some(crossing) if crossing.other_slot_id == b => {
                    Some((cell_idx, crossing.other_slot_cell))
                }
                _ => None,
            })
    }

    /// Every directed pair of crossing slots, in slot order.
    pub fn arcs(&self) -> Vec<(SlotId, SlotId)> {
        self.slot_configs
            .iter()
            .flat_map(|slot_config| {
                slot_config
                    .neighbors
                    .iter()
                    .map(move |neighbor| (slot_config.id, neighbor))
            })
            .collect()
    }
}
