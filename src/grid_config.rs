//! This module implements the structural model of a grid: which cells are open, the slots they
//! chain into, and where those slots cross. Nothing here changes during filling.

use smallvec::SmallVec;
use std::collections::HashMap;
use std::fmt::{Debug, Formatter};
use std::fs;
use std::path::Path;

use crate::backtracking_search::Choice;
use crate::errors::GridError;
use crate::word_list::WordList;
use crate::MAX_SLOT_LENGTH;

/// An identifier for a given slot, based on its index in the `GridConfig`'s `slot_configs` field.
pub type SlotId = usize;

/// Zero-indexed (row, column) coords for a cell in the grid, where row 0 is the top row.
pub type GridCoord = (usize, usize);

/// The cell indices at which two slots must agree: (index into the first slot's word, index into
/// the second slot's word).
pub type Overlap = (usize, usize);

/// Direction that a slot is facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Across,
    Down,
}

/// A struct representing a crossing between one slot and another, referencing the other slot's id
/// and the location of the intersection within the other slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Crossing {
    pub other_slot_id: SlotId,
    pub other_slot_cell: usize,
}

/// A struct representing the aspects of a slot in the grid that are static during filling.
#[derive(Clone)]
pub struct SlotConfig {
    pub id: SlotId,
    pub start_cell: GridCoord,
    pub direction: Direction,
    pub length: usize,

    /// One entry per cell, recording which slot (if any) crosses this one there.
    pub crossings: SmallVec<[Option<Crossing>; MAX_SLOT_LENGTH]>,

    /// Every slot this one crosses, in cell order.
    pub neighbors: SmallVec<[SlotId; MAX_SLOT_LENGTH]>,
}

impl Debug for SlotConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlotConfig")
            .field("id", &self.id)
            .field("start_cell", &self.start_cell)
            .field("direction", &self.direction)
            .field("length", &self.length)
            .field("neighbors", &self.neighbors)
            .finish()
    }
}

/// Two slots are the same slot if they start in the same place, face the same way, and have the
/// same length.
impl PartialEq for SlotConfig {
    fn eq(&self, other: &Self) -> bool {
        self.start_cell == other.start_cell
            && self.direction == other.direction
            && self.length == other.length
    }
}

impl Eq for SlotConfig {}

impl SlotConfig {
    /// Generate the coords for each cell of this slot.
    pub fn cell_coords(&self) -> Vec<GridCoord> {
        cell_coords(self.start_cell, self.direction, self.length)
    }

    /// Find where this slot crosses the given one, if it does.
    pub fn overlap_with(&self, other_slot_id: SlotId) -> Option<Overlap> {
        self.crossings
            .iter()
            .enumerate()
            .find_map(|(cell_idx, crossing)| match crossing {
                Some(crossing) if crossing.other_slot_id == other_slot_id => {
                    Some((cell_idx, crossing.other_slot_cell))
                }
                _ => None,
            })
    }
}

fn cell_coords(start_cell: GridCoord, direction: Direction, length: usize) -> Vec<GridCoord> {
    (0..length)
        .map(|cell_idx| match direction {
            Direction::Across => (start_cell.0, start_cell.1 + cell_idx),
            Direction::Down => (start_cell.0 + cell_idx, start_cell.1),
        })
        .collect()
}

/// A struct representing the aspects of a grid that are static during filling.
#[derive(Clone)]
pub struct GridConfig {
    pub width: usize,
    pub height: usize,

    /// Indexed by row and then column; `false` means a block.
    pub open_cells: Vec<Vec<bool>>,

    pub slot_configs: Vec<SlotConfig>,
}

impl Debug for GridConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridConfig")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("slot_configs", &self.slot_configs)
            .finish()
    }
}

impl GridConfig {
    pub fn slot_count(&self) -> usize {
        self.slot_configs.len()
    }

    pub fn overlap(&self, slot_id: SlotId, other_slot_id: SlotId) -> Option<Overlap> {
        self.slot_configs[slot_id].overlap_with(other_slot_id)
    }

    pub fn neighbors(&self, slot_id: SlotId) -> &[SlotId] {
        &self.slot_configs[slot_id].neighbors
    }
}

/// An across or down entry in the input to `generate_grid_config`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridEntry {
    pub loc: GridCoord,
    pub len: usize,
    pub dir: Direction,
}

impl GridEntry {
    fn cell_coords(&self) -> Vec<GridCoord> {
        cell_coords(self.loc, self.dir, self.len)
    }
}

/// Generate a GridConfig representing a grid with the specified entries. The grid's size is the
/// smallest one containing every entry, and any cell not covered by an entry is a block.
pub fn generate_grid_config(entries: &[GridEntry]) -> Result<GridConfig, GridError> {
    let cells = entries.iter().flat_map(GridEntry::cell_coords);
    let height = cells.clone().map(|(row, _)| row + 1).max().unwrap_or(0);
    let width = cells.map(|(_, col)| col + 1).max().unwrap_or(0);

    build_grid_config(width, height, entries)
}

fn build_grid_config(
    width: usize,
    height: usize,
    entries: &[GridEntry],
) -> Result<GridConfig, GridError> {
    // Build a map from cell location to entries involved, which we can then use to calculate
    // crossings. Each value is a list of (entry index, cell index within entry); since entries
    // sharing a cell must face different ways, there are never more than two.
    let mut entries_by_loc: HashMap<GridCoord, SmallVec<[(usize, usize); 2]>> = HashMap::new();

    for (entry_idx, entry) in entries.iter().enumerate() {
        if entry.len == 0 {
            return Err(GridError::EmptySlot {
                start_cell: entry.loc,
            });
        }

        for (cell_idx, loc) in entry.cell_coords().into_iter().enumerate() {
            let cell_entries = entries_by_loc.entry(loc).or_default();

            if let Some(&(other_idx, _)) = cell_entries
                .iter()
                .find(|&&(other_idx, _)| entries[other_idx].dir == entry.dir)
            {
                return Err(GridError::OverlappingSlots {
                    first: other_idx,
                    second: entry_idx,
                    cell: loc,
                });
            }
            cell_entries.push((entry_idx, cell_idx));
        }
    }

    let mut open_cells = vec![vec![false; width]; height];
    for &(row, col) in entries_by_loc.keys() {
        open_cells[row][col] = true;
    }

    let slot_configs = entries
        .iter()
        .enumerate()
        .map(|(entry_idx, entry)| {
            let crossings: SmallVec<[Option<Crossing>; MAX_SLOT_LENGTH]> = entry
                .cell_coords()
                .iter()
                .map(|loc| {
                    entries_by_loc[loc]
                        .iter()
                        .find(|&&(other_idx, _)| other_idx != entry_idx)
                        .map(|&(other_slot_id, other_slot_cell)| Crossing {
                            other_slot_id,
                            other_slot_cell,
                        })
                })
                .collect();

            // An across slot and a down slot share at most one cell, so each crossing is a
            // distinct neighbor.
            let neighbors = crossings
                .iter()
                .flatten()
                .map(|crossing| crossing.other_slot_id)
                .collect();

            SlotConfig {
                id: entry_idx,
                start_cell: entry.loc,
                direction: entry.dir,
                length: entry.len,
                crossings,
                neighbors,
            }
        })
        .collect();

    Ok(GridConfig {
        width,
        height,
        open_cells,
        slot_configs,
    })
}

/// Generate a grid config from a string template, with `_` or `.` representing open cells and `#`
/// or `█` representing blocks. Every run of two or more open cells becomes a slot: first all of
/// the across slots in reading order, then all of the down slots column by column.
pub fn generate_grid_config_from_template_string(template: &str) -> Result<GridConfig, GridError> {
    let rows: Vec<Vec<char>> = template
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| line.chars().collect())
        .collect();

    let Some(first_row) = rows.first() else {
        return Err(GridError::EmptyGrid);
    };
    let width = first_row.len();
    let height = rows.len();

    let mut open_cells: Vec<Vec<bool>> = Vec::with_capacity(height);
    for (row, line) in rows.iter().enumerate() {
        if line.len() != width {
            return Err(GridError::RaggedRows {
                row,
                expected: width,
                found: line.len(),
            });
        }

        let open_row = line
            .iter()
            .enumerate()
            .map(|(col, &ch)| match ch {
                '_' | '.' => Ok(true),
                '#' | '█' => Ok(false),
                _ => Err(GridError::InvalidCell { row, col, ch }),
            })
            .collect::<Result<Vec<bool>, GridError>>()?;
        open_cells.push(open_row);
    }

    // Collect runs of open cells along each line, as (start of run, run length).
    fn build_runs(lines: impl Iterator<Item = Vec<bool>>) -> Vec<((usize, usize), usize)> {
        let mut result = vec![];

        for (line_idx, line) in lines.enumerate() {
            let mut run_start: Option<usize> = None;

            for (idx, open) in line.iter().copied().chain([false]).enumerate() {
                match (open, run_start) {
                    (true, None) => run_start = Some(idx),
                    (false, Some(start)) => {
                        if idx - start > 1 {
                            result.push(((line_idx, start), idx - start));
                        }
                        run_start = None;
                    }
                    _ => {}
                }
            }
        }

        result
    }

    let across = build_runs(open_cells.iter().cloned())
        .into_iter()
        .map(|(loc, len)| GridEntry {
            loc,
            len,
            dir: Direction::Across,
        });

    let columns = (0..width).map(|col| {
        (0..height)
            .map(|row| open_cells[row][col])
            .collect::<Vec<bool>>()
    });
    let down = build_runs(columns)
        .into_iter()
        .map(|((col, row), len)| GridEntry {
            loc: (row, col),
            len,
            dir: Direction::Down,
        });

    let entries: Vec<GridEntry> = across.chain(down).collect();
    let grid_config = build_grid_config(width, height, &entries)?;

    log::debug!(
        "Parsed {}x{} grid with {} slots",
        grid_config.height,
        grid_config.width,
        grid_config.slot_count()
    );

    Ok(grid_config)
}

/// Read a template file and build a grid config from it.
pub fn load_grid_config<P: AsRef<Path>>(path: P) -> Result<GridConfig, GridError> {
    let path = path.as_ref();
    let template = fs::read_to_string(path).map_err(|source| GridError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    generate_grid_config_from_template_string(&template)
}

/// Lay out the letters of the given choices, indexed by row and then column. Blocks and unfilled
/// cells are `None`.
pub fn letter_grid(
    config: &GridConfig,
    word_list: &WordList,
    choices: &[Choice],
) -> Vec<Vec<Option<char>>> {
    let mut letters = vec![vec![None; config.width]; config.height];

    for &Choice { slot_id, word_id } in choices {
        let slot_config = &config.slot_configs[slot_id];
        let word = &word_list.words[word_id];

        for ((row, col), &glyph) in slot_config.cell_coords().into_iter().zip(&word.glyphs) {
            letters[row][col] = Some(glyph);
        }
    }

    letters
}

/// Turn the given grid config and fill choices into a rendered string, with `█` for blocks and a
/// space for open cells that haven't been filled.
pub fn render_grid(config: &GridConfig, word_list: &WordList, choices: &[Choice]) -> String {
    let letters = letter_grid(config, word_list, choices);

    config
        .open_cells
        .iter()
        .zip(letters)
        .map(|(open_row, letter_row)| {
            open_row
                .iter()
                .zip(letter_row)
                .map(|(&open, letter)| match (open, letter) {
                    (false, _) => '█',
                    (true, Some(letter)) => letter,
                    (true, None) => ' ',
                })
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use crate::backtracking_search::Choice;
    use crate::errors::GridError;
    use crate::grid_config::Direction::{Across, Down};
    use crate::grid_config::{
        generate_grid_config, generate_grid_config_from_template_string, render_grid, GridEntry,
    };
    use crate::word_list::WordList;

    /// #___#
    /// #_##_
    /// #_##_
    /// #_##_
    /// #____
    const STRUCTURE: &str = "
        #___#
        #_##_
        #_##_
        #_##_
        #____
    ";

    #[test]
    fn test_template_slots_and_order() {
        let grid_config = generate_grid_config_from_template_string(STRUCTURE).unwrap();

        let slots: Vec<_> = grid_config
            .slot_configs
            .iter()
            .map(|s| (s.start_cell, s.direction, s.length))
            .collect();
        assert_eq!(
            slots,
            vec![
                ((0, 1), Across, 3),
                ((4, 1), Across, 4),
                ((0, 1), Down, 5),
                ((1, 4), Down, 4),
            ]
        );
        assert_eq!((grid_config.width, grid_config.height), (5, 5));
    }

    #[test]
    fn test_overlaps_are_symmetric() {
        let grid_config = generate_grid_config_from_template_string(STRUCTURE).unwrap();

        assert_eq!(grid_config.overlap(0, 2), Some((0, 0)));
        assert_eq!(grid_config.overlap(2, 0), Some((0, 0)));
        assert_eq!(grid_config.overlap(1, 2), Some((0, 4)));
        assert_eq!(grid_config.overlap(2, 1), Some((4, 0)));
        assert_eq!(grid_config.overlap(1, 3), Some((3, 3)));
        assert_eq!(grid_config.overlap(0, 3), None);
        assert_eq!(grid_config.overlap(0, 1), None);

        assert_eq!(grid_config.neighbors(0), &[2]);
        assert_eq!(grid_config.neighbors(1), &[2, 3]);
        assert_eq!(grid_config.neighbors(3), &[1]);
    }

    #[test]
    fn test_single_cells_are_not_slots() {
        let grid_config = generate_grid_config_from_template_string("_#_\n#_#\n_#_").unwrap();

        assert_eq!(grid_config.slot_count(), 0);
    }

    #[test]
    fn test_template_errors() {
        assert!(matches!(
            generate_grid_config_from_template_string("\n  \n"),
            Err(GridError::EmptyGrid)
        ));
        assert!(matches!(
            generate_grid_config_from_template_string("___\n__"),
            Err(GridError::RaggedRows { row: 1, expected: 3, found: 2 })
        ));
        assert!(matches!(
            generate_grid_config_from_template_string("_x_"),
            Err(GridError::InvalidCell { row: 0, col: 1, ch: 'x' })
        ));
    }

    #[test]
    fn test_explicit_entries() {
        let grid_config = generate_grid_config(&[
            GridEntry { loc: (0, 0), len: 3, dir: Across },
            GridEntry { loc: (0, 1), len: 3, dir: Down },
        ])
        .unwrap();

        assert_eq!((grid_config.width, grid_config.height), (3, 3));
        assert_eq!(grid_config.overlap(0, 1), Some((1, 0)));
        assert_eq!(grid_config.open_cells[2], vec![false, true, false]);
    }

    #[test]
    fn test_explicit_entry_errors() {
        assert!(matches!(
            generate_grid_config(&[GridEntry { loc: (0, 0), len: 0, dir: Across }]),
            Err(GridError::EmptySlot { .. })
        ));
        assert!(matches!(
            generate_grid_config(&[
                GridEntry { loc: (0, 0), len: 3, dir: Across },
                GridEntry { loc: (0, 2), len: 2, dir: Across },
            ]),
            Err(GridError::OverlappingSlots { first: 0, second: 1, cell: (0, 2) })
        ));
    }

    #[test]
    fn test_slot_equality_ignores_id() {
        let first = generate_grid_config(&[GridEntry { loc: (2, 1), len: 4, dir: Down }]).unwrap();
        let second = generate_grid_config(&[
            GridEntry { loc: (0, 0), len: 2, dir: Across },
            GridEntry { loc: (2, 1), len: 4, dir: Down },
        ])
        .unwrap();

        assert_eq!(first.slot_configs[0], second.slot_configs[1]);
        assert_ne!(second.slot_configs[0], second.slot_configs[1]);
    }

    #[test]
    fn test_render_grid() {
        let grid_config = generate_grid_config_from_template_string(STRUCTURE).unwrap();
        let word_list = WordList::new(["six", "nine", "seven"]);

        let rendered = render_grid(
            &grid_config,
            &word_list,
            &[
                Choice { slot_id: 0, word_id: 0 },
                Choice { slot_id: 1, word_id: 1 },
                Choice { slot_id: 2, word_id: 2 },
            ],
        );

        assert_eq!(rendered, "█SIX█\n█E██ \n█V██ \n█E██ \n█NINE");
    }
}
