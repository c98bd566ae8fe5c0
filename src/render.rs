use std::fs;
use std::io;
use std::path::Path;

use crate::assignment::Assignment;
use crate::puzzle::PuzzleModel;
use crate::vocabulary::Vocabulary;

/// Character drawn for blocked cells.
pub const BLOCK: char = '█';

/// Letters placed in each cell by the assignment, `None` where nothing has been written.
pub fn letter_grid(
    model: &PuzzleModel,
    vocabulary: &Vocabulary,
    assignment: &Assignment,
) -> Vec<Vec<Option<char>>> {
    let mut letters = vec![vec![None; model.width()]; model.height()];

    for (slot_id, word_id) in assignment.iter() {
        let word = vocabulary.word(word_id);

        for (cell_idx, (row, col)) in model.slot(slot_id).cell_coords().into_iter().enumerate() {
            if let Some(glyph) = word.char_at(cell_idx) {
                letters[row][col] = Some(glyph);
            }
        }
    }

    letters
}

/// Turn the given model and assignment into a rendered string, one line per row.
pub fn render_grid(model: &PuzzleModel, vocabulary: &Vocabulary, assignment: &Assignment) -> String {
    letter_grid(model, vocabulary, assignment)
        .iter()
        .enumerate()
        .map(|(row, line)| {
            line.iter()
                .enumerate()
                .map(|(col, &letter)| {
                    if model.is_fillable(row, col) {
                        letter.unwrap_or(' ')
                    } else {
                        BLOCK
                    }
                })
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Write the rendered grid to `path` as plain text, ending with a newline.
pub fn save_grid(
    path: &Path,
    model: &PuzzleModel,
    vocabulary: &Vocabulary,
    assignment: &Assignment,
) -> io::Result<()> {
    fs::write(path, render_grid(model, vocabulary, assignment) + "\n")
}
