//! Reading structures and word lists from text.
//!
//! A structure file has one line per row, with `_` (or `.`) for a fillable cell and anything
//! else for a blocked one. A word file has one word per line.

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::puzzle::{PuzzleError, PuzzleModel};
use crate::vocabulary::Vocabulary;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("couldn't read '{}'", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid structure in '{}': {source}", .path.display())]
    Structure {
        path: PathBuf,
        #[source]
        source: PuzzleError,
    },
}

/// Turn structure text into a fillable/blocked matrix. Only a trailing `\r` is stripped, since
/// spaces are blocked cells like any other character. Empty lines are skipped.
pub fn parse_structure_cells(contents: &str) -> Vec<Vec<bool>> {
    contents
        .lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.is_empty())
        .map(|line| line.chars().map(|c| c == '_' || c == '.').collect())
        .collect()
}

pub fn parse_structure(contents: &str) -> Result<PuzzleModel, PuzzleError> {
    PuzzleModel::from_structure(parse_structure_cells(contents))
}

/// Words are trimmed and uppercased; blank lines and repeats are dropped.
pub fn parse_words(contents: &str) -> Vocabulary {
    Vocabulary::new(
        contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_uppercase),
    )
}

pub fn load_structure(path: &Path) -> Result<PuzzleModel, LoadError> {
    let contents = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    parse_structure(&contents).map_err(|source| LoadError::Structure {
        path: path.to_path_buf(),
        source,
    })
}

pub fn load_words(path: &Path) -> Result<Vocabulary, LoadError> {
    let contents = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(parse_words(&contents))
}
