//! Symbol identifiers and the settled symbol grid

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{SlotError, SlotResult};

/// Number of reels (grid columns)
pub const REEL_COUNT: usize = 5;

/// Number of symbols visible on each reel at once (grid rows)
pub const VISIBLE_SLOTS: usize = 3;

/// A symbol identifier (e.g., "hv1", "lv3")
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SymbolId(String);

impl SymbolId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SymbolId {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for SymbolId {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Transpose a rectangular matrix (rows become columns)
pub fn transpose<T: Clone, const R: usize, const C: usize>(matrix: &[[T; C]; R]) -> [[T; R]; C] {
    std::array::from_fn(|col| std::array::from_fn(|row| matrix[row][col].clone()))
}

/// Settled symbol grid, row-major: `rows[visible_slot][reel]`
///
/// The dimensions are part of the type, so a grid that exists is always 3×5.
/// Dynamically shaped input goes through [`SymbolGrid::from_rows`], which is
/// where a wrong shape is reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolGrid {
    rows: [[SymbolId; REEL_COUNT]; VISIBLE_SLOTS],
}

impl SymbolGrid {
    pub fn new(rows: [[SymbolId; REEL_COUNT]; VISIBLE_SLOTS]) -> Self {
        Self { rows }
    }

    /// Build from reel-major data (`reels[reel][visible_slot]`), transposing it
    pub fn from_reel_major(reels: [[SymbolId; VISIBLE_SLOTS]; REEL_COUNT]) -> Self {
        Self {
            rows: transpose(&reels),
        }
    }

    /// Build from a dynamically shaped row-major matrix
    ///
    /// Fails with [`SlotError::InvalidGridShape`] unless the input is exactly
    /// 3 rows of 5 symbols. Nothing is truncated or padded.
    pub fn from_rows<S>(rows: &[Vec<S>]) -> SlotResult<Self>
    where
        S: Clone + Into<SymbolId>,
    {
        let shape_error = |cols: usize| SlotError::InvalidGridShape {
            expected_rows: VISIBLE_SLOTS,
            expected_cols: REEL_COUNT,
            rows: rows.len(),
            cols,
        };

        if rows.len() != VISIBLE_SLOTS {
            return Err(shape_error(rows.first().map_or(0, Vec::len)));
        }
        if let Some(bad) = rows.iter().find(|r| r.len() != REEL_COUNT) {
            return Err(shape_error(bad.len()));
        }

        Ok(Self {
            rows: std::array::from_fn(|row| {
                std::array::from_fn(|col| rows[row][col].clone().into())
            }),
        })
    }

    /// Symbol at (visible slot, reel)
    pub fn get(&self, row: usize, reel: usize) -> Option<&SymbolId> {
        self.rows.get(row).and_then(|r| r.get(reel))
    }

    pub fn rows(&self) -> &[[SymbolId; REEL_COUNT]; VISIBLE_SLOTS] {
        &self.rows
    }

    /// Reel-major view (`[reel][visible_slot]`)
    pub fn reel_major(&self) -> [[SymbolId; VISIBLE_SLOTS]; REEL_COUNT] {
        transpose(&self.rows)
    }
}

impl fmt::Display for SymbolGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.rows {
            let cells: Vec<String> = row.iter().map(|s| format!("{:>4}", s.as_str())).collect();
            writeln!(f, "{}", cells.join(" "))?;
        }
        Ok(())
    }
}
