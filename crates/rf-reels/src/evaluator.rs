//! Win evaluation
//!
//! Three pure steps over a settled grid:
//!
//! 1. [`WinEvaluator::calculate_win_lines`]: leftmost run per pay line
//! 2. [`WinEvaluator::add_points_to_wins`]: paytable lookup
//! 3. [`WinEvaluator::calculate_active_elements`]: highlight masks for paid lines

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::SlotResult;
use crate::paylines::{MIN_RUN, PayLine, PayLineTable};
use crate::symbols::{REEL_COUNT, SymbolGrid, SymbolId, VISIBLE_SLOTS, transpose};

/// A win on one pay line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineWin {
    /// Symbol on the first reel of the line
    pub symbol: SymbolId,
    /// Consecutive matches from the first reel
    pub run_length: u8,
    /// Paytable points; `None` when the paytable has no entry for the run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<u32>,
}

impl LineWin {
    pub fn new(symbol: SymbolId, run_length: u8) -> Self {
        Self {
            symbol,
            run_length,
            points: None,
        }
    }

    pub fn is_paid(&self) -> bool {
        self.points.is_some()
    }
}

/// Per-line results in pay-line order (index 0 = line 1)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineResults {
    lines: Vec<Option<LineWin>>,
}

impl LineResults {
    pub fn new(lines: Vec<Option<LineWin>>) -> Self {
        Self { lines }
    }

    /// Result for 1-based `line`
    pub fn line(&self, line: usize) -> Option<&LineWin> {
        line.checked_sub(1)
            .and_then(|idx| self.lines.get(idx))
            .and_then(Option::as_ref)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Option<LineWin>> {
        self.lines.iter()
    }

    /// Winning lines as (1-based line, win)
    pub fn wins(&self) -> impl Iterator<Item = (usize, &LineWin)> {
        self.lines
            .iter()
            .enumerate()
            .filter_map(|(idx, win)| win.as_ref().map(|w| (idx + 1, w)))
    }

    pub fn win_count(&self) -> usize {
        self.wins().count()
    }

    pub fn total_points(&self) -> u32 {
        self.wins().filter_map(|(_, w)| w.points).sum()
    }

    pub fn as_slice(&self) -> &[Option<LineWin>] {
        &self.lines
    }
}

/// Cells of one paid line, reel-major (`cells[reel][visible_slot]`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveMask {
    /// 1-based pay line
    pub line: usize,
    pub cells: [[bool; VISIBLE_SLOTS]; REEL_COUNT],
}

impl ActiveMask {
    pub fn is_active(&self, reel: usize, slot: usize) -> bool {
        self.cells
            .get(reel)
            .and_then(|r| r.get(slot))
            .copied()
            .unwrap_or(false)
    }

    /// Active slots on one reel
    pub fn reel(&self, reel: usize) -> Option<&[bool; VISIBLE_SLOTS]> {
        self.cells.get(reel)
    }

    /// Row-major view (`[visible_slot][reel]`)
    pub fn row_major(&self) -> [[bool; REEL_COUNT]; VISIBLE_SLOTS] {
        transpose(&self.cells)
    }

    pub fn active_count(&self) -> usize {
        self.cells.iter().flatten().filter(|&&c| c).count()
    }
}

/// Stateless evaluator over a shared [`PayLineTable`]
#[derive(Debug, Clone)]
pub struct WinEvaluator {
    table: Arc<PayLineTable>,
}

impl WinEvaluator {
    pub fn new(table: Arc<PayLineTable>) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &PayLineTable {
        &self.table
    }

    /// Leftmost-run matching on every pay line
    pub fn calculate_win_lines(&self, grid: &SymbolGrid) -> LineResults {
        let lines = self
            .table
            .paylines()
            .iter()
            .map(|line| Self::evaluate_line(grid, line))
            .collect();
        LineResults::new(lines)
    }

    /// Same as [`Self::calculate_win_lines`] for a dynamically shaped matrix
    ///
    /// Anything but exactly 3 rows × 5 columns is an `InvalidGridShape` error.
    pub fn calculate_win_lines_from_rows<S>(&self, rows: &[Vec<S>]) -> SlotResult<LineResults>
    where
        S: Clone + Into<SymbolId>,
    {
        let grid = SymbolGrid::from_rows(rows)?;
        Ok(self.calculate_win_lines(&grid))
    }

    fn evaluate_line(grid: &SymbolGrid, line: &PayLine) -> Option<LineWin> {
        let rows = grid.rows();
        let first = &rows[line.row_on(0)][0];

        // stop at the first break; later runs on the line never count
        let run_length = (0..REEL_COUNT)
            .take_while(|&reel| &rows[line.row_on(reel)][reel] == first)
            .count() as u8;

        (run_length >= MIN_RUN).then(|| LineWin::new(first.clone(), run_length))
    }

    /// Attach paytable points to every win
    ///
    /// A win without a paytable entry keeps its symbol and run length but no
    /// points. Running this twice gives the same result.
    pub fn add_points_to_wins(&self, mut results: LineResults) -> LineResults {
        let paytable = self.table.paytable();

        for (idx, win) in results.lines.iter_mut().enumerate() {
            let Some(win) = win else { continue };

            win.points = paytable.points(&win.symbol, win.run_length);
            if win.points.is_none() {
                log::warn!(
                    "Paytable miss on line {}: {} x{} has no points",
                    idx + 1,
                    win.symbol,
                    win.run_length
                );
            }
        }

        results
    }

    /// One mask per paid line, in line order
    ///
    /// Only the winning prefix of the line is marked. Lines without points
    /// produce no mask.
    pub fn calculate_active_elements(&self, results: &LineResults) -> Vec<ActiveMask> {
        let paylines = self.table.paylines();

        results
            .wins()
            .filter(|(_, win)| win.is_paid())
            .filter_map(|(line_no, win)| {
                let line = paylines.get(line_no - 1)?;
                let mut matrix = [[false; REEL_COUNT]; VISIBLE_SLOTS];
                for reel in 0..(win.run_length as usize).min(REEL_COUNT) {
                    matrix[line.row_on(reel)][reel] = true;
                }
                Some(ActiveMask {
                    line: line_no,
                    cells: transpose(&matrix),
                })
            })
            .collect()
    }

    /// Run all three steps
    pub fn evaluate(&self, grid: &SymbolGrid) -> Evaluation {
        let lines = self.add_points_to_wins(self.calculate_win_lines(grid));
        let active_masks = self.calculate_active_elements(&lines);
        Evaluation { lines, active_masks }
    }
}

/// Scored lines plus their highlight masks
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluation {
    pub lines: LineResults,
    pub active_masks: Vec<ActiveMask>,
}

impl Evaluation {
    pub fn total_points(&self) -> u32 {
        self.lines.total_points()
    }
}
