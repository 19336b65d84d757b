//! Pay-line patterns and paytable

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::{SlotError, SlotResult};
use crate::symbols::{REEL_COUNT, SymbolId, VISIBLE_SLOTS};

/// Number of pay lines on the machine
pub const LINE_COUNT: usize = 7;

/// Shortest run that counts as a win
pub const MIN_RUN: u8 = 3;

/// A pay line: the row read on each reel, left to right
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PayLine {
    pub rows: [usize; REEL_COUNT],
}

impl PayLine {
    pub const fn new(rows: [usize; REEL_COUNT]) -> Self {
        Self { rows }
    }

    /// Same row across all reels
    pub const fn straight(row: usize) -> Self {
        Self {
            rows: [row; REEL_COUNT],
        }
    }

    /// Row read on `reel`
    pub fn row_on(&self, reel: usize) -> usize {
        self.rows[reel]
    }
}

/// The shipped 7 lines, in line order (line 1 first)
pub fn standard_7_paylines() -> Vec<PayLine> {
    vec![
        // Straight lines
        PayLine::straight(0), // Top
        PayLine::straight(1), // Middle
        PayLine::straight(2), // Bottom
        // Zigzag
        PayLine::new([0, 0, 1, 2, 2]),
        PayLine::new([2, 2, 1, 0, 0]),
        // V shapes
        PayLine::new([0, 1, 2, 1, 0]),
        PayLine::new([2, 1, 0, 1, 2]),
    ]
}

/// symbol → run length → points
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Paytable {
    entries: HashMap<SymbolId, BTreeMap<u8, u32>>,
}

impl Paytable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shipped paytable: points for 3, 4 and 5 of a kind
    pub fn standard() -> Self {
        let mut table = Self::new();
        for (symbol, pays) in [
            ("hv1", [10, 20, 50]),
            ("hv2", [5, 10, 20]),
            ("hv3", [5, 10, 15]),
            ("hv4", [5, 10, 15]),
            ("lv1", [2, 5, 10]),
            ("lv2", [1, 2, 5]),
            ("lv3", [1, 2, 3]),
            ("lv4", [1, 2, 3]),
        ] {
            table.set_pays(symbol, pays);
        }
        table
    }

    /// Set points for 3, 4 and 5 of a kind
    pub fn set_pays(&mut self, symbol: impl Into<SymbolId>, pays: [u32; 3]) {
        let runs = self.entries.entry(symbol.into()).or_default();
        for (offset, points) in pays.into_iter().enumerate() {
            runs.insert(MIN_RUN + offset as u8, points);
        }
    }

    /// Set points for a single run length
    pub fn insert(&mut self, symbol: impl Into<SymbolId>, run_length: u8, points: u32) {
        self.entries
            .entry(symbol.into())
            .or_default()
            .insert(run_length, points);
    }

    /// Points for `run_length` of `symbol`, `None` when not configured
    pub fn points(&self, symbol: &SymbolId, run_length: u8) -> Option<u32> {
        self.entries.get(symbol)?.get(&run_length).copied()
    }

    pub fn symbols(&self) -> impl Iterator<Item = &SymbolId> {
        self.entries.keys()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Pay lines plus paytable, loaded once and shared read-only
///
/// Deserializing goes through [`PayLineTable::new`], so a table that exists
/// always has 7 lines with rows in range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPayLineTable")]
pub struct PayLineTable {
    paylines: Vec<PayLine>,
    paytable: Paytable,
}

#[derive(Deserialize)]
struct RawPayLineTable {
    paylines: Vec<PayLine>,
    paytable: Paytable,
}

impl TryFrom<RawPayLineTable> for PayLineTable {
    type Error = SlotError;

    fn try_from(raw: RawPayLineTable) -> SlotResult<Self> {
        Self::new(raw.paylines, raw.paytable)
    }
}

impl PayLineTable {
    /// Create a table, checking the pattern set
    pub fn new(paylines: Vec<PayLine>, paytable: Paytable) -> SlotResult<Self> {
        if paylines.len() != LINE_COUNT {
            return Err(SlotError::Config(format!(
                "expected {} pay lines, got {}",
                LINE_COUNT,
                paylines.len()
            )));
        }

        for (index, line) in paylines.iter().enumerate() {
            if let Some(&row) = line.rows.iter().find(|&&row| row >= VISIBLE_SLOTS) {
                return Err(SlotError::Config(format!(
                    "pay line {} uses row {}, rows are 0..{}",
                    index + 1,
                    row,
                    VISIBLE_SLOTS
                )));
            }
        }

        Ok(Self { paylines, paytable })
    }

    /// The shipped 7-line table
    pub fn standard() -> Self {
        Self {
            paylines: standard_7_paylines(),
            paytable: Paytable::standard(),
        }
    }

    pub fn paylines(&self) -> &[PayLine] {
        &self.paylines
    }

    pub fn paytable(&self) -> &Paytable {
        &self.paytable
    }
}

impl Default for PayLineTable {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_lines() {
        let lines = standard_7_paylines();
        assert_eq!(lines.len(), LINE_COUNT);
        assert_eq!(lines[0].rows, [0, 0, 0, 0, 0]);
        assert_eq!(lines[5].rows, [0, 1, 2, 1, 0]);
        assert_eq!(lines[6].row_on(2), 0);
    }

    #[test]
    fn test_paytable_hv3() {
        let table = Paytable::standard();
        let hv3 = SymbolId::from("hv3");
        assert_eq!(table.points(&hv3, 3), Some(5));
        assert_eq!(table.points(&hv3, 4), Some(10));
        assert_eq!(table.points(&hv3, 5), Some(15));
        assert_eq!(table.points(&hv3, 2), None);
        assert_eq!(table.points(&SymbolId::from("wild"), 3), None);
    }

    #[test]
    fn test_table_rejects_bad_patterns() {
        let mut lines = standard_7_paylines();
        lines.pop();
        assert!(PayLineTable::new(lines, Paytable::standard()).is_err());

        let mut lines = standard_7_paylines();
        lines[3] = PayLine::new([0, 1, 3, 1, 0]);
        assert!(matches!(
            PayLineTable::new(lines, Paytable::standard()),
            Err(SlotError::Config(_))
        ));
    }

    #[test]
    fn test_deserialize_checks_patterns() {
        let mut json: serde_json::Value = serde_json::to_value(PayLineTable::standard()).unwrap();
        let table: PayLineTable = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(table, PayLineTable::standard());

        json["paylines"][6] = serde_json::json!([9, 1, 0, 1, 2]);
        let err = serde_json::from_value::<PayLineTable>(json.clone()).unwrap_err();
        assert!(err.to_string().contains("row 9"));

        json["paylines"].as_array_mut().unwrap().truncate(3);
        assert!(serde_json::from_value::<PayLineTable>(json).is_err());
    }

    #[test]
    fn test_paytable_json_keys() {
        let json = r#"{ "hv1": { "3": 10, "4": 20, "5": 50 } }"#;
        let table: Paytable = serde_json::from_str(json).unwrap();
        assert_eq!(table.points(&SymbolId::from("hv1"), 4), Some(20));
    }
}
