//! A1-style cell addressing and the fixed layout of the month tabs.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// The number of rows at the top of every month tab that hold the title and summary block. The
/// last of these rows holds the column titles.
pub const HEADER_ROWS: usize = 3;

/// Data entry never starts above this (1-indexed) row, the rows above it are reserved for the
/// summary block of the month tab.
pub const FIRST_DATA_ROW: u32 = 21;

/// Row occupancy is measured by counting the populated rows of this column.
pub const ANCHOR_COLUMN: Column = Column::C;

/// The column holding the major category of a ledger row.
pub const MAJOR_COLUMN: Column = Column::D;

/// The column holding the amount of a ledger row.
pub const AMOUNT_COLUMN: Column = Column::H;

/// A 1-indexed spreadsheet column.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Column(u32);

impl Column {
    pub const C: Column = Column(3);
    pub const D: Column = Column(4);
    pub const G: Column = Column(7);
    pub const H: Column = Column(8);
    pub const I: Column = Column(9);
    pub const J: Column = Column(10);

    /// Returns `None` for `0`, columns are 1-indexed.
    pub fn new(number: u32) -> Option<Self> {
        (number > 0).then_some(Self(number))
    }

    /// The 1-indexed column number, e.g. `3` for `C`.
    pub fn number(&self) -> u32 {
        self.0
    }

    /// The 0-indexed position of this column within a row of values.
    pub fn index(&self) -> usize {
        (self.0 - 1) as usize
    }

    /// The column letters, e.g. `C` or `AA`.
    pub fn letters(&self) -> String {
        let mut n = self.0;
        let mut letters = Vec::new();
        while n > 0 {
            let rem = ((n - 1) % 26) as u8;
            letters.push((b'A' + rem) as char);
            n = (n - 1) / 26;
        }
        letters.iter().rev().collect()
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.letters())
    }
}

impl FromStr for Column {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            anyhow::bail!("A column must have at least one letter");
        }
        let mut n: u32 = 0;
        for c in s.chars() {
            if !c.is_ascii_alphabetic() {
                anyhow::bail!("Invalid column '{s}', only the letters A-Z are allowed");
            }
            let digit = (c.to_ascii_uppercase() as u8 - b'A') as u32 + 1;
            n = n
                .checked_mul(26)
                .and_then(|n| n.checked_add(digit))
                .ok_or_else(|| anyhow::anyhow!("Column '{s}' is out of range"))?;
        }
        Ok(Column(n))
    }
}

/// A single cell, e.g. `C21`. Rows are 1-indexed like the sheet itself.
/// Serializes to its A1 string for JSON compatibility.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Cell {
    column: Column,
    row: u32,
}

impl Cell {
    pub fn new(column: Column, row: u32) -> Self {
        Self { column, row }
    }

    pub fn column(&self) -> Column {
        self.column
    }

    pub fn row(&self) -> u32 {
        self.row
    }

    /// The A1 range of this cell on the tab named `tab`, e.g. `'3월'!C21`.
    pub fn on(&self, tab: &str) -> String {
        format!("{}!{self}", quote_tab(tab))
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.column, self.row)
    }
}

impl FromStr for Cell {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let split = s
            .find(|c: char| c.is_ascii_digit())
            .ok_or_else(|| anyhow::anyhow!("Cell must be in format 'C21', got: {s}"))?;
        let (letters, digits) = s.split_at(split);
        let column = letters.parse::<Column>()?;
        let row = digits
            .parse::<u32>()
            .map_err(|e| anyhow::anyhow!("Invalid row number in '{s}': {e}"))?;
        if row == 0 {
            anyhow::bail!("Rows are 1-indexed, got: {s}");
        }
        Ok(Cell { column, row })
    }
}

impl Serialize for Cell {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Cell {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Cell::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// The tab that holds the ledger rows of `date`'s month, e.g. `11월`.
pub fn month_tab(date: NaiveDate) -> String {
    month_label(date.month())
}

/// The tab name for a month number, e.g. `3` -> `3월`.
pub fn month_label(month: u32) -> String {
    format!("{month}월")
}

/// The A1 range covering a whole column of `tab`, e.g. `'3월'!C:C`.
pub fn column_range(tab: &str, column: Column) -> String {
    format!("{}!{column}:{column}", quote_tab(tab))
}

/// The A1 range covering every populated cell of `tab`.
pub fn full_range(tab: &str) -> String {
    format!("{}!A:ZZ", quote_tab(tab))
}

/// Splits a single-cell A1 range like `'3월'!C21` into its tab name and cell.
pub fn split_range(range: &str) -> anyhow::Result<(String, Cell)> {
    let (tab, cell) = range
        .rsplit_once('!')
        .ok_or_else(|| anyhow::anyhow!("Range must be in format 'Tab!C21', got: {range}"))?;
    let tab = match tab.strip_prefix('\'').and_then(|t| t.strip_suffix('\'')) {
        Some(quoted) => quoted.replace("''", "'"),
        None => tab.to_string(),
    };
    Ok((tab, cell.parse()?))
}

/// Quotes a tab name for A1 notation, doubling any single quotes within it.
fn quote_tab(tab: &str) -> String {
    format!("'{}'", tab.replace('\'', "''"))
}
