//! Implements the `Sheet` trait using in-memory data for testing purposes.
//!
//! Note: this is compiled even in the "production" version of this app so that we can run the whole
//! app, top-to-bottom, without using Google Sheets.
//!
//! State is shared by spreadsheet id: every `TestSheet` created for the same id sees the same tabs,
//! so a test can seed data, run a command that opens its own `TestSheet`, and then inspect what the
//! command wrote.

use crate::api::{Sheet, SheetRange};
use crate::model::cell::{self, month_label};
use crate::model::Column;
use crate::Result;
use anyhow::{bail, Context};
use std::collections::{BTreeMap, HashMap};
use std::io::Cursor;
use std::sync::{Mutex, MutexGuard, OnceLock};
use tracing::trace;

/// The year used for the dates in the seed data.
const SEED_YEAR: i32 = 2025;

static STATES: OnceLock<Mutex<HashMap<String, TestSheetState>>> = OnceLock::new();

fn states() -> MutexGuard<'static, HashMap<String, TestSheetState>> {
    STATES
        .get_or_init(|| Mutex::new(HashMap::new()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// A record of one call made through the `Sheet` trait.
#[derive(Debug, Clone, Eq, PartialEq)]
pub(crate) enum Call {
    Get(String),
    Column(String, Column),
    TabNames,
    WriteRanges(Vec<SheetRange>),
}

/// Everything a `TestSheet` holds: the tabs, the calls made so far and whether calls should fail.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub(crate) struct TestSheetState {
    /// Rows of each tab, keyed by tab title. Trailing empty cells are not stored, just as the
    /// Sheets API does not return them.
    pub(crate) tabs: BTreeMap<String, Vec<Vec<String>>>,

    /// Every call made through the `Sheet` trait, oldest first.
    pub(crate) calls: Vec<Call>,

    /// When true every call is recorded and then fails.
    pub(crate) fail: bool,
}

impl TestSheetState {
    /// A state with no tabs.
    pub(crate) fn empty() -> Self {
        Self::default()
    }

    /// A state holding the twelve seeded month tabs.
    pub(crate) fn seeded() -> Self {
        Self {
            tabs: default_data(),
            ..Self::default()
        }
    }

    /// Replaces `tab` with the standard header block followed by `rows`.
    pub(crate) fn set_tab<R, S>(&mut self, tab: &str, rows: R)
    where
        R: IntoIterator<Item = Vec<S>>,
        S: Into<String>,
    {
        let mut all = header_rows();
        all.extend(
            rows.into_iter()
                .map(|row| trim_row(row.into_iter().map(Into::into).collect())),
        );
        self.tabs.insert(tab.to_string(), all);
    }

    /// Only the `WriteRanges` calls.
    pub(crate) fn writes(&self) -> Vec<&[SheetRange]> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                Call::WriteRanges(data) => Some(data.as_slice()),
                _ => None,
            })
            .collect()
    }
}

/// An implementation of the `Sheet` trait that does not use Google sheets. By default it is seeded
/// with a header block and a few ledger rows in each of the month tabs `1월` through `12월`.
#[derive(Debug, Clone)]
pub(crate) struct TestSheet {
    id: String,
}

impl TestSheet {
    /// Opens the in-memory spreadsheet `id`, seeding it if it has not been seen before.
    pub(crate) fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        states()
            .entry(id.clone())
            .or_insert_with(TestSheetState::seeded);
        Self { id }
    }

    /// A copy of the current state.
    pub(crate) fn get_state(&self) -> TestSheetState {
        self.with_state(|state| state.clone())
    }

    /// Replaces the current state.
    pub(crate) fn set_state(&self, state: TestSheetState) {
        self.with_state(|s| *s = state)
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut TestSheetState) -> R) -> R {
        let mut states = states();
        let state = states.entry(self.id.clone()).or_default();
        f(state)
    }

    /// Records `call` and fails if the state says so.
    fn record(&self, call: Call) -> Result<()> {
        trace!("TestSheet {}: {call:?}", self.id);
        self.with_state(|state| {
            state.calls.push(call);
            if state.fail {
                bail!("The test sheet was told to fail");
            }
            Ok(())
        })
    }

    fn rows(&self, tab: &str) -> Result<Vec<Vec<String>>> {
        self.with_state(|state| {
            state
                .tabs
                .get(tab)
                .cloned()
                .with_context(|| format!("Unable to parse range: '{tab}'"))
        })
    }
}

#[async_trait::async_trait]
impl Sheet for TestSheet {
    async fn get(&mut self, tab: &str) -> Result<Vec<Vec<String>>> {
        self.record(Call::Get(tab.to_string()))?;
        self.rows(tab)
    }

    async fn column(&mut self, tab: &str, column: Column) -> Result<Vec<String>> {
        self.record(Call::Column(tab.to_string(), column))?;
        let mut values: Vec<String> = self
            .rows(tab)?
            .into_iter()
            .map(|row| row.get(column.index()).cloned().unwrap_or_default())
            .collect();
        while values.last().is_some_and(|v| v.is_empty()) {
            values.pop();
        }
        Ok(values)
    }

    async fn tab_names(&mut self) -> Result<Vec<String>> {
        self.record(Call::TabNames)?;
        Ok(self.with_state(|state| state.tabs.keys().cloned().collect()))
    }

    async fn write_ranges(&mut self, data: &[SheetRange]) -> Result<()> {
        self.record(Call::WriteRanges(data.to_vec()))?;
        self.with_state(|state| {
            for sheet_range in data {
                let (tab, start) = cell::split_range(&sheet_range.range)?;
                let rows = state
                    .tabs
                    .get_mut(&tab)
                    .with_context(|| format!("Unable to parse range: {}", sheet_range.range))?;
                for (i, values) in sheet_range.values.iter().enumerate() {
                    let row_index = start.row() as usize - 1 + i;
                    if rows.len() <= row_index {
                        rows.resize(row_index + 1, Vec::new());
                    }
                    let row = &mut rows[row_index];
                    for (j, value) in values.iter().enumerate() {
                        let col_index = start.column().index() + j;
                        if row.len() <= col_index {
                            row.resize(col_index + 1, String::new());
                        }
                        row[col_index] = value.clone();
                    }
                    let trimmed = trim_row(std::mem::take(row));
                    *row = trimmed;
                }
            }
            Ok(())
        })
    }
}

/// Provides the seed data from this module.
fn default_data() -> BTreeMap<String, Vec<Vec<String>>> {
    let mut map = BTreeMap::new();
    for month in 1..=12u32 {
        let csv = format!("{HEADER_DATA}{}", ledger_data(month));
        // The seed data is a constant of this module and is known to parse.
        let rows = load_csv(&csv).unwrap_or_default();
        map.insert(month_label(month), rows);
    }
    map
}

fn header_rows() -> Vec<Vec<String>> {
    load_csv(HEADER_DATA).unwrap_or_default()
}

fn ledger_data(month: u32) -> String {
    LEDGER_DATA.replace("{ym}", &format!("{SEED_YEAR}-{month:02}"))
}

/// Loads data from a CSV-formatted string, dropping the trailing empty cells of each row.
fn load_csv(csv_data: &str) -> Result<Vec<Vec<String>>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(Cursor::new(csv_data.as_bytes()));

    let mut rows: Vec<Vec<String>> = Vec::new();
    for result in rdr.records() {
        let record = result.context("Unable to parse CSV seed data")?;
        rows.push(trim_row(record.iter().map(str::to_string).collect()));
    }
    Ok(rows)
}

fn trim_row(mut row: Vec<String>) -> Vec<String> {
    while row.last().is_some_and(|v| v.is_empty()) {
        row.pop();
    }
    row
}

/// The three-row header block at the top of every month tab.
const HEADER_DATA: &str = r##"가계부,,,,,,,,,
,,,,,,,,,
No,,날짜,대분류,중분류,소분류,상세,금액,결제수단,내용
"##;

/// Seed ledger rows. `{ym}` is replaced with the year and month of the tab.
const LEDGER_DATA: &str = r##"1,,{ym}-01,수입,고정수입,급여,노지혜 월급,"₩3,200,000",,월급
2,,{ym}-03,지출,변동지출,식비,외식,"₩45,000",현대카드(이),가족 외식
3,,{ym}-07,지출,변동지출,교통비,대중교통,"₩12,500",남구동행카드,
4,,{ym}-10,저축,단기,적금,여행대비,"₩300,000",,여행 적금
5,,{ym}-15,투자,ISA,자산관리,노지혜 ISA,"₩200,000",,ISA 납입
"##;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Cell;
    use uuid::Uuid;

    fn unique_sheet() -> TestSheet {
        TestSheet::new(Uuid::new_v4().to_string())
    }

    #[test]
    fn test_seed_data() {
        let state = TestSheetState::seeded();
        assert_eq!(state.tabs.len(), 12);
        let march = state.tabs.get("3월").unwrap();
        assert_eq!(march.len(), 8);
        assert!(march[1].is_empty());
        assert_eq!(march[2][7], "금액");
        assert_eq!(march[3][2], "2025-03-01");
        assert_eq!(march[3][7], "₩3,200,000");
        // The trailing empty description cell is not stored.
        assert_eq!(march[5].len(), 9);
    }

    #[tokio::test]
    async fn test_shared_state() {
        let mut a = unique_sheet();
        let b = TestSheet::new(a.id.clone());
        let mut state = TestSheetState::empty();
        state.set_tab("3월", vec![vec!["", "", "2025-03-01"]]);
        b.set_state(state);

        assert_eq!(a.tab_names().await.unwrap(), vec!["3월".to_string()]);
        assert_eq!(b.get_state().calls, vec![Call::TabNames]);
    }

    #[tokio::test]
    async fn test_column_trims_trailing_empties() {
        let mut sheet = unique_sheet();
        let mut state = TestSheetState::empty();
        state.set_tab(
            "1월",
            vec![vec!["", "", "2025-01-01"], vec!["", ""], vec!["", "", ""]],
        );
        sheet.set_state(state);
        let column = sheet.column("1월", Column::C).await.unwrap();
        assert_eq!(
            column,
            vec!["", "", "날짜", "2025-01-01"]
                .into_iter()
                .map(String::from)
                .collect::<Vec<_>>()
        );
    }

    #[tokio::test]
    async fn test_write_ranges() {
        let mut sheet = unique_sheet();
        let data = vec![
            SheetRange::single(Cell::new(Column::C, 21).on("5월"), "2025-05-02"),
            SheetRange::single(Cell::new(Column::H, 21).on("5월"), "1000"),
        ];
        sheet.write_ranges(&data).await.unwrap();

        let rows = sheet.get("5월").await.unwrap();
        assert_eq!(rows.len(), 21);
        assert_eq!(rows[20][2], "2025-05-02");
        assert_eq!(rows[20][7], "1000");
        assert!(rows[19].is_empty());

        let state = sheet.get_state();
        assert_eq!(state.writes(), vec![data.as_slice()]);
    }

    #[tokio::test]
    async fn test_write_to_missing_tab() {
        let mut sheet = unique_sheet();
        let data = vec![SheetRange::single("'13월'!C21", "x")];
        assert!(sheet.write_ranges(&data).await.is_err());
    }

    #[tokio::test]
    async fn test_fail() {
        let mut sheet = unique_sheet();
        let mut state = sheet.get_state();
        state.fail = true;
        sheet.set_state(state);
        assert!(sheet.get("1월").await.is_err());
        assert_eq!(sheet.get_state().calls, vec![Call::Get("1월".to_string())]);
    }
}
