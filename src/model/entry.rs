//! The in-progress form (`Draft`) and the validated record it turns into (`Entry`).

use crate::error::{Field, SubmissionError};
use crate::model::cell::{self, Column};
use crate::model::selection::{Level, Selection, SelectionError};
use crate::model::taxonomy::{self, Major};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Everything the user has filled in so far. Any field may still be empty.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Draft {
    pub date: NaiveDate,
    pub amount: Option<u64>,
    pub payment: Option<String>,
    pub description: String,
    pub selection: Selection,
}

impl Draft {
    /// An empty draft dated `date`.
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            amount: None,
            payment: None,
            description: String::new(),
            selection: Selection::new(),
        }
    }

    /// An empty draft dated today, local time.
    pub fn today() -> Self {
        Self::new(chrono::Local::now().date_naive())
    }

    /// Applies category labels from the top level down, exactly as if each dropdown had been
    /// picked in turn. Stops at the first absent level, so the levels below it stay empty.
    pub fn select_categories(
        &mut self,
        labels: [Option<&str>; 4],
    ) -> Result<(), SubmissionError> {
        for (level, label) in Level::ALL.into_iter().zip(labels) {
            match label.map(str::trim).filter(|l| !l.is_empty()) {
                Some(label) => self.selection.choose(level, Some(label))?,
                None => break,
            }
        }
        Ok(())
    }

    /// Checks the required fields in order and reports the first one that is missing.
    pub fn validate(&self) -> Result<Entry, SubmissionError> {
        let amount = self
            .amount
            .ok_or(SubmissionError::MissingField(Field::Amount))?;
        let payment = self
            .payment
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .ok_or(SubmissionError::MissingField(Field::PaymentMethod))?;
        let s = &self.selection;
        let major = s
            .major()
            .ok_or(SubmissionError::MissingField(Field::Major))?;
        let middle = s
            .middle()
            .ok_or(SubmissionError::MissingField(Field::Middle))?;
        let sub = s.sub().ok_or(SubmissionError::MissingField(Field::Sub))?;
        let detail = s
            .detail()
            .ok_or(SubmissionError::MissingField(Field::Detail))?;
        // A deserialized selection has not been through the transitions.
        if !taxonomy::contains_path(major, middle, sub, detail) {
            return Err(SelectionError::UnknownOption {
                level: Level::Detail,
                value: detail.to_string(),
            }
            .into());
        }
        Ok(Entry {
            date: self.date,
            amount,
            payment: payment.to_string(),
            major,
            middle: middle.to_string(),
            sub: sub.to_string(),
            detail: detail.to_string(),
            description: self.description.clone(),
        })
    }
}

impl Default for Draft {
    fn default() -> Self {
        Self::today()
    }
}

/// A complete, validated ledger record.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub date: NaiveDate,
    pub amount: u64,
    pub payment: String,
    pub major: Major,
    pub middle: String,
    pub sub: String,
    pub detail: String,
    pub description: String,
}

impl Entry {
    /// The month tab this entry belongs in.
    pub fn month_tab(&self) -> String {
        cell::month_tab(self.date)
    }

    /// The six cells of a ledger row: date, major, detail, amount, payment method, description.
    /// Middle and sub are not written, the sheet derives them.
    pub fn cells(&self) -> [(Column, String); 6] {
        [
            (Column::C, self.date.format("%Y-%m-%d").to_string()),
            (Column::D, self.major.label().to_string()),
            (Column::G, self.detail.clone()),
            (Column::H, self.amount.to_string()),
            (Column::I, self.payment.clone()),
            (Column::J, self.description.clone()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 11, 3).unwrap()
    }

    fn complete() -> Draft {
        let mut d = Draft::new(date());
        d.amount = Some(12000);
        d.payment = Some("현금".to_string());
        d.description = "점심".to_string();
        d.select_categories([Some("지출"), Some("변동지출"), Some("식비"), Some("외식")])
            .unwrap();
        d
    }

    fn missing(d: &Draft) -> Field {
        match d.validate() {
            Err(SubmissionError::MissingField(f)) => f,
            other => panic!("expected a missing field, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_complete() {
        let entry = complete().validate().unwrap();
        assert_eq!(entry.amount, 12000);
        assert_eq!(entry.major, Major::Expense);
        assert_eq!(entry.detail, "외식");
        assert_eq!(entry.month_tab(), "11월");
    }

    #[test]
    fn test_validation_order() {
        let mut d = Draft::new(date());
        assert_eq!(missing(&d), Field::Amount);
        d.amount = Some(0);
        assert_eq!(missing(&d), Field::PaymentMethod);
        d.payment = Some("  ".to_string());
        assert_eq!(missing(&d), Field::PaymentMethod);
        d.payment = Some("현금".to_string());
        assert_eq!(missing(&d), Field::Major);
        d.select_categories([Some("지출"), None, None, None]).unwrap();
        assert_eq!(missing(&d), Field::Middle);
        d.select_categories([Some("지출"), Some("변동지출"), None, None])
            .unwrap();
        assert_eq!(missing(&d), Field::Sub);
        d.select_categories([Some("지출"), Some("변동지출"), Some("식비"), None])
            .unwrap();
        assert_eq!(missing(&d), Field::Detail);
    }

    #[test]
    fn test_amount_is_checked_before_everything_else() {
        let mut d = complete();
        d.amount = None;
        d.payment = None;
        assert_eq!(missing(&d), Field::Amount);
    }

    #[test]
    fn test_select_categories_stops_at_gap() {
        let mut d = Draft::new(date());
        d.select_categories([Some("지출"), None, Some("식비"), Some("외식")])
            .unwrap();
        assert_eq!(d.selection.major(), Some(Major::Expense));
        assert!(d.selection.sub().is_none());
    }

    #[test]
    fn test_select_categories_rejects_bad_path() {
        let mut d = Draft::new(date());
        let err = d
            .select_categories([Some("수입"), Some("변동지출"), None, None])
            .unwrap_err();
        assert!(matches!(err, SubmissionError::InvalidSelection(_)));
    }

    #[test]
    fn test_validate_rejects_deserialized_bad_path() {
        let mut d = complete();
        d.selection = serde_json::from_value(serde_json::json!({
            "major": "지출",
            "middle": "변동지출",
            "sub": "식비",
            "detail": "첫째교육"
        }))
        .unwrap();
        let err = d.validate().unwrap_err();
        assert!(matches!(err, SubmissionError::InvalidSelection(_)));
    }

    #[test]
    fn test_cells() {
        let cells = complete().validate().unwrap().cells();
        let expected = [
            (Column::C, "2025-11-03"),
            (Column::D, "지출"),
            (Column::G, "외식"),
            (Column::H, "12000"),
            (Column::I, "현금"),
            (Column::J, "점심"),
        ];
        for ((col, value), (want_col, want_value)) in cells.iter().zip(expected) {
            assert_eq!(*col, want_col);
            assert_eq!(value, want_value);
        }
    }
}
