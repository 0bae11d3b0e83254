//! The state of the entry form between page loads.
//!
//! A `FormSession` is one instance of the form. Every posted form carries the id of the instance
//! it was rendered from; once an entry is recorded the session is replaced by `next()`, so a page
//! rendered for an older instance can no longer change anything.

use crate::error::SubmissionError;
use crate::model::{Draft, Level, SelectionError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// One instance of the entry form.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct FormSession {
    id: u64,
    draft: Draft,
}

impl Default for FormSession {
    fn default() -> Self {
        Self::new()
    }
}

impl FormSession {
    /// The first instance: id 0 and an empty draft dated today.
    pub fn new() -> Self {
        Self::with_id(0)
    }

    fn with_id(id: u64) -> Self {
        Self {
            id,
            draft: Draft::today(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    /// A fresh, empty instance that replaces this one.
    pub fn next(&self) -> Self {
        Self::with_id(self.id + 1)
    }

    /// True if a form rendered with `form_id` belongs to this instance.
    pub fn is_current(&self, form_id: u64) -> bool {
        self.id == form_id
    }

    /// Copies the posted field values into the draft and applies the category change.
    ///
    /// When `input.changed` names a level, only that level's transition is applied, which clears
    /// the levels below it. Otherwise the whole selection is rebuilt from the posted values, top
    /// down. On error the draft is left unchanged.
    pub fn apply(&mut self, input: &FormInput) -> Result<(), Notice> {
        let mut draft = self.draft.clone();
        if let Some(date) = input.date()? {
            draft.date = date;
        }
        draft.amount = input.amount()?;
        draft.payment = non_empty(&input.payment).map(str::to_string);
        draft.description = input.description.trim().to_string();

        match input.changed()? {
            Some(level) => draft.selection.choose(level, input.category(level))?,
            None => {
                draft.selection = Default::default();
                draft.select_categories(input.categories())?;
            }
        }

        self.draft = draft;
        Ok(())
    }
}

/// What the form asks the server to do.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormAction {
    /// A dropdown changed, update the form.
    #[default]
    Select,
    /// Record the entry.
    Submit,
}

/// The fields of the posted entry form. Every value is the raw text of its input.
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormInput {
    pub form_id: u64,
    pub date: String,
    pub amount: String,
    pub payment: String,
    pub major: String,
    pub middle: String,
    pub sub: String,
    pub detail: String,
    pub description: String,
    /// The level whose dropdown just changed, if any.
    pub changed: String,
    pub action: FormAction,
}

impl FormInput {
    fn date(&self) -> Result<Option<NaiveDate>, Notice> {
        non_empty(&self.date)
            .map(|d| {
                NaiveDate::parse_from_str(d, "%Y-%m-%d")
                    .map_err(|_| Notice::Warning(format!("날짜 형식이 올바르지 않습니다: {d}")))
            })
            .transpose()
    }

    fn amount(&self) -> Result<Option<u64>, Notice> {
        non_empty(&self.amount)
            .map(|a| {
                a.replace(',', "")
                    .parse::<u64>()
                    .map_err(|_| Notice::Warning("금액은 0 이상의 정수로 입력해주세요.".to_string()))
            })
            .transpose()
    }

    fn changed(&self) -> Result<Option<Level>, Notice> {
        non_empty(&self.changed)
            .map(|c| {
                Level::from_str(c)
                    .map_err(|_| Notice::Error(format!("알 수 없는 항목입니다: {c}")))
            })
            .transpose()
    }

    fn category(&self, level: Level) -> Option<&str> {
        let value = match level {
            Level::Major => &self.major,
            Level::Middle => &self.middle,
            Level::Sub => &self.sub,
            Level::Detail => &self.detail,
        };
        non_empty(value)
    }

    fn categories(&self) -> [Option<&str>; 4] {
        Level::ALL.map(|level| self.category(level))
    }
}

fn non_empty(s: &str) -> Option<&str> {
    Some(s.trim()).filter(|s| !s.is_empty())
}

/// A message shown once at the top of the page.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum Notice {
    Success(String),
    Warning(String),
    Error(String),
}

impl Notice {
    pub fn text(&self) -> &str {
        match self {
            Notice::Success(text) | Notice::Warning(text) | Notice::Error(text) => text,
        }
    }

    /// The name used as the CSS class of the notice.
    pub fn kind(&self) -> &'static str {
        match self {
            Notice::Success(_) => "success",
            Notice::Warning(_) => "warning",
            Notice::Error(_) => "error",
        }
    }

    /// The notice shown after an entry was recorded in `month`.
    pub fn saved(month: &str) -> Self {
        Notice::Success(format!("{month} 시트에 저장되었습니다! 🎉"))
    }

    /// The notice shown when a post comes from a page rendered for an older form instance.
    pub fn stale() -> Self {
        Notice::Warning("이미 처리된 입력 화면입니다. 새 화면에서 다시 입력해주세요.".to_string())
    }
}

impl From<SubmissionError> for Notice {
    fn from(e: SubmissionError) -> Self {
        match e {
            SubmissionError::MissingField(_) | SubmissionError::InvalidSelection(_) => {
                Notice::Warning(e.user_message())
            }
            SubmissionError::TargetTableNotFound(_) | SubmissionError::RemoteStoreFailure(_) => {
                Notice::Error(e.user_message())
            }
        }
    }
}

impl From<SelectionError> for Notice {
    fn from(e: SelectionError) -> Self {
        SubmissionError::from(e).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Field;
    use crate::model::Major;

    fn input(form_id: u64) -> FormInput {
        FormInput {
            form_id,
            date: "2025-03-14".to_string(),
            amount: "12000".to_string(),
            payment: "현금".to_string(),
            major: "지출".to_string(),
            middle: "변동지출".to_string(),
            sub: "식비".to_string(),
            detail: "외식".to_string(),
            description: " 점심 ".to_string(),
            ..FormInput::default()
        }
    }

    #[test]
    fn test_new_and_next() {
        let session = FormSession::new();
        assert_eq!(session.id(), 0);
        assert!(session.draft().amount.is_none());
        assert!(session.is_current(0));

        let mut used = session.clone();
        used.apply(&input(0)).unwrap();
        let next = used.next();
        assert_eq!(next.id(), 1);
        assert!(!next.is_current(0));
        assert_eq!(next.draft().selection, Default::default());
        assert!(next.draft().amount.is_none());
    }

    #[test]
    fn test_apply_full_form() {
        let mut session = FormSession::new();
        session.apply(&input(0)).unwrap();
        let entry = session.draft().validate().unwrap();
        assert_eq!(entry.date, NaiveDate::from_ymd_opt(2025, 3, 14).unwrap());
        assert_eq!(entry.amount, 12000);
        assert_eq!(entry.major, Major::Expense);
        assert_eq!(entry.detail, "외식");
        assert_eq!(entry.description, "점심");
    }

    #[test]
    fn test_changed_major_resets_descendants() {
        let mut session = FormSession::new();
        session.apply(&input(0)).unwrap();

        // The browser still posts the old lower levels when the major changes.
        let mut changed = input(0);
        changed.major = "수입".to_string();
        changed.changed = "major".to_string();
        session.apply(&changed).unwrap();

        let selection = &session.draft().selection;
        assert_eq!(selection.major(), Some(Major::Income));
        assert!(selection.middle().is_none());
        assert!(selection.sub().is_none());
        assert!(selection.detail().is_none());
    }

    #[test]
    fn test_changed_sub_keeps_ancestors() {
        let mut session = FormSession::new();
        session.apply(&input(0)).unwrap();

        let mut changed = input(0);
        changed.sub = "문화".to_string();
        changed.changed = "sub".to_string();
        session.apply(&changed).unwrap();

        let selection = &session.draft().selection;
        assert_eq!(selection.middle(), Some("변동지출"));
        assert_eq!(selection.sub(), Some("문화"));
        assert!(selection.detail().is_none());
    }

    #[test]
    fn test_invalid_input_leaves_draft_unchanged() {
        let mut session = FormSession::new();
        session.apply(&input(0)).unwrap();
        let before = session.clone();

        let mut bad = input(0);
        bad.amount = "-5".to_string();
        assert!(matches!(session.apply(&bad), Err(Notice::Warning(_))));

        let mut bad = input(0);
        bad.middle = "자녀지출".to_string();
        assert!(matches!(session.apply(&bad), Err(Notice::Warning(_))));

        let mut bad = input(0);
        bad.changed = "nope".to_string();
        assert!(matches!(session.apply(&bad), Err(Notice::Error(_))));

        assert_eq!(session, before);
    }

    #[test]
    fn test_empty_fields() {
        let mut session = FormSession::new();
        let empty = FormInput::default();
        session.apply(&empty).unwrap();
        assert!(session.draft().amount.is_none());
        assert!(session.draft().payment.is_none());
        let err = session.draft().validate().unwrap_err();
        assert!(matches!(err, SubmissionError::MissingField(Field::Amount)));
    }

    #[test]
    fn test_notices() {
        let notice = Notice::from(SubmissionError::MissingField(Field::Detail));
        assert_eq!(notice, Notice::Warning("상세 항목을 선택해주세요.".to_string()));
        assert_eq!(notice.kind(), "warning");

        let notice = Notice::from(SubmissionError::TargetTableNotFound("3월".to_string()));
        assert_eq!(notice.text(), "'3월' 시트가 없습니다.");
        assert_eq!(notice.kind(), "error");

        assert_eq!(Notice::saved("3월").text(), "3월 시트에 저장되었습니다! 🎉");
    }
}
