use crate::model::SelectionError;
use serde::Serialize;

pub type Error = anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// The form fields that must be filled in before an entry can be recorded, in the order they are
/// checked.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Amount,
    PaymentMethod,
    Major,
    Middle,
    Sub,
    Detail,
}

serde_plain::derive_display_from_serialize!(Field);

impl Field {
    /// The message shown to the user when this field is missing.
    pub fn prompt(&self) -> &'static str {
        match self {
            Field::Amount => "금액을 입력해주세요.",
            Field::PaymentMethod => "결제수단을 선택해주세요.",
            Field::Major => "대분류를 선택해주세요.",
            Field::Middle => "중분류를 선택해주세요.",
            Field::Sub => "소분류를 선택해주세요.",
            Field::Detail => "상세 항목을 선택해주세요.",
        }
    }
}

/// Why an entry was not recorded. In every case nothing was written to the sheet.
#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    /// A required field is empty. No remote call was made.
    #[error("missing field: {0}")]
    MissingField(Field),

    /// The categories given do not form a declared path. No remote call was made.
    #[error("invalid category selection: {0}")]
    InvalidSelection(#[from] SelectionError),

    /// The spreadsheet has no tab for the entry's month.
    #[error("the spreadsheet has no '{0}' tab")]
    TargetTableNotFound(String),

    /// Any other failure talking to the spreadsheet.
    #[error("remote store failure: {0:#}")]
    RemoteStoreFailure(Error),
}

impl SubmissionError {
    /// A stable name for the kind of error, used in API responses.
    pub fn kind(&self) -> &'static str {
        match self {
            SubmissionError::MissingField(_) => "missing_field",
            SubmissionError::InvalidSelection(_) => "invalid_selection",
            SubmissionError::TargetTableNotFound(_) => "target_table_not_found",
            SubmissionError::RemoteStoreFailure(_) => "remote_store_failure",
        }
    }

    /// The message shown to the user on the entry form.
    pub fn user_message(&self) -> String {
        match self {
            SubmissionError::MissingField(field) => field.prompt().to_string(),
            SubmissionError::InvalidSelection(e) => format!("분류를 다시 선택해주세요. ({e})"),
            SubmissionError::TargetTableNotFound(tab) => format!("'{tab}' 시트가 없습니다."),
            SubmissionError::RemoteStoreFailure(e) => format!("저장 중 오류: {e:#}"),
        }
    }
}
