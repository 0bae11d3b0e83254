//! The fixed category taxonomy and payment-method list of the household ledger.
//!
//! Categories have four levels: Major → Middle → Sub → Detail. The majors are a closed set and are
//! modelled by [`Major`]; the lower levels are labels. Every child list keeps its declaration
//! order, which is the order the dropdowns show.

use serde::{Deserialize, Serialize};

/// The details of one sub category.
type Details = &'static [&'static str];

/// The subs of one middle category, each with its details.
type Subs = &'static [(&'static str, Details)];

/// The middles of one major category, each with its subs.
type Middles = &'static [(&'static str, Subs)];

/// The top level of the taxonomy. The text form is the label written to the sheet.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum Major {
    #[serde(rename = "수입", alias = "income")]
    Income,
    #[serde(rename = "지출", alias = "expense")]
    Expense,
    #[serde(rename = "저축", alias = "saving")]
    Saving,
    #[serde(rename = "투자", alias = "investment", alias = "invest")]
    Investment,
}

serde_plain::derive_display_from_serialize!(Major);
serde_plain::derive_fromstr_from_deserialize!(Major);

impl Major {
    /// All majors in dropdown order.
    pub const ALL: [Major; 4] = [
        Major::Income,
        Major::Expense,
        Major::Saving,
        Major::Investment,
    ];

    /// The label written to, and read back from, the major column of a month tab.
    pub fn label(&self) -> &'static str {
        match self {
            Major::Income => "수입",
            Major::Expense => "지출",
            Major::Saving => "저축",
            Major::Investment => "투자",
        }
    }

    /// Finds the major whose sheet label is exactly `label`.
    pub fn from_label(label: &str) -> Option<Major> {
        Major::ALL.into_iter().find(|m| m.label() == label)
    }

    fn middles(&self) -> Middles {
        match self {
            Major::Income => INCOME,
            Major::Expense => EXPENSE,
            Major::Saving => SAVING,
            Major::Investment => INVESTMENT,
        }
    }
}

const INCOME: Middles = &[
    ("고정수입", &[("급여", &["노지혜 월급", "이일권 월급"])]),
    (
        "기타수입",
        &[
            ("기타소득", &["기타소득", "보험", "상생체크캐쉬백"]),
            ("상품권", &["상품권"]),
        ],
    ),
    (
        "변동수입",
        &[
            ("급여", &["이일권 상여금"]),
            ("민생지원금", &["소비쿠폰"]),
            ("상생카드", &["KJ카드캐쉬백"]),
            ("상생페이백", &["디지털온누리상품권"]),
            ("앱테크", &["애드포스트"]),
        ],
    ),
];

const EXPENSE: Middles = &[
    (
        "변동지출",
        &[
            ("식비", &["간식", "식자재", "외식", "포장/배달"]),
            ("지원", &["부모님"]),
            ("건강", &["건강", "병원/약국"]),
            ("경조사", &["경조사비"]),
            ("교통비", &["대중교통", "차량관련"]),
            ("기타지출", &["기타지출"]),
            ("대출상환", &["아파트 원금", "아파트 이자"]),
            ("문화", &["등산", "여가생활", "여행", "카페", "캠핑"]),
            ("미용", &["의류/헤어", "화장품"]),
            ("생활비", &["생활용품"]),
            ("세금", &["세금"]),
            ("숙박비", &["숙소"]),
        ],
    ),
    (
        "자녀지출",
        &[
            ("교육비", &["둘째교육", "막내교육", "첫째교육"]),
            ("자녀기타", &["둘째기타", "막내기타", "첫째기타"]),
        ],
    ),
];

const SAVING: Middles = &[
    ("단기", &[("적금", &["여행대비", "의료비(단기)"])]),
    ("장기", &[("예금", &["노후대비", "의료비(장기)"])]),
];

const INVESTMENT: Middles = &[
    ("연금", &[("개인연금저축", &["노지혜 연금", "이일권 연금"])]),
    ("주식", &[("주식", &["노지혜주식"])]),
    ("IRP", &[("개인퇴직연금", &["노지혜 IRP", "이일권 IRP"])]),
    ("ISA", &[("자산관리", &["노지혜 ISA"])]),
];

/// The payment methods in dropdown order.
pub const PAYMENT_METHODS: &[&str] = &[
    "현대카드(이)",
    "현대카드(노)",
    "하나카드(노)",
    "광주체크카드(노)",
    "남구동행카드",
    "현금",
    "소비쿠폰(이)",
    "소비쿠폰(노)",
    "디지털온누리(이)",
    "디지털온누리(노)",
    "상생카드(이)",
    "상생카드(노)",
    "선불카드",
    "상품권",
];

/// The payment methods in dropdown order.
pub fn payment_methods() -> Vec<&'static str> {
    PAYMENT_METHODS.to_vec()
}

pub fn is_payment_method(label: &str) -> bool {
    PAYMENT_METHODS.contains(&label)
}

/// The major labels in dropdown order.
pub fn majors() -> Vec<&'static str> {
    Major::ALL.iter().map(Major::label).collect()
}

/// The middle labels of `major`.
pub fn middles(major: Major) -> Vec<&'static str> {
    major.middles().iter().map(|(name, _)| *name).collect()
}

/// The sub labels of `middle` within `major`. Empty if `middle` does not belong to `major`.
pub fn subs(major: Major, middle: &str) -> Vec<&'static str> {
    find_subs(major, middle)
        .map(|subs| subs.iter().map(|(name, _)| *name).collect())
        .unwrap_or_default()
}

/// The detail labels of `sub`. Empty if the path `major` → `middle` → `sub` does not exist.
pub fn details(major: Major, middle: &str, sub: &str) -> Vec<&'static str> {
    find_details(major, middle, sub)
        .map(|details| details.to_vec())
        .unwrap_or_default()
}

/// Returns the child labels at the level below the given ancestors.
///
/// - No ancestors: the major labels.
/// - `[major]`: its middles.
/// - `[major, middle]`: its subs.
/// - `[major, middle, sub]`: its details.
///
/// If any ancestor is unknown, or four or more ancestors are given (details have no children), the
/// result is empty.
pub fn options(ancestors: &[&str]) -> Vec<&'static str> {
    match ancestors {
        [] => majors(),
        [major, rest @ ..] => {
            let Some(major) = Major::from_label(major) else {
                return Vec::new();
            };
            match rest {
                [] => middles(major),
                [middle] => subs(major, middle),
                [middle, sub] => details(major, middle, sub),
                _ => Vec::new(),
            }
        }
    }
}

/// Returns true if `major` → `middle` → `sub` → `detail` is a declared category path.
pub fn contains_path(major: Major, middle: &str, sub: &str, detail: &str) -> bool {
    find_details(major, middle, sub)
        .map(|details| details.contains(&detail))
        .unwrap_or(false)
}

fn find_subs(major: Major, middle: &str) -> Option<Subs> {
    major
        .middles()
        .iter()
        .find(|(name, _)| *name == middle)
        .map(|(_, subs)| *subs)
}

fn find_details(major: Major, middle: &str, sub: &str) -> Option<Details> {
    find_subs(major, middle)?
        .iter()
        .find(|(name, _)| *name == sub)
        .map(|(_, details)| *details)
}
