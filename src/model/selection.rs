//! The cascading four-level category selection.
//!
//! A `Selection` can only be changed through its transition functions, which keep it
//! prefix-consistent: a value at one level implies values at every level above it, and every
//! value is a declared child of the level above. Choosing (or clearing) a level clears every level
//! below it, so a stale child can never survive a change to its ancestor.

use crate::model::taxonomy::{self, Major};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// One of the four category levels, from the top.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Major,
    Middle,
    Sub,
    Detail,
}

serde_plain::derive_display_from_serialize!(Level);
serde_plain::derive_fromstr_from_deserialize!(Level);

impl Level {
    pub const ALL: [Level; 4] = [Level::Major, Level::Middle, Level::Sub, Level::Detail];

    /// The dropdown caption of this level.
    pub fn caption(&self) -> &'static str {
        match self {
            Level::Major => "대분류",
            Level::Middle => "중분류",
            Level::Sub => "소분류",
            Level::Detail => "상세",
        }
    }
}

/// Why a transition was refused. The selection is left unchanged.
#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
pub enum SelectionError {
    /// A level was chosen before the level above it.
    #[error("the {0} category must be chosen first")]
    AncestorMissing(Level),

    /// The value is not a child of the currently selected ancestors.
    #[error("'{value}' is not a valid {level} category here")]
    UnknownOption { level: Level, value: String },
}

/// The in-progress category choice.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    major: Option<Major>,
    middle: Option<String>,
    sub: Option<String>,
    detail: Option<String>,
}

impl Selection {
    /// An empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn major(&self) -> Option<Major> {
        self.major
    }

    pub fn middle(&self) -> Option<&str> {
        self.middle.as_deref()
    }

    pub fn sub(&self) -> Option<&str> {
        self.sub.as_deref()
    }

    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    /// The selected label at `level`.
    pub fn get(&self, level: Level) -> Option<&str> {
        match level {
            Level::Major => self.major.map(|m| m.label()),
            Level::Middle => self.middle(),
            Level::Sub => self.sub(),
            Level::Detail => self.detail(),
        }
    }

    /// True when all four levels are chosen.
    pub fn is_complete(&self) -> bool {
        self.detail.is_some()
    }

    /// The valid choices at `level` given the current ancestors. Empty when an ancestor is
    /// missing.
    pub fn options(&self, level: Level) -> Vec<&'static str> {
        let ancestors: Vec<&str> = Level::ALL
            .iter()
            .take_while(|l| **l < level)
            .map_while(|l| self.get(*l))
            .collect();
        if ancestors.len() != level as usize {
            return Vec::new();
        }
        taxonomy::options(&ancestors)
    }

    /// Sets the major category, or clears it with `None`, and clears every level below.
    pub fn choose_major(&mut self, major: Option<Major>) {
        self.major = major;
        self.clear_below(Level::Major);
    }

    /// Sets the middle category, or clears it with `None`, and clears sub and detail.
    pub fn choose_middle(&mut self, middle: Option<&str>) -> Result<(), SelectionError> {
        let middle = self.validate(Level::Middle, middle)?;
        self.middle = middle;
        self.clear_below(Level::Middle);
        Ok(())
    }

    /// Sets the sub category, or clears it with `None`, and clears detail.
    pub fn choose_sub(&mut self, sub: Option<&str>) -> Result<(), SelectionError> {
        let sub = self.validate(Level::Sub, sub)?;
        self.sub = sub;
        self.clear_below(Level::Sub);
        Ok(())
    }

    /// Sets the detail category, or clears it with `None`.
    pub fn choose_detail(&mut self, detail: Option<&str>) -> Result<(), SelectionError> {
        let detail = self.validate(Level::Detail, detail)?;
        self.detail = detail;
        Ok(())
    }

    /// Applies the transition for `level`. An empty or absent `value` clears the level.
    pub fn choose(&mut self, level: Level, value: Option<&str>) -> Result<(), SelectionError> {
        let value = value.map(str::trim).filter(|v| !v.is_empty());
        match level {
            Level::Major => {
                let major = value
                    .map(|v| {
                        Major::from_str(v).map_err(|_| SelectionError::UnknownOption {
                            level,
                            value: v.to_string(),
                        })
                    })
                    .transpose()?;
                self.choose_major(major);
                Ok(())
            }
            Level::Middle => self.choose_middle(value),
            Level::Sub => self.choose_sub(value),
            Level::Detail => self.choose_detail(value),
        }
    }

    /// Clears `level` and every level below it. Levels above are untouched.
    pub fn clear(&mut self, level: Level) {
        match level {
            Level::Major => self.major = None,
            Level::Middle => self.middle = None,
            Level::Sub => self.sub = None,
            Level::Detail => self.detail = None,
        }
        self.clear_below(level);
    }

    fn clear_below(&mut self, level: Level) {
        if level < Level::Middle {
            self.middle = None;
        }
        if level < Level::Sub {
            self.sub = None;
        }
        if level < Level::Detail {
            self.detail = None;
        }
    }

    /// Checks that the level above `level` is chosen and that `value` is one of its children.
    /// Clearing only needs the first check to pass.
    fn validate(
        &self,
        level: Level,
        value: Option<&str>,
    ) -> Result<Option<String>, SelectionError> {
        let parent = Level::ALL[level as usize - 1];
        if self.get(parent).is_none() {
            return Err(SelectionError::AncestorMissing(parent));
        }
        match value {
            None => Ok(None),
            Some(v) if self.options(level).contains(&v) => Ok(Some(v.to_string())),
            Some(v) => Err(SelectionError::UnknownOption {
                level,
                value: v.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full() -> Selection {
        let mut s = Selection::new();
        s.choose_major(Some(Major::Expense));
        s.choose_middle(Some("변동지출")).unwrap();
        s.choose_sub(Some("식비")).unwrap();
        s.choose_detail(Some("외식")).unwrap();
        s
    }

    /// One selection for each of the five reachable states.
    fn reachable() -> Vec<Selection> {
        let mut states = vec![Selection::new()];
        let mut s = Selection::new();
        s.choose_major(Some(Major::Saving));
        states.push(s.clone());
        s.choose_middle(Some("장기")).unwrap();
        states.push(s.clone());
        s.choose_sub(Some("예금")).unwrap();
        states.push(s.clone());
        s.choose_detail(Some("노후대비")).unwrap();
        states.push(s);
        states
    }

    fn assert_prefix_consistent(s: &Selection) {
        let filled: Vec<bool> = Level::ALL.iter().map(|l| s.get(*l).is_some()).collect();
        for pair in filled.windows(2) {
            assert!(pair[0] || !pair[1], "not prefix-consistent: {s:?}");
        }
    }

    #[test]
    fn test_initial_state_is_empty() {
        let s = Selection::new();
        for level in Level::ALL {
            assert!(s.get(level).is_none());
        }
        assert!(!s.is_complete());
    }

    #[test]
    fn test_full_selection() {
        let s = full();
        assert!(s.is_complete());
        assert_eq!(s.major(), Some(Major::Expense));
        assert_eq!(s.middle(), Some("변동지출"));
        assert_eq!(s.sub(), Some("식비"));
        assert_eq!(s.detail(), Some("외식"));
    }

    #[test]
    fn test_clear_cascades_down_only() {
        for state in reachable() {
            for level in Level::ALL {
                let mut s = state.clone();
                s.clear(level);
                for other in Level::ALL {
                    if other < level {
                        assert_eq!(s.get(other), state.get(other));
                    } else {
                        assert!(s.get(other).is_none());
                    }
                }
                assert_prefix_consistent(&s);
            }
        }
    }

    #[test]
    fn test_choose_major_resets_descendants() {
        let mut s = full();
        s.choose_major(Some(Major::Income));
        assert_eq!(s.major(), Some(Major::Income));
        assert!(s.middle().is_none());
        assert!(s.sub().is_none());
        assert!(s.detail().is_none());
    }

    #[test]
    fn test_choose_same_major_still_resets() {
        let mut s = full();
        s.choose_major(Some(Major::Expense));
        assert!(s.middle().is_none());
    }

    #[test]
    fn test_choose_middle_resets_sub_and_detail() {
        let mut s = full();
        s.choose_middle(Some("자녀지출")).unwrap();
        assert_eq!(s.major(), Some(Major::Expense));
        assert_eq!(s.middle(), Some("자녀지출"));
        assert!(s.sub().is_none());
        assert!(s.detail().is_none());
    }

    #[test]
    fn test_choose_sub_resets_detail() {
        let mut s = full();
        s.choose_sub(Some("문화")).unwrap();
        assert_eq!(s.sub(), Some("문화"));
        assert!(s.detail().is_none());
    }

    #[test]
    fn test_choose_requires_ancestors() {
        let mut s = Selection::new();
        assert_eq!(
            s.choose_middle(Some("변동지출")),
            Err(SelectionError::AncestorMissing(Level::Major))
        );
        s.choose_major(Some(Major::Expense));
        assert_eq!(
            s.choose_detail(Some("외식")),
            Err(SelectionError::AncestorMissing(Level::Sub))
        );
        assert_eq!(s, {
            let mut expected = Selection::new();
            expected.choose_major(Some(Major::Expense));
            expected
        });
    }

    #[test]
    fn test_choose_rejects_foreign_child() {
        let mut s = full();
        let before = s.clone();
        let err = s.choose_detail(Some("캠핑")).unwrap_err();
        assert_eq!(
            err,
            SelectionError::UnknownOption {
                level: Level::Detail,
                value: "캠핑".to_string()
            }
        );
        assert_eq!(s, before);
    }

    #[test]
    fn test_choose_dispatch() {
        let mut s = Selection::new();
        s.choose(Level::Major, Some("투자")).unwrap();
        s.choose(Level::Middle, Some("ISA")).unwrap();
        s.choose(Level::Sub, Some("자산관리")).unwrap();
        s.choose(Level::Detail, Some("노지혜 ISA")).unwrap();
        assert!(s.is_complete());

        // An empty value clears the level and everything below it.
        s.choose(Level::Middle, Some("")).unwrap();
        assert_eq!(s.major(), Some(Major::Investment));
        assert!(s.middle().is_none());
        assert!(s.detail().is_none());

        assert!(s.choose(Level::Major, Some("bogus")).is_err());
        assert_eq!(s.major(), Some(Major::Investment));
    }

    #[test]
    fn test_options_follow_selection() {
        let mut s = Selection::new();
        assert_eq!(s.options(Level::Major).len(), 4);
        assert!(s.options(Level::Middle).is_empty());
        s.choose_major(Some(Major::Saving));
        assert_eq!(s.options(Level::Middle), vec!["단기", "장기"]);
        assert!(s.options(Level::Sub).is_empty());
        s.choose_middle(Some("단기")).unwrap();
        assert_eq!(s.options(Level::Sub), vec!["적금"]);
        s.choose_sub(Some("적금")).unwrap();
        assert_eq!(s.options(Level::Detail), vec!["여행대비", "의료비(단기)"]);
    }

    #[test]
    fn test_every_transition_keeps_prefix_consistency() {
        for state in reachable() {
            for level in Level::ALL {
                for value in [None, Some("단기"), Some("예금"), Some("노후대비"), Some("저축")] {
                    let mut s = state.clone();
                    let _ = s.choose(level, value);
                    assert_prefix_consistent(&s);
                }
            }
        }
    }
}
