//! Per-category deterministic checks.
//!
//! Each check scores one attribute category: start from the category ceiling,
//! subtract a fixed penalty per triggered pattern, floor at zero. Missing or
//! unparseable attributes yield a neutral score rather than an error — the
//! rule engine cannot fail.

use serde::{Deserialize, Serialize};

use crate::types::{Flag, Subject};

mod contact;
mod identity;
pub(crate) mod patterns;
mod web;

pub use contact::{EmailCheck, PhoneCheck};
pub use identity::{CompanyCheck, NameCheck};
pub use web::{IndustryCheck, WebsiteCheck};

/// Starting score for every category before penalties.
pub const CATEGORY_CEILING: f64 = 100.0;

/// Neutral score for a missing/unparseable attribute.
pub const NEUTRAL_SCORE: f64 = 50.0;

/// Attribute categories evaluated by the rule engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Name,
    Company,
    Email,
    Phone,
    Website,
    Industry,
}

impl Category {
    /// Fixed category weights. These sum to 1.0.
    pub fn weight(&self) -> f64 {
        match self {
            Category::Name => 0.20,
            Category::Company => 0.20,
            Category::Email => 0.20,
            Category::Phone => 0.15,
            Category::Website => 0.15,
            Category::Industry => 0.10,
        }
    }

    pub fn all() -> [Category; 6] {
        [
            Category::Name,
            Category::Company,
            Category::Email,
            Category::Phone,
            Category::Website,
            Category::Industry,
        ]
    }
}

/// Result of one category check.
#[derive(Debug, Clone)]
pub struct CategoryFinding {
    pub category: Category,

    /// Category score in [0, 100].
    pub score: f64,

    pub flags: Vec<Flag>,

    pub details: Vec<String>,
}

impl CategoryFinding {
    pub fn new(category: Category, score: f64) -> Self {
        Self {
            category,
            score: score.clamp(0.0, CATEGORY_CEILING),
            flags: Vec::new(),
            details: Vec::new(),
        }
    }

    /// Neutral finding for a missing attribute.
    pub fn neutral(category: Category, detail: impl Into<String>) -> Self {
        let mut finding = Self::new(category, NEUTRAL_SCORE);
        finding.details.push(detail.into());
        finding
    }
}

/// A deterministic check over one attribute category.
///
/// Checks are pure: no I/O, no failure path, same input always produces the
/// same finding.
pub trait CategoryCheck: Send + Sync {
    fn category(&self) -> Category;

    fn evaluate(&self, subject: &Subject) -> CategoryFinding;
}

/// Accumulates ceiling-minus-penalties scoring for one category.
pub(crate) struct PenaltyLedger {
    category: Category,
    score: f64,
    flags: Vec<Flag>,
    details: Vec<String>,
}

impl PenaltyLedger {
    pub fn new(category: Category) -> Self {
        Self {
            category,
            score: CATEGORY_CEILING,
            flags: Vec::new(),
            details: Vec::new(),
        }
    }

    pub fn penalize(&mut self, penalty: f64, flag: Flag) {
        self.score = (self.score - penalty).max(0.0);
        self.flags.push(flag);
    }

    pub fn note(&mut self, detail: impl Into<String>) {
        self.details.push(detail.into());
    }

    pub fn finish(self) -> CategoryFinding {
        CategoryFinding {
            category: self.category,
            score: self.score,
            flags: self.flags,
            details: self.details,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FlagSeverity;

    #[test]
    fn test_category_weights_sum_to_one() {
        let sum: f64 = Category::all().iter().map(|c| c.weight()).sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_ledger_floors_at_zero() {
        let mut ledger = PenaltyLedger::new(Category::Name);
        for _ in 0..5 {
            ledger.penalize(30.0, Flag::new("x", FlagSeverity::High, "test"));
        }
        let finding = ledger.finish();
        assert_eq!(finding.score, 0.0);
        assert_eq!(finding.flags.len(), 5);
    }

    #[test]
    fn test_neutral_finding() {
        let finding = CategoryFinding::neutral(Category::Phone, "phone missing");
        assert_eq!(finding.score, NEUTRAL_SCORE);
        assert!(finding.flags.is_empty());
    }
}
