//! Identity checks: personal name and company name.

use crate::types::{Flag, FlagSeverity, Subject};

use super::patterns::{
    contains_keyword, has_repeated_run, DIGIT_PATTERN, PLACEHOLDER_KEYWORDS,
    SUSPICIOUS_COMPANY_KEYWORDS,
};
use super::{Category, CategoryCheck, CategoryFinding, PenaltyLedger};

/// Personal-name check.
pub struct NameCheck;

impl CategoryCheck for NameCheck {
    fn category(&self) -> Category {
        Category::Name
    }

    fn evaluate(&self, subject: &Subject) -> CategoryFinding {
        let name = subject.full_name.trim();
        if name.is_empty() {
            return CategoryFinding::neutral(Category::Name, "name not provided");
        }

        let mut ledger = PenaltyLedger::new(Category::Name);

        if contains_keyword(name, &PLACEHOLDER_KEYWORDS) {
            ledger.penalize(
                30.0,
                Flag::new(
                    "name.placeholder",
                    FlagSeverity::High,
                    format!("name '{}' matches a placeholder keyword", name),
                ),
            );
        }

        if DIGIT_PATTERN.is_match(name) {
            ledger.penalize(
                20.0,
                Flag::new(
                    "name.digits",
                    FlagSeverity::Medium,
                    "name contains digits",
                ),
            );
        }

        if has_repeated_run(name, 4) {
            ledger.penalize(
                20.0,
                Flag::new(
                    "name.repetition",
                    FlagSeverity::Medium,
                    "name contains a suspicious character run",
                ),
            );
        }

        // Single-token or very short names are weak but not damning.
        if name.len() < 3 || !name.contains(char::is_whitespace) {
            ledger.penalize(
                15.0,
                Flag::new(
                    "name.incomplete",
                    FlagSeverity::Low,
                    "name is very short or missing a surname",
                ),
            );
        }

        ledger.finish()
    }
}

/// Company-name check.
pub struct CompanyCheck;

impl CategoryCheck for CompanyCheck {
    fn category(&self) -> Category {
        Category::Company
    }

    fn evaluate(&self, subject: &Subject) -> CategoryFinding {
        let company = subject.company_name.trim();
        if company.is_empty() {
            return CategoryFinding::neutral(Category::Company, "company not provided");
        }

        let mut ledger = PenaltyLedger::new(Category::Company);

        if contains_keyword(company, &PLACEHOLDER_KEYWORDS) {
            ledger.penalize(
                30.0,
                Flag::new(
                    "company.placeholder",
                    FlagSeverity::High,
                    format!("company '{}' matches a placeholder keyword", company),
                ),
            );
        }

        if contains_keyword(company, &SUSPICIOUS_COMPANY_KEYWORDS) {
            ledger.penalize(
                30.0,
                Flag::new(
                    "company.scam_phrase",
                    FlagSeverity::High,
                    "company name matches a known scam phrase",
                ),
            );
        }

        if has_repeated_run(company, 4) {
            ledger.penalize(
                20.0,
                Flag::new(
                    "company.repetition",
                    FlagSeverity::Medium,
                    "company name contains a suspicious character run",
                ),
            );
        }

        if company.len() < 3 {
            ledger.penalize(
                15.0,
                Flag::new(
                    "company.too_short",
                    FlagSeverity::Low,
                    "company name is implausibly short",
                ),
            );
        }

        ledger.finish()
    }
}
