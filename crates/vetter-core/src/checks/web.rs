//! Website and role/industry checks.

use crate::types::{Flag, FlagSeverity, Subject};

use super::patterns::{
    contains_keyword, FREE_HOSTING_DOMAINS, HIGH_ABUSE_TLDS, HIGH_RISK_INDUSTRY_KEYWORDS,
    IP_HOST_PATTERN, PLACEHOLDER_KEYWORDS, URL_PATTERN,
};
use super::{Category, CategoryCheck, CategoryFinding, PenaltyLedger};

/// Website shape and hosting check. No network calls — domain *reputation*
/// belongs to the external verification layer.
pub struct WebsiteCheck;

impl CategoryCheck for WebsiteCheck {
    fn category(&self) -> Category {
        Category::Website
    }

    fn evaluate(&self, subject: &Subject) -> CategoryFinding {
        let website = match subject.website.as_deref().map(str::trim) {
            Some(w) if !w.is_empty() => w,
            _ => return CategoryFinding::neutral(Category::Website, "website not provided"),
        };

        let mut ledger = PenaltyLedger::new(Category::Website);
        let lower = website.to_lowercase();

        if !URL_PATTERN.is_match(website) {
            ledger.penalize(
                30.0,
                Flag::new(
                    "website.malformed",
                    FlagSeverity::Medium,
                    format!("'{}' does not look like a URL", website),
                ),
            );
            return ledger.finish();
        }

        if IP_HOST_PATTERN.is_match(website) {
            ledger.penalize(
                20.0,
                Flag::new(
                    "website.ip_literal",
                    FlagSeverity::Medium,
                    "website host is a bare IP address",
                ),
            );
        }

        if HIGH_ABUSE_TLDS
            .iter()
            .any(|tld| trimmed_host(&lower).ends_with(tld))
        {
            ledger.penalize(
                25.0,
                Flag::new(
                    "website.abuse_tld",
                    FlagSeverity::Medium,
                    "website uses a high-abuse TLD",
                ),
            );
        }

        if FREE_HOSTING_DOMAINS.iter().any(|d| lower.contains(d)) {
            ledger.penalize(
                10.0,
                Flag::new(
                    "website.free_hosting",
                    FlagSeverity::Low,
                    "company site hosted on a free site builder",
                ),
            );
        }

        ledger.finish()
    }
}

/// Host portion of the URL, with scheme and path stripped.
fn trimmed_host(url: &str) -> &str {
    let without_scheme = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);
    without_scheme
        .split('/')
        .next()
        .unwrap_or(without_scheme)
}

/// Role/industry plausibility check.
pub struct IndustryCheck;

impl CategoryCheck for IndustryCheck {
    fn category(&self) -> Category {
        Category::Industry
    }

    fn evaluate(&self, subject: &Subject) -> CategoryFinding {
        let industry = subject.industry.as_deref().map(str::trim).unwrap_or("");
        let role = subject.role.as_deref().map(str::trim).unwrap_or("");

        if industry.is_empty() && role.is_empty() {
            return CategoryFinding::neutral(Category::Industry, "role/industry not provided");
        }

        let mut ledger = PenaltyLedger::new(Category::Industry);

        if contains_keyword(industry, &HIGH_RISK_INDUSTRY_KEYWORDS) {
            ledger.penalize(
                25.0,
                Flag::new(
                    "industry.high_risk",
                    FlagSeverity::Medium,
                    format!("declared industry '{}' is a high-risk vertical", industry),
                ),
            );
        }

        if !industry.is_empty() && contains_keyword(industry, &PLACEHOLDER_KEYWORDS) {
            ledger.penalize(
                15.0,
                Flag::new(
                    "industry.placeholder",
                    FlagSeverity::Low,
                    "industry is a placeholder value",
                ),
            );
        }

        if !role.is_empty() && contains_keyword(role, &PLACEHOLDER_KEYWORDS) {
            ledger.penalize(
                15.0,
                Flag::new(
                    "role.placeholder",
                    FlagSeverity::Low,
                    "role is a placeholder value",
                ),
            );
        }

        ledger.finish()
    }
}
