//! Contact-channel checks: email and phone.

use crate::types::{Flag, FlagSeverity, Subject};

use super::patterns::{
    email_domain, has_repeated_run, has_sequential_digits, DISPOSABLE_EMAIL_DOMAINS,
    EMAIL_PATTERN, FREE_EMAIL_DOMAINS,
};
use super::{Category, CategoryCheck, CategoryFinding, PenaltyLedger};

/// Email format and provenance check.
pub struct EmailCheck;

impl CategoryCheck for EmailCheck {
    fn category(&self) -> Category {
        Category::Email
    }

    fn evaluate(&self, subject: &Subject) -> CategoryFinding {
        let email = match subject.contact.email.as_deref().map(str::trim) {
            Some(e) if !e.is_empty() => e,
            _ => return CategoryFinding::neutral(Category::Email, "email not provided"),
        };

        let mut ledger = PenaltyLedger::new(Category::Email);

        if !EMAIL_PATTERN.is_match(email) {
            ledger.penalize(
                40.0,
                Flag::new(
                    "email.malformed",
                    FlagSeverity::High,
                    format!("'{}' is not a valid email address", email),
                ),
            );
            // No domain to inspect on a malformed address.
            return ledger.finish();
        }

        if let Some(domain) = email_domain(email) {
            if DISPOSABLE_EMAIL_DOMAINS.contains(&domain.as_str()) {
                ledger.penalize(
                    35.0,
                    Flag::new(
                        "email.disposable",
                        FlagSeverity::High,
                        format!("disposable mailbox domain '{}'", domain),
                    ),
                );
            } else if FREE_EMAIL_DOMAINS.contains(&domain.as_str())
                && !subject.company_name.trim().is_empty()
            {
                ledger.penalize(
                    10.0,
                    Flag::new(
                        "email.free_provider",
                        FlagSeverity::Low,
                        "business contact uses a consumer mail provider",
                    ),
                );
            } else {
                ledger.note(format!("email domain '{}'", domain));
            }
        }

        ledger.finish()
    }
}

/// Phone format check.
pub struct PhoneCheck;

impl CategoryCheck for PhoneCheck {
    fn category(&self) -> Category {
        Category::Phone
    }

    fn evaluate(&self, subject: &Subject) -> CategoryFinding {
        let phone = match subject.contact.phone.as_deref().map(str::trim) {
            Some(p) if !p.is_empty() => p,
            _ => return CategoryFinding::neutral(Category::Phone, "phone not provided"),
        };

        let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();

        let mut ledger = PenaltyLedger::new(Category::Phone);

        if digits.len() < 7 || digits.len() > 15 {
            ledger.penalize(
                35.0,
                Flag::new(
                    "phone.invalid_length",
                    FlagSeverity::High,
                    format!("{} digits is outside the plausible range", digits.len()),
                ),
            );
            return ledger.finish();
        }

        if has_repeated_run(&digits, 6) {
            ledger.penalize(
                25.0,
                Flag::new(
                    "phone.repetition",
                    FlagSeverity::Medium,
                    "phone is dominated by a single repeated digit",
                ),
            );
        }

        if has_sequential_digits(&digits, 6) {
            ledger.penalize(
                15.0,
                Flag::new(
                    "phone.sequential",
                    FlagSeverity::Low,
                    "phone digits form a sequential run",
                ),
            );
        }

        ledger.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ContactChannels;

    fn subject_with_contact(email: Option<&str>, phone: Option<&str>) -> Subject {
        Subject {
            id: "s-1".to_string(),
            full_name: "Jane Doe".to_string(),
            company_name: "Acme".to_string(),
            contact: ContactChannels {
                email: email.map(String::from),
                phone: phone.map(String::from),
            },
            role: None,
            industry: None,
            website: None,
        }
    }

    #[test]
    fn test_valid_corporate_email() {
        let finding = EmailCheck.evaluate(&subject_with_contact(Some("jane@acme.com"), None));
        assert_eq!(finding.score, 100.0);
    }

    #[test]
    fn test_malformed_email_short_circuits() {
        let finding = EmailCheck.evaluate(&subject_with_contact(Some("not-an-email"), None));
        assert_eq!(finding.score, 60.0);
        assert_eq!(finding.flags.len(), 1);
        assert_eq!(finding.flags[0].code, "email.malformed");
    }

    #[test]
    fn test_disposable_domain() {
        let finding =
            EmailCheck.evaluate(&subject_with_contact(Some("x@mailinator.com"), None));
        assert_eq!(finding.score, 65.0);
        assert!(finding.flags.iter().any(|f| f.code == "email.disposable"));
    }

    #[test]
    fn test_free_provider_soft_penalty() {
        let finding = EmailCheck.evaluate(&subject_with_contact(Some("jane@gmail.com"), None));
        assert_eq!(finding.score, 90.0);
        assert_eq!(finding.flags[0].severity, FlagSeverity::Low);
    }

    #[test]
    fn test_missing_phone_neutral() {
        let finding = PhoneCheck.evaluate(&subject_with_contact(None, None));
        assert_eq!(finding.score, 50.0);
    }

    #[test]
    fn test_phone_too_short() {
        let finding = PhoneCheck.evaluate(&subject_with_contact(None, Some("12345")));
        assert_eq!(finding.score, 65.0);
        assert_eq!(finding.flags[0].code, "phone.invalid_length");
    }

    #[test]
    fn test_phone_formatting_ignored() {
        let finding = PhoneCheck.evaluate(&subject_with_contact(None, Some("+1 (415) 555-0132")));
        assert_eq!(finding.score, 100.0);
    }

    #[test]
    fn test_repeated_digit_phone() {
        let finding = PhoneCheck.evaluate(&subject_with_contact(None, Some("4155555555")));
        // Six fives in a row once formatting is stripped.
        assert!(finding.flags.iter().any(|f| f.code == "phone.repetition"));
    }
}
