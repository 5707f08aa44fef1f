//! Shared pattern tables for the category checks.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    pub static ref EMAIL_PATTERN: Regex = Regex::new(
        r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$"
    ).unwrap();

    /// Loose URL shape: optional scheme, a host with at least one dot.
    pub static ref URL_PATTERN: Regex = Regex::new(
        r"^(?:https?://)?(?:www\.)?[a-zA-Z0-9][a-zA-Z0-9-]*(?:\.[a-zA-Z0-9-]+)+(?:/\S*)?$"
    ).unwrap();

    /// Host that is a bare IPv4 literal.
    pub static ref IP_HOST_PATTERN: Regex = Regex::new(
        r"^(?:https?://)?\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}"
    ).unwrap();

    pub static ref DIGIT_PATTERN: Regex = Regex::new(r"\d").unwrap();

    /// Placeholder/test values across all text attributes.
    pub static ref PLACEHOLDER_KEYWORDS: Vec<&'static str> = vec![
        "test", "fake", "demo", "sample", "asdf", "qwerty",
        "admin", "null", "none", "unknown", "n/a", "xxx",
    ];

    /// Company-name keywords common in fraudulent submissions.
    pub static ref SUSPICIOUS_COMPANY_KEYWORDS: Vec<&'static str> = vec![
        "quick cash", "easy money", "guaranteed income", "work from home",
        "get rich", "no experience", "instant profit", "free money",
    ];

    /// Industries that warrant extra scrutiny, not rejection.
    pub static ref HIGH_RISK_INDUSTRY_KEYWORDS: Vec<&'static str> = vec![
        "crypto", "cryptocurrency", "forex", "gambling", "casino",
        "mlm", "multi-level", "pyramid", "payday", "binary options",
    ];

    /// Throwaway mailbox providers.
    pub static ref DISPOSABLE_EMAIL_DOMAINS: Vec<&'static str> = vec![
        "mailinator.com", "guerrillamail.com", "10minutemail.com",
        "tempmail.com", "temp-mail.org", "trashmail.com", "yopmail.com",
        "throwawaymail.com", "sharklasers.com", "getnada.com",
    ];

    /// Consumer mail providers; a business contact on one is a soft signal.
    pub static ref FREE_EMAIL_DOMAINS: Vec<&'static str> = vec![
        "gmail.com", "yahoo.com", "hotmail.com", "outlook.com",
        "aol.com", "mail.com", "gmx.com", "proton.me", "protonmail.com",
    ];

    /// TLDs with outsized abuse rates.
    pub static ref HIGH_ABUSE_TLDS: Vec<&'static str> = vec![
        ".tk", ".ml", ".ga", ".cf", ".gq", ".top", ".click", ".loan",
    ];

    /// Free site-builder hosts used as stand-in company websites.
    pub static ref FREE_HOSTING_DOMAINS: Vec<&'static str> = vec![
        "blogspot.com", "wordpress.com", "wixsite.com", "weebly.com",
        "sites.google.com", "webnode.com",
    ];
}

/// True if any keyword occurs in the lowercased input.
pub fn contains_keyword(text: &str, keywords: &[&str]) -> bool {
    let lower = text.to_lowercase();
    keywords.iter().any(|kw| lower.contains(kw))
}

/// True if the input contains a run of `min_run` or more identical
/// characters ("aaaa", "111111"). The regex crate has no backreferences,
/// so this is a manual scan.
pub fn has_repeated_run(text: &str, min_run: usize) -> bool {
    let mut run = 1usize;
    let mut prev: Option<char> = None;
    for c in text.chars() {
        if Some(c) == prev {
            run += 1;
            if run >= min_run {
                return true;
            }
        } else {
            run = 1;
            prev = Some(c);
        }
    }
    false
}

/// True if the digits form a strictly ascending or descending sequence
/// of length `min_len` or more ("1234567", "98765432").
pub fn has_sequential_digits(digits: &str, min_len: usize) -> bool {
    let bytes: Vec<u8> = digits.bytes().filter(|b| b.is_ascii_digit()).collect();
    if bytes.len() < min_len {
        return false;
    }
    for window in bytes.windows(min_len) {
        let ascending = window.windows(2).all(|p| p[1] == p[0].wrapping_add(1));
        let descending = window.windows(2).all(|p| p[0] == p[1].wrapping_add(1));
        if ascending || descending {
            return true;
        }
    }
    false
}

/// Extract the domain part of an email address, lowercased.
pub fn email_domain(email: &str) -> Option<String> {
    email.rsplit_once('@').map(|(_, d)| d.to_lowercase())
}
