//! Contact field validation
//!
//! Pure functions over input strings plus static rule tables. Email
//! validation pairs a syntax check with a common-typo table; a plausible
//! correction becomes a suggestion for the confirmation flow rather than
//! a silent accept or reject. Phone validation is country-aware.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}$").unwrap()
});

/// Misspelled domain -> intended domain
static TYPO_DOMAINS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    let mut m = HashMap::new();
    for typo in ["gmial.com", "gmai.com", "gmil.com", "gmal.com", "gmaill.com"] {
        m.insert(typo, "gmail.com");
    }
    for typo in ["yahooo.com", "yaho.com", "yhoo.com"] {
        m.insert(typo, "yahoo.com");
    }
    for typo in ["outlok.com", "outloo.com"] {
        m.insert(typo, "outlook.com");
    }
    for typo in ["hotmial.com", "hotmai.com"] {
        m.insert(typo, "hotmail.com");
    }
    m
});

#[derive(Debug, Clone, PartialEq)]
pub struct EmailValidation {
    pub valid: bool,
    pub normalized: String,
    /// A full corrected address when the domain looks mistyped
    pub suspected_typo: Option<String>,
}

pub fn validate_email(value: &str) -> EmailValidation {
    let normalized = value.trim().to_lowercase();

    if !EMAIL_RE.is_match(&normalized) {
        return EmailValidation {
            valid: false,
            normalized,
            suspected_typo: None,
        };
    }

    let suspected_typo = normalized.split_once('@').and_then(|(local, domain)| {
        TYPO_DOMAINS
            .get(domain)
            .map(|corrected| format!("{}@{}", local, corrected))
    });

    EmailValidation {
        valid: true,
        normalized,
        suspected_typo,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PhoneValidation {
    pub valid: bool,
    pub normalized: String,
    pub country: Option<String>,
}

fn invalid_phone(normalized: String) -> PhoneValidation {
    PhoneValidation {
        valid: false,
        normalized,
        country: None,
    }
}

/// Validate a phone number, using `country_hint` (ISO 3166 alpha-2) to
/// disambiguate numbers without an explicit country code.
pub fn validate_phone(value: &str, country_hint: Option<&str>) -> PhoneValidation {
    let has_plus = value.trim_start().starts_with('+');
    let digits: String = value.chars().filter(|c| c.is_ascii_digit()).collect();

    if has_plus {
        // E.164: country code plus subscriber number, 8..15 digits total
        if (8..=15).contains(&digits.len()) {
            return PhoneValidation {
                valid: true,
                normalized: format!("+{}", digits),
                country: country_hint.map(str::to_uppercase),
            };
        }
        return invalid_phone(format!("+{}", digits));
    }

    match (country_hint.map(|h| h.to_uppercase()), digits.len()) {
        // Bare 10-digit numbers are accepted leniently as US/CA
        (Some(ref c), 10) if c == "US" || c == "CA" => PhoneValidation {
            valid: true,
            normalized: format!("+1{}", digits),
            country: Some(c.clone()),
        },
        (None, 10) => PhoneValidation {
            valid: true,
            normalized: format!("+1{}", digits),
            country: Some("US".to_string()),
        },
        (Some(ref c), 9..=10) if c == "AU" => {
            // Drop the trunk zero when present
            let subscriber = digits.strip_prefix('0').unwrap_or(&digits);
            PhoneValidation {
                valid: true,
                normalized: format!("+61{}", subscriber),
                country: Some("AU".to_string()),
            }
        },
        _ => invalid_phone(digits),
    }
}

/// Extract a country code from a locale hint such as "en-US"
pub fn country_from_locale(locale: Option<&str>) -> Option<String> {
    locale
        .and_then(|l| l.rsplit(['-', '_']).next())
        .filter(|c| c.len() == 2 && c.chars().all(|ch| ch.is_ascii_alphabetic()))
        .map(str::to_uppercase)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_email_normalized() {
        let v = validate_email("  Jane.Doe@Example.COM ");
        assert!(v.valid);
        assert_eq!(v.normalized, "jane.doe@example.com");
        assert!(v.suspected_typo.is_none());
    }

    #[test]
    fn test_email_syntax_rejected() {
        assert!(!validate_email("not-an-email").valid);
        assert!(!validate_email("jane@").valid);
        assert!(!validate_email("@example.com").valid);
    }

    #[test]
    fn test_gmial_typo_suggested() {
        let v = validate_email("jane@gmial.com");
        assert!(v.valid);
        assert_eq!(v.suspected_typo.as_deref(), Some("jane@gmail.com"));
    }

    #[test]
    fn test_other_typo_domains() {
        assert_eq!(
            validate_email("a@yahooo.com").suspected_typo.as_deref(),
            Some("a@yahoo.com")
        );
        assert_eq!(
            validate_email("a@hotmial.com").suspected_typo.as_deref(),
            Some("a@hotmail.com")
        );
        assert!(validate_email("a@gmail.com").suspected_typo.is_none());
    }

    #[test]
    fn test_e164_phone() {
        let v = validate_phone("+1 (555) 123-4567", None);
        assert!(v.valid);
        assert_eq!(v.normalized, "+15551234567");
    }

    #[test]
    fn test_bare_ten_digits_us_leniency() {
        let v = validate_phone("555-123-4567", Some("US"));
        assert!(v.valid);
        assert_eq!(v.normalized, "+15551234567");
        assert_eq!(v.country.as_deref(), Some("US"));
    }

    #[test]
    fn test_australian_number_with_trunk_zero() {
        let v = validate_phone("0412 345 678", Some("AU"));
        assert!(v.valid);
        assert_eq!(v.normalized, "+61412345678");
    }

    #[test]
    fn test_unparseable_phone_invalid() {
        assert!(!validate_phone("12345", None).valid);
        assert!(!validate_phone("+12", None).valid);
        assert!(!validate_phone("555-1234", Some("GB")).valid);
    }

    #[test]
    fn test_country_from_locale() {
        assert_eq!(country_from_locale(Some("en-US")).as_deref(), Some("US"));
        assert_eq!(country_from_locale(Some("en_AU")).as_deref(), Some("AU"));
        assert_eq!(country_from_locale(Some("fr")).as_deref(), Some("FR"));
        assert!(country_from_locale(None).is_none());
    }
}
