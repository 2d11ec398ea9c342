//! Field validation shared by every resource.
//!
//! Each helper returns [`CoreError::Validation`] with a message naming the
//! offending field so handlers can surface it as a 400 unchanged.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use validator::ValidateEmail;

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Limits
// ---------------------------------------------------------------------------

/// Names, last names, category and subcategory titles.
pub const MAX_NAME_LEN: usize = 28;

/// Profile bios, category descriptions and feedback texts.
pub const MAX_TEXT_LEN: usize = 500;

/// Executor service descriptions.
pub const MAX_SERVICE_DESCRIPTION_LEN: usize = 100;

/// Order titles.
pub const MAX_ORDER_TITLE_LEN: usize = 512;

/// Order specific titles and texts.
pub const MAX_SPECIFIC_TITLE_LEN: usize = 255;
pub const MAX_SPECIFIC_TEXT_LEN: usize = 1024;

/// Feedback rate bounds (inclusive).
pub const MIN_RATE: i16 = 1;
pub const MAX_RATE: i16 = 5;

/// Eighteen years expressed in days, leap days included.
pub const DAYS_IN_18_YEARS: i64 = 6574;

/// Minimum password length accepted at registration and reset.
pub const MIN_PASSWORD_LENGTH: usize = 8;

static HEX_COLOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#(?:[0-9a-fA-F]{3}){1,2}$").expect("valid regex"));

static INTERNATIONAL_PHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+[1-9][0-9]{9,14}$").expect("valid regex"));

// ---------------------------------------------------------------------------
// Strings
// ---------------------------------------------------------------------------

/// Reject values longer than `max` characters.
pub fn validate_max_len(field: &str, value: &str, max: usize) -> Result<(), CoreError> {
    if value.chars().count() > max {
        return Err(CoreError::Validation(format!(
            "{field}: ensure this field has no more than {max} characters"
        )));
    }
    Ok(())
}

/// [`validate_max_len`] for optional fields; `None` always passes.
pub fn validate_opt_max_len(
    field: &str,
    value: Option<&str>,
    max: usize,
) -> Result<(), CoreError> {
    match value {
        Some(v) => validate_max_len(field, v, max),
        None => Ok(()),
    }
}

/// Reject empty or whitespace-only values.
pub fn validate_required(field: &str, value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::Validation(format!(
            "{field}: this field may not be blank"
        )));
    }
    Ok(())
}

/// Accept `#rgb` or `#rrggbb` colors.
pub fn validate_hex_color(value: &str) -> Result<(), CoreError> {
    if HEX_COLOR.is_match(value) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "color: '{value}' is not a valid hex color"
        )))
    }
}

/// Accept phone numbers in E.164 form: `+` followed by 10 to 15 digits.
pub fn validate_phone_number(value: &str) -> Result<(), CoreError> {
    if INTERNATIONAL_PHONE.is_match(value) {
        Ok(())
    } else {
        Err(CoreError::Validation(
            "phone_number: enter a valid phone number in international format".into(),
        ))
    }
}

pub fn validate_email(value: &str) -> Result<(), CoreError> {
    if value.validate_email() {
        Ok(())
    } else {
        Err(CoreError::Validation(
            "email: enter a valid email address".into(),
        ))
    }
}

// ---------------------------------------------------------------------------
// Numbers and dates
// ---------------------------------------------------------------------------

pub fn validate_rate(rate: i16) -> Result<(), CoreError> {
    if (MIN_RATE..=MAX_RATE).contains(&rate) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "rate: must be between {MIN_RATE} and {MAX_RATE}"
        )))
    }
}

pub fn validate_non_negative(field: &str, value: f64) -> Result<(), CoreError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "{field}: must be greater than or equal to 0"
        )))
    }
}

/// Require `birthdate` to lie more than [`DAYS_IN_18_YEARS`] before `today`.
pub fn validate_adult(birthdate: NaiveDate, today: NaiveDate) -> Result<(), CoreError> {
    if (today - birthdate).num_days() > DAYS_IN_18_YEARS {
        Ok(())
    } else {
        Err(CoreError::Validation(
            "You must be at least 18 years old".into(),
        ))
    }
}

/// Reject a date range whose end precedes its start.
pub fn validate_date_range(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<(), CoreError> {
    if let (Some(start), Some(end)) = (start, end) {
        if end < start {
            return Err(CoreError::Validation(
                "end_date: must not be earlier than start_date".into(),
            ));
        }
    }
    Ok(())
}

pub fn validate_password_strength(password: &str) -> Result<(), CoreError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(CoreError::Validation(format!(
            "password: must be at least {MIN_PASSWORD_LENGTH} characters long"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn max_len_counts_characters() {
        assert!(validate_max_len("name", "Алексей", 7).is_ok());
        assert_matches!(
            validate_max_len("name", "Алексейй", 7),
            Err(CoreError::Validation(msg)) if msg.starts_with("name:")
        );
    }

    #[test]
    fn hex_colors() {
        assert!(validate_hex_color("#fff").is_ok());
        assert!(validate_hex_color("#00A1ff").is_ok());
        assert!(validate_hex_color("#abcd").is_err());
        assert!(validate_hex_color("00A1ff").is_err());
    }

    #[test]
    fn phone_numbers() {
        assert!(validate_phone_number("+79991234567").is_ok());
        assert!(validate_phone_number("89991234567").is_err());
        assert!(validate_phone_number("+7999").is_err());
    }

    #[test]
    fn emails() {
        assert!(validate_email("user@example.com").is_ok());
        assert!(validate_email("user.example.com").is_err());
    }

    #[test]
    fn rate_bounds() {
        assert!(validate_rate(1).is_ok());
        assert!(validate_rate(5).is_ok());
        assert!(validate_rate(0).is_err());
        assert!(validate_rate(6).is_err());
    }

    #[test]
    fn adult_boundary() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let exactly = today - chrono::Duration::days(DAYS_IN_18_YEARS);
        assert!(validate_adult(exactly, today).is_err());
        assert!(validate_adult(exactly - chrono::Duration::days(1), today).is_ok());
    }

    #[test]
    fn date_range_order() {
        let a = NaiveDate::from_ymd_opt(2024, 1, 1);
        let b = NaiveDate::from_ymd_opt(2024, 2, 1);
        assert!(validate_date_range(a, b).is_ok());
        assert!(validate_date_range(b, a).is_err());
        assert!(validate_date_range(None, a).is_ok());
    }

    #[test]
    fn password_length() {
        assert!(validate_password_strength("short").is_err());
        assert!(validate_password_strength("long-enough").is_ok());
    }
}
