//! Field validators
//!
//! Pure, stateless predicates over raw text input. Numeric validators
//! normalize Persian/Arabic-Indic digits first, so users can type with
//! either keyboard layout; the conversation flow stores the normalized
//! form.

use std::sync::OnceLock;

use regex::Regex;

use crate::utils::digits::normalize_digits;

fn full_name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // Persian letters and whitespace only
        Regex::new(r"^[آابپتثجچحخدذرزژسشصضطظعغفقکگلمنوهی\s]+$").expect("valid regex")
    })
}

fn phone_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^09\d{9}$").expect("valid regex"))
}

/// Validate a full name: Persian letters and spaces only, at least two
/// whitespace-separated parts, each part at least 3 letters.
pub fn validate_full_name(full_name: &str) -> bool {
    let full_name = full_name.trim();
    if full_name.is_empty() || !full_name_re().is_match(full_name) {
        return false;
    }
    let parts: Vec<&str> = full_name.split_whitespace().collect();
    if parts.len() < 2 {
        return false;
    }
    parts.iter().all(|part| part.chars().count() >= 3)
}

/// Validate a student id: digits only, at least 8 of them.
pub fn validate_student_id(student_id: &str) -> bool {
    let normalized = normalize_digits(student_id);
    normalized.len() >= 8 && normalized.chars().all(|c| c.is_ascii_digit())
}

/// Validate a national id: exactly 10 digits with a valid check digit.
///
/// The last digit must satisfy the position-weighted checksum: with
/// `s = sum(d[i] * (10 - i)) mod 11` over the first nine digits, the
/// check digit equals `s` when `s < 2` and `11 - s` otherwise.
pub fn validate_national_id(national_id: &str) -> bool {
    let normalized = normalize_digits(national_id);
    if normalized.len() != 10 || !normalized.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }
    let digits: Vec<u32> = normalized.chars().filter_map(|c| c.to_digit(10)).collect();
    let check = digits[9];
    let s: u32 = digits[..9]
        .iter()
        .enumerate()
        .map(|(i, d)| d * (10 - i as u32))
        .sum::<u32>()
        % 11;
    (s < 2 && check == s) || (s >= 2 && check + s == 11)
}

/// Validate a mobile phone number: `09` followed by 9 digits.
pub fn validate_phone_number(phone_number: &str) -> bool {
    phone_re().is_match(&normalize_digits(phone_number))
}

/// Validate a free-text message: at least 5 characters after trimming.
pub fn validate_message_text(message_text: &str) -> bool {
    message_text.trim().chars().count() >= 5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_name() {
        assert!(validate_full_name("علی احمدی"));
        assert!(validate_full_name("  محمد  رضایی  "));
        // single part
        assert!(!validate_full_name("علی"));
        // part shorter than 3 letters
        assert!(!validate_full_name("عل احمدی"));
        // non-Persian letters
        assert!(!validate_full_name("Ali Ahmadi"));
        assert!(!validate_full_name("علی احمدی2"));
        assert!(!validate_full_name(""));
    }

    #[test]
    fn test_student_id() {
        assert!(validate_student_id("40012345"));
        assert!(validate_student_id("۴۰۰۱۲۳۴۵"));
        assert!(validate_student_id("400123456789"));
        assert!(!validate_student_id("4001234"));
        assert!(!validate_student_id("4001234a"));
    }

    #[test]
    fn test_national_id_checksum() {
        // 123456789: s = (1*10+2*9+3*8+4*7+5*6+6*5+7*4+8*3+9*2) % 11
        //              = 210 % 11 = 1 < 2, so check digit must be 1
        assert!(validate_national_id("1234567891"));
        assert!(validate_national_id("۱۲۳۴۵۶۷۸۹۱"));
        assert!(!validate_national_id("1234567890"));
        assert!(!validate_national_id("123456789"));
        assert!(!validate_national_id("12345678911"));
        assert!(!validate_national_id("12345678x1"));
    }

    #[test]
    fn test_phone_number() {
        assert!(validate_phone_number("09123456789"));
        assert!(validate_phone_number("۰۹۱۲۳۴۵۶۷۸۹"));
        assert!(!validate_phone_number("0812345678"));
        assert!(!validate_phone_number("0912345678"));
        assert!(!validate_phone_number("091234567890"));
        assert!(!validate_phone_number("+989123456789"));
    }

    #[test]
    fn test_message_text() {
        assert!(validate_message_text("سلام، یک سوال دارم"));
        assert!(validate_message_text("  12345  "));
        assert!(!validate_message_text("هی"));
        assert!(!validate_message_text("    "));
    }
}
