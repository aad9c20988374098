//! Digit normalization
//!
//! Users type numbers with whatever keyboard layout they have active, so
//! every numeric field passes through a Persian/Arabic-Indic → ASCII
//! normalization step before validation and storage.

/// Map every Persian (U+06F0..U+06F9) and Arabic-Indic (U+0660..U+0669)
/// digit to its ASCII equivalent, leaving everything else untouched.
///
/// The mapping is idempotent: ASCII digits map to themselves.
pub fn normalize_digits(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '۰' | '٠' => '0',
            '۱' | '١' => '1',
            '۲' | '٢' => '2',
            '۳' | '٣' => '3',
            '۴' | '٤' => '4',
            '۵' | '٥' => '5',
            '۶' | '٦' => '6',
            '۷' | '٧' => '7',
            '۸' | '٨' => '8',
            '۹' | '٩' => '9',
            other => other,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persian_digits() {
        assert_eq!(normalize_digits("۰۱۲۳۴۵۶۷۸۹"), "0123456789");
    }

    #[test]
    fn test_arabic_indic_digits() {
        assert_eq!(normalize_digits("٠١٢٣٤٥٦٧٨٩"), "0123456789");
    }

    #[test]
    fn test_ascii_and_text_untouched() {
        assert_eq!(normalize_digits("0912 تلفن"), "0912 تلفن");
        assert_eq!(normalize_digits(""), "");
    }

    #[test]
    fn test_idempotent() {
        let mixed = "۰9١2x۳";
        let once = normalize_digits(mixed);
        assert_eq!(normalize_digits(&once), once);
    }
}
