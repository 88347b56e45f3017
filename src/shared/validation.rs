use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Regex for catalog slugs
    /// Must be lowercase alphanumeric with hyphens
    /// - Valid: "deep-cleaning", "ac-service", "plumbing2"
    /// - Invalid: "-clean", "clean-", "deep--clean", "Deep", "deep_clean"
    pub static ref SLUG_REGEX: Regex = Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap();

    /// Regex for phone numbers in E.164 format, as the SMS vendor expects them
    /// - Valid: "+14155550123", "+628123456789"
    /// - Invalid: "08123456789", "+0123456789", "+1 415 555 0123"
    pub static ref PHONE_REGEX: Regex = Regex::new(r"^\+[1-9]\d{7,14}$").unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_regex_valid() {
        assert!(SLUG_REGEX.is_match("deep-cleaning"));
        assert!(SLUG_REGEX.is_match("plumbing2"));
        assert!(SLUG_REGEX.is_match("a"));
        assert!(SLUG_REGEX.is_match("ac-service-split"));
    }

    #[test]
    fn test_slug_regex_invalid() {
        assert!(!SLUG_REGEX.is_match("-clean")); // starts with hyphen
        assert!(!SLUG_REGEX.is_match("clean-")); // ends with hyphen
        assert!(!SLUG_REGEX.is_match("deep--clean")); // double hyphen
        assert!(!SLUG_REGEX.is_match("Deep")); // uppercase
        assert!(!SLUG_REGEX.is_match("deep_clean")); // underscore
        assert!(!SLUG_REGEX.is_match(""));
    }

    #[test]
    fn test_phone_regex() {
        assert!(PHONE_REGEX.is_match("+14155550123"));
        assert!(PHONE_REGEX.is_match("+628123456789"));

        assert!(!PHONE_REGEX.is_match("08123456789")); // missing country code
        assert!(!PHONE_REGEX.is_match("+0123456789")); // leading zero
        assert!(!PHONE_REGEX.is_match("+1 415 555 0123")); // spaces
        assert!(!PHONE_REGEX.is_match("+1234567")); // too short
    }
}
