//! Field validators and keyed error collections.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;

/// Minimum trimmed length of a free-text assessment answer.
pub const MIN_TEXT_ANSWER_CHARS: usize = 50;
/// Minimum trimmed length of a full name.
pub const MIN_NAME_CHARS: usize = 2;
/// Minimum number of digits in a phone number.
pub const MIN_PHONE_DIGITS: usize = 10;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"));

static PHONE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[+]?[(]?[0-9]{1,4}[)]?[-\s.]?[(]?[0-9]{1,4}[)]?[-\s.]?[0-9]{1,5}[-\s.]?[0-9]{1,5}$",
    )
    .expect("phone pattern is valid")
});

/// `local@domain.tld` shape check.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Loose international format with at least ten digits.
pub fn is_valid_phone(phone: &str) -> bool {
    PHONE_RE.is_match(phone) && digit_count(phone) >= MIN_PHONE_DIGITS
}

fn digit_count(s: &str) -> usize {
    s.chars().filter(char::is_ascii_digit).count()
}

/// Non-empty after trimming.
pub fn is_present(value: &str) -> bool {
    !value.trim().is_empty()
}

/// Trimmed character count reaches `min`.
pub fn has_min_chars(value: &str, min: usize) -> bool {
    value.trim().chars().count() >= min
}

/// Validation failures keyed by field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldErrors<K: Ord> {
    errors: BTreeMap<K, String>,
}

impl<K: Ord> Default for FieldErrors<K> {
    fn default() -> Self {
        Self {
            errors: BTreeMap::new(),
        }
    }
}

impl<K: Ord + Clone> FieldErrors<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: K, message: impl Into<String>) {
        self.errors.insert(key, message.into());
    }

    /// Drop the error for `key`, if any. Called when the field is edited.
    pub fn clear(&mut self, key: &K) {
        self.errors.remove(key);
    }

    pub fn get(&self, key: &K) -> Option<&str> {
        self.errors.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.errors.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// First failing field in key order.
    pub fn first(&self) -> Option<(&K, &str)> {
        self.errors.iter().next().map(|(k, v)| (k, v.as_str()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &str)> {
        self.errors.iter().map(|(k, v)| (k, v.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_shapes() {
        assert!(is_valid_email("user@example.com"));
        assert!(is_valid_email("first.last+tag@mail.example.co.in"));
        assert!(!is_valid_email("user@com"));
        assert!(!is_valid_email("user@.com"));
        assert!(!is_valid_email("user @example.com"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn phone_shapes() {
        assert!(is_valid_phone("+1 (555) 123-4567"));
        assert!(is_valid_phone("9876543210"));
        assert!(is_valid_phone("+91 98765 43210"));
        assert!(!is_valid_phone("12345"));
        assert!(!is_valid_phone("555-1234"));
        assert!(!is_valid_phone("phone: 9876543210"));
    }

    #[test]
    fn text_answer_boundary() {
        let short = format!("  {}  ", "x".repeat(49));
        let exact = format!("\n{}\t", "x".repeat(50));
        assert!(!has_min_chars(&short, MIN_TEXT_ANSWER_CHARS));
        assert!(has_min_chars(&exact, MIN_TEXT_ANSWER_CHARS));
    }

    #[test]
    fn min_chars_counts_characters_not_bytes() {
        assert!(has_min_chars("éé", 2));
        assert!(!has_min_chars("é", 2));
    }

    #[test]
    fn presence_ignores_whitespace() {
        assert!(is_present(" a "));
        assert!(!is_present("   "));
        assert!(!is_present(""));
    }

    #[test]
    fn field_errors_clear_on_edit() {
        let mut errors = FieldErrors::new();
        errors.insert("email", "Email is required");
        errors.insert("branch", "Branch is required");
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.first(), Some((&"branch", "Branch is required")));

        errors.clear(&"email");
        assert!(!errors.contains(&"email"));
        assert_eq!(errors.len(), 1);
    }
}
