//! Registration and login input checks.

use std::sync::LazyLock;

use regex::Regex;
use unicode_properties::{GeneralCategoryGroup, UnicodeGeneralCategory};

use super::ValidationError;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+\-]+@[a-zA-Z0-9.\-]+\.[a-zA-Z]{2,}$").expect("valid email regex")
});

static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_]+$").expect("valid username regex"));

const USERNAME_MIN: usize = 3;
const USERNAME_MAX: usize = 50;
const PASSWORD_MIN: usize = 8;

/// Character classes a password must mix.
const PASSWORD_MIN_CLASSES: usize = 2;

pub fn is_email(s: &str) -> bool {
    EMAIL_RE.is_match(s)
}

pub fn is_valid_username(s: &str) -> bool {
    (USERNAME_MIN..=USERNAME_MAX).contains(&s.len()) && USERNAME_RE.is_match(s)
}

/// At least 8 characters drawn from at least 2 of: upper, lower, digit,
/// punctuation or symbol.
pub fn is_strong_password(s: &str) -> bool {
    if s.chars().count() < PASSWORD_MIN {
        return false;
    }
    let (mut upper, mut lower, mut digit, mut special) = (false, false, false, false);
    for c in s.chars() {
        if c.is_uppercase() {
            upper = true;
        } else if c.is_lowercase() {
            lower = true;
        } else if c.is_numeric() {
            digit = true;
        } else if matches!(
            c.general_category_group(),
            GeneralCategoryGroup::Punctuation | GeneralCategoryGroup::Symbol
        ) {
            special = true;
        }
    }
    [upper, lower, digit, special].iter().filter(|&&b| b).count() >= PASSWORD_MIN_CLASSES
}

/// Checks run in order: username, email, password. The first failure wins.
pub fn validate_registration(
    username: &str,
    email: &str,
    password: &str,
) -> Result<(), ValidationError> {
    if !is_valid_username(username) {
        return Err(ValidationError::InvalidUsername);
    }
    if !is_email(email) {
        return Err(ValidationError::InvalidEmail);
    }
    if !is_strong_password(password) {
        return Err(ValidationError::WeakPassword);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usernames() {
        assert!(is_valid_username("alice"));
        assert!(is_valid_username("a_b_1"));
        assert!(is_valid_username(&"x".repeat(50)));
        assert!(!is_valid_username("ab"));
        assert!(!is_valid_username(&"x".repeat(51)));
        assert!(!is_valid_username("alice!"));
        assert!(!is_valid_username("al ice"));
        assert!(!is_valid_username(""));
    }

    #[test]
    fn emails() {
        assert!(is_email("alice@example.com"));
        assert!(is_email("a.b+tag@sub.example.org"));
        assert!(!is_email("alice"));
        assert!(!is_email("alice@example"));
        assert!(!is_email("@example.com"));
        assert!(!is_email("alice@example.c"));
    }

    #[test]
    fn two_of_four_classes_is_enough() {
        assert!(is_strong_password("Password1!"));
        assert!(is_strong_password("password1"));
        assert!(is_strong_password("PASSWORDx"));
        assert!(is_strong_password("12345678!"));
    }

    #[test]
    fn weak_passwords() {
        assert!(!is_strong_password("Pass1!"));
        assert!(!is_strong_password("password"));
        assert!(!is_strong_password("12345678"));
        assert!(!is_strong_password(""));
    }

    #[test]
    fn uncased_letters_are_not_a_class() {
        // Han characters are letters, not punctuation or symbols.
        assert!(!is_strong_password("密码密码密码密码1"));
        assert!(!is_strong_password("密码密码密码密码"));
        assert!(is_strong_password("密码密码密码密码1！"));
        assert!(is_strong_password("密码密码密码密码1€"));
    }

    #[test]
    fn registration_reports_first_failure() {
        assert_eq!(
            validate_registration("a", "bad", "weak"),
            Err(ValidationError::InvalidUsername)
        );
        assert_eq!(
            validate_registration("alice", "bad", "weak"),
            Err(ValidationError::InvalidEmail)
        );
        assert_eq!(
            validate_registration("alice", "alice@example.com", "weak"),
            Err(ValidationError::WeakPassword)
        );
        assert_eq!(
            validate_registration("alice", "alice@example.com", "Password1!"),
            Ok(())
        );
    }
}
