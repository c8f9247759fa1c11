use std::sync::OnceLock;

use regex::Regex;

pub const INVALID_USERNAME: &str =
    "Username must be 3-30 characters (lowercase letters, numbers, hyphens, underscores only)";

fn username_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-z0-9_-]{3,30}$").expect("valid username regex"))
}

pub fn normalize_username(raw: &str) -> String {
    raw.trim().to_lowercase()
}

pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Checks an already-normalized username.
pub fn is_valid_username(username: &str) -> bool {
    username_regex().is_match(username)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_usernames() {
        assert!(is_valid_username("ab_12"));
        assert!(is_valid_username("asha-rao"));
        assert!(is_valid_username(&"a".repeat(30)));
    }

    #[test]
    fn test_invalid_usernames() {
        assert!(!is_valid_username("AB"));
        assert!(!is_valid_username("ab"));
        assert!(!is_valid_username("Asha"));
        assert!(!is_valid_username("asha rao"));
        assert!(!is_valid_username("asha.rao"));
        assert!(!is_valid_username(&"a".repeat(31)));
    }

    #[test]
    fn test_normalization_lowercases_and_trims() {
        assert_eq!(normalize_username("  Asha_Rao "), "asha_rao");
        assert!(is_valid_username(&normalize_username(" AB_12 ")));
        assert_eq!(normalize_email(" Asha@Example.COM "), "asha@example.com");
    }
}
