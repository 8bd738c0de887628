/// Input validation utilities for the leaderboard API
use url::Url;

/// Validates a display name: non-empty after trimming, at most 64 characters.
pub fn validate_username(username: &str) -> bool {
    let trimmed = username.trim();
    !trimmed.is_empty() && trimmed.len() <= 64
}

/// Validates an image reference: empty is allowed (no avatar), anything else
/// must parse as an absolute URI.
pub fn validate_image_url(image_url: &str) -> bool {
    image_url.is_empty() || Url::parse(image_url).is_ok()
}

/// Validates a score: non-negative.
pub fn validate_score(score: i64) -> bool {
    score >= 0
}

/// Validates a user id: store-assigned ids are positive.
pub fn validate_user_id(id: i64) -> bool {
    id > 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_username_valid() {
        assert!(validate_username("alice"));
        assert!(validate_username("  bob  "));
    }

    #[test]
    fn test_validate_username_invalid() {
        assert!(!validate_username(""));
        assert!(!validate_username("   "));
        assert!(!validate_username(&"x".repeat(65)));
    }

    #[test]
    fn test_validate_image_url_valid() {
        assert!(validate_image_url(""));
        assert!(validate_image_url("https://cdn.example.com/avatar.png"));
    }

    #[test]
    fn test_validate_image_url_invalid() {
        assert!(!validate_image_url("not a url"));
        assert!(!validate_image_url("/relative/path.png"));
    }

    #[test]
    fn test_validate_score() {
        assert!(validate_score(0));
        assert!(validate_score(1_000_000));
        assert!(!validate_score(-1));
    }

    #[test]
    fn test_validate_user_id() {
        assert!(validate_user_id(1));
        assert!(!validate_user_id(0));
        assert!(!validate_user_id(-3));
    }
}
