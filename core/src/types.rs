//! Domain models returned by the endpoint groups.
//!
//! Only the fields the client works with are modelled; anything else in a
//! payload is ignored. Fields the server may omit default rather than fail.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A user account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub id_str: Option<String>,
    pub name: String,
    pub screen_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub protected: bool,
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub followers_count: i64,
    #[serde(default)]
    pub friends_count: i64,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// A supported interface language.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Language {
    /// ISO 639-1 code.
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub local_name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Rate limit disposition of one endpoint.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RateLimit {
    pub limit: i64,
    pub remaining: i64,
    /// Epoch seconds at which the window resets.
    pub reset: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PhotoSize {
    pub h: i32,
    pub w: i32,
    pub resize: String,
}

/// Service-wide configuration from `help/configuration`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Configurations {
    pub characters_reserved_per_media: i32,
    pub dm_text_character_limit: i32,
    pub max_media_per_upload: i32,
    pub non_username_paths: Vec<String>,
    pub photo_size_limit: i64,
    pub photo_sizes: IndexMap<String, PhotoSize>,
    pub short_url_length: i32,
    pub short_url_length_https: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_tolerates_missing_optional_fields() {
        let user: User = serde_json::from_str(r#"{"id":12,"name":"Jack","screen_name":"jack"}"#).unwrap();
        assert_eq!(user.id, 12);
        assert!(user.description.is_none());
        assert!(!user.protected);
    }

    #[test]
    fn user_requires_screen_name() {
        let result: Result<User, _> = serde_json::from_str(r#"{"id":12,"name":"Jack"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn rate_limit_defaults_absent_counters() {
        let limit: RateLimit = serde_json::from_str(r#"{"limit":15}"#).unwrap();
        assert_eq!(limit, RateLimit { limit: 15, remaining: 0, reset: 0 });
    }

    #[test]
    fn configuration_keeps_photo_size_order() {
        let config: Configurations = serde_json::from_str(
            r#"{"photo_sizes":{"thumb":{"h":150,"w":150,"resize":"crop"},"large":{"h":2048,"w":1024,"resize":"fit"}},
                "short_url_length":23}"#,
        )
        .unwrap();
        assert_eq!(config.photo_sizes.keys().collect::<Vec<_>>(), vec!["thumb", "large"]);
        assert_eq!(config.short_url_length, 23);
        assert!(config.non_username_paths.is_empty());
    }
}
