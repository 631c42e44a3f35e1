/// API route handlers
///
/// - `health`: liveness and database status
/// - `auth`: registration, login, token refresh
/// - `users`: email lookup for adding board members
/// - `boards`, `tasks`, `comments`: resources guarded by the access gate

pub mod auth;
pub mod boards;
pub mod comments;
pub mod health;
pub mod tasks;
pub mod users;

use crate::error::{ApiError, ApiResult};
use serde::{Deserialize, Deserializer};

/// Unwraps the scope handed to a mutation by the access gate
///
/// The gate always loads a scope when a target is given, so a missing or
/// mismatched one is a server bug rather than a client error.
pub(crate) fn loaded<T>(scope: Option<T>) -> ApiResult<T> {
    scope.ok_or_else(|| ApiError::InternalError("Authorized scope was not loaded".to_string()))
}

/// Deserializes a string with surrounding whitespace removed
///
/// Length validation then sees the trimmed value, so a whitespace-only
/// title fails `length(min = 1)`.
pub(crate) fn trimmed<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(|s| s.trim().to_string())
}

/// Optional form of [`trimmed`]
pub(crate) fn trimmed_opt<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(|s| s.map(|s| s.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Deserialize)]
    struct Titled {
        #[serde(deserialize_with = "trimmed")]
        title: String,
        #[serde(default, deserialize_with = "trimmed_opt")]
        subtitle: Option<String>,
    }

    #[test]
    fn test_trimmed_strips_whitespace() {
        let t: Titled =
            serde_json::from_value(json!({ "title": "  Roadmap ", "subtitle": "   " })).unwrap();

        assert_eq!(t.title, "Roadmap");
        assert_eq!(t.subtitle.as_deref(), Some(""));
    }

    #[test]
    fn test_trimmed_opt_keeps_absent_and_null() {
        let absent: Titled = serde_json::from_value(json!({ "title": "x" })).unwrap();
        assert!(absent.subtitle.is_none());

        let null: Titled = serde_json::from_value(json!({ "title": "x", "subtitle": null })).unwrap();
        assert!(null.subtitle.is_none());
    }
}
