//! User identity normalization.
//!
//! Backend versions disagree on the user payload shape: some return a
//! bare username string, some `{id, username, friendCode?}`, and the
//! authenticate response may nest it under `user` or be the user record
//! itself. Everything funnels into [`UserIdentity`] before any state is
//! stored.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Normalized identity of the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: String,
    pub username: String,
    #[serde(
        rename = "friendCode",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub friend_code: Option<String>,
}

/// Persisted / wire user shapes.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawUser {
    Name(String),
    Record {
        #[serde(default)]
        id: Option<String>,
        #[serde(default)]
        username: Option<String>,
        #[serde(rename = "friendCode", default)]
        friend_code: Option<String>,
    },
}

impl UserIdentity {
    /// Normalize an authenticate/register response body.
    ///
    /// Accepts either `{user: <shape>}` or the whole body as the user.
    pub fn from_response(response: &Value) -> Option<UserIdentity> {
        let payload = response.get("user").unwrap_or(response);
        Self::from_value(payload)
    }

    fn from_value(value: &Value) -> Option<UserIdentity> {
        match serde_json::from_value::<RawUser>(value.clone()).ok()? {
            RawUser::Name(name) => Some(UserIdentity {
                id: name.clone(),
                username: name,
                friend_code: None,
            }),
            RawUser::Record {
                id,
                username,
                friend_code,
            } => {
                let id = id.or_else(|| username.clone())?;
                let username = username.unwrap_or_else(|| id.clone());
                Some(UserIdentity {
                    id,
                    username,
                    friend_code,
                })
            }
        }
    }

    /// Parse a persisted user entry. Legacy clients stored a bare JSON
    /// string instead of a record.
    pub fn from_stored(raw: &str) -> Option<UserIdentity> {
        let value: Value = serde_json::from_str(raw).ok()?;
        Self::from_value(&value)
    }

    /// The key the tracking and rewarding endpoints identify this user
    /// by. Rewards records are keyed on the username.
    pub fn backend_key(&self) -> &str {
        &self.username
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bare_string_becomes_id_and_username() {
        let user = UserIdentity::from_response(&json!({ "user": "alice" })).unwrap();
        assert_eq!(user.id, "alice");
        assert_eq!(user.username, "alice");
        assert_eq!(user.friend_code, None);
    }

    #[test]
    fn whole_body_as_user_record() {
        let user = UserIdentity::from_response(&json!({
            "id": "u1",
            "username": "alice",
            "friendCode": "FC-9"
        }))
        .unwrap();
        assert_eq!(user.id, "u1");
        assert_eq!(user.username, "alice");
        assert_eq!(user.friend_code, Some("FC-9".to_string()));
    }

    #[test]
    fn record_missing_id_falls_back_to_username() {
        let user = UserIdentity::from_response(&json!({ "user": { "username": "alice" } })).unwrap();
        assert_eq!(user.id, "alice");
        assert_eq!(user.username, "alice");
    }

    #[test]
    fn empty_record_is_rejected() {
        assert!(UserIdentity::from_response(&json!({ "user": {} })).is_none());
    }

    #[test]
    fn stored_legacy_string_parses() {
        let user = UserIdentity::from_stored(r#""alice""#).unwrap();
        assert_eq!(user.id, "alice");

        assert!(UserIdentity::from_stored("not json").is_none());
    }

    #[test]
    fn roundtrips_through_storage_encoding() {
        let user = UserIdentity {
            id: "u1".to_string(),
            username: "alice".to_string(),
            friend_code: Some("FC-9".to_string()),
        };
        let raw = serde_json::to_string(&user).unwrap();
        assert_eq!(UserIdentity::from_stored(&raw).unwrap(), user);
    }

    #[test]
    fn friend_code_omitted_when_absent() {
        let user = UserIdentity {
            id: "u1".to_string(),
            username: "alice".to_string(),
            friend_code: None,
        };
        let raw = serde_json::to_string(&user).unwrap();
        assert!(!raw.contains("friendCode"));
    }
}
