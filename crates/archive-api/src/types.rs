//! Wire types for the arc-tracking surface.

use serde::Deserialize;

/// A user reference as the backend sends it.
///
/// Older backend routes return bare usernames; newer ones return a record.
/// Both shapes appear in arc member and progress lists.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum UserRef {
    Name(String),
    Record {
        #[serde(default)]
        id: Option<String>,
        #[serde(default)]
        username: Option<String>,
    },
}

impl UserRef {
    /// Whether this reference denotes the user identified by `key`
    /// (a username or an id).
    pub fn matches(&self, key: &str) -> bool {
        match self {
            UserRef::Name(name) => name == key,
            UserRef::Record { id, username } => {
                username.as_deref() == Some(key) || id.as_deref() == Some(key)
            }
        }
    }
}

fn default_stat() -> String {
    "HP".to_string()
}

/// Full detail of an arc, as returned by `getArc`.
///
/// The streak and the progress flags are backend-owned; the client only
/// reads them and triggers remote mutation.
#[derive(Debug, Clone, Deserialize)]
pub struct ArcDetail {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    /// The stat this arc trains. Backend omits it on old records.
    #[serde(default = "default_stat")]
    pub stat: String,
    #[serde(default)]
    pub streak: i64,
    #[serde(default)]
    pub members: Vec<UserRef>,
}

/// One member's daily progress flag, as returned by `getArcStatus`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProgressEntry {
    pub user: UserRef,
    #[serde(default, rename = "dailyProgress")]
    pub daily_progress: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_ref_matches_both_shapes() {
        let bare: UserRef = serde_json::from_str(r#""alice""#).unwrap();
        assert!(bare.matches("alice"));
        assert!(!bare.matches("bob"));

        let record: UserRef =
            serde_json::from_str(r#"{"id":"u1","username":"alice"}"#).unwrap();
        assert!(record.matches("alice"));
        assert!(record.matches("u1"));
        assert!(!record.matches("bob"));
    }

    #[test]
    fn arc_detail_defaults() {
        let arc: ArcDetail = serde_json::from_str(r#"{"name":"Morning Run"}"#).unwrap();
        assert_eq!(arc.name, "Morning Run");
        assert_eq!(arc.stat, "HP");
        assert_eq!(arc.streak, 0);
        assert!(arc.members.is_empty());
    }

    #[test]
    fn progress_entry_defaults_to_incomplete() {
        let entry: ProgressEntry = serde_json::from_str(r#"{"user":"alice"}"#).unwrap();
        assert!(!entry.daily_progress);

        let entry: ProgressEntry =
            serde_json::from_str(r#"{"user":"alice","dailyProgress":true}"#).unwrap();
        assert!(entry.daily_progress);
    }
}
