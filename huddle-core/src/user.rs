//! User identity and profile types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The authenticated identity yielded by a sign-in flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub uid: String,
    pub email: String,
    /// May be empty when the provider has no display name on file.
    #[serde(default)]
    pub display_name: String,
}

impl Identity {
    /// Display name with the email as fallback, the way users are labeled
    /// everywhere in the app.
    pub fn name_or_email(&self) -> &str {
        if self.display_name.is_empty() {
            &self.email
        } else {
            &self.display_name
        }
    }
}

/// A user profile document (`users/{uid}`).
///
/// Written exactly once, on the first sign-in of a new identity, and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub uid: String,
    pub email: String,
    #[serde(default)]
    pub display_name: String,
    pub created_at: DateTime<Utc>,
}

impl UserProfile {
    pub fn from_identity(identity: &Identity, created_at: DateTime<Utc>) -> Self {
        UserProfile {
            uid: identity.uid.clone(),
            email: identity.email.clone(),
            display_name: identity.display_name.clone(),
            created_at,
        }
    }

    pub fn name_or_email(&self) -> &str {
        if self.display_name.is_empty() {
            &self.email
        } else {
            &self.display_name
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_name_or_email_fallback() {
        let mut identity = Identity {
            uid: "u1".to_string(),
            email: "ann@example.com".to_string(),
            display_name: "Ann".to_string(),
        };
        assert_eq!(identity.name_or_email(), "Ann");

        identity.display_name.clear();
        assert_eq!(identity.name_or_email(), "ann@example.com");
    }

    #[test]
    fn test_profile_serializes_camel_case() {
        let identity = Identity {
            uid: "u1".to_string(),
            email: "ann@example.com".to_string(),
            display_name: "Ann".to_string(),
        };
        let created = Utc.with_ymd_and_hms(2025, 3, 20, 12, 0, 0).unwrap();
        let profile = UserProfile::from_identity(&identity, created);

        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["displayName"], "Ann");
        assert!(json["createdAt"].is_string());
    }
}
