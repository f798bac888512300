//! Identity-provider protocol types.
//!
//! Defines the JSON protocol spoken between huddle and identity-provider
//! binaries over stdin/stdout.

use serde::{Deserialize, Serialize};

/// Commands that identity providers must implement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    /// Run the interactive sign-in flow; responds with the identity
    /// (`uid`, `email`, `displayName`).
    Authenticate,
}

/// Request sent from huddle to a provider.
#[derive(Debug, Serialize, Deserialize)]
pub struct Request {
    pub command: Command,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// Response sent from a provider to huddle.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Response<T> {
    Success { data: T },
    Error { error: String },
}

impl<T: Serialize> Response<T> {
    pub fn success(data: T) -> String {
        serde_json::to_string(&Response::Success { data }).unwrap()
    }
}

impl Response<()> {
    pub fn error(msg: &str) -> String {
        serde_json::to_string(&Response::<()>::Error {
            error: msg.to_string(),
        })
        .unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user::Identity;

    #[test]
    fn test_response_round_trip() {
        let identity = Identity {
            uid: "u1".to_string(),
            email: "ann@example.com".to_string(),
            display_name: "Ann".to_string(),
        };

        let wire = Response::success(identity.clone());
        let parsed: Response<Identity> = serde_json::from_str(&wire).unwrap();
        match parsed {
            Response::Success { data } => assert_eq!(data, identity),
            Response::Error { error } => panic!("unexpected error: {error}"),
        }
    }

    #[test]
    fn test_error_shape() {
        let wire = Response::error("user closed the popup");
        assert!(wire.contains("\"status\":\"error\""));
    }
}
