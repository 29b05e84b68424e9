//! Login request/response records

use serde::{Deserialize, Deserializer, Serialize};

/// Body of `POST /web/users/login`
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    /// Admin username
    pub username: String,
    /// Plain password, sent over the configured transport
    pub password: String,
}

/// Payload returned by a successful login
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginData {
    /// Bearer token for later requests
    pub access_token: String,
    /// Token lifetime as reported by the server (seconds)
    #[serde(default, deserialize_with = "string_or_number")]
    pub expires_in: String,
}

// The server has sent both "3600" and 3600 here.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expires_in_accepts_string_and_number() {
        let a: LoginData =
            serde_json::from_str(r#"{"access_token":"abc","expires_in":"3600"}"#).unwrap();
        let b: LoginData =
            serde_json::from_str(r#"{"access_token":"abc","expires_in":3600}"#).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.expires_in, "3600");
    }
}
