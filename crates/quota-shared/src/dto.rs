//! Data Transfer Objects - request/response types for the API.

use serde::{Deserialize, Deserializer, Serialize, de};
use serde_json::Value;

/// Body of `POST /api/hit`.
///
/// Only the `userId` member of an object is read. A missing or non-string `userId`,
/// or an array body, deserializes to `None` so the handler can answer with
/// "userId is required". Scalar bodies are rejected as malformed.
#[derive(Debug, Clone, Default, Serialize)]
pub struct HitRequest {
    #[serde(rename = "userId", skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl<'de> Deserialize<'de> for HitRequest {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let user_id = match Value::deserialize(deserializer)? {
            Value::Object(mut fields) => match fields.remove("userId") {
                Some(Value::String(s)) => Some(s),
                _ => None,
            },
            Value::Array(_) => None,
            other => {
                return Err(de::Error::invalid_type(
                    unexpected(&other),
                    &"a JSON object with a userId",
                ));
            }
        };
        Ok(Self { user_id })
    }
}

fn unexpected(value: &Value) -> de::Unexpected<'_> {
    match value {
        Value::Bool(b) => de::Unexpected::Bool(*b),
        Value::String(s) => de::Unexpected::Str(s),
        Value::Number(_) => de::Unexpected::Other("number"),
        _ => de::Unexpected::Unit,
    }
}

/// Response to an accepted hit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HitResponse {
    pub user_id: String,
    pub minute: String,
    pub count: u32,
    pub limit: u32,
    pub status: String,
}

/// Response of `GET /api/usage/{userId}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageResponse {
    pub user_id: String,
    pub minute: String,
    pub count: u32,
    pub limit: u32,
}

/// Response of `GET /api/health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: String,
    pub store: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_request_accepts_string_user_id() {
        let req: HitRequest = serde_json::from_str(r#"{"userId":"alice"}"#).unwrap();
        assert_eq!(req.user_id.as_deref(), Some("alice"));
    }

    #[test]
    fn test_hit_request_tolerates_missing_or_non_string_user_id() {
        for body in [r#"{}"#, r#"{"userId":42}"#, r#"{"userId":null}"#, r#"{"userId":["a"]}"#] {
            let req: HitRequest = serde_json::from_str(body).unwrap();
            assert_eq!(req.user_id, None, "body: {body}");
        }
    }

    #[test]
    fn test_hit_request_array_body_has_no_user_id() {
        let req: HitRequest = serde_json::from_str(r#"["alice"]"#).unwrap();
        assert_eq!(req.user_id, None);
    }

    #[test]
    fn test_hit_request_rejects_scalar_body() {
        for body in [r#""alice""#, "42", "true", "null"] {
            assert!(serde_json::from_str::<HitRequest>(body).is_err(), "body: {body}");
        }
    }

    #[test]
    fn test_hit_response_uses_camel_case() {
        let json = serde_json::to_value(HitResponse {
            user_id: "alice".into(),
            minute: "2024-05-01T12:00".into(),
            count: 1,
            limit: 5,
            status: "ok".into(),
        })
        .unwrap();

        assert_eq!(json["userId"], "alice");
        assert_eq!(json["status"], "ok");
    }
}
