use serde::Serialize;

use crate::error::{InvokeError, InvokeResult};

/// Status token returned by state-changing functions without a sequence number.
pub const OK: &str = "OK";

/// The success/failure envelope handed back to the host.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Response {
    Success { payload: String },
    Error { kind: String, message: String },
}

impl Response {
    pub fn success(payload: impl Into<String>) -> Self {
        Self::Success {
            payload: payload.into(),
        }
    }

    pub fn error(err: &InvokeError) -> Self {
        Self::Error {
            kind: err.kind().as_str().to_string(),
            message: err.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// The payload on success, the message on failure.
    pub fn body(&self) -> &str {
        match self {
            Self::Success { payload } => payload,
            Self::Error { message, .. } => message,
        }
    }
}

impl From<InvokeResult<String>> for Response {
    fn from(result: InvokeResult<String>) -> Self {
        match result {
            Ok(payload) => Self::success(payload),
            Err(err) => Self::error(&err),
        }
    }
}

#[derive(Serialize)]
struct Counter {
    counter: u64,
}

/// `{"counter":n}` payload for a newly assigned sequence number.
pub fn counter(n: u64) -> InvokeResult<String> {
    json(&Counter { counter: n })
}

/// JSON payload of a snapshot or record.
pub fn json<T: Serialize>(value: &T) -> InvokeResult<String> {
    serde_json::to_string(value).map_err(|e| InvokeError::Encode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use medfund_ledger::LedgerError;

    #[test]
    fn counter_payload() {
        assert_eq!(counter(3).unwrap(), r#"{"counter":3}"#);
    }

    #[test]
    fn error_envelope_carries_kind() {
        let err = InvokeError::from(LedgerError::NotFound("application A1".into()));
        let response = Response::error(&err);
        assert!(!response.is_success());
        assert_eq!(
            response,
            Response::Error {
                kind: "not_found".into(),
                message: "not found: application A1".into(),
            }
        );
    }

    #[test]
    fn envelope_serializes_with_status_tag() {
        let value = serde_json::to_value(Response::success(OK)).unwrap();
        assert_eq!(value["status"], "success");
        assert_eq!(value["payload"], "OK");
    }
}
