use anyhow::{anyhow, Context};
use serde_json::json;

#[derive(Debug, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("Unknown error: {0}")]
    Unknown(String),

    #[error("Permission denied")]
    PermissionDenied,

    #[error("No account to load votes for")]
    NoAccount,

    #[error("No item ids to load votes for")]
    NoTargets,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid vote direction {0:?}")]
    InvalidDirection(String),
}

impl Error {
    /// Whether the caller sent something wrong, as opposed to a transient failure.
    /// Caller errors must not be retried.
    pub fn is_caller_error(&self) -> bool {
        !matches!(self, Error::Unknown(_))
    }

    pub fn status_code(&self) -> http::StatusCode {
        use http::StatusCode;
        match self {
            Error::Unknown(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::PermissionDenied => StatusCode::FORBIDDEN,
            Error::NoAccount => StatusCode::UNAUTHORIZED,
            Error::NoTargets => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::InvalidDirection(_) => StatusCode::BAD_REQUEST,
        }
    }

    pub fn contents(&self) -> Vec<u8> {
        serde_json::to_vec(&match self {
            Error::Unknown(msg) => json!({
                "message": msg,
                "type": "unknown",
            }),
            Error::PermissionDenied => json!({
                "message": "permission denied",
                "type": "permission-denied",
            }),
            Error::NoAccount => json!({
                "message": "no account to load votes for",
                "type": "no-account",
            }),
            Error::NoTargets => json!({
                "message": "no item ids to load votes for",
                "type": "no-targets",
            }),
            Error::NotFound(what) => json!({
                "message": "not found",
                "type": "not-found",
                "what": what,
            }),
            Error::InvalidDirection(d) => json!({
                "message": "invalid vote direction",
                "type": "invalid-direction",
                "direction": d,
            }),
        })
        .expect("serializing error")
    }

    pub fn parse(body: &[u8]) -> anyhow::Result<Error> {
        let data: serde_json::Value =
            serde_json::from_slice(body).context("parsing error contents")?;
        let field = |name: &str| data.get(name).and_then(|v| v.as_str());
        Ok(
            match field("type").ok_or_else(|| anyhow!("error type is not a string"))? {
                "unknown" => Error::Unknown(String::from(field("message").unwrap_or(""))),
                "permission-denied" => Error::PermissionDenied,
                "no-account" => Error::NoAccount,
                "no-targets" => Error::NoTargets,
                "not-found" => Error::NotFound(String::from(
                    field("what").ok_or_else(|| anyhow!("error is a not-found without a what"))?,
                )),
                "invalid-direction" => Error::InvalidDirection(String::from(
                    field("direction").ok_or_else(|| {
                        anyhow!("error is an invalid direction but no direction was provided")
                    })?,
                )),
                _ => return Err(anyhow!("error contents has unknown type")),
            },
        )
    }
}
