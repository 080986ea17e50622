//! The result of a single client call.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Serialize, Serializer};
use serde_json::Value;

use super::ErrorResponse;
use crate::Error;

/// Outcome of one request/response cycle.
///
/// A 2xx response is decoded into the caller's `T`. Any other status is a
/// [`FetchFailure`] carrying the raw JSON body; it is a normal return value,
/// not an [`Error`].
///
/// Serializes to the loose wire shape
/// `{ "ok": bool, "status": int, "data": ..., "error"?: ... }`.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchResult<T = Value> {
    Success { status: u16, data: T },
    Failure(FetchFailure),
}

/// A non-2xx response with a JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchFailure {
    pub status: u16,
    /// The parsed response body, whatever its shape.
    pub data: Value,
    /// `data` interpreted as an [`ErrorResponse`], when it has that shape.
    pub error: Option<ErrorResponse>,
}

impl fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.error {
            Some(resp) => write!(
                f,
                "remote returned status {}: {}",
                self.status, resp.error.message
            ),
            None => write!(f, "remote returned status {}", self.status),
        }
    }
}

impl std::error::Error for FetchFailure {}

impl<T> FetchResult<T> {
    /// Mirrors the transport success flag (status 200-299).
    pub fn ok(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn status(&self) -> u16 {
        match self {
            Self::Success { status, .. } => *status,
            Self::Failure(failure) => failure.status,
        }
    }

    /// The decoded payload of a successful response.
    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Success { data, .. } => Some(data),
            Self::Failure(_) => None,
        }
    }

    /// The structured error of a failed response, if the body carried one.
    pub fn error(&self) -> Option<&ErrorResponse> {
        match self {
            Self::Success { .. } => None,
            Self::Failure(failure) => failure.error.as_ref(),
        }
    }

    pub fn into_result(self) -> Result<T, FetchFailure> {
        match self {
            Self::Success { data, .. } => Ok(data),
            Self::Failure(failure) => Err(failure),
        }
    }
}

impl<T: DeserializeOwned> FetchResult<T> {
    /// Parses a response body. The body must be valid JSON regardless of
    /// status; only 2xx bodies are decoded into `T`.
    pub(crate) fn from_body(status: u16, success: bool, body: &[u8]) -> Result<Self, Error> {
        let value: Value =
            serde_json::from_slice(body).map_err(|source| Error::Parse { status, source })?;

        if success {
            let data =
                serde_json::from_value(value).map_err(|source| Error::Parse { status, source })?;
            return Ok(Self::Success { status, data });
        }

        let error = serde_json::from_value::<ErrorResponse>(value.clone()).ok();
        Ok(Self::Failure(FetchFailure {
            status,
            data: value,
            error,
        }))
    }
}

#[derive(Serialize)]
struct Wire<'a, D: Serialize + ?Sized> {
    ok: bool,
    status: u16,
    data: &'a D,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a ErrorResponse>,
}

impl<T: Serialize> Serialize for FetchResult<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Success { status, data } => Wire {
                ok: true,
                status: *status,
                data,
                error: None,
            }
            .serialize(serializer),
            Self::Failure(failure) => Wire {
                ok: false,
                status: failure.status,
                data: &failure.data,
                error: failure.error.as_ref(),
            }
            .serialize(serializer),
        }
    }
}
