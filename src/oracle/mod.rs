//! Combination oracle client
//!
//! The oracle is a remote HTTP service that answers "what do A and B make?".
//! This module contains:
//! - Building the HTTP client
//! - A single combine request and its response decoding
//! - Retry logic keyed on a typed failure classification

mod client;

pub use client::{build_http_client, OracleClient, RetryPolicy};

use serde::Deserialize;
use thiserror::Error;

/// An element as sent to the oracle
///
/// Only `text` goes over the wire; `icon` rides along for log lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementRef {
    pub text: String,
    pub icon: String,
}

impl ElementRef {
    pub fn new(text: impl Into<String>, icon: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            icon: icon.into(),
        }
    }
}

impl From<&crate::graph::Element> for ElementRef {
    fn from(element: &crate::graph::Element) -> Self {
        Self::new(element.text.clone(), element.icon.clone())
    }
}

/// The oracle's answer for one pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CombinationResult {
    /// The pair produces nothing
    Nothing,

    /// The pair produces an element
    Found {
        result_text: String,
        result_icon: String,
        /// First time anyone combined this pair, according to the oracle
        is_new: bool,
    },
}

/// Raw JSON body returned by the oracle
#[derive(Debug, Deserialize)]
struct OracleResponse {
    result: String,
    #[serde(default)]
    emoji: String,
    #[serde(default, rename = "isNew")]
    is_new: bool,
}

/// Text the oracle uses to say a pair makes nothing
const NOTHING: &str = "Nothing";

impl From<OracleResponse> for CombinationResult {
    fn from(response: OracleResponse) -> Self {
        if response.result == NOTHING {
            CombinationResult::Nothing
        } else {
            CombinationResult::Found {
                result_text: response.result,
                result_icon: response.emoji,
                is_new: response.is_new,
            }
        }
    }
}

/// How a failed request failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The request never produced a response (connect, DNS, reset, timeout)
    Network,
    /// A response arrived but was unusable (bad status, empty or malformed body)
    Response,
}

/// Oracle request errors
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("Oracle returned HTTP {0}")]
    Status(u16),

    #[error("Oracle returned an empty body")]
    EmptyBody,

    #[error("Malformed oracle response: {0}")]
    Malformed(#[source] serde_json::Error),

    #[error("Oracle unavailable for {first} + {second} after {attempts} attempts: {last}")]
    OracleUnavailable {
        first: String,
        second: String,
        attempts: u32,
        last: Box<OracleError>,
    },
}

impl OracleError {
    /// Classifies the failure for the retry loop
    pub fn kind(&self) -> FailureKind {
        match self {
            OracleError::Network(_) => FailureKind::Network,
            OracleError::OracleUnavailable { last, .. } => last.kind(),
            OracleError::Status(_) | OracleError::EmptyBody | OracleError::Malformed(_) => {
                FailureKind::Response
            }
        }
    }
}

/// Decodes a response body into a combination result
fn decode_body(body: &str) -> Result<CombinationResult, OracleError> {
    if body.trim().is_empty() {
        return Err(OracleError::EmptyBody);
    }
    let response: OracleResponse = serde_json::from_str(body).map_err(OracleError::Malformed)?;
    Ok(response.into())
}
