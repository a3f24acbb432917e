//! Text codec for the transferable negotiation payload.
//!
//! The encoding is pretty-printed JSON so it survives a human copying it
//! between two windows. Decoding validates the structure before any typed
//! deserialization, so a caller either gets a fully-formed [`OfferPayload`]
//! or an error and nothing in between.

use crate::model::OfferPayload;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("payload is not valid JSON: {0}")]
    Malformed(#[source] serde_json::Error),

    #[error("payload must be a JSON object")]
    NotAnObject,

    #[error("payload is missing the `description` field")]
    MissingDescription,

    #[error("`description` must be an object or null")]
    DescriptionNotAnObject,

    #[error("payload is missing the `candidates` field")]
    MissingCandidates,

    #[error("`candidates` must be an array")]
    CandidatesNotAnArray,

    #[error("payload field has an invalid value: {0}")]
    Invalid(#[source] serde_json::Error),
}

/// Serialize a payload for out-of-band transfer.
pub fn encode(payload: &OfferPayload) -> String {
    serde_json::to_string_pretty(payload).expect("OfferPayload serialization is infallible")
}

/// Parse user-supplied payload text.
pub fn decode(text: &str) -> Result<OfferPayload, DecodeError> {
    let value: Value = serde_json::from_str(text).map_err(DecodeError::Malformed)?;
    let object = value.as_object().ok_or(DecodeError::NotAnObject)?;

    let description = object
        .get("description")
        .ok_or(DecodeError::MissingDescription)?;
    if !description.is_null() && !description.is_object() {
        return Err(DecodeError::DescriptionNotAnObject);
    }

    let candidates = object
        .get("candidates")
        .ok_or(DecodeError::MissingCandidates)?;
    if !candidates.is_array() {
        return Err(DecodeError::CandidatesNotAnArray);
    }

    serde_json::from_value(value).map_err(DecodeError::Invalid)
}
