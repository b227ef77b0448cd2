#![forbid(unsafe_code)]

pub mod cli;
pub mod config;
pub mod decode;
pub mod ingest;
pub mod models;
pub mod report;
pub mod utils;

use anyhow::{Context, Result};

pub use cli::app::{Cli, Command};
pub use decode::{DecodeError, DecodeOutcome, DecodePolicy, Decoder, Registries};
pub use models::{Change, ChangeValue, Entry, EntryPayload, EventEnvelope, MessagingItem};

/// Parses and decodes one webhook body with the standard registries, failing
/// on the first item that does not decode.
pub fn decode_event_str(input: &str) -> Result<EventEnvelope> {
    let value: serde_json::Value =
        serde_json::from_str(input).context("webhook body is not valid JSON")?;
    let outcome = Decoder::standard().decode_envelope(&value)?;
    Ok(outcome.envelope)
}
