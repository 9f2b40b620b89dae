#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! Client for the VeritasQ compliance-validation space.
//!
//! The flow is one suspend-resume chain per call: resolve a session through
//! the provider chain, upload the document, invoke the validate procedure
//! (named endpoint first, positional index as fallback), and fold the reply
//! into a [`ValidationReport`]. Nothing is cached between calls and
//! concurrent calls are fully independent; a caller abandons a slow request
//! by dropping the future.

pub mod config;
pub mod error;
pub mod invoke;
pub mod provider;
pub mod session;

use serde_json::Value;
use tracing::info;
use veritasq_core::{DocumentFile, ReplyParts, ValidationReport, ValidationRequest};

pub use config::SpaceConfig;
pub use error::ClientError;
pub use provider::{
    connect_via, default_providers, DirectHostProvider, HubLookupProvider, SpaceProvider,
};
pub use session::{EndpointRef, HttpSession, PredictSession, ValidationPayload};

/// Name of the validate endpoint on current space builds.
pub const VALIDATE_ENDPOINT: &str = "validate";

/// Validate a document against the configured space.
///
/// Connection resolution, invocation fallback and reply normalization are
/// all handled here; the caller gets either a well-formed report or the
/// error that made the run fatal.
pub async fn validate_document(
    file: &DocumentFile,
    request: &ValidationRequest,
    config: &SpaceConfig,
) -> Result<ValidationReport, ClientError> {
    let providers = provider::default_providers();
    let session = provider::connect_via(&providers, config).await?;
    validate_with_session(&session, file, request).await
}

/// Run the validation flow on an already-connected session.
pub async fn validate_with_session(
    session: &HttpSession,
    file: &DocumentFile,
    request: &ValidationRequest,
) -> Result<ValidationReport, ClientError> {
    let uploaded = session.upload(file).await?;
    let payload = ValidationPayload::new(uploaded, request);
    let data = payload.to_call_data();

    let endpoints = [EndpointRef::named(VALIDATE_ENDPOINT), EndpointRef::Index(0)];
    let reply = invoke::predict_with_fallback(session, &endpoints, &data).await?;

    let report = finish_report(reply, &file.name)?;
    info!(
        filename = %report.filename,
        rows = report.table.rows.len(),
        has_csv = report.csv_url.is_some(),
        "validation complete"
    );
    Ok(report)
}

/// Parse the reply payload and assemble the report.
pub fn finish_report(reply: Value, fallback_name: &str) -> Result<ValidationReport, ClientError> {
    Ok(ReplyParts::parse(reply)?.into_report(fallback_name))
}
