//! Create-or-append decision against the remote document.

use std::fmt;

use tracing::info;

use crate::forwarder::docs::{DocsApi, DocsError};

/// Title used when the first relevant message has to create the document.
pub const DEFAULT_TITLE: &str = "Meeting Minutes";

/// Fixed anchor: immediately after the implicit document-start marker.
/// Every insert lands here, so the document reads newest-first. Inherited
/// behavior, kept on purpose; do not switch to end-of-body appends.
pub const INSERT_INDEX: u32 = 1;

/// Which remote call failed, for the caller's log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    InsertText,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create => write!(f, "documents.create"),
            Self::InsertText => write!(f, "documents.batchUpdate/insertText"),
        }
    }
}

/// A failed append, carrying the operation that was being attempted.
#[derive(Debug)]
pub struct AppendFailure {
    pub operation: Operation,
    pub source: DocsError,
}

impl fmt::Display for AppendFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed: {}", self.operation, self.source)
    }
}

impl std::error::Error for AppendFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum AppendOutcome {
    /// Text inserted into the already-known document.
    Appended,
    /// No document existed yet; one was created first.
    Created { document_id: String },
}

/// Appends message text to the target document, creating it on first use.
///
/// The document id starts from configuration (possibly absent) and is
/// captured in memory after the first successful create. It is never
/// written back anywhere, so a restart forgets it and may create a fresh
/// document.
pub struct DocAppender<C: DocsApi> {
    docs: C,
    document_id: Option<String>,
}

impl<C: DocsApi> DocAppender<C> {
    pub fn new(docs: C, document_id: Option<String>) -> Self {
        Self { docs, document_id }
    }

    pub fn document_id(&self) -> Option<&str> {
        self.document_id.as_deref()
    }

    /// Insert `text` (plus a blank-line separator) at the top of the
    /// target document, creating the document first when none is known.
    ///
    /// Failures are returned, not retried; the caller decides what to log
    /// and always drops the message.
    pub async fn append(&mut self, text: &str) -> Result<AppendOutcome, AppendFailure> {
        let body = format!("{text}\n\n");

        if let Some(id) = &self.document_id {
            self.docs
                .insert_text(id, INSERT_INDEX, &body)
                .await
                .map_err(|source| AppendFailure { operation: Operation::InsertText, source })?;
            return Ok(AppendOutcome::Appended);
        }

        let id = self
            .docs
            .create_document(DEFAULT_TITLE)
            .await
            .map_err(|source| AppendFailure { operation: Operation::Create, source })?;

        info!("📄 Created new document: {id}");

        // Capture the id as soon as creation succeeds, even if the insert
        // below fails: later appends must reuse this document.
        self.document_id = Some(id.clone());

        self.docs
            .insert_text(&id, INSERT_INDEX, &body)
            .await
            .map_err(|source| AppendFailure { operation: Operation::InsertText, source })?;

        Ok(AppendOutcome::Created { document_id: id })
    }
}
