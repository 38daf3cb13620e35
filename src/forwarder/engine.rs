//! Forwarder engine: ties the filter and the appender together behind the
//! transport callback.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::forwarder::appender::{AppendOutcome, DocAppender};
use crate::forwarder::docs::DocsApi;
use crate::forwarder::filter::{self, MessageFilter};
use crate::forwarder::message::InboundMessage;

/// A second `start()` while a listener is active.
#[derive(Debug)]
pub struct AlreadyStarted;

impl fmt::Display for AlreadyStarted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "forwarder listener is already running")
    }
}

impl std::error::Error for AlreadyStarted {}

/// Max chars of message text quoted in log lines.
const PREVIEW_CHARS: usize = 100;

fn preview(text: &str) -> String {
    text.chars().take(PREVIEW_CHARS).collect()
}

struct Inner<C: DocsApi> {
    filter: MessageFilter,
    appender: DocAppender<C>,
}

/// One forwarder instance: filter state, appender state, and the one-shot
/// started flag.
///
/// All mutation happens under a single lock held across each message, so
/// messages are processed one at a time in arrival order. Exactly one
/// engine should run per process; `start()` enforces that for the embedding
/// host.
pub struct ForwarderEngine<C: DocsApi> {
    inner: Mutex<Inner<C>>,
    started: AtomicBool,
}

impl<C: DocsApi> ForwarderEngine<C> {
    pub fn new(bot_user_id: i64, docs: C, document_id: Option<String>) -> Self {
        Self {
            inner: Mutex::new(Inner {
                filter: MessageFilter::new(bot_user_id),
                appender: DocAppender::new(docs, document_id),
            }),
            started: AtomicBool::new(false),
        }
    }

    /// Claim the listener slot. Fails on the second call so two listeners
    /// can never race on document creation or double-append.
    pub fn start(&self) -> Result<(), AlreadyStarted> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(AlreadyStarted);
        }
        Ok(())
    }

    /// Process one inbound message: admit, test relevance, forward.
    ///
    /// Remote failures are logged and swallowed here; nothing propagates to
    /// the transport callback.
    pub async fn handle_message(&self, msg: InboundMessage) {
        let mut inner = self.inner.lock().await;

        if !inner.filter.admit(&msg) {
            debug!("Dropping message {} (duplicate or self-authored)", msg.key);
            return;
        }

        if !filter::is_relevant(&msg.text) {
            return;
        }

        let text_preview = preview(&msg.text);
        match inner.appender.append(&msg.text).await {
            Ok(AppendOutcome::Created { document_id }) => {
                info!(
                    "📝 Appended message from {} to new document {document_id}: \"{text_preview}\"",
                    msg.author_name
                );
            }
            Ok(AppendOutcome::Appended) => {
                info!("📝 Appended message from {}: \"{text_preview}\"", msg.author_name);
            }
            Err(e) => {
                warn!(
                    "Dropping message {} from {}: {e} (text: \"{text_preview}\")",
                    msg.key, msg.author_name
                );
            }
        }
    }

    #[cfg(test)]
    pub(crate) async fn document_id(&self) -> Option<String> {
        self.inner.lock().await.appender.document_id().map(str::to_string)
    }
}
