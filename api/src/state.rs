use std::sync::Arc;

use inboxcal_core::contacts::ContactDirectory;

use crate::completion::CompletionClient;
use crate::extraction::MeetingExtractor;
use crate::mailbox::{AcknowledgingMailbox, Mailbox};

/// Shared, immutable per-process state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub contacts: Arc<ContactDirectory>,
    pub extractor: Arc<MeetingExtractor>,
    pub mailbox: Arc<dyn Mailbox>,
}

impl AppState {
    pub fn new(contacts: ContactDirectory, completion: Arc<dyn CompletionClient>) -> Self {
        Self {
            contacts: Arc::new(contacts),
            extractor: Arc::new(MeetingExtractor::new(completion)),
            mailbox: Arc::new(AcknowledgingMailbox),
        }
    }
}
