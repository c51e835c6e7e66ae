//! An event writer that records instead of posting.

use async_trait::async_trait;
use serde::Serialize;
use sig_welcome_core::hosting::{EventTarget, EventWriter, HostingError, RepoId};
use std::sync::Mutex;
use tracing::info;

/// A write the bot would have made.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PlannedAction {
    /// Post a comment.
    Comment {
        /// The issue or merge request.
        target: EventTarget,
        /// Comment body.
        body: String,
    },
    /// Define a label in the repository.
    CreateLabel {
        /// Label name.
        name: String,
    },
    /// Attach a label.
    AddLabel {
        /// The issue or merge request.
        target: EventTarget,
        /// Label name.
        name: String,
    },
}

/// Records writes and answers label listings from a real reader.
///
/// Listing labels is a read, so it is forwarded; everything else only
/// lands in [`DryRunWriter::planned`].
pub struct DryRunWriter<'a> {
    labels_from: &'a dyn EventWriter,
    planned: Mutex<Vec<PlannedAction>>,
}

impl<'a> DryRunWriter<'a> {
    /// Creates a recording writer forwarding label listings to `labels_from`.
    pub fn new(labels_from: &'a dyn EventWriter) -> Self {
        Self {
            labels_from,
            planned: Mutex::new(Vec::new()),
        }
    }

    /// Returns the recorded writes in order.
    pub fn planned(&self) -> Vec<PlannedAction> {
        match self.planned.lock() {
            Ok(planned) => planned.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn record(&self, action: PlannedAction) {
        info!("Dry run, not performing: {:?}", action);
        match self.planned.lock() {
            Ok(mut planned) => planned.push(action),
            Err(poisoned) => poisoned.into_inner().push(action),
        }
    }
}

#[async_trait]
impl EventWriter for DryRunWriter<'_> {
    async fn create_comment(
        &self,
        _repo: &RepoId,
        target: EventTarget,
        body: &str,
    ) -> Result<(), HostingError> {
        self.record(PlannedAction::Comment {
            target,
            body: body.to_string(),
        });
        Ok(())
    }

    async fn list_labels(&self, repo: &RepoId) -> Result<Vec<String>, HostingError> {
        self.labels_from.list_labels(repo).await
    }

    async fn create_label(&self, _repo: &RepoId, name: &str) -> Result<(), HostingError> {
        self.record(PlannedAction::CreateLabel {
            name: name.to_string(),
        });
        Ok(())
    }

    async fn add_label(
        &self,
        _repo: &RepoId,
        target: EventTarget,
        name: &str,
    ) -> Result<(), HostingError> {
        self.record(PlannedAction::AddLabel {
            target,
            name: name.to_string(),
        });
        Ok(())
    }
}
