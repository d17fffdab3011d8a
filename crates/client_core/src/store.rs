//! The open project and the single point where it is mutated.
//!
//! [`ProjectStore`] is plain data with two write entry points. The
//! [`ProjectStoreHandle`] puts it behind a merge task: every write travels as a
//! [`StoreUpdate`] message and is applied in arrival order, one at a time.

use shared::domain::{Project, SectionId};
use tokio::{
    sync::{mpsc, oneshot, watch},
    task::JoinHandle,
};
use tracing::{debug, warn};

use crate::error::StoreError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreUpdate {
    Replace(Project),
    SectionContent {
        section_id: SectionId,
        content: String,
    },
    Clear,
}

#[derive(Debug, Default, Clone)]
pub struct ProjectStore {
    project: Option<Project>,
}

impl ProjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn project(&self) -> Option<&Project> {
        self.project.as_ref()
    }

    /// Swaps in a whole project, returning the previous one.
    pub fn replace(&mut self, project: Project) -> Option<Project> {
        self.project.replace(project)
    }

    /// Overwrites the content of the section with `section_id`. Title, id and
    /// position are left as loaded.
    pub fn merge_section_content(
        &mut self,
        section_id: SectionId,
        content: String,
    ) -> Result<(), StoreError> {
        let project = self.project.as_mut().ok_or(StoreError::NoProject)?;
        let section = project
            .section_mut(section_id)
            .ok_or(StoreError::UnknownSection(section_id))?;
        section.content = Some(content);
        Ok(())
    }

    pub fn clear(&mut self) -> Option<Project> {
        self.project.take()
    }

    pub fn apply(&mut self, update: StoreUpdate) -> Result<(), StoreError> {
        match update {
            StoreUpdate::Replace(project) => {
                self.replace(project);
                Ok(())
            }
            StoreUpdate::SectionContent {
                section_id,
                content,
            } => self.merge_section_content(section_id, content),
            StoreUpdate::Clear => {
                self.clear();
                Ok(())
            }
        }
    }
}

struct StoreCommand {
    update: StoreUpdate,
    ack: oneshot::Sender<Result<(), StoreError>>,
}

/// Cloneable handle to a running merge loop.
#[derive(Clone)]
pub struct ProjectStoreHandle {
    updates: mpsc::UnboundedSender<StoreCommand>,
    snapshot: watch::Receiver<Option<Project>>,
}

impl ProjectStoreHandle {
    /// Starts the merge loop on the current tokio runtime. The loop exits once
    /// every handle has been dropped.
    pub fn spawn(store: ProjectStore) -> (Self, JoinHandle<()>) {
        let (updates, rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot) = watch::channel(store.project().cloned());
        let task = tokio::spawn(run_merge_loop(store, rx, snapshot_tx));
        (Self { updates, snapshot }, task)
    }

    pub async fn apply(&self, update: StoreUpdate) -> Result<(), StoreError> {
        let (ack, ack_rx) = oneshot::channel();
        self.updates
            .send(StoreCommand { update, ack })
            .map_err(|_| StoreError::Closed)?;
        ack_rx.await.map_err(|_| StoreError::Closed)?
    }

    pub async fn replace(&self, project: Project) -> Result<(), StoreError> {
        self.apply(StoreUpdate::Replace(project)).await
    }

    pub async fn merge_section_content(
        &self,
        section_id: SectionId,
        content: String,
    ) -> Result<(), StoreError> {
        self.apply(StoreUpdate::SectionContent {
            section_id,
            content,
        })
        .await
    }

    pub async fn clear(&self) -> Result<(), StoreError> {
        self.apply(StoreUpdate::Clear).await
    }

    /// Copy of the project as of the last applied update.
    pub fn snapshot(&self) -> Option<Project> {
        self.snapshot.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Project>> {
        self.snapshot.clone()
    }
}

async fn run_merge_loop(
    mut store: ProjectStore,
    mut rx: mpsc::UnboundedReceiver<StoreCommand>,
    snapshot_tx: watch::Sender<Option<Project>>,
) {
    while let Some(StoreCommand { update, ack }) = rx.recv().await {
        let result = store.apply(update);
        match &result {
            Ok(()) => {
                snapshot_tx.send_replace(store.project().cloned());
            }
            Err(err) => warn!(error = %err, "store: update rejected"),
        }
        let _ = ack.send(result);
    }
    debug!("store: merge loop stopped");
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
