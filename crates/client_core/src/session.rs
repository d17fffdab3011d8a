//! Wires the wizard, store and orchestrator to one backend client.

use std::sync::Arc;

use shared::domain::{Project, ProjectId, ProjectSummary};
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::info;

use crate::{
    error::{ClientError, StoreError},
    orchestrator::SectionJobOrchestrator,
    store::{ProjectStore, ProjectStoreHandle},
    wizard::{WizardController, WizardError},
    DocumentClient,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("project {0} was not found")]
    ProjectNotFound(ProjectId),
    #[error("no project is open")]
    NoProject,
    #[error("no creation wizard is open")]
    NoWizard,
    #[error(transparent)]
    Wizard(#[from] WizardError),
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Exported file ready to be written out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedDocument {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Download name for a project: `{title}.{extension}`, kept to a single path
/// component.
pub fn export_file_name(project: &Project) -> String {
    let stem: String = project
        .title
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '\0' => '_',
            other => other,
        })
        .collect();
    let stem = if stem.is_empty() { "document" } else { stem.as_str() };
    format!("{stem}.{}", project.document_type.extension())
}

pub struct DocumentSession {
    client: Arc<dyn DocumentClient>,
    orchestrator: Arc<SectionJobOrchestrator>,
    wizard: Option<WizardController>,
    _merge_task: JoinHandle<()>,
}

impl DocumentSession {
    /// Must be called inside a tokio runtime; starts the store's merge loop.
    pub fn new(client: Arc<dyn DocumentClient>) -> Self {
        let (store, merge_task) = ProjectStoreHandle::spawn(ProjectStore::new());
        let orchestrator = Arc::new(SectionJobOrchestrator::new(client.clone(), store));
        Self {
            client,
            orchestrator,
            wizard: None,
            _merge_task: merge_task,
        }
    }

    pub fn orchestrator(&self) -> &Arc<SectionJobOrchestrator> {
        &self.orchestrator
    }

    pub fn project(&self) -> Option<Project> {
        self.orchestrator.store().snapshot()
    }

    /// Starts a fresh wizard, discarding any draft in progress.
    pub fn open_wizard(&mut self) -> &mut WizardController {
        self.wizard.insert(WizardController::new())
    }

    pub fn wizard_mut(&mut self) -> Option<&mut WizardController> {
        self.wizard.as_mut()
    }

    pub fn close_wizard(&mut self) {
        self.wizard = None;
    }

    /// Submits the open wizard. On success the wizard is dropped and the new
    /// project becomes the open one; on failure the wizard is kept.
    pub async fn submit_wizard(&mut self) -> Result<Project, SessionError> {
        let wizard = self.wizard.as_mut().ok_or(SessionError::NoWizard)?;
        let project = wizard.submit(self.client.as_ref()).await?;
        self.wizard = None;
        self.install(project.clone()).await?;
        Ok(project)
    }

    pub async fn open_project(&self, project_id: ProjectId) -> Result<Project, SessionError> {
        let project = self
            .client
            .get_project(project_id)
            .await
            .map_err(|err| match err {
                ClientError::NotFound(_) => SessionError::ProjectNotFound(project_id),
                other => SessionError::Client(other),
            })?;
        self.install(project.clone()).await?;
        Ok(project)
    }

    pub async fn close_project(&self) -> Result<(), SessionError> {
        self.orchestrator.store().clear().await?;
        self.orchestrator.clear_settled().await;
        Ok(())
    }

    pub async fn list_projects(&self) -> Result<Vec<ProjectSummary>, SessionError> {
        Ok(self.client.list_projects().await?)
    }

    /// Deletes a project on the backend, closing it first if it is open.
    pub async fn delete_project(&self, project_id: ProjectId) -> Result<(), SessionError> {
        self.client.delete_project(project_id).await?;
        if self.project().is_some_and(|p| p.id == project_id) {
            self.close_project().await?;
        }
        info!(project_id = project_id.0, "session: project deleted");
        Ok(())
    }

    pub async fn export(&self) -> Result<ExportedDocument, SessionError> {
        let project = self.project().ok_or(SessionError::NoProject)?;
        let bytes = self.client.export_document(project.id).await?;
        let file_name = export_file_name(&project);
        info!(
            project_id = project.id.0,
            file_name = %file_name,
            size_bytes = bytes.len(),
            "session: document exported"
        );
        Ok(ExportedDocument { file_name, bytes })
    }

    async fn install(&self, project: Project) -> Result<(), SessionError> {
        let project_id = project.id;
        let sections = project.sections.len();
        let previous = self.project().map(|p| p.id);
        self.orchestrator.store().replace(project).await?;
        // Retained errors belong to the project they were raised on.
        if previous != Some(project_id) {
            self.orchestrator.clear_settled().await;
        }
        info!(project_id = project_id.0, sections, "session: project opened");
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
