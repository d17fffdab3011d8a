use async_trait::async_trait;
use shared::{
    domain::{FeedbackKind, Project, ProjectId, ProjectSummary, SectionId},
    protocol::{CreateProjectRequest, FeedbackAck},
};

pub mod error;
pub mod http;
pub mod jobs;
pub mod orchestrator;
pub mod session;
pub mod store;
pub mod wizard;

pub use error::{ClientError, OrchestratorError, StoreError, ValidationError};
pub use http::HttpDocumentClient;
pub use jobs::{JobKey, JobKind, JobState};
pub use orchestrator::{JobEvent, JobOutcome, SectionJobOrchestrator};
pub use session::{DocumentSession, ExportedDocument, SessionError};
pub use store::{ProjectStore, ProjectStoreHandle, StoreUpdate};
pub use wizard::{WizardController, WizardError, WizardStep};

/// Generated or refined text for one section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionContent {
    pub content: String,
}

/// Backend operations the orchestrator and wizard depend on. Auth, retries
/// and transport status handling live behind this boundary.
#[async_trait]
pub trait DocumentClient: Send + Sync {
    async fn create_project(
        &self,
        request: &CreateProjectRequest,
    ) -> Result<Project, ClientError>;
    async fn list_projects(&self) -> Result<Vec<ProjectSummary>, ClientError>;
    async fn get_project(&self, project_id: ProjectId) -> Result<Project, ClientError>;
    async fn delete_project(&self, project_id: ProjectId) -> Result<(), ClientError>;
    async fn generate_section(&self, section_id: SectionId)
        -> Result<SectionContent, ClientError>;
    /// Regenerates every section and returns the complete project afterwards.
    async fn generate_all_sections(&self, project_id: ProjectId) -> Result<Project, ClientError>;
    async fn refine_section(
        &self,
        section_id: SectionId,
        instruction: &str,
    ) -> Result<SectionContent, ClientError>;
    async fn submit_feedback(
        &self,
        section_id: SectionId,
        kind: FeedbackKind,
        comment: Option<&str>,
    ) -> Result<FeedbackAck, ClientError>;
    async fn export_document(&self, project_id: ProjectId) -> Result<Vec<u8>, ClientError>;
}

#[cfg(test)]
mod test_support;
