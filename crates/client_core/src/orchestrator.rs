//! Per-section generate/refine/feedback jobs against the open project.
//!
//! Each job is guarded by its `(section, kind)` entry in the [`JobTable`]: a
//! second call while one is outstanding returns [`JobOutcome::Busy`] without
//! touching anything. Successful content is folded back through the store's
//! merge loop by section id. Jobs on different keys never wait on each other.

use std::sync::Arc;

use shared::domain::{FeedbackKind, Project, ProjectId, SectionId};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

use crate::{
    error::{ClientError, OrchestratorError, ValidationError},
    jobs::{JobKey, JobKind, JobState, JobTable},
    store::ProjectStoreHandle,
    DocumentClient, SectionContent,
};

const JOB_EVENT_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    /// A job for the same key was already in flight; nothing happened.
    Busy,
    Succeeded,
    Failed(String),
}

impl From<&JobState> for JobOutcome {
    fn from(state: &JobState) -> Self {
        match state {
            JobState::Failed { message } => Self::Failed(message.clone()),
            _ => Self::Succeeded,
        }
    }
}

/// State change notifications for front ends. `key == None` is the bulk job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobEvent {
    pub key: Option<JobKey>,
    pub state: JobState,
}

pub struct SectionJobOrchestrator {
    client: Arc<dyn DocumentClient>,
    store: ProjectStoreHandle,
    jobs: Mutex<JobTable>,
    bulk: Mutex<JobState>,
    events: broadcast::Sender<JobEvent>,
}

impl SectionJobOrchestrator {
    pub fn new(client: Arc<dyn DocumentClient>, store: ProjectStoreHandle) -> Self {
        let (events, _) = broadcast::channel(JOB_EVENT_CAPACITY);
        Self {
            client,
            store,
            jobs: Mutex::new(JobTable::new()),
            bulk: Mutex::new(JobState::Idle),
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<JobEvent> {
        self.events.subscribe()
    }

    pub fn store(&self) -> &ProjectStoreHandle {
        &self.store
    }

    pub async fn job_state(&self, section_id: SectionId, kind: JobKind) -> JobState {
        self.jobs.lock().await.state(JobKey::new(section_id, kind))
    }

    pub async fn bulk_state(&self) -> JobState {
        self.bulk.lock().await.clone()
    }

    pub async fn is_section_busy(&self, section_id: SectionId) -> bool {
        self.jobs.lock().await.is_section_busy(section_id)
    }

    /// True while any section job or the bulk job is outstanding.
    pub async fn is_busy(&self) -> bool {
        if self.bulk.lock().await.is_in_flight() {
            return true;
        }
        self.jobs.lock().await.in_flight_count() > 0
    }

    /// Forgets settled job states, e.g. when another project is opened.
    pub async fn clear_settled(&self) {
        self.jobs.lock().await.clear_settled();
    }

    pub async fn generate_one(&self, section_id: SectionId) -> Result<JobOutcome, OrchestratorError> {
        self.ensure_section(section_id)?;
        let key = JobKey::new(section_id, JobKind::Generate);
        if !self.begin(key).await {
            return Ok(JobOutcome::Busy);
        }

        info!(section_id = section_id.0, "jobs: generating section");
        let result = self.client.generate_section(section_id).await;
        Ok(self.complete_content_job(key, result).await)
    }

    pub async fn refine_one(
        &self,
        section_id: SectionId,
        instruction: &str,
    ) -> Result<JobOutcome, OrchestratorError> {
        let instruction = instruction.trim();
        if instruction.is_empty() {
            return Err(ValidationError::new("refinement instruction required").into());
        }
        self.ensure_section(section_id)?;
        let key = JobKey::new(section_id, JobKind::Refine);
        if !self.begin(key).await {
            return Ok(JobOutcome::Busy);
        }

        info!(section_id = section_id.0, "jobs: refining section");
        let result = self.client.refine_section(section_id, instruction).await;
        Ok(self.complete_content_job(key, result).await)
    }

    /// Best-effort like/dislike/comment. Backend failures are logged and kept
    /// as the job's state; they are never returned as errors.
    pub async fn record_feedback(
        &self,
        section_id: SectionId,
        kind: FeedbackKind,
        comment: Option<&str>,
    ) -> Result<JobOutcome, OrchestratorError> {
        let comment = comment.map(str::trim).filter(|text| !text.is_empty());
        if kind == FeedbackKind::Comment && comment.is_none() {
            return Err(ValidationError::new("comment text required").into());
        }
        self.ensure_section(section_id)?;
        let key = JobKey::new(section_id, JobKind::Feedback);
        if !self.begin(key).await {
            return Ok(JobOutcome::Busy);
        }

        let state = match self.client.submit_feedback(section_id, kind, comment).await {
            Ok(_) => {
                debug!(section_id = section_id.0, %kind, "jobs: feedback recorded");
                JobState::Succeeded
            }
            Err(err) => {
                warn!(section_id = section_id.0, %kind, error = %err, "jobs: feedback not recorded");
                JobState::Failed {
                    message: err.to_string(),
                }
            }
        };
        let outcome = JobOutcome::from(&state);
        self.finish(key, state).await;
        Ok(outcome)
    }

    /// Regenerates the whole project as one job and swaps the result in. The
    /// loaded project is left as is when the backend call fails.
    pub async fn generate_all(&self, project_id: ProjectId) -> Result<JobOutcome, OrchestratorError> {
        let loaded = self.loaded_project()?;
        if loaded.id != project_id {
            return Err(OrchestratorError::ProjectMismatch {
                requested: project_id,
                loaded: loaded.id,
            });
        }

        {
            let mut bulk = self.bulk.lock().await;
            if bulk.is_in_flight() {
                debug!(project_id = project_id.0, "jobs: bulk generate already in flight");
                return Ok(JobOutcome::Busy);
            }
            *bulk = JobState::InFlight;
        }
        self.publish(None, JobState::InFlight);

        info!(
            project_id = project_id.0,
            sections = loaded.sections.len(),
            "jobs: generating all sections"
        );
        let state = match self.client.generate_all_sections(project_id).await {
            Ok(project) => {
                let generated = project.generated_count();
                match self.store.replace(project).await {
                    Ok(()) => {
                        info!(project_id = project_id.0, generated, "jobs: project reloaded");
                        JobState::Succeeded
                    }
                    Err(err) => JobState::Failed {
                        message: err.to_string(),
                    },
                }
            }
            Err(err) => {
                warn!(project_id = project_id.0, error = %err, "jobs: bulk generate failed");
                JobState::Failed {
                    message: err.to_string(),
                }
            }
        };

        let outcome = JobOutcome::from(&state);
        *self.bulk.lock().await = state.clone();
        self.publish(None, state);
        Ok(outcome)
    }

    fn loaded_project(&self) -> Result<Project, OrchestratorError> {
        self.store.snapshot().ok_or(OrchestratorError::NoProject)
    }

    fn ensure_section(&self, section_id: SectionId) -> Result<(), OrchestratorError> {
        let project = self.loaded_project()?;
        if project.section(section_id).is_none() {
            return Err(OrchestratorError::UnknownSection(section_id));
        }
        Ok(())
    }

    async fn begin(&self, key: JobKey) -> bool {
        let started = self.jobs.lock().await.try_begin(key);
        if started {
            self.publish(Some(key), JobState::InFlight);
        } else {
            debug!(
                section_id = key.section_id.0,
                kind = ?key.kind,
                "jobs: already in flight; ignoring duplicate request"
            );
        }
        started
    }

    async fn finish(&self, key: JobKey, state: JobState) {
        self.jobs.lock().await.finish(key, state.clone());
        self.publish(Some(key), state);
    }

    async fn complete_content_job(
        &self,
        key: JobKey,
        result: Result<SectionContent, ClientError>,
    ) -> JobOutcome {
        let state = match result {
            Ok(SectionContent { content }) => {
                match self.store.merge_section_content(key.section_id, content).await {
                    Ok(()) => JobState::Succeeded,
                    Err(err) => {
                        warn!(
                            section_id = key.section_id.0,
                            kind = ?key.kind,
                            error = %err,
                            "jobs: result discarded"
                        );
                        JobState::Failed {
                            message: err.to_string(),
                        }
                    }
                }
            }
            Err(err) => {
                warn!(
                    section_id = key.section_id.0,
                    kind = ?key.kind,
                    error = %err,
                    "jobs: backend call failed"
                );
                JobState::Failed {
                    message: err.to_string(),
                }
            }
        };

        let outcome = JobOutcome::from(&state);
        self.finish(key, state).await;
        outcome
    }

    fn publish(&self, key: Option<JobKey>, state: JobState) {
        // No subscribers is fine.
        let _ = self.events.send(JobEvent { key, state });
    }
}

#[cfg(test)]
#[path = "tests/orchestrator_tests.rs"]
mod tests;
