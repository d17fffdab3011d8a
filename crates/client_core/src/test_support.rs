//! Fixtures shared by the unit tests.

use std::{
    collections::{HashMap, VecDeque},
    sync::{
        atomic::{AtomicI64, Ordering},
        Arc,
    },
};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use shared::{
    domain::{FeedbackKind, Project, ProjectId, ProjectSummary, Section, SectionId},
    protocol::{CreateProjectRequest, FeedbackAck},
};
use tokio::sync::{Mutex, Notify};

use crate::{ClientError, DocumentClient, SectionContent};

pub(crate) fn sample_project(id: i64, titles: &[&str]) -> Project {
    Project {
        id: ProjectId(id),
        title: "Q4 Report".into(),
        document_type: shared::domain::DocumentKind::WordDoc,
        topic: "EV market trends".into(),
        created_at: Utc.with_ymd_and_hms(2026, 10, 1, 9, 0, 0).unwrap(),
        updated_at: None,
        sections: titles
            .iter()
            .enumerate()
            .map(|(idx, title)| Section {
                id: SectionId(id * 100 + idx as i64 + 1),
                project_id: ProjectId(id),
                title: (*title).to_string(),
                content: None,
                section_order: idx as i64,
            })
            .collect(),
    }
}

/// Lets a test hold a fake call open until it chooses to release it.
#[derive(Default)]
pub(crate) struct Gate {
    started: Notify,
    release: Notify,
}

impl Gate {
    pub(crate) async fn wait_started(&self) {
        self.started.notified().await;
    }

    pub(crate) fn release(&self) {
        self.release.notify_one();
    }

    async fn pass(&self) {
        self.started.notify_one();
        self.release.notified().await;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    Create(CreateProjectRequest),
    List,
    Get(ProjectId),
    Delete(ProjectId),
    Generate(SectionId),
    GenerateAll(ProjectId),
    Refine(SectionId, String),
    Feedback(SectionId, FeedbackKind, Option<String>),
    Export(ProjectId),
}

/// Scripted in-memory backend. Each section call pops its next scripted
/// result, falling back to a canned success.
#[derive(Default)]
pub(crate) struct FakeDocumentClient {
    pub(crate) projects: Mutex<HashMap<ProjectId, Project>>,
    pub(crate) calls: Mutex<Vec<Call>>,
    pub(crate) section_results: Mutex<HashMap<SectionId, VecDeque<Result<String, ClientError>>>>,
    pub(crate) fail_create: Mutex<Option<ClientError>>,
    pub(crate) fail_generate_all: Mutex<Option<ClientError>>,
    pub(crate) fail_feedback: Mutex<Option<ClientError>>,
    pub(crate) gates: Mutex<HashMap<SectionId, Arc<Gate>>>,
    pub(crate) bulk_gate: Mutex<Option<Arc<Gate>>>,
    next_id: AtomicI64,
}

impl FakeDocumentClient {
    pub(crate) fn new() -> Self {
        Self {
            next_id: AtomicI64::new(1),
            ..Self::default()
        }
    }

    pub(crate) fn with_project(project: Project) -> Self {
        let client = Self::new();
        client
            .projects
            .try_lock()
            .expect("fresh mutex")
            .insert(project.id, project);
        client
    }

    pub(crate) async fn script(&self, section_id: SectionId, result: Result<&str, ClientError>) {
        self.section_results
            .lock()
            .await
            .entry(section_id)
            .or_default()
            .push_back(result.map(str::to_string));
    }

    pub(crate) async fn gate(&self, section_id: SectionId) -> Arc<Gate> {
        let gate = Arc::new(Gate::default());
        self.gates.lock().await.insert(section_id, gate.clone());
        gate
    }

    pub(crate) async fn gate_bulk(&self) -> Arc<Gate> {
        let gate = Arc::new(Gate::default());
        *self.bulk_gate.lock().await = Some(gate.clone());
        gate
    }

    pub(crate) async fn calls(&self) -> Vec<Call> {
        self.calls.lock().await.clone()
    }

    async fn section_call(&self, section_id: SectionId, fallback: String) -> Result<SectionContent, ClientError> {
        let gate = self.gates.lock().await.get(&section_id).cloned();
        if let Some(gate) = gate {
            gate.pass().await;
        }
        let scripted = self
            .section_results
            .lock()
            .await
            .get_mut(&section_id)
            .and_then(VecDeque::pop_front);
        scripted
            .unwrap_or(Ok(fallback))
            .map(|content| SectionContent { content })
    }
}

#[async_trait]
impl DocumentClient for FakeDocumentClient {
    async fn create_project(&self, request: &CreateProjectRequest) -> Result<Project, ClientError> {
        self.calls.lock().await.push(Call::Create(request.clone()));
        if let Some(err) = self.fail_create.lock().await.clone() {
            return Err(err);
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let titles: Vec<&str> = request.section_titles().iter().map(String::as_str).collect();
        let mut project = sample_project(id, &titles);
        project.title = request.title.clone();
        project.topic = request.topic.clone();
        project.document_type = request.document_type;
        self.projects.lock().await.insert(project.id, project.clone());
        Ok(project)
    }

    async fn list_projects(&self) -> Result<Vec<ProjectSummary>, ClientError> {
        self.calls.lock().await.push(Call::List);
        let projects = self.projects.lock().await;
        Ok(projects
            .values()
            .map(|p| ProjectSummary {
                id: p.id,
                title: p.title.clone(),
                document_type: p.document_type,
                topic: p.topic.clone(),
                created_at: p.created_at,
            })
            .collect())
    }

    async fn get_project(&self, project_id: ProjectId) -> Result<Project, ClientError> {
        self.calls.lock().await.push(Call::Get(project_id));
        self.projects
            .lock()
            .await
            .get(&project_id)
            .cloned()
            .ok_or_else(|| ClientError::NotFound("Project not found".into()))
    }

    async fn delete_project(&self, project_id: ProjectId) -> Result<(), ClientError> {
        self.calls.lock().await.push(Call::Delete(project_id));
        self.projects
            .lock()
            .await
            .remove(&project_id)
            .map(|_| ())
            .ok_or_else(|| ClientError::NotFound("Project not found".into()))
    }

    async fn generate_section(&self, section_id: SectionId) -> Result<SectionContent, ClientError> {
        self.calls.lock().await.push(Call::Generate(section_id));
        self.section_call(section_id, format!("generated {section_id}"))
            .await
    }

    async fn generate_all_sections(&self, project_id: ProjectId) -> Result<Project, ClientError> {
        self.calls.lock().await.push(Call::GenerateAll(project_id));
        let gate = self.bulk_gate.lock().await.clone();
        if let Some(gate) = gate {
            gate.pass().await;
        }
        if let Some(err) = self.fail_generate_all.lock().await.clone() {
            return Err(err);
        }
        let mut projects = self.projects.lock().await;
        let project = projects
            .get_mut(&project_id)
            .ok_or_else(|| ClientError::NotFound("Project not found".into()))?;
        for section in &mut project.sections {
            if section.content.is_none() {
                section.content = Some(format!("bulk {}", section.id));
            }
        }
        Ok(project.clone())
    }

    async fn refine_section(
        &self,
        section_id: SectionId,
        instruction: &str,
    ) -> Result<SectionContent, ClientError> {
        self.calls
            .lock()
            .await
            .push(Call::Refine(section_id, instruction.to_string()));
        self.section_call(section_id, format!("refined {section_id}: {instruction}"))
            .await
    }

    async fn submit_feedback(
        &self,
        section_id: SectionId,
        kind: FeedbackKind,
        comment: Option<&str>,
    ) -> Result<FeedbackAck, ClientError> {
        self.calls.lock().await.push(Call::Feedback(
            section_id,
            kind,
            comment.map(str::to_string),
        ));
        if let Some(err) = self.fail_feedback.lock().await.clone() {
            return Err(err);
        }
        Ok(FeedbackAck {
            feedback_id: Some(1),
        })
    }

    async fn export_document(&self, project_id: ProjectId) -> Result<Vec<u8>, ClientError> {
        self.calls.lock().await.push(Call::Export(project_id));
        if self.projects.lock().await.contains_key(&project_id) {
            Ok(b"PK\x03\x04fake-office-file".to_vec())
        } else {
            Err(ClientError::NotFound("Project not found".into()))
        }
    }
}
