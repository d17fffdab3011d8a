//! [`DocumentClient`] over the backend's REST API.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use shared::{
    domain::{FeedbackKind, Project, ProjectId, ProjectSummary, SectionId},
    error::{ApiError, ErrorCode},
    protocol::{
        BulkGenerateResponse, CreateProjectRequest, FeedbackAck, FeedbackRequest,
        GenerateSectionRequest, RefineSectionRequest, SectionContentResponse,
    },
};
use tracing::{debug, warn};

use crate::{error::ClientError, DocumentClient, SectionContent};

pub struct HttpDocumentClient {
    http: Client,
    server_url: String,
    auth_token: Option<String>,
}

impl HttpDocumentClient {
    pub fn new(server_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), server_url)
    }

    pub fn with_client(http: Client, server_url: impl Into<String>) -> Self {
        let server_url = server_url.into().trim_end_matches('/').to_string();
        Self {
            http,
            server_url,
            auth_token: None,
        }
    }

    /// Attaches `Authorization: Bearer <token>` to every request.
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.server_url)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.auth_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ClientError> {
        let response = self.authorized(request).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let raw = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiError>(&raw)
            .map(|body| body.message())
            .unwrap_or_else(|_| {
                if raw.trim().is_empty() {
                    status.to_string()
                } else {
                    raw
                }
            });
        warn!(status = status.as_u16(), %message, "http: backend rejected request");
        Err(match ErrorCode::from_status(status.as_u16()) {
            ErrorCode::NotFound => ClientError::NotFound(message),
            ErrorCode::Validation => ClientError::Validation(message),
            ErrorCode::Unauthorized => ClientError::Unauthorized(message),
            ErrorCode::Internal => ClientError::Service(message),
        })
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
        let response = self.send(request).await?;
        Ok(response.json().await?)
    }
}

#[async_trait]
impl DocumentClient for HttpDocumentClient {
    async fn create_project(&self, request: &CreateProjectRequest) -> Result<Project, ClientError> {
        let created: Project = self
            .send_json(self.http.post(self.url("/api/projects/")).json(request))
            .await?;
        // The create endpoint answers without sections; fetch the full project.
        if created.sections.is_empty() && !request.section_titles().is_empty() {
            return self.get_project(created.id).await;
        }
        Ok(created)
    }

    async fn list_projects(&self) -> Result<Vec<ProjectSummary>, ClientError> {
        self.send_json(self.http.get(self.url("/api/projects/")))
            .await
    }

    async fn get_project(&self, project_id: ProjectId) -> Result<Project, ClientError> {
        self.send_json(self.http.get(self.url(&format!("/api/projects/{project_id}"))))
            .await
    }

    async fn delete_project(&self, project_id: ProjectId) -> Result<(), ClientError> {
        self.send(self.http.delete(self.url(&format!("/api/projects/{project_id}"))))
            .await?;
        Ok(())
    }

    async fn generate_section(&self, section_id: SectionId) -> Result<SectionContent, ClientError> {
        let body: SectionContentResponse = self
            .send_json(
                self.http
                    .post(self.url("/api/documents/generate-section-content"))
                    .json(&GenerateSectionRequest { section_id }),
            )
            .await?;
        Ok(SectionContent {
            content: body.content,
        })
    }

    async fn generate_all_sections(&self, project_id: ProjectId) -> Result<Project, ClientError> {
        let summary: BulkGenerateResponse = self
            .send_json(
                self.http
                    .post(self.url(&format!("/api/documents/generate-all-content/{project_id}"))),
            )
            .await?;
        for failure in summary.failures() {
            debug!(
                project_id = project_id.0,
                section_id = failure.section_id.0,
                error = failure.error.as_deref().unwrap_or_default(),
                "http: bulk generate skipped a section"
            );
        }
        // The bulk endpoint reports per-section outcomes, not the project.
        self.get_project(project_id).await
    }

    async fn refine_section(
        &self,
        section_id: SectionId,
        instruction: &str,
    ) -> Result<SectionContent, ClientError> {
        let body: SectionContentResponse = self
            .send_json(
                self.http
                    .post(self.url("/api/documents/refine-section-content"))
                    .json(&RefineSectionRequest {
                        section_id,
                        prompt: instruction.to_string(),
                    }),
            )
            .await?;
        Ok(SectionContent {
            content: body.content,
        })
    }

    async fn submit_feedback(
        &self,
        section_id: SectionId,
        kind: FeedbackKind,
        comment: Option<&str>,
    ) -> Result<FeedbackAck, ClientError> {
        self.send_json(
            self.http
                .post(self.url("/api/documents/feedback"))
                .json(&FeedbackRequest {
                    section_id,
                    feedback_type: kind,
                    comment: comment.map(str::to_string),
                }),
        )
        .await
    }

    async fn export_document(&self, project_id: ProjectId) -> Result<Vec<u8>, ClientError> {
        let response = self
            .send(self.http.get(self.url(&format!("/api/documents/export/{project_id}"))))
            .await?;
        Ok(response.bytes().await?.to_vec())
    }
}

#[cfg(test)]
#[path = "tests/http_tests.rs"]
mod tests;
