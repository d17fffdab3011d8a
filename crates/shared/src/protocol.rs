use serde::{Deserialize, Serialize};

use crate::domain::{DocumentKind, FeedbackKind, SectionId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectStructure {
    pub sections: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateProjectRequest {
    pub title: String,
    pub document_type: DocumentKind,
    pub topic: String,
    pub structure: ProjectStructure,
}

impl CreateProjectRequest {
    pub fn section_titles(&self) -> &[String] {
        &self.structure.sections
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateSectionRequest {
    pub section_id: SectionId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefineSectionRequest {
    pub section_id: SectionId,
    pub prompt: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackRequest {
    pub section_id: SectionId,
    pub feedback_type: FeedbackKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionContentResponse {
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_id: Option<SectionId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackAck {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkGenerateResult {
    pub section_id: SectionId,
    pub title: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Per-section outcome list returned by the bulk generate endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkGenerateResponse {
    #[serde(default)]
    pub results: Vec<BulkGenerateResult>,
}

impl BulkGenerateResponse {
    pub fn failures(&self) -> impl Iterator<Item = &BulkGenerateResult> {
        self.results.iter().filter(|result| !result.success)
    }
}
