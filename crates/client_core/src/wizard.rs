//! Three-step project creation flow: kind → details → structure.

use shared::{
    domain::{DocumentKind, Project},
    protocol::{CreateProjectRequest, ProjectStructure},
};
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    error::{ClientError, ValidationError},
    DocumentClient,
};

/// Current step. Data validated by earlier steps travels with the variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardStep {
    SelectKind,
    Details {
        kind: DocumentKind,
    },
    Structure {
        kind: DocumentKind,
        title: String,
        topic: String,
    },
}

impl WizardStep {
    pub fn number(&self) -> u8 {
        match self {
            Self::SelectKind => 1,
            Self::Details { .. } => 2,
            Self::Structure { .. } => 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WizardError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{action} is only available in step {expected}")]
    WrongStep { action: &'static str, expected: u8 },
    #[error("already at the first step")]
    AtFirstStep,
    #[error("no step after structure; submit instead")]
    NoForwardStep,
    #[error("at least one section entry must remain")]
    LastSection,
    #[error("no section entry at position {0}")]
    NoSuchSection(usize),
    #[error("project creation failed: {0}")]
    Client(#[from] ClientError),
}

#[derive(Debug, Clone)]
pub struct WizardController {
    step: WizardStep,
    kind: Option<DocumentKind>,
    title: String,
    topic: String,
    sections: Vec<String>,
    last_error: Option<WizardError>,
}

impl Default for WizardController {
    fn default() -> Self {
        Self::new()
    }
}

impl WizardController {
    pub fn new() -> Self {
        Self {
            step: WizardStep::SelectKind,
            kind: None,
            title: String::new(),
            topic: String::new(),
            sections: vec![String::new()],
            last_error: None,
        }
    }

    pub fn step(&self) -> &WizardStep {
        &self.step
    }

    pub fn step_number(&self) -> u8 {
        self.step.number()
    }

    pub fn selected_kind(&self) -> Option<DocumentKind> {
        self.kind
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn sections(&self) -> &[String] {
        &self.sections
    }

    /// Error from the most recent advance or submit attempt.
    pub fn last_error(&self) -> Option<&WizardError> {
        self.last_error.as_ref()
    }

    pub fn select_kind(&mut self, kind: DocumentKind) -> Result<(), WizardError> {
        self.require_step(1, "choosing a document kind")?;
        self.kind = Some(kind);
        Ok(())
    }

    pub fn set_title(&mut self, title: impl Into<String>) -> Result<(), WizardError> {
        self.require_step(2, "editing the title")?;
        self.title = title.into();
        Ok(())
    }

    pub fn set_topic(&mut self, topic: impl Into<String>) -> Result<(), WizardError> {
        self.require_step(2, "editing the topic")?;
        self.topic = topic.into();
        Ok(())
    }

    pub fn add_section(&mut self) -> Result<(), WizardError> {
        self.require_step(3, "adding a section")?;
        self.sections.push(String::new());
        Ok(())
    }

    pub fn remove_section(&mut self, index: usize) -> Result<(), WizardError> {
        self.require_step(3, "removing a section")?;
        if index >= self.sections.len() {
            return Err(WizardError::NoSuchSection(index));
        }
        if self.sections.len() == 1 {
            return Err(WizardError::LastSection);
        }
        self.sections.remove(index);
        Ok(())
    }

    pub fn set_section_title(
        &mut self,
        index: usize,
        title: impl Into<String>,
    ) -> Result<(), WizardError> {
        self.require_step(3, "editing a section")?;
        let slot = self
            .sections
            .get_mut(index)
            .ok_or(WizardError::NoSuchSection(index))?;
        *slot = title.into();
        Ok(())
    }

    /// Moves forward one step if the current step's fields are valid. On
    /// failure the step is unchanged and the error is retained.
    pub fn advance(&mut self) -> Result<(), WizardError> {
        let next: Result<WizardStep, WizardError> = match &self.step {
            WizardStep::SelectKind => self
                .kind
                .map(|kind| WizardStep::Details { kind })
                .ok_or_else(|| ValidationError::new("kind required").into()),
            WizardStep::Details { kind } => {
                let title = self.title.trim();
                let topic = self.topic.trim();
                if title.is_empty() || topic.is_empty() {
                    Err(ValidationError::new("title/topic required").into())
                } else {
                    Ok(WizardStep::Structure {
                        kind: *kind,
                        title: title.to_string(),
                        topic: topic.to_string(),
                    })
                }
            }
            WizardStep::Structure { .. } => Err(WizardError::NoForwardStep),
        };

        match next {
            Ok(step) => {
                self.step = step;
                self.last_error = None;
                Ok(())
            }
            Err(err) => {
                self.last_error = Some(err.clone());
                Err(err)
            }
        }
    }

    /// Moves back one step, keeping every field and the last error as they are.
    pub fn retreat(&mut self) -> Result<(), WizardError> {
        self.step = match &self.step {
            WizardStep::SelectKind => return Err(WizardError::AtFirstStep),
            WizardStep::Details { .. } => WizardStep::SelectKind,
            WizardStep::Structure { kind, .. } => WizardStep::Details { kind: *kind },
        };
        Ok(())
    }

    /// Creation request from the current draft, with blank section titles
    /// dropped.
    pub fn build_request(&self) -> Result<CreateProjectRequest, WizardError> {
        let WizardStep::Structure { kind, title, topic } = &self.step else {
            return Err(WizardError::WrongStep {
                action: "submitting",
                expected: 3,
            });
        };
        let sections: Vec<String> = self
            .sections
            .iter()
            .map(|title| title.trim())
            .filter(|title| !title.is_empty())
            .map(str::to_string)
            .collect();
        if sections.is_empty() {
            return Err(ValidationError::new("no sections").into());
        }

        Ok(CreateProjectRequest {
            title: title.clone(),
            document_type: *kind,
            topic: topic.clone(),
            structure: ProjectStructure { sections },
        })
    }

    /// Sends the creation request. The wizard stays in the structure step with
    /// its draft intact if anything fails.
    pub async fn submit(&mut self, client: &dyn DocumentClient) -> Result<Project, WizardError> {
        let result = match self.build_request() {
            Ok(request) => client
                .create_project(&request)
                .await
                .map_err(WizardError::from),
            Err(err) => Err(err),
        };

        match result {
            Ok(project) => {
                info!(
                    project_id = project.id.0,
                    sections = project.sections.len(),
                    kind = %project.document_type,
                    "wizard: project created"
                );
                self.last_error = None;
                Ok(project)
            }
            Err(err) => {
                warn!(error = %err, "wizard: submission failed");
                self.last_error = Some(err.clone());
                Err(err)
            }
        }
    }

    fn require_step(&self, expected: u8, action: &'static str) -> Result<(), WizardError> {
        if self.step.number() == expected {
            Ok(())
        } else {
            Err(WizardError::WrongStep { action, expected })
        }
    }
}

#[cfg(test)]
#[path = "tests/wizard_tests.rs"]
mod tests;
