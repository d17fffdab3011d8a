use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

id_newtype!(ProjectId);
id_newtype!(SectionId);

/// Output format of a project. Serialized with the backend's file-type names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentKind {
    #[serde(rename = "docx")]
    WordDoc,
    #[serde(rename = "pptx")]
    SlideDeck,
}

impl DocumentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::WordDoc => "docx",
            Self::SlideDeck => "pptx",
        }
    }

    pub fn extension(self) -> &'static str {
        self.as_str()
    }

    /// What one section is called for this kind of document.
    pub fn unit_label(self) -> &'static str {
        match self {
            Self::WordDoc => "section",
            Self::SlideDeck => "slide",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown document kind '{0}' (expected docx or pptx)")]
pub struct UnknownDocumentKind(pub String);

impl FromStr for DocumentKind {
    type Err = UnknownDocumentKind;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "docx" | "word-doc" | "word" => Ok(Self::WordDoc),
            "pptx" | "slide-deck" | "slides" => Ok(Self::SlideDeck),
            _ => Err(UnknownDocumentKind(raw.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackKind {
    Like,
    Dislike,
    Comment,
}

impl FeedbackKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Like => "like",
            Self::Dislike => "dislike",
            Self::Comment => "comment",
        }
    }
}

impl fmt::Display for FeedbackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown feedback kind '{0}' (expected like, dislike or comment)")]
pub struct UnknownFeedbackKind(pub String);

impl FromStr for FeedbackKind {
    type Err = UnknownFeedbackKind;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "like" => Ok(Self::Like),
            "dislike" => Ok(Self::Dislike),
            "comment" => Ok(Self::Comment),
            _ => Err(UnknownFeedbackKind(raw.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub id: SectionId,
    pub project_id: ProjectId,
    pub title: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub section_order: i64,
}

impl Section {
    pub fn is_generated(&self) -> bool {
        self.content.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub title: String,
    pub document_type: DocumentKind,
    pub topic: String,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(
        default,
        deserialize_with = "deserialize_optional_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub sections: Vec<Section>,
}

impl Project {
    pub fn section(&self, section_id: SectionId) -> Option<&Section> {
        self.sections.iter().find(|section| section.id == section_id)
    }

    pub fn section_mut(&mut self, section_id: SectionId) -> Option<&mut Section> {
        self.sections
            .iter_mut()
            .find(|section| section.id == section_id)
    }

    pub fn generated_count(&self) -> usize {
        self.sections.iter().filter(|s| s.is_generated()).count()
    }
}

/// Project row as returned by the listing endpoint (no sections).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSummary {
    pub id: ProjectId,
    pub title: String,
    pub document_type: DocumentKind,
    pub topic: String,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub created_at: DateTime<Utc>,
}

/// Accepts RFC 3339 as well as the zone-less ISO form the backend emits,
/// which is read as UTC.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|parsed| parsed.with_timezone(&Utc))
        .or_else(|_| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").map(|naive| naive.and_utc())
        })
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).map_err(serde::de::Error::custom)
}

fn deserialize_optional_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)?
        .map(|raw| parse_timestamp(&raw).map_err(serde::de::Error::custom))
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_kind_uses_file_type_on_the_wire() {
        assert_eq!(
            serde_json::to_string(&DocumentKind::SlideDeck).expect("serialize"),
            "\"pptx\""
        );
        let kind: DocumentKind = serde_json::from_str("\"docx\"").expect("deserialize");
        assert_eq!(kind, DocumentKind::WordDoc);
    }

    #[test]
    fn document_kind_parses_long_names() {
        assert_eq!("word-doc".parse::<DocumentKind>(), Ok(DocumentKind::WordDoc));
        assert_eq!("Slide-Deck".parse::<DocumentKind>(), Ok(DocumentKind::SlideDeck));
        assert!("pdf".parse::<DocumentKind>().is_err());
    }

    #[test]
    fn project_accepts_zone_less_backend_timestamps() {
        let project: Project = serde_json::from_str(
            r#"{
                "id": 1,
                "user_id": 9,
                "title": "Q4 Report",
                "document_type": "docx",
                "topic": "EV market trends",
                "structure": {"sections": ["Intro"]},
                "created_at": "2026-10-01T09:30:00.123456",
                "updated_at": null,
                "sections": []
            }"#,
        )
        .expect("deserialize");
        assert_eq!(project.created_at.to_rfc3339(), "2026-10-01T09:30:00.123456+00:00");
        assert_eq!(project.updated_at, None);
        assert_eq!(
            parse_timestamp("2026-10-01T09:30:00Z").expect("rfc3339"),
            parse_timestamp("2026-10-01T09:30:00").expect("naive")
        );
    }

    #[test]
    fn ids_honour_format_width() {
        assert_eq!(format!("{:>5}|", ProjectId(42)), "   42|");
        assert_eq!(format!("{:<4}|", SectionId(7)), "7   |");
    }

    #[test]
    fn section_without_content_field_is_ungenerated() {
        let section: Section = serde_json::from_str(
            r#"{"id": 4, "project_id": 1, "title": "Intro"}"#,
        )
        .expect("deserialize");
        assert_eq!(section.id, SectionId(4));
        assert!(!section.is_generated());
        assert_eq!(section.section_order, 0);
    }
}
