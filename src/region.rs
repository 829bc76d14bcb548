//! The region model: a drawn rectangle with question metadata and content.
//!
//! A region starts life as a *draft* (no server identity) created by the
//! interaction controller, becomes *persisted* once the gateway commit
//! succeeds, and is mutated in place on later updates. The extracted content
//! payload travels with it as structured items.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geometry::Rect;

/// The operator-assigned classification of a region.
///
/// Open string-tagged: the known values cover the paper workflow, anything
/// else round-trips through `Other` untouched. The default is the empty
/// (unset) classification.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum QType {
    /// A standalone question
    Question,
    /// A sub-part of a numbered question
    QuestionPart,
    /// The header line introducing a question
    QuestionHeader,
    /// Shared case-study material
    CaseStudy,
    /// Marking rubric
    Rubric,
    /// Instructions to candidates
    Instruction,
    /// The paper's cover page (at most one per paper)
    CoverPage,
    /// A section heading
    Heading,
    /// A classification the engine does not know about
    Other(String),
    /// Not classified yet
    #[default]
    None,
}

impl QType {
    /// Parse the wire form. Empty input maps to `None`.
    pub fn parse(s: &str) -> QType {
        match s {
            "" => QType::None,
            "question" => QType::Question,
            "question_part" => QType::QuestionPart,
            "question_header" => QType::QuestionHeader,
            "case_study" => QType::CaseStudy,
            "rubric" => QType::Rubric,
            "instruction" => QType::Instruction,
            "cover_page" => QType::CoverPage,
            "heading" => QType::Heading,
            other => QType::Other(other.to_string()),
        }
    }

    /// The wire form ("question_part", "cover_page", ...; empty for unset).
    pub fn as_str(&self) -> &str {
        match self {
            QType::Question => "question",
            QType::QuestionPart => "question_part",
            QType::QuestionHeader => "question_header",
            QType::CaseStudy => "case_study",
            QType::Rubric => "rubric",
            QType::Instruction => "instruction",
            QType::CoverPage => "cover_page",
            QType::Heading => "heading",
            QType::Other(s) => s,
            QType::None => "",
        }
    }

    /// Human-readable label for list displays.
    pub fn display_label(&self) -> String {
        match self {
            QType::Question => "Question".to_string(),
            QType::QuestionPart => "Question Part".to_string(),
            QType::QuestionHeader => "Question Header".to_string(),
            QType::CaseStudy => "Case Study".to_string(),
            QType::Rubric => "Rubric".to_string(),
            QType::Instruction => "Instruction".to_string(),
            QType::CoverPage => "Cover Page".to_string(),
            QType::Heading => "Heading".to_string(),
            QType::Other(s) => s.clone(),
            QType::None => "(type)".to_string(),
        }
    }
}

impl From<String> for QType {
    fn from(s: String) -> Self {
        QType::parse(&s)
    }
}

impl From<QType> for String {
    fn from(q: QType) -> Self {
        q.as_str().to_string()
    }
}

/// One structured content item derived from a block under a region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentItem {
    /// Flowed text from a paragraph block
    Text {
        /// The block's textual content
        text: String,
    },
    /// Tabular content carried as rendered HTML
    Table {
        /// The table markup
        html: String,
    },
    /// Image resources from an image block or embedded in a paragraph
    Image {
        /// Resource URIs
        images: Vec<String>,
    },
}

impl ContentItem {
    /// The content-type tag this item contributes to the rollup.
    pub fn content_type(&self) -> ContentType {
        match self {
            ContentItem::Text { .. } => ContentType::Text,
            ContentItem::Table { .. } => ContentType::Table,
            ContentItem::Image { .. } => ContentType::Image,
        }
    }
}

/// Rollup of what kinds of content a region captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    /// No intersecting content
    #[default]
    None,
    /// A single text item
    Text,
    /// A single table item
    Table,
    /// A single image item
    Image,
    /// More than one item
    Mixed,
}

impl ContentType {
    /// The wire form stored alongside the payload.
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::None => "none",
            ContentType::Text => "text",
            ContentType::Table => "table",
            ContentType::Image => "image",
            ContentType::Mixed => "mixed",
        }
    }
}

/// The structured payload extracted from the blocks under a region.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RegionContent {
    /// Items in document order
    pub items: Vec<ContentItem>,
}

impl RegionContent {
    /// Serialize to the stored JSON form, `{"items":[...]}`.
    pub fn to_json(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse the stored JSON form.
    pub fn from_json(s: &str) -> crate::error::Result<RegionContent> {
        Ok(serde_json::from_str(s)?)
    }

    /// Derive the rollup type: none / the single item's type / mixed.
    pub fn content_type(&self) -> ContentType {
        match self.items.as_slice() {
            [] => ContentType::None,
            [only] => only.content_type(),
            _ => ContentType::Mixed,
        }
    }
}

/// Opaque handles to the backend operations for one persisted region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerRefs {
    /// Handle for update calls
    pub update_ref: String,
    /// Handle for delete calls
    pub delete_ref: String,
    /// Handle for single-region fetches
    pub fetch_ref: String,
}

/// A drawn, annotated rectangle over the paper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Region {
    /// Server-assigned identity; absent until persisted
    pub id: Option<u64>,
    /// Process-local identity so drafts can be tracked before the server
    /// assigns one
    pub draft_key: Uuid,
    /// Position in document space (normalized before extraction/persistence)
    pub rect: Rect,
    /// Free-form question number (may be empty)
    pub question_number: String,
    /// Free-form marks (may be empty)
    pub marks: String,
    /// Operator classification
    pub qtype: QType,
    /// Parent question number (meaningful for question parts)
    pub parent_number: String,
    /// Header text (meaningful for question headers)
    pub header_label: String,
    /// Case study name (meaningful for case studies)
    pub case_study_label: String,
    /// Extracted structured payload
    pub content: RegionContent,
    /// Rollup of the payload's item kinds
    pub content_type: ContentType,
    /// Server-assigned creation time; absent until persisted
    pub created_at: Option<DateTime<Utc>>,
    /// Backend operation handles; present only once persisted
    pub refs: Option<ServerRefs>,
    /// Save order, used when reconstructing the paper
    pub order_index: i64,
}

impl Region {
    /// Create a draft region at the given rectangle, all metadata unset.
    pub fn draft(rect: Rect) -> Self {
        Self {
            id: None,
            draft_key: Uuid::new_v4(),
            rect,
            question_number: String::new(),
            marks: String::new(),
            qtype: QType::None,
            parent_number: String::new(),
            header_label: String::new(),
            case_study_label: String::new(),
            content: RegionContent::default(),
            content_type: ContentType::None,
            created_at: None,
            refs: None,
            order_index: 0,
        }
    }

    /// True once the region has server identity.
    pub fn is_persisted(&self) -> bool {
        self.id.is_some() && self.refs.is_some()
    }

    /// Normalize the rectangle in place (non-negative extent, top-left anchor).
    pub fn normalize_rect(&mut self) {
        self.rect = self.rect.normalized();
    }
}
