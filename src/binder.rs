//! The metadata binder: mapping a region to and from its editable form.
//!
//! The form is the abstraction layer between a region and whatever widget set
//! the host renders. Conditional fields declare which classification makes
//! them visible; hidden fields keep their values (visibility is display-only,
//! so an operator toggling the classification back and forth never loses what
//! they typed). Validation runs at submission time, before any gateway call.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::geometry::Rect;
use crate::region::{QType, Region};

/// A metadata field whose visibility depends on the selected classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionalField {
    /// Parent question number, shown for question parts
    ParentNumber,
    /// Header text, shown for question headers
    HeaderLabel,
    /// Case study name, shown for case studies
    CaseStudyLabel,
}

impl ConditionalField {
    /// All conditional fields, in form layout order.
    pub const ALL: [ConditionalField; 3] = [
        ConditionalField::ParentNumber,
        ConditionalField::HeaderLabel,
        ConditionalField::CaseStudyLabel,
    ];

    /// The classification that makes this field visible.
    pub fn activating_qtype(&self) -> QType {
        match self {
            ConditionalField::ParentNumber => QType::QuestionPart,
            ConditionalField::HeaderLabel => QType::QuestionHeader,
            ConditionalField::CaseStudyLabel => QType::CaseStudy,
        }
    }

    /// Whether this field should be shown for the given classification.
    pub fn visible_for(&self, qtype: &QType) -> bool {
        self.activating_qtype() == *qtype
    }
}

/// The fields currently visible for a classification.
pub fn visible_fields(qtype: &QType) -> Vec<ConditionalField> {
    ConditionalField::ALL
        .into_iter()
        .filter(|f| f.visible_for(qtype))
        .collect()
}

/// Editable form state for one region.
///
/// Values of hidden conditional fields are carried and submitted as-is; only
/// the host's rendering consults [`visible_fields`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegionForm {
    /// Selection geometry, editable through the resize handles
    pub rect: Rect,
    /// Free-form question number
    pub question_number: String,
    /// Free-form marks
    pub marks: String,
    /// Classification driving conditional visibility
    pub qtype: QType,
    /// Parent question number (conditional)
    pub parent_number: String,
    /// Header text (conditional)
    pub header_label: String,
    /// Case study name (conditional)
    pub case_study_label: String,
}

impl RegionForm {
    /// A blank form anchored at the drawn rectangle.
    pub fn for_rect(rect: Rect) -> Self {
        Self {
            rect,
            ..Self::default()
        }
    }

    /// Pre-populate a form from an existing region (edit flow).
    pub fn from_region(region: &Region) -> Self {
        Self {
            rect: region.rect,
            question_number: region.question_number.clone(),
            marks: region.marks.clone(),
            qtype: region.qtype.clone(),
            parent_number: region.parent_number.clone(),
            header_label: region.header_label.clone(),
            case_study_label: region.case_study_label.clone(),
        }
    }

    /// Copy the form's values onto a region. Content is not touched here;
    /// extraction happens in the commit flow after the rect is final.
    pub fn apply_to(&self, region: &mut Region) {
        region.rect = self.rect;
        region.question_number = self.question_number.trim().to_string();
        region.marks = self.marks.trim().to_string();
        region.qtype = self.qtype.clone();
        region.parent_number = self.parent_number.trim().to_string();
        region.header_label = self.header_label.trim().to_string();
        region.case_study_label = self.case_study_label.trim().to_string();
    }
}

/// Validate a form against the persisted working set before committing.
///
/// `editing_id` identifies the region being edited, so updating the existing
/// cover page does not conflict with itself. Geometry arrives already
/// normalized; with `reject_empty` set, a zero-extent rectangle is rejected
/// here rather than persisted.
pub fn validate_submission<'a>(
    form: &RegionForm,
    persisted: impl Iterator<Item = &'a Region>,
    editing_id: Option<u64>,
    reject_empty: bool,
) -> Result<()> {
    if reject_empty && form.rect.is_empty() {
        return Err(Error::Validation(
            "selection has no area; draw or resize it before saving".to_string(),
        ));
    }
    if form.qtype == QType::CoverPage {
        let conflict = persisted
            .filter(|r| r.qtype == QType::CoverPage)
            .any(|r| r.id != editing_id || r.id.is_none());
        if conflict {
            return Err(Error::Validation(
                "only one cover page can be saved for this paper".to_string(),
            ));
        }
    }
    Ok(())
}
