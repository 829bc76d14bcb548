//! # Exam Lasso
//!
//! Region annotation engine for exam papers: draw and resize rectangular
//! regions over a paper's laid-out content blocks, extract the content each
//! region covers, bind question metadata to it, and persist the result
//! through a pluggable gateway.
//!
//! ## Core Features
//!
//! - **Geometry**: corner-agnostic rectangle normalization, strict-overlap
//!   intersection, eight-handle resize with a frozen original
//! - **Extraction**: per-block content collection (text, table HTML, images)
//!   in document order with a content-type rollup
//! - **Metadata binding**: question-type driven conditional fields and
//!   submission validation (cover-page singleton rule)
//! - **Suggestion queue**: batch review with accept, pause and resume, and
//!   automatic skipping of stale candidates
//! - **Snapshots**: cover-fit scene composition for region previews with
//!   stepped zoom
//! - **Persistence**: a [`gateway::PersistenceGateway`] trait the host backs
//!   with its own transport; every server response is merged back as the
//!   authoritative state
//!
//! ## Quick Start
//!
//! ```
//! use exam_lasso::blocks::{BlockSet, ContentBlock};
//! use exam_lasso::gateway::{PersistenceGateway, ServerRegion, SuggestionCandidate};
//! use exam_lasso::geometry::{Point, Rect};
//! use exam_lasso::region::{QType, Region};
//! use exam_lasso::session::AnnotationSession;
//! use exam_lasso::Result;
//!
//! # struct NullGateway;
//! # impl PersistenceGateway for NullGateway {
//! #     fn create_region(&mut self, region: &Region) -> Result<ServerRegion> {
//! #         use chrono::Utc;
//! #         use exam_lasso::region::ServerRefs;
//! #         Ok(ServerRegion {
//! #             id: 1, x: region.rect.x, y: region.rect.y, w: region.rect.w, h: region.rect.h,
//! #             order_index: 0, question_number: region.question_number.clone(),
//! #             marks: region.marks.clone(), qtype: region.qtype.clone(),
//! #             parent_number: String::new(), header_label: String::new(),
//! #             case_study_label: String::new(),
//! #             content_type: region.content_type.as_str().to_string(),
//! #             content: region.content.to_json()?, created_at: Utc::now(),
//! #             refs: Some(ServerRefs {
//! #                 update_ref: "u".into(), delete_ref: "d".into(), fetch_ref: "f".into(),
//! #             }),
//! #         })
//! #     }
//! #     fn update_region(&mut self, _: &str, _: &Region) -> Result<ServerRegion> { unreachable!() }
//! #     fn delete_region(&mut self, _: &str) -> Result<()> { Ok(()) }
//! #     fn fetch_region(&mut self, _: &str) -> Result<ServerRegion> { unreachable!() }
//! #     fn fetch_suggestions(&mut self, _: &str) -> Result<Vec<SuggestionCandidate>> { Ok(vec![]) }
//! # }
//! # fn main() -> Result<()> {
//! let blocks = BlockSet::from_blocks([
//!     ContentBlock::paragraph(1, Rect::new(0.0, 0.0, 400.0, 60.0), "1. State Ohm's law."),
//! ]);
//! let mut session = AnnotationSession::new(NullGateway, blocks);
//!
//! // Drag out a region over the paragraph.
//! session.pointer_down(Point::new(0.0, 0.0));
//! session.pointer_move(Point::new(400.0, 80.0));
//! let mut form = session.pointer_up()?.unwrap();
//!
//! // Fill in the metadata and commit.
//! form.question_number = "1".to_string();
//! form.marks = "5".to_string();
//! form.qtype = QType::Question;
//! let outcome = session.submit_form(&form)?;
//!
//! let region = session.region(outcome.region_id).unwrap();
//! assert_eq!(region.content.items.len(), 1);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

// Error handling
pub mod error;

// Geometry primitives shared by every layer
pub mod geometry;

// Paper content model
pub mod blocks;

// Region model and content payloads
pub mod region;

// Intersection-based content extraction
pub mod extractor;

// Pointer gestures: draw and resize
pub mod interaction;

// Metadata form and submission validation
pub mod binder;

// Suggestion review queue
pub mod queue;

// Persistence gateway trait and wire types
pub mod gateway;

// Snapshot scene composition
pub mod snapshot;

// Session configuration
pub mod config;

// Session orchestration
pub mod session;

pub use error::{Error, Result};
pub use session::{AnnotationSession, CommitOutcome, SessionEvent};
