//! End-to-end commit flows against a recording gateway:
//! - draw, fill in metadata, persist, and reconcile server state
//! - edit an existing region, including the cover-page singleton rule
//! - hidden conditional metadata survives a question-type toggle
//! - geometry-only resize updates
//! - snapshot composition after a refresh

use std::collections::HashMap;

use chrono::Utc;
use exam_lasso::binder::{visible_fields, ConditionalField};
use exam_lasso::blocks::{BlockSet, ContentBlock};
use exam_lasso::gateway::{PersistenceGateway, ServerRegion, SuggestionCandidate};
use exam_lasso::geometry::{Handle, Point, Rect};
use exam_lasso::region::{ContentItem, ContentType, QType, Region, ServerRefs};
use exam_lasso::session::{AnnotationSession, SessionEvent};
use exam_lasso::snapshot::Viewport;
use exam_lasso::{Error, Result};

/// Gateway double backed by an in-memory region store.
#[derive(Default)]
struct RecordingGateway {
    next_id: u64,
    store: HashMap<u64, ServerRegion>,
    calls: Vec<String>,
}

impl RecordingGateway {
    fn echo(region: &Region, id: u64) -> ServerRegion {
        ServerRegion {
            id,
            x: region.rect.x,
            y: region.rect.y,
            w: region.rect.w,
            h: region.rect.h,
            order_index: region.order_index,
            question_number: region.question_number.clone(),
            marks: region.marks.clone(),
            qtype: region.qtype.clone(),
            parent_number: region.parent_number.clone(),
            header_label: region.header_label.clone(),
            case_study_label: region.case_study_label.clone(),
            content_type: region.content_type.as_str().to_string(),
            content: region.content.to_json().unwrap(),
            created_at: Utc::now(),
            refs: Some(ServerRefs {
                update_ref: format!("regions/{id}/update"),
                delete_ref: format!("regions/{id}/delete"),
                fetch_ref: format!("regions/{id}/json"),
            }),
        }
    }

    fn ref_id(reference: &str) -> Result<u64> {
        reference
            .split('/')
            .nth(1)
            .and_then(|part| part.parse().ok())
            .ok_or_else(|| Error::StaleReference(reference.to_string()))
    }
}

impl PersistenceGateway for RecordingGateway {
    fn create_region(&mut self, region: &Region) -> Result<ServerRegion> {
        self.calls.push("create".to_string());
        self.next_id += 1;
        let server = Self::echo(region, self.next_id);
        self.store.insert(self.next_id, server.clone());
        Ok(server)
    }

    fn update_region(&mut self, update_ref: &str, region: &Region) -> Result<ServerRegion> {
        self.calls.push(format!("update {update_ref}"));
        let id = Self::ref_id(update_ref)?;
        if !self.store.contains_key(&id) {
            return Err(Error::StaleReference(update_ref.to_string()));
        }
        let server = Self::echo(region, id);
        self.store.insert(id, server.clone());
        Ok(server)
    }

    fn delete_region(&mut self, delete_ref: &str) -> Result<()> {
        self.calls.push(format!("delete {delete_ref}"));
        let id = Self::ref_id(delete_ref)?;
        self.store
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| Error::StaleReference(delete_ref.to_string()))
    }

    fn fetch_region(&mut self, fetch_ref: &str) -> Result<ServerRegion> {
        self.calls.push(format!("fetch {fetch_ref}"));
        let id = Self::ref_id(fetch_ref)?;
        self.store
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::StaleReference(fetch_ref.to_string()))
    }

    fn fetch_suggestions(&mut self, _api_ref: &str) -> Result<Vec<SuggestionCandidate>> {
        Ok(Vec::new())
    }
}

fn paper() -> BlockSet {
    BlockSet::from_blocks([
        ContentBlock::paragraph(1, Rect::new(20.0, 20.0, 400.0, 40.0), "1. Define entropy."),
        ContentBlock::table(2, Rect::new(20.0, 80.0, 400.0, 60.0), "<tr><td>S</td></tr>"),
        ContentBlock::image(3, Rect::new(20.0, 160.0, 200.0, 100.0), vec!["fig1.png".to_string()]),
    ])
}

fn session() -> AnnotationSession<RecordingGateway> {
    AnnotationSession::new(RecordingGateway::default(), paper())
}

fn draw(
    session: &mut AnnotationSession<RecordingGateway>,
    from: Point,
    to: Point,
) -> exam_lasso::binder::RegionForm {
    session.pointer_down(from);
    session.pointer_move(to);
    session.pointer_up().unwrap().expect("form should open")
}

#[test]
fn draw_and_commit_extracts_mixed_content() {
    let mut s = session();
    let mut form = draw(&mut s, Point::new(0.0, 0.0), Point::new(440.0, 280.0));
    form.question_number = "1".to_string();
    form.marks = "8".to_string();
    form.qtype = QType::Question;

    let outcome = s.submit_form(&form).unwrap();
    let region = s.region(outcome.region_id).unwrap();

    assert_eq!(region.content_type, ContentType::Mixed);
    assert_eq!(region.content.items.len(), 3);
    assert!(matches!(&region.content.items[0], ContentItem::Text { text } if text == "1. Define entropy."));
    assert!(matches!(&region.content.items[1], ContentItem::Table { html } if html.contains("<td>S</td>")));
    assert!(matches!(&region.content.items[2], ContentItem::Image { images } if images == &["fig1.png".to_string()]));
    assert!(region.is_persisted());
    assert!(region.created_at.is_some());
}

#[test]
fn reverse_drag_commits_the_same_region() {
    let mut s = session();
    let form = draw(&mut s, Point::new(440.0, 70.0), Point::new(0.0, 0.0));
    assert_eq!(form.rect, Rect::new(0.0, 0.0, 440.0, 70.0));

    let outcome = s.submit_form(&form).unwrap();
    let region = s.region(outcome.region_id).unwrap();
    assert_eq!(region.content_type, ContentType::Text);
    assert_eq!(region.content.items.len(), 1);
}

#[test]
fn region_over_whitespace_persists_with_empty_content() {
    let mut s = session();
    let form = draw(&mut s, Point::new(500.0, 500.0), Point::new(600.0, 600.0));

    let outcome = s.submit_form(&form).unwrap();
    let region = s.region(outcome.region_id).unwrap();
    assert_eq!(region.content_type, ContentType::None);
    assert!(region.content.items.is_empty());
    assert_eq!(region.content.to_json().unwrap(), r#"{"items":[]}"#);
}

#[test]
fn hidden_conditional_metadata_survives_qtype_toggle() {
    let mut s = session();
    let mut form = draw(&mut s, Point::new(0.0, 0.0), Point::new(440.0, 70.0));
    form.question_number = "1a".to_string();
    form.qtype = QType::QuestionPart;
    form.parent_number = "1".to_string();
    let id = s.submit_form(&form).unwrap().region_id;

    // Toggle away from QuestionPart; the parent number field is hidden but
    // its stored value is not discarded.
    let mut edit = s.edit_region(id).unwrap();
    edit.qtype = QType::Question;
    assert!(!visible_fields(&edit.qtype).contains(&ConditionalField::ParentNumber));
    s.submit_form(&edit).unwrap();
    assert_eq!(s.region(id).unwrap().parent_number, "1");

    // Toggling back surfaces the preserved value.
    let restored = s.edit_region(id).unwrap();
    assert_eq!(restored.parent_number, "1");
}

#[test]
fn second_cover_page_is_rejected_before_any_call() {
    let mut s = session();
    let mut form = draw(&mut s, Point::new(0.0, 0.0), Point::new(100.0, 100.0));
    form.qtype = QType::CoverPage;
    let cover_id = s.submit_form(&form).unwrap().region_id;
    let calls = s.gateway().calls.len();

    let mut second = draw(&mut s, Point::new(0.0, 200.0), Point::new(100.0, 300.0));
    second.qtype = QType::CoverPage;
    let err = s.submit_form(&second).unwrap_err();
    assert!(err.is_validation());
    assert_eq!(s.gateway().calls.len(), calls);

    // Editing the existing cover page itself is allowed.
    s.cancel();
    let edit = s.edit_region(cover_id).unwrap();
    assert!(s.submit_form(&edit).is_ok());
}

#[test]
fn resize_issues_geometry_only_update() {
    let mut s = session();
    let form = draw(&mut s, Point::new(0.0, 0.0), Point::new(100.0, 100.0));
    let id = s.submit_form(&form).unwrap().region_id;
    s.drain_events();

    s.begin_resize(id, Handle::SouthEast, Point::new(100.0, 100.0))
        .unwrap();
    s.pointer_move(Point::new(120.0, 95.0));
    s.pointer_up().unwrap();

    assert_eq!(s.region(id).unwrap().rect, Rect::new(0.0, 0.0, 120.0, 95.0));
    assert!(s.drain_events().contains(&SessionEvent::RegionUpdated { id }));
}

#[test]
fn delete_removes_from_store_and_working_set() {
    let mut s = session();
    let form = draw(&mut s, Point::new(0.0, 0.0), Point::new(100.0, 100.0));
    let id = s.submit_form(&form).unwrap().region_id;

    s.delete_region(id).unwrap();
    assert!(s.region(id).is_none());
    assert!(matches!(
        s.delete_region(id),
        Err(Error::StaleReference(_))
    ));
}

#[test]
fn snapshot_refreshes_then_composes_cover_fit() {
    let mut s = session();
    let mut form = draw(&mut s, Point::new(20.0, 20.0), Point::new(220.0, 120.0));
    form.question_number = "1".to_string();
    let id = s.submit_form(&form).unwrap().region_id;

    // Region is 200x100; a 400x300 viewport cover-fits at max(2.0, 3.0).
    let mut scene = s.snapshot(id, Viewport::new(400.0, 300.0)).unwrap();
    assert_eq!(scene.scale, 3.0);
    assert_eq!(scene.width, 200.0);
    assert_eq!(scene.height, 100.0);
    assert!(!scene.items.is_empty());

    scene.zoom_in();
    assert!((scene.scale - 3.6).abs() < 1e-4);
}

#[test]
fn load_regions_seeds_working_set_and_order() {
    let mut s = session();
    let mut seeded = Region::draft(Rect::new(0.0, 0.0, 100.0, 50.0));
    seeded.id = Some(9);
    seeded.order_index = 4;
    seeded.refs = Some(ServerRefs {
        update_ref: "regions/9/update".to_string(),
        delete_ref: "regions/9/delete".to_string(),
        fetch_ref: "regions/9/json".to_string(),
    });
    s.load_regions([seeded]);
    assert_eq!(s.regions().count(), 1);

    // A fresh draw lands after the seeded region in display order.
    let form = draw(&mut s, Point::new(0.0, 60.0), Point::new(100.0, 120.0));
    let id = s.submit_form(&form).unwrap().region_id;
    assert!(s.region(id).unwrap().order_index > 4);
}
