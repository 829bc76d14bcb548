//! Walk a full annotation session against an in-memory gateway.
//!
//! Drives the draw, commit, resize, and suggestion-queue flows over a small
//! synthetic paper and prints the resulting regions and events. Useful for
//! eyeballing the engine's behavior without a host application.
//!
//! Usage:
//!   cargo run --bin annotate_demo
//!   RUST_LOG=debug cargo run --bin annotate_demo

use std::collections::HashMap;

use chrono::Utc;
use exam_lasso::blocks::{BlockSet, ContentBlock};
use exam_lasso::gateway::{PersistenceGateway, ServerRegion, SuggestionCandidate};
use exam_lasso::geometry::{Handle, Point, Rect};
use exam_lasso::region::{QType, Region, ServerRefs};
use exam_lasso::session::AnnotationSession;
use exam_lasso::snapshot::Viewport;
use exam_lasso::{Error, Result};

/// In-memory gateway with a canned suggestion batch.
#[derive(Default)]
struct MemoryGateway {
    next_id: u64,
    store: HashMap<u64, ServerRegion>,
    suggestions: Vec<SuggestionCandidate>,
}

impl MemoryGateway {
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
            content: region.content.to_json().unwrap_or_default(),
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

impl PersistenceGateway for MemoryGateway {
    fn create_region(&mut self, region: &Region) -> Result<ServerRegion> {
        self.next_id += 1;
        let server = Self::echo(region, self.next_id);
        self.store.insert(self.next_id, server.clone());
        Ok(server)
    }

    fn update_region(&mut self, update_ref: &str, region: &Region) -> Result<ServerRegion> {
        let id = Self::ref_id(update_ref)?;
        let server = Self::echo(region, id);
        self.store.insert(id, server.clone());
        Ok(server)
    }

    fn delete_region(&mut self, delete_ref: &str) -> Result<()> {
        let id = Self::ref_id(delete_ref)?;
        self.store
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| Error::StaleReference(delete_ref.to_string()))
    }

    fn fetch_region(&mut self, fetch_ref: &str) -> Result<ServerRegion> {
        let id = Self::ref_id(fetch_ref)?;
        self.store
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::StaleReference(fetch_ref.to_string()))
    }

    fn fetch_suggestions(&mut self, _api_ref: &str) -> Result<Vec<SuggestionCandidate>> {
        Ok(self.suggestions.clone())
    }
}

fn paper() -> BlockSet {
    BlockSet::from_blocks([
        ContentBlock::paragraph(1, Rect::new(40.0, 40.0, 500.0, 30.0), "SECTION A"),
        ContentBlock::paragraph(
            2,
            Rect::new(40.0, 90.0, 500.0, 50.0),
            "1. Define entropy and state its SI unit.",
        ),
        ContentBlock::table(
            3,
            Rect::new(40.0, 160.0, 500.0, 80.0),
            "<tr><th>Quantity</th><th>Unit</th></tr><tr><td>S</td><td>J/K</td></tr>",
        ),
        ContentBlock::paragraph(
            4,
            Rect::new(40.0, 260.0, 500.0, 50.0),
            "2. Sketch the cycle shown below.",
        ),
        ContentBlock::image(5, Rect::new(40.0, 330.0, 300.0, 200.0), vec!["cycle.png".to_string()]),
    ])
}

fn main() -> Result<()> {
    env_logger::init();

    let mut gateway = MemoryGateway::default();
    gateway.suggestions = vec![
        SuggestionCandidate {
            block_ids: vec![4, 5],
            question_number: "2".to_string(),
            marks: "6".to_string(),
            qtype: QType::Question,
            ..Default::default()
        },
        SuggestionCandidate {
            block_ids: vec![99],
            question_number: "stale".to_string(),
            ..Default::default()
        },
    ];

    let mut session = AnnotationSession::new(gateway, paper());

    // Draw a region over question 1 and commit it.
    session.pointer_down(Point::new(30.0, 80.0));
    session.pointer_move(Point::new(560.0, 250.0));
    let mut form = session.pointer_up()?.ok_or_else(|| {
        Error::Validation("drag produced no selection".to_string())
    })?;
    form.question_number = "1".to_string();
    form.marks = "4".to_string();
    form.qtype = QType::Question;
    let outcome = session.submit_form(&form)?;
    println!("committed region {}", outcome.region_id);

    // Widen it through the south-east handle.
    session.begin_resize(outcome.region_id, Handle::SouthEast, Point::new(560.0, 250.0))?;
    session.pointer_move(Point::new(580.0, 255.0));
    session.pointer_up()?;

    // Review the suggestion batch; the stale candidate is skipped silently.
    let mut next = session.start_suggestions("papers/1/suggestions")?;
    while let Some(suggested) = next {
        println!(
            "suggestion {:?} covering {:?}",
            suggested.question_number, suggested.rect
        );
        next = session.submit_form(&suggested)?.next_suggestion;
    }

    // Dump the final state.
    for region in session.regions() {
        println!(
            "region {:?} q={:?} type={:?} items={}",
            region.id,
            region.question_number,
            region.content_type,
            region.content.items.len()
        );
    }
    let first = session
        .regions()
        .next()
        .and_then(|r| r.id)
        .ok_or_else(|| Error::Validation("no regions committed".to_string()))?;
    let scene = session.snapshot(first, Viewport::new(640.0, 480.0))?;
    println!(
        "snapshot {}x{} at scale {:.2} with {} item(s)",
        scene.width,
        scene.height,
        scene.scale,
        scene.items.len()
    );

    for event in session.drain_events() {
        println!("event: {event:?}");
    }

    Ok(())
}
