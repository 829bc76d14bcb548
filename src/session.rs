//! The annotation session: one operator working over one paper.
//!
//! The session owns the region working set, the gesture controller, and the
//! suggestion queue, and drives the persistence gateway. There is a single
//! logical thread of control; the session suspends at each gateway call and
//! no state is shared across it. Every successful gateway response is merged
//! back into the model as the authoritative version, and the host learns
//! about changes through drained events rather than by patching its own view
//! field by field.
//!
//! Failure contract: a failed gateway call leaves the working set, the open
//! form, and the queue exactly as they were before the attempt. Nothing is
//! retried automatically.

use indexmap::IndexMap;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::binder::{validate_submission, RegionForm};
use crate::blocks::BlockSet;
use crate::config::SessionConfig;
use crate::error::{Error, Result};
use crate::extractor::extract;
use crate::gateway::{PersistenceGateway, ServerRegion, SuggestionCandidate};
use crate::geometry::{Handle, Point, Rect};
use crate::interaction::{GestureOutcome, InteractionController};
use crate::queue::{Presentation, QueueProgress, QueueState};
use crate::region::{ContentType, Region, RegionContent};
use crate::snapshot::{compose, SnapshotScene, Viewport};

/// A change the host's presentation layer should reflect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SessionEvent {
    /// A region was persisted for the first time
    RegionCreated {
        /// Server-assigned id
        id: u64,
    },
    /// A persisted region changed (metadata, geometry, or refresh)
    RegionUpdated {
        /// Server-assigned id
        id: u64,
    },
    /// A region was deleted from the backend and the working set
    RegionDeleted {
        /// Server-assigned id
        id: u64,
    },
    /// The suggestion queue moved
    Queue(QueueProgress),
}

/// What a successful form submission produced.
#[derive(Debug, Clone, PartialEq)]
pub struct CommitOutcome {
    /// Id of the region that was created or updated
    pub region_id: u64,
    /// The next suggestion's pre-filled form, when a queue is active and has
    /// more candidates
    pub next_suggestion: Option<RegionForm>,
}

/// One operator's annotation session over one paper.
pub struct AnnotationSession<G: PersistenceGateway> {
    gateway: G,
    config: SessionConfig,
    blocks: BlockSet,
    regions: IndexMap<u64, Region>,
    controller: InteractionController,
    queue: QueueState,
    /// The queue candidate whose form is currently open, if any.
    active_candidate: Option<SuggestionCandidate>,
    /// Id of the persisted region being edited, if the open form is an edit.
    editing: Option<u64>,
    commit_in_flight: bool,
    events: Vec<SessionEvent>,
    next_order_index: i64,
}

impl<G: PersistenceGateway> AnnotationSession<G> {
    /// Start a session over the given paper blocks.
    pub fn new(gateway: G, blocks: BlockSet) -> Self {
        Self::with_config(gateway, blocks, SessionConfig::default())
    }

    /// Start a session with explicit configuration.
    pub fn with_config(gateway: G, blocks: BlockSet, config: SessionConfig) -> Self {
        Self {
            gateway,
            config,
            blocks,
            regions: IndexMap::new(),
            controller: InteractionController::new(),
            queue: QueueState::default(),
            active_candidate: None,
            editing: None,
            commit_in_flight: false,
            events: Vec::new(),
            next_order_index: 0,
        }
    }

    /// Seed the working set with regions already persisted for this paper.
    pub fn load_regions(&mut self, regions: impl IntoIterator<Item = Region>) {
        for region in regions {
            if let Some(id) = region.id {
                self.next_order_index = self.next_order_index.max(region.order_index + 1);
                self.regions.insert(id, region);
            }
        }
    }

    /// The paper's blocks (read-only).
    pub fn blocks(&self) -> &BlockSet {
        &self.blocks
    }

    /// The underlying gateway (read-only).
    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Persisted regions, in working-set order.
    pub fn regions(&self) -> impl Iterator<Item = &Region> {
        self.regions.values()
    }

    /// Look up a persisted region.
    pub fn region(&self, id: u64) -> Option<&Region> {
        self.regions.get(&id)
    }

    /// True while a commit is outstanding; hosts disable the submit
    /// affordance on this.
    pub fn commit_in_flight(&self) -> bool {
        self.commit_in_flight
    }

    /// Current queue progress for display.
    pub fn queue_progress(&self) -> QueueProgress {
        self.queue.progress()
    }

    /// Take the events accumulated since the last drain.
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    // --- Pointer gestures -------------------------------------------------

    /// Pointer pressed on the canvas.
    pub fn pointer_down(&mut self, at: Point) -> GestureOutcome {
        self.controller.pointer_down(at)
    }

    /// Pointer moved.
    pub fn pointer_move(&mut self, at: Point) -> GestureOutcome {
        self.controller.pointer_move(at)
    }

    /// Pointer released.
    ///
    /// A finished draw returns the pre-filled form to open; a zero-motion
    /// drag returns `None` and nothing else happens. A finished resize
    /// commits the new geometry through the gateway immediately.
    pub fn pointer_up(&mut self) -> Result<Option<RegionForm>> {
        match self.controller.pointer_up() {
            GestureOutcome::MetadataRequested(rect) => Ok(Some(RegionForm::for_rect(rect))),
            GestureOutcome::ResizeFinished { region_id, rect } => {
                self.commit_geometry(region_id, rect.normalized())?;
                Ok(None)
            }
            _ => Ok(None),
        }
    }

    /// Begin resizing a persisted region through its resize affordance.
    pub fn begin_resize(&mut self, region_id: u64, handle: Handle, grab: Point) -> Result<()> {
        let original = self
            .regions
            .get(&region_id)
            .map(|r| r.rect)
            .ok_or_else(|| Error::StaleReference(format!("region {region_id} not in working set")))?;
        self.controller.begin_resize(region_id, original, handle, grab);
        Ok(())
    }

    /// Open the metadata form for an existing region (edit flow).
    pub fn edit_region(&mut self, region_id: u64) -> Result<RegionForm> {
        let region = self
            .regions
            .get(&region_id)
            .ok_or_else(|| Error::StaleReference(format!("region {region_id} not in working set")))?;
        let form = RegionForm::from_region(region);
        self.editing = Some(region_id);
        self.controller.present_metadata(form.rect);
        Ok(form)
    }

    /// Abandon the open form or the in-progress gesture.
    ///
    /// If a suggestion candidate was in flight it is requeued at the front
    /// and the queue pauses; resuming is an explicit operator action.
    pub fn cancel(&mut self) {
        self.controller.cancel();
        self.editing = None;
        if self.active_candidate.take().is_some() {
            self.queue = std::mem::take(&mut self.queue).pause();
            self.push_queue_progress();
        }
    }

    // --- Commit flow ------------------------------------------------------

    /// Submit the metadata form: validate, extract, persist, reconcile.
    ///
    /// On success the committed region is in the working set and, when a
    /// queue is active, the next candidate's form comes back pre-filled. On
    /// failure the form and queue are untouched so the operator can retry.
    pub fn submit_form(&mut self, form: &RegionForm) -> Result<CommitOutcome> {
        if self.commit_in_flight {
            return Err(Error::Validation(
                "a save is already in progress for this region".to_string(),
            ));
        }

        let mut form = form.clone();
        form.rect = form.rect.normalized();
        validate_submission(
            &form,
            self.regions.values(),
            self.editing,
            self.config.reject_empty_regions,
        )?;

        let mut region = match self.editing {
            Some(id) => self
                .regions
                .get(&id)
                .cloned()
                .ok_or_else(|| Error::StaleReference(format!("region {id} not in working set")))?,
            None => {
                let mut draft = Region::draft(form.rect);
                draft.order_index = self.next_order_index;
                draft
            }
        };
        form.apply_to(&mut region);
        region.normalize_rect();

        let (content, content_type) = extract(&region.rect, &self.blocks, self.config.intersect_epsilon);
        region.content = content;
        region.content_type = content_type;

        self.commit_in_flight = true;
        let response = match &region.refs {
            Some(refs) => self.gateway.update_region(&refs.update_ref, &region),
            None => self.gateway.create_region(&region),
        };
        self.commit_in_flight = false;

        let server = match response {
            Ok(server) => server,
            Err(err) => {
                warn!("commit failed, state left intact: {err}");
                return Err(err);
            }
        };

        let created = region.id.is_none();
        merge_server(&mut region, &server);
        let id = server.id;
        if created {
            self.next_order_index = self.next_order_index.max(region.order_index + 1);
        }
        self.regions.insert(id, region);
        self.events.push(if created {
            SessionEvent::RegionCreated { id }
        } else {
            SessionEvent::RegionUpdated { id }
        });

        self.editing = None;
        self.controller.metadata_committed();

        // Only a resolved commit advances the queue, never a speculative one.
        let next_suggestion = if self.active_candidate.take().is_some() {
            self.queue = std::mem::take(&mut self.queue).settle_commit();
            self.advance_queue()
        } else {
            None
        };

        Ok(CommitOutcome {
            region_id: id,
            next_suggestion,
        })
    }

    /// Delete a persisted region from the backend and the working set.
    pub fn delete_region(&mut self, region_id: u64) -> Result<()> {
        let delete_ref = self
            .regions
            .get(&region_id)
            .and_then(|r| r.refs.as_ref())
            .map(|refs| refs.delete_ref.clone())
            .ok_or_else(|| {
                Error::StaleReference(format!("region {region_id} has no delete ref"))
            })?;
        self.gateway.delete_region(&delete_ref)?;
        self.regions.shift_remove(&region_id);
        self.events.push(SessionEvent::RegionDeleted { id: region_id });
        Ok(())
    }

    /// Re-fetch one region's server state before a snapshot or content view.
    pub fn refresh_region(&mut self, region_id: u64) -> Result<&Region> {
        let fetch_ref = self
            .regions
            .get(&region_id)
            .and_then(|r| r.refs.as_ref())
            .map(|refs| refs.fetch_ref.clone())
            .ok_or_else(|| Error::StaleReference(format!("region {region_id} has no fetch ref")))?;
        let server = self.gateway.fetch_region(&fetch_ref)?;
        let region = self
            .regions
            .get_mut(&region_id)
            .ok_or_else(|| Error::StaleReference(format!("region {region_id} vanished")))?;
        merge_server(region, &server);
        self.events.push(SessionEvent::RegionUpdated { id: region_id });
        Ok(&self.regions[&region_id])
    }

    /// The stored content payload of a persisted region.
    pub fn region_content(&self, region_id: u64) -> Option<&RegionContent> {
        self.regions.get(&region_id).map(|r| &r.content)
    }

    /// Compose a snapshot preview for a persisted region, refreshing its
    /// server state first.
    pub fn snapshot(&mut self, region_id: u64, viewport: Viewport) -> Result<SnapshotScene> {
        let rect = self.refresh_region(region_id)?.rect;
        Ok(compose(
            &rect,
            &self.blocks,
            viewport,
            self.config.intersect_epsilon,
        ))
    }

    // --- Suggestion queue -------------------------------------------------

    /// Fetch one suggestion batch and present its first viable candidate.
    ///
    /// Returns the pre-filled form for the first candidate, or `None` when
    /// the batch was empty or entirely stale. On fetch failure the queue
    /// reverts to idle with nothing retained.
    pub fn start_suggestions(&mut self, api_ref: &str) -> Result<Option<RegionForm>> {
        let batch = match self.gateway.fetch_suggestions(api_ref) {
            Ok(batch) => batch,
            Err(err) => {
                self.queue = std::mem::take(&mut self.queue).clear();
                self.active_candidate = None;
                self.push_queue_progress();
                return Err(err);
            }
        };
        debug!("fetched {} suggestion(s)", batch.len());
        self.queue = QueueState::load(batch);
        Ok(self.advance_queue())
    }

    /// Resume a paused queue, re-presenting the requeued candidate.
    pub fn resume_suggestions(&mut self) -> Option<RegionForm> {
        self.advance_queue()
    }

    fn advance_queue(&mut self) -> Option<RegionForm> {
        let (queue, presented) = std::mem::take(&mut self.queue).advance(&self.blocks);
        self.queue = queue;
        self.push_queue_progress();
        match presented {
            Some(p) => Some(self.present_candidate(p)),
            None => {
                self.active_candidate = None;
                None
            }
        }
    }

    fn present_candidate(&mut self, p: Presentation) -> RegionForm {
        debug!("presenting suggestion {}/{}", p.index, p.total);
        self.controller.present_metadata(p.rect);
        let form = RegionForm {
            rect: p.rect,
            question_number: p.candidate.question_number.clone(),
            marks: p.candidate.marks.clone(),
            qtype: p.candidate.qtype.clone(),
            parent_number: p.candidate.parent_number.clone(),
            header_label: p.candidate.header_label.clone(),
            case_study_label: p.candidate.case_study_label.clone(),
        };
        self.active_candidate = Some(p.candidate);
        form
    }

    fn push_queue_progress(&mut self) {
        self.events.push(SessionEvent::Queue(self.queue.progress()));
    }

    fn commit_geometry(&mut self, region_id: u64, rect: Rect) -> Result<()> {
        let mut region = self
            .regions
            .get(&region_id)
            .cloned()
            .ok_or_else(|| Error::StaleReference(format!("region {region_id} not in working set")))?;
        let update_ref = region
            .refs
            .as_ref()
            .map(|refs| refs.update_ref.clone())
            .ok_or_else(|| {
                Error::StaleReference(format!("region {region_id} has no update ref"))
            })?;
        region.rect = rect;
        let server = self.gateway.update_region(&update_ref, &region)?;
        merge_server(&mut region, &server);
        self.regions.insert(region_id, region);
        self.events.push(SessionEvent::RegionUpdated { id: region_id });
        Ok(())
    }
}

/// Merge the backend's authoritative state over the local region.
///
/// The server may assign or canonicalize any field; whatever it reports wins.
/// A content payload that fails to parse is kept as the local version rather
/// than corrupting the model.
fn merge_server(region: &mut Region, server: &ServerRegion) {
    region.id = Some(server.id);
    region.rect = Rect::new(server.x, server.y, server.w, server.h);
    region.order_index = server.order_index;
    region.question_number = server.question_number.clone();
    region.marks = server.marks.clone();
    region.qtype = server.qtype.clone();
    region.parent_number = server.parent_number.clone();
    region.header_label = server.header_label.clone();
    region.case_study_label = server.case_study_label.clone();
    region.created_at = Some(server.created_at);
    if !server.content.is_empty() {
        match RegionContent::from_json(&server.content) {
            Ok(content) => region.content = content,
            Err(err) => warn!("unparseable content payload from server: {err}"),
        }
    }
    region.content_type = match server.content_type.as_str() {
        "text" => ContentType::Text,
        "table" => ContentType::Table,
        "image" => ContentType::Image,
        "mixed" => ContentType::Mixed,
        _ => region.content.content_type(),
    };
    if server.refs.is_some() {
        region.refs = server.refs.clone();
    }
}
