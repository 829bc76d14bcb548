//! The suggestion queue: sequential review of machine-proposed regions.
//!
//! One fetch produces one batch; the batch is walked front to back, one
//! candidate live at a time. Every transition is a pure function of
//! `(state, event) -> state`, so the whole workflow is testable without a
//! rendering host or a backend. The session layer performs the actual fetch
//! and feeds the batch in through [`QueueState::load`]; from the machine's
//! point of view the fetching phase collapses into that single call.
//!
//! Counting: `consumed` advances when a candidate leaves the queue for good,
//! either accepted (committed) or auto-skipped because none of its blocks
//! still exist. Pausing requeues the live candidate at the front and does not
//! consume it.

use std::collections::VecDeque;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::blocks::BlockSet;
use crate::gateway::SuggestionCandidate;
use crate::geometry::Rect;

/// Where the queue currently is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueuePhase {
    /// No batch loaded, or the batch is exhausted
    Idle,
    /// A candidate is live and awaiting the operator's verdict
    Presenting,
    /// The operator cancelled out; the candidate waits at the front
    Paused,
}

/// A candidate made live for operator review.
#[derive(Debug, Clone, PartialEq)]
pub struct Presentation {
    /// The candidate's proposed metadata
    pub candidate: SuggestionCandidate,
    /// Bounding rectangle derived from the candidate's blocks
    pub rect: Rect,
    /// 1-based position within the batch, counting skips
    pub index: usize,
    /// Batch size, fixed at load time
    pub total: usize,
}

/// Progress snapshot for host display ("Suggestion 2/5").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueProgress {
    /// 1-based index of the live candidate, or candidates consumed so far
    pub index: usize,
    /// Batch size, fixed at load time
    pub total: usize,
    /// Current lifecycle phase
    pub phase: QueuePhase,
}

/// Process-scoped queue state. Never persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueueState {
    pending: VecDeque<SuggestionCandidate>,
    current: Option<SuggestionCandidate>,
    paused: bool,
    total: usize,
    consumed: usize,
}

impl QueueState {
    /// Load one fetched batch, replacing whatever was queued before.
    ///
    /// `total` is fixed here and never recomputed.
    pub fn load(batch: Vec<SuggestionCandidate>) -> QueueState {
        debug!("suggestion queue loaded with {} candidate(s)", batch.len());
        QueueState {
            total: batch.len(),
            pending: batch.into(),
            current: None,
            paused: false,
            consumed: 0,
        }
    }

    /// The current lifecycle phase.
    pub fn phase(&self) -> QueuePhase {
        if self.current.is_some() {
            QueuePhase::Presenting
        } else if self.paused && !self.pending.is_empty() {
            QueuePhase::Paused
        } else {
            QueuePhase::Idle
        }
    }

    /// True when nothing is queued or live.
    pub fn is_idle(&self) -> bool {
        self.phase() == QueuePhase::Idle
    }

    /// The live candidate, if any.
    pub fn current(&self) -> Option<&SuggestionCandidate> {
        self.current.as_ref()
    }

    /// Candidates consumed so far (accepted or skipped).
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    /// Batch size fixed at load time.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Progress snapshot for display.
    pub fn progress(&self) -> QueueProgress {
        let live = usize::from(self.current.is_some());
        QueueProgress {
            index: self.consumed + live,
            total: self.total,
            phase: self.phase(),
        }
    }

    /// Make the next viable candidate live.
    ///
    /// Candidates whose block ids all fail to resolve are skipped without
    /// being presented; each skip consumes its slot in the batch. Returns the
    /// advanced state and the presentation, or `None` when the batch drained.
    pub fn advance(mut self, blocks: &BlockSet) -> (QueueState, Option<Presentation>) {
        self.paused = false;
        while let Some(candidate) = self.pending.pop_front() {
            match blocks.union_of(&candidate.block_ids) {
                Some(rect) => {
                    self.current = Some(candidate.clone());
                    let presentation = Presentation {
                        candidate,
                        rect,
                        index: self.consumed + 1,
                        total: self.total,
                    };
                    return (self, Some(presentation));
                }
                None => {
                    warn!(
                        "skipping suggestion with no resolvable blocks: {:?}",
                        candidate.block_ids
                    );
                    self.consumed += 1;
                }
            }
        }
        self.current = None;
        (self, None)
    }

    /// Requeue the live candidate at the front and pause.
    ///
    /// Synchronous and local; no network call is involved. A pause with no
    /// live candidate is a no-op.
    pub fn pause(mut self) -> QueueState {
        if let Some(candidate) = self.current.take() {
            self.pending.push_front(candidate);
            self.paused = true;
            debug!("suggestion queue paused, {} pending", self.pending.len());
        }
        self
    }

    /// Resume from a pause: the front candidate is presented again.
    pub fn resume(self, blocks: &BlockSet) -> (QueueState, Option<Presentation>) {
        self.advance(blocks)
    }

    /// The live candidate's commit resolved successfully; consume it.
    ///
    /// Called only after the gateway answered, never speculatively. The
    /// caller advances afterwards to present the next candidate.
    pub fn settle_commit(mut self) -> QueueState {
        if self.current.take().is_some() {
            self.consumed += 1;
        }
        self
    }

    /// Drop everything queued (fetch failure recovery path).
    pub fn clear(self) -> QueueState {
        QueueState::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::ContentBlock;
    use crate::region::QType;

    fn blocks() -> BlockSet {
        BlockSet::from_blocks([
            ContentBlock::paragraph(1, Rect::new(0.0, 0.0, 100.0, 20.0), "one"),
            ContentBlock::paragraph(2, Rect::new(0.0, 30.0, 100.0, 20.0), "two"),
            ContentBlock::paragraph(3, Rect::new(0.0, 60.0, 100.0, 20.0), "three"),
        ])
    }

    fn candidate(ids: &[u64], qn: &str) -> SuggestionCandidate {
        SuggestionCandidate {
            block_ids: ids.to_vec(),
            question_number: qn.to_string(),
            marks: String::new(),
            qtype: QType::Question,
            parent_number: String::new(),
            header_label: String::new(),
            case_study_label: String::new(),
        }
    }

    #[test]
    fn test_load_fixes_total() {
        let q = QueueState::load(vec![candidate(&[1], "1"), candidate(&[2], "2")]);
        assert_eq!(q.total(), 2);
        assert_eq!(q.consumed(), 0);
        assert_eq!(q.phase(), QueuePhase::Idle);
    }

    #[test]
    fn test_present_accept_walk() {
        let blocks = blocks();
        let q = QueueState::load(vec![candidate(&[1], "1"), candidate(&[2], "2")]);

        let (q, p) = q.advance(&blocks);
        let p = p.unwrap();
        assert_eq!(p.index, 1);
        assert_eq!(p.total, 2);
        assert_eq!(p.rect, Rect::new(0.0, 0.0, 100.0, 20.0));
        assert_eq!(q.phase(), QueuePhase::Presenting);

        let q = q.settle_commit();
        assert_eq!(q.consumed(), 1);
        let (q, p) = q.advance(&blocks);
        assert_eq!(p.unwrap().index, 2);
        let q = q.settle_commit();
        let (q, p) = q.advance(&blocks);
        assert!(p.is_none());
        assert!(q.is_idle());
        assert_eq!(q.consumed(), 2);
    }

    #[test]
    fn test_pause_requeues_at_front_and_resume_represents() {
        let blocks = blocks();
        let q = QueueState::load(vec![
            candidate(&[1], "1"),
            candidate(&[2], "2"),
            candidate(&[3], "3"),
        ]);

        // Accept the first.
        let (q, _) = q.advance(&blocks);
        let q = q.settle_commit();

        // Pause on the second.
        let (q, p) = q.advance(&blocks);
        assert_eq!(p.unwrap().candidate.question_number, "2");
        let q = q.pause();
        assert_eq!(q.phase(), QueuePhase::Paused);
        assert_eq!(q.consumed(), 1);

        // Resume presents the same candidate again.
        let (q, p) = q.resume(&blocks);
        assert_eq!(p.unwrap().candidate.question_number, "2");

        // Accept the rest.
        let q = q.settle_commit();
        let (q, _) = q.advance(&blocks);
        let q = q.settle_commit();
        let (q, p) = q.advance(&blocks);
        assert!(p.is_none());
        assert_eq!(q.consumed(), 3);
        assert!(q.is_idle());
    }

    #[test]
    fn test_stale_candidate_skipped_and_counted() {
        let blocks = blocks();
        let q = QueueState::load(vec![candidate(&[98, 99], "ghost"), candidate(&[3], "3")]);

        let (q, p) = q.advance(&blocks);
        let p = p.unwrap();
        // The stale candidate consumed slot 1 without presenting.
        assert_eq!(p.candidate.question_number, "3");
        assert_eq!(p.index, 2);
        assert_eq!(q.consumed(), 1);
    }

    #[test]
    fn test_all_stale_batch_drains_to_idle() {
        let blocks = blocks();
        let q = QueueState::load(vec![candidate(&[98], "a"), candidate(&[99], "b")]);
        let (q, p) = q.advance(&blocks);
        assert!(p.is_none());
        assert!(q.is_idle());
        assert_eq!(q.consumed(), 2);
    }

    #[test]
    fn test_progress_snapshot() {
        let blocks = blocks();
        let q = QueueState::load(vec![candidate(&[1], "1"), candidate(&[2], "2")]);
        let (q, _) = q.advance(&blocks);
        assert_eq!(
            q.progress(),
            QueueProgress {
                index: 1,
                total: 2,
                phase: QueuePhase::Presenting
            }
        );
        let q = q.pause();
        assert_eq!(q.progress().phase, QueuePhase::Paused);
        assert_eq!(q.progress().index, 0);
    }

    #[test]
    fn test_clear_resets_everything() {
        let q = QueueState::load(vec![candidate(&[1], "1")]);
        let q = q.clear();
        assert!(q.is_idle());
        assert_eq!(q.total(), 0);
    }

    #[test]
    fn test_pause_without_current_is_noop() {
        let q = QueueState::load(vec![candidate(&[1], "1")]);
        let q = q.pause();
        assert_eq!(q.phase(), QueuePhase::Idle);
    }
}
