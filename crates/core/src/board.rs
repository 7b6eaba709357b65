//! Drag-and-drop kanban board controller.
//!
//! [`BoardController`] is the single owner of the client-side record
//! list: one column per working status, cards grouped by status, and a
//! pointer-drag interaction that turns a drop into a status-move
//! request. All mutations flow through this type (reducer style) so the
//! optimistic-update invariants live in one place:
//!
//! - a gesture only becomes a drag after the pointer travels
//!   [`DRAG_ACTIVATION_DISTANCE`], so card buttons still receive clicks;
//! - dropping a card on its own column issues no request;
//! - a move is applied optimistically and tracked as pending until the
//!   caller confirms it with server truth or rolls it back;
//! - a card with a pending move refuses further drags, serializing
//!   mutations per record;
//! - externally-observed status changes (webhook-driven) are applied
//!   through [`reconcile`](BoardController::reconcile), which defers to
//!   any pending local move.

use std::collections::{HashMap, HashSet};

use crate::error::CoreError;
use crate::status::{PipelineStatus, PIPELINE_ORDER};
use crate::types::DbId;

/// Minimum pointer travel (in logical pixels) before a press becomes a
/// drag rather than a click.
pub const DRAG_ACTIVATION_DISTANCE: f64 = 8.0;

/// One card on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardCard {
    pub id: DbId,
    pub status: PipelineStatus,
}

/// A move applied locally but not yet acknowledged by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingMove {
    pub from: PipelineStatus,
    pub to: PipelineStatus,
}

/// The status-update request the caller must issue for an accepted drop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveRequest {
    pub record_id: DbId,
    pub from: PipelineStatus,
    pub to: PipelineStatus,
}

/// Where a card was released.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropTarget {
    /// Over another card: inherit that card's column.
    Card(DbId),
    /// Over a column's empty area.
    Column(PipelineStatus),
}

/// Result of releasing the pointer at the end of a gesture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    /// The pointer never travelled far enough; treat as a click.
    NotADrag,
    /// Dropped on the origin column; no request issued.
    NoOp,
    /// The move was rejected before any request was issued.
    Refused(String),
    /// The move was applied optimistically; issue this request.
    Move(MoveRequest),
}

/// An in-progress pointer gesture on one card.
///
/// Created by [`BoardController::begin_drag`]; feed pointer positions
/// through [`update`](DragGesture::update) and finish with
/// [`BoardController::drop_card`].
#[derive(Debug, Clone, Copy)]
pub struct DragGesture {
    record_id: DbId,
    origin: PipelineStatus,
    start_x: f64,
    start_y: f64,
    active: bool,
}

impl DragGesture {
    /// The card being dragged.
    pub fn record_id(&self) -> DbId {
        self.record_id
    }

    /// The card's status when the gesture started.
    pub fn origin(&self) -> PipelineStatus {
        self.origin
    }

    /// Whether the gesture has crossed the activation threshold.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Feed a pointer position; activates the drag once the pointer has
    /// travelled at least [`DRAG_ACTIVATION_DISTANCE`] from the press.
    pub fn update(&mut self, x: f64, y: f64) {
        if !self.active {
            let dx = x - self.start_x;
            let dy = y - self.start_y;
            if (dx * dx + dy * dy).sqrt() >= DRAG_ACTIVATION_DISTANCE {
                self.active = true;
            }
        }
    }
}

/// Single-owner view model for the kanban board.
#[derive(Debug, Default)]
pub struct BoardController {
    /// All records in insertion order (column order follows from it).
    cards: Vec<BoardCard>,
    /// Moves applied locally but not yet confirmed, keyed by record id.
    pending: HashMap<DbId, PendingMove>,
    /// Multi-select set for bulk operations.
    selection: HashSet<DbId>,
}

impl BoardController {
    /// Build a board from the user's full record list (already fetched).
    pub fn new(cards: impl IntoIterator<Item = BoardCard>) -> Self {
        Self {
            cards: cards.into_iter().collect(),
            pending: HashMap::new(),
            selection: HashSet::new(),
        }
    }

    /// Look up a card by id.
    pub fn card(&self, id: DbId) -> Option<&BoardCard> {
        self.cards.iter().find(|c| c.id == id)
    }

    /// The cards in one column, in insertion order.
    pub fn column(&self, status: PipelineStatus) -> Vec<&BoardCard> {
        self.cards.iter().filter(|c| c.status == status).collect()
    }

    /// Card count per working column, in pipeline order.
    pub fn column_counts(&self) -> Vec<(PipelineStatus, usize)> {
        PIPELINE_ORDER
            .iter()
            .map(|&status| (status, self.column(status).len()))
            .collect()
    }

    /// Whether a record has an unconfirmed local move.
    pub fn has_pending(&self, id: DbId) -> bool {
        self.pending.contains_key(&id)
    }

    // -- Drag lifecycle ----------------------------------------------------

    /// Start a pointer gesture on a card.
    ///
    /// Refused when the card is unknown or when its previous move has
    /// not resolved yet (per-record in-flight guard).
    pub fn begin_drag(&self, id: DbId, x: f64, y: f64) -> Result<DragGesture, CoreError> {
        let card = self
            .card(id)
            .ok_or(CoreError::NotFound { entity: "PipelineVenue", id })?;
        if self.has_pending(id) {
            return Err(CoreError::Conflict(format!(
                "Record {id} has a move in flight; wait for it to resolve"
            )));
        }
        Ok(DragGesture {
            record_id: id,
            origin: card.status,
            start_x: x,
            start_y: y,
            active: false,
        })
    }

    /// Finish a gesture at `target`.
    ///
    /// On [`DropOutcome::Move`] the card has already been relocated
    /// optimistically; the caller must issue the returned request and
    /// then call [`confirm_move`](Self::confirm_move) or
    /// [`rollback_move`](Self::rollback_move).
    pub fn drop_card(&mut self, gesture: &DragGesture, target: DropTarget) -> DropOutcome {
        if !gesture.is_active() {
            return DropOutcome::NotADrag;
        }

        let target_status = match target {
            DropTarget::Column(status) => status,
            DropTarget::Card(other) => match self.card(other) {
                Some(card) => card.status,
                None => return DropOutcome::Refused(format!("Unknown drop target card {other}")),
            },
        };

        // No-op is judged against the status at drag start.
        if target_status == gesture.origin() {
            return DropOutcome::NoOp;
        }

        let id = gesture.record_id();
        if self.has_pending(id) {
            return DropOutcome::Refused(format!("Record {id} has a move in flight"));
        }
        let Some(card) = self.cards.iter_mut().find(|c| c.id == id) else {
            return DropOutcome::Refused(format!("Record {id} no longer on the board"));
        };

        // Legality is judged against the current status, which may have
        // been reconciled since the drag started.
        let from = card.status;
        if from == target_status {
            return DropOutcome::NoOp;
        }
        if !from.can_transition(target_status) {
            return DropOutcome::Refused(format!(
                "Illegal status transition: {from} -> {target_status}"
            ));
        }

        // Optimistic apply: relocate now, remember how to undo.
        card.status = target_status;
        self.pending.insert(id, PendingMove { from, to: target_status });
        DropOutcome::Move(MoveRequest { record_id: id, from, to: target_status })
    }

    /// The store acknowledged the move: adopt server truth and clear the
    /// pending marker.
    pub fn confirm_move(&mut self, id: DbId, server_status: PipelineStatus) {
        self.pending.remove(&id);
        if let Some(card) = self.cards.iter_mut().find(|c| c.id == id) {
            card.status = server_status;
        }
    }

    /// The request failed: revert the optimistic move visibly.
    ///
    /// Returns the status the card was reverted to, or `None` if no
    /// move was pending for it.
    pub fn rollback_move(&mut self, id: DbId) -> Option<PipelineStatus> {
        let pending = self.pending.remove(&id)?;
        if let Some(card) = self.cards.iter_mut().find(|c| c.id == id) {
            card.status = pending.from;
        }
        Some(pending.from)
    }

    // -- External reconciliation -------------------------------------------

    /// Apply a status change observed outside any local gesture (e.g.
    /// the email-open webhook moving `contacted` → `opened`).
    ///
    /// Skipped (returns `false`) while the record has a pending local
    /// move -- the confirm/rollback path owns the card until then.
    pub fn reconcile(&mut self, id: DbId, new_status: PipelineStatus) -> bool {
        if self.has_pending(id) {
            return false;
        }
        match self.cards.iter_mut().find(|c| c.id == id) {
            Some(card) => {
                card.status = new_status;
                true
            }
            None => false,
        }
    }

    /// Replace the full record list after a re-fetch, dropping pending
    /// markers and selections for records that no longer exist.
    pub fn reset(&mut self, cards: impl IntoIterator<Item = BoardCard>) {
        self.cards = cards.into_iter().collect();
        let ids: HashSet<DbId> = self.cards.iter().map(|c| c.id).collect();
        self.pending.retain(|id, _| ids.contains(id));
        self.selection.retain(|id| ids.contains(id));
    }

    /// Remove a card entirely (confirmed delete).
    pub fn remove_card(&mut self, id: DbId) {
        self.cards.retain(|c| c.id != id);
        self.pending.remove(&id);
        self.selection.remove(&id);
    }

    // -- Selection (bulk operations) ---------------------------------------

    /// Toggle a card's membership in the bulk-selection set.
    pub fn toggle_select(&mut self, id: DbId) {
        if self.card(id).is_none() {
            return;
        }
        if !self.selection.insert(id) {
            self.selection.remove(&id);
        }
    }

    /// The currently selected record ids.
    pub fn selection(&self) -> &HashSet<DbId> {
        &self.selection
    }

    /// Hand the selection to a bulk operation, clearing it in the same
    /// step -- the set is empty after the batch regardless of outcome.
    pub fn take_selection(&mut self) -> Vec<DbId> {
        self.selection.drain().collect()
    }
}
