//! Moveout list synchronization.
//!
//! [`MoveoutSync`] owns the pending/completed partitions, the open detail
//! dialog and the per-dialog processing marker. Partitions are never patched
//! locally: every mutation is followed by a full re-fetch and re-partition,
//! and both partitions are replaced in a single state update so observers
//! never see them built from different server snapshots.

mod partition;
mod validation;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::watch;

use crate::gateway::{BroadcastNotification, GatewayError, RemoteGateway};
use crate::models::{
    CreateMoveoutListRequest, CreatedList, DraftLine, MoveoutItemRequest, MoveoutList,
    MoveoutListId,
};
use crate::notice::Notifier;
use crate::state::RefreshMode;

pub use partition::{partition, Partitions};
pub use validation::{validate_lines, ValidationErrors, ValidationIssue};

const NEW_LIST_TITLE: &str = "Moveout List";
const NEW_LIST_DESCRIPTION: &str = "Generated";
const BROADCAST_KIND: &str = "moveout";
const BROADCAST_TITLE: &str = "New Moveout Request";

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Invalid moveout list: {0}")]
    Validation(#[from] ValidationErrors),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// Observable moveout state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MoveoutView {
    pub pending: Vec<MoveoutList>,
    pub completed: Vec<MoveoutList>,
    pub show_history: bool,
    pub is_loading: bool,
    /// Item currently being processed in the open dialog.
    pub processing_item_id: Option<String>,
    /// List shown in the detail dialog, if any.
    pub open_list: Option<MoveoutList>,
}

impl MoveoutView {
    /// Lists the screen shows for the current history toggle.
    pub fn visible_lists(&self) -> &[MoveoutList] {
        if self.show_history {
            &self.completed
        } else {
            &self.pending
        }
    }

    pub fn is_processing(&self, item_id: &str) -> bool {
        self.processing_item_id.as_deref() == Some(item_id)
    }
}

/// Result of [`MoveoutSync::process_item`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// Another item was already in flight; nothing was sent.
    Ignored,
    /// Processed and the list is still pending.
    StillPending,
    /// Processed and the list left the pending partition.
    ListClosed,
    /// Processed, but the follow-up refresh failed so state is unchanged.
    RefreshFailed,
}

/// Moveout list state holder.
pub struct MoveoutSync<G> {
    gateway: Arc<G>,
    state: watch::Sender<MoveoutView>,
    notifier: Notifier,
    /// Visible refreshes still in flight; `is_loading` tracks this being non-zero.
    visible_refreshes: AtomicUsize,
}

impl<G> std::fmt::Debug for MoveoutSync<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MoveoutSync")
            .field("state", &*self.state.borrow())
            .finish_non_exhaustive()
    }
}

impl<G: RemoteGateway> MoveoutSync<G> {
    pub fn new(gateway: Arc<G>, notifier: Notifier) -> Self {
        let (state, _) = watch::channel(MoveoutView::default());
        Self {
            gateway,
            state,
            notifier,
            visible_refreshes: AtomicUsize::new(0),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<MoveoutView> {
        self.state.subscribe()
    }

    /// Clone of the current state.
    pub fn snapshot(&self) -> MoveoutView {
        self.state.borrow().clone()
    }

    /// Fetch every list and replace both partitions.
    pub async fn refresh_all(&self, mode: RefreshMode) -> Result<Partitions, GatewayError> {
        self.begin(mode);
        let result = self.gateway.get_moveout_lists().await;
        match result {
            Ok(lists) => {
                let partitions = partition(lists);
                self.state.send_modify(|view| {
                    view.pending.clone_from(&partitions.pending);
                    view.completed.clone_from(&partitions.completed);
                    self.settle(view, mode);
                });
                tracing::debug!(
                    "Refreshed moveout lists: {} pending, {} completed",
                    partitions.pending.len(),
                    partitions.completed.len()
                );
                Ok(partitions)
            }
            Err(error) => {
                self.finish(mode);
                tracing::warn!("Failed to refresh moveout lists: {}", error);
                Err(error)
            }
        }
    }

    /// Fetch every list and replace only the pending partition.
    ///
    /// Used after creating a list: a new list cannot already be completed.
    pub async fn refresh_pending(&self, mode: RefreshMode) -> Result<(), GatewayError> {
        self.begin(mode);
        let result = self.gateway.get_moveout_lists().await;
        match result {
            Ok(lists) => {
                let pending = partition(lists).pending;
                self.state.send_modify(|view| {
                    view.pending = pending;
                    self.settle(view, mode);
                });
                Ok(())
            }
            Err(error) => {
                self.finish(mode);
                tracing::warn!("Failed to refresh pending moveout lists: {}", error);
                Err(error)
            }
        }
    }

    /// Flip between pending and completed lists, re-fetching first.
    ///
    /// The flag only flips once fresh data is in. Returns the new flag.
    pub async fn toggle_history(&self) -> Result<bool, SyncError> {
        let show_history = !self.state.borrow().show_history;
        let partitions = match self.refresh_all(RefreshMode::Visible).await {
            Ok(partitions) => partitions,
            Err(error) => {
                self.notifier.error("Failed to load history");
                return Err(error.into());
            }
        };

        if !show_history {
            self.notifier.info("Refreshed pending lists");
        } else if partitions.completed.is_empty() {
            self.notifier.info("No completed lists found");
        } else {
            self.notifier.info(format!(
                "Loaded {} completed lists",
                partitions.completed.len()
            ));
        }
        self.state
            .send_modify(|view| view.show_history = show_history);
        Ok(show_history)
    }

    /// Open the detail dialog for a list from either partition.
    pub fn open_detail(&self, list_id: &MoveoutListId) -> bool {
        self.state.send_if_modified(|view| {
            let found = view
                .pending
                .iter()
                .chain(view.completed.iter())
                .find(|list| &list.id == list_id)
                .cloned();
            match found {
                Some(list) => {
                    view.open_list = Some(list);
                    true
                }
                None => false,
            }
        })
    }

    /// Open the first pending list, as when arriving from a notification.
    pub fn open_first_pending(&self) -> bool {
        self.state.send_if_modified(|view| match view.pending.first() {
            Some(list) => {
                view.open_list = Some(list.clone());
                true
            }
            None => false,
        })
    }

    pub fn close_detail(&self) {
        self.state.send_if_modified(|view| view.open_list.take().is_some());
    }

    /// Process one item of a list.
    ///
    /// At most one item is in flight per dialog; a call made while another
    /// is pending returns [`ProcessOutcome::Ignored`] without a network call.
    /// After success the lists are refreshed silently and the open dialog is
    /// either replaced with the refreshed list or closed when the list is no
    /// longer pending. A failed refresh at that point is only logged.
    pub async fn process_item(
        &self,
        list_id: &MoveoutListId,
        item_id: &str,
        quantity: u32,
        actor_name: &str,
    ) -> Result<ProcessOutcome, SyncError> {
        let acquired = self.state.send_if_modified(|view| {
            if view.processing_item_id.is_some() {
                return false;
            }
            view.processing_item_id = Some(item_id.to_string());
            true
        });
        if !acquired {
            tracing::debug!("Ignoring process request for {}: busy", item_id);
            return Ok(ProcessOutcome::Ignored);
        }
        let _marker = ProcessingMarker { state: &self.state };

        if let Err(error) = self
            .gateway
            .process_moveout_item(list_id, item_id, quantity, actor_name)
            .await
        {
            tracing::warn!("Failed to process item {} on {}: {}", item_id, list_id, error);
            self.notifier.error("Failed to process item");
            return Err(error.into());
        }
        tracing::info!("Processed item {} on list {}", item_id, list_id);

        let outcome = match self.gateway.get_moveout_lists().await {
            Ok(lists) => {
                let partitions = partition(lists);
                let refreshed = partitions
                    .pending
                    .iter()
                    .find(|list| &list.id == list_id)
                    .cloned();
                let outcome = if refreshed.is_some() {
                    ProcessOutcome::StillPending
                } else {
                    ProcessOutcome::ListClosed
                };
                self.state.send_modify(|view| {
                    view.pending = partitions.pending;
                    view.completed = partitions.completed;
                    let dialog_open = view
                        .open_list
                        .as_ref()
                        .is_some_and(|open| &open.id == list_id);
                    if dialog_open {
                        view.open_list = refreshed;
                    }
                });
                outcome
            }
            Err(error) => {
                tracing::warn!("Silent refresh after processing failed: {}", error);
                ProcessOutcome::RefreshFailed
            }
        };

        self.notifier.info("Item processed successfully");
        Ok(outcome)
    }

    /// Validate and create a new list, then notify staff.
    ///
    /// Invalid drafts are rejected before any network call. The broadcast is
    /// best-effort and never fails the already-created list.
    pub async fn create_list(
        &self,
        lines: &[DraftLine],
        creator_name: &str,
    ) -> Result<CreatedList, SyncError> {
        validate_lines(lines)?;

        let request = CreateMoveoutListRequest {
            title: NEW_LIST_TITLE.to_string(),
            description: Some(NEW_LIST_DESCRIPTION.to_string()),
            items: lines.iter().map(MoveoutItemRequest::from).collect(),
        };
        let created = self.gateway.create_moveout_list(&request).await?;
        tracing::info!(
            "Created moveout list {} with {} items",
            created.id,
            lines.len()
        );

        let notification = BroadcastNotification {
            kind: BROADCAST_KIND.to_string(),
            title: BROADCAST_TITLE.to_string(),
            message: broadcast_message(lines),
            creator_name: creator_name.to_string(),
        };
        if let Err(error) = self.gateway.broadcast_notification(&notification).await {
            tracing::warn!("Failed to broadcast new moveout list: {}", error);
        }

        if let Err(error) = self.refresh_pending(RefreshMode::Visible).await {
            tracing::warn!("Refresh after creating list failed: {}", error);
        }
        Ok(created)
    }

    fn begin(&self, mode: RefreshMode) {
        if mode.is_visible() {
            self.state.send_modify(|view| {
                self.visible_refreshes.fetch_add(1, Ordering::SeqCst);
                view.is_loading = true;
            });
        }
    }

    fn finish(&self, mode: RefreshMode) {
        if mode.is_visible() {
            self.state.send_modify(|view| self.settle(view, mode));
        }
    }

    /// Must run inside a `send_modify` so the count and the flag move together.
    fn settle(&self, view: &mut MoveoutView, mode: RefreshMode) {
        if mode.is_visible() {
            let remaining = self
                .visible_refreshes
                .fetch_sub(1, Ordering::SeqCst)
                .saturating_sub(1);
            view.is_loading = remaining > 0;
        }
    }
}

/// Clears the processing marker however `process_item` exits.
struct ProcessingMarker<'a> {
    state: &'a watch::Sender<MoveoutView>,
}

impl Drop for ProcessingMarker<'_> {
    fn drop(&mut self) {
        self.state
            .send_modify(|view| view.processing_item_id = None);
    }
}

fn broadcast_message(lines: &[DraftLine]) -> String {
    lines
        .iter()
        .map(|line| format!("{} × {}", line.item_name, line.requesting_quantity))
        .collect::<Vec<_>>()
        .join(", ")
}
