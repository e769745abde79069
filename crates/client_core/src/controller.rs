//! Local view of one page of a remote collection, with optimistic mutations.
//!
//! Every mutation follows `Idle -> OptimisticApplied -> Confirmed | RolledBack -> Idle`.
//! The optimistic write and the settlement are separate synchronous steps so an
//! event loop can render the tentative state while the request is in flight;
//! [`ResourceListController::update_status`], [`ResourceListController::delete_item`]
//! and [`ResourceListController::delete_selected`] drive both steps.

use std::collections::BTreeSet;

use futures::future::join_all;
use shared::{
    domain::{Resource, ResourceId, StatusValue},
    protocol::{parse_page, Pagination, StatusUpdateRequest},
};
use tracing::{debug, info, warn};

use crate::{
    error::{ControllerError, MutationKind, TransportError},
    filter::ItemFilter,
    transport::CollectionApi,
};

/// Blocking yes/no prompt shown before destructive actions.
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Skips the prompt, for non-interactive callers that already asked.
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerKind {
    /// Read failure; the retry action re-fetches the current page.
    Retryable,
    Dismissable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub kind: BannerKind,
    pub message: String,
}

impl Banner {
    fn from_error(err: &ControllerError) -> Self {
        let kind = if err.is_retryable() {
            BannerKind::Retryable
        } else {
            BannerKind::Dismissable
        };
        Self {
            kind,
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationPhase {
    Idle,
    OptimisticApplied,
}

#[derive(Debug)]
pub enum MutationOutcome {
    Confirmed,
    /// The pre-mutation snapshot was restored.
    RolledBack(ControllerError),
    /// The confirmation prompt was declined; nothing changed.
    Cancelled,
}

impl MutationOutcome {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, Self::Confirmed)
    }
}

#[derive(Debug)]
pub struct Settlement {
    pub outcome: MutationOutcome,
    /// Page to load next because a delete emptied the current one.
    pub reload: Option<u32>,
}

#[derive(Debug, Default)]
pub struct BulkDeleteOutcome {
    pub deleted: Vec<ResourceId>,
    pub failed: Vec<ControllerError>,
    pub cancelled: bool,
}

#[derive(Debug, Clone)]
struct Snapshot<T> {
    items: Vec<T>,
    total: u64,
}

#[derive(Debug, Clone)]
enum Change<S> {
    Status { id: ResourceId, status: S },
    Delete { id: ResourceId, emptied_page: bool },
}

/// An optimistic write awaiting its server outcome.
#[derive(Debug)]
#[must_use = "a pending mutation must be settled"]
pub struct PendingMutation<T: Resource> {
    change: Change<T::Status>,
    snapshot: Snapshot<T>,
}

impl<T: Resource> PendingMutation<T> {
    pub fn id(&self) -> &ResourceId {
        match &self.change {
            Change::Status { id, .. } | Change::Delete { id, .. } => id,
        }
    }
}

#[derive(Debug)]
#[must_use = "a pending bulk delete must be settled"]
pub struct PendingBulkDelete<T> {
    ids: Vec<ResourceId>,
    snapshot: Snapshot<T>,
}

impl<T> PendingBulkDelete<T> {
    pub fn ids(&self) -> &[ResourceId] {
        &self.ids
    }
}

pub struct ResourceListController<T: Resource, A: CollectionApi> {
    api: A,
    items: Vec<T>,
    pagination: Pagination,
    loading: bool,
    banner: Option<Banner>,
    open_menu: Option<ResourceId>,
    selected: BTreeSet<ResourceId>,
    phase: MutationPhase,
}

impl<T: Resource, A: CollectionApi> ResourceListController<T, A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            items: Vec::new(),
            pagination: Pagination::default(),
            loading: false,
            banner: None,
            open_menu: None,
            selected: BTreeSet::new(),
            phase: MutationPhase::Idle,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn pagination(&self) -> Pagination {
        self.pagination
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn banner(&self) -> Option<&Banner> {
        self.banner.as_ref()
    }

    pub fn phase(&self) -> MutationPhase {
        self.phase
    }

    pub fn open_menu(&self) -> Option<&ResourceId> {
        self.open_menu.as_ref()
    }

    pub fn selected(&self) -> impl Iterator<Item = &ResourceId> {
        self.selected.iter()
    }

    pub fn visible_items<'a>(
        &'a self,
        filter: &'a ItemFilter<T::Status>,
    ) -> impl Iterator<Item = &'a T> + 'a {
        self.items.iter().filter(move |item| filter.matches(*item))
    }

    pub fn dismiss_banner(&mut self) {
        self.banner = None;
    }

    pub fn toggle_actions(&mut self, id: &ResourceId) {
        if self.open_menu.as_ref() == Some(id) {
            self.open_menu = None;
        } else {
            self.open_menu = Some(id.clone());
        }
    }

    pub fn toggle_select(&mut self, id: &ResourceId) -> Result<(), ControllerError> {
        self.position(id)?;
        if !self.selected.remove(id) {
            self.selected.insert(id.clone());
        }
        Ok(())
    }

    pub fn select_all(&mut self) {
        self.selected = self.items.iter().map(|item| item.id().clone()).collect();
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    /// Replaces the local page with page `page` from the server. On failure the
    /// previous items stay and a retryable banner is raised.
    pub async fn fetch_page(&mut self, page: u32) -> Result<(), ControllerError> {
        if page == 0 {
            return Err(ControllerError::InvalidPage {
                requested: page,
                total_pages: self.pagination.total_pages,
            });
        }

        self.loading = true;
        self.open_menu = None;
        info!(collection = T::COLLECTION, page, "fetching page");

        let result = match self.api.fetch_page(T::COLLECTION, page).await {
            Ok(body) => parse_page::<T>(body).map_err(|source| ControllerError::DataShape {
                collection: T::COLLECTION,
                page,
                source,
            }),
            Err(source) => Err(ControllerError::Fetch {
                collection: T::COLLECTION,
                page,
                source,
            }),
        };
        self.loading = false;

        match result {
            Ok(loaded) => {
                debug!(
                    collection = T::COLLECTION,
                    page = loaded.pagination.page,
                    total_pages = loaded.pagination.total_pages,
                    total = loaded.pagination.total,
                    items = loaded.items.len(),
                    "page loaded"
                );
                self.items = loaded.items;
                self.pagination = loaded.pagination;
                self.selected.clear();
                self.banner = None;
                Ok(())
            }
            Err(err) => {
                warn!(collection = T::COLLECTION, page, error = %err, "page fetch failed");
                self.banner = Some(Banner::from_error(&err));
                Err(err)
            }
        }
    }

    pub async fn change_page(&mut self, page: u32) -> Result<(), ControllerError> {
        if !self.pagination.contains(page) {
            return Err(ControllerError::InvalidPage {
                requested: page,
                total_pages: self.pagination.total_pages,
            });
        }
        self.fetch_page(page).await
    }

    /// Re-fetches the page currently shown.
    pub async fn retry(&mut self) -> Result<(), ControllerError> {
        self.fetch_page(self.pagination.page).await
    }

    pub fn begin_status_update(
        &mut self,
        id: &ResourceId,
        status: T::Status,
    ) -> Result<PendingMutation<T>, ControllerError> {
        self.open_menu = None;
        if !status.is_assignable() {
            return Err(ControllerError::InvalidStatus {
                label: T::LABEL,
                status: status.as_str(),
            });
        }
        let index = self.position(id)?;
        if self.items[index].status() == status {
            return Err(ControllerError::StatusUnchanged {
                label: T::LABEL,
                id: id.clone(),
                status: status.as_str(),
            });
        }

        let snapshot = self.snapshot();
        self.items[index].set_status(status);
        self.phase = MutationPhase::OptimisticApplied;
        debug!(collection = T::COLLECTION, %id, status = %status, "status applied optimistically");

        Ok(PendingMutation {
            change: Change::Status {
                id: id.clone(),
                status,
            },
            snapshot,
        })
    }

    pub fn begin_delete(&mut self, id: &ResourceId) -> Result<PendingMutation<T>, ControllerError> {
        self.open_menu = None;
        let index = self.position(id)?;
        let emptied_page = self.items.len() == 1;

        let snapshot = self.snapshot();
        self.items.remove(index);
        self.selected.remove(id);
        self.pagination.total = self.pagination.total.saturating_sub(1);
        self.phase = MutationPhase::OptimisticApplied;
        debug!(collection = T::COLLECTION, %id, "item removed optimistically");

        Ok(PendingMutation {
            change: Change::Delete {
                id: id.clone(),
                emptied_page,
            },
            snapshot,
        })
    }

    /// Removes every selected item on the page at once.
    pub fn begin_bulk_delete(&mut self) -> Result<PendingBulkDelete<T>, ControllerError> {
        let ids: Vec<ResourceId> = self
            .items
            .iter()
            .map(|item| item.id().clone())
            .filter(|id| self.selected.contains(id))
            .collect();
        if ids.is_empty() {
            return Err(ControllerError::EmptySelection { label: T::LABEL });
        }

        let snapshot = self.snapshot();
        self.open_menu = None;
        self.items.retain(|item| !self.selected.contains(item.id()));
        self.selected.clear();
        self.pagination.total = self.pagination.total.saturating_sub(ids.len() as u64);
        self.phase = MutationPhase::OptimisticApplied;
        debug!(collection = T::COLLECTION, count = ids.len(), "items removed optimistically");

        Ok(PendingBulkDelete { ids, snapshot })
    }

    /// Confirms or rolls back a single-item mutation.
    pub fn settle(
        &mut self,
        pending: PendingMutation<T>,
        result: Result<(), TransportError>,
    ) -> Settlement {
        self.phase = MutationPhase::Idle;
        let PendingMutation { change, snapshot } = pending;

        let (kind, id, emptied_page, status) = match change {
            Change::Status { id, status } => {
                (MutationKind::UpdateStatus, id, false, Some(status.as_str()))
            }
            Change::Delete { id, emptied_page } => (MutationKind::Delete, id, emptied_page, None),
        };

        if let Err(source) = result {
            let err = ControllerError::Mutation {
                kind,
                label: T::LABEL,
                id,
                source,
            };
            warn!(collection = T::COLLECTION, error = %err, "mutation rolled back");
            self.restore(snapshot);
            self.banner = Some(Banner::from_error(&err));
            return Settlement {
                outcome: MutationOutcome::RolledBack(err),
                reload: None,
            };
        }

        info!(collection = T::COLLECTION, %id, action = %kind, status = ?status, "mutation confirmed");
        let reload = emptied_page.then(|| self.pagination.page.saturating_sub(1).max(1));
        Settlement {
            outcome: MutationOutcome::Confirmed,
            reload,
        }
    }

    /// Restores the items whose delete failed, in their original positions.
    pub fn settle_bulk(
        &mut self,
        pending: PendingBulkDelete<T>,
        results: Vec<(ResourceId, Result<(), TransportError>)>,
    ) -> BulkDeleteOutcome {
        self.phase = MutationPhase::Idle;
        let snapshot = pending.snapshot;

        let mut outcome = BulkDeleteOutcome::default();
        for (id, result) in results {
            match result {
                Ok(()) => outcome.deleted.push(id),
                Err(source) => outcome.failed.push(ControllerError::Mutation {
                    kind: MutationKind::Delete,
                    label: T::LABEL,
                    id,
                    source,
                }),
            }
        }

        if outcome.failed.is_empty() {
            info!(collection = T::COLLECTION, count = outcome.deleted.len(), "bulk delete confirmed");
            return outcome;
        }

        let deleted: BTreeSet<&ResourceId> = outcome.deleted.iter().collect();
        self.items = snapshot
            .items
            .into_iter()
            .filter(|item| !deleted.contains(item.id()))
            .collect();
        self.pagination.total = snapshot.total.saturating_sub(outcome.deleted.len() as u64);

        for err in &outcome.failed {
            warn!(collection = T::COLLECTION, error = %err, "bulk delete item restored");
        }
        let message = match outcome.failed.as_slice() {
            [only] => only.to_string(),
            many => format!("failed to delete {} {}s", many.len(), T::LABEL),
        };
        self.banner = Some(Banner {
            kind: BannerKind::Dismissable,
            message,
        });
        outcome
    }

    /// Sets the status locally, then confirms it with the server.
    pub async fn update_status(
        &mut self,
        id: &ResourceId,
        status: T::Status,
    ) -> Result<MutationOutcome, ControllerError> {
        let pending = self.begin_status_update(id, status)?;
        let request = StatusUpdateRequest::new(status);
        let result = self
            .api
            .update_status(T::COLLECTION, id, &request)
            .await;
        Ok(self.settle(pending, result).outcome)
    }

    /// Asks for confirmation, removes the item locally, then deletes it on the
    /// server. A confirmed delete that empties the page loads the previous page
    /// (or page 1 again).
    pub async fn delete_item(
        &mut self,
        id: &ResourceId,
        confirm: &impl Confirm,
    ) -> Result<MutationOutcome, ControllerError> {
        self.open_menu = None;
        self.position(id)?;

        let prompt = format!(
            "Are you sure you want to delete {} {id}? This action cannot be undone.",
            T::LABEL
        );
        if !confirm.confirm(&prompt) {
            info!(collection = T::COLLECTION, %id, "deletion cancelled by user");
            return Ok(MutationOutcome::Cancelled);
        }

        let pending = self.begin_delete(id)?;
        let result = self.api.delete(T::COLLECTION, id).await;
        let settlement = self.settle(pending, result);
        self.follow_up(settlement.reload).await;
        Ok(settlement.outcome)
    }

    /// Deletes every selected item after a single confirmation. Requests are
    /// sent concurrently; items whose delete fails are put back.
    pub async fn delete_selected(
        &mut self,
        confirm: &impl Confirm,
    ) -> Result<BulkDeleteOutcome, ControllerError> {
        let count = self
            .items
            .iter()
            .filter(|item| self.selected.contains(item.id()))
            .count();
        if count == 0 {
            return Err(ControllerError::EmptySelection { label: T::LABEL });
        }

        let prompt = format!(
            "Are you sure you want to delete the {count} selected {}(s)?",
            T::LABEL
        );
        if !confirm.confirm(&prompt) {
            info!(collection = T::COLLECTION, count, "bulk deletion cancelled by user");
            return Ok(BulkDeleteOutcome {
                cancelled: true,
                ..BulkDeleteOutcome::default()
            });
        }

        let pending = self.begin_bulk_delete()?;
        let ids = pending.ids().to_vec();
        let api = &self.api;
        let results = join_all(ids.into_iter().map(|id| async move {
            let result = api.delete(T::COLLECTION, &id).await;
            (id, result)
        }))
        .await;

        let outcome = self.settle_bulk(pending, results);
        let reload = bulk_reload(&self.pagination, &self.items);
        self.follow_up(reload).await;
        Ok(outcome)
    }

    /// Loads the page a delete left behind. The page number moves first so a
    /// failed reload is retried against the page that still exists.
    async fn follow_up(&mut self, reload: Option<u32>) {
        let Some(page) = reload else {
            return;
        };
        if self.pagination.contains(page) {
            self.pagination.page = page;
        }
        if let Err(error) = self.fetch_page(page).await {
            warn!(collection = T::COLLECTION, page, %error, "reload after delete failed");
        }
    }

    fn position(&self, id: &ResourceId) -> Result<usize, ControllerError> {
        self.items
            .iter()
            .position(|item| item.id() == id)
            .ok_or_else(|| ControllerError::UnknownItem {
                label: T::LABEL,
                id: id.clone(),
            })
    }

    fn snapshot(&self) -> Snapshot<T> {
        Snapshot {
            items: self.items.clone(),
            total: self.pagination.total,
        }
    }

    fn restore(&mut self, snapshot: Snapshot<T>) {
        self.items = snapshot.items;
        self.pagination.total = snapshot.total;
    }
}

fn bulk_reload<T>(pagination: &Pagination, items: &[T]) -> Option<u32> {
    items
        .is_empty()
        .then(|| pagination.page.saturating_sub(1).max(1))
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
