//! Control panel: transient UI state wired to one module's store.

mod form;

pub use form::{FormData, FormValidator, FromForm, EDIT_ONLY_FIELDS};

use std::cell::Cell;
use std::collections::BTreeSet;
use std::rc::Rc;

use crate::collection::{CollectionStore, StatusChange, SubscriptionId};
use crate::entity::Entity;
use crate::error::{OpsdeskError, Result};
use crate::notify::{Notification, NotificationSink};
use crate::search::{paginate, sort_entities, PageSlice, Pagination, Query, Sort, StatusFilter};
use crate::status::{apply_transition, Transition};
use crate::view::{Intent, ViewMode};

/// Visible vs total records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordCount {
    pub visible: usize,
    pub total: usize,
}

/// Owns a module's store plus the search, filter, selection, view mode,
/// sort and page state of its screen.
pub struct ControlPanel<E: Entity, N: NotificationSink> {
    store: CollectionStore<E>,
    sink: N,
    query: Query<E::Status>,
    selected: BTreeSet<String>,
    view_mode: ViewMode,
    sort: Option<Sort>,
    pagination: Pagination,
    changes: Rc<Cell<u64>>,
    subscription: SubscriptionId,
    author: Option<String>,
}

impl<E: FromForm, N: NotificationSink> ControlPanel<E, N> {
    pub fn new(mut store: CollectionStore<E>, sink: N) -> Self {
        let changes = Rc::new(Cell::new(0));
        let counter = Rc::clone(&changes);
        let subscription = store.subscribe(move |_| counter.set(counter.get() + 1));

        Self {
            store,
            sink,
            query: Query::default(),
            selected: BTreeSet::new(),
            view_mode: ViewMode::default(),
            sort: None,
            pagination: Pagination::default(),
            changes,
            subscription,
            author: None,
        }
    }

    /// Name recorded as `created_by` on records this panel creates.
    pub fn with_author(mut self, author: Option<String>) -> Self {
        self.author = author;
        self
    }

    pub fn store(&self) -> &CollectionStore<E> {
        &self.store
    }

    pub fn sink(&self) -> &N {
        &self.sink
    }

    /// Store mutations seen since the panel was created; a renderer redraws
    /// whenever this moves.
    pub fn changes(&self) -> u64 {
        self.changes.get()
    }

    pub fn into_parts(mut self) -> (CollectionStore<E>, N) {
        self.store.unsubscribe(self.subscription);
        (self.store, self.sink)
    }

    // ---- search / filter / view state ----

    pub fn set_search(&mut self, text: &str) {
        self.query.text = text.to_string();
    }

    pub fn set_filter(&mut self, filter: StatusFilter<E::Status>) {
        self.query.status = filter;
    }

    pub fn set_query(&mut self, query: Query<E::Status>) {
        self.query = query;
    }

    pub fn query(&self) -> &Query<E::Status> {
        &self.query
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        self.view_mode = mode;
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn set_sort(&mut self, sort: Option<Sort>) {
        self.sort = sort;
    }

    pub fn set_pagination(&mut self, pagination: Pagination) {
        self.pagination = pagination;
    }

    /// Records passing the current query, in insertion order unless a sort is set.
    pub fn visible(&self) -> Vec<&E> {
        let mut items: Vec<&E> = self
            .store
            .list()
            .iter()
            .filter(|e| self.query.matches(*e))
            .collect();
        if let Some(sort) = self.sort {
            sort_entities(&mut items, sort);
        }
        items
    }

    pub fn page(&self) -> PageSlice<&E> {
        paginate(&self.visible(), self.pagination)
    }

    pub fn record_count(&self) -> RecordCount {
        RecordCount {
            visible: self.visible().len(),
            total: self.store.len(),
        }
    }

    // ---- selection ----

    /// Flip `id` in the selection; returns whether it is now selected.
    pub fn toggle_selected(&mut self, id: &str) -> bool {
        if self.selected.remove(id) {
            false
        } else if self.store.contains(id) {
            self.selected.insert(id.to_string());
            true
        } else {
            false
        }
    }

    pub fn select_all_visible(&mut self) {
        let ids: Vec<String> = self.visible().iter().map(|e| e.id().to_string()).collect();
        self.selected.extend(ids);
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    pub fn selected_ids(&self) -> &BTreeSet<String> {
        &self.selected
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    // ---- mutations ----

    /// Validate `form` and insert the new record.
    pub fn create(&mut self, form: &FormData) -> Result<E> {
        let kind = E::KIND;
        let result = E::from_form(form, self.store.next_sequence_number())
            .map_err(OpsdeskError::from)
            .and_then(|mut entity| {
                entity.base_mut().created_by = self.author.clone();
                self.store.insert(entity.clone())?;
                Ok(entity)
            });

        match &result {
            Ok(entity) => self.sink.notify(Notification::success(
                format!("{} created", capitalize(&kind.to_string())),
                describe(entity),
            )),
            Err(e) => self
                .sink
                .notify(Notification::error(format!("Could not create {}", kind), e.to_string())),
        }
        result
    }

    /// Validate a partial `form` and merge it into the record with `id`.
    pub fn edit(&mut self, id: &str, form: &FormData) -> Result<E> {
        match E::update_from_form(form) {
            Ok(update) => self.update(id, update),
            Err(errors) => {
                let err = OpsdeskError::from(errors);
                self.sink.notify(Notification::error(
                    format!("Could not update {}", E::KIND),
                    err.to_string(),
                ));
                Err(err)
            }
        }
    }

    /// Merge an already-built update payload.
    pub fn update(&mut self, id: &str, update: E::Update) -> Result<E> {
        let result = self.store.update_by_id(id, update);
        match &result {
            Ok(entity) => self.sink.notify(Notification::success(
                format!("{} updated", capitalize(&E::KIND.to_string())),
                describe(entity),
            )),
            Err(e) => self.sink.notify(Notification::error(
                format!("Could not update {}", E::KIND),
                e.to_string(),
            )),
        }
        result
    }

    pub fn transition(&mut self, id: &str, transition: Transition) -> Result<E> {
        let next = self
            .store
            .get(id)
            .ok_or_else(|| OpsdeskError::NotFound(id.to_string()))
            .and_then(|entity| apply_transition(entity.status(), transition));
        let result = next.and_then(|next| self.store.update_by_id(id, StatusChange(next)));

        match &result {
            Ok(entity) => {
                tracing::info!(kind = %E::KIND, %id, %transition, status = %entity.status(), "status changed");
                self.sink.notify(Notification::success(
                    format!("{} {}", capitalize(&E::KIND.to_string()), entity.status()),
                    describe(entity),
                ));
            }
            Err(e) => self.sink.notify(Notification::error(
                format!("Could not {} {}", transition, E::KIND),
                e.to_string(),
            )),
        }
        result
    }

    /// Advance to the next status in the module's cycle.
    pub fn cycle_status(&mut self, id: &str) -> Result<E> {
        self.transition(id, Transition::Cycle)
    }

    pub fn approve(&mut self, id: &str) -> Result<E> {
        self.transition(id, Transition::Approve)
    }

    pub fn reject(&mut self, id: &str) -> Result<E> {
        self.transition(id, Transition::Reject)
    }

    /// Remove the record with `id`. Absent ids are ignored.
    pub fn delete(&mut self, id: &str) -> Option<E> {
        self.selected.remove(id);
        let removed = self.store.remove_by_id(id)?;
        self.sink.notify(Notification::success(
            format!("{} deleted", capitalize(&E::KIND.to_string())),
            describe(&removed),
        ));
        Some(removed)
    }

    /// Remove every selected record and clear the selection.
    pub fn delete_selected(&mut self) -> Vec<E> {
        let ids: Vec<String> = std::mem::take(&mut self.selected).into_iter().collect();
        ids.iter().filter_map(|id| self.delete(id)).collect()
    }

    /// Carry out an intent emitted by a renderer.
    pub fn dispatch(&mut self, intent: Intent) -> Result<Option<E>> {
        match intent {
            Intent::View { id } => self
                .store
                .get(&id)
                .cloned()
                .map(Some)
                .ok_or(OpsdeskError::NotFound(id)),
            Intent::Edit { id, form } => self.edit(&id, &form).map(Some),
            Intent::Delete { id } => Ok(self.delete(&id)),
            Intent::Transition { id, transition } => self.transition(&id, transition).map(Some),
        }
    }
}

/// `003 (a1b2c3d) Jane Doe`
pub fn describe<E: Entity>(entity: &E) -> String {
    format!(
        "{:03} ({}) {}",
        entity.base().sequence_number,
        entity.base().short_id(),
        entity.title()
    )
}

fn capitalize(s: &str) -> String {
    let s = s.replace('_', " ");
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
