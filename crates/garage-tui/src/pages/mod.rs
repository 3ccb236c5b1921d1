//! Page state machines.
//!
//! Each page owns its search term, selection, modal, and mutation pending
//! flags. Fetched data lives in the query caches owned by `App`; pages only
//! decide which key they show and how to present it.

pub mod cars;
pub mod dashboard;
pub mod owners;

use garage_core::cache::{QueryCache, QueryKey, QueryStatus};
use garage_core::models::EntityKind;

pub use cars::CarsPage;
pub use dashboard::DashboardPage;
pub use owners::OwnersPage;

// ============================================================================
// Modal & mutation state
// ============================================================================

/// Overlay shown on top of a list page.
#[derive(Debug, Clone, PartialEq)]
pub enum Modal<T> {
    None,
    Create,
    Edit(T),
    ConfirmDelete(T),
}

impl<T> Modal<T> {
    pub fn is_open(&self) -> bool {
        !matches!(self, Modal::None)
    }

    /// Create or edit form.
    pub fn is_form(&self) -> bool {
        matches!(self, Modal::Create | Modal::Edit(_))
    }

    fn matches_kind(&self, kind: MutationKind) -> bool {
        matches!(
            (self, kind),
            (Modal::Create, MutationKind::Create)
                | (Modal::Edit(_), MutationKind::Update)
                | (Modal::ConfirmDelete(_), MutationKind::Delete)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Create,
    Update,
    Delete,
}

/// One in-flight flag per mutation kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pending {
    pub create: bool,
    pub update: bool,
    pub delete: bool,
}

impl Pending {
    pub fn get(&self, kind: MutationKind) -> bool {
        match kind {
            MutationKind::Create => self.create,
            MutationKind::Update => self.update,
            MutationKind::Delete => self.delete,
        }
    }

    fn set(&mut self, kind: MutationKind, value: bool) {
        match kind {
            MutationKind::Create => self.create = value,
            MutationKind::Update => self.update = value,
            MutationKind::Delete => self.delete = value,
        }
    }
}

// ============================================================================
// List page
// ============================================================================

/// What a list page shows right now.
#[derive(Debug, PartialEq)]
pub enum PageView<'a, T> {
    Loading,
    Error(&'a str),
    Empty,
    /// `refreshing` is set while a fetch for the current key is running,
    /// including when the items are still those of the previous key.
    Populated { items: &'a [T], refreshing: bool },
}

impl<T> PageView<'_, T> {
    pub fn items(&self) -> &[T] {
        match self {
            PageView::Populated { items, .. } => items,
            _ => &[],
        }
    }
}

/// State shared by the cars and owners pages.
#[derive(Debug)]
pub struct ListPage<T> {
    entity: EntityKind,
    pub term: String,
    pub selection: usize,
    pub modal: Modal<T>,
    pub pending: Pending,
    /// Last key whose data was shown, for keep-previous-data.
    displayed_key: Option<QueryKey>,
}

impl<T: Clone> ListPage<T> {
    pub fn new(entity: EntityKind, term: String) -> Self {
        Self {
            entity,
            term,
            selection: 0,
            modal: Modal::None,
            pending: Pending::default(),
            displayed_key: None,
        }
    }

    pub fn query_key(&self) -> QueryKey {
        QueryKey::list(self.entity, &self.term)
    }

    pub fn has_term(&self) -> bool {
        !self.term.trim().is_empty()
    }

    /// Change the search term. Returns whether the query key changed.
    pub fn set_term(&mut self, term: impl Into<String>) -> bool {
        let before = self.query_key();
        self.term = term.into();
        let changed = before != self.query_key();
        if changed {
            self.selection = 0;
        }
        changed
    }

    pub fn view<'a>(&self, cache: &'a QueryCache<Vec<T>>) -> PageView<'a, T> {
        let key = self.query_key();
        if let Some(items) = cache.data(&key) {
            return if items.is_empty() {
                PageView::Empty
            } else {
                PageView::Populated {
                    items,
                    refreshing: cache.is_fetching(&key),
                }
            };
        }
        if cache.status(&key) == QueryStatus::Error {
            return PageView::Error(cache.error(&key).unwrap_or_default());
        }
        if let Some(items) = self
            .displayed_key
            .as_ref()
            .and_then(|previous| cache.data(previous))
            .filter(|items| !items.is_empty())
        {
            return PageView::Populated {
                items,
                refreshing: true,
            };
        }
        PageView::Loading
    }

    /// Called after a fetch for `key` completed.
    pub fn note_loaded(&mut self, key: &QueryKey, cache: &QueryCache<Vec<T>>) {
        if *key != self.query_key() {
            return;
        }
        if let Some(items) = cache.data(key) {
            self.displayed_key = Some(key.clone());
            self.selection = self.selection.min(items.len().saturating_sub(1));
        }
    }

    pub fn selected<'a>(&self, cache: &'a QueryCache<Vec<T>>) -> Option<&'a T> {
        match self.view(cache) {
            PageView::Populated { items, .. } => items.get(self.selection),
            _ => None,
        }
    }

    /// Move the selection by `delta`, clamped to the list.
    pub fn move_selection(&mut self, delta: isize, len: usize) {
        if len == 0 {
            self.selection = 0;
            return;
        }
        let next = self.selection as isize + delta;
        self.selection = next.clamp(0, len as isize - 1) as usize;
    }

    pub fn open_create(&mut self) {
        self.modal = Modal::Create;
    }

    pub fn open_edit(&mut self, item: T) {
        self.modal = Modal::Edit(item);
    }

    pub fn open_delete(&mut self, item: T) {
        self.modal = Modal::ConfirmDelete(item);
    }

    pub fn close_modal(&mut self) {
        self.modal = Modal::None;
    }

    /// Mark a mutation as started. `false` if one of this kind is pending.
    pub fn begin(&mut self, kind: MutationKind) -> bool {
        if self.pending.get(kind) {
            return false;
        }
        self.pending.set(kind, true);
        true
    }

    /// Clear the pending flag. On success the matching modal closes; on
    /// failure it stays open.
    pub fn finish(&mut self, kind: MutationKind, success: bool) {
        self.pending.set(kind, false);
        if success && self.modal.matches_kind(kind) {
            self.modal = Modal::None;
        }
    }
}
