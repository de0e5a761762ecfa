use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;

use crate::source::{child_path, ChildEntry, EntryInfo, FetchKind, FetchOutcome, FetchPayload, FetchRequest};

/// State of a requested value. A path missing from the map is absent.
#[derive(Debug, Clone, PartialEq)]
pub enum Slot<T> {
    Pending,
    Resolved(T),
    /// The fetch failed; never retried this session
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheStatus {
    Absent,
    Pending,
    Resolved,
    Failed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SlotCounts {
    pub pending: usize,
    pub resolved: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub entries: SlotCounts,
    pub listings: SlotCounts,
    pub previews: SlotCounts,
}

impl CacheStats {
    pub fn pending(&self) -> usize {
        self.entries.pending + self.listings.pending + self.previews.pending
    }
}

/// Path-keyed slots with one-way transitions: absent → pending → resolved | failed.
#[derive(Debug)]
struct SlotMap<T> {
    slots: HashMap<String, Slot<T>>,
}

impl<T> Default for SlotMap<T> {
    fn default() -> Self {
        Self { slots: HashMap::new() }
    }
}

impl<T> SlotMap<T> {
    fn status(&self, path: &str) -> CacheStatus {
        match self.slots.get(path) {
            None => CacheStatus::Absent,
            Some(Slot::Pending) => CacheStatus::Pending,
            Some(Slot::Resolved(_)) => CacheStatus::Resolved,
            Some(Slot::Failed(_)) => CacheStatus::Failed,
        }
    }

    fn get(&self, path: &str) -> Option<&T> {
        match self.slots.get(path) {
            Some(Slot::Resolved(value)) => Some(value),
            _ => None,
        }
    }

    /// Mark an absent path pending. True when the caller must fetch it.
    fn claim(&mut self, path: &str) -> bool {
        if self.slots.contains_key(path) {
            return false;
        }
        self.slots.insert(path.to_string(), Slot::Pending);
        true
    }

    /// Store a value for a pending path; anything else is left alone.
    fn resolve(&mut self, path: &str, value: T) -> bool {
        match self.slots.get_mut(path) {
            Some(slot) if matches!(slot, Slot::Pending) => {
                *slot = Slot::Resolved(value);
                true
            }
            _ => false,
        }
    }

    /// Resolve a path that is absent or pending, without a fetch of its own.
    fn prefill(&mut self, path: String, value: T) -> bool {
        match self.slots.get(&path) {
            None | Some(Slot::Pending) => {
                self.slots.insert(path, Slot::Resolved(value));
                true
            }
            _ => false,
        }
    }

    fn fail(&mut self, path: &str, message: String) -> bool {
        match self.slots.get_mut(path) {
            Some(slot) if matches!(slot, Slot::Pending) => {
                *slot = Slot::Failed(message);
                true
            }
            _ => false,
        }
    }

    fn counts(&self) -> SlotCounts {
        let mut counts = SlotCounts::default();
        for slot in self.slots.values() {
            match slot {
                Slot::Pending => counts.pending += 1,
                Slot::Resolved(_) => counts.resolved += 1,
                Slot::Failed(_) => counts.failed += 1,
            }
        }
        counts
    }
}

/// Session-long memo of entry metadata, directory listings and file previews.
///
/// Lookups that miss mark the path pending and queue a [`FetchRequest`];
/// the owner drains the queue with [`EntryCache::take_requests`] and feeds
/// completions back through [`EntryCache::apply`]. Each path is requested at
/// most once per cache and resolved values never change.
#[derive(Debug, Default)]
pub struct EntryCache {
    entries: SlotMap<EntryInfo>,
    listings: SlotMap<Arc<[ChildEntry]>>,
    previews: SlotMap<Arc<str>>,
    requests: Vec<FetchRequest>,
}

impl EntryCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure(&mut self, kind: FetchKind, path: &str) {
        let claimed = match kind {
            FetchKind::Entry => self.entries.claim(path),
            FetchKind::Listing => self.listings.claim(path),
            FetchKind::Preview => self.previews.claim(path),
        };
        if claimed {
            tracing::trace!(path, ?kind, "queue fetch");
            self.requests.push(FetchRequest {
                path: path.to_string(),
                kind,
            });
        }
    }

    /// Resolved metadata for `path`; fetches it when absent.
    pub fn entry(&mut self, path: &str) -> Option<&EntryInfo> {
        self.ensure(FetchKind::Entry, path);
        self.entries.get(path)
    }

    /// Resolved listing for `path`; fetches it when absent.
    pub fn listing(&mut self, path: &str) -> Option<Arc<[ChildEntry]>> {
        self.ensure(FetchKind::Listing, path);
        self.listings.get(path).cloned()
    }

    /// Resolved preview for `path`; fetches it when absent.
    pub fn preview(&mut self, path: &str) -> Option<Arc<str>> {
        self.ensure(FetchKind::Preview, path);
        self.previews.get(path).cloned()
    }

    pub fn peek_entry(&self, path: &str) -> Option<&EntryInfo> {
        self.entries.get(path)
    }

    pub fn peek_listing(&self, path: &str) -> Option<&[ChildEntry]> {
        self.listings.get(path).map(|children| &children[..])
    }

    pub fn peek_preview(&self, path: &str) -> Option<&str> {
        self.previews.get(path).map(|text| &text[..])
    }

    pub fn status(&self, kind: FetchKind, path: &str) -> CacheStatus {
        match kind {
            FetchKind::Entry => self.entries.status(path),
            FetchKind::Listing => self.listings.status(path),
            FetchKind::Preview => self.previews.status(path),
        }
    }

    /// Fetches queued since the last call.
    pub fn take_requests(&mut self) -> Vec<FetchRequest> {
        std::mem::take(&mut self.requests)
    }

    pub fn has_queued_requests(&self) -> bool {
        !self.requests.is_empty()
    }

    /// Store a completed fetch. Returns whether any slot changed.
    ///
    /// Listings also resolve the metadata of each child.
    pub fn apply(&mut self, outcome: FetchOutcome) -> bool {
        let FetchOutcome { request, result } = outcome;
        let path = request.path.as_str();

        let changed = match (request.kind, result) {
            (kind, Err(e)) => {
                tracing::warn!(path, ?kind, error = %e, "fetch failed");
                self.fail(kind, path, e.to_string())
            }
            (FetchKind::Entry, Ok(FetchPayload::Entry(info))) => self.entries.resolve(path, info),
            (FetchKind::Listing, Ok(FetchPayload::Listing(children))) => {
                let changed = self.listings.resolve(path, children.into());
                if changed {
                    self.prefill_children(path);
                }
                changed
            }
            (FetchKind::Preview, Ok(FetchPayload::Preview(text))) => self.previews.resolve(path, text.into()),
            (kind, Ok(payload)) => {
                tracing::warn!(path, ?kind, ?payload, "fetch returned the wrong payload");
                self.fail(kind, path, "unexpected payload".to_string())
            }
        };

        if !changed {
            tracing::debug!(path, kind = ?request.kind, "ignoring completion for a path that is not pending");
        }
        changed
    }

    fn fail(&mut self, kind: FetchKind, path: &str, message: String) -> bool {
        match kind {
            FetchKind::Entry => self.entries.fail(path, message),
            FetchKind::Listing => self.listings.fail(path, message),
            FetchKind::Preview => self.previews.fail(path, message),
        }
    }

    fn prefill_children(&mut self, parent: &str) {
        let Some(children) = self.listings.get(parent).cloned() else {
            return;
        };
        for child in children.iter() {
            self.entries.prefill(
                child_path(parent, &child.name),
                EntryInfo {
                    name: child.name.clone(),
                    kind: child.kind,
                },
            );
        }
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.counts(),
            listings: self.listings.counts(),
            previews: self.previews.counts(),
        }
    }
}
