use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestKind {
    /// Hall call made from a landing.
    External,
    /// Button pressed inside the cabin.
    Internal,
}

/// Pending floor requests.
///
/// `external` and `internal` keep arrival order; `sorted` is their union in
/// ascending order and is maintained incrementally on every insert/serve.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestSet {
    external: Vec<i32>,
    internal: Vec<i32>,
    sorted: Vec<i32>,
}

impl RequestSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a request. Returns `false` if the floor was already pending.
    pub fn insert(&mut self, kind: RequestKind, floor: i32) -> bool {
        if self.contains(floor) {
            return false;
        }

        match kind {
            RequestKind::External => self.external.push(floor),
            RequestKind::Internal => self.internal.push(floor),
        }
        if let Err(position) = self.sorted.binary_search(&floor) {
            self.sorted.insert(position, floor);
        }
        true
    }

    /// Drop every request for `floor`. Returns `true` if anything was pending.
    pub fn serve(&mut self, floor: i32) -> bool {
        let before = self.external.len() + self.internal.len();
        self.external.retain(|&f| f != floor);
        self.internal.retain(|&f| f != floor);
        if let Ok(position) = self.sorted.binary_search(&floor) {
            self.sorted.remove(position);
        }
        before != self.external.len() + self.internal.len()
    }

    pub fn contains(&self, floor: i32) -> bool {
        self.sorted.binary_search(&floor).is_ok()
    }

    pub fn is_empty(&self) -> bool {
        self.sorted.is_empty()
    }

    pub fn len(&self) -> usize {
        self.sorted.len()
    }

    pub fn external(&self) -> &[i32] {
        &self.external
    }

    pub fn internal(&self) -> &[i32] {
        &self.internal
    }

    pub fn sorted(&self) -> &[i32] {
        &self.sorted
    }

    /// Oldest cabin-button request, falling back to the oldest hall call.
    pub fn first_preferring_internal(&self) -> Option<i32> {
        self.internal.first().or_else(|| self.external.first()).copied()
    }

    /// Nearest pending floor strictly above `floor`.
    pub fn next_above(&self, floor: i32) -> Option<i32> {
        let index = self.sorted.partition_point(|&f| f <= floor);
        self.sorted.get(index).copied()
    }

    /// Nearest pending floor strictly below `floor`.
    pub fn next_below(&self, floor: i32) -> Option<i32> {
        let index = self.sorted.partition_point(|&f| f < floor);
        index.checked_sub(1).map(|i| self.sorted[i])
    }
}
