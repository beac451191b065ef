use serde::{Deserialize, Serialize};

/// Capacity of [`AnnouncedMarks`].
pub const MAX_MARKS: usize = 32;

/// Triggers already fired in the current phase instance, keyed by the
/// trigger's position in the phase's mark list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnnouncedMarks(u32);

impl AnnouncedMarks {
    pub fn new() -> Self {
        Self(0)
    }

    pub fn contains(&self, index: usize) -> bool {
        index < MAX_MARKS && self.0 & (1 << index) != 0
    }

    /// Record `index`. Returns `false` if it was already recorded.
    pub fn insert(&mut self, index: usize) -> bool {
        if index >= MAX_MARKS || self.contains(index) {
            return false;
        }
        self.0 |= 1 << index;
        true
    }

    pub fn clear(&mut self) {
        self.0 = 0;
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}
