use image::RgbaImage;
use std::collections::VecDeque;
use std::sync::Arc;

use crate::canvas::Surface;

// ============================================================================
// SNAPSHOT — immutable full-surface copy
// ============================================================================

/// What produced a history entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SnapshotKind {
    /// Blank surface or loaded base image at session start.
    Initial,
    BrushStroke,
    EraserStroke,
    Clear,
}

impl SnapshotKind {
    pub fn description(&self) -> &'static str {
        match self {
            SnapshotKind::Initial => "Open",
            SnapshotKind::BrushStroke => "Brush Stroke",
            SnapshotKind::EraserStroke => "Eraser Stroke",
            SnapshotKind::Clear => "Clear",
        }
    }
}

/// Full-resolution pixel content of the surface at one point in time.
#[derive(Clone)]
pub struct Snapshot {
    pub kind: SnapshotKind,
    pixels: Arc<RgbaImage>,
}

impl Snapshot {
    pub fn capture(kind: SnapshotKind, surface: &Surface) -> Self {
        Self {
            kind,
            pixels: Arc::new(surface.snapshot_pixels()),
        }
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn restore_into(&self, surface: &mut Surface) {
        surface.restore(&self.pixels);
    }

    pub fn memory_size(&self) -> usize {
        self.pixels.as_raw().len()
    }
}

// ============================================================================
// HISTORY MANAGER — linear snapshot history with a cursor and memory limits
// ============================================================================

/// Ordered snapshots plus a cursor. The entry at the cursor always matches
/// the live surface; entries after it are redo-only and are discarded when a
/// new entry is pushed.
pub struct HistoryManager {
    entries: VecDeque<Snapshot>,
    cursor: usize,
    max_history_size: usize,
    /// Optional memory cap in bytes.
    max_memory_bytes: Option<usize>,
    /// Running memory total across all entries.
    total_memory: usize,
}

impl HistoryManager {
    /// Start a history whose only entry is `initial`.
    pub fn new(initial: Snapshot, max_history_size: usize, max_memory_bytes: Option<usize>) -> Self {
        let total_memory = initial.memory_size();
        let mut entries = VecDeque::new();
        entries.push_back(initial);
        Self {
            entries,
            cursor: 0,
            max_history_size: max_history_size.max(1),
            max_memory_bytes,
            total_memory,
        }
    }

    /// Drop everything and start over from `initial`.
    pub fn reset(&mut self, initial: Snapshot) {
        self.total_memory = initial.memory_size();
        self.entries.clear();
        self.entries.push_back(initial);
        self.cursor = 0;
    }

    /// Append `snapshot` after the cursor and move the cursor onto it.
    pub fn push(&mut self, snapshot: Snapshot) {
        // Discard redo-only entries
        while self.entries.len() > self.cursor + 1 {
            if let Some(removed) = self.entries.pop_back() {
                self.total_memory = self.total_memory.saturating_sub(removed.memory_size());
            }
        }

        self.total_memory += snapshot.memory_size();
        self.entries.push_back(snapshot);
        self.cursor = self.entries.len() - 1;

        self.prune();
    }

    /// Step back one entry and restore it. Returns the kind of the entry that
    /// was undone, or `None` at the oldest entry.
    pub fn undo(&mut self, surface: &mut Surface) -> Option<SnapshotKind> {
        if self.cursor == 0 {
            return None;
        }
        let undone = self.entries[self.cursor].kind;
        self.cursor -= 1;
        self.entries[self.cursor].restore_into(surface);
        Some(undone)
    }

    /// Step forward one entry and restore it.
    pub fn redo(&mut self, surface: &mut Surface) -> Option<SnapshotKind> {
        if self.cursor + 1 >= self.entries.len() {
            return None;
        }
        self.cursor += 1;
        let entry = &self.entries[self.cursor];
        entry.restore_into(surface);
        Some(entry.kind)
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn get(&self, index: usize) -> Option<&Snapshot> {
        self.entries.get(index)
    }

    pub fn current(&self) -> &Snapshot {
        &self.entries[self.cursor]
    }

    /// Descriptions of all entries, oldest first.
    pub fn descriptions(&self) -> Vec<&'static str> {
        self.entries.iter().map(|e| e.kind.description()).collect()
    }

    /// Get the current memory usage of the history (O(1) via cached total)
    pub fn memory_usage(&self) -> usize {
        self.total_memory
    }

    /// Evict the oldest entries to stay within limits. The cursor entry is
    /// never evicted.
    fn prune(&mut self) {
        let mut evicted = 0usize;
        while self.entries.len() > self.max_history_size && self.cursor > 0 {
            self.evict_front();
            evicted += 1;
        }

        if let Some(max_bytes) = self.max_memory_bytes {
            while self.total_memory > max_bytes && self.cursor > 0 {
                self.evict_front();
                evicted += 1;
            }
        }

        if evicted > 0 {
            log::debug!(
                "History pruned {} entr{}, {} left ({} bytes)",
                evicted,
                if evicted == 1 { "y" } else { "ies" },
                self.entries.len(),
                self.total_memory
            );
        }
    }

    fn evict_front(&mut self) {
        if let Some(removed) = self.entries.pop_front() {
            self.total_memory = self.total_memory.saturating_sub(removed.memory_size());
            self.cursor = self.cursor.saturating_sub(1);
        }
    }
}
