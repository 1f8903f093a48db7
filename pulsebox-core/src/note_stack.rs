//! Held input notes, kept sorted by pitch.
//!
//! Backed by a fixed array so note input never allocates. The usable capacity
//! is chosen at construction and bounded by [`MAX_SLOTS`].

use pulsebox_types::{NoteEntry, PitchClass};

/// Physical slot count of every stack.
pub const MAX_SLOTS: usize = 16;

/// Capacity used by [`NoteStack::new`].
pub const DEFAULT_CAPACITY: usize = 10;

#[derive(Debug, Clone)]
pub struct NoteStack {
    notes: [NoteEntry; MAX_SLOTS],
    size: usize,
    capacity: usize,
}

impl NoteStack {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Capacity is clamped to `1..=MAX_SLOTS`.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            notes: [NoteEntry::default(); MAX_SLOTS],
            size: 0,
            capacity: capacity.clamp(1, MAX_SLOTS),
        }
    }

    /// Insert `pitch`, or update its velocity if already held.
    ///
    /// When the stack is full a new pitch is dropped.
    pub fn note_on(&mut self, pitch: u8, velocity: u8) {
        let position = self.notes[..self.size]
            .iter()
            .position(|entry| entry.pitch >= pitch)
            .unwrap_or(self.size);

        if position < self.size && self.notes[position].pitch == pitch {
            self.notes[position].velocity = velocity;
            return;
        }
        if self.size == self.capacity {
            log::trace!(target: "notes", "stack full, dropping pitch {}", pitch);
            return;
        }

        self.notes.copy_within(position..self.size, position + 1);
        self.notes[position] = NoteEntry { pitch, velocity };
        self.size += 1;
    }

    /// Remove `pitch`. Unknown pitches are ignored.
    pub fn note_off(&mut self, pitch: u8) {
        if let Some(position) = self.notes[..self.size].iter().position(|e| e.pitch == pitch) {
            self.notes.copy_within(position + 1..self.size, position);
            self.size -= 1;
        }
    }

    pub fn clear(&mut self) {
        self.size = 0;
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The `index`-th lowest held note.
    ///
    /// # Panics
    /// If `index >= size()`.
    pub fn sorted_note(&self, index: usize) -> NoteEntry {
        assert!(
            index < self.size,
            "note stack index {} out of range (size {})",
            index,
            self.size
        );
        self.notes[index]
    }

    pub fn iter(&self) -> impl Iterator<Item = &NoteEntry> {
        self.notes[..self.size].iter()
    }

    pub fn factorize_pitch(pitch: u8) -> PitchClass {
        PitchClass::from_pitch(pitch)
    }
}

impl Default for NoteStack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pitches(stack: &NoteStack) -> Vec<u8> {
        stack.iter().map(|e| e.pitch).collect()
    }

    fn assert_strictly_sorted(stack: &NoteStack) {
        for i in 1..stack.size() {
            assert!(stack.sorted_note(i - 1).pitch < stack.sorted_note(i).pitch);
        }
    }

    #[test]
    fn insert_keeps_ascending_order() {
        let mut stack = NoteStack::new();
        for pitch in [64, 60, 72, 62, 48] {
            stack.note_on(pitch, 100);
        }
        assert_eq!(pitches(&stack), vec![48, 60, 62, 64, 72]);
        assert_strictly_sorted(&stack);
    }

    #[test]
    fn duplicate_pitch_replaces_velocity() {
        let mut stack = NoteStack::new();
        stack.note_on(60, 100);
        stack.note_on(60, 30);
        assert_eq!(stack.size(), 1);
        assert_eq!(stack.sorted_note(0), NoteEntry { pitch: 60, velocity: 30 });
    }

    #[test]
    fn note_off_removes_and_ignores_unknown() {
        let mut stack = NoteStack::new();
        stack.note_on(60, 100);
        stack.note_on(64, 100);
        stack.note_off(61);
        assert_eq!(stack.size(), 2);
        stack.note_off(60);
        assert_eq!(pitches(&stack), vec![64]);
        stack.note_off(60);
        assert_eq!(pitches(&stack), vec![64]);
    }

    #[test]
    fn full_stack_drops_new_pitches() {
        let mut stack = NoteStack::with_capacity(2);
        stack.note_on(60, 1);
        stack.note_on(62, 1);
        stack.note_on(50, 1);
        assert_eq!(pitches(&stack), vec![60, 62]);
        // Held pitches can still be updated.
        stack.note_on(62, 99);
        assert_eq!(stack.sorted_note(1).velocity, 99);
    }

    #[test]
    fn capacity_is_bounded() {
        assert_eq!(NoteStack::with_capacity(0).capacity(), 1);
        assert_eq!(NoteStack::with_capacity(100).capacity(), MAX_SLOTS);
    }

    #[test]
    fn mixed_sequence_stays_sorted() {
        let mut stack = NoteStack::with_capacity(MAX_SLOTS);
        let mut seed = 7u32;
        for _ in 0..500 {
            seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            let pitch = ((seed >> 16) % 40) as u8 + 40;
            if (seed >> 8) & 1 == 0 {
                stack.note_on(pitch, 100);
            } else {
                stack.note_off(pitch);
            }
            assert_strictly_sorted(&stack);
        }
    }

    #[test]
    #[should_panic]
    fn sorted_note_out_of_range_panics() {
        let stack = NoteStack::new();
        stack.sorted_note(0);
    }
}
