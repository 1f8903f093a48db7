use serde::{Deserialize, Serialize};

/// A held input note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NoteEntry {
    pub pitch: u8,
    pub velocity: u8,
}

/// A MIDI pitch split into octave and semitone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PitchClass {
    pub octave: u8,
    pub note: u8,
}

impl PitchClass {
    pub fn from_pitch(pitch: u8) -> Self {
        Self {
            octave: pitch / 12,
            note: pitch % 12,
        }
    }

    /// Drum part addressed by this octave: octaves 0-3 share part 0, 7 and up
    /// share part 3, the rest map one-to-one.
    pub fn part(self) -> usize {
        if self.octave >= 7 {
            3
        } else if self.octave <= 3 {
            0
        } else {
            (self.octave - 3) as usize
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factorize_middle_c() {
        let pc = PitchClass::from_pitch(60);
        assert_eq!(pc, PitchClass { octave: 5, note: 0 });
        assert_eq!(pc.part(), 2);
    }

    #[test]
    fn octave_buckets() {
        assert_eq!(PitchClass::from_pitch(0).part(), 0);
        assert_eq!(PitchClass::from_pitch(47).part(), 0);
        assert_eq!(PitchClass::from_pitch(48).part(), 1);
        assert_eq!(PitchClass::from_pitch(71).part(), 2);
        assert_eq!(PitchClass::from_pitch(72).part(), 3);
        assert_eq!(PitchClass::from_pitch(84).part(), 3);
        assert_eq!(PitchClass::from_pitch(127).part(), 3);
    }
}
