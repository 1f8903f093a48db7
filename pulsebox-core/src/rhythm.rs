//! Rhythm lookups: the preset drum pattern table and Euclidean patterns.
//!
//! Every pattern is a 16-bit step mask, bit `i` set when the part sounds on
//! step `i`.

use pulsebox_types::sequencer::step_count;

/// Patterns per part in the preset table.
pub const PRESET_STRIDE: u8 = 12;

/// Parse a 16-step grid, `x` marking an onset.
const fn grid(steps: &str) -> u16 {
    let bytes = steps.as_bytes();
    let mut mask = 0u16;
    let mut i = 0;
    while i < bytes.len() && i < 16 {
        if bytes[i] == b'x' {
            mask |= 1 << i;
        }
        i += 1;
    }
    mask
}

/// Four slices of [`PRESET_STRIDE`] patterns, one slice per part.
pub const PRESET_PATTERNS: [u16; 48] = [
    // Kick
    grid("x...x...x...x..."),
    grid("x.........x....."),
    grid("x.....x...x....."),
    grid("x..x..x...x....."),
    grid("x.......x.x....."),
    grid("x..x....x..x...."),
    grid("x...x...x...x.x."),
    grid("x.x...x...x..x.."),
    grid("x......x..x....."),
    grid("x..x..x..x..x..."),
    grid("xx..x..xx..x.x.."),
    grid("x...x..x.x..x..."),
    // Snare
    grid("....x.......x..."),
    grid("....x.......x..x"),
    grid("....x..x....x..."),
    grid("....x.......x.x."),
    grid("..x...x...x...x."),
    grid("....x..x.x..x..."),
    grid("......x.......x."),
    grid("....x...x...x..."),
    grid("....x.x.....x..x"),
    grid(".x..x..x.x..x..."),
    grid("....x....x..x..."),
    grid("x.x.x.x.x.x.x.x."),
    // Closed hat
    grid("x.x.x.x.x.x.x.x."),
    grid("xxxxxxxxxxxxxxxx"),
    grid("..x...x...x...x."),
    grid("x.xxx.xxx.xxx.xx"),
    grid("x.x.x.x.x.x.x.xx"),
    grid("xx.xxx.xxx.xxx.x"),
    grid("x..x..x..x..x..."),
    grid("..xx..xx..xx..xx"),
    grid("x.x.xxx.x.x.xxx."),
    grid("x...x...x...x..."),
    grid("xx.x.xx.x.xx.x.x"),
    grid(".xx.xx.xxx.xx.x."),
    // Open hat / percussion
    grid("..x...x...x...x."),
    grid("......x.......x."),
    grid("..............x."),
    grid("...x.......x...."),
    grid("..x.....x.x....."),
    grid(".....x.....x..x."),
    grid("x.....x.....x..."),
    grid("..x..x..x..x..x."),
    grid("...x...x...x...x"),
    grid("......x...x...x."),
    grid(".x...x...x...x.."),
    grid("..xx......xx...."),
];

/// Preset pattern `selector` from the slice starting at `part_offset`.
///
/// Selectors wrap inside the slice, so any note value picks a pattern of the
/// requested part.
pub fn preset_pattern(selector: u8, part_offset: u8) -> u16 {
    let index = part_offset as usize + (selector % PRESET_STRIDE) as usize;
    PRESET_PATTERNS.get(index).copied().unwrap_or(0)
}

/// Euclidean distribution of `pulses` over the step count selected by
/// `steps_code`, rotation 0.
pub fn euclidean_pattern(pulses: u8, steps_code: u8) -> u16 {
    euclidean_rhythm(pulses, step_count(steps_code))
}

#[derive(Debug, Clone, Copy, Default)]
struct Group {
    bits: u16,
    len: u8,
}

impl Group {
    fn join(self, tail: Group) -> Group {
        Group {
            bits: self.bits | (tail.bits << self.len),
            len: self.len + tail.len,
        }
    }
}

/// Bjorklund's algorithm over at most 16 steps.
pub fn euclidean_rhythm(pulses: u8, steps: u8) -> u16 {
    let steps = steps.min(16);
    if steps == 0 {
        return 0;
    }
    let pulses = pulses.min(steps);
    if pulses == 0 {
        return 0;
    }
    if pulses == steps {
        return (((1u32 << steps) - 1) & 0xffff) as u16;
    }

    let mut pattern = [Group { bits: 1, len: 1 }; 16];
    let mut remainder = [Group { bits: 0, len: 1 }; 16];
    let mut pattern_len = pulses as usize;
    let mut remainder_len = (steps - pulses) as usize;

    while remainder_len > 1 {
        let paired = pattern_len.min(remainder_len);
        let mut joined = [Group::default(); 16];
        for i in 0..paired {
            joined[i] = pattern[i].join(remainder[i]);
        }

        let mut leftover = [Group::default(); 16];
        let leftover_len = if pattern_len > paired {
            leftover[..pattern_len - paired].copy_from_slice(&pattern[paired..pattern_len]);
            pattern_len - paired
        } else {
            leftover[..remainder_len - paired].copy_from_slice(&remainder[paired..remainder_len]);
            remainder_len - paired
        };

        pattern = joined;
        pattern_len = paired;
        remainder = leftover;
        remainder_len = leftover_len;
    }

    let mut result = Group::default();
    for group in pattern[..pattern_len].iter().chain(remainder[..remainder_len].iter()) {
        result = result.join(*group);
    }
    result.bits
}
