use pulsebox_types::{PULSES_PER_STEP, STEPS_PER_BAR};

/// Pulses in one bar of 16th notes; the swing curve repeats at this period.
pub const PULSES_PER_BAR: u8 = PULSES_PER_STEP * STEPS_PER_BAR;

/// Count-down pulse timer driven by a fixed-rate periodic tick.
///
/// Intervals are tracked in 24.8 fixed point so integer rounding of the
/// per-pulse interval does not drift the tempo.
#[derive(Debug, Clone)]
pub struct PulseGenerator {
    running: bool,
    remaining: u32,
    fraction: u32,
    tick_index: u8,
}

impl PulseGenerator {
    pub fn new() -> Self {
        Self {
            running: false,
            remaining: 0,
            fraction: 0,
            tick_index: 0,
        }
    }

    /// (Re)start so the first pulse fires on the next timer tick.
    pub fn start(&mut self) {
        self.running = true;
        self.remaining = 1;
        self.fraction = 0;
        self.tick_index = PULSES_PER_BAR - 1;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Position of the most recent pulse inside the bar.
    pub fn tick_index(&self) -> u8 {
        self.tick_index
    }

    /// Index the next pulse will carry.
    pub fn next_tick_index(&self) -> u8 {
        (self.tick_index + 1) % PULSES_PER_BAR
    }

    /// Advance one timer tick. Returns true when a pulse is due; the caller
    /// must then [`reload`](Self::reload) the next interval.
    pub fn countdown(&mut self) -> bool {
        if !self.running {
            return false;
        }
        self.remaining = self.remaining.saturating_sub(1);
        self.remaining == 0
    }

    /// Load the interval (24.8 fixed point timer ticks) to the next pulse.
    pub fn reload(&mut self, interval_q8: u64) {
        let total = interval_q8 + self.fraction as u64;
        self.remaining = ((total >> 8) as u32).max(1);
        self.fraction = (total & 0xff) as u32;
        self.tick_index = self.next_tick_index();
    }
}

impl Default for PulseGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stopped_generator_never_fires() {
        let mut gen = PulseGenerator::new();
        for _ in 0..100 {
            assert!(!gen.countdown());
        }
    }

    #[test]
    fn start_fires_on_next_tick() {
        let mut gen = PulseGenerator::new();
        gen.start();
        assert!(gen.countdown());
        gen.reload(3 << 8);
        assert_eq!(gen.tick_index(), 0);
        assert!(!gen.countdown());
        assert!(!gen.countdown());
        assert!(gen.countdown());
    }

    #[test]
    fn fractional_intervals_do_not_drift() {
        let mut gen = PulseGenerator::new();
        gen.start();
        let mut ticks = 0u32;
        let mut pulses = 0u32;
        // 2.5 timer ticks per pulse
        let interval = (5 << 8) / 2;
        while pulses < 100 {
            ticks += 1;
            if gen.countdown() {
                pulses += 1;
                gen.reload(interval);
            }
        }
        // First pulse fires on tick 1, then 99 intervals of 2.5 ticks.
        assert_eq!(ticks, 1 + 247);
    }

    #[test]
    fn tick_index_wraps_at_bar() {
        let mut gen = PulseGenerator::new();
        gen.start();
        for expected in 0..(PULSES_PER_BAR as u32 * 2) {
            assert!(gen.countdown());
            gen.reload(1 << 8);
            assert_eq!(gen.tick_index() as u32, expected % PULSES_PER_BAR as u32);
        }
    }
}
