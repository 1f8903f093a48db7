//! Apps the host can run.

pub mod clock_source;
pub mod drum_pattern;

pub use clock_source::ClockSourceApp;
pub use drum_pattern::PatternSequencer;
