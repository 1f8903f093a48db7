mod common;

use common::*;
use pulsebox_core::apps::clock_source::{PARAM_BPM, PARAM_GROOVE_AMOUNT, PARAM_RUNNING};
use pulsebox_types::status;

/// Timer ticks between consecutive 0xF8 bytes over `ticks` timer ticks.
fn pulse_gaps(host: &mut ClockHost, ticks: u32) -> Vec<u32> {
    let mut gaps = Vec::new();
    let mut since = 0;
    for _ in 0..ticks {
        since += 1;
        host.on_timer_tick();
        let out = take_output(host);
        if out.contains(&status::CLOCK) {
            gaps.push(since);
            since = 0;
        }
    }
    gaps
}

#[test]
fn activation_is_silent_and_stopped() {
    let mut host = clock_host();
    assert!(take_output(&mut host).is_empty());
    assert_eq!(host.get_parameter(PARAM_RUNNING), 0);
    assert!(pulse_gaps(&mut host, 500).is_empty());
}

#[test]
fn start_and_stop_emit_exactly_one_byte_each() {
    let mut host = clock_host();
    host.set_parameter(PARAM_RUNNING, 1);
    host.set_parameter(PARAM_RUNNING, 1);
    host.on_midi_byte(status::START);
    host.on_midi_byte(status::CONTINUE);
    assert_eq!(take_output(&mut host), vec![status::START]);

    host.set_parameter(PARAM_RUNNING, 0);
    host.on_midi_byte(status::STOP);
    host.set_parameter(PARAM_RUNNING, 0);
    assert_eq!(take_output(&mut host), vec![status::STOP]);
}

#[test]
fn running_clock_paces_pulses_from_tempo() {
    let mut host = clock_host();
    host.set_parameter(PARAM_RUNNING, 1);
    take_output(&mut host);
    let gaps = pulse_gaps(&mut host, 1 + TICKS_PER_PULSE * 4);
    assert_eq!(gaps, vec![1, TICKS_PER_PULSE, TICKS_PER_PULSE, TICKS_PER_PULSE, TICKS_PER_PULSE]);
}

#[test]
fn stop_halts_pulses() {
    let mut host = clock_host();
    host.set_parameter(PARAM_RUNNING, 1);
    pulse_gaps(&mut host, 200);
    host.on_midi_byte(status::STOP);
    take_output(&mut host);
    assert!(pulse_gaps(&mut host, 500).is_empty());
}

#[test]
fn tempo_write_lands_on_next_pulse() {
    let mut host = clock_host();
    host.set_parameter(PARAM_RUNNING, 1);
    // First pulse, then half of the following 50-tick interval.
    assert_eq!(pulse_gaps(&mut host, 26), vec![1]);
    host.set_parameter(PARAM_BPM, 240);
    // The interval in flight keeps its length; the next one is halved.
    let gaps = pulse_gaps(&mut host, 25 + 25 + 25);
    assert_eq!(gaps, vec![25, 25, 25]);
}

#[test]
fn swing_keeps_the_bar_length() {
    let mut host = clock_host();
    host.set_parameter(PARAM_GROOVE_AMOUNT, 127);
    host.set_parameter(PARAM_RUNNING, 1);
    take_output(&mut host);
    // One pulse to align, then a full bar of 96 pulses.
    let gaps = pulse_gaps(&mut host, 1 + TICKS_PER_PULSE * 96);
    assert_eq!(gaps.len(), 97);
    assert!(gaps[1..7].iter().all(|&g| g > TICKS_PER_PULSE));
    assert!(gaps[7..13].iter().all(|&g| g < TICKS_PER_PULSE));
    assert_eq!(gaps[1..].iter().sum::<u32>(), TICKS_PER_PULSE * 96);
}

#[test]
fn relays_everything_but_incoming_realtime() {
    let mut host = clock_host();
    host.on_midi_bytes(&[status::CLOCK, 0x92, 60, 100, status::ACTIVE_SENSING, 0xf0, 0x01, 0xf7]);
    assert_eq!(take_output(&mut host), vec![0x92, 60, 100, 0xf0, 0x01, 0xf7]);
}

#[test]
fn clamped_tempo_reads_back() {
    let mut host = clock_host();
    host.set_parameter(PARAM_BPM, 0);
    assert_eq!(host.get_parameter(PARAM_BPM), 40);
    assert_eq!(host.clock().state().tempo_bpm, 40);
    assert_eq!(host.settings(), vec![0, 40, 0, 0]);
}
