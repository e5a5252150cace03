//! cpu-frequency and cpu-idle field extractors. Both events are plain
//! fixed-position `key=value` pairs.

use crate::event::TokenizedEvent;
use crate::params::uint_after_char;

pub fn cpufreq_freq(event: &TokenizedEvent<'_>) -> u32 {
    uint_after_char(event.arg(0), '=')
}

pub fn cpufreq_cpu(event: &TokenizedEvent<'_>) -> u32 {
    uint_after_char(event.arg(1), '=')
}

/// The idle state is a signed value that the kernel serializes as
/// unsigned; reinterpreting the bits recovers the negative exit-from-idle
/// states.
pub fn cpuidle_state(event: &TokenizedEvent<'_>) -> i32 {
    uint_after_char(event.arg(0), '=') as i32
}

pub fn cpuidle_cpu(event: &TokenizedEvent<'_>) -> u32 {
    uint_after_char(event.arg(1), '=')
}
