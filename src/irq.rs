//! IRQ handler entry/exit field extractors.

use crate::errors::PARSE_ERROR_NAME;
use crate::event::TokenizedEvent;
use crate::params::{substr_after_char, uint_after_char};

pub fn entry_irq(event: &TokenizedEvent<'_>) -> u32 {
    uint_after_char(event.arg(0), '=')
}

/// The handler name, as a view into the line buffer. Not interned; handler
/// names come from a small fixed set owned by the kernel, not user space.
pub fn entry_name<'a>(event: &TokenizedEvent<'a>) -> &'a str {
    substr_after_char(event.arg(1), '=').unwrap_or(PARSE_ERROR_NAME)
}

pub fn exit_irq(event: &TokenizedEvent<'_>) -> u32 {
    uint_after_char(event.arg(0), '=')
}

/// Whether the handler reported the interrupt as handled.
pub fn exit_handled(event: &TokenizedEvent<'_>) -> bool {
    event.arg(1) == "ret=handled"
}

/// The raw return annotation after `ret=`, e.g. `handled` or `unhandled`.
pub fn exit_ret<'a>(event: &TokenizedEvent<'a>) -> &'a str {
    substr_after_char(event.arg(1), '=').unwrap_or(PARSE_ERROR_NAME)
}
