//! Token-scanning helpers shared by the event field extractors.
//!
//! Trace argument tokens are `key=value` pairs, bracketed parameters like
//! `[120]`, or free-text fragments of a task name. The helpers here recover
//! the value part without assuming the key part is well formed, since task
//! names are free text and can contain `=`, `:` or bracket lookalikes.

use crate::event::TokenizedEvent;
use crate::{ABSURD_INT, ABSURD_UNSIGNED};

/// The literal divider between the previous-task and next-task fields of a
/// scheduler-switch event.
pub(crate) const ARROW: &str = "==>";

pub(crate) fn is_arrow(token: &str) -> bool {
    token == ARROW
}

/// The substring after the last occurrence of `ch`, or `None` when the
/// token does not contain it.
pub(crate) fn substr_after_char(token: &str, ch: char) -> Option<&str> {
    token.rfind(ch).map(|pos| &token[pos + ch.len_utf8()..])
}

/// The substring before the last occurrence of `ch`.
pub(crate) fn substr_before_char(token: &str, ch: char) -> Option<&str> {
    token.rfind(ch).map(|pos| &token[..pos])
}

/// Parse the unsigned value after the last `ch` in the token.
pub(crate) fn uint_after_char(token: &str, ch: char) -> u32 {
    substr_after_char(token, ch)
        .and_then(|s| s.parse().ok())
        .unwrap_or(ABSURD_UNSIGNED)
}

/// Parse the signed value after the last `ch` in the token.
pub(crate) fn int_after_char(token: &str, ch: char) -> i32 {
    substr_after_char(token, ch)
        .and_then(|s| s.parse().ok())
        .unwrap_or(ABSURD_INT)
}

/// Whether the whole token is a bracketed parameter such as `[120]`.
pub(crate) fn is_param_inside_braces(token: &str) -> bool {
    token.len() >= 2 && token.starts_with('[') && token.ends_with(']')
}

/// Parse the unsigned value wrapped in brackets, e.g. `[120]` -> 120.
pub(crate) fn param_inside_braces(token: &str) -> u32 {
    if !is_param_inside_braces(token) {
        return ABSURD_UNSIGNED;
    }
    token[1..token.len() - 1].parse().unwrap_or(ABSURD_UNSIGNED)
}

/// Bounded buffer for reassembling task names that span several tokens.
///
/// An append either succeeds completely or fails and leaves the buffer
/// untouched; the buffer never holds a truncated name.
pub(crate) struct NameBuf {
    buf: String,
    max: usize,
}

impl NameBuf {
    pub(crate) fn new(max: usize) -> Self {
        Self {
            buf: String::new(),
            max,
        }
    }

    /// Append a name fragment, restoring the space separator that the
    /// tokenizer consumed when the buffer already holds earlier fragments.
    /// Returns false when the bound would be exceeded.
    pub(crate) fn push_fragment(&mut self, fragment: &str) -> bool {
        let sep = usize::from(!self.buf.is_empty());
        if self.buf.len() + sep + fragment.len() > self.max {
            return false;
        }
        if sep == 1 {
            self.buf.push(' ');
        }
        self.buf.push_str(fragment);
        true
    }

    /// Append the part of a boundary token after its last `ch`. Fails when
    /// the token has no such separator.
    pub(crate) fn push_after_char(&mut self, token: &str, ch: char) -> bool {
        match substr_after_char(token, ch) {
            Some(s) => self.push_fragment(s),
            None => false,
        }
    }

    /// Append the part of a boundary token before its last `ch`.
    pub(crate) fn push_before_char(&mut self, token: &str, ch: char) -> bool {
        match substr_before_char(token, ch) {
            Some(s) => self.push_fragment(s),
            None => false,
        }
    }

    pub(crate) fn as_str(&self) -> &str {
        &self.buf
    }
}

/// Merge the whole tokens `argv[begin..end)` into the buffer. Empty ranges
/// are a no-op, which the callers rely on for single-token names.
pub(crate) fn merge_args(
    event: &TokenizedEvent<'_>,
    begin: usize,
    end: usize,
    buf: &mut NameBuf,
) -> bool {
    for i in begin..end.min(event.argc()) {
        if !buf.push_fragment(event.arg(i)) {
            return false;
        }
    }
    true
}
