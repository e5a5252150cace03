//! Scheduler event field extractors.
//!
//! These operate on a [`TokenizedEvent`] whose argument count already
//! satisfies the kind's [`EventKind::args_ok`](crate::event::EventKind)
//! gate. Field positions are anchored either to the start of the argument
//! list, to its end, or to the switch divider, because the task names in
//! the middle are free text of variable token length.
//!
//! Malformed content degrades to [`ABSURD_INT`] / [`ABSURD_UNSIGNED`] for
//! numbers and to the pool placeholder for names; no extractor here fails
//! the stream.

use crate::event::TokenizedEvent;
use crate::intern::{InternedName, NamePool};
use crate::params::{
    int_after_char, is_arrow, is_param_inside_braces, merge_args, param_inside_braces,
    uint_after_char, NameBuf,
};
use crate::taskstate::{self, TaskState, TASK_STATE_PARSER_ERROR};
use crate::{ABSURD_INT, ABSURD_UNSIGNED, TASKNAME_MAXLEN};

const SWITCH_PPID_PFIX: &str = "prev_pid=";
const SWITCH_PPRI_PFIX: &str = "prev_prio=";
const SWITCH_PSTA_PFIX: &str = "prev_state=";
const SWITCH_NCOM_PFIX: &str = "next_comm=";

const WAKE_SUCC_PFIX: &str = "success=";
const WAKE_PID_PFIX: &str = "pid=";
const WAKE_PRIO_PFIX: &str = "prio=";

const FORK_CCOM_PFIX: &str = "child_comm=";
const FORK_PID_PFIX: &str = "pid=";

/// Per-switch-event parse context: where the divider sits and which of the
/// two layouts the event uses. Produced once by [`switch_parse`], consumed
/// by the other switch extractors for the same event, never held across
/// events.
#[derive(Debug, Clone, Copy)]
pub struct SwitchHandle {
    pub index: usize,
    pub is_distro_style: bool,
}

/// Typed fields of a scheduler-switch event.
#[derive(Debug, Clone)]
pub struct SwitchFields {
    pub old_pid: i32,
    pub old_prio: u32,
    pub old_state: TaskState,
    pub old_name: InternedName,
    pub new_pid: i32,
    pub new_prio: u32,
    pub new_name: InternedName,
}

/// Typed fields of a wakeup, waking or wakeup-new event.
#[derive(Debug, Clone)]
pub struct WakeupFields {
    pub pid: i32,
    pub prio: u32,
    pub cpu: u32,
    pub success: bool,
    pub name: InternedName,
}

/// Typed fields of a migrate-task event.
#[derive(Debug, Clone)]
pub struct MigrateFields {
    pub pid: i32,
    pub prio: u32,
    pub orig_cpu: u32,
    pub dest_cpu: u32,
}

/// Typed fields of a process-fork event.
#[derive(Debug, Clone)]
pub struct ForkFields {
    pub parent_pid: i32,
    pub child_pid: i32,
    pub child_name: InternedName,
}

/// Find the `==>` divider of a switch event and detect the layout.
///
/// A bare `==>` token is not uniquely identifying: a task name is free text
/// and can itself contain ` ==> `. A candidate divider only counts when the
/// surrounding tokens confirm one of the two layouts:
///
/// - mainline: the three tokens before it carry the `prev_pid=`,
///   `prev_prio=`, `prev_state=` prefixes and the token after it carries
///   `next_comm=`;
/// - distro: the priority parameters, two before the divider and last on
///   the line, keep their `[]` brackets.
///
/// A candidate satisfying neither check is treated as name text and the
/// scan continues. Returns `None` when no candidate validates before
/// `argc - 2`, which also covers the divider-less minimum-argc case.
pub fn switch_parse(event: &TokenizedEvent<'_>) -> Option<SwitchHandle> {
    let argc = event.argc();
    for i in 3..argc.saturating_sub(2) {
        if !is_arrow(event.arg(i)) {
            continue;
        }
        if event.arg(i - 3).starts_with(SWITCH_PPID_PFIX)
            && event.arg(i - 2).starts_with(SWITCH_PPRI_PFIX)
            && event.arg(i - 1).starts_with(SWITCH_PSTA_PFIX)
            && event.arg(i + 1).starts_with(SWITCH_NCOM_PFIX)
        {
            return Some(SwitchHandle {
                index: i,
                is_distro_style: false,
            });
        }
        if is_param_inside_braces(event.arg(i - 2)) && is_param_inside_braces(event.arg(argc - 1)) {
            return Some(SwitchHandle {
                index: i,
                is_distro_style: true,
            });
        }
        // Neither layout matched here: a '==>' embedded in a task name, or
        // an unknown format. Keep scanning.
    }
    None
}

/// Decode the state of the task leaving the CPU.
///
/// Mainline carries `prev_state=<code>` just before the divider; the scan
/// for `=` runs backward because the code itself never contains one but the
/// key might look odd in older kernels. Distro carries the bare one-letter
/// code.
pub fn switch_state(event: &TokenizedEvent<'_>, handle: &SwitchHandle) -> TaskState {
    let state_arg = event.arg(handle.index - 1);
    if state_arg.len() > 2 {
        let bytes = state_arg.as_bytes();
        for j in (1..state_arg.len() - 1).rev() {
            if bytes[j] == b'=' {
                return taskstate::from_str(&state_arg[j + 1..]);
            }
        }
    } else if state_arg.len() == 1 {
        return taskstate::from_str(state_arg);
    }
    TASK_STATE_PARSER_ERROR
}

pub fn switch_old_pid(event: &TokenizedEvent<'_>, handle: &SwitchHandle) -> i32 {
    let sep = if handle.is_distro_style { ':' } else { '=' };
    int_after_char(event.arg(handle.index - 3), sep)
}

pub fn switch_new_pid(event: &TokenizedEvent<'_>, handle: &SwitchHandle) -> i32 {
    let sep = if handle.is_distro_style { ':' } else { '=' };
    int_after_char(event.arg(event.argc() - 2), sep)
}

pub fn switch_old_prio(event: &TokenizedEvent<'_>, handle: &SwitchHandle) -> u32 {
    let i = handle.index;
    // A divider this early leaves no room for an old-task side.
    if i < 3 {
        return ABSURD_UNSIGNED;
    }
    if handle.is_distro_style {
        param_inside_braces(event.arg(i - 2))
    } else {
        uint_after_char(event.arg(i - 2), '=')
    }
}

pub fn switch_new_prio(event: &TokenizedEvent<'_>, handle: &SwitchHandle) -> u32 {
    if handle.is_distro_style {
        param_inside_braces(event.arg(event.argc() - 1))
    } else {
        uint_after_char(event.arg(event.argc() - 1), '=')
    }
}

/// Reconstruct the name of the task entering the CPU.
///
/// Mainline: peel the remainder of `next_comm=...`, then merge the whole
/// tokens up to `next_pid=`. Distro: merge the whole tokens after the
/// divider, then peel the part of the colon token before its `:`. Either
/// way the name is interned; overflow or a missing separator yields the
/// placeholder.
pub fn switch_new_name(
    event: &TokenizedEvent<'_>,
    pool: &NamePool,
    handle: &SwitchHandle,
) -> InternedName {
    let argc = event.argc();
    let i = handle.index;
    let mut buf = NameBuf::new(TASKNAME_MAXLEN);
    let ok = if !handle.is_distro_style {
        buf.push_after_char(event.arg(i + 1), '=') && merge_args(event, i + 2, argc - 2, &mut buf)
    } else {
        merge_args(event, i + 1, argc - 2, &mut buf)
            && buf.push_before_char(event.arg(argc - 2), ':')
    };
    if !ok {
        return pool.placeholder();
    }
    pool.intern(buf.as_str()).unwrap_or_else(|| pool.placeholder())
}

/// Reconstruct the name of the task leaving the CPU. Counterpart of
/// [`switch_new_name`] anchored to the front of the argument list.
pub fn switch_old_name(
    event: &TokenizedEvent<'_>,
    pool: &NamePool,
    handle: &SwitchHandle,
) -> InternedName {
    let i = handle.index;
    let mut buf = NameBuf::new(TASKNAME_MAXLEN);
    let ok = if !handle.is_distro_style {
        buf.push_after_char(event.arg(0), '=') && merge_args(event, 1, i - 3, &mut buf)
    } else {
        merge_args(event, 0, i - 3, &mut buf) && buf.push_before_char(event.arg(i - 3), ':')
    };
    if !ok {
        return pool.placeholder();
    }
    pool.intern(buf.as_str()).unwrap_or_else(|| pool.placeholder())
}

/// The target CPU is the last argument in every wakeup layout.
pub fn wakeup_cpu(event: &TokenizedEvent<'_>) -> u32 {
    uint_after_char(event.arg(event.argc() - 1), '=')
}

/// Old-layout wakeups carry `success=<flag>` before the target CPU; newer
/// kernels dropped the field, in which case the wakeup succeeded.
pub fn wakeup_success(event: &TokenizedEvent<'_>) -> bool {
    let ss = event.arg(event.argc() - 2);
    if !ss.starts_with(WAKE_SUCC_PFIX) {
        return true;
    }
    ss.ends_with('1')
}

pub fn wakeup_prio(event: &TokenizedEvent<'_>) -> u32 {
    let argc = event.argc();
    // New layout: prio is second from the end.
    if event.arg(argc - 2).starts_with(WAKE_PRIO_PFIX) {
        return uint_after_char(event.arg(argc - 2), '=');
    }
    // Old layout: success= sits in between.
    uint_after_char(event.arg(argc - 3), '=')
}

pub fn wakeup_pid(event: &TokenizedEvent<'_>) -> i32 {
    let argc = event.argc();
    // New layout: pid is third from the end.
    if event.arg(argc - 3).starts_with(WAKE_PID_PFIX) {
        return int_after_char(event.arg(argc - 3), '=');
    }
    if is_param_inside_braces(event.arg(argc - 3)) {
        // Distro layout: the pid trails the comm after a colon.
        return int_after_char(event.arg(argc - 4), ':');
    }
    // Old layout.
    int_after_char(event.arg(argc - 4), '=')
}

/// Reconstruct the woken task's name.
///
/// The name is bounded by the first adjacent `pid=`/`prio=` token pair;
/// when no such pair exists the event is assumed to use the distro
/// comm-colon-pid layout and the name runs up to the colon token.
pub fn wakeup_name(event: &TokenizedEvent<'_>, pool: &NamePool) -> InternedName {
    let argc = event.argc();
    let pair = (1..argc - 1).find(|&i| {
        event.arg(i).starts_with(WAKE_PID_PFIX) && event.arg(i + 1).starts_with(WAKE_PRIO_PFIX)
    });
    let mut buf = NameBuf::new(TASKNAME_MAXLEN);
    let ok = match pair {
        Some(i) => buf.push_after_char(event.arg(0), '=') && merge_args(event, 1, i, &mut buf),
        None => {
            merge_args(event, 0, argc - 4, &mut buf)
                && buf.push_before_char(event.arg(argc - 4), ':')
        }
    };
    if !ok {
        return pool.placeholder();
    }
    pool.intern(buf.as_str()).unwrap_or_else(|| pool.placeholder())
}

// The migrate fields are anchored to the end of the argument list because a
// variable-length comm precedes them.

pub fn migrate_dest_cpu(event: &TokenizedEvent<'_>) -> u32 {
    uint_after_char(event.arg(event.argc() - 1), '=')
}

pub fn migrate_orig_cpu(event: &TokenizedEvent<'_>) -> u32 {
    uint_after_char(event.arg(event.argc() - 2), '=')
}

pub fn migrate_prio(event: &TokenizedEvent<'_>) -> u32 {
    uint_after_char(event.arg(event.argc() - 3), '=')
}

pub fn migrate_pid(event: &TokenizedEvent<'_>) -> i32 {
    int_after_char(event.arg(event.argc() - 4), '=')
}

/// The child pid is the last argument of a fork event.
pub fn fork_child_pid(event: &TokenizedEvent<'_>) -> i32 {
    int_after_char(event.arg(event.argc() - 1), '=')
}

/// The parent pid is the `pid=` token directly before `child_comm=`; the
/// backward scan skips over any `pid=`-looking text inside the child name.
pub fn fork_parent_pid(event: &TokenizedEvent<'_>) -> i32 {
    let argc = event.argc();
    let found = (1..=argc - 2).rev().find(|&i| {
        event.arg(i).starts_with(FORK_CCOM_PFIX) && event.arg(i - 1).starts_with(FORK_PID_PFIX)
    });
    match found {
        Some(i) if i >= 2 => int_after_char(event.arg(i - 1), '='),
        _ => ABSURD_INT,
    }
}

/// Reconstruct the child task's name from `child_comm=` up to the trailing
/// `child_pid=` argument.
pub fn fork_child_name(event: &TokenizedEvent<'_>, pool: &NamePool) -> InternedName {
    let argc = event.argc();
    let found = (2..=argc - 2).find(|&i| {
        event.arg(i - 1).starts_with(FORK_PID_PFIX) && event.arg(i).starts_with(FORK_CCOM_PFIX)
    });
    let Some(i) = found else {
        return pool.placeholder();
    };
    let mut buf = NameBuf::new(TASKNAME_MAXLEN);
    let ok = buf.push_after_char(event.arg(i), '=') && merge_args(event, i + 1, argc - 1, &mut buf);
    if !ok {
        return pool.placeholder();
    }
    pool.intern(buf.as_str()).unwrap_or_else(|| pool.placeholder())
}

/// The exiting pid sits second from the end, after the variable-length comm.
pub fn exit_pid(event: &TokenizedEvent<'_>) -> i32 {
    int_after_char(event.arg(event.argc() - 2), '=')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taskstate::{
        TASK_FLAG_PREEMPT, TASK_INTERRUPTIBLE, TASK_RUNNING,
    };
    use std::sync::Arc;

    fn ev<'a>(tokens: &[&'a str]) -> TokenizedEvent<'a> {
        TokenizedEvent::new(tokens.to_vec())
    }

    #[test]
    fn test_switch_mainline_minimal() {
        let pool = NamePool::new();
        let event = ev(&[
            "prev_pid=100",
            "prev_prio=120",
            "prev_state=S",
            "==>",
            "next_comm=bash",
            "next_pid=200",
            "next_prio=120",
        ]);
        let handle = switch_parse(&event).unwrap();
        assert_eq!(handle.index, 3);
        assert!(!handle.is_distro_style);
        assert_eq!(switch_old_pid(&event, &handle), 100);
        assert_eq!(switch_old_prio(&event, &handle), 120);
        assert_eq!(switch_state(&event, &handle), TASK_INTERRUPTIBLE);
        assert_eq!(switch_new_pid(&event, &handle), 200);
        assert_eq!(switch_new_prio(&event, &handle), 120);
        assert_eq!(&*switch_new_name(&event, &pool, &handle), "bash");
    }

    #[test]
    fn test_switch_mainline_with_comm() {
        let pool = NamePool::new();
        let event = ev(&[
            "prev_comm=Xorg",
            "prev_pid=829",
            "prev_prio=120",
            "prev_state=S",
            "==>",
            "next_comm=spotify",
            "next_pid=9288",
            "next_prio=120",
        ]);
        let handle = switch_parse(&event).unwrap();
        assert_eq!(handle.index, 4);
        assert_eq!(switch_old_pid(&event, &handle), 829);
        assert_eq!(&*switch_old_name(&event, &pool, &handle), "Xorg");
        assert_eq!(&*switch_new_name(&event, &pool, &handle), "spotify");
    }

    #[test]
    fn test_switch_distro() {
        let pool = NamePool::new();
        let event = ev(&[
            "firefox:100",
            "[120]",
            "S",
            "==>",
            "kworker:200",
            "[115]",
        ]);
        let handle = switch_parse(&event).unwrap();
        assert_eq!(handle.index, 3);
        assert!(handle.is_distro_style);
        assert_eq!(switch_old_pid(&event, &handle), 100);
        assert_eq!(switch_old_prio(&event, &handle), 120);
        assert_eq!(switch_state(&event, &handle), TASK_INTERRUPTIBLE);
        assert_eq!(switch_new_pid(&event, &handle), 200);
        assert_eq!(switch_new_prio(&event, &handle), 115);
        assert_eq!(&*switch_old_name(&event, &pool, &handle), "firefox");
        assert_eq!(&*switch_new_name(&event, &pool, &handle), "kworker");
    }

    #[test]
    fn test_switch_multi_token_names_mainline() {
        let pool = NamePool::new();
        let event = ev(&[
            "prev_comm=Web",
            "Content",
            "prev_pid=1",
            "prev_prio=120",
            "prev_state=R+",
            "==>",
            "next_comm=Media",
            "Play",
            "back",
            "next_pid=2",
            "next_prio=110",
        ]);
        let handle = switch_parse(&event).unwrap();
        assert_eq!(handle.index, 5);
        assert_eq!(
            switch_state(&event, &handle),
            TASK_RUNNING | TASK_FLAG_PREEMPT
        );
        assert_eq!(&*switch_old_name(&event, &pool, &handle), "Web Content");
        assert_eq!(&*switch_new_name(&event, &pool, &handle), "Media Play back");
        assert_eq!(switch_new_pid(&event, &handle), 2);
    }

    #[test]
    fn test_switch_multi_token_names_distro() {
        let pool = NamePool::new();
        let event = ev(&[
            "Web",
            "Content:100",
            "[120]",
            "R",
            "==>",
            "My",
            "Task:200",
            "[115]",
        ]);
        let handle = switch_parse(&event).unwrap();
        assert!(handle.is_distro_style);
        assert_eq!(switch_old_pid(&event, &handle), 100);
        assert_eq!(&*switch_old_name(&event, &pool, &handle), "Web Content");
        assert_eq!(&*switch_new_name(&event, &pool, &handle), "My Task");
        assert_eq!(switch_new_pid(&event, &handle), 200);
    }

    #[test]
    fn test_switch_arrow_inside_task_name() {
        let pool = NamePool::new();
        // The previous task is named "a b c ==> d"; the embedded arrow is a
        // scan candidate but satisfies neither layout check, so the scan
        // must move on to the true divider.
        let event = ev(&[
            "prev_comm=a",
            "b",
            "c",
            "==>",
            "d",
            "prev_pid=100",
            "prev_prio=120",
            "prev_state=S",
            "==>",
            "next_comm=bash",
            "next_pid=200",
            "next_prio=120",
        ]);
        let handle = switch_parse(&event).unwrap();
        assert_eq!(handle.index, 8);
        assert!(!handle.is_distro_style);
        assert_eq!(&*switch_old_name(&event, &pool, &handle), "a b c ==> d");
        assert_eq!(switch_old_pid(&event, &handle), 100);
        assert_eq!(&*switch_new_name(&event, &pool, &handle), "bash");
    }

    #[test]
    fn test_switch_no_divider() {
        let event = ev(&["a", "b", "c", "d", "e", "f", "g"]);
        assert!(switch_parse(&event).is_none());
    }

    #[test]
    fn test_switch_name_overflow_yields_placeholder() {
        let pool = NamePool::new();
        let long = format!("next_comm={}", "x".repeat(TASKNAME_MAXLEN + 8));
        let event = ev(&[
            "prev_pid=1",
            "prev_prio=1",
            "prev_state=S",
            "==>",
            &long,
            "next_pid=2",
            "next_prio=3",
        ]);
        let handle = switch_parse(&event).unwrap();
        let name = switch_new_name(&event, &pool, &handle);
        assert!(Arc::ptr_eq(&name, &pool.placeholder()));
    }

    #[test]
    fn test_wakeup_old_layout() {
        let pool = NamePool::new();
        let event = ev(&[
            "comm=spotify",
            "pid=9288",
            "prio=120",
            "success=1",
            "target_cpu=003",
        ]);
        assert_eq!(wakeup_pid(&event), 9288);
        assert_eq!(wakeup_prio(&event), 120);
        assert!(wakeup_success(&event));
        assert_eq!(wakeup_cpu(&event), 3);
        assert_eq!(&*wakeup_name(&event, &pool), "spotify");
    }

    #[test]
    fn test_wakeup_failed_wakeup() {
        let event = ev(&[
            "comm=spotify",
            "pid=9288",
            "prio=120",
            "success=0",
            "target_cpu=003",
        ]);
        assert!(!wakeup_success(&event));
    }

    #[test]
    fn test_wakeup_new_layout_defaults_success() {
        let pool = NamePool::new();
        let event = ev(&["comm=spotify", "pid=9288", "prio=120", "target_cpu=003"]);
        assert!(wakeup_success(&event));
        assert_eq!(wakeup_pid(&event), 9288);
        assert_eq!(wakeup_prio(&event), 120);
        assert_eq!(&*wakeup_name(&event, &pool), "spotify");
    }

    #[test]
    fn test_wakeup_distro_layout() {
        let pool = NamePool::new();
        let event = ev(&["spotify:9288", "[120]", "success=1", "target_cpu=003"]);
        assert_eq!(wakeup_pid(&event), 9288);
        assert_eq!(&*wakeup_name(&event, &pool), "spotify");
        // The bracketed priority has no '=' to scan after; the field
        // degrades to the sentinel, the event is still usable.
        assert_eq!(wakeup_prio(&event), ABSURD_UNSIGNED);
    }

    #[test]
    fn test_wakeup_multi_token_name() {
        let pool = NamePool::new();
        let event = ev(&[
            "comm=Web",
            "Content",
            "pid=41",
            "prio=110",
            "target_cpu=001",
        ]);
        assert_eq!(&*wakeup_name(&event, &pool), "Web Content");
        assert_eq!(wakeup_pid(&event), 41);
    }

    #[test]
    fn test_migrate_fields_anchor_to_end() {
        let event = ev(&[
            "comm=kworker/0:1",
            "pid=1733",
            "prio=120",
            "orig_cpu=0",
            "dest_cpu=3",
        ]);
        assert_eq!(migrate_pid(&event), 1733);
        assert_eq!(migrate_prio(&event), 120);
        assert_eq!(migrate_orig_cpu(&event), 0);
        assert_eq!(migrate_dest_cpu(&event), 3);
    }

    #[test]
    fn test_fork_fields() {
        let pool = NamePool::new();
        let event = ev(&["comm=bash", "pid=50", "child_comm=worker", "child_pid=51"]);
        assert_eq!(fork_parent_pid(&event), 50);
        assert_eq!(fork_child_pid(&event), 51);
        assert_eq!(&*fork_child_name(&event, &pool), "worker");
    }

    #[test]
    fn test_fork_multi_token_child_name() {
        let pool = NamePool::new();
        let event = ev(&[
            "comm=bash",
            "pid=50",
            "child_comm=my",
            "task",
            "child_pid=51",
        ]);
        assert_eq!(fork_parent_pid(&event), 50);
        assert_eq!(&*fork_child_name(&event, &pool), "my task");
    }

    #[test]
    fn test_fork_without_marker_pair() {
        let pool = NamePool::new();
        let event = ev(&["comm=bash", "x", "y", "child_pid=51"]);
        assert_eq!(fork_parent_pid(&event), ABSURD_INT);
        assert!(Arc::ptr_eq(
            &fork_child_name(&event, &pool),
            &pool.placeholder()
        ));
    }

    #[test]
    fn test_exit_pid() {
        let event = ev(&["comm=sleep", "pid=4629", "prio=120"]);
        assert_eq!(exit_pid(&event), 4629);
    }
}
