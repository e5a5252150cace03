//! Tokenized events, per-kind argument preconditions, and the unified
//! extraction dispatch.

use crate::intern::NamePool;
use crate::sched::{self, ForkFields, MigrateFields, SwitchFields, WakeupFields};
use crate::{irq, power};

/// One trace event after tokenization: the ordered argument tokens of a
/// line, with the event-name prefix already stripped.
///
/// Tokens are borrowed views into the line buffer and must not be retained
/// past the current line's processing. Extraction interns anything it needs
/// to keep.
pub struct TokenizedEvent<'a> {
    argv: Vec<&'a str>,
}

impl<'a> TokenizedEvent<'a> {
    pub fn new(argv: Vec<&'a str>) -> Self {
        Self { argv }
    }

    /// Number of argument tokens.
    pub fn argc(&self) -> usize {
        self.argv.len()
    }

    /// The i-th argument token.
    ///
    /// Extractors index relative to `argc` under the per-kind
    /// [`EventKind::args_ok`] precondition; callers must check it first.
    pub fn arg(&self, i: usize) -> &'a str {
        self.argv[i]
    }

    pub fn args(&self) -> &[&'a str] {
        &self.argv
    }
}

/// The event kinds this engine extracts fields for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    CpuFrequency,
    CpuIdle,
    SchedSwitch,
    SchedWakeup,
    SchedWaking,
    SchedWakeupNew,
    SchedMigrateTask,
    SchedProcessFork,
    SchedProcessExit,
    IrqHandlerEntry,
    IrqHandlerExit,
}

impl EventKind {
    /// Minimum argument count required before this kind's extractors may
    /// run. Extractors assume the gate holds; it is the caller's contract,
    /// not a runtime check inside each extractor.
    pub fn min_argc(self) -> usize {
        match self {
            EventKind::CpuFrequency
            | EventKind::CpuIdle
            | EventKind::IrqHandlerEntry
            | EventKind::IrqHandlerExit => 2,
            EventKind::SchedProcessExit => 3,
            EventKind::SchedWakeup
            | EventKind::SchedWaking
            | EventKind::SchedWakeupNew
            | EventKind::SchedProcessFork => 4,
            EventKind::SchedMigrateTask => 5,
            EventKind::SchedSwitch => 6,
        }
    }

    pub fn args_ok(self, event: &TokenizedEvent<'_>) -> bool {
        event.argc() >= self.min_argc()
    }
}

/// Typed fields of one extracted event.
///
/// Numeric fields that could not be recovered hold the absurd sentinels,
/// name fields hold the pool placeholder. IRQ strings stay borrowed from
/// the line buffer; everything else is owned or interned.
#[derive(Debug, Clone)]
pub enum EventFields<'a> {
    CpuFrequency { cpu: u32, freq: u32 },
    CpuIdle { cpu: u32, state: i32 },
    Switch(SwitchFields),
    Wakeup(WakeupFields),
    Migrate(MigrateFields),
    Fork(ForkFields),
    Exit { pid: i32 },
    IrqEntry { irq: u32, name: &'a str },
    IrqExit { irq: u32, handled: bool, ret: &'a str },
}

/// Extract the typed fields for one event.
///
/// Returns `None` when the argument-count gate fails or, for switch events,
/// when no usable divider is found; individual malformed fields inside an
/// otherwise well-shaped event degrade to sentinels instead.
pub fn extract<'a>(
    kind: EventKind,
    event: &TokenizedEvent<'a>,
    pool: &NamePool,
) -> Option<EventFields<'a>> {
    if !kind.args_ok(event) {
        return None;
    }
    let fields = match kind {
        EventKind::CpuFrequency => EventFields::CpuFrequency {
            cpu: power::cpufreq_cpu(event),
            freq: power::cpufreq_freq(event),
        },
        EventKind::CpuIdle => EventFields::CpuIdle {
            cpu: power::cpuidle_cpu(event),
            state: power::cpuidle_state(event),
        },
        EventKind::SchedSwitch => {
            let handle = sched::switch_parse(event)?;
            EventFields::Switch(SwitchFields {
                old_pid: sched::switch_old_pid(event, &handle),
                old_prio: sched::switch_old_prio(event, &handle),
                old_state: sched::switch_state(event, &handle),
                old_name: sched::switch_old_name(event, pool, &handle),
                new_pid: sched::switch_new_pid(event, &handle),
                new_prio: sched::switch_new_prio(event, &handle),
                new_name: sched::switch_new_name(event, pool, &handle),
            })
        }
        // Waking and wakeup-new share the wakeup layouts across all the
        // kernel generations this engine supports.
        EventKind::SchedWakeup | EventKind::SchedWaking | EventKind::SchedWakeupNew => {
            EventFields::Wakeup(WakeupFields {
                pid: sched::wakeup_pid(event),
                prio: sched::wakeup_prio(event),
                cpu: sched::wakeup_cpu(event),
                success: sched::wakeup_success(event),
                name: sched::wakeup_name(event, pool),
            })
        }
        EventKind::SchedMigrateTask => EventFields::Migrate(MigrateFields {
            pid: sched::migrate_pid(event),
            prio: sched::migrate_prio(event),
            orig_cpu: sched::migrate_orig_cpu(event),
            dest_cpu: sched::migrate_dest_cpu(event),
        }),
        EventKind::SchedProcessFork => EventFields::Fork(ForkFields {
            parent_pid: sched::fork_parent_pid(event),
            child_pid: sched::fork_child_pid(event),
            child_name: sched::fork_child_name(event, pool),
        }),
        EventKind::SchedProcessExit => EventFields::Exit {
            pid: sched::exit_pid(event),
        },
        EventKind::IrqHandlerEntry => EventFields::IrqEntry {
            irq: irq::entry_irq(event),
            name: irq::entry_name(event),
        },
        EventKind::IrqHandlerExit => EventFields::IrqExit {
            irq: irq::exit_irq(event),
            handled: irq::exit_handled(event),
            ret: irq::exit_ret(event),
        },
    };
    Some(fields)
}
