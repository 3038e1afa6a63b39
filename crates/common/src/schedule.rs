//! Report timing: the five-step reminder ladder and the per-cycle
//! report decision.

use std::time::Duration;

const HOUR: u64 = 3600;
const DAY: u64 = 24 * HOUR;

/// Escalating delays between outage reminders.
///
/// The index is clamped at the last entry, so the fifth delay repeats
/// for as long as the outage lasts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderSchedule(pub [Duration; 5]);

impl Default for ReminderSchedule {
    fn default() -> Self {
        Self([
            Duration::from_secs(6 * HOUR),
            Duration::from_secs(DAY),
            Duration::from_secs(2 * DAY),
            Duration::from_secs(3 * DAY),
            Duration::from_secs(7 * DAY),
        ])
    }
}

impl ReminderSchedule {
    /// Build from five delays in seconds, as given on the command line.
    pub fn from_secs(delays: [u64; 5]) -> Self {
        Self(delays.map(Duration::from_secs))
    }

    /// Delay to wait before reminder number `counter`.
    pub fn delay(&self, counter: usize) -> Duration {
        self.0[counter.min(4)]
    }
}

/// What the scheduler decided for one cycle, before dispatch.
#[derive(Debug, Clone, Copy)]
pub struct ReportPlan {
    /// A report should be rendered and dispatched this cycle.
    pub report: bool,
    /// The report (if any) is due to the reminder ladder.
    pub remind: bool,
}

/// Decides when a cycle's bucket state warrants a notification and
/// tracks the reminder cadence across cycles.
#[derive(Debug)]
pub struct ReportScheduler {
    schedule: ReminderSchedule,
    last_report: u64,
    reminder_counter: usize,
}

impl ReportScheduler {
    pub fn new(schedule: ReminderSchedule) -> Self {
        Self {
            schedule,
            last_report: 0,
            reminder_counter: 0,
        }
    }

    /// Per-cycle decision. `cycle` 0 always reports (startup announcement).
    pub fn plan(&self, now: u64, cycle: u64, changed_any: bool, all_present: bool) -> ReportPlan {
        let remind = !all_present
            && now.saturating_sub(self.last_report) >= self.schedule.delay(self.reminder_counter).as_secs();
        ReportPlan {
            report: changed_any || cycle == 0 || remind,
            remind,
        }
    }

    /// Fold the dispatch result back in. Called once per cycle, strictly
    /// after dispatch (with `success = false` when nothing was sent).
    ///
    /// A report that only announced returned peers leaves the cadence
    /// alone: good news must not delay the next escalation while an
    /// outage remains. The counter only resets once every peer is back.
    pub fn record(
        &mut self,
        now: u64,
        success: bool,
        plan: ReportPlan,
        only_returns: bool,
        all_present: bool,
    ) {
        if only_returns {
            return;
        }
        if success {
            self.last_report = now;
        }
        if all_present {
            self.reminder_counter = 0;
        } else if plan.remind {
            self.reminder_counter = (self.reminder_counter + 1).min(4);
        }
    }

    pub fn reminder_counter(&self) -> usize {
        self.reminder_counter
    }

    pub fn last_report(&self) -> u64 {
        self.last_report
    }
}
