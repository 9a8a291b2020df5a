//! Derived dashboard views over a user's tracked applications.
//!
//! Everything here is pure: inputs are borrowed, outputs are owned, and the
//! clock is a parameter so the same snapshot always aggregates the same way.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use crate::models::TrackedApplication;
use crate::workflow::{ScholarshipStatus, Stage};

const MS_PER_DAY: i64 = 86_400_000;

/// Deadlines at most this many days out count as upcoming.
const UPCOMING_WINDOW_DAYS: i64 = 30;

/// Whole days until `deadline`, rounded up from milliseconds. Exactly 0
/// means due today; negative means the deadline has passed.
pub fn days_until(deadline: NaiveDate, now: DateTime<Utc>) -> i64 {
    let deadline_utc = deadline.and_time(NaiveTime::MIN).and_utc();
    let ms = (deadline_utc - now).num_milliseconds();
    ms.div_euclid(MS_PER_DAY) + i64::from(ms.rem_euclid(MS_PER_DAY) > 0)
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatusCount<S: Stage> {
    pub status: S,
    pub count: usize,
}

/// An application paired with its deadline distance at aggregation time.
/// `days_left` is negative for overdue entries.
#[derive(Debug, Clone, PartialEq)]
pub struct DeadlineEntry<S: Stage> {
    pub application: TrackedApplication<S>,
    pub days_left: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard<S: Stage> {
    /// One entry per status variant, zero-filled, in workflow order.
    pub summary: Vec<StatusCount<S>>,
    /// Due today or within the next 30 days, soonest first.
    pub upcoming_deadlines: Vec<DeadlineEntry<S>>,
    /// Past deadline and not yet in a terminal status, most overdue first.
    pub overdue: Vec<DeadlineEntry<S>>,
}

pub fn build_dashboard<S: Stage>(
    apps: &[TrackedApplication<S>],
    now: DateTime<Utc>,
) -> Dashboard<S> {
    let summary = S::ALL
        .iter()
        .map(|&status| StatusCount {
            status,
            count: apps.iter().filter(|a| a.status == status).count(),
        })
        .collect();

    let mut upcoming_deadlines = Vec::new();
    let mut overdue = Vec::new();
    for app in apps {
        let Some(deadline) = app.deadline else {
            continue;
        };
        let days_left = days_until(deadline, now);
        if days_left < 0 {
            if !app.status.is_terminal() {
                overdue.push(DeadlineEntry {
                    application: app.clone(),
                    days_left,
                });
            }
        } else if days_left <= UPCOMING_WINDOW_DAYS {
            upcoming_deadlines.push(DeadlineEntry {
                application: app.clone(),
                days_left,
            });
        }
    }

    upcoming_deadlines.sort_by(|a, b| {
        (a.application.deadline, a.application.id).cmp(&(b.application.deadline, b.application.id))
    });
    overdue.sort_by(|a, b| (a.days_left, a.application.id).cmp(&(b.days_left, b.application.id)));

    Dashboard {
        summary,
        upcoming_deadlines,
        overdue,
    }
}

/// Total award money still in play: every application not rejected or
/// written off contributes its exact amount, or failing that its published
/// maximum. Applications without a published amount are skipped, not
/// counted as zero.
pub fn total_potential_value(apps: &[TrackedApplication<ScholarshipStatus>]) -> f64 {
    apps.iter()
        .filter(|a| !a.status.is_written_off())
        .filter_map(|a| a.potential_amount())
        .sum()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Deadline,
    Amount,
    Status,
}

/// `None` keeps everything, mirroring the UI's "all" filter option.
pub fn filter_by_status<S: Stage>(
    apps: &[TrackedApplication<S>],
    status: Option<S>,
) -> Vec<TrackedApplication<S>> {
    apps.iter()
        .filter(|a| status.is_none_or(|s| a.status == s))
        .cloned()
        .collect()
}

/// Stable sort on the chosen key; applications missing the key sort last,
/// keeping their original relative order.
pub fn sort_by<S: Stage>(apps: &[TrackedApplication<S>], key: SortKey) -> Vec<TrackedApplication<S>> {
    let mut sorted: Vec<TrackedApplication<S>> = apps.to_vec();
    match key {
        SortKey::Deadline => {
            sorted.sort_by_key(|a| (a.deadline.is_none(), a.deadline));
        }
        SortKey::Amount => {
            sorted.sort_by(|a, b| match (a.potential_amount(), b.potential_amount()) {
                (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(std::cmp::Ordering::Equal),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            });
        }
        SortKey::Status => {
            sorted.sort_by_key(|a| a.status.rank());
        }
    }
    sorted
}
