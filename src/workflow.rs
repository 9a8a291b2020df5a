//! Application status workflows for both tracked entity types.
//!
//! One `Stage` trait covers colleges and scholarships so the transition
//! rules live in a single adjacency table per type instead of duplicated
//! per-feature match arms. Lookups are pure and synchronous; the backend
//! remains the authority on what actually gets persisted.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Render-only color tag attached to each status. Not business-relevant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tint {
    Gray,
    Blue,
    Amber,
    Green,
    Red,
}

/// A forward transition offered to the user from some current status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Action<S: 'static> {
    pub label: &'static str,
    pub next: S,
}

/// Closed status enum for one tracked entity type.
pub trait Stage:
    Copy + Eq + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Every variant, in workflow order.
    const ALL: &'static [Self];

    /// Status assigned when a subject is first tracked.
    fn initial() -> Self;

    fn label(self) -> &'static str;

    fn tint(self) -> Tint;

    /// Wire name, matching the backend's snake_case representation.
    fn as_str(self) -> &'static str;

    fn parse(input: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|s| s.as_str() == input)
    }

    /// Legal next statuses from `self`, in the order the UI offers them.
    /// Empty for terminal statuses.
    fn actions(self) -> &'static [Action<Self>];

    fn is_terminal(self) -> bool {
        self.actions().is_empty()
    }

    /// Position within `ALL`, used as the sort rank for status ordering.
    fn rank(self) -> usize {
        Self::ALL.iter().position(|s| *s == self).unwrap_or(usize::MAX)
    }
}

/// Returns the transitions offered from `current`. Table lookup only.
pub fn available_actions<S: Stage>(current: S) -> &'static [Action<S>] {
    current.actions()
}

/// Checks that `requested` is one of the transitions offered from `current`.
pub fn validate_transition<S: Stage>(current: S, requested: S) -> Result<(), AppError> {
    if current.actions().iter().any(|a| a.next == requested) {
        Ok(())
    } else {
        Err(AppError::IllegalTransition(format!(
            "{} cannot move to {}",
            current.label(),
            requested.label()
        )))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollegeStatus {
    Researching,
    Planning,
    InProgress,
    Submitted,
    Accepted,
    Waitlisted,
    Rejected,
    Enrolled,
    Declined,
}

impl Stage for CollegeStatus {
    const ALL: &'static [Self] = &[
        CollegeStatus::Researching,
        CollegeStatus::Planning,
        CollegeStatus::InProgress,
        CollegeStatus::Submitted,
        CollegeStatus::Accepted,
        CollegeStatus::Waitlisted,
        CollegeStatus::Rejected,
        CollegeStatus::Enrolled,
        CollegeStatus::Declined,
    ];

    fn initial() -> Self {
        CollegeStatus::Researching
    }

    fn label(self) -> &'static str {
        match self {
            CollegeStatus::Researching => "Researching",
            CollegeStatus::Planning => "Planning",
            CollegeStatus::InProgress => "In Progress",
            CollegeStatus::Submitted => "Submitted",
            CollegeStatus::Accepted => "Accepted",
            CollegeStatus::Waitlisted => "Waitlisted",
            CollegeStatus::Rejected => "Rejected",
            CollegeStatus::Enrolled => "Enrolled",
            CollegeStatus::Declined => "Declined",
        }
    }

    fn tint(self) -> Tint {
        match self {
            CollegeStatus::Researching => Tint::Gray,
            CollegeStatus::Planning | CollegeStatus::InProgress => Tint::Blue,
            CollegeStatus::Submitted | CollegeStatus::Waitlisted => Tint::Amber,
            CollegeStatus::Accepted | CollegeStatus::Enrolled => Tint::Green,
            CollegeStatus::Rejected | CollegeStatus::Declined => Tint::Red,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            CollegeStatus::Researching => "researching",
            CollegeStatus::Planning => "planning",
            CollegeStatus::InProgress => "in_progress",
            CollegeStatus::Submitted => "submitted",
            CollegeStatus::Accepted => "accepted",
            CollegeStatus::Waitlisted => "waitlisted",
            CollegeStatus::Rejected => "rejected",
            CollegeStatus::Enrolled => "enrolled",
            CollegeStatus::Declined => "declined",
        }
    }

    fn actions(self) -> &'static [Action<Self>] {
        match self {
            CollegeStatus::Researching => &[Action {
                label: "Start planning",
                next: CollegeStatus::Planning,
            }],
            CollegeStatus::Planning => &[Action {
                label: "Start the application",
                next: CollegeStatus::InProgress,
            }],
            CollegeStatus::InProgress => &[Action {
                label: "Mark submitted",
                next: CollegeStatus::Submitted,
            }],
            CollegeStatus::Submitted => &[
                Action {
                    label: "Record acceptance",
                    next: CollegeStatus::Accepted,
                },
                Action {
                    label: "Record waitlist",
                    next: CollegeStatus::Waitlisted,
                },
                Action {
                    label: "Record rejection",
                    next: CollegeStatus::Rejected,
                },
            ],
            CollegeStatus::Waitlisted => &[
                Action {
                    label: "Record acceptance",
                    next: CollegeStatus::Accepted,
                },
                Action {
                    label: "Record rejection",
                    next: CollegeStatus::Rejected,
                },
            ],
            CollegeStatus::Accepted => &[
                Action {
                    label: "Enroll",
                    next: CollegeStatus::Enrolled,
                },
                Action {
                    label: "Decline the offer",
                    next: CollegeStatus::Declined,
                },
            ],
            CollegeStatus::Rejected | CollegeStatus::Enrolled | CollegeStatus::Declined => &[],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScholarshipStatus {
    Interested,
    Planning,
    InProgress,
    Submitted,
    Accepted,
    Rejected,
    NotPursuing,
}

impl ScholarshipStatus {
    /// Statuses excluded from potential-value aggregation.
    pub fn is_written_off(self) -> bool {
        matches!(
            self,
            ScholarshipStatus::Rejected | ScholarshipStatus::NotPursuing
        )
    }
}

impl Stage for ScholarshipStatus {
    const ALL: &'static [Self] = &[
        ScholarshipStatus::Interested,
        ScholarshipStatus::Planning,
        ScholarshipStatus::InProgress,
        ScholarshipStatus::Submitted,
        ScholarshipStatus::Accepted,
        ScholarshipStatus::Rejected,
        ScholarshipStatus::NotPursuing,
    ];

    fn initial() -> Self {
        ScholarshipStatus::Interested
    }

    fn label(self) -> &'static str {
        match self {
            ScholarshipStatus::Interested => "Interested",
            ScholarshipStatus::Planning => "Planning",
            ScholarshipStatus::InProgress => "In Progress",
            ScholarshipStatus::Submitted => "Submitted",
            ScholarshipStatus::Accepted => "Awarded",
            ScholarshipStatus::Rejected => "Rejected",
            ScholarshipStatus::NotPursuing => "Not Pursuing",
        }
    }

    fn tint(self) -> Tint {
        match self {
            ScholarshipStatus::Interested | ScholarshipStatus::NotPursuing => Tint::Gray,
            ScholarshipStatus::Planning | ScholarshipStatus::InProgress => Tint::Blue,
            ScholarshipStatus::Submitted => Tint::Amber,
            ScholarshipStatus::Accepted => Tint::Green,
            ScholarshipStatus::Rejected => Tint::Red,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            ScholarshipStatus::Interested => "interested",
            ScholarshipStatus::Planning => "planning",
            ScholarshipStatus::InProgress => "in_progress",
            ScholarshipStatus::Submitted => "submitted",
            ScholarshipStatus::Accepted => "accepted",
            ScholarshipStatus::Rejected => "rejected",
            ScholarshipStatus::NotPursuing => "not_pursuing",
        }
    }

    fn actions(self) -> &'static [Action<Self>] {
        match self {
            ScholarshipStatus::Interested => &[
                Action {
                    label: "Start planning",
                    next: ScholarshipStatus::Planning,
                },
                Action {
                    label: "Stop pursuing",
                    next: ScholarshipStatus::NotPursuing,
                },
            ],
            ScholarshipStatus::Planning => &[
                Action {
                    label: "Start the application",
                    next: ScholarshipStatus::InProgress,
                },
                Action {
                    label: "Stop pursuing",
                    next: ScholarshipStatus::NotPursuing,
                },
            ],
            ScholarshipStatus::InProgress => &[
                Action {
                    label: "Mark submitted",
                    next: ScholarshipStatus::Submitted,
                },
                Action {
                    label: "Stop pursuing",
                    next: ScholarshipStatus::NotPursuing,
                },
            ],
            ScholarshipStatus::Submitted => &[
                Action {
                    label: "Record award",
                    next: ScholarshipStatus::Accepted,
                },
                Action {
                    label: "Record rejection",
                    next: ScholarshipStatus::Rejected,
                },
            ],
            ScholarshipStatus::Accepted
            | ScholarshipStatus::Rejected
            | ScholarshipStatus::NotPursuing => &[],
        }
    }
}
