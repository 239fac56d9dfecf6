//! Status enums, their badge styles, and the two transition shapes.
//!
//! Every module models its status as a closed enum. A module either cycles
//! round-robin through its ordered status list (`draft -> sent -> paid -> draft`)
//! or follows an approval shape where a pending record is approved or
//! rejected once and then stays put.

use std::fmt;
use std::hash::Hash;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{OpsdeskError, Result};

/// Style token a renderer maps to a color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BadgeStyle {
    #[default]
    Neutral,
    Info,
    Progress,
    Warning,
    Success,
    Danger,
}

impl fmt::Display for BadgeStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BadgeStyle::Neutral => write!(f, "neutral"),
            BadgeStyle::Info => write!(f, "info"),
            BadgeStyle::Progress => write!(f, "progress"),
            BadgeStyle::Warning => write!(f, "warning"),
            BadgeStyle::Success => write!(f, "success"),
            BadgeStyle::Danger => write!(f, "danger"),
        }
    }
}

/// How a module's records move between statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFlow<S> {
    /// Forward-only advance through `Status::ALL`, wrapping at the end.
    Cycle,
    /// `pending` moves once to `approved` or `rejected`; both are terminal.
    Approval { pending: S, approved: S, rejected: S },
}

/// A user-triggered status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transition {
    Cycle,
    Approve,
    Reject,
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transition::Cycle => write!(f, "cycle"),
            Transition::Approve => write!(f, "approve"),
            Transition::Reject => write!(f, "reject"),
        }
    }
}

pub trait Status:
    Copy
    + Eq
    + Hash
    + fmt::Debug
    + fmt::Display
    + FromStr<Err = String>
    + Serialize
    + DeserializeOwned
    + 'static
{
    /// Every variant, in cycle/display order.
    const ALL: &'static [Self];
    const FLOW: StatusFlow<Self>;

    fn badge(self) -> BadgeStyle;

    fn label(self) -> &'static str;

    /// Position of `self` in `ALL`.
    fn ordinal(self) -> usize {
        Self::ALL.iter().position(|s| *s == self).unwrap_or(0)
    }
}

/// Advance one step through the ordered status list, wrapping around.
pub fn next_in_sequence<S: Status>(current: S) -> S {
    let all = S::ALL;
    match all.iter().position(|s| *s == current) {
        Some(idx) => all[(idx + 1) % all.len()],
        None => all[0],
    }
}

/// Badge style for a raw label; labels that do not parse get the default style.
pub fn badge_for_label<S: Status>(label: &str) -> BadgeStyle {
    label.parse::<S>().map(S::badge).unwrap_or_default()
}

/// Whether no further transition is possible from `status`.
pub fn is_terminal<S: Status>(status: S) -> bool {
    match S::FLOW {
        StatusFlow::Cycle => false,
        StatusFlow::Approval { pending, .. } => status != pending,
    }
}

/// Transitions a record in `status` can take.
pub fn available_transitions<S: Status>(status: S) -> Vec<Transition> {
    match S::FLOW {
        StatusFlow::Cycle => vec![Transition::Cycle],
        StatusFlow::Approval { pending, .. } if status == pending => {
            vec![Transition::Approve, Transition::Reject]
        }
        StatusFlow::Approval { .. } => Vec::new(),
    }
}

/// Apply `transition` to `current`, refusing moves the module's flow does not allow.
pub fn apply_transition<S: Status>(current: S, transition: Transition) -> Result<S> {
    let refused = || OpsdeskError::InvalidTransition {
        status: current.to_string(),
        action: transition.to_string(),
    };

    match (S::FLOW, transition) {
        (StatusFlow::Cycle, Transition::Cycle) => Ok(next_in_sequence(current)),
        (
            StatusFlow::Approval {
                pending, approved, ..
            },
            Transition::Approve,
        ) if current == pending => Ok(approved),
        (
            StatusFlow::Approval {
                pending, rejected, ..
            },
            Transition::Reject,
        ) if current == pending => Ok(rejected),
        _ => Err(refused()),
    }
}

/// Comma-separated list of the valid labels, for error messages.
pub fn valid_labels<S: Status>() -> String {
    S::ALL
        .iter()
        .map(|s| s.label())
        .collect::<Vec<_>>()
        .join(", ")
}
