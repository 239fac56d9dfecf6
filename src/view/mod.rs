//! Pure renderers: view models and text built from records, plus the user
//! intents a rendered row can emit. Nothing here touches a store.

mod format;
mod kanban;
mod rows;
mod table;

pub use format::{format_currency, format_date, format_percent, or_dash, DisplayFormat};
pub use kanban::{KanbanBoard, KanbanCard, KanbanColumn};
pub use rows::TableRow;
pub use table::{TableRowView, TableView};

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::entity::Entity;
use crate::panel::FormData;
use crate::status::{available_transitions, Transition};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Table,
    Kanban,
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewMode::Table => write!(f, "table"),
            ViewMode::Kanban => write!(f, "kanban"),
        }
    }
}

impl std::str::FromStr for ViewMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" | "list" => Ok(ViewMode::Table),
            "kanban" | "cards" | "board" => Ok(ViewMode::Kanban),
            _ => Err(format!("Invalid view mode: {}. Valid modes: table, kanban", s)),
        }
    }
}

/// A per-row action offered to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    View,
    Edit,
    Cycle,
    Approve,
    Reject,
    Delete,
}

impl From<Transition> for Action {
    fn from(t: Transition) -> Self {
        match t {
            Transition::Cycle => Action::Cycle,
            Transition::Approve => Action::Approve,
            Transition::Reject => Action::Reject,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::View => write!(f, "view"),
            Action::Edit => write!(f, "edit"),
            Action::Cycle => write!(f, "cycle status"),
            Action::Approve => write!(f, "approve"),
            Action::Reject => write!(f, "reject"),
            Action::Delete => write!(f, "delete"),
        }
    }
}

/// Actions available on `entity`'s row.
pub fn actions_for<E: Entity>(entity: &E) -> Vec<Action> {
    let mut actions = vec![Action::View, Action::Edit];
    actions.extend(
        available_transitions(entity.status())
            .into_iter()
            .map(Action::from),
    );
    actions.push(Action::Delete);
    actions
}

/// What the user asked for on a rendered record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    View { id: String },
    Edit { id: String, form: FormData },
    Delete { id: String },
    Transition { id: String, transition: Transition },
}

impl Intent {
    pub fn id(&self) -> &str {
        match self {
            Intent::View { id }
            | Intent::Edit { id, .. }
            | Intent::Delete { id }
            | Intent::Transition { id, .. } => id,
        }
    }
}
