use std::fmt;

use serde::Serialize;

use super::format::DisplayFormat;
use crate::entity::{Entity, EntityKind};
use crate::status::{BadgeStyle, Status};

#[derive(Debug, Clone, Serialize)]
pub struct KanbanCard {
    pub id: String,
    pub reference: String,
    pub title: String,
    pub amount: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct KanbanColumn {
    pub status: &'static str,
    pub badge: BadgeStyle,
    pub count: usize,
    /// Sum of the column's amounts; `None` for modules without an amount.
    pub total: Option<f64>,
    pub cards: Vec<KanbanCard>,
}

/// Records grouped by status, one column per status in flow order.
#[derive(Debug, Clone, Serialize)]
pub struct KanbanBoard {
    pub kind: EntityKind,
    pub columns: Vec<KanbanColumn>,
    #[serde(skip)]
    format: DisplayFormat,
}

impl KanbanBoard {
    pub fn build<E: Entity>(entities: &[&E], fmt: &DisplayFormat) -> Self {
        let columns = <E::Status as Status>::ALL
            .iter()
            .map(|status| {
                let cards: Vec<KanbanCard> = entities
                    .iter()
                    .filter(|e| e.status() == *status)
                    .map(|e| KanbanCard {
                        id: e.id().to_string(),
                        reference: format!("{:03}", e.base().sequence_number),
                        title: e.title().to_string(),
                        amount: e.amount(),
                    })
                    .collect();
                let total = E::HAS_AMOUNT
                    .then(|| cards.iter().filter_map(|c| c.amount).fold(0.0, |acc, a| acc + a));

                KanbanColumn {
                    status: status.label(),
                    badge: status.badge(),
                    count: cards.len(),
                    total,
                    cards,
                }
            })
            .collect();

        Self {
            kind: E::KIND,
            columns,
            format: fmt.clone(),
        }
    }

    pub fn column(&self, status: &str) -> Option<&KanbanColumn> {
        self.columns.iter().find(|c| c.status == status)
    }
}

impl fmt::Display for KanbanBoard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, column) in self.columns.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{} ({})", column.status.to_uppercase(), column.count)?;
            if let Some(total) = column.total {
                write!(f, "  {}", self.format.currency(total))?;
            }
            writeln!(f)?;
            for card in &column.cards {
                match card.amount {
                    Some(amount) => writeln!(
                        f,
                        "  {} {}  {}",
                        card.reference,
                        card.title,
                        self.format.currency(amount)
                    )?,
                    None => writeln!(f, "  {} {}", card.reference, card.title)?,
                }
            }
        }
        Ok(())
    }
}
