use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

use super::format::DisplayFormat;
use super::rows::TableRow;
use super::{actions_for, Action};
use crate::entity::{Entity, EntityKind};
use crate::status::{BadgeStyle, Status};

#[derive(Debug, Clone, Serialize)]
pub struct TableRowView {
    pub id: String,
    /// Zero-padded sequence number, e.g. `003`
    pub reference: String,
    pub selected: bool,
    pub cells: Vec<String>,
    pub badge: BadgeStyle,
    pub actions: Vec<Action>,
}

/// Table view model: one row per record, fixed columns per module.
#[derive(Debug, Clone, Serialize)]
pub struct TableView {
    pub kind: EntityKind,
    pub columns: Vec<&'static str>,
    pub rows: Vec<TableRowView>,
}

impl TableView {
    pub fn build<E: TableRow>(
        entities: &[&E],
        selected: &BTreeSet<String>,
        fmt: &DisplayFormat,
    ) -> Self {
        let rows = entities
            .iter()
            .map(|entity| TableRowView {
                id: entity.id().to_string(),
                reference: format!("{:03}", entity.base().sequence_number),
                selected: selected.contains(entity.id()),
                cells: entity.cells(fmt),
                badge: entity.status().badge(),
                actions: actions_for(*entity),
            })
            .collect();

        Self {
            kind: E::KIND,
            columns: E::COLUMNS.to_vec(),
            rows,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl fmt::Display for TableView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.rows.is_empty() {
            return writeln!(f, "No {} found.", self.kind.heading().to_lowercase());
        }

        let mut widths: Vec<usize> = self.columns.iter().map(|c| c.chars().count()).collect();
        for row in &self.rows {
            for (width, cell) in widths.iter_mut().zip(&row.cells) {
                *width = (*width).max(cell.chars().count());
            }
        }

        write!(f, "        #  ")?;
        write_cells(f, self.columns.iter().copied(), &widths)?;
        for row in &self.rows {
            let mark = if row.selected { "[x]" } else { "[ ]" };
            write!(f, "  {} {}  ", mark, row.reference)?;
            write_cells(f, row.cells.iter().map(String::as_str), &widths)?;
        }
        Ok(())
    }
}

fn write_cells<'a>(
    f: &mut fmt::Formatter<'_>,
    cells: impl Iterator<Item = &'a str>,
    widths: &[usize],
) -> fmt::Result {
    let line: Vec<String> = cells
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
        .collect();
    writeln!(f, "{}", line.join("  ").trim_end())
}
