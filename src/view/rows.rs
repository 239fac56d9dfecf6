//! Fixed table columns per module.

use super::format::{format_date, or_dash, DisplayFormat};
use crate::entity::{
    Contact, Document, Entity, Expense, Invoice, Opportunity, QualityCheck, SignatureRequest,
};

/// A module that renders as table rows.
pub trait TableRow: Entity {
    const COLUMNS: &'static [&'static str];

    /// One cell per entry of `COLUMNS`.
    fn cells(&self, fmt: &DisplayFormat) -> Vec<String>;
}

impl TableRow for Contact {
    const COLUMNS: &'static [&'static str] = &["Name", "Email", "Company", "Phone", "Status"];

    fn cells(&self, _fmt: &DisplayFormat) -> Vec<String> {
        vec![
            self.name.clone(),
            self.email.clone(),
            or_dash(self.company.as_deref()),
            or_dash(self.phone.as_deref()),
            self.status.to_string(),
        ]
    }
}

impl TableRow for Opportunity {
    const COLUMNS: &'static [&'static str] =
        &["Name", "Customer", "Amount", "Probability", "Close", "Stage"];

    fn cells(&self, fmt: &DisplayFormat) -> Vec<String> {
        vec![
            self.name.clone(),
            self.customer.clone(),
            fmt.currency(self.amount),
            format!("{}%", self.probability),
            format_date(self.expected_close),
            self.stage.to_string(),
        ]
    }
}

impl TableRow for Expense {
    const COLUMNS: &'static [&'static str] =
        &["Description", "Employee", "Category", "Amount", "Date", "Status"];

    fn cells(&self, fmt: &DisplayFormat) -> Vec<String> {
        vec![
            self.description.clone(),
            self.employee.clone(),
            self.category.clone(),
            fmt.currency(self.amount),
            format_date(self.date),
            self.status.to_string(),
        ]
    }
}

impl TableRow for Document {
    const COLUMNS: &'static [&'static str] = &["Name", "Folder", "Owner", "Size", "Status"];

    fn cells(&self, _fmt: &DisplayFormat) -> Vec<String> {
        vec![
            self.name.clone(),
            self.folder.clone(),
            or_dash(self.owner.as_deref()),
            self.size_kb
                .map(|kb| format!("{} KB", kb))
                .unwrap_or_else(|| "-".to_string()),
            self.status.to_string(),
        ]
    }
}

impl TableRow for Invoice {
    const COLUMNS: &'static [&'static str] = &["Number", "Customer", "Amount", "Due", "Status"];

    fn cells(&self, fmt: &DisplayFormat) -> Vec<String> {
        vec![
            self.number.clone(),
            self.customer.clone(),
            fmt.currency(self.amount),
            format_date(self.due_date),
            self.status.to_string(),
        ]
    }
}

impl TableRow for QualityCheck {
    const COLUMNS: &'static [&'static str] = &["Title", "Product", "Type", "Inspector", "Status"];

    fn cells(&self, _fmt: &DisplayFormat) -> Vec<String> {
        vec![
            self.title.clone(),
            self.product.clone(),
            self.check_type.clone(),
            or_dash(self.inspector.as_deref()),
            self.status.to_string(),
        ]
    }
}

impl TableRow for SignatureRequest {
    const COLUMNS: &'static [&'static str] = &["Title", "Document", "Signers", "Signed", "Status"];

    fn cells(&self, _fmt: &DisplayFormat) -> Vec<String> {
        let names: Vec<&str> = self.signers.iter().map(|s| s.name.as_str()).collect();
        vec![
            self.title.clone(),
            self.document.clone(),
            if names.is_empty() {
                "-".to_string()
            } else {
                names.join(" > ")
            },
            format!("{}/{}", self.signed_count(), self.signers.len()),
            self.status.to_string(),
        ]
    }
}
