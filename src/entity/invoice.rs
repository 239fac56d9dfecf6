use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Entity, EntityBase, EntityKind};
use crate::collection::Patch;
use crate::error::ValidationErrors;
use crate::panel::{FormData, FormValidator, FromForm};
use crate::status::{BadgeStyle, Status, StatusFlow};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    #[default]
    Draft,
    Sent,
    Paid,
}

impl std::fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::str::FromStr for InvoiceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "draft" => Ok(InvoiceStatus::Draft),
            "sent" => Ok(InvoiceStatus::Sent),
            "paid" => Ok(InvoiceStatus::Paid),
            _ => Err(format!("Invalid invoice status: {}", s)),
        }
    }
}

impl Status for InvoiceStatus {
    const ALL: &'static [Self] = &[InvoiceStatus::Draft, InvoiceStatus::Sent, InvoiceStatus::Paid];
    const FLOW: StatusFlow<Self> = StatusFlow::Cycle;

    fn badge(self) -> BadgeStyle {
        match self {
            InvoiceStatus::Draft => BadgeStyle::Neutral,
            InvoiceStatus::Sent => BadgeStyle::Info,
            InvoiceStatus::Paid => BadgeStyle::Success,
        }
    }

    fn label(self) -> &'static str {
        match self {
            InvoiceStatus::Draft => "draft",
            InvoiceStatus::Sent => "sent",
            InvoiceStatus::Paid => "paid",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    #[serde(flatten)]
    pub base: EntityBase,
    /// Invoice number, e.g. "INV-2024-001"
    pub number: String,
    pub customer: String,
    pub amount: f64,
    pub due_date: Option<NaiveDate>,
    pub status: InvoiceStatus,
}

impl Invoice {
    pub fn new(number: String, customer: String, amount: f64, sequence_number: u32) -> Self {
        Self {
            base: EntityBase::new(sequence_number),
            number,
            customer,
            amount,
            due_date: None,
            status: InvoiceStatus::default(),
        }
    }

    /// Unpaid and past its due date.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.status != InvoiceStatus::Paid && self.due_date.is_some_and(|due| due < today)
    }
}

/// Update payload for an invoice
#[derive(Debug, Clone, Default)]
pub struct InvoiceUpdate {
    pub number: Option<String>,
    pub customer: Option<String>,
    pub amount: Option<f64>,
    pub due_date: Option<Option<NaiveDate>>,
    pub status: Option<InvoiceStatus>,
    pub add_tags: Vec<String>,
    pub remove_tags: Vec<String>,
}

impl Patch<Invoice> for InvoiceUpdate {
    fn apply(self, invoice: &mut Invoice) {
        if let Some(number) = self.number {
            invoice.number = number;
        }
        if let Some(customer) = self.customer {
            invoice.customer = customer;
        }
        if let Some(amount) = self.amount {
            invoice.amount = amount;
        }
        if let Some(due_date) = self.due_date {
            invoice.due_date = due_date;
        }
        if let Some(status) = self.status {
            invoice.status = status;
        }
        invoice
            .base
            .apply_tag_changes(self.add_tags, &self.remove_tags);
    }
}

impl Entity for Invoice {
    type Status = InvoiceStatus;
    type Update = InvoiceUpdate;

    const KIND: EntityKind = EntityKind::Invoice;
    const HAS_AMOUNT: bool = true;

    fn base(&self) -> &EntityBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut EntityBase {
        &mut self.base
    }

    fn title(&self) -> &str {
        &self.number
    }

    fn status(&self) -> InvoiceStatus {
        self.status
    }

    fn set_status(&mut self, status: InvoiceStatus) {
        self.status = status;
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![self.number.as_str(), self.customer.as_str()]
    }

    fn amount(&self) -> Option<f64> {
        Some(self.amount)
    }
}

impl FromForm for Invoice {
    const FIELDS: &'static [&'static str] = &[
        "number",
        "customer",
        "amount",
        "due_date",
        "status",
        "tags",
        "remove_tags",
    ];

    fn from_form(form: &FormData, sequence_number: u32) -> Result<Self, ValidationErrors> {
        let mut v = FormValidator::new(form);
        v.reject_unknown_on_create(Self::FIELDS);
        let number = v.required("number");
        let customer = v.required("customer");
        let amount = v.money("amount");
        let due_date = v.date("due_date");
        let status = v.status::<InvoiceStatus>("status");
        let tags = v.list("tags");
        v.finish()?;

        let mut invoice = Invoice::new(number, customer, amount, sequence_number);
        invoice.due_date = due_date;
        invoice.status = status.unwrap_or_default();
        invoice.base.tags = tags;
        Ok(invoice)
    }

    fn update_from_form(form: &FormData) -> Result<InvoiceUpdate, ValidationErrors> {
        let mut v = FormValidator::new(form);
        v.reject_unknown(Self::FIELDS);
        let update = InvoiceUpdate {
            number: v.patch_required("number"),
            customer: v.patch_required("customer"),
            amount: v.patch_money("amount"),
            due_date: v.patch_date("due_date"),
            status: v.status("status"),
            add_tags: v.list("tags"),
            remove_tags: v.list("remove_tags"),
        };
        v.finish()?;
        Ok(update)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_is_overdue() {
        let mut invoice = Invoice::new("INV-001".into(), "Acme".into(), 100.0, 1);
        assert!(!invoice.is_overdue(date("2025-03-01")));

        invoice.due_date = Some(date("2025-02-01"));
        assert!(invoice.is_overdue(date("2025-03-01")));
        assert!(!invoice.is_overdue(date("2025-01-15")));

        invoice.status = InvoiceStatus::Paid;
        assert!(!invoice.is_overdue(date("2025-03-01")));
    }

    #[test]
    fn test_update_form_sets_amount() {
        let form = FormData::new().with("amount", "1500.25").with("due_date", "2025-06-30");
        let update = Invoice::update_from_form(&form).unwrap();

        let mut invoice = Invoice::new("INV-001".into(), "Acme".into(), 100.0, 1);
        update.apply(&mut invoice);

        assert_eq!(invoice.amount, 1500.25);
        assert_eq!(invoice.due_date, Some(date("2025-06-30")));
    }
}
