use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Entity, EntityBase, EntityKind};
use crate::collection::Patch;
use crate::error::ValidationErrors;
use crate::panel::{FormData, FormValidator, FromForm};
use crate::status::{BadgeStyle, Status, StatusFlow};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExpenseStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl std::fmt::Display for ExpenseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::str::FromStr for ExpenseStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(ExpenseStatus::Pending),
            "approved" => Ok(ExpenseStatus::Approved),
            "rejected" => Ok(ExpenseStatus::Rejected),
            _ => Err(format!("Invalid expense status: {}", s)),
        }
    }
}

impl Status for ExpenseStatus {
    const ALL: &'static [Self] = &[
        ExpenseStatus::Pending,
        ExpenseStatus::Approved,
        ExpenseStatus::Rejected,
    ];
    const FLOW: StatusFlow<Self> = StatusFlow::Approval {
        pending: ExpenseStatus::Pending,
        approved: ExpenseStatus::Approved,
        rejected: ExpenseStatus::Rejected,
    };

    fn badge(self) -> BadgeStyle {
        match self {
            ExpenseStatus::Pending => BadgeStyle::Warning,
            ExpenseStatus::Approved => BadgeStyle::Success,
            ExpenseStatus::Rejected => BadgeStyle::Danger,
        }
    }

    fn label(self) -> &'static str {
        match self {
            ExpenseStatus::Pending => "pending",
            ExpenseStatus::Approved => "approved",
            ExpenseStatus::Rejected => "rejected",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expense {
    #[serde(flatten)]
    pub base: EntityBase,
    pub description: String,
    pub employee: String,
    pub category: String,
    pub amount: f64,
    pub date: Option<NaiveDate>,
    pub status: ExpenseStatus,
}

impl Expense {
    pub fn new(
        description: String,
        employee: String,
        category: String,
        amount: f64,
        sequence_number: u32,
    ) -> Self {
        Self {
            base: EntityBase::new(sequence_number),
            description,
            employee,
            category,
            amount,
            date: None,
            status: ExpenseStatus::default(),
        }
    }
}

/// Update payload for an expense. Status moves only through approve/reject.
#[derive(Debug, Clone, Default)]
pub struct ExpenseUpdate {
    pub description: Option<String>,
    pub employee: Option<String>,
    pub category: Option<String>,
    pub amount: Option<f64>,
    pub date: Option<Option<NaiveDate>>,
    pub add_tags: Vec<String>,
    pub remove_tags: Vec<String>,
}

impl Patch<Expense> for ExpenseUpdate {
    fn apply(self, expense: &mut Expense) {
        if let Some(description) = self.description {
            expense.description = description;
        }
        if let Some(employee) = self.employee {
            expense.employee = employee;
        }
        if let Some(category) = self.category {
            expense.category = category;
        }
        if let Some(amount) = self.amount {
            expense.amount = amount;
        }
        if let Some(date) = self.date {
            expense.date = date;
        }
        expense
            .base
            .apply_tag_changes(self.add_tags, &self.remove_tags);
    }
}

impl Entity for Expense {
    type Status = ExpenseStatus;
    type Update = ExpenseUpdate;

    const KIND: EntityKind = EntityKind::Expense;
    const HAS_AMOUNT: bool = true;

    fn base(&self) -> &EntityBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut EntityBase {
        &mut self.base
    }

    fn title(&self) -> &str {
        &self.description
    }

    fn status(&self) -> ExpenseStatus {
        self.status
    }

    fn set_status(&mut self, status: ExpenseStatus) {
        self.status = status;
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.description.as_str(),
            self.employee.as_str(),
            self.category.as_str(),
        ]
    }

    fn amount(&self) -> Option<f64> {
        Some(self.amount)
    }
}

impl FromForm for Expense {
    const FIELDS: &'static [&'static str] = &[
        "description",
        "employee",
        "category",
        "amount",
        "date",
        "tags",
        "remove_tags",
    ];

    fn from_form(form: &FormData, sequence_number: u32) -> Result<Self, ValidationErrors> {
        let mut v = FormValidator::new(form);
        v.reject_unknown_on_create(Self::FIELDS);
        let description = v.required("description");
        let employee = v.required("employee");
        let category = v.required("category");
        let amount = v.money("amount");
        let date = v.date("date");
        let tags = v.list("tags");
        v.finish()?;

        let mut expense = Expense::new(description, employee, category, amount, sequence_number);
        expense.date = date;
        expense.base.tags = tags;
        Ok(expense)
    }

    fn update_from_form(form: &FormData) -> Result<ExpenseUpdate, ValidationErrors> {
        let mut v = FormValidator::new(form);
        v.reject_unknown(Self::FIELDS);
        let update = ExpenseUpdate {
            description: v.patch_required("description"),
            employee: v.patch_required("employee"),
            category: v.patch_required("category"),
            amount: v.patch_money("amount"),
            date: v.patch_date("date"),
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

    #[test]
    fn test_new_expense_is_pending() {
        let expense = Expense::new("Taxi".into(), "Dana".into(), "travel".into(), 42.5, 1);
        assert_eq!(expense.status, ExpenseStatus::Pending);
        assert_eq!(expense.amount(), Some(42.5));
    }

    #[test]
    fn test_status_is_not_a_form_field() {
        let form = FormData::new().with("status", "approved");
        let errors = Expense::update_from_form(&form).unwrap_err();
        assert_eq!(errors.for_field("status")[0].message, "unknown field");
    }

    #[test]
    fn test_from_form_collects_all_errors() {
        let form = FormData::new().with("amount", "12.00").with("date", "yesterday");
        let errors = Expense::from_form(&form, 1).unwrap_err();

        assert_eq!(errors.for_field("description").len(), 1);
        assert_eq!(errors.for_field("employee").len(), 1);
        assert_eq!(errors.for_field("category").len(), 1);
        assert_eq!(errors.for_field("date").len(), 1);
        assert!(errors.for_field("amount").is_empty());
    }
}
