//! Cross-module aggregates for the dashboard.
//!
//! Ratios with a zero denominator are `None` and render as `n/a`.

use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use crate::entity::{
    Contact, Document, Entity, EntityKind, Expense, ExpenseStatus, Invoice, InvoiceStatus,
    Opportunity, OpportunityStage, QualityCheck, QualityStatus, SignatureRequest,
    SignatureStatus,
};
use crate::status::Status;
use crate::view::{format_percent, DisplayFormat};

/// `part / whole` as a percentage.
pub fn percentage(part: f64, whole: f64) -> Option<f64> {
    if whole == 0.0 {
        None
    } else {
        Some(part / whole * 100.0)
    }
}

pub fn total_amount<E: Entity>(items: &[E]) -> f64 {
    items.iter().filter_map(Entity::amount).sum()
}

/// Record count per status, in the module's status order.
pub fn status_counts<E: Entity>(items: &[E]) -> Vec<(&'static str, usize)> {
    <E::Status as Status>::ALL
        .iter()
        .map(|status| {
            let count = items.iter().filter(|e| e.status() == *status).count();
            (status.label(), count)
        })
        .collect()
}

/// Open pipeline weighted by each opportunity's probability.
pub fn weighted_pipeline(opportunities: &[Opportunity]) -> f64 {
    opportunities
        .iter()
        .filter(|o| o.stage != OpportunityStage::Won)
        .map(Opportunity::weighted_amount)
        .sum()
}

/// Share of quality checks that passed, among decided checks.
pub fn pass_rate(checks: &[QualityCheck]) -> Option<f64> {
    let passed = checks
        .iter()
        .filter(|c| c.status == QualityStatus::Passed)
        .count();
    let failed = checks
        .iter()
        .filter(|c| c.status == QualityStatus::Failed)
        .count();
    percentage(passed as f64, (passed + failed) as f64)
}

/// Share of invoiced money that has been paid.
pub fn collection_rate(invoices: &[Invoice]) -> Option<f64> {
    let paid: f64 = invoices
        .iter()
        .filter(|i| i.status == InvoiceStatus::Paid)
        .map(|i| i.amount)
        .sum();
    percentage(paid, total_amount(invoices))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ApprovalTotals {
    pub pending: f64,
    pub approved: f64,
    pub rejected: f64,
}

pub fn expense_totals(expenses: &[Expense]) -> ApprovalTotals {
    expenses
        .iter()
        .fold(ApprovalTotals::default(), |mut totals, e| {
            match e.status {
                ExpenseStatus::Pending => totals.pending += e.amount,
                ExpenseStatus::Approved => totals.approved += e.amount,
                ExpenseStatus::Rejected => totals.rejected += e.amount,
            }
            totals
        })
}

/// Borrowed view of every module's records.
#[derive(Debug, Clone, Copy)]
pub struct Records<'a> {
    pub contacts: &'a [Contact],
    pub opportunities: &'a [Opportunity],
    pub expenses: &'a [Expense],
    pub documents: &'a [Document],
    pub invoices: &'a [Invoice],
    pub quality_checks: &'a [QualityCheck],
    pub signatures: &'a [SignatureRequest],
}

#[derive(Debug, Clone, Serialize)]
pub struct ModuleSummary {
    pub kind: EntityKind,
    pub total: usize,
    pub by_status: Vec<(&'static str, usize)>,
}

impl ModuleSummary {
    fn of<E: Entity>(items: &[E]) -> Self {
        Self {
            kind: E::KIND,
            total: items.len(),
            by_status: status_counts(items),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DeskMetrics {
    pub modules: Vec<ModuleSummary>,
    pub pipeline_value: f64,
    pub weighted_pipeline: f64,
    pub win_rate: Option<f64>,
    pub expenses: ApprovalTotals,
    pub invoiced: f64,
    pub collection_rate: Option<f64>,
    pub overdue_invoices: usize,
    pub pass_rate: Option<f64>,
    pub signatures_completed: usize,
    #[serde(skip)]
    format: DisplayFormat,
}

impl DeskMetrics {
    pub fn compute(records: Records<'_>, today: NaiveDate, fmt: &DisplayFormat) -> Self {
        let won = records
            .opportunities
            .iter()
            .filter(|o| o.stage == OpportunityStage::Won)
            .count();

        Self {
            modules: vec![
                ModuleSummary::of(records.contacts),
                ModuleSummary::of(records.opportunities),
                ModuleSummary::of(records.expenses),
                ModuleSummary::of(records.documents),
                ModuleSummary::of(records.invoices),
                ModuleSummary::of(records.quality_checks),
                ModuleSummary::of(records.signatures),
            ],
            pipeline_value: records
                .opportunities
                .iter()
                .filter(|o| o.stage != OpportunityStage::Won)
                .map(|o| o.amount)
                .sum(),
            weighted_pipeline: weighted_pipeline(records.opportunities),
            win_rate: percentage(won as f64, records.opportunities.len() as f64),
            expenses: expense_totals(records.expenses),
            invoiced: total_amount(records.invoices),
            collection_rate: collection_rate(records.invoices),
            overdue_invoices: records
                .invoices
                .iter()
                .filter(|i| i.is_overdue(today))
                .count(),
            pass_rate: pass_rate(records.quality_checks),
            signatures_completed: records
                .signatures
                .iter()
                .filter(|s| s.status == SignatureStatus::Completed)
                .count(),
            format: fmt.clone(),
        }
    }
}

impl fmt::Display for DeskMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let money = |amount: f64| self.format.currency(amount);

        writeln!(f, "Records:")?;
        for module in &self.modules {
            let breakdown: Vec<String> = module
                .by_status
                .iter()
                .map(|(label, count)| format!("{} {}", count, label))
                .collect();
            writeln!(
                f,
                "  {:<20} {:>4}  ({})",
                module.kind.heading(),
                module.total,
                breakdown.join(", ")
            )?;
        }

        writeln!(f)?;
        writeln!(f, "Sales:")?;
        writeln!(f, "  Open pipeline:      {}", money(self.pipeline_value))?;
        writeln!(f, "  Weighted pipeline:  {}", money(self.weighted_pipeline))?;
        writeln!(f, "  Win rate:           {}", format_percent(self.win_rate))?;
        writeln!(f)?;
        writeln!(f, "Finance:")?;
        writeln!(f, "  Invoiced:           {}", money(self.invoiced))?;
        writeln!(f, "  Collected:          {}", format_percent(self.collection_rate))?;
        writeln!(f, "  Overdue invoices:   {}", self.overdue_invoices)?;
        writeln!(f, "  Expenses pending:   {}", money(self.expenses.pending))?;
        writeln!(f, "  Expenses approved:  {}", money(self.expenses.approved))?;
        writeln!(f)?;
        writeln!(f, "Operations:")?;
        writeln!(f, "  QC pass rate:       {}", format_percent(self.pass_rate))?;
        writeln!(f, "  Signatures done:    {}", self.signatures_completed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(status: QualityStatus) -> QualityCheck {
        let mut c = QualityCheck::new("Weld seams".into(), "Frame".into(), 1);
        c.status = status;
        c
    }

    #[test]
    fn test_percentage_zero_denominator_is_none() {
        assert_eq!(percentage(0.0, 0.0), None);
        assert_eq!(percentage(1.0, 4.0), Some(25.0));
    }

    #[test]
    fn test_pass_rate_ignores_pending() {
        assert_eq!(pass_rate(&[]), None);
        assert_eq!(pass_rate(&[check(QualityStatus::Pending)]), None);

        let checks = [
            check(QualityStatus::Passed),
            check(QualityStatus::Passed),
            check(QualityStatus::Failed),
            check(QualityStatus::Pending),
        ];
        let rate = pass_rate(&checks).unwrap();
        assert!((rate - 66.666).abs() < 0.01);
    }

    #[test]
    fn test_weighted_pipeline_skips_won() {
        let mut open = Opportunity::new("Pilot".into(), "Acme".into(), 1000.0, 1);
        open.probability = 40;
        let mut won = Opportunity::new("Renewal".into(), "Acme".into(), 5000.0, 2);
        won.stage = OpportunityStage::Won;

        assert_eq!(weighted_pipeline(&[open, won]), 400.0);
    }

    #[test]
    fn test_expense_totals_by_status() {
        let mut a = Expense::new("Taxi".into(), "Dana".into(), "travel".into(), 30.0, 1);
        a.status = ExpenseStatus::Approved;
        let b = Expense::new("Hotel".into(), "Dana".into(), "travel".into(), 200.0, 2);

        let totals = expense_totals(&[a, b]);
        assert_eq!(totals.approved, 30.0);
        assert_eq!(totals.pending, 200.0);
        assert_eq!(totals.rejected, 0.0);
    }

    #[test]
    fn test_empty_desk_renders_na() {
        let records = Records {
            contacts: &[],
            opportunities: &[],
            expenses: &[],
            documents: &[],
            invoices: &[],
            quality_checks: &[],
            signatures: &[],
        };
        let today = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();

        let metrics = DeskMetrics::compute(records, today, &DisplayFormat::default());

        assert_eq!(metrics.win_rate, None);
        assert_eq!(metrics.collection_rate, None);
        let text = metrics.to_string();
        assert!(text.contains("QC pass rate:       n/a"));
        assert_eq!(metrics.modules.len(), EntityKind::ALL.len());
    }
}
