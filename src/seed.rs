//! Demo data loaded by `opsdesk init --seed`.

use chrono::NaiveDate;

use crate::entity::{
    Contact, ContactStatus, Document, DocumentStatus, Expense, ExpenseStatus, Invoice,
    InvoiceStatus, Opportunity, OpportunityStage, QualityCheck, QualityStatus, SignatureRequest,
    SignatureStatus, Signer,
};

fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(y, m, d)
}

fn tags(list: &[&str]) -> Vec<String> {
    list.iter().map(|t| t.to_string()).collect()
}

pub fn contacts() -> Vec<Contact> {
    let rows = [
        ("John Smith", "john.smith@acme.com", "Acme Corporation", "+1 555 0100", ContactStatus::Customer),
        ("Sarah Johnson", "sarah@xyzindustries.com", "XYZ Industries", "+1 555 0101", ContactStatus::Qualified),
        ("Michael Brown", "m.brown@globex.com", "Globex", "+1 555 0102", ContactStatus::Lead),
        ("Emily Davis", "emily.davis@initech.com", "Initech", "+1 555 0103", ContactStatus::Lead),
    ];

    rows.iter()
        .enumerate()
        .map(|(i, (name, email, company, phone, status))| {
            let mut c = Contact::new(name.to_string(), email.to_string(), i as u32 + 1);
            c.company = Some(company.to_string());
            c.phone = Some(phone.to_string());
            c.status = *status;
            c
        })
        .collect()
}

pub fn opportunities() -> Vec<Opportunity> {
    let rows = [
        ("Enterprise license", "Acme Corporation", 45000.0, 60, OpportunityStage::Proposition, date(2025, 3, 31)),
        ("Support renewal", "XYZ Industries", 12000.0, 90, OpportunityStage::Won, date(2025, 1, 15)),
        ("Pilot project", "Globex", 8500.0, 25, OpportunityStage::Qualified, date(2025, 4, 30)),
        ("Training package", "Initech", 3200.0, 10, OpportunityStage::New, None),
    ];

    rows.iter()
        .enumerate()
        .map(|(i, (name, customer, amount, probability, stage, close))| {
            let mut o = Opportunity::new(name.to_string(), customer.to_string(), *amount, i as u32 + 1);
            o.probability = *probability;
            o.stage = *stage;
            o.expected_close = *close;
            o
        })
        .collect()
}

pub fn expenses() -> Vec<Expense> {
    let rows = [
        ("Flight to client site", "John Smith", "travel", 620.0, ExpenseStatus::Approved, date(2025, 1, 8)),
        ("Team lunch", "Sarah Johnson", "meals", 184.5, ExpenseStatus::Pending, date(2025, 1, 12)),
        ("Conference ticket", "Michael Brown", "training", 899.0, ExpenseStatus::Rejected, date(2025, 1, 20)),
        ("Taxi to airport", "Sarah Johnson", "travel", 45.0, ExpenseStatus::Pending, date(2025, 1, 22)),
    ];

    rows.iter()
        .enumerate()
        .map(|(i, (description, employee, category, amount, status, day))| {
            let mut e = Expense::new(
                description.to_string(),
                employee.to_string(),
                category.to_string(),
                *amount,
                i as u32 + 1,
            );
            e.status = *status;
            e.date = *day;
            e
        })
        .collect()
}

pub fn documents() -> Vec<Document> {
    let rows = [
        ("Employee handbook", "HR", "Emily Davis", 2048, DocumentStatus::Published),
        ("Q1 sales report", "Sales", "John Smith", 512, DocumentStatus::Draft),
        ("Supplier agreement", "Legal", "Sarah Johnson", 340, DocumentStatus::Published),
    ];

    rows.iter()
        .enumerate()
        .map(|(i, (name, folder, owner, size, status))| {
            let mut d = Document::new(name.to_string(), folder.to_string(), i as u32 + 1);
            d.owner = Some(owner.to_string());
            d.size_kb = Some(*size);
            d.status = *status;
            d
        })
        .collect()
}

pub fn invoices() -> Vec<Invoice> {
    let rows = [
        ("INV-2025-001", "Acme Corporation", 15000.0, InvoiceStatus::Paid, date(2025, 1, 31)),
        ("INV-2025-002", "XYZ Industries", 4250.0, InvoiceStatus::Sent, date(2025, 2, 15)),
        ("INV-2025-003", "Globex", 980.0, InvoiceStatus::Draft, date(2025, 3, 1)),
    ];

    rows.iter()
        .enumerate()
        .map(|(i, (number, customer, amount, status, due))| {
            let mut inv = Invoice::new(number.to_string(), customer.to_string(), *amount, i as u32 + 1);
            inv.status = *status;
            inv.due_date = *due;
            inv
        })
        .collect()
}

pub fn quality_checks() -> Vec<QualityCheck> {
    let rows = [
        ("Incoming steel inspection", "Frame A", "measure", "Michael Brown", QualityStatus::Passed),
        ("Paint finish", "Frame A", "visual", "Emily Davis", QualityStatus::Failed),
        ("Load test", "Bracket B2", "functional", "Michael Brown", QualityStatus::Pending),
    ];

    rows.iter()
        .enumerate()
        .map(|(i, (title, product, check_type, inspector, status))| {
            let mut q = QualityCheck::new(title.to_string(), product.to_string(), i as u32 + 1);
            q.check_type = check_type.to_string();
            q.inspector = Some(inspector.to_string());
            q.status = *status;
            q
        })
        .collect()
}

pub fn signatures() -> Vec<SignatureRequest> {
    let mut nda = SignatureRequest::new("Mutual NDA".into(), "Supplier agreement".into(), 1);
    nda.signers = vec![Signer::new("Sarah Johnson"), Signer::new("John Smith")];
    nda.status = SignatureStatus::Sent;
    nda.signers[0].signed = true;
    nda.base.tags = tags(&["legal"]);

    let mut offer = SignatureRequest::new("Offer letter".into(), "Employee handbook".into(), 2);
    offer.signers = vec![Signer::new("Emily Davis")];

    vec![nda, offer]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::CollectionStore;

    #[test]
    fn test_seed_ids_are_unique_per_module() {
        assert!(CollectionStore::from_entities(contacts()).is_ok());
        assert!(CollectionStore::from_entities(opportunities()).is_ok());
        assert!(CollectionStore::from_entities(expenses()).is_ok());
        assert!(CollectionStore::from_entities(documents()).is_ok());
        assert!(CollectionStore::from_entities(invoices()).is_ok());
        assert!(CollectionStore::from_entities(quality_checks()).is_ok());
        assert!(CollectionStore::from_entities(signatures()).is_ok());
    }

    #[test]
    fn test_seed_contains_demo_customers() {
        let names: Vec<String> = contacts()
            .into_iter()
            .filter_map(|c| c.company)
            .collect();
        assert!(names.contains(&"Acme Corporation".to_string()));
        assert!(names.contains(&"XYZ Industries".to_string()));
    }

    #[test]
    fn test_sequence_numbers_start_at_one() {
        let seqs: Vec<u32> = invoices().iter().map(|i| i.base.sequence_number).collect();
        assert_eq!(seqs, vec![1, 2, 3]);
    }
}
