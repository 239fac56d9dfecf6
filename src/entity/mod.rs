mod contact;
mod document;
mod expense;
mod invoice;
mod opportunity;
mod quality_check;
mod signature;

pub use contact::{Contact, ContactStatus, ContactUpdate};
pub use document::{Document, DocumentStatus, DocumentUpdate};
pub use expense::{Expense, ExpenseStatus, ExpenseUpdate};
pub use invoice::{Invoice, InvoiceStatus, InvoiceUpdate};
pub use opportunity::{Opportunity, OpportunityStage, OpportunityUpdate};
pub use quality_check::{QualityCheck, QualityCheckUpdate, QualityStatus};
pub use signature::{SignatureRequest, SignatureStatus, SignatureUpdate, Signer};

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::collection::Patch;
use crate::status::Status;

/// Base fields shared by all entities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityBase {
    pub id: String,
    pub sequence_number: u32,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: Option<String>,
}

impl EntityBase {
    pub fn new(sequence_number: u32) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            sequence_number,
            tags: Vec::new(),
            created_at: now,
            updated_at: now,
            created_by: None,
        }
    }

    /// Existing tags minus `remove`, plus any new tags in `add`.
    pub fn apply_tag_changes(&mut self, add: Vec<String>, remove: &[String]) {
        self.tags.retain(|t| !remove.contains(t));
        for tag in add {
            if !self.tags.contains(&tag) {
                self.tags.push(tag);
            }
        }
    }

    /// First 7 characters of the id, for display.
    pub fn short_id(&self) -> &str {
        let end = self
            .id
            .char_indices()
            .nth(7)
            .map(|(i, _)| i)
            .unwrap_or(self.id.len());
        &self.id[..end]
    }
}

/// A business record kept in a `CollectionStore`.
pub trait Entity: Clone + std::fmt::Debug + Serialize + DeserializeOwned + 'static {
    type Status: Status;
    type Update: Patch<Self> + std::fmt::Debug;

    const KIND: EntityKind;

    /// Whether the module carries a money amount (kanban columns show totals).
    const HAS_AMOUNT: bool = false;

    fn base(&self) -> &EntityBase;

    fn base_mut(&mut self) -> &mut EntityBase;

    /// Human-facing name (contact name, invoice number, ...).
    fn title(&self) -> &str;

    fn status(&self) -> Self::Status;

    fn set_status(&mut self, status: Self::Status);

    /// Text fields the free-text search looks at.
    fn search_fields(&self) -> Vec<&str>;

    /// Money value summed by kanban columns, if the module has one.
    fn amount(&self) -> Option<f64> {
        None
    }

    fn id(&self) -> &str {
        &self.base().id
    }
}

/// The business modules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Contact,
    Opportunity,
    Expense,
    Document,
    Invoice,
    QualityCheck,
    Signature,
}

impl EntityKind {
    pub const ALL: &'static [EntityKind] = &[
        EntityKind::Contact,
        EntityKind::Opportunity,
        EntityKind::Expense,
        EntityKind::Document,
        EntityKind::Invoice,
        EntityKind::QualityCheck,
        EntityKind::Signature,
    ];

    /// Key of the module's collection in the workspace document.
    pub fn collection_name(&self) -> &'static str {
        match self {
            EntityKind::Contact => "contacts",
            EntityKind::Opportunity => "opportunities",
            EntityKind::Expense => "expenses",
            EntityKind::Document => "documents",
            EntityKind::Invoice => "invoices",
            EntityKind::QualityCheck => "quality_checks",
            EntityKind::Signature => "signatures",
        }
    }

    /// Title used for headings ("Quality checks").
    pub fn heading(&self) -> &'static str {
        match self {
            EntityKind::Contact => "Contacts",
            EntityKind::Opportunity => "Opportunities",
            EntityKind::Expense => "Expenses",
            EntityKind::Document => "Documents",
            EntityKind::Invoice => "Invoices",
            EntityKind::QualityCheck => "Quality checks",
            EntityKind::Signature => "Signature requests",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKind::Contact => write!(f, "contact"),
            EntityKind::Opportunity => write!(f, "opportunity"),
            EntityKind::Expense => write!(f, "expense"),
            EntityKind::Document => write!(f, "document"),
            EntityKind::Invoice => write!(f, "invoice"),
            EntityKind::QualityCheck => write!(f, "quality_check"),
            EntityKind::Signature => write!(f, "signature"),
        }
    }
}

impl std::str::FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "contact" | "contacts" => Ok(EntityKind::Contact),
            "opportunity" | "opportunities" | "opp" => Ok(EntityKind::Opportunity),
            "expense" | "expenses" => Ok(EntityKind::Expense),
            "document" | "documents" | "doc" => Ok(EntityKind::Document),
            "invoice" | "invoices" => Ok(EntityKind::Invoice),
            "quality_check" | "quality_checks" | "qualitycheck" | "qc" => {
                Ok(EntityKind::QualityCheck)
            }
            "signature" | "signatures" | "sign" => Ok(EntityKind::Signature),
            _ => Err(format!(
                "Unknown entity type '{}'. Valid types: contact, opportunity, expense, document, invoice, quality_check, signature",
                s
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_base_new_has_unique_ids() {
        let a = EntityBase::new(1);
        let b = EntityBase::new(2);
        assert_ne!(a.id, b.id);
        assert_eq!(a.created_at, a.updated_at);
        assert_eq!(a.short_id().len(), 7);
    }

    #[test]
    fn test_apply_tag_changes() {
        let mut base = EntityBase::new(1);
        base.tags = vec!["vip".to_string(), "west".to_string()];

        base.apply_tag_changes(
            vec!["east".to_string(), "vip".to_string()],
            &["west".to_string()],
        );

        assert_eq!(base.tags, vec!["vip".to_string(), "east".to_string()]);
    }

    #[test]
    fn test_entity_kind_parse() {
        assert_eq!("contacts".parse::<EntityKind>(), Ok(EntityKind::Contact));
        assert_eq!("quality-check".parse::<EntityKind>(), Ok(EntityKind::QualityCheck));
        assert_eq!("QC".parse::<EntityKind>(), Ok(EntityKind::QualityCheck));
        assert!("payroll".parse::<EntityKind>().is_err());
    }

    #[test]
    fn test_entity_kind_round_trips_display() {
        for kind in EntityKind::ALL {
            assert_eq!(kind.to_string().parse::<EntityKind>(), Ok(*kind));
        }
    }
}
