// src/entity/contact.rs
use serde::{Deserialize, Serialize};

use super::{Entity, EntityBase, EntityKind};
use crate::collection::Patch;
use crate::error::ValidationErrors;
use crate::panel::{FormData, FormValidator, FromForm};
use crate::status::{BadgeStyle, Status, StatusFlow};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ContactStatus {
    #[default]
    Lead,
    Qualified,
    Customer,
}

impl std::fmt::Display for ContactStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::str::FromStr for ContactStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "lead" => Ok(ContactStatus::Lead),
            "qualified" => Ok(ContactStatus::Qualified),
            "customer" => Ok(ContactStatus::Customer),
            _ => Err(format!("Invalid contact status: {}", s)),
        }
    }
}

impl Status for ContactStatus {
    const ALL: &'static [Self] = &[
        ContactStatus::Lead,
        ContactStatus::Qualified,
        ContactStatus::Customer,
    ];
    const FLOW: StatusFlow<Self> = StatusFlow::Cycle;

    fn badge(self) -> BadgeStyle {
        match self {
            ContactStatus::Lead => BadgeStyle::Info,
            ContactStatus::Qualified => BadgeStyle::Warning,
            ContactStatus::Customer => BadgeStyle::Success,
        }
    }

    fn label(self) -> &'static str {
        match self {
            ContactStatus::Lead => "lead",
            ContactStatus::Qualified => "qualified",
            ContactStatus::Customer => "customer",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contact {
    #[serde(flatten)]
    pub base: EntityBase,
    pub name: String,
    pub email: String,
    pub company: Option<String>,
    pub phone: Option<String>,
    pub status: ContactStatus,
}

impl Contact {
    pub fn new(name: String, email: String, sequence_number: u32) -> Self {
        Self {
            base: EntityBase::new(sequence_number),
            name,
            email,
            company: None,
            phone: None,
            status: ContactStatus::default(),
        }
    }
}

/// Update payload for a contact
#[derive(Debug, Clone, Default)]
pub struct ContactUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub company: Option<Option<String>>, // Some(None) to clear
    pub phone: Option<Option<String>>,
    pub status: Option<ContactStatus>,
    pub add_tags: Vec<String>,
    pub remove_tags: Vec<String>,
}

impl Patch<Contact> for ContactUpdate {
    fn apply(self, contact: &mut Contact) {
        if let Some(name) = self.name {
            contact.name = name;
        }
        if let Some(email) = self.email {
            contact.email = email;
        }
        if let Some(company) = self.company {
            contact.company = company;
        }
        if let Some(phone) = self.phone {
            contact.phone = phone;
        }
        if let Some(status) = self.status {
            contact.status = status;
        }
        contact
            .base
            .apply_tag_changes(self.add_tags, &self.remove_tags);
    }
}

impl Entity for Contact {
    type Status = ContactStatus;
    type Update = ContactUpdate;

    const KIND: EntityKind = EntityKind::Contact;

    fn base(&self) -> &EntityBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut EntityBase {
        &mut self.base
    }

    fn title(&self) -> &str {
        &self.name
    }

    fn status(&self) -> ContactStatus {
        self.status
    }

    fn set_status(&mut self, status: ContactStatus) {
        self.status = status;
    }

    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.name.as_str(), self.email.as_str()];
        if let Some(company) = &self.company {
            fields.push(company);
        }
        fields
    }
}

impl FromForm for Contact {
    const FIELDS: &'static [&'static str] = &[
        "name",
        "email",
        "company",
        "phone",
        "status",
        "tags",
        "remove_tags",
    ];

    fn from_form(form: &FormData, sequence_number: u32) -> Result<Self, ValidationErrors> {
        let mut v = FormValidator::new(form);
        v.reject_unknown_on_create(Self::FIELDS);
        let name = v.required("name");
        let email = v.email("email");
        let company = v.optional("company");
        let phone = v.optional("phone");
        let status = v.status::<ContactStatus>("status");
        let tags = v.list("tags");
        v.finish()?;

        let mut contact = Contact::new(name, email, sequence_number);
        contact.company = company;
        contact.phone = phone;
        contact.status = status.unwrap_or_default();
        contact.base.tags = tags;
        Ok(contact)
    }

    fn update_from_form(form: &FormData) -> Result<ContactUpdate, ValidationErrors> {
        let mut v = FormValidator::new(form);
        v.reject_unknown(Self::FIELDS);
        let update = ContactUpdate {
            name: v.patch_required("name"),
            email: v.patch_email("email"),
            company: v.patch_optional("company"),
            phone: v.patch_optional("phone"),
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

    #[test]
    fn test_contact_from_form() {
        let form = FormData::new()
            .with("name", "Acme Corporation")
            .with("email", "sales@acme.test")
            .with("company", "Acme")
            .with("tags", "vip, west");

        let contact = Contact::from_form(&form, 3).unwrap();

        assert_eq!(contact.name, "Acme Corporation");
        assert_eq!(contact.company.as_deref(), Some("Acme"));
        assert_eq!(contact.status, ContactStatus::Lead);
        assert_eq!(contact.base.sequence_number, 3);
        assert_eq!(contact.base.tags, vec!["vip", "west"]);
    }

    #[test]
    fn test_contact_form_requires_name_and_email() {
        let form = FormData::new().with("name", "").with("email", "nobody");
        let errors = Contact::from_form(&form, 1).unwrap_err();

        assert_eq!(errors.for_field("name").len(), 1);
        assert_eq!(errors.for_field("email").len(), 1);
    }

    #[test]
    fn test_create_form_rejects_remove_tags() {
        let form = FormData::new()
            .with("name", "Ann")
            .with("email", "ann@example.com")
            .with("remove_tags", "x");
        assert!(Contact::from_form(&form, 1).is_err());
    }

    #[test]
    fn test_update_form_clears_optional_fields() {
        let form = FormData::new().with("company", "").with("status", "customer");
        let update = Contact::update_from_form(&form).unwrap();

        let mut contact = Contact::new("Ann".into(), "ann@example.com".into(), 1);
        contact.company = Some("Old Co".into());
        update.apply(&mut contact);

        assert_eq!(contact.company, None);
        assert_eq!(contact.status, ContactStatus::Customer);
        assert_eq!(contact.name, "Ann");
    }

    #[test]
    fn test_search_fields_include_company() {
        let mut contact = Contact::new("Ann".into(), "ann@example.com".into(), 1);
        contact.company = Some("Acme".into());
        assert_eq!(contact.search_fields(), vec!["Ann", "ann@example.com", "Acme"]);
    }
}
