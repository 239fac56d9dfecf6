use serde::{Deserialize, Serialize};

use super::{Entity, EntityBase, EntityKind};
use crate::collection::Patch;
use crate::error::ValidationErrors;
use crate::panel::{FormData, FormValidator, FromForm};
use crate::status::{BadgeStyle, Status, StatusFlow};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    #[default]
    Draft,
    Published,
}

impl std::fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::str::FromStr for DocumentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "draft" => Ok(DocumentStatus::Draft),
            "published" => Ok(DocumentStatus::Published),
            _ => Err(format!("Invalid document status: {}", s)),
        }
    }
}

impl Status for DocumentStatus {
    const ALL: &'static [Self] = &[DocumentStatus::Draft, DocumentStatus::Published];
    const FLOW: StatusFlow<Self> = StatusFlow::Cycle;

    fn badge(self) -> BadgeStyle {
        match self {
            DocumentStatus::Draft => BadgeStyle::Neutral,
            DocumentStatus::Published => BadgeStyle::Success,
        }
    }

    fn label(self) -> &'static str {
        match self {
            DocumentStatus::Draft => "draft",
            DocumentStatus::Published => "published",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    #[serde(flatten)]
    pub base: EntityBase,
    pub name: String,
    pub folder: String,
    pub owner: Option<String>,
    pub size_kb: Option<u64>,
    pub status: DocumentStatus,
}

impl Document {
    pub fn new(name: String, folder: String, sequence_number: u32) -> Self {
        Self {
            base: EntityBase::new(sequence_number),
            name,
            folder,
            owner: None,
            size_kb: None,
            status: DocumentStatus::default(),
        }
    }
}

/// Update payload for a document
#[derive(Debug, Clone, Default)]
pub struct DocumentUpdate {
    pub name: Option<String>,
    pub folder: Option<String>,
    pub owner: Option<Option<String>>,
    pub size_kb: Option<u64>,
    pub status: Option<DocumentStatus>,
    pub add_tags: Vec<String>,
    pub remove_tags: Vec<String>,
}

impl Patch<Document> for DocumentUpdate {
    fn apply(self, doc: &mut Document) {
        if let Some(name) = self.name {
            doc.name = name;
        }
        if let Some(folder) = self.folder {
            doc.folder = folder;
        }
        if let Some(owner) = self.owner {
            doc.owner = owner;
        }
        if let Some(size_kb) = self.size_kb {
            doc.size_kb = Some(size_kb);
        }
        if let Some(status) = self.status {
            doc.status = status;
        }
        doc.base.apply_tag_changes(self.add_tags, &self.remove_tags);
    }
}

impl Entity for Document {
    type Status = DocumentStatus;
    type Update = DocumentUpdate;

    const KIND: EntityKind = EntityKind::Document;

    fn base(&self) -> &EntityBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut EntityBase {
        &mut self.base
    }

    fn title(&self) -> &str {
        &self.name
    }

    fn status(&self) -> DocumentStatus {
        self.status
    }

    fn set_status(&mut self, status: DocumentStatus) {
        self.status = status;
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.folder.as_str()]
    }
}

impl FromForm for Document {
    const FIELDS: &'static [&'static str] = &[
        "name",
        "folder",
        "owner",
        "size_kb",
        "status",
        "tags",
        "remove_tags",
    ];

    fn from_form(form: &FormData, sequence_number: u32) -> Result<Self, ValidationErrors> {
        let mut v = FormValidator::new(form);
        v.reject_unknown_on_create(Self::FIELDS);
        let name = v.required("name");
        let folder = v.required("folder");
        let owner = v.optional("owner");
        let size_kb = v.count("size_kb");
        let status = v.status::<DocumentStatus>("status");
        let tags = v.list("tags");
        v.finish()?;

        let mut doc = Document::new(name, folder, sequence_number);
        doc.owner = owner;
        doc.size_kb = size_kb;
        doc.status = status.unwrap_or_default();
        doc.base.tags = tags;
        Ok(doc)
    }

    fn update_from_form(form: &FormData) -> Result<DocumentUpdate, ValidationErrors> {
        let mut v = FormValidator::new(form);
        v.reject_unknown(Self::FIELDS);
        let update = DocumentUpdate {
            name: v.patch_required("name"),
            folder: v.patch_required("folder"),
            owner: v.patch_optional("owner"),
            size_kb: v.count("size_kb"),
            status: v.status("status"),
            add_tags: v.list("tags"),
            remove_tags: v.list("remove_tags"),
        };
        v.finish()?;
        Ok(update)
    }
}
