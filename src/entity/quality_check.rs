use serde::{Deserialize, Serialize};

use super::{Entity, EntityBase, EntityKind};
use crate::collection::Patch;
use crate::error::ValidationErrors;
use crate::panel::{FormData, FormValidator, FromForm};
use crate::status::{BadgeStyle, Status, StatusFlow};

const DEFAULT_CHECK_TYPE: &str = "visual";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum QualityStatus {
    #[default]
    Pending,
    Passed,
    Failed,
}

impl std::fmt::Display for QualityStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::str::FromStr for QualityStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(QualityStatus::Pending),
            "passed" | "pass" => Ok(QualityStatus::Passed),
            "failed" | "fail" => Ok(QualityStatus::Failed),
            _ => Err(format!("Invalid quality check status: {}", s)),
        }
    }
}

impl Status for QualityStatus {
    const ALL: &'static [Self] = &[
        QualityStatus::Pending,
        QualityStatus::Passed,
        QualityStatus::Failed,
    ];
    const FLOW: StatusFlow<Self> = StatusFlow::Approval {
        pending: QualityStatus::Pending,
        approved: QualityStatus::Passed,
        rejected: QualityStatus::Failed,
    };

    fn badge(self) -> BadgeStyle {
        match self {
            QualityStatus::Pending => BadgeStyle::Warning,
            QualityStatus::Passed => BadgeStyle::Success,
            QualityStatus::Failed => BadgeStyle::Danger,
        }
    }

    fn label(self) -> &'static str {
        match self {
            QualityStatus::Pending => "pending",
            QualityStatus::Passed => "passed",
            QualityStatus::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityCheck {
    #[serde(flatten)]
    pub base: EntityBase,
    pub title: String,
    pub product: String,
    /// Kind of inspection ("visual", "measure", "functional", ...)
    pub check_type: String,
    pub inspector: Option<String>,
    pub status: QualityStatus,
}

impl QualityCheck {
    pub fn new(title: String, product: String, sequence_number: u32) -> Self {
        Self {
            base: EntityBase::new(sequence_number),
            title,
            product,
            check_type: DEFAULT_CHECK_TYPE.to_string(),
            inspector: None,
            status: QualityStatus::default(),
        }
    }
}

/// Update payload for a quality check. Status moves only through pass/fail.
#[derive(Debug, Clone, Default)]
pub struct QualityCheckUpdate {
    pub title: Option<String>,
    pub product: Option<String>,
    pub check_type: Option<String>,
    pub inspector: Option<Option<String>>,
    pub add_tags: Vec<String>,
    pub remove_tags: Vec<String>,
}

impl Patch<QualityCheck> for QualityCheckUpdate {
    fn apply(self, check: &mut QualityCheck) {
        if let Some(title) = self.title {
            check.title = title;
        }
        if let Some(product) = self.product {
            check.product = product;
        }
        if let Some(check_type) = self.check_type {
            check.check_type = check_type;
        }
        if let Some(inspector) = self.inspector {
            check.inspector = inspector;
        }
        check.base.apply_tag_changes(self.add_tags, &self.remove_tags);
    }
}

impl Entity for QualityCheck {
    type Status = QualityStatus;
    type Update = QualityCheckUpdate;

    const KIND: EntityKind = EntityKind::QualityCheck;

    fn base(&self) -> &EntityBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut EntityBase {
        &mut self.base
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn status(&self) -> QualityStatus {
        self.status
    }

    fn set_status(&mut self, status: QualityStatus) {
        self.status = status;
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![self.title.as_str(), self.product.as_str()]
    }
}

impl FromForm for QualityCheck {
    const FIELDS: &'static [&'static str] = &[
        "title",
        "product",
        "check_type",
        "inspector",
        "tags",
        "remove_tags",
    ];

    fn from_form(form: &FormData, sequence_number: u32) -> Result<Self, ValidationErrors> {
        let mut v = FormValidator::new(form);
        v.reject_unknown_on_create(Self::FIELDS);
        let title = v.required("title");
        let product = v.required("product");
        let check_type = v.optional("check_type");
        let inspector = v.optional("inspector");
        let tags = v.list("tags");
        v.finish()?;

        let mut check = QualityCheck::new(title, product, sequence_number);
        if let Some(check_type) = check_type {
            check.check_type = check_type;
        }
        check.inspector = inspector;
        check.base.tags = tags;
        Ok(check)
    }

    fn update_from_form(form: &FormData) -> Result<QualityCheckUpdate, ValidationErrors> {
        let mut v = FormValidator::new(form);
        v.reject_unknown(Self::FIELDS);
        let update = QualityCheckUpdate {
            title: v.patch_required("title"),
            product: v.patch_required("product"),
            check_type: v.patch_required("check_type"),
            inspector: v.patch_optional("inspector"),
            add_tags: v.list("tags"),
            remove_tags: v.list("remove_tags"),
        };
        v.finish()?;
        Ok(update)
    }
}
