use serde::{Deserialize, Serialize};

use super::{Entity, EntityBase, EntityKind};
use crate::collection::{reorder, Patch};
use crate::error::{Result, ValidationErrors};
use crate::panel::{FormData, FormValidator, FromForm};
use crate::status::{BadgeStyle, Status, StatusFlow};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SignatureStatus {
    #[default]
    Draft,
    Sent,
    Completed,
}

impl std::fmt::Display for SignatureStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::str::FromStr for SignatureStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "draft" => Ok(SignatureStatus::Draft),
            "sent" => Ok(SignatureStatus::Sent),
            "completed" | "signed" => Ok(SignatureStatus::Completed),
            _ => Err(format!("Invalid signature status: {}", s)),
        }
    }
}

impl Status for SignatureStatus {
    const ALL: &'static [Self] = &[
        SignatureStatus::Draft,
        SignatureStatus::Sent,
        SignatureStatus::Completed,
    ];
    const FLOW: StatusFlow<Self> = StatusFlow::Cycle;

    fn badge(self) -> BadgeStyle {
        match self {
            SignatureStatus::Draft => BadgeStyle::Neutral,
            SignatureStatus::Sent => BadgeStyle::Progress,
            SignatureStatus::Completed => BadgeStyle::Success,
        }
    }

    fn label(self) -> &'static str {
        match self {
            SignatureStatus::Draft => "draft",
            SignatureStatus::Sent => "sent",
            SignatureStatus::Completed => "completed",
        }
    }
}

/// One step of the signing order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signer {
    pub name: String,
    pub email: Option<String>,
    pub signed: bool,
}

impl Signer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: None,
            signed: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignatureRequest {
    #[serde(flatten)]
    pub base: EntityBase,
    pub title: String,
    /// Name of the document to be signed
    pub document: String,
    /// Signers in signing order
    pub signers: Vec<Signer>,
    pub status: SignatureStatus,
}

impl SignatureRequest {
    pub fn new(title: String, document: String, sequence_number: u32) -> Self {
        Self {
            base: EntityBase::new(sequence_number),
            title,
            document,
            signers: Vec::new(),
            status: SignatureStatus::default(),
        }
    }

    /// Signing order with the step at `from` moved to `to`.
    pub fn reordered_signers(&self, from: usize, to: usize) -> Result<Vec<Signer>> {
        reorder(self.signers.clone(), from, to)
    }

    pub fn signed_count(&self) -> usize {
        self.signers.iter().filter(|s| s.signed).count()
    }
}

/// Signers listed by `names`, keeping the existing entry (email, signed) for
/// every name still present. Unknown names join unsigned.
fn merge_signers(mut existing: Vec<Signer>, names: Vec<String>) -> Vec<Signer> {
    names
        .into_iter()
        .map(|name| match existing.iter().position(|s| s.name == name) {
            Some(i) => existing.remove(i),
            None => Signer::new(name),
        })
        .collect()
}

/// Update payload for a signature request
#[derive(Debug, Clone, Default)]
pub struct SignatureUpdate {
    pub title: Option<String>,
    pub document: Option<String>,
    /// Signer names in the new signing order
    pub signers: Option<Vec<String>>,
    pub status: Option<SignatureStatus>,
    pub add_tags: Vec<String>,
    pub remove_tags: Vec<String>,
}

impl Patch<SignatureRequest> for SignatureUpdate {
    fn apply(self, request: &mut SignatureRequest) {
        if let Some(title) = self.title {
            request.title = title;
        }
        if let Some(document) = self.document {
            request.document = document;
        }
        if let Some(names) = self.signers {
            request.signers = merge_signers(std::mem::take(&mut request.signers), names);
        }
        if let Some(status) = self.status {
            request.status = status;
        }
        request
            .base
            .apply_tag_changes(self.add_tags, &self.remove_tags);
    }
}

impl Entity for SignatureRequest {
    type Status = SignatureStatus;
    type Update = SignatureUpdate;

    const KIND: EntityKind = EntityKind::Signature;

    fn base(&self) -> &EntityBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut EntityBase {
        &mut self.base
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn status(&self) -> SignatureStatus {
        self.status
    }

    fn set_status(&mut self, status: SignatureStatus) {
        self.status = status;
    }

    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.title.as_str(), self.document.as_str()];
        fields.extend(self.signers.iter().map(|s| s.name.as_str()));
        fields
    }
}

impl FromForm for SignatureRequest {
    const FIELDS: &'static [&'static str] = &[
        "title",
        "document",
        "signers",
        "status",
        "tags",
        "remove_tags",
    ];

    fn from_form(
        form: &FormData,
        sequence_number: u32,
    ) -> std::result::Result<Self, ValidationErrors> {
        let mut v = FormValidator::new(form);
        v.reject_unknown_on_create(Self::FIELDS);
        let title = v.required("title");
        let document = v.required("document");
        let signers = v.list("signers");
        let status = v.status::<SignatureStatus>("status");
        let tags = v.list("tags");
        v.finish()?;

        let mut request = SignatureRequest::new(title, document, sequence_number);
        request.signers = signers.into_iter().map(Signer::new).collect();
        request.status = status.unwrap_or_default();
        request.base.tags = tags;
        Ok(request)
    }

    fn update_from_form(form: &FormData) -> std::result::Result<SignatureUpdate, ValidationErrors> {
        let mut v = FormValidator::new(form);
        v.reject_unknown(Self::FIELDS);
        let signers = if form.contains("signers") {
            Some(v.list("signers"))
        } else {
            None
        };
        let update = SignatureUpdate {
            title: v.patch_required("title"),
            document: v.patch_required("document"),
            signers,
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
    use crate::error::OpsdeskError;

    fn request_with_signers(names: &[&str]) -> SignatureRequest {
        let mut request = SignatureRequest::new("NDA".into(), "nda.pdf".into(), 1);
        request.signers = names.iter().map(|n| Signer::new(*n)).collect();
        request
    }

    #[test]
    fn test_reordered_signers_leaves_original() {
        let request = request_with_signers(&["Ann", "Bob", "Cy"]);

        let reordered = request.reordered_signers(2, 0).unwrap();

        let names: Vec<&str> = reordered.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Cy", "Ann", "Bob"]);
        assert_eq!(request.signers[0].name, "Ann");
    }

    #[test]
    fn test_reorder_out_of_range() {
        let request = request_with_signers(&["Ann"]);
        let err = request.reordered_signers(0, 1).unwrap_err();
        assert!(matches!(err, OpsdeskError::IndexOutOfRange { .. }));
    }

    #[test]
    fn test_from_form_builds_signers_in_order() {
        let form = FormData::new()
            .with("title", "Supplier contract")
            .with("document", "contract.pdf")
            .with("signers", "Ann, Bob");

        let request = SignatureRequest::from_form(&form, 1).unwrap();

        assert_eq!(request.signers.len(), 2);
        assert_eq!(request.signers[1].name, "Bob");
        assert_eq!(request.signed_count(), 0);
    }

    #[test]
    fn test_editing_signers_keeps_signed_state() {
        let mut request = request_with_signers(&["Ann", "Bob"]);
        request.signers[0].signed = true;
        request.signers[0].email = Some("ann@example.com".into());

        let form = FormData::new().with("signers", "Bob, Ann, Cy");
        SignatureRequest::update_from_form(&form)
            .unwrap()
            .apply(&mut request);

        let names: Vec<&str> = request.signers.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Bob", "Ann", "Cy"]);
        assert!(request.signers[1].signed);
        assert_eq!(request.signers[1].email.as_deref(), Some("ann@example.com"));
        assert!(!request.signers[2].signed);
        assert_eq!(request.signed_count(), 1);
    }

    #[test]
    fn test_dropped_signer_is_removed() {
        let mut request = request_with_signers(&["Ann", "Bob"]);
        request.signers[1].signed = true;

        SignatureUpdate {
            signers: Some(vec!["Ann".into()]),
            ..Default::default()
        }
        .apply(&mut request);

        assert_eq!(request.signers, vec![Signer::new("Ann")]);
    }

    #[test]
    fn test_search_fields_include_signers() {
        let request = request_with_signers(&["Ann"]);
        assert!(request.search_fields().contains(&"Ann"));
    }
}
