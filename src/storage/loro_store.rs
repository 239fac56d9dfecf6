use std::fs;
use std::path::{Path, PathBuf};

use loro::{LoroDoc, LoroMap, LoroValue, ValueOrContainer};

use crate::collection::CollectionStore;
use crate::entity::Entity;
use crate::error::{OpsdeskError, Result};

pub const DESK_DIR: &str = ".opsdesk";
const DESK_DOC: &str = "desk.loro";
const META: &str = "_meta";
const REVISION: &str = "revision";

/// Workspace document: one Loro map per module collection, each record
/// stored as `{position, json}` under its id.
pub struct LoroStore {
    doc: LoroDoc,
    dir: PathBuf,
    path: PathBuf,
    /// Revision the document had when it was opened or last saved
    loaded_revision: i64,
}

impl LoroStore {
    /// Initialize a new opsdesk workspace
    pub fn init(root: &Path) -> Result<Self> {
        let dir = root.join(DESK_DIR);

        if dir.exists() {
            return Err(OpsdeskError::AlreadyInitialized);
        }

        fs::create_dir_all(&dir)?;

        let doc = LoroDoc::new();
        doc.get_map(META).insert(REVISION, 0_i64)?;
        doc.commit();

        let path = dir.join(DESK_DOC);
        let store = Self {
            doc,
            dir,
            path,
            loaded_revision: 0,
        };
        store.write_snapshot()?;
        tracing::info!(path = %store.path.display(), "initialized workspace");

        Ok(store)
    }

    /// Open an existing opsdesk workspace
    pub fn open(root: &Path) -> Result<Self> {
        let dir = root.join(DESK_DIR);
        let path = dir.join(DESK_DOC);

        if !path.exists() {
            return Err(OpsdeskError::NotInitialized);
        }

        let doc = read_doc(&path)?;
        let loaded_revision = revision_of(&doc);
        tracing::debug!(path = %path.display(), revision = loaded_revision, "opened workspace");

        Ok(Self {
            doc,
            dir,
            path,
            loaded_revision,
        })
    }

    /// Write the document to disk, bumping the revision.
    ///
    /// Fails with `Conflict` if another writer saved since this store was
    /// opened; nothing is written in that case.
    pub fn save(&mut self) -> Result<()> {
        let on_disk = if self.path.exists() {
            revision_of(&read_doc(&self.path)?)
        } else {
            0
        };
        if on_disk != self.loaded_revision {
            tracing::warn!(expected = self.loaded_revision, found = on_disk, "revision conflict");
            return Err(OpsdeskError::Conflict {
                expected: self.loaded_revision,
                found: on_disk,
            });
        }

        let next = self.loaded_revision + 1;
        self.doc.get_map(META).insert(REVISION, next)?;
        self.doc.commit();
        self.write_snapshot()?;
        self.loaded_revision = next;
        tracing::debug!(revision = next, "saved workspace");
        Ok(())
    }

    /// The `.opsdesk` directory
    pub fn desk_dir(&self) -> &Path {
        &self.dir
    }

    pub fn revision(&self) -> i64 {
        self.loaded_revision
    }

    /// All records of one module, in stored order.
    pub fn load<E: Entity>(&self) -> Result<Vec<E>> {
        let map = self.doc.get_map(E::KIND.collection_name());
        let mut rows: Vec<(i64, E)> = Vec::new();

        if let LoroValue::Map(entries) = map.get_deep_value() {
            for (id, value) in entries.iter() {
                let LoroValue::Map(entry) = value else {
                    continue;
                };
                let position = match entry.get("position") {
                    Some(LoroValue::I64(n)) => *n,
                    _ => i64::MAX,
                };
                let json = match entry.get("json") {
                    Some(LoroValue::String(s)) => s.to_string(),
                    _ => {
                        return Err(OpsdeskError::Storage(format!(
                            "record {} in {} has no payload",
                            id,
                            E::KIND.collection_name()
                        )))
                    }
                };
                rows.push((position, serde_json::from_str(&json)?));
            }
        }

        rows.sort_by_key(|(position, _)| *position);
        Ok(rows.into_iter().map(|(_, entity)| entity).collect())
    }

    pub fn load_store<E: Entity>(&self) -> Result<CollectionStore<E>> {
        CollectionStore::from_entities(self.load()?)
    }

    /// Replace the stored collection with `entities`, keeping their order.
    pub fn persist<E: Entity>(&self, entities: &[E]) -> Result<()> {
        let map = self.doc.get_map(E::KIND.collection_name());

        let stale: Vec<String> = match map.get_deep_value() {
            LoroValue::Map(entries) => entries
                .keys()
                .filter(|id| !entities.iter().any(|e| e.id() == id.as_str()))
                .cloned()
                .collect(),
            _ => Vec::new(),
        };
        for id in &stale {
            map.delete(id)?;
        }

        for (position, entity) in entities.iter().enumerate() {
            let entry = match map.get(entity.id()) {
                Some(ValueOrContainer::Container(loro::Container::Map(entry))) => entry,
                _ => map.get_or_create_container(entity.id(), LoroMap::new())?,
            };
            entry.insert("position", position as i64)?;
            entry.insert("json", serde_json::to_string(entity)?)?;
        }

        self.doc.commit();
        tracing::debug!(
            collection = E::KIND.collection_name(),
            records = entities.len(),
            removed = stale.len(),
            "persisted collection"
        );
        Ok(())
    }

    fn write_snapshot(&self) -> Result<()> {
        let bytes = self.doc.export(loro::ExportMode::Snapshot)?;
        fs::write(&self.path, bytes)?;
        Ok(())
    }
}

fn read_doc(path: &Path) -> Result<LoroDoc> {
    let bytes = fs::read(path)?;
    let doc = LoroDoc::new();
    doc.import(&bytes)?;
    Ok(doc)
}

fn revision_of(doc: &LoroDoc) -> i64 {
    match doc.get_map(META).get(REVISION) {
        Some(ValueOrContainer::Value(LoroValue::I64(n))) => n,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Contact, Invoice, InvoiceStatus, SignatureRequest, Signer};
    use tempfile::TempDir;

    #[test]
    fn test_init_creates_desk_directory() {
        let tmp = TempDir::new().unwrap();
        let _store = LoroStore::init(tmp.path()).unwrap();

        assert!(tmp.path().join(".opsdesk").exists());
        assert!(tmp.path().join(".opsdesk/desk.loro").exists());
    }

    #[test]
    fn test_init_fails_if_already_initialized() {
        let tmp = TempDir::new().unwrap();
        LoroStore::init(tmp.path()).unwrap();

        let result = LoroStore::init(tmp.path());
        assert!(matches!(result, Err(OpsdeskError::AlreadyInitialized)));
    }

    #[test]
    fn test_open_fails_if_not_initialized() {
        let tmp = TempDir::new().unwrap();

        let result = LoroStore::open(tmp.path());
        assert!(matches!(result, Err(OpsdeskError::NotInitialized)));
    }

    #[test]
    fn test_persist_and_load_keeps_order() {
        let tmp = TempDir::new().unwrap();
        let mut store = LoroStore::init(tmp.path()).unwrap();

        let mut paid = Invoice::new("INV-002".into(), "XYZ Industries".into(), 80.0, 2);
        paid.status = InvoiceStatus::Paid;
        let draft = Invoice::new("INV-001".into(), "Acme Corporation".into(), 1250.0, 1);
        store.persist(&[paid, draft]).unwrap();
        store.save().unwrap();

        // Reopen and verify
        let reopened = LoroStore::open(tmp.path()).unwrap();
        let invoices: Vec<Invoice> = reopened.load().unwrap();

        assert_eq!(invoices.len(), 2);
        assert_eq!(invoices[0].number, "INV-002");
        assert_eq!(invoices[0].status, InvoiceStatus::Paid);
        assert_eq!(invoices[1].amount, 1250.0);
        assert!(reopened.load::<Contact>().unwrap().is_empty());
    }

    #[test]
    fn test_persist_drops_removed_records() {
        let tmp = TempDir::new().unwrap();
        let mut store = LoroStore::init(tmp.path()).unwrap();
        let a = Contact::new("Ann".into(), "ann@example.com".into(), 1);
        let b = Contact::new("Bob".into(), "bob@example.com".into(), 2);

        store.persist(&[a.clone(), b]).unwrap();
        store.persist(&[a.clone()]).unwrap();
        store.save().unwrap();

        let contacts: Vec<Contact> = LoroStore::open(tmp.path()).unwrap().load().unwrap();
        assert_eq!(contacts.len(), 1);
        assert_eq!(contacts[0].base.id, a.base.id);
    }

    #[test]
    fn test_nested_fields_survive_round_trip() {
        let tmp = TempDir::new().unwrap();
        let mut store = LoroStore::init(tmp.path()).unwrap();
        let mut request = SignatureRequest::new("NDA".into(), "nda.pdf".into(), 1);
        request.signers = vec![Signer::new("Ann"), Signer::new("Bob")];
        request.signers[0].signed = true;

        store.persist(&[request]).unwrap();
        store.save().unwrap();

        let loaded = LoroStore::open(tmp.path())
            .unwrap()
            .load_store::<SignatureRequest>()
            .unwrap();
        let signers = &loaded.list()[0].signers;
        assert_eq!(signers.len(), 2);
        assert!(signers[0].signed);
        assert_eq!(signers[1].name, "Bob");
    }

    #[test]
    fn test_save_bumps_revision() {
        let tmp = TempDir::new().unwrap();
        let mut store = LoroStore::init(tmp.path()).unwrap();
        assert_eq!(store.revision(), 0);

        store.save().unwrap();
        store.save().unwrap();

        assert_eq!(store.revision(), 2);
        assert_eq!(LoroStore::open(tmp.path()).unwrap().revision(), 2);
    }

    #[test]
    fn test_stale_writer_gets_conflict() {
        let tmp = TempDir::new().unwrap();
        LoroStore::init(tmp.path()).unwrap();
        let mut first = LoroStore::open(tmp.path()).unwrap();
        let mut second = LoroStore::open(tmp.path()).unwrap();

        first
            .persist(&[Contact::new("Ann".into(), "ann@example.com".into(), 1)])
            .unwrap();
        first.save().unwrap();

        second
            .persist(&[Contact::new("Bob".into(), "bob@example.com".into(), 1)])
            .unwrap();
        let err = second.save().unwrap_err();

        assert!(matches!(
            err,
            OpsdeskError::Conflict {
                expected: 0,
                found: 1
            }
        ));
        let contacts: Vec<Contact> = LoroStore::open(tmp.path()).unwrap().load().unwrap();
        assert_eq!(contacts[0].name, "Ann");
    }
}
