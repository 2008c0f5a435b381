//! Document store: the single owner of the current résumé.
//!
//! The store holds an immutable [`Document`] value, applies edits through
//! the pure transition function and publishes every new value on a
//! watch channel. Every effective edit is auto-saved to the configured
//! [`Storage`] under [`STORAGE_KEY`].
//!
//! # Example
//!
//! ```
//! use cvbuilder::model::{Edit, PersonalInfoPatch};
//! use cvbuilder::store::Store;
//!
//! let mut store = Store::in_memory();
//! store.dispatch(Edit::UpdatePersonalInfo(PersonalInfoPatch {
//!     full_name: Some("Ada Lovelace".into()),
//!     ..Default::default()
//! }));
//! assert_eq!(store.document().personal_info.full_name, "Ada Lovelace");
//! ```

use crate::error::{Error, Result};
use crate::filename;
use crate::model::{transition, Document, Edit};
use crate::render::{to_json, JsonFormat};
use crate::storage::{MemoryStorage, Storage};
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::watch;

/// Storage key under which the document is persisted.
pub const STORAGE_KEY: &str = "cv-builder-data";

/// A serialized document ready to be written out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonExport {
    /// Suggested filename (`<Full_Name>_CV.json`)
    pub filename: String,
    /// Pretty-printed document
    pub content: String,
}

/// Owner of the current document.
pub struct Store {
    storage: Arc<dyn Storage>,
    tx: watch::Sender<Arc<Document>>,
}

impl Store {
    /// Create a store backed by `storage`, loading any saved document.
    ///
    /// Load failures are logged and leave the default document in place.
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        let (tx, _) = watch::channel(Arc::new(Document::new()));
        let mut store = Self { storage, tx };
        store.load();
        store
    }

    /// Create a store backed by process memory.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }

    /// The current document.
    pub fn document(&self) -> Arc<Document> {
        self.tx.borrow().clone()
    }

    /// Subscribe to document changes.
    pub fn subscribe(&self) -> watch::Receiver<Arc<Document>> {
        self.tx.subscribe()
    }

    /// Apply an edit. Returns `true` when the document changed.
    pub fn dispatch(&mut self, edit: Edit) -> bool {
        let name = edit.name();
        let current = self.document();
        match transition(&current, edit, Utc::now()) {
            Some(next) => {
                log::debug!("Applied edit {}", name);
                self.tx.send_replace(Arc::new(next));
                self.save();
                true
            }
            None => {
                log::debug!("Edit {} left the document unchanged", name);
                false
            }
        }
    }

    /// Persist the current document. Failures are logged, never returned.
    pub fn save(&self) {
        if let Err(e) = self.try_save() {
            log::warn!("Failed to save CV data to storage: {}", e);
        }
    }

    fn try_save(&self) -> Result<()> {
        let json = to_json(&self.document(), JsonFormat::Compact)?;
        self.storage.set(STORAGE_KEY, &json)
    }

    /// Reload the document from storage. Returns `true` when a saved
    /// document was found and loaded.
    ///
    /// An empty slot keeps the current document. A slot that cannot be
    /// read or parsed resets to the default document.
    pub fn load(&mut self) -> bool {
        match self.try_load() {
            Ok(Some(doc)) => {
                self.tx.send_replace(Arc::new(doc));
                true
            }
            Ok(None) => false,
            Err(e) => {
                log::warn!("Failed to load CV data from storage: {}", e);
                self.tx.send_replace(Arc::new(Document::new()));
                false
            }
        }
    }

    fn try_load(&self) -> Result<Option<Document>> {
        match self.storage.get(STORAGE_KEY)? {
            Some(text) => Document::from_json(&text).map(Some),
            None => Ok(None),
        }
    }

    /// Serialize the current document for download.
    pub fn export_json(&self) -> Result<JsonExport> {
        let doc = self.document();
        Ok(JsonExport {
            filename: filename::json_export_name(&doc.personal_info.full_name),
            content: to_json(&doc, JsonFormat::Pretty)?,
        })
    }

    /// Replace the document with one parsed from JSON text.
    ///
    /// The text must parse into a valid document; on failure the current
    /// document is kept and the error is returned.
    pub fn import_json(&mut self, text: &str) -> Result<()> {
        let doc = Document::from_json(text).map_err(|e| {
            log::error!("Failed to import CV data: {}", e);
            match e {
                Error::InvalidDocument(_) => e,
                other => Error::InvalidDocument(other.to_string()),
            }
        })?;
        self.dispatch(Edit::Load(Box::new(doc)));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Experience, PersonalInfoPatch};

    #[test]
    fn test_dispatch_autosaves() {
        let storage = Arc::new(MemoryStorage::new());
        let mut store = Store::new(storage.clone());
        assert!(storage.get(STORAGE_KEY).unwrap().is_none());

        assert!(store.dispatch(Edit::AddExperience(Experience::new("e1", "Dev", "Acme"))));
        let saved = storage.get(STORAGE_KEY).unwrap().unwrap();
        assert!(saved.contains("\"Acme\""));
    }

    #[test]
    fn test_noop_dispatch_skips_save() {
        let storage = Arc::new(MemoryStorage::new());
        let mut store = Store::new(storage.clone());
        assert!(!store.dispatch(Edit::DeleteSkill("missing".into())));
        assert!(storage.get(STORAGE_KEY).unwrap().is_none());
    }

    #[test]
    fn test_load_on_startup() {
        let storage = Arc::new(MemoryStorage::new());
        {
            let mut store = Store::new(storage.clone());
            store.dispatch(Edit::UpdatePersonalInfo(PersonalInfoPatch {
                full_name: Some("Grace Hopper".into()),
                ..Default::default()
            }));
        }
        let store = Store::new(storage);
        assert_eq!(store.document().personal_info.full_name, "Grace Hopper");
    }

    #[test]
    fn test_reload_of_corrupt_slot_resets_document() {
        let storage = Arc::new(MemoryStorage::new());
        let mut store = Store::new(storage.clone());
        store.dispatch(Edit::UpdatePersonalInfo(PersonalInfoPatch {
            full_name: Some("Grace Hopper".into()),
            ..Default::default()
        }));
        storage.set(STORAGE_KEY, "{\"personalInfo\": 7}").unwrap();

        assert!(!store.load());
        assert_eq!(store.document().personal_info.full_name, "Your Name");
    }

    #[test]
    fn test_reload_of_empty_slot_keeps_document() {
        let storage = Arc::new(MemoryStorage::new());
        let mut store = Store::new(storage.clone());
        store.dispatch(Edit::UpdatePersonalInfo(PersonalInfoPatch {
            full_name: Some("Grace Hopper".into()),
            ..Default::default()
        }));
        storage.remove(STORAGE_KEY).unwrap();

        assert!(!store.load());
        assert_eq!(store.document().personal_info.full_name, "Grace Hopper");
    }

    #[test]
    fn test_corrupt_storage_falls_back_to_default() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set(STORAGE_KEY, "{corrupt").unwrap();
        let store = Store::new(storage);
        assert_eq!(store.document().personal_info.full_name, "Your Name");
    }

    #[test]
    fn test_import_invalid_keeps_document() {
        let mut store = Store::in_memory();
        let before = store.document();
        assert!(matches!(
            store.import_json("[1, 2, 3]"),
            Err(Error::InvalidDocument(_))
        ));
        assert_eq!(store.document(), before);
    }

    #[test]
    fn test_export_json_filename() {
        let mut store = Store::in_memory();
        store.dispatch(Edit::UpdatePersonalInfo(PersonalInfoPatch {
            full_name: Some("Ada King Lovelace".into()),
            ..Default::default()
        }));
        let export = store.export_json().unwrap();
        assert_eq!(export.filename, "Ada_King_Lovelace_CV.json");
        assert!(export.content.contains("\"fullName\": \"Ada King Lovelace\""));
    }

    #[test]
    fn test_subscribe_sees_updates() {
        let mut store = Store::in_memory();
        let mut rx = store.subscribe();
        store.dispatch(Edit::DeleteExperience("none".into()));
        assert!(!rx.has_changed().unwrap());
        store.dispatch(Edit::AddExperience(Experience::new("e1", "Dev", "Acme")));
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().experiences.len(), 1);
    }
}
