//! Page state and where it is kept between requests.

use std::collections::HashMap;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use horizon_tabula_core::Result;

/// One serialized control.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlRecord {
    pub kind: String,
    pub id: String,
    pub data: serde_json::Value,
}

/// The serialized control tree of a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageState {
    pub page_id: String,
    pub controls: Vec<ControlRecord>,
}

/// Storage for serialized pages, keyed by page ID.
///
/// Implementations serialize access per page so that two requests of the
/// same user never interleave on one page state.
pub trait StateStore: Send + Sync {
    fn load(&self, page_id: &str) -> Result<Option<Vec<u8>>>;

    fn save(&self, page_id: &str, bytes: Vec<u8>) -> Result<()>;

    fn remove(&self, page_id: &str) -> Result<()>;
}

/// In-memory [`StateStore`], for tests and single-process servers.
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    pages: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.pages.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.read().is_empty()
    }
}

impl StateStore for MemoryStateStore {
    fn load(&self, page_id: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.pages.read().get(page_id).cloned())
    }

    fn save(&self, page_id: &str, bytes: Vec<u8>) -> Result<()> {
        tracing::trace!(target: "horizon_tabula::state", page = page_id, bytes = bytes.len(), "page state stored");
        self.pages.write().insert(page_id.to_string(), bytes);
        Ok(())
    }

    fn remove(&self, page_id: &str) -> Result<()> {
        self.pages.write().remove(page_id);
        Ok(())
    }
}

static_assertions::assert_impl_all!(MemoryStateStore: Send, Sync);
