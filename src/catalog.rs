//! Catalog item registration. Stateless: stamps and returns the record,
//! nothing is stored and the chain is not touched.

use serde::{Deserialize, Serialize};

use crate::model::hash_concat;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Service {
    pub name: String,
    pub id: String,
    pub price: i64,
    pub isbn: String,
    pub created_at: String,
}

impl Service {
    /// Stamp `created_at` and derive `id` from the ISBN and creation time.
    pub fn register(mut self, created_at: String) -> Self {
        self.id = service_id(&self.isbn, &created_at);
        self.created_at = created_at;
        self
    }
}

/// 32 hex chars: the first 16 bytes of SHA-256(isbn || created_at).
pub fn service_id(isbn: &str, created_at: &str) -> String {
    let mut digest = hash_concat(&[isbn.as_bytes(), created_at.as_bytes()]);
    digest.truncate(32);
    digest
}
