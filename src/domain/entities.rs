//! Domain entities mirrored from persistent storage.

use serde::Serialize;

/// A stored joke. Identifiers are assigned by the store and only ever grow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JokeRecord {
    pub id: i64,
    pub text: String,
}
