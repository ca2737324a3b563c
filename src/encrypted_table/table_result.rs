use crate::entity::Entity;

/// The outcome of a table operation.
///
/// `result` holds the entity as seen by the caller: plaintext values, with the etag and timestamp
/// assigned by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct TableResult {
    pub http_status_code: u16,
    pub etag: Option<String>,
    pub result: Option<Entity>,
}

impl TableResult {
    pub(crate) fn new(http_status_code: u16, result: Option<Entity>) -> Self {
        Self {
            http_status_code,
            etag: result.as_ref().and_then(|e| e.etag().map(str::to_string)),
            result,
        }
    }

    pub(crate) fn not_found() -> Self {
        Self::new(404, None)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.http_status_code)
    }

    pub fn into_entity(self) -> Option<Entity> {
        self.result
    }
}
