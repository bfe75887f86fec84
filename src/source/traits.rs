use crate::model::{RawReading, SourceError};

/// Somewhere readings come from before they are validated and stored.
#[async_trait::async_trait]
pub trait ReadingSource: Send + Sync {
    async fn fetch(&self, user_id: &str) -> Result<Vec<RawReading>, SourceError>;
}
