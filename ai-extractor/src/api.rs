use async_trait::async_trait;
use std::error::Error;

/// Trait for extracting structured data from raw text data
#[async_trait]
pub trait DataExtractor<T> {
    type E: Error + Send + Sync;
    async fn extract(&self, text: &str) -> Result<T, Self::E>;
}
