use async_trait::async_trait;
use shared::ModelHandle;

use crate::{DomainError, TranscriptionOutput, TranscriptionRequest};

#[async_trait]
pub trait TranscriptionPort: ModelHandle {
    async fn transcribe(
        &self,
        request: TranscriptionRequest,
    ) -> Result<TranscriptionOutput, DomainError>;
}
