use clap::Args;
use time::format_description::well_known::Rfc3339;

use common::key_store::KeyStoreProvider;
use common::paste::EncryptedContent;
use common::service::PasteRecord;
use common::workflow::{PasteCrypto, RevealError};
use dropkey::api::pastes::ListPastes;
use dropkey::state::StateError;
use dropkey::ApiError;

#[derive(Args, Debug, Clone)]
pub struct List;

#[derive(Debug, thiserror::Error)]
pub enum ListError {
    #[error(transparent)]
    State(#[from] StateError),
    #[error("API error: {0}")]
    Api(#[from] ApiError),
}

/// Best-effort title for a listed paste
fn title_for<P: KeyStoreProvider>(crypto: &PasteCrypto<P>, record: &PasteRecord) -> String {
    let content = match EncryptedContent::try_from(record) {
        Ok(content) => content,
        Err(e) => return format!("(malformed: {})", e),
    };
    match crypto.reveal(&content, &record.id) {
        Ok(payload) => payload.title,
        Err(RevealError::KeyNotFound(_)) => "(no local key)".to_string(),
        Err(e) => format!("(unreadable: {})", e),
    }
}

#[async_trait::async_trait]
impl crate::cli::op::Op for List {
    type Error = ListError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let state = ctx.state()?;
        let identity = state.load_identity()?;
        let public_key = identity.public_key().to_base64();

        let records = ctx.client.call(ListPastes { public_key }).await?;
        if records.is_empty() {
            return Ok("No pastes found".to_string());
        }

        let crypto = PasteCrypto::new(state.key_store()?, identity);
        let output = records
            .iter()
            .map(|record| {
                let expires = record
                    .expires_at
                    .format(&Rfc3339)
                    .unwrap_or_else(|_| record.expires_at.to_string());
                format!(
                    "{} (expires: {}) {}",
                    record.id,
                    expires,
                    title_for(&crypto, record)
                )
            })
            .collect::<Vec<_>>()
            .join("\n");

        Ok(output)
    }
}
