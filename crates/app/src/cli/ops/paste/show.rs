use clap::Args;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use common::paste::EncryptedContent;
use common::service::RecordError;
use common::workflow::{PasteCrypto, RevealError};
use dropkey::api::pastes::GetPaste;
use dropkey::state::StateError;
use dropkey::ApiError;

#[derive(Args, Debug, Clone)]
pub struct Show {
    /// Durable id of the paste
    pub id: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ShowError {
    #[error(transparent)]
    State(#[from] StateError),
    #[error("API error: {0}")]
    Api(#[from] ApiError),
    #[error("service returned a malformed paste: {0}")]
    Record(#[from] RecordError),
    #[error("cannot open paste: {0}")]
    Reveal(#[from] RevealError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Show {
    type Error = ShowError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let state = ctx.state()?;
        let identity = state.load_identity()?;

        let id = self.id.clone();
        let record = ctx.client.call(GetPaste { id }).await?;
        let content = EncryptedContent::try_from(&record)?;

        let crypto = PasteCrypto::new(state.key_store()?, identity);
        let payload = crypto.reveal(&content, &self.id)?;

        let expires = content
            .expires_at
            .format(&Rfc3339)
            .unwrap_or_else(|_| content.expires_at.to_string());
        let expiry_note = if content.is_expired(OffsetDateTime::now_utc()) {
            format!("expired {}", expires)
        } else {
            format!("expires {}", expires)
        };

        Ok(format!(
            "{}\n({}, signed by {})\n\n{}",
            payload.title, expiry_note, content.signer, payload.body
        ))
    }
}
