use clap::Args;

use common::key_store::{is_ephemeral_id, KeyStoreError};
use dropkey::state::StateError;

#[derive(Args, Debug, Clone)]
pub struct List;

#[derive(Debug, thiserror::Error)]
pub enum KeysListError {
    #[error(transparent)]
    State(#[from] StateError),
    #[error(transparent)]
    KeyStore(#[from] KeyStoreError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for List {
    type Error = KeysListError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let ids = ctx.state()?.key_store()?.ids()?;
        if ids.is_empty() {
            return Ok("No keys found".to_string());
        }

        let output = ids
            .iter()
            .map(|id| {
                if is_ephemeral_id(id) {
                    format!("{} (ephemeral, not reconciled)", id)
                } else {
                    id.clone()
                }
            })
            .collect::<Vec<_>>()
            .join("\n");
        Ok(output)
    }
}
