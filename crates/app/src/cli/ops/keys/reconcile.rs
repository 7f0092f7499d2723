use clap::Args;

use common::key_store::{KeyStoreError, MoveOutcome};
use dropkey::state::StateError;

/// Move a key left under an ephemeral id to the id the service assigned
#[derive(Args, Debug, Clone)]
pub struct Reconcile {
    /// Ephemeral id the key is stored under (tmp-...)
    pub ephemeral_id: String,
    /// Durable id of the paste
    pub durable_id: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    #[error(transparent)]
    State(#[from] StateError),
    #[error("failed to move key: {0}")]
    KeyStore(#[from] KeyStoreError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Reconcile {
    type Error = ReconcileError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let keys = ctx.state()?.key_store()?;
        let output = match keys.move_key(&self.ephemeral_id, &self.durable_id)? {
            MoveOutcome::Moved => format!("Moved key {} -> {}", self.ephemeral_id, self.durable_id),
            MoveOutcome::SourceRetained { reason } => format!(
                "Key stored under {}, but {} could not be removed: {}",
                self.durable_id, self.ephemeral_id, reason
            ),
        };
        Ok(output)
    }
}
