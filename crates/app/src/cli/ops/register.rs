use clap::Args;

use common::identity::IdentityError;
use common::service::RegisterUserRequest;
use dropkey::state::StateError;
use dropkey::ApiError;

#[derive(Args, Debug, Clone)]
pub struct Register;

#[derive(Debug, thiserror::Error)]
pub enum RegisterError {
    #[error("already registered as {0}")]
    AlreadyRegistered(String),
    #[error(transparent)]
    State(#[from] StateError),
    #[error(transparent)]
    Identity(#[from] IdentityError),
    #[error("API error: {0}")]
    Api(#[from] ApiError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Register {
    type Error = RegisterError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let state = ctx.state()?;
        let manager = state.identity_manager();

        match manager.load() {
            Ok(existing) => {
                return Err(RegisterError::AlreadyRegistered(
                    existing.account_id().unwrap_or_default().to_string(),
                ))
            }
            Err(IdentityError::NotRegistered) => {}
            Err(e) => return Err(e.into()),
        }

        let identity = manager.create()?;
        let response = ctx
            .client
            .call(RegisterUserRequest {
                public_key: identity.public_key().to_base64(),
            })
            .await?;

        let identity = identity.with_account_id(response.id);
        manager.save(&identity)?;
        tracing::info!(account_id = ?identity.account_id(), "registered identity");

        Ok(format!(
            "Registered account {}\nPublic key: {}",
            identity.account_id().unwrap_or_default(),
            identity.public_key()
        ))
    }
}
