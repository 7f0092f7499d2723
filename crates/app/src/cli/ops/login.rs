use clap::Args;

use common::auth::{AuthChallengeBuilder, AuthError, SystemClock};
use common::identity::Identity;
use dropkey::state::{AppState, StateError};
use dropkey::{ApiClient, ApiError};

#[derive(Args, Debug, Clone)]
pub struct Login;

#[derive(Debug, thiserror::Error)]
pub enum LoginError {
    #[error("identity has no account id, run 'dropkey register'")]
    NotRegistered,
    #[error(transparent)]
    State(#[from] StateError),
    #[error("failed to build login challenge: {0}")]
    Auth(#[from] AuthError),
    #[error("API error: {0}")]
    Api(#[from] ApiError),
}

/// Authenticate the stored identity and return it with a session token
pub async fn authenticate(
    client: &ApiClient,
    state: &AppState,
) -> Result<(Identity, String), LoginError> {
    let identity = state.load_identity()?;
    let account_id = identity
        .account_id()
        .ok_or(LoginError::NotRegistered)?
        .to_string();

    let request = AuthChallengeBuilder::new(SystemClock).build(&identity, &account_id)?;
    let response = client.call(request).await?;
    tracing::debug!(account_id = %account_id, "authenticated");

    Ok((identity, response.token))
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Login {
    type Error = LoginError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let state = ctx.state()?;
        let (_, token) = authenticate(&ctx.client, &state).await?;
        Ok(token)
    }
}
