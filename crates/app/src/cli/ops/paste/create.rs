use std::path::PathBuf;
use std::time::Duration;

use clap::Args;

use common::workflow::{PasteCrypto, PublishError};
use dropkey::state::StateError;
use dropkey::ApiError;

use crate::cli::ops::login::{authenticate, LoginError};

const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

#[derive(Args, Debug, Clone)]
#[command(group(clap::ArgGroup::new("content").required(true).args(["body", "file"])))]
pub struct Create {
    /// Title, sealed together with the body
    #[arg(long)]
    pub title: String,

    /// Paste body
    #[arg(long)]
    pub body: Option<String>,

    /// Read the body from a file
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Days until the service deletes the paste
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..=7))]
    pub expiry_days: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum CreateError {
    #[error("failed to read {}: {1}", .0.display())]
    ReadBody(PathBuf, std::io::Error),
    #[error(transparent)]
    State(#[from] StateError),
    #[error(transparent)]
    Login(#[from] LoginError),
    #[error(transparent)]
    Publish(#[from] PublishError<ApiError>),
}

impl Create {
    async fn body(&self) -> Result<String, CreateError> {
        match (&self.body, &self.file) {
            (Some(body), _) => Ok(body.clone()),
            (None, Some(path)) => tokio::fs::read_to_string(path)
                .await
                .map_err(|e| CreateError::ReadBody(path.clone(), e)),
            // clap requires one of the two
            (None, None) => Ok(String::new()),
        }
    }
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Create {
    type Error = CreateError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let body = self.body().await?;
        let state = ctx.state()?;
        let (identity, token) = authenticate(&ctx.client, &state).await?;

        let crypto = PasteCrypto::new(state.key_store()?, identity);
        let expires_in = Duration::from_secs(self.expiry_days * SECONDS_PER_DAY);
        let published = crypto
            .publish(&self.title, &body, expires_in, &ctx.client, &token)
            .await?;

        let mut output = format!("Created paste {}", published.durable_id);
        if !published.url.is_empty() {
            output.push_str(&format!("\nURL: {}", published.url));
        }
        if let Some(warning) = published.warning {
            output.push_str(&format!(
                "\nWarning: {}\n  recover with: dropkey keys reconcile {} {}",
                warning, warning.ephemeral_id, warning.durable_id
            ));
        }

        Ok(output)
    }
}
