use clap::Args;

use dropkey::state::{AppConfig, AppState, StateError};

#[derive(Args, Debug, Clone)]
pub struct Init {
    /// Default log level written to the config
    #[arg(long, default_value = "warn")]
    pub log_level: String,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 5)]
    pub request_timeout_secs: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("init failed: {0}")]
    StateFailed(#[from] StateError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Init {
    type Error = InitError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let config = AppConfig {
            remote: ctx.client.base_url().clone(),
            log_level: self.log_level.clone(),
            request_timeout_secs: self.request_timeout_secs,
        };

        let state = AppState::init(ctx.config_path.clone(), Some(config))?;

        let output = format!(
            "Initialized dropkey directory at: {}\n\
             - Config: {}\n\
             - Identity: {} (run 'dropkey register')\n\
             - Keys: {}\n\
             - Remote: {}",
            state.dropkey_dir.display(),
            state.config_path.display(),
            state.identity_path.display(),
            state.keys_path.display(),
            state.config.remote,
        );

        Ok(output)
    }
}
