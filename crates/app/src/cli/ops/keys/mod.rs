use clap::{Args, Subcommand};

pub mod list;
pub mod reconcile;

use crate::cli::op::Op;

crate::command_enum! {
    (List, list::List),
    (Reconcile, reconcile::Reconcile),
}

pub type KeysCommand = Command;

/// Inspect and repair the local content key store
#[derive(Args, Debug, Clone)]
pub struct Keys {
    #[command(subcommand)]
    pub command: KeysCommand,
}

#[async_trait::async_trait]
impl Op for Keys {
    type Error = OpError;
    type Output = OpOutput;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        self.command.execute(ctx).await
    }
}
