use clap::{Args, Subcommand};

pub mod create;
pub mod list;
pub mod show;

use crate::cli::op::Op;

crate::command_enum! {
    (Create, create::Create),
    (Show, show::Show),
    (List, list::List),
}

pub type PasteCommand = Command;

#[derive(Args, Debug, Clone)]
pub struct Paste {
    #[command(subcommand)]
    pub command: PasteCommand,
}

#[async_trait::async_trait]
impl Op for Paste {
    type Error = OpError;
    type Output = OpOutput;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        self.command.execute(ctx).await
    }
}
