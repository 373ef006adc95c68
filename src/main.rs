use clap::Parser;
use shopping_cart_manager::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Command::Serve(args)) => cli::serve::run(args).await,
        None => cli::serve::run(Default::default()).await,
    }
}
