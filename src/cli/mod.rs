//! CLI module for the shopping cart service

pub mod serve;

use clap::{Parser, Subcommand};

/// Shopping cart backend - item catalog and cart rendering over HTTP
#[derive(Parser)]
#[command(name = "shopping-cart-manager")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP server (default)
    Serve(serve::ServeArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_parses() {
        let cli = Cli::try_parse_from(["shopping-cart-manager"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_serve_overrides() {
        let cli =
            Cli::try_parse_from(["shopping-cart-manager", "serve", "--port", "9000"]).unwrap();

        match cli.command {
            Some(Command::Serve(args)) => {
                assert_eq!(args.port, Some(9000));
                assert!(args.host.is_none());
            }
            None => panic!("expected serve command"),
        }
    }
}
