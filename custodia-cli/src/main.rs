//! Custodia CLI for key management and lookup-digest tooling.

#![warn(clippy::pedantic, clippy::nursery)]

use anyhow::Context;
use clap::{Parser, Subcommand};
use custodia::search_hash::search_digest;
use custodia_key_file::FileKeyProvider;

#[derive(Parser)]
#[command(name = "custodia")]
#[command(about = "Custodia key management CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a new field-cipher key
    Keygen {
        /// Output directory for the key
        #[arg(short, long, default_value = "./keys")]
        output: String,
    },
    /// Compute the lookup digest for an identifier
    Digest {
        /// Identifier to digest (normalized before hashing)
        value: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Keygen { output } => {
            FileKeyProvider::init(&output)
                .with_context(|| format!("generating key in {output}"))?;
            println!("Key written to {output}");
        }
        Commands::Digest { value } => {
            println!("{}", search_digest(&value));
        }
    }

    Ok(())
}
