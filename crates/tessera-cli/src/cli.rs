use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};

use tessera_types::Reference;

#[derive(Parser)]
#[command(
    name = "tessera",
    about = "Content-addressed object store with schema-guided sync",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (overrides the config file)
    #[arg(long, global = true)]
    pub format: Option<OutputFormat>,

    /// Store directory (overrides the config file)
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    /// Config file; `tessera.toml` is used if present
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create an empty store
    Init,
    /// Show object and name counts
    Stat,
    /// Write a sample group/user graph and print its root
    Demo,
    /// Print the schema stored under a hash
    Schema(SchemaArgs),
    /// List bound schema names
    Names,
    /// Bind a name to a stored schema
    Bind(BindArgs),
    /// List the objects missing below a root
    Want(RootArgs),
    /// Fetch the objects missing below a root from another store
    Pull(PullArgs),
}

#[derive(Args)]
pub struct SchemaArgs {
    pub reference: Reference,
}

#[derive(Args)]
pub struct BindArgs {
    pub name: String,
    pub reference: Reference,
}

#[derive(Args)]
pub struct RootArgs {
    /// Hash of the root's schema
    #[arg(long)]
    pub schema: Reference,
    /// Hash of the root object
    #[arg(long)]
    pub object: Reference,
}

#[derive(Args)]
pub struct PullArgs {
    /// Store directory to pull from
    #[arg(long)]
    pub from: PathBuf,
    #[command(flatten)]
    pub root: RootArgs,
}
