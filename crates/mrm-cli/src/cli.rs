use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "mrm",
    about = "Merchant record manager over a key/value ledger",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Store file (overrides `store_path` from the config file)
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    /// TOML configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Record a deployment message and reset the merchant index
    Init(InitArgs),
    /// Create a merchant
    Create(MerchantArgs),
    /// Replace the fields of an existing merchant
    Update(MerchantArgs),
    /// Delete a merchant
    Delete(IdArgs),
    /// Show one merchant
    Get(IdArgs),
    /// List every indexed merchant in index order
    List,
    /// Call a mutating function by name with positional arguments
    Invoke(CallArgs),
    /// Call a read-only function by name with positional arguments
    Query(CallArgs),
    /// Compare the index with the stored records
    Check,
    /// Rebuild the index from the stored records
    Reconcile,
}

#[derive(Args, Debug)]
pub struct InitArgs {
    pub message: String,
}

#[derive(Args, Debug)]
pub struct MerchantArgs {
    pub id: String,
    pub name: String,
    pub logo: String,
    pub industry: String,
    /// Loyalty points per currency unit spent
    pub points: String,
    pub currency: String,
    pub exchange_rate: String,
    /// Create/update date
    pub date: String,
}

impl MerchantArgs {
    /// The positional argument list, in wire order.
    pub fn to_args(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.name.clone(),
            self.logo.clone(),
            self.industry.clone(),
            self.points.clone(),
            self.currency.clone(),
            self.exchange_rate.clone(),
            self.date.clone(),
        ]
    }
}

#[derive(Args, Debug)]
pub struct IdArgs {
    pub id: String,
}

#[derive(Args, Debug)]
pub struct CallArgs {
    pub function: String,
    #[arg(allow_hyphen_values = true)]
    pub args: Vec<String>,
}
