use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "ecycle",
    about = "Ecycle — recycling-rewards ledger toolkit",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run a scripted recycle/errand/buyer scenario on an in-process chain
    Demo(DemoArgs),
    /// Generate a fresh account keypair
    Keygen(KeygenArgs),
    /// List the wallets in a binding file
    Bindings(BindingsArgs),
}

#[derive(Args)]
pub struct DemoArgs {
    /// E-waste weight the demo recycler submits
    #[arg(long, default_value = "5")]
    pub weight: u128,
    /// Reward escrowed on the demo errand
    #[arg(long, default_value = "30")]
    pub reward: u128,
    /// Persist identity bindings to this JSON file
    #[arg(long)]
    pub bindings: Option<String>,
    /// Seal interval of the in-process chain, in milliseconds
    #[arg(long, default_value = "50")]
    pub block_ms: u64,
}

#[derive(Args)]
pub struct KeygenArgs {
    /// Print the secret key as well as the address
    #[arg(long)]
    pub show_secret: bool,
}

#[derive(Args)]
pub struct BindingsArgs {
    /// Path to the binding file
    pub file: String,
}
