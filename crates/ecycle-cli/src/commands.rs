use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use colored::Colorize;

use ecycle_chain::ChainConfig;
use ecycle_crypto::SigningKey;
use ecycle_identity::{BindingStore, FileBindingStore};
use ecycle_sdk::ServiceBuilder;

use crate::cli::{BindingsArgs, Cli, Command, DemoArgs, KeygenArgs};

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Demo(args) => cmd_demo(args).await,
        Command::Keygen(args) => cmd_keygen(args),
        Command::Bindings(args) => cmd_bindings(args),
    }
}

async fn cmd_demo(args: DemoArgs) -> anyhow::Result<()> {
    let mut builder = ServiceBuilder::new().chain_config(ChainConfig {
        block_interval: Duration::from_millis(args.block_ms),
        ..ChainConfig::default()
    });
    if let Some(path) = &args.bindings {
        let store: Arc<dyn BindingStore> = Arc::new(FileBindingStore::open(Path::new(path))?);
        builder = builder.binding_store(store);
    }
    let stack = builder.build();
    let sealer = stack.chain.spawn_sealer();

    println!("{} starting in-process chain", "✓".green().bold());

    let alice = stack.service.register("demo:alice").await?;
    let bob = stack.service.register("demo:bob").await?;
    println!(
        "{} registered recyclers {} and {}",
        "✓".green(),
        alice.short().yellow(),
        bob.short().yellow()
    );

    let (ewaste_id, minted) = stack
        .service
        .recycle("demo:alice", "crate of circuit boards", args.weight)
        .await?;
    println!(
        "{} alice recycled {} units → e-waste #{} minted {} ECY",
        "✓".green(),
        args.weight,
        ewaste_id,
        minted.to_string().bold()
    );

    let errand = stack
        .service
        .create_errand("demo:alice", "haul the crate to the depot", args.reward)
        .await?;
    let reward = stack.service.complete_errand("demo:bob", errand).await?;
    println!(
        "{} errand #{} completed by bob for {} ECY",
        "✓".green(),
        errand,
        reward.to_string().bold()
    );

    let depot = stack
        .service
        .register_buyer("demo:depot", "Depot Ltd", "Accra", "weighbridge on site")
        .await?;
    stack.service.verify_buyer(depot).await?;
    let recycler = stack.service.process_ewaste("demo:depot", ewaste_id).await?;
    println!(
        "{} buyer {} verified and processed e-waste #{} (recycler {})",
        "✓".green(),
        depot.short().yellow(),
        ewaste_id,
        recycler.short().yellow()
    );

    for (label, account) in [("alice", alice), ("bob", bob), ("depot", depot)] {
        let stats = stack.service.stats(account).await?;
        println!(
            "  {:<6} {}  balance {:>6} ECY  reputation {:>2}  recycled {:>4}",
            label.bold(),
            stats.account.short().dimmed(),
            stats.token_balance,
            stats.reputation,
            stats.recycled_amount
        );
    }
    println!(
        "  {:<6} supply {} ECY, escrow {} ECY",
        "totals".bold(),
        stack.service.total_supply().await?,
        stack.service.escrow_balance().await?
    );

    sealer.abort();
    Ok(())
}

fn cmd_keygen(args: KeygenArgs) -> anyhow::Result<()> {
    let key = SigningKey::generate();
    println!("address: {}", key.address().to_hex().yellow());
    if args.show_secret {
        println!("secret:  {}", hex::encode(key.as_bytes()));
    } else {
        println!("secret:  {} (rerun with --show-secret)", "<hidden>".dimmed());
    }
    Ok(())
}

fn cmd_bindings(args: BindingsArgs) -> anyhow::Result<()> {
    let store = FileBindingStore::open(Path::new(&args.file))?;
    let mut bindings = store.list()?;
    bindings.sort_by(|a, b| a.external_id.cmp(&b.external_id));
    if bindings.is_empty() {
        println!("No bindings stored.");
        return Ok(());
    }
    for binding in bindings {
        println!(
            "{}  →  {}",
            binding.external_id.bold(),
            binding.address.to_hex().yellow()
        );
    }
    Ok(())
}
