//! Command Line Interface for the Himera position history tracker.
use alloy::primitives::Address;
use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use himera_chain::prelude::*;
use himera_domain::{BlockRange, PoolId, Position, PositionRow, TokenSymbols};
use himera_tracker::prelude::*;
use prettytable::{Table, row};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "himera-positions")]
#[command(about = "Liquidity position history for the Himera pools", long_about = None)]
struct Cli {
    /// JSON-RPC endpoint
    #[arg(long, env = "RPC_URL", default_value = "http://localhost:8545", global = true)]
    rpc_url: String,

    /// Pool 1 contract address
    #[arg(long, env = "POOL1_ADDRESS", global = true)]
    pool1: Option<Address>,

    /// Pool 2 contract address
    #[arg(long, env = "POOL2_ADDRESS", global = true)]
    pool2: Option<Address>,

    /// Blocks scanned back from the chain head
    #[arg(long, default_value_t = LOOKBACK_BLOCKS, global = true)]
    lookback: u64,

    /// Blocks per log query
    #[arg(long, default_value_t = RANGE_BLOCKS, global = true)]
    range: u64,

    /// Timeout for each RPC call, in seconds
    #[arg(long, default_value_t = 30, global = true)]
    timeout: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load and print the positions of an account
    Positions {
        /// Account address
        #[arg(short, long)]
        account: Address,

        /// Only show one pool (Pool1 or Pool2)
        #[arg(short, long)]
        pool: Option<PoolId>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Follow the connected account and print its positions as they change
    Watch {
        /// Store shared with the wallet connector
        #[arg(long, env = "STORE_PATH", default_value = "himera-store.json")]
        store: PathBuf,

        /// Use the node's accounts instead of the stored wallet address
        #[arg(long)]
        node_wallet: bool,

        /// Live feed polling interval in milliseconds
        #[arg(long, default_value_t = 4_000)]
        poll_ms: u64,
    },
    /// Print the block ranges a backfill would query
    Windows {
        /// Chain head
        #[arg(long)]
        head: u64,
    },
}

impl Cli {
    fn sources(&self) -> PoolSources {
        let defaults = PoolSources::default();
        PoolSources::new(
            self.pool1.unwrap_or(defaults.pool1),
            self.pool2.unwrap_or(defaults.pool2),
        )
    }

    fn tracker_config(&self, live_feed: LiveFeedConfig) -> TrackerConfig {
        TrackerConfig {
            lookback_blocks: self.lookback,
            range_blocks: self.range,
            request_timeout_secs: self.timeout,
            live_feed,
            ..TrackerConfig::default()
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn,himera=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Positions {
            account,
            pool,
            json,
        } => show_positions(&cli, *account, *pool, *json).await?,
        Commands::Watch {
            store,
            node_wallet,
            poll_ms,
        } => watch(&cli, store.clone(), *node_wallet, *poll_ms).await?,
        Commands::Windows { head } => {
            let ranges = BlockRange::lookback_window(*head, cli.lookback, cli.range);
            let mut table = Table::new();
            table.set_titles(row!["#", "From", "To", "Blocks"]);
            for (i, range) in ranges.iter().enumerate() {
                table.add_row(row![i + 1, range.from, range.to, range.block_count()]);
            }
            table.printstd();
        }
    }

    Ok(())
}

async fn show_positions(cli: &Cli, account: Address, pool: Option<PoolId>, json: bool) -> Result<()> {
    let provider = connect_http(&cli.rpc_url)?;
    let tracker = PositionTracker::new(
        Arc::new(RpcChainReader::new(provider)),
        Arc::new(StaticWallet::with_account(account)),
        Arc::new(ConsoleNotifier),
        cli.sources(),
        cli.tracker_config(LiveFeedConfig {
            enabled: false,
            ..LiveFeedConfig::default()
        }),
    );

    if !json {
        println!("📡 Loading positions of {account} from {}...", cli.rpc_url);
    }
    let outcome = match tracker.activate(Some(account)).await {
        Activation::Started(handle) => handle.await?,
        other => bail!("backfill did not start: {other:?}"),
    };
    if let BackfillOutcome::Failed(e) = outcome {
        return Err(e).context("loading positions");
    }

    let positions = match pool {
        Some(pool) => tracker.positions_for(pool).await,
        None => tracker.positions().await,
    };
    if json {
        println!("{}", serde_json::to_string_pretty(&rows(&positions))?);
    } else {
        println!("✅ Found {} positions", positions.len());
        print_positions(&positions);
    }
    Ok(())
}

async fn watch(cli: &Cli, store_path: PathBuf, node_wallet: bool, poll_ms: u64) -> Result<()> {
    let provider = connect_http(&cli.rpc_url)?;
    let store: Arc<dyn KeyValueStore> = Arc::new(JsonFileStore::new(&store_path));
    let wallet: Arc<dyn WalletProvider> = if node_wallet {
        Arc::new(RpcWallet::new(provider.clone()))
    } else {
        Arc::new(StoreWallet::new(store.clone()))
    };

    let tracker = PositionTracker::new(
        Arc::new(RpcChainReader::new(provider)),
        wallet.clone(),
        Arc::new(ConsoleNotifier),
        cli.sources(),
        cli.tracker_config(LiveFeedConfig {
            enabled: true,
            poll_interval_ms: poll_ms,
        }),
    );

    let mut watcher =
        AccountWatcher::new(tracker.clone(), wallet, AccountWatcherConfig::default());
    if !node_wallet {
        watcher = watcher.with_store(store);
    }
    let watcher = Arc::new(watcher);
    watcher
        .initialize()
        .await
        .context("reading the connected account")?;

    info!(store = %store_path.display(), node_wallet, "Watching positions");
    let runner = tokio::spawn({
        let watcher = watcher.clone();
        async move { watcher.run().await }
    });

    let mut revisions = tracker.subscribe();
    render(&tracker.snapshot().await);
    loop {
        tokio::select! {
            changed = revisions.changed() => {
                if changed.is_err() {
                    break;
                }
                render(&tracker.snapshot().await);
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down");
                break;
            }
        }
    }

    watcher.stop();
    tracker.deactivate().await;
    runner.await?;
    Ok(())
}

fn render(snapshot: &TrackerSnapshot) {
    let Some(account) = snapshot.account else {
        println!("🔌 No wallet connected");
        return;
    };
    if snapshot.loading {
        println!("⏳ Loading positions of {account}...");
        return;
    }

    let positions: Vec<Position> = snapshot
        .positions
        .iter()
        .filter(|p| p.pool == snapshot.selected_pool)
        .cloned()
        .collect();
    println!(
        "\n📊 {account} · {} · {} positions ({} total)",
        snapshot.selected_pool,
        positions.len(),
        snapshot.positions.len()
    );
    print_positions(&positions);
}

fn rows(positions: &[Position]) -> Vec<PositionRow> {
    let symbols = TokenSymbols::default();
    positions.iter().map(|p| p.row(&symbols)).collect()
}

fn print_positions(positions: &[Position]) {
    if positions.is_empty() {
        println!("No positions found.");
        return;
    }
    let symbols = TokenSymbols::default();
    let mut table = Table::new();
    table.set_titles(row![
        "Pool",
        "Date",
        "Price",
        "Shares",
        format!("Value ({})", symbols.value_unit)
    ]);
    for entry in rows(positions) {
        table.add_row(row![entry.pool, entry.date, entry.price, entry.shares, entry.value]);
    }
    table.printstd();
}
