// Console entry point.
//
// This file's job is to:
// 1. Load configuration
// 2. Open the database (fatal on failure)
// 3. Initialize services (dependency injection)
// 4. Run the host loop: stdin commands in, store results back as continuations

use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use ub_economy::core::auction::AuctionService;
use ub_economy::core::economy::EconomyService;
use ub_economy::host::console::{parse_command, ConsoleHost, ParseError};
use ub_economy::host::player_directory::PlayerDirectory;
use ub_economy::host::scheduler::{HostQueue, TaskBridge};
use ub_economy::host::sweeper::spawn_sweeper;
use ub_economy::infra::auction::SqliteListingStore;
use ub_economy::infra::database::{Database, TaskPool};
use ub_economy::infra::economy::SqliteBalanceStore;
use ub_economy::settings::Settings;

/// How long shutdown waits for in-flight store calls.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging so we can see what's happening
    tracing_subscriber::fmt::init();

    // Load environment variables from .env file (if it exists)
    dotenv::dotenv().ok();

    let settings = Settings::from_env().context("Invalid configuration")?;

    // ========================================================================
    // DEPENDENCY INJECTION
    // ========================================================================

    let db = Arc::new(
        Database::open(settings.database.clone())
            .await
            .context("Economy cannot start without its database")?,
    );

    let economy = Arc::new(EconomyService::new_with_config(
        SqliteBalanceStore::new(Arc::clone(&db)),
        settings.economy.clone(),
    ));
    let auctions = Arc::new(AuctionService::new_with_config(
        SqliteListingStore::new(Arc::clone(&db)),
        settings.auction.clone(),
    ));

    let mut queue = HostQueue::new();
    let tasks = TaskPool::from_current(settings.workers)?;
    let bridge = TaskBridge::new(tasks.clone(), queue.handle());
    let players = Arc::new(PlayerDirectory::new());

    let mut host = ConsoleHost::new(
        Arc::clone(&economy),
        Arc::clone(&auctions),
        bridge,
        players,
        settings.host.clone(),
    );

    // Background expiry notices. Listings stay until their seller claims them.
    let sweeper = spawn_sweeper(
        Arc::clone(&auctions),
        queue.handle(),
        settings.sweep_interval,
        ConsoleHost::notify_expired,
    );

    tracing::info!(
        "Economy ready ({} workers, sweeping every {:?})",
        tasks.workers(),
        settings.sweep_interval
    );
    println!("Type 'help' for commands, 'login <name>' to start.");

    // ========================================================================
    // HOST LOOP
    // ========================================================================

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while host.is_running() {
        tokio::select! {
            line = lines.next_line() => match line.context("Failed to read stdin")? {
                Some(line) => match parse_command(&line) {
                    Ok(command) => host.handle(command),
                    Err(ParseError::Empty) => {}
                    Err(e) => println!("{e}"),
                },
                None => break,
            },
            Some(continuation) = queue.recv() => continuation(&mut host),
        }

        for line in host.drain_output() {
            println!("{line}");
        }
    }

    // ========================================================================
    // SHUTDOWN
    // ========================================================================

    sweeper.abort();

    let deadline = tokio::time::Instant::now() + SHUTDOWN_GRACE;
    while tasks.in_flight() > 0 && tokio::time::Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    // Give finished work a moment to post its continuation.
    tokio::time::sleep(Duration::from_millis(50)).await;
    queue.run_pending(&mut host);
    for line in host.drain_output() {
        println!("{line}");
    }

    db.close().await;
    Ok(())
}
