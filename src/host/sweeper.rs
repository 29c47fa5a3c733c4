// Background expiry sweeper.
//
// Periodically looks for expired listings and tells the host about ones it
// hasn't reported yet. Rows are left in place; sellers reclaim them.

use super::scheduler::HostHandle;
use crate::core::auction::{AuctionError, AuctionService, Listing, ListingId, ListingStore};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Expired listings not yet in `seen`. Ids that are no longer expired rows
/// (claimed or bought) are dropped from `seen`.
pub async fn sweep_once<L: ListingStore>(
    auctions: &AuctionService<L>,
    seen: &mut HashSet<ListingId>,
) -> Result<Vec<Listing>, AuctionError> {
    let expired = auctions.expired_listings().await?;

    let current: HashSet<ListingId> = expired.iter().map(|l| l.id).collect();
    seen.retain(|id| current.contains(id));

    Ok(expired
        .into_iter()
        .filter(|listing| seen.insert(listing.id))
        .collect())
}

/// Start the sweep loop. `notify` runs on the host thread once per newly
/// expired listing.
pub fn spawn_sweeper<S, L>(
    auctions: Arc<AuctionService<L>>,
    host: HostHandle<S>,
    interval: Duration,
    notify: fn(&mut S, Listing),
) -> JoinHandle<()>
where
    S: 'static,
    L: ListingStore + 'static,
{
    tokio::spawn(async move {
        let mut seen = HashSet::new();
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            tracing::debug!("Expiry sweep starting");

            match sweep_once(&auctions, &mut seen).await {
                Ok(fresh) => {
                    if !fresh.is_empty() {
                        tracing::info!("Found {} newly expired listings", fresh.len());
                    }
                    for listing in fresh {
                        if !host.post(move |state| notify(state, listing)) {
                            tracing::info!("Host gone, stopping expiry sweeper");
                            return;
                        }
                    }
                }
                Err(err) => tracing::warn!("Expiry sweep failed: {}", err),
            }
        }
    })
}
