// Console stand-in for the game server.
//
// Following the same pattern for every command:
// 1. Resolve the acting player and any target names
// 2. Dispatch the ledger/auction call onto the worker pool
// 3. Format the outcome in a continuation that runs back on the host
//
// Host state (inventories, the logged-in player, pending output) is only
// touched on the host loop, never from a worker.

use super::commands::{Command, HELP};
use super::formatting::{format_duration, format_money};
use super::item_stack::{ItemStack, JsonItemCodec};
use crate::core::auction::{now_millis, AuctionService, ItemCodec, Listing, ListingId};
use crate::core::economy::EconomyService;
use crate::host::player_directory::PlayerDirectory;
use crate::host::scheduler::TaskBridge;
use crate::infra::auction::SqliteListingStore;
use crate::infra::database::DbError;
use crate::infra::economy::SqliteBalanceStore;
use std::collections::HashMap;
use std::fmt::Display;
use std::sync::Arc;
use uuid::Uuid;

/// Item that backs the currency, one per unit.
const CURRENCY_ITEM: &str = "DIAMOND";
const MAX_STACK: i64 = 64;

pub type Economy = EconomyService<SqliteBalanceStore>;
pub type Auctions = AuctionService<SqliteListingStore>;

#[derive(Debug, Clone)]
pub struct HostOptions {
    pub currency_singular: String,
    pub currency_plural: String,
    /// Stacks a player can carry.
    pub inventory_slots: usize,
}

impl Default for HostOptions {
    fn default() -> Self {
        Self {
            currency_singular: "coin".to_string(),
            currency_plural: "coins".to_string(),
            inventory_slots: 36,
        }
    }
}

pub struct ConsoleHost {
    economy: Arc<Economy>,
    auctions: Arc<Auctions>,
    bridge: TaskBridge<ConsoleHost>,
    players: Arc<PlayerDirectory>,
    codec: JsonItemCodec,
    options: HostOptions,
    inventories: HashMap<Uuid, Vec<ItemStack>>,
    current: Option<Uuid>,
    outbox: Vec<String>,
    running: bool,
}

impl ConsoleHost {
    pub fn new(
        economy: Arc<Economy>,
        auctions: Arc<Auctions>,
        bridge: TaskBridge<ConsoleHost>,
        players: Arc<PlayerDirectory>,
        options: HostOptions,
    ) -> Self {
        Self {
            economy,
            auctions,
            bridge,
            players,
            codec: JsonItemCodec,
            options,
            inventories: HashMap::new(),
            current: None,
            outbox: Vec::new(),
            running: true,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Lines produced since the last call.
    pub fn drain_output(&mut self) -> Vec<String> {
        std::mem::take(&mut self.outbox)
    }

    pub fn inventory(&self, player: Uuid) -> &[ItemStack] {
        self.inventories
            .get(&player)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn say(&mut self, line: impl Into<String>) {
        self.outbox.push(line.into());
    }

    fn money(&self, amount: i64) -> String {
        format_money(
            amount,
            &self.options.currency_singular,
            &self.options.currency_plural,
        )
    }

    fn player(&mut self) -> Option<Uuid> {
        if self.current.is_none() {
            self.say("Log in first with 'login <name>'");
        }
        self.current
    }

    fn lookup(&mut self, name: &str) -> Option<Uuid> {
        let found = self.players.id_of(name);
        if found.is_none() {
            self.say(format!("Unknown player '{name}'"));
        }
        found
    }

    /// Unwrap a dispatched result, reporting either failure layer to the player.
    fn settle<T, E: Display>(&mut self, outcome: Result<Result<T, E>, DbError>) -> Option<T> {
        match outcome {
            Ok(Ok(value)) => Some(value),
            Ok(Err(e)) => {
                self.say(e.to_string());
                None
            }
            Err(e) => {
                tracing::error!("Command failed on a worker: {}", e);
                self.say("Something went wrong, try again later");
                None
            }
        }
    }

    fn give_item(&mut self, player: Uuid, stack: ItemStack) {
        self.inventories.entry(player).or_default().push(stack);
    }

    fn has_room(&self, player: Uuid) -> bool {
        self.inventory(player).len() < self.options.inventory_slots
    }

    fn free_slots(&self, player: Uuid) -> usize {
        self.options
            .inventory_slots
            .saturating_sub(self.inventory(player).len())
    }

    fn count_items(&self, player: Uuid, material: &str) -> i64 {
        self.inventory(player)
            .iter()
            .filter(|stack| stack.material == material)
            .map(|stack| i64::from(stack.amount))
            .sum()
    }

    /// Remove `amount` of `material`, or nothing if the player holds less.
    fn take_items(&mut self, player: Uuid, material: &str, amount: i64) -> bool {
        if self.count_items(player, material) < amount {
            return false;
        }
        let Some(items) = self.inventories.get_mut(&player) else {
            return true;
        };

        let mut left = amount.max(0);
        for stack in items.iter_mut().filter(|stack| stack.material == material) {
            let taken = left.min(i64::from(stack.amount));
            // taken <= stack.amount, so it fits in a u32
            stack.amount -= taken as u32;
            left -= taken;
            if left == 0 {
                break;
            }
        }
        items.retain(|stack| stack.amount > 0);
        true
    }

    /// Add `amount` of `material` in full stacks plus a remainder.
    fn give_items(&mut self, player: Uuid, material: &str, amount: i64) {
        let mut left = amount;
        while left > 0 {
            let size = left.min(MAX_STACK);
            self.give_item(player, ItemStack::new(material, size as u32));
            left -= size;
        }
    }

    pub fn handle(&mut self, command: Command) {
        match command {
            Command::Login(name) => self.login(&name),
            Command::Who => match self.current {
                Some(id) => {
                    let name = self.players.display(id);
                    self.say(format!("You are {name}"));
                }
                None => self.say("Nobody is logged in"),
            },
            Command::Balance(target) => self.balance(target),
            Command::Pay { to, amount } => self.pay(&to, amount),
            Command::Deposit(amount) => self.deposit(amount),
            Command::Withdraw(amount) => self.withdraw(amount),
            Command::SetBalance { player, amount } => self.set_balance(&player, amount),
            Command::BalTop => self.baltop(),
            Command::Give { material, amount } => self.give(&material, amount),
            Command::Inventory => self.show_inventory(),
            Command::AuctionList(page) => self.auction_page(page),
            Command::AuctionSell { price, slot } => self.auction_sell(price, slot),
            Command::AuctionBuy(id) => self.auction_buy(id),
            Command::AuctionClaim(id) => self.auction_claim(id),
            Command::AuctionCancel(id) => self.auction_cancel(id),
            Command::AuctionBid { id, amount } => self.auction_bid(id, amount),
            Command::AuctionMine => self.auction_mine(),
            Command::Help => {
                for line in HELP.lines() {
                    self.say(line);
                }
            }
            Command::Quit => {
                self.running = false;
                self.say("Shutting down");
            }
        }
    }

    // ===== ECONOMY =====

    fn login(&mut self, name: &str) {
        let id = self
            .players
            .id_of(name)
            .unwrap_or_else(|| PlayerDirectory::offline_id(name));
        self.players.register(name, id);
        self.inventories.entry(id).or_default();
        self.current = Some(id);
        self.say(format!("Logged in as {name}"));
    }

    fn balance(&mut self, target: Option<String>) {
        let id = match &target {
            Some(name) => self.lookup(name),
            None => self.player(),
        };
        let Some(id) = id else { return };

        let economy = Arc::clone(&self.economy);
        self.bridge.dispatch(
            async move { economy.get_balance(id).await },
            move |host: &mut ConsoleHost, outcome| {
                if let Some(balance) = host.settle(outcome) {
                    let line = match target {
                        Some(name) => format!("{name} has {}", host.money(balance)),
                        None => format!("Balance: {}", host.money(balance)),
                    };
                    host.say(line);
                }
            },
        );
    }

    fn pay(&mut self, to: &str, amount: i64) {
        let Some(from) = self.player() else { return };
        let Some(target) = self.lookup(to) else { return };
        let to = to.to_string();

        let economy = Arc::clone(&self.economy);
        self.bridge.dispatch(
            async move { economy.pay(from, target, amount).await },
            move |host: &mut ConsoleHost, outcome| {
                if let Some(balance) = host.settle(outcome) {
                    let line = format!(
                        "Sent {} to {to}. Balance: {}",
                        host.money(amount),
                        host.money(balance)
                    );
                    host.say(line);
                }
            },
        );
    }

    fn deposit(&mut self, amount: i64) {
        let Some(id) = self.player() else { return };

        // The diamonds leave the inventory first and come back if the credit fails.
        let taken = amount.max(0);
        if !self.take_items(id, CURRENCY_ITEM, taken) {
            let held = self.count_items(id, CURRENCY_ITEM);
            self.say(format!("You need {taken} {CURRENCY_ITEM} but only have {held}"));
            return;
        }

        let economy = Arc::clone(&self.economy);
        self.bridge.dispatch(
            async move { economy.deposit(id, amount).await },
            move |host: &mut ConsoleHost, outcome| match host.settle(outcome) {
                Some(balance) => {
                    let line = format!(
                        "Deposited {}. Balance: {}",
                        host.money(amount),
                        host.money(balance)
                    );
                    host.say(line);
                }
                None => host.give_items(id, CURRENCY_ITEM, taken),
            },
        );
    }

    fn withdraw(&mut self, amount: i64) {
        let Some(id) = self.player() else { return };

        let stacks = (amount.max(0) as u64).div_ceil(MAX_STACK as u64);
        if stacks > self.free_slots(id) as u64 {
            self.say(format!(
                "You need {stacks} free inventory slots to withdraw {}",
                self.money(amount)
            ));
            return;
        }

        let economy = Arc::clone(&self.economy);
        self.bridge.dispatch(
            async move { economy.withdraw(id, amount).await },
            move |host: &mut ConsoleHost, outcome| {
                if let Some(balance) = host.settle(outcome) {
                    host.give_items(id, CURRENCY_ITEM, amount);
                    let line = format!(
                        "Withdrew {}. Balance: {}",
                        host.money(amount),
                        host.money(balance)
                    );
                    host.say(line);
                }
            },
        );
    }

    fn set_balance(&mut self, name: &str, amount: i64) {
        let Some(id) = self.lookup(name) else { return };
        let name = name.to_string();

        let economy = Arc::clone(&self.economy);
        self.bridge.dispatch(
            async move { economy.set_balance(id, amount).await },
            move |host: &mut ConsoleHost, outcome| {
                if let Some(stored) = host.settle(outcome) {
                    let line = format!("Set {name}'s balance to {}", host.money(stored));
                    host.say(line);
                }
            },
        );
    }

    fn baltop(&mut self) {
        let economy = Arc::clone(&self.economy);
        self.bridge.dispatch(
            async move { economy.top_balances().await },
            |host: &mut ConsoleHost, outcome| {
                let Some(accounts) = host.settle(outcome) else { return };
                if accounts.is_empty() {
                    host.say("No accounts yet");
                    return;
                }
                host.say("Top balances:");
                for (rank, account) in accounts.iter().enumerate() {
                    let line = format!(
                        "{}. {} - {}",
                        rank + 1,
                        host.players.display(account.id),
                        host.money(account.balance)
                    );
                    host.say(line);
                }
            },
        );
    }

    // ===== INVENTORY =====

    fn give(&mut self, material: &str, amount: u32) {
        let Some(id) = self.player() else { return };
        if amount == 0 {
            self.say("Amount must be at least 1");
            return;
        }
        if !self.has_room(id) {
            self.say("Your inventory is full");
            return;
        }
        let stack = ItemStack::new(material, amount);
        self.say(format!("Received {stack}"));
        self.give_item(id, stack);
    }

    fn show_inventory(&mut self) {
        let Some(id) = self.player() else { return };
        let lines: Vec<String> = self
            .inventory(id)
            .iter()
            .enumerate()
            .map(|(slot, stack)| format!("[{slot}] {stack}"))
            .collect();

        if lines.is_empty() {
            self.say("Your inventory is empty");
        }
        for line in lines {
            self.say(line);
        }
    }

    // ===== AUCTION HOUSE =====

    fn describe(&self, listing: &Listing) -> String {
        let item = self.codec.decode_or_placeholder(&listing.payload);
        let status = match listing.time_remaining(now_millis()) {
            Some(left) => format!("ends in {}", format_duration(left)),
            None => "expired".to_string(),
        };
        let bid = match (listing.current_bid, listing.current_bidder) {
            (Some(amount), Some(bidder)) => format!(
                ", top bid {} by {}",
                self.money(amount),
                self.players.display(bidder)
            ),
            _ => String::new(),
        };
        format!(
            "{} {} for {} from {} ({}{})",
            listing.id,
            item,
            self.money(listing.price),
            self.players.display(listing.seller),
            status,
            bid
        )
    }

    fn auction_page(&mut self, page: usize) {
        let auctions = Arc::clone(&self.auctions);
        let page = page.max(1);

        self.bridge.dispatch(
            async move {
                let page_size = auctions.config().page_size;
                let listings = auctions.page(page, page_size).await?;
                let pages = auctions.total_pages(page_size).await?;
                Ok::<_, crate::core::auction::AuctionError>((listings, pages))
            },
            move |host: &mut ConsoleHost, outcome| {
                let Some((listings, pages)) = host.settle(outcome) else { return };
                if listings.is_empty() {
                    host.say(if pages == 0 {
                        "The auction house is empty".to_string()
                    } else {
                        format!("Page {page} is empty, there are {pages} pages")
                    });
                    return;
                }
                host.say(format!("Auction house, page {page}/{pages}:"));
                for listing in &listings {
                    let line = host.describe(listing);
                    host.say(line);
                }
            },
        );
    }

    fn auction_sell(&mut self, price: i64, slot: usize) {
        let Some(seller) = self.player() else { return };
        let Some(stack) = self.inventory(seller).get(slot).cloned() else {
            self.say(format!("Slot {slot} is empty"));
            return;
        };
        if self.auctions.is_blacklisted(&stack.material) {
            self.say(format!("{} cannot be sold on the auction house", stack.material));
            return;
        }
        let payload = match self.codec.encode(&stack) {
            Ok(payload) => payload,
            Err(e) => {
                self.say(e.to_string());
                return;
            }
        };

        // Take the item now; it comes back if the listing is refused.
        if let Some(items) = self.inventories.get_mut(&seller) {
            items.remove(slot);
        }

        let auctions = Arc::clone(&self.auctions);
        self.bridge.dispatch(
            async move { auctions.create_listing(seller, payload, price).await },
            move |host: &mut ConsoleHost, outcome| match host.settle(outcome) {
                Some(listing) => {
                    let line = format!(
                        "Listed {stack} as {} for {} (ends in {})",
                        listing.id,
                        host.money(listing.price),
                        format_duration(listing.expires_at - listing.created_at)
                    );
                    host.say(line);
                }
                None => host.give_item(seller, stack),
            },
        );
    }

    fn auction_buy(&mut self, id: ListingId) {
        let Some(buyer) = self.player() else { return };
        if !self.has_room(buyer) {
            self.say("Your inventory is full");
            return;
        }

        let auctions = Arc::clone(&self.auctions);
        self.bridge.dispatch(
            async move { auctions.buy(buyer, id).await },
            move |host: &mut ConsoleHost, outcome| {
                let Some(listing) = host.settle(outcome) else { return };
                let stack = host.codec.decode_or_placeholder(&listing.payload);
                let line = format!(
                    "Bought {stack} from {} for {}",
                    host.players.display(listing.seller),
                    host.money(listing.price)
                );
                host.say(line);
                host.give_item(buyer, stack);
            },
        );
    }

    fn auction_claim(&mut self, id: ListingId) {
        let Some(seller) = self.player() else { return };
        if !self.has_room(seller) {
            self.say("Your inventory is full");
            return;
        }

        let auctions = Arc::clone(&self.auctions);
        self.bridge.dispatch(
            async move { auctions.claim_expired(seller, id).await },
            move |host: &mut ConsoleHost, outcome| {
                if let Some(listing) = host.settle(outcome) {
                    host.return_item(seller, listing);
                }
            },
        );
    }

    fn auction_cancel(&mut self, id: ListingId) {
        let Some(seller) = self.player() else { return };
        if !self.has_room(seller) {
            self.say("Your inventory is full");
            return;
        }

        let auctions = Arc::clone(&self.auctions);
        self.bridge.dispatch(
            async move { auctions.cancel(seller, id).await },
            move |host: &mut ConsoleHost, outcome| {
                if let Some(listing) = host.settle(outcome) {
                    host.return_item(seller, listing);
                }
            },
        );
    }

    fn return_item(&mut self, seller: Uuid, listing: Listing) {
        let stack = self.codec.decode_or_placeholder(&listing.payload);
        self.say(format!("{} returned: {stack}", listing.id));
        self.give_item(seller, stack);
    }

    fn auction_bid(&mut self, id: ListingId, amount: i64) {
        let Some(bidder) = self.player() else { return };

        let auctions = Arc::clone(&self.auctions);
        self.bridge.dispatch(
            async move { auctions.place_bid(bidder, id, amount).await },
            move |host: &mut ConsoleHost, outcome| {
                if let Some(listing) = host.settle(outcome) {
                    let line = format!(
                        "You bid {} on {} (next minimum {})",
                        host.money(amount),
                        listing.id,
                        host.money(listing.minimum_bid())
                    );
                    host.say(line);
                }
            },
        );
    }

    fn auction_mine(&mut self) {
        let Some(seller) = self.player() else { return };

        let auctions = Arc::clone(&self.auctions);
        self.bridge.dispatch(
            async move { auctions.listings_by_seller(seller).await },
            |host: &mut ConsoleHost, outcome| {
                let Some(listings) = host.settle(outcome) else { return };
                if listings.is_empty() {
                    host.say("You have no listings");
                    return;
                }
                for listing in &listings {
                    let mut line = host.describe(listing);
                    if listing.is_expired() {
                        line.push_str(&format!(", 'ah claim {}' to take it back", listing.id.0));
                    }
                    host.say(line);
                }
            },
        );
    }

    /// Sweeper callback for a listing that just ran out.
    pub fn notify_expired(&mut self, listing: Listing) {
        let seller = self.players.display(listing.seller);
        self.say(format!(
            "[Auction] {seller}'s listing {} expired, 'ah claim {}' returns it",
            listing.id, listing.id.0
        ));
    }
}
