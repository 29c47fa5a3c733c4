// Console command parsing.
//
// One line of input becomes one Command. Parsing is pure; the console host
// decides what each command does.

use crate::core::auction::ListingId;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Login(String),
    Who,
    Balance(Option<String>),
    Pay { to: String, amount: i64 },
    Deposit(i64),
    Withdraw(i64),
    SetBalance { player: String, amount: i64 },
    BalTop,
    Give { material: String, amount: u32 },
    Inventory,
    AuctionList(usize),
    AuctionSell { price: i64, slot: usize },
    AuctionBuy(ListingId),
    AuctionClaim(ListingId),
    AuctionCancel(ListingId),
    AuctionBid { id: ListingId, amount: i64 },
    AuctionMine,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Type a command, or 'help'")]
    Empty,

    #[error("Unknown command '{0}', try 'help'")]
    Unknown(String),

    #[error("Usage: {0}")]
    Usage(&'static str),

    #[error("'{0}' is not a valid number")]
    BadNumber(String),

    #[error("'{0}' is not a valid player name (1-16 letters, digits or _)")]
    InvalidName(String),
}

pub const HELP: &str = "\
login <name>               act as a player
who                        show the current player
balance [player]           show a balance
pay <player> <amount>      send money
deposit <amount>           turn DIAMONDs into money
withdraw <amount>          turn money into DIAMONDs
eco set <player> <amount>  set a balance
baltop                     richest players
give <material> [amount]   put items in your inventory
inv                        show your inventory
ah [page]                  browse the auction house
ah sell <price> [slot]     list an inventory slot
ah buy <id>                buy a listing
ah bid <id> <amount>       bid on a listing
ah cancel <id>             withdraw your active listing
ah claim <id>              take back an expired listing
ah mine                    your listings
quit";

pub fn parse_command(line: &str) -> Result<Command, ParseError> {
    let words: Vec<&str> = line.split_whitespace().collect();
    let Some((head, args)) = words.split_first() else {
        return Err(ParseError::Empty);
    };

    match (head.to_lowercase().as_str(), args) {
        ("login", [name]) => Ok(Command::Login(parse_name(name)?)),
        ("login", _) => Err(ParseError::Usage("login <name>")),
        ("who", []) => Ok(Command::Who),
        ("balance" | "bal" | "money", []) => Ok(Command::Balance(None)),
        ("balance" | "bal" | "money", [player]) => Ok(Command::Balance(Some(parse_name(player)?))),
        ("pay", [to, amount]) => Ok(Command::Pay {
            to: parse_name(to)?,
            amount: parse_amount(amount)?,
        }),
        ("pay", _) => Err(ParseError::Usage("pay <player> <amount>")),
        ("deposit", [amount]) => Ok(Command::Deposit(parse_amount(amount)?)),
        ("deposit", _) => Err(ParseError::Usage("deposit <amount>")),
        ("withdraw", [amount]) => Ok(Command::Withdraw(parse_amount(amount)?)),
        ("withdraw", _) => Err(ParseError::Usage("withdraw <amount>")),
        ("eco", [sub, player, amount]) if sub.eq_ignore_ascii_case("set") => {
            Ok(Command::SetBalance {
                player: parse_name(player)?,
                amount: parse_amount(amount)?,
            })
        }
        ("eco", _) => Err(ParseError::Usage("eco set <player> <amount>")),
        ("baltop", []) => Ok(Command::BalTop),
        ("give", [material]) => Ok(Command::Give {
            material: material.to_string(),
            amount: 1,
        }),
        ("give", [material, amount]) => Ok(Command::Give {
            material: material.to_string(),
            amount: parse_number(amount)?,
        }),
        ("give", _) => Err(ParseError::Usage("give <material> [amount]")),
        ("inv" | "inventory", []) => Ok(Command::Inventory),
        ("ah" | "auction", rest) => parse_auction(rest),
        ("help", _) => Ok(Command::Help),
        ("quit" | "exit" | "stop", _) => Ok(Command::Quit),
        (other, _) => Err(ParseError::Unknown(other.to_string())),
    }
}

fn parse_auction(args: &[&str]) -> Result<Command, ParseError> {
    let Some((sub, rest)) = args.split_first() else {
        return Ok(Command::AuctionList(1));
    };

    match (sub.to_lowercase().as_str(), rest) {
        ("sell", [price]) => Ok(Command::AuctionSell {
            price: parse_amount(price)?,
            slot: 0,
        }),
        ("sell", [price, slot]) => Ok(Command::AuctionSell {
            price: parse_amount(price)?,
            slot: parse_number(slot)?,
        }),
        ("sell", _) => Err(ParseError::Usage("ah sell <price> [slot]")),
        ("buy", [id]) => Ok(Command::AuctionBuy(parse_listing_id(id)?)),
        ("buy", _) => Err(ParseError::Usage("ah buy <id>")),
        ("claim", [id]) => Ok(Command::AuctionClaim(parse_listing_id(id)?)),
        ("claim", _) => Err(ParseError::Usage("ah claim <id>")),
        ("cancel", [id]) => Ok(Command::AuctionCancel(parse_listing_id(id)?)),
        ("cancel", _) => Err(ParseError::Usage("ah cancel <id>")),
        ("bid", [id, amount]) => Ok(Command::AuctionBid {
            id: parse_listing_id(id)?,
            amount: parse_amount(amount)?,
        }),
        ("bid", _) => Err(ParseError::Usage("ah bid <id> <amount>")),
        ("mine", []) => Ok(Command::AuctionMine),
        ("list", [page]) => Ok(Command::AuctionList(parse_number(page)?)),
        ("list", []) => Ok(Command::AuctionList(1)),
        (page, []) if page.chars().all(|c| c.is_ascii_digit()) => {
            Ok(Command::AuctionList(parse_number(page)?))
        }
        (other, _) => Err(ParseError::Unknown(format!("ah {other}"))),
    }
}

/// Player names are 1-16 ASCII letters, digits or underscores.
fn parse_name(raw: &str) -> Result<String, ParseError> {
    let valid = (1..=16).contains(&raw.len())
        && raw.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !valid {
        return Err(ParseError::InvalidName(raw.to_string()));
    }
    Ok(raw.to_string())
}

/// Money amounts; thousands separators are allowed.
fn parse_amount(raw: &str) -> Result<i64, ParseError> {
    raw.replace(',', "")
        .parse()
        .map_err(|_| ParseError::BadNumber(raw.to_string()))
}

fn parse_number<T: std::str::FromStr>(raw: &str) -> Result<T, ParseError> {
    raw.parse().map_err(|_| ParseError::BadNumber(raw.to_string()))
}

fn parse_listing_id(raw: &str) -> Result<ListingId, ParseError> {
    parse_number(raw.trim_start_matches('#')).map(ListingId)
}
