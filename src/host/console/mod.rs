// Console host - drives the ledger and auction house from stdin.

pub mod commands;
pub mod console_host;
pub mod formatting;
pub mod item_stack;

pub use commands::{parse_command, Command, ParseError};
pub use console_host::{ConsoleHost, HostOptions};
pub use item_stack::{ItemStack, JsonItemCodec};
