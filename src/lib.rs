pub mod bot;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod game;
pub mod logging;
pub mod selector;
pub mod store;
pub mod telegram;

pub use cli::{Cli, Commands};
pub use config::{AdminList, Config};
pub use store::Ledger;
