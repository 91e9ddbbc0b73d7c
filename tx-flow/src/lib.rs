mod balance;
mod cache;
mod chain;
mod config;
mod error;
mod explorer;
mod flow;
mod network;
mod store;
mod tx;
mod types;

#[macro_use]
extern crate log;

pub use balance::*;
pub use cache::*;
pub use chain::*;
pub use config::*;
pub use error::*;
pub use explorer::*;
pub use flow::*;
pub use network::*;
pub use store::*;
pub use tx::*;
pub use types::*;
