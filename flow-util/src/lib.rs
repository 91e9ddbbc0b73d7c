mod asset;
mod config;
mod constants;
mod dirs;
mod liquid;
mod log_util;

pub use asset::*;
pub use config::*;
pub use constants::*;
pub use dirs::*;
pub use liquid::*;
pub use log_util::*;

#[macro_use]
extern crate log;
