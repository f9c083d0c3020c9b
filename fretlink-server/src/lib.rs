mod api;
mod config;
mod error;
mod room;
mod signaling;
mod token_store;

pub use api::*;
pub use config::*;
pub use error::*;
pub use room::*;
pub use signaling::*;
pub use token_store::*;
