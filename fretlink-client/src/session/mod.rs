mod client;
mod driver;
pub mod machine;
pub mod state;

pub use client::{SessionHandle, SignalingClient};
pub use machine::{SessionEffect, SessionInput, SessionMachine};
pub use state::{ConnectionState, Refusal, SessionEvent};
