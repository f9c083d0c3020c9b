pub use fretlink_core::{FretState, PeerMessage, Role, RoomId, SignalMessage};

pub mod model {
    pub use fretlink_core::model::*;
}

pub mod stage {
    pub use fretlink_stage::*;
}

#[cfg(feature = "server")]
pub mod server {
    pub use fretlink_server::*;
}

#[cfg(feature = "client")]
pub mod client {
    pub use fretlink_client::*;
}
