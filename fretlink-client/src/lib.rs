pub mod channel;
pub mod config;
pub mod control;
pub mod directory;
pub mod error;
pub mod session;
pub mod transport;

pub use channel::{DataSink, MessageHandler, PeerChannel};
pub use config::{ChannelMode, ClientConfig, ReconnectPolicy};
pub use control::{ControlConnector, ControlEvent, ControlLink, WsConnector};
pub use directory::RoomDirectory;
pub use error::{ClientError, Result, SendError};
pub use session::{
    ConnectionState, Refusal, SessionEvent, SessionHandle, SessionMachine, SignalingClient,
};
pub use transport::{EventSink, PeerTransport, TransportEvent, TransportFactory};
