mod chart;
mod chord;
mod fret;
mod peer_message;
mod role;
mod room;
mod signaling;
mod song;

pub use chart::{ChartEntry, ChordChart};
pub use chord::{CHORD_SHAPES, ChordShape, chord_shape, detect_chord};
pub use fret::FretState;
pub use peer_message::PeerMessage;
pub use role::Role;
pub use room::{RoomId, RoomTicket};
pub use signaling::{
    ErrorPayload, IceCandidate, IceCandidatePayload, IceServerConfig, JoinedPayload,
    PeerDisconnectedPayload, ReadyPayload, SdpPayload, SignalMessage,
};
pub use song::{Difficulty, Song, builtin_songs};
