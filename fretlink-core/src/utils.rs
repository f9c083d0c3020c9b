pub const DEFAULT_STUN_ADDR: &str = "stun:stun.l.google.com:19302";
pub const DEFAULT_STUN_ADDR_2: &str = "stun:stun1.l.google.com:19302";

/// Number of strings on the controller fretboard.
pub const STRING_COUNT: usize = 6;

/// Highest fret a controller may report unless configured otherwise.
pub const DEFAULT_MAX_FRET: u8 = 12;
