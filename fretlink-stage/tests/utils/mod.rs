
pub use hand_script::*;
