pub mod mock_control;
pub mod mock_transport;

pub use mock_control::*;
pub use mock_transport::*;
pub use signal_helpers::*;
