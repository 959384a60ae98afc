mod init;
pub mod swap_event;

pub use init::init_telemetry;
pub use swap_event::{Delivery, Outcome, SwapEvent};
