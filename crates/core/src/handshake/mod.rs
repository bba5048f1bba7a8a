//! Vendor launch handshake.
//!
//! The lending platform posts an XML launch request; we store a session and
//! answer with a pop-up window URL. The pop-up then reads the session and
//! starts a job authenticated with the launch ticket.

mod protocol;
mod service;
mod types;

pub use protocol::*;
pub use service::*;
pub use types::*;
