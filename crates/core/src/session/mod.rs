//! Short-lived launch sessions bridging the vendor's launch call and the
//! pop-up page.

mod store;
mod sweeper;
mod types;

pub use store::*;
pub use sweeper::*;
pub use types::*;
