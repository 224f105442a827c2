//! # Contracts
//!
//! Frozen interface contracts shared by every crate in the workspace.
//! Business crates depend only on this crate, reverse dependencies are prohibited.
//!
//! ## Time Model
//! - Sample timestamps are seconds (f64) as reported by the capture device
//! - Each sensor stream carries its own clock domain; streams are never re-based

mod blueprint;
mod error;
mod motion;
mod record;
mod session;
mod sink;

pub use blueprint::*;
pub use error::*;
pub use motion::*;
pub use record::*;
pub use session::*;
pub use sink::*;
