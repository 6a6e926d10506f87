/* src/state/mod.rs */

//!
//! Load-state value types shared by the engine, its providers and its observers.

mod disposition;
mod error;
mod event;
mod request;
mod status;

pub use disposition::Disposition;
pub use error::{BoxError, LoadError};
pub use event::Event;
pub use request::RefreshRequest;
pub use status::Status;
