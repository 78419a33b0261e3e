//! Transport collaborator interface for virtual-channel framing.
//!
//! The framing core never touches a socket. It talks to the session layer
//! through the pieces defined here:
//! - [`Transport`] hands out scoped [`SendBuffer`]s and sends finished units
//! - [`StreamCursor`] walks the bytes of one received transport unit
//! - [`MemoryTransport`] records sent units in memory (tests, CLI dry runs)
//!
//! This is the lowest layer of rdpvc. Everything else builds on top of it.

pub mod buffer;
pub mod cursor;
pub mod error;
pub mod memory;
pub mod traits;

pub use buffer::{BufferPool, SendBuffer};
pub use cursor::StreamCursor;
pub use error::{Result, TransportError};
pub use memory::{MemoryTransport, SentUnit};
pub use traits::Transport;
