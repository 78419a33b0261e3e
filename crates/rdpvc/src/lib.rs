//! RDP static virtual-channel framing.
//!
//! rdpvc multiplexes independent logical channels over one ordered transport
//! connection: outbound payloads are chunked behind an 8-byte envelope, and
//! inbound chunks are validated before they reach the channel's consumer.
//!
//! # Crate Structure
//!
//! - [`transport`] — Transport collaborator interface (send buffers, cursors)
//! - [`frame`] — Chunk envelope codec, chunk writer, and chunk readers

/// Re-export transport types.
pub mod transport {
    pub use rdpvc_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use rdpvc_frame::*;
}
