//! Network layer subsystem.
//!
//! Plain TCP binding is handled by the HTTP server; this module only
//! prepares the rustls configuration for TLS listeners.

pub mod tls;
