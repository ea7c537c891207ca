//! Transport client: one persistent snapshot socket in, two fire-and-forget
//! request endpoints out.

pub mod backoff;
pub mod client;
pub mod endpoints;
pub mod http;
pub mod traits;
pub mod websocket;

pub use backoff::Backoff;
pub use client::{Connection, TransportClient};
pub use endpoints::BackendEndpoints;
pub use http::BackendHttpClient;
pub use traits::{Outbound, OutboundFuture};
pub use websocket::{ConnectionStatus, SnapshotListener};
