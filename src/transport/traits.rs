use std::future::Future;
use std::pin::Pin;

use crate::audio::AudioPayload;
use crate::error::TransportError;

pub type OutboundFuture<'a> = Pin<Box<dyn Future<Output = Result<(), TransportError>> + Send + 'a>>;

/// Outbound half of the transport. Both calls are single attempts; the
/// caller decides how to report failure.
pub trait Outbound: Send + Sync {
    /// Submit a typed command or the answer to an active prompt.
    fn send_response<'a>(&'a self, text: &'a str) -> OutboundFuture<'a>;

    /// Upload one recorded clip.
    fn send_audio<'a>(&'a self, payload: &'a AudioPayload) -> OutboundFuture<'a>;
}
