//! Network boundary.
//!
//! The pipeline only depends on the `Transport` trait. `CurlTransport` is the
//! production implementation (libcurl POST to the interpreter endpoint);
//! tests plug in scripted transports.

mod curl_transport;
mod parse;
mod response;

use std::future::Future;

pub use curl_transport::CurlTransport;
pub use response::OverpassResponse;

use crate::retry::TransportFailure;

/// Performs one network attempt for a full query text.
///
/// Dropping the returned future abandons the attempt.
pub trait Transport: Send + Sync {
    fn send(
        &self,
        query: &str,
    ) -> impl Future<Output = Result<OverpassResponse, TransportFailure>> + Send;
}

impl<T: Transport> Transport for std::sync::Arc<T> {
    fn send(
        &self,
        query: &str,
    ) -> impl Future<Output = Result<OverpassResponse, TransportFailure>> + Send {
        (**self).send(query)
    }
}
