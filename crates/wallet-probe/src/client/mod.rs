//! Wallet service HTTP client.
//!
//! Provides:
//! - The [`Transport`] seam the probe sends its single request through
//! - [`ReqwestTransport`], the production implementation

mod http;
mod transport;

pub use http::ReqwestTransport;
pub use transport::{BalanceRequest, RawResponse, Transport, TransportError};
