//! Host APIs used by the request executor.
//!
//! - [`http`] - Wire transport (one HTTP exchange per call)

pub mod http;

pub use http::{HttpTransport, WireRequest, WireResponse, WireTransport};
