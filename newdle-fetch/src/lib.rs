// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # newdle Fetch
//!
//! Authenticated request coordination for the newdle API.
//!
//! ## Request Path
//!
//! - [`host::http`] - Wire transport, one HTTP exchange per call
//! - [`classify`] - Turns status + body into an [`Outcome`] or [`ClientError`]
//! - [`coordinator`] - Single-flight login episodes over the session store
//! - [`executor`] - Bearer auth and one retry after a token renewal
//!
//! ## Callers
//!
//! - [`api::NewdleClient`] - Typed operations over the executor
//! - [`binding`] - Observable on-demand and on-change bindings
//!
//! The session store itself lives outside this crate; it is reached only
//! through the [`SessionState`] trait.
//!
//! ## Example
//!
//! ```ignore
//! use newdle_fetch::{ClientContext, NewdleClient};
//!
//! let ctx = ClientContext::builder(session)
//!     .base_url("https://newdle.example.com")
//!     .build()?;
//! let client = NewdleClient::from_context(ctx);
//!
//! // Opens a login prompt through the session store if needed
//! let me = client.get_me().await?;
//! ```

pub mod api;
pub mod binding;
pub mod classify;
pub mod context;
pub mod coordinator;
pub mod endpoint;
pub mod error;
pub mod executor;
pub mod host;
pub mod request;
pub mod session;

#[cfg(test)]
mod test_support;

// Errors
pub use error::{ClientError, TransportError, TOKEN_REJECTION_CODES};

// Host APIs
pub use host::{HttpTransport, WireRequest, WireResponse, WireTransport};

// Request path
pub use classify::{classify, Outcome};
pub use coordinator::TokenCoordinator;
pub use executor::RequestExecutor;
pub use request::{Method, RequestDescriptor};
pub use session::{LoginPrompt, SessionEvent, SessionState};

// Callers
pub use api::NewdleClient;
pub use binding::{ErrorReporter, OnChange, OnDemand, Pipeline, SubmissionState};
pub use context::{ClientContext, ClientContextBuilder, ClientSettings, DEFAULT_BASE_URL};
pub use endpoint::Endpoint;
