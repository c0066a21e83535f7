//! hyper service wrappers for signed-request authentication.
//!
//! - **Authentication** ([`service`]): [`AuthenticationService`] resolves the
//!   consumer behind each request and stores it in the request extensions.
//! - **Authorization** ([`gate`]): [`ConsumerRequired`] admits only requests
//!   that carry a consumer and answers everything else with a bare `403`.
//! - **Context** ([`context`]): read the consumer and peer address back out of
//!   a request, rebuild its absolute URL, and derive throttle identifiers.
//! - **Body** ([`body`]): the [`ResponseBody`] type shared by the services.
//!
//! # Architecture
//!
//! ```text
//! HTTP Request
//!   -> AuthenticationService (Basic, then OAuth)
//!     -> your router
//!       -> open handlers (health, ...)
//!       -> ConsumerRequired -> protected handlers
//! ```

pub mod body;
pub mod context;
pub mod gate;
pub mod service;

pub use body::ResponseBody;
pub use context::{RemoteAddr, authenticated_consumer, rate_limit_identifier};
pub use gate::{ConsumerRequired, forbidden};
pub use service::AuthenticationService;
