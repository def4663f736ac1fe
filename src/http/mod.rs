//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (hyper auto HTTP/1.1 + HTTP/2, middleware)
//!     → request.rs (request ID)
//!     → routing::HandlerChain (first matching mount rule)
//!     → dispatcher.rs (application resources + operational.rs)
//!       or assets.rs (single-page app)
//!     → Send to client
//! ```

pub mod assets;
pub mod dispatcher;
pub mod handler;
pub mod operational;
pub mod request;
pub mod server;

pub use assets::StaticAssetHandler;
pub use dispatcher::ApiDispatcher;
pub use handler::{handler_fn, HandlerRef, RequestHandler};
pub use request::{MountContext, X_REQUEST_ID};
pub use server::{RunningHost, WebHost};
