//! Ordered middleware chain with literal path-prefix routing.
//!
//! Registrations are evaluated first-registered, first-evaluated. Each matching
//! handler either terminates the response or hands control to `next`.

pub mod chain;
pub mod error;
pub mod prefix;
pub mod response;

pub use chain::{Dispatcher, DispatcherBuilder, DispatchOptions, Middleware, Next, Registration, UnmatchedPolicy};
pub use error::DispatchError;
pub use prefix::RoutePrefix;
pub use response::ResponseWriter;
