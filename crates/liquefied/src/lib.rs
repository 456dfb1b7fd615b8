//! # Liquefied
//!
//! Deferred-finalization proxies for presentation values.
//!
//! A [`Liquefied`] value wraps an object (a number, a date, a list) and
//! behaves like it: operations are forwarded to the wrapped value, and results
//! of the same runtime type come back wrapped again, so a chain of calls keeps
//! its pending formatting. The chain ends when the configured finalizer runs,
//! explicitly or through `Display`.
//!
//! ```
//! use liquefied::{Finalizer, Liquefied, Value};
//!
//! let price = Liquefied::with_finalizer(
//!     Value::from(12.333),
//!     Finalizer::new("format").with_default_args(["%.2f"]),
//! );
//! assert_eq!(price.to_string(), "12.33");
//!
//! let doubled = price.invoke("*", &[Value::from(2)]).unwrap();
//! assert!(doubled.is_wrapped());
//! ```
//!
//! ## Modules
//!
//! - [`dispatch`]: name-based operations and the built-in object model
//! - [`finalizer`]: finalizer name, default args, default transform
//! - [`proxy`]: the proxy and its call outcomes
//! - [`value`]: the dynamic value type
//! - [`format`]: printf-style formatting used by `format` and `%`

#![deny(unsafe_code)]

pub mod dispatch;
pub mod error;
pub mod finalizer;
pub mod format;
pub mod id;
pub mod proxy;
pub mod value;

pub use dispatch::{Args, Dispatch};
pub use error::{LiquefyError, LiquefyResult};
pub use finalizer::{Finalizer, FinalizerConfig, Transform, DEFAULT_FINALIZER};
pub use format::sprintf;
pub use id::ProxyId;
pub use proxy::{Liquefied, Outcome};
pub use value::{Value, ValueKind};
