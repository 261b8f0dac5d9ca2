//! Forward, reverse and batch host name lookups through the operating system's resolver.
//!
//! [`Resolver`] wraps the system resolver (`getaddrinfo`/`getnameinfo`) behind a [`Backend`]
//! trait. Failed lookups produce empty results, and the reason is appended to a diagnostics log
//! (see [`diag`]). Batches of host names are resolved on a pool of worker threads by
//! [`Resolver::resolve_batch`].
//!
//! ```no_run
//! use hostlookup::Resolver;
//!
//! let resolver = Resolver::new();
//! for ip in resolver.resolve("example.com") {
//!     println!("{}", ip);
//! }
//! let results = resolver.resolve_batch(&["example.com", "example.org"]);
//! assert_eq!(results.len(), 2);
//! ```

pub mod backend;
mod batch;
pub mod cli;
pub mod config;
pub mod diag;
pub mod error;
pub mod resolver;

#[cfg(test)]
mod mock;

pub use backend::{Backend, Families, SystemBackend};
pub use config::ResolverBuilder;
pub use error::LookupError;
pub use resolver::Resolver;

/// Diagnostics log written in the working directory unless configured otherwise.
pub const DEFAULT_LOG_FILE: &str = "dns_resolver.log";
