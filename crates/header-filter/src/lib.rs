//! Header filter for message envelopes.
//!
//! A [`HeaderFilter`] removes headers whose names match a fixed set of rules and
//! passes everything else through: the payload, the envelope id and timestamp,
//! and every header no rule matches, well-known routing headers included.
//!
//! Matching modes:
//! - Exact — a header is removed when its name equals a rule (case-sensitive)
//! - Pattern — rules are simple wildcards where `*` matches any run of
//!   characters (possibly empty); all other characters are literal
//!
//! Rules are validated and compiled once at construction. A bad configuration
//! is reported as a [`ConfigError`] there, never at transform time; after
//! construction [`HeaderFilter::transform`] is total and has no side effects.
//!
//! Example
//! ```
//! use header_filter::HeaderFilter;
//! use message_core::MessageBuilder;
//!
//! let filter = HeaderFilter::exact(["x", "z"]).unwrap();
//! let message = MessageBuilder::with_payload("test")
//!     .header("x", 1)
//!     .header("y", 2)
//!     .header("z", 3)
//!     .build();
//! let out = filter.transform(&message);
//! assert_eq!(out.headers().keys().collect::<Vec<_>>(), vec!["y"]);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod filter;
mod pattern;

pub use config::{ConfigError, FilterConfig, MatchMode};
pub use filter::HeaderFilter;
pub use pattern::glob_to_regex;
