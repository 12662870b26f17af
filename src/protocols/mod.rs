//! Protocol implementations.
//!
//! - `turtle`: line-oriented canvas drawing protocol
//!
//! Each protocol has a parser and a per-connection handler.

pub mod turtle;
