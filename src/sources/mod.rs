//! # Source abstractions.
//!
//! This module provides the producer side of a polling session:
//! - [`Source`] - trait for async, cancelable producers of one result per call
//! - [`SourceFn`] - closure-backed implementation
//! - [`BoxSourceFuture`] - the future returned by one invocation

mod source;
mod source_fn;

pub use source::{BoxSourceFuture, Source};
pub use source_fn::SourceFn;
