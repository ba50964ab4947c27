//! Content context.
//!
//! Static per-world content and themes for the two course tracks, the
//! remote course model served by the backend, and the merge of remote
//! lesson overrides onto static content.

pub mod application;
pub mod domain;
pub mod merge;
pub mod registry;
