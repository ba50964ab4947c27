//! Progress context.
//!
//! A learner's progress is the set of completed module ids, recorded as
//! events. The backend stream is the source of truth; the progress cache
//! is an optimistic local view reconciled against it. The diploma gate
//! decides course-completion eligibility and fails closed.

pub mod application;
pub mod domain;
