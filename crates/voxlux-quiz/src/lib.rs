//! Quiz context.
//!
//! A quiz is a fixed question set tied to one module. Attempts are scored
//! by simple percent-correct against a per-quiz passing threshold, and
//! results are persisted on a best-effort basis.

pub mod application;
pub mod domain;
