//! Application services for the content context.

pub mod fetcher;
