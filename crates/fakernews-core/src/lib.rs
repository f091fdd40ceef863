//! Core types and trait definitions for the fakernews service.
//!
//! This crate is free of HTTP and database dependencies. The store backend,
//! the API router and the client all depend on it.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod game;
pub mod item;
pub mod listing;
pub mod store;
pub mod user;

pub use error::{Classify, Error, ErrorClass, Result};
