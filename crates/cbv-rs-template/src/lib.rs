//! # cbv-rs-template
//!
//! Template rendering for cbv-rs. The [`Engine`](engine::Engine) loads
//! templates from directories or strings and renders them against a context
//! mapping built by the views.

pub mod engine;

pub use engine::{Context, Engine};
