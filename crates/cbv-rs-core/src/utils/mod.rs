//! Utility functions for cbv-rs.

pub mod text;
