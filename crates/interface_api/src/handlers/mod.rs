//! Request handlers

pub mod explain;
pub mod health;
pub mod scoring;
