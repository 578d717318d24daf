//! services/api/src/lib.rs
//!
//! HTTP service for generating, editing and storing courses.

pub mod adapters;
pub mod config;
pub mod error;
pub mod web;
