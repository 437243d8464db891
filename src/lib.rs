//! FitTrack Library
//!
//! Fitness and habit tracking: storage, analytics and the MCP tool surface.

pub mod analytics;
pub mod build_info;
pub mod config;
pub mod db;
pub mod error;
pub mod mcp;
pub mod models;
pub mod tools;
