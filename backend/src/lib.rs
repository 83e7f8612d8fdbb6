//! Stock Price API Library
//!
//! This library provides the core functionality for the stock price service,
//! including:
//! - Embedded SQLite migrations and a pooled connection layer
//! - Coercion of loosely-typed JSON input into typed price records
//! - Bulk JSON import with per-field coercion warnings
//! - CRUD HTTP endpoints over the `stocks` table

pub mod api;
pub mod app;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod schema;
pub mod services;
