//! # Kanban API Server Library
//!
//! HTTP surface for boards, tasks and comments. Every resource handler goes
//! through the access gate in `kanban_shared::auth::authorization`.
//!
//! ## Modules
//!
//! - `app`: application state and router builder
//! - `config`: environment configuration
//! - `error`: error type and HTTP response mapping
//! - `routes`: route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod routes;
