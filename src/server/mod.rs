// src/server/mod.rs

//! HTTP server (Axum) exposing discovery, progress and archive endpoints.

pub mod app;
pub mod routes;

pub use app::{build_router, serve};
