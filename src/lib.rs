// src/lib.rs

//! Gallery Grabber Library
//!
//! Resolves the viewer pages of an image gallery to direct image URLs and
//! bundles the images into a ZIP archive.

pub mod error;
pub mod models;
pub mod pipeline;
#[cfg(feature = "server")]
pub mod server;
pub mod services;
pub mod utils;
