//! Service layer for the gallery grabber.
//!
//! This module contains the business logic for:
//! - Viewer link extraction (`LinkExtractor`)
//! - Viewer page resolution (`ImageResolver`)
//! - Job progress tracking (`JobTracker`)
//! - Request pacing (`Pacer`)
//! - Archive assembly (`ArchiveAssembler`)

mod archive;
mod images;
mod jobs;
mod links;
mod pacing;

pub use archive::{Archive, ArchiveAssembler, entry_name};
pub use images::{ImageResolver, PostForm};
pub use jobs::JobTracker;
pub use links::LinkExtractor;
pub use pacing::Pacer;
