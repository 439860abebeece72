//! mangapress - download every chapter of a manga title as PDF documents.
//!
//! A chapter URL is matched to a [`sites::SiteAdapter`], which knows how to
//! find the title's chapter list and each chapter's page images in the
//! browser-rendered DOM. The [`pipeline::Pipeline`] renders each chapter,
//! fetches its images into scratch storage, and binds them into one PDF per
//! chapter with [`assemble::DocumentAssembler`].

pub mod assemble;
pub mod browser;
pub mod config;
pub mod events;
pub mod fetcher;
pub mod lister;
pub mod models;
pub mod pipeline;
pub mod scratch;
pub mod sites;
pub mod utils;

pub use config::Config;
pub use pipeline::{Pipeline, PipelineError, RunSummary};
pub use sites::SiteAdapter;
