//! Reels Service
//!
//! Backend for the Studyreel short-form learning platform: creator
//! uploads, personalized feeds, comments, playlists, and AI-generated
//! study packs (summary + quiz) built over a RAG pipeline.

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod openapi;
pub mod providers;
pub mod security;
pub mod services;

// Public re-exports
pub use config::Config;
pub use error::{AppError, Result};
