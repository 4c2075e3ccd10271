//! Storage module for persisting crawl progress
//!
//! This module handles the on-disk checkpoint that lets an interrupted crawl
//! resume:
//! - Per-domain checkpoint file naming
//! - Full-file JSON saves with atomic replacement
//! - Tolerant loading (missing or corrupt means a fresh start)
//! - Removal once a run completes

mod checkpoint;

pub use checkpoint::{Checkpoint, CheckpointStore};
