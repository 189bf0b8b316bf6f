//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlStatus`: live, lock-free counters updated by every worker
//! - `StatusSnapshot`: a copy of those counters for display and summaries

mod status;

// Re-export main types
pub use status::{CrawlStatus, StatusSnapshot};
