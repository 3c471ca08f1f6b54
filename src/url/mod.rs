//! URL handling module for Site-Harvest
//!
//! This module provides candidate normalization, same-site scoping, and the
//! content-rich URL classifier.

pub mod classify;
mod domain;
mod normalize;

// Re-export main functions
pub use classify::{is_content_url, Rejection, UrlFilter, Verdict};
pub use domain::{get_domain, host_matches_pattern, is_same_domain, site_domain};
pub use normalize::normalize_candidate;
