//! URL handling module for Sumi-Sweep
//!
//! This module provides URL normalization, origin extraction and the
//! in-domain test used to keep a crawl on its start site.

mod domain;
mod normalize;

pub use domain::{is_same_domain, netloc, origin_of};
pub use normalize::{normalize_parsed, normalize_url};
