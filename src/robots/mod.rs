//! Robots.txt politeness
//!
//! [`PolitenessCache`] fetches and caches robots.txt per origin and answers
//! whether a user agent may fetch a URL. A missing or unreachable robots.txt
//! allows everything.

mod cache;
mod parser;

pub use cache::{PolitenessCache, RobotsEntry};
pub use parser::RobotsRules;
