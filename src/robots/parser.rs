//! Robots.txt rule evaluation
//!
//! Allow/Disallow matching is delegated to the robotstxt crate. Crawl-delay
//! is not part of that crate's matcher, so it is read from the rule groups here.

use robotstxt::DefaultMatcher;
use std::time::Duration;
use url::Url;

/// A robots.txt body and the rule groups parsed out of it
#[derive(Debug, Clone, Default)]
pub struct RobotsRules {
    body: String,
    groups: Vec<RuleGroup>,
}

/// One `User-agent` block and the crawl delay it declares
#[derive(Debug, Clone, Default)]
struct RuleGroup {
    agents: Vec<String>,
    crawl_delay: Option<f64>,
}

impl RobotsRules {
    /// Parses a robots.txt body
    ///
    /// Malformed lines are ignored; a body with no usable rules allows everything.
    pub fn from_body(body: &str) -> Self {
        Self {
            body: body.to_string(),
            groups: parse_groups(body),
        }
    }

    /// Returns true if `agent` may fetch `url` under these rules
    pub fn is_allowed(&self, agent: &str, url: &Url) -> bool {
        if self.body.trim().is_empty() {
            return true;
        }
        let mut matcher = DefaultMatcher::default();
        matcher.one_agent_allowed_by_robots(&self.body, product_token(agent), url.as_str())
    }

    /// Crawl delay declared for `agent`, falling back to the wildcard group
    pub fn crawl_delay(&self, agent: &str) -> Option<Duration> {
        let token = product_token(agent).to_ascii_lowercase();

        let specific = self.groups.iter().find_map(|group| {
            group
                .agents
                .iter()
                .any(|a| a != "*" && token.contains(a.as_str()))
                .then_some(group.crawl_delay)
                .flatten()
        });
        let wildcard = || {
            self.groups
                .iter()
                .filter(|group| group.agents.iter().any(|a| a == "*"))
                .find_map(|group| group.crawl_delay)
        };

        // Values a Duration cannot hold are ignored like malformed ones
        specific
            .or_else(wildcard)
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
    }
}

/// The name part of a user agent string, e.g. `SweepBot` for `SweepBot/1.0 (+url)`
fn product_token(agent: &str) -> &str {
    agent
        .split(|c: char| c == '/' || c.is_whitespace())
        .find(|part| !part.is_empty())
        .unwrap_or(agent)
}

fn parse_groups(body: &str) -> Vec<RuleGroup> {
    let mut groups: Vec<RuleGroup> = Vec::new();
    // Consecutive User-agent lines share one group
    let mut collecting_agents = false;

    for line in body.lines() {
        let line = line.split('#').next().unwrap_or_default().trim();
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim().to_ascii_lowercase();
        let value = value.trim();

        match key.as_str() {
            "user-agent" => {
                if !collecting_agents {
                    groups.push(RuleGroup::default());
                    collecting_agents = true;
                }
                if let Some(group) = groups.last_mut() {
                    group.agents.push(value.to_ascii_lowercase());
                }
            }
            "crawl-delay" => {
                collecting_agents = false;
                if let (Some(group), Ok(delay)) = (groups.last_mut(), value.parse::<f64>()) {
                    group.crawl_delay = Some(delay);
                }
            }
            _ => collecting_agents = false,
        }
    }

    groups
}
