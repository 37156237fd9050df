use crate::config::types::{Config, CrawlerConfig, FetchConfig, UserAgentConfig};
use crate::{ConfigError, ConfigResult};

/// Validates the entire configuration
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_fetch_config(&config.fetch)?;
    Ok(())
}

/// Validates dispatch loop configuration
fn validate_crawler_config(config: &CrawlerConfig) -> ConfigResult<()> {
    if config.concurrency_limit < 1 || config.concurrency_limit > 100 {
        return Err(ConfigError::Validation(format!(
            "concurrency_limit must be between 1 and 100, got {}",
            config.concurrency_limit
        )));
    }

    if config.revisit_interval_secs == Some(0) {
        return Err(ConfigError::Validation(
            "revisit_interval_secs must be > 0 when set".to_string(),
        ));
    }

    if config.max_pages == Some(0) {
        return Err(ConfigError::Validation(
            "max_pages must be >= 1 when set".to_string(),
        ));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> ConfigResult<()> {
    if config.agents.is_empty() {
        return Err(ConfigError::Validation(
            "at least one user agent must be configured".to_string(),
        ));
    }

    if let Some(agent) = config.agents.iter().find(|a| a.trim().is_empty()) {
        return Err(ConfigError::Validation(format!(
            "user agent cannot be blank, got '{}'",
            agent
        )));
    }

    // Header values must be visible ASCII
    if let Some(agent) = config
        .agents
        .iter()
        .find(|a| !a.chars().all(|c| c.is_ascii() && !c.is_ascii_control()))
    {
        return Err(ConfigError::Validation(format!(
            "user agent contains characters not allowed in a header: '{}'",
            agent
        )));
    }

    Ok(())
}

/// Validates HTTP fetch configuration
fn validate_fetch_config(config: &FetchConfig) -> ConfigResult<()> {
    if config.request_timeout_ms == 0 {
        return Err(ConfigError::Validation(
            "request_timeout_ms must be > 0".to_string(),
        ));
    }

    if config.retry_attempts < 1 || config.retry_attempts > 10 {
        return Err(ConfigError::Validation(format!(
            "retry_attempts must be between 1 and 10, got {}",
            config.retry_attempts
        )));
    }

    if let Some(code) = config
        .redirect_status_codes
        .iter()
        .find(|code| !(300..400).contains(*code))
    {
        return Err(ConfigError::Validation(format!(
            "redirect status code {} is not a 3xx status",
            code
        )));
    }

    if config
        .blocked_content_types
        .iter()
        .any(|prefix| prefix.trim().is_empty())
    {
        return Err(ConfigError::Validation(
            "blocked content type prefixes cannot be empty".to_string(),
        ));
    }

    Ok(())
}
