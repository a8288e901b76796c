use crate::error::CommandError;
use shared::{MAX_CHAT_LENGTH, MAX_NAME_LENGTH};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

// Get current timestamp in milliseconds
pub fn get_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::from_secs(0))
        .as_millis() as u64
}

/// Trims a player name and strips control characters.
pub fn validate_name(name: &str) -> Result<String, CommandError> {
    let sanitized: String = name.trim().chars().filter(|c| !c.is_control()).collect();

    if sanitized.is_empty() {
        return Err(CommandError::InvalidName("name cannot be empty".to_string()));
    }
    if sanitized.chars().count() > MAX_NAME_LENGTH {
        return Err(CommandError::InvalidName(format!(
            "name cannot exceed {} characters",
            MAX_NAME_LENGTH
        )));
    }
    Ok(sanitized)
}

/// Trims a chat message and strips control characters other than newlines.
pub fn validate_message(text: &str) -> Result<String, CommandError> {
    let sanitized: String = text
        .trim()
        .chars()
        .filter(|c| !c.is_control() || *c == '\n')
        .collect();

    if sanitized.is_empty() {
        return Err(CommandError::InvalidMessage(
            "message cannot be empty".to_string(),
        ));
    }
    if sanitized.chars().count() > MAX_CHAT_LENGTH {
        return Err(CommandError::InvalidMessage(format!(
            "message cannot exceed {} characters",
            MAX_CHAT_LENGTH
        )));
    }
    Ok(sanitized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_is_monotonic_enough() {
        let a = get_timestamp();
        let b = get_timestamp();
        assert!(b >= a);
        assert!(a > 0);
    }

    #[test]
    fn test_validate_name() {
        assert_eq!(validate_name("  Ada  ").unwrap(), "Ada");
        assert_eq!(validate_name("Bo\u{7}b").unwrap(), "Bob");
        assert!(validate_name("   ").is_err());
        assert!(validate_name("\u{1b}").is_err());
        assert!(validate_name(&"x".repeat(32)).is_ok());
        assert!(validate_name(&"x".repeat(33)).is_err());
    }

    #[test]
    fn test_validate_message_keeps_newlines() {
        assert_eq!(validate_message(" gg\nwp ").unwrap(), "gg\nwp");
        assert!(validate_message("").is_err());
        assert!(validate_message(&"a".repeat(501)).is_err());
    }
}
