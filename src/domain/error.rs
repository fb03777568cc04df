use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("`{field}` is invalid: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },
}

impl DomainError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }
}

/// Ensure `value` is non-empty after trimming and at most `max_chars` characters long.
pub fn require_text(
    field: &'static str,
    value: &str,
    max_chars: usize,
) -> Result<String, DomainError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(field, "must not be empty"));
    }
    let count = trimmed.chars().count();
    if count > max_chars {
        return Err(DomainError::validation(
            field,
            format!("must be at most {max_chars} characters (got {count})"),
        ));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_text_trims_and_counts_chars() {
        assert_eq!(require_text("title", "  hi  ", 2).unwrap(), "hi");
        assert_eq!(require_text("title", "日本語", 3).unwrap(), "日本語");
        assert!(matches!(
            require_text("title", "日本語!", 3),
            Err(DomainError::Validation { field: "title", .. })
        ));
        assert!(require_text("title", "   ", 10).is_err());
    }
}
