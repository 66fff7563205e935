use serde::Serialize;
use thiserror::Error;

/// Shortest text that may be sent for analysis (after trimming).
pub const MIN_CHARS: usize = 10;

/// Longest text the input control accepts.
pub const MAX_CHARS: usize = 10_000;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please enter at least {min} characters")]
    TooShort { min: usize },
    #[error("Text exceeds the maximum length of {max} characters")]
    TooLong { max: usize },
}

/// Validate user input and return the text that goes over the wire.
///
/// The minimum applies to the trimmed text, the maximum to what the user typed.
pub fn validate(text: &str) -> Result<&str, ValidationError> {
    if text.chars().count() > MAX_CHARS {
        return Err(ValidationError::TooLong { max: MAX_CHARS });
    }
    let trimmed = text.trim();
    if trimmed.chars().count() < MIN_CHARS {
        return Err(ValidationError::TooShort { min: MIN_CHARS });
    }
    Ok(trimmed)
}

/// State of the text input and submit control for a given input value.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct InputState {
    pub char_count: usize,
    pub counter_label: String,
    pub submit_enabled: bool,
}

pub fn input_state(text: &str, request_in_flight: bool) -> InputState {
    let char_count = text.chars().count();
    InputState {
        char_count,
        counter_label: format!("{} / {}", format_count(char_count), format_count(MAX_CHARS)),
        submit_enabled: char_count >= MIN_CHARS && !request_in_flight,
    }
}

/// `1234567` -> `"1,234,567"`
pub fn format_count(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_trims_before_min_check() {
        assert_eq!(
            validate("   short   "),
            Err(ValidationError::TooShort { min: 10 })
        );
        assert_eq!(validate("  exactly ten  "), Ok("exactly ten"));
    }

    #[test]
    fn test_validate_rejects_over_max() {
        let long = "a".repeat(MAX_CHARS + 1);
        assert_eq!(
            validate(&long),
            Err(ValidationError::TooLong { max: MAX_CHARS })
        );
        let at_max = "a".repeat(MAX_CHARS);
        assert!(validate(&at_max).is_ok());
    }

    #[test]
    fn test_validate_counts_characters_not_bytes() {
        // 10 characters, 20 bytes
        let text = "éééééééééé";
        assert_eq!(validate(text), Ok(text));
    }

    #[test]
    fn test_input_state() {
        let state = input_state("", false);
        assert_eq!(state.counter_label, "0 / 10,000");
        assert!(!state.submit_enabled);

        let text = "x".repeat(1234);
        let state = input_state(&text, false);
        assert_eq!(state.char_count, 1234);
        assert_eq!(state.counter_label, "1,234 / 10,000");
        assert!(state.submit_enabled);

        let state = input_state(&text, true);
        assert!(!state.submit_enabled);
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            ValidationError::TooShort { min: 10 }.to_string(),
            "Please enter at least 10 characters"
        );
        assert_eq!(
            ValidationError::TooLong { max: 10_000 }.to_string(),
            "Text exceeds the maximum length of 10000 characters"
        );
    }

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1000), "1,000");
        assert_eq!(format_count(1234567), "1,234,567");
    }
}
