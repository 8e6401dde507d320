use jokes_errors::AppError;

pub const DEFAULT_MAX_JOKE_LENGTH: usize = 500;

pub struct InputSanitizer;

impl InputSanitizer {
    /// Returns the cleaned joke text, or a validation error carrying the reply for the submitter.
    pub fn validate_joke(text: &str, max_len: usize) -> Result<String, AppError> {
        let cleaned: String = text
            .trim()
            .chars()
            .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
            .collect();

        if cleaned.is_empty() {
            return Err(AppError::Validation(
                "Please provide a joke to submit!".to_string(),
            ));
        }

        let len = cleaned.chars().count();
        if len > max_len {
            tracing::warn!("Rejected joke submission of {} characters", len);
            return Err(AppError::Validation(format!(
                "Joke is too long! Please keep it under {} characters.",
                max_len
            )));
        }

        Ok(cleaned)
    }

    pub fn validate_identity(value: &str, what: &str) -> Result<String, AppError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(AppError::Validation(format!("{} must not be empty", what)));
        }
        Ok(value.to_string())
    }
}
