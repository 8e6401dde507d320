mod input_sanitizer;

pub use input_sanitizer::{InputSanitizer, DEFAULT_MAX_JOKE_LENGTH};
