use thiserror::Error;

#[derive(Debug, Error)]
pub enum FlenvError {
    #[error("Cannot decode into {type_name}: target must be a struct or map")]
    NotAStruct { type_name: &'static str },

    #[error("Unknown argument '{flag}' passed")]
    UnknownFlag { flag: String },

    #[error("Invalid argument '{token}' passed")]
    MalformedFlag { token: String },

    #[error("Missing value for flag '{flag}'")]
    MissingValue { flag: String },

    #[error("Invalid value for '{key}': {source}")]
    InvalidValue { key: String, source: ValueError },

    #[error("{key} is required")]
    MissingRequired { key: String },

    #[error("Option needs a short or a long name")]
    UnnamedOption,

    #[error("Invalid option name '{name}'")]
    InvalidName { name: String },

    #[error("Option '{name}' is already registered")]
    DuplicateOption { name: String },

    #[error("Failed to decode configuration: {reason}")]
    Decode { reason: String },
}

/// A value cell rejected the text it was asked to parse.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("'{input}' is not a valid {expected}{}", detail_suffix(.detail))]
pub struct ValueError {
    pub expected: &'static str,
    pub input: String,
    pub detail: Option<String>,
}

impl ValueError {
    pub fn new(expected: &'static str, input: &str) -> Self {
        Self {
            expected,
            input: input.to_string(),
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl ToString) -> Self {
        self.detail = Some(detail.to_string());
        self
    }
}

fn detail_suffix(detail: &Option<String>) -> String {
    detail
        .as_ref()
        .map(|d| format!(" ({d})"))
        .unwrap_or_default()
}
