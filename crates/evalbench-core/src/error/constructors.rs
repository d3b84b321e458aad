//! Constructor methods for BenchError

use std::path::Path;

use super::types::BenchError;

impl BenchError {
    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            context: None,
        }
    }

    /// Create a configuration error with context
    pub fn config_with_context(message: impl Into<String>, context: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            context: Some(context.into()),
        }
    }

    /// Create a new template error
    pub fn template(message: impl Into<String>) -> Self {
        Self::Template {
            message: message.into(),
            field: None,
        }
    }

    /// Create a template error naming the missing field
    pub fn missing_field(field: impl Into<String>) -> Self {
        let field = field.into();
        Self::Template {
            message: format!("case has no value for template field '{}'", field),
            field: Some(field),
        }
    }

    /// Create a new generation error
    pub fn generation(message: impl Into<String>) -> Self {
        Self::Generation {
            message: message.into(),
            provider: None,
        }
    }

    /// Create a generation error tagged with the provider
    pub fn generation_with_provider(
        message: impl Into<String>,
        provider: impl Into<String>,
    ) -> Self {
        Self::Generation {
            message: message.into(),
            provider: Some(provider.into()),
        }
    }

    /// Create a new evaluation error
    pub fn evaluation(message: impl Into<String>) -> Self {
        Self::Evaluation {
            message: message.into(),
        }
    }

    /// Create a new IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
            path: None,
        }
    }

    /// Create an IO error for a path
    pub fn io_at(message: impl Into<String>, path: &Path) -> Self {
        Self::Io {
            message: message.into(),
            path: Some(path.display().to_string()),
        }
    }

    /// Create a new serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
            context: None,
        }
    }

    /// Create a serialization error with context
    pub fn serialization_with_context(
        message: impl Into<String>,
        context: impl Into<String>,
    ) -> Self {
        Self::Serialization {
            message: message.into(),
            context: Some(context.into()),
        }
    }
}
