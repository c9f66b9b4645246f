//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::{GenerationError, ResolutionError};

/// Map domain errors to a one-line message for CLI output.
pub fn map_error(e: &GenerationError) -> String {
    match e {
        GenerationError::Resolution(ResolutionError::UnknownType(name)) => {
            format!("error: type '{}' is not defined in the catalog", name)
        }
        GenerationError::RetryExhausted { attempts, failure } => format!(
            "error: no valid instance after {} attempt(s): {}",
            attempts, failure
        ),
        other => format!("error: {}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::ValidationFailure;

    #[test]
    fn test_map_error() {
        let unknown = GenerationError::Resolution(ResolutionError::UnknownType("Foo".into()));
        assert_eq!(
            map_error(&unknown),
            "error: type 'Foo' is not defined in the catalog"
        );

        let exhausted = GenerationError::RetryExhausted {
            attempts: 3,
            failure: ValidationFailure::new("too small").with_path("$.n"),
        };
        assert_eq!(
            map_error(&exhausted),
            "error: no valid instance after 3 attempt(s): too small (violated: $.n)"
        );
    }
}
