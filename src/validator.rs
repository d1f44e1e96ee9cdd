use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use crate::utils::errors::AppError;

fn collect_errors(errors: &ValidationErrors) -> Vec<String> {
    errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| {
                error
                    .message
                    .as_ref()
                    .map(|msg| msg.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", field))
            })
        })
        .collect()
}

/// JSON extractor that runs `validator` rules and converts every failure
/// into a `Validation` error with per-field detail messages.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| {
                let error_msg = rejection.body_text();

                if error_msg.contains("missing field") {
                    let field = error_msg
                        .split("missing field `")
                        .nth(1)
                        .and_then(|s| s.split('`').next())
                        .unwrap_or("unknown");
                    return AppError::validation(format!("{} is required", field));
                }

                if error_msg.contains("invalid type") {
                    return AppError::validation("Invalid field type in request");
                }

                if matches!(rejection, JsonRejection::MissingJsonContentType(_)) {
                    return AppError::BadRequest(
                        "Missing 'Content-Type: application/json' header".to_string(),
                    );
                }

                AppError::BadRequest("Invalid request body".to_string())
            })?;

        value
            .validate()
            .map_err(|errors| AppError::Validation(collect_errors(&errors)))?;

        Ok(ValidatedJson(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, Validate)]
    struct Dto {
        #[validate(email)]
        email: String,
        #[validate(length(min = 1))]
        name: String,
    }

    #[test]
    fn test_collect_errors_lists_each_invalid_field() {
        let dto = Dto {
            email: "not-an-email".to_string(),
            name: "".to_string(),
        };
        let errors = dto.validate().unwrap_err();
        let details = collect_errors(&errors);

        assert_eq!(details.len(), 2);
    }

    #[test]
    fn test_collect_errors_empty_for_valid_input() {
        let dto = Dto {
            email: "a@b.com".to_string(),
            name: "Jean".to_string(),
        };
        assert!(dto.validate().is_ok());
    }
}
