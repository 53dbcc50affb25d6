use crate::dtos::soldiers::SOLDIER_ID_RE;
use axum::async_trait;
use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use axum::http::request::Parts;
use axum::Json;
use serde::de::DeserializeOwned;
use service_core::error::AppError;
use validator::Validate;

/// JSON body extractor that maps both parse failures and the first violated
/// constraint to the structured 400 body.
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate + 'static,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| AppError::Validation(format!("body: {}", e.body_text())))?;

        value
            .validate()
            .map_err(|e| AppError::validation("body", &e))?;

        Ok(ValidatedJson(value))
    }
}

/// Path-parameter id extractor enforcing the 7-digit pattern before the
/// handler runs.
#[derive(Debug, Clone)]
pub struct SoldierId(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for SoldierId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::Validation("params/id: is required".to_string()))?;

        if !SOLDIER_ID_RE.is_match(&id) {
            return Err(AppError::Validation(
                "params/id: must be a string of exactly 7 digits".to_string(),
            ));
        }

        Ok(SoldierId(id))
    }
}
