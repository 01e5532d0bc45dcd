// CORS configuration
// Origins come from the configured allow-list. Methods and headers mirror
// the preflight request, which is the credential-compatible form of "any".

use axum::http::HeaderValue;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};

use crate::types::{AppError, AppResult};

pub fn cors_layer(allowed_origins: &[String]) -> AppResult<CorsLayer> {
    let origins = allowed_origins
        .iter()
        .map(|origin| {
            if origin == "*" {
                return Err(AppError::Internal(
                    "CORS cannot use wildcard origin '*' with credentials; list explicit origins"
                        .to_string(),
                ));
            }
            origin
                .parse::<HeaderValue>()
                .map_err(|e| AppError::Internal(format!("Invalid CORS origin {}: {}", origin, e)))
        })
        .collect::<AppResult<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true))
}
