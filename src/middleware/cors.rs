use axum::http::{header, HeaderValue, Method};
use tower_http::cors::{AllowOrigin, CorsLayer};

/// Lets the applicant site and HR console call the API from the public origin.
pub fn cors_layer(public_base_url: &str) -> CorsLayer {
    let origin = match HeaderValue::from_str(public_base_url) {
        Ok(value) => AllowOrigin::exact(value),
        Err(_) => {
            tracing::warn!(public_base_url, "PUBLIC_BASE_URL is not a valid origin; CORS disabled");
            AllowOrigin::list(Vec::<HeaderValue>::new())
        }
    };
    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}
