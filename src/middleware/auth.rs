use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::AppState;

const HR_ROLES: [&str; 2] = ["hr", "admin"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    pub role: Option<String>,
    pub email: Option<String>,
}

/// The verified caller on every HR route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HrIdentity {
    pub user_id: Uuid,
    pub email: Option<String>,
}

pub fn is_hr(claims: &Claims) -> bool {
    let role = claims.role.as_deref().unwrap_or_default();
    HR_ROLES.iter().any(|r| r.eq_ignore_ascii_case(role))
}

pub async fn require_hr(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response> {
    let unauthorized = |code: &str| Error::Unauthorized(code.to_string());

    let auth_header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .ok_or_else(|| unauthorized("missing_authorization"))?;
    let auth_str = auth_header
        .to_str()
        .map_err(|_| unauthorized("bad_authorization"))?;
    let token = auth_str
        .strip_prefix("Bearer ")
        .ok_or_else(|| unauthorized("unsupported_scheme"))?;

    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(state.config.jwt_secret.as_bytes()),
        &validation,
    )
    .map_err(|_| unauthorized("invalid_token"))?
    .claims;

    if !is_hr(&claims) {
        return Err(Error::Forbidden("forbidden".into()));
    }
    let user_id = Uuid::parse_str(&claims.sub).map_err(|_| unauthorized("invalid_subject"))?;

    req.extensions_mut().insert(HrIdentity {
        user_id,
        email: claims.email,
    });
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(role: Option<&str>) -> Claims {
        Claims {
            sub: Uuid::new_v4().to_string(),
            exp: usize::MAX,
            role: role.map(String::from),
            email: None,
        }
    }

    #[test]
    fn hr_and_admin_roles_are_accepted() {
        assert!(is_hr(&claims(Some("hr"))));
        assert!(is_hr(&claims(Some("Admin"))));
    }

    #[test]
    fn other_roles_are_refused() {
        assert!(!is_hr(&claims(Some("applicant"))));
        assert!(!is_hr(&claims(None)));
    }
}
