use axum::{
    extract::{Request, State},
    http::{HeaderMap, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;

use crate::{
    adapters::http::{app_state::AppState, cookies},
    app_error::AppError,
    domain::entities::principal::{PrincipalKind, Role},
    use_cases::gate::GateRequest,
};

/// Last path segment of the token renewal route.
pub const RENEWAL_SEGMENT: &str = "refreshToken";

/// State for one gated route group.
#[derive(Clone)]
pub struct GateGuard {
    pub app_state: AppState,
    pub kind: PrincipalKind,
    pub required_role: Option<Role>,
}

/// Runs the authorization gate and stores the `AuthenticatedPrincipal` in
/// the request extensions for handlers.
pub async fn gate_middleware(
    State(guard): State<GateGuard>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let refresh_token = cookies::refresh_token(&jar);
    let access_token = bearer_token(request.headers());
    let renewal = is_renewal_path(request.uri().path());

    let session = guard
        .app_state
        .gate(guard.kind)
        .authorize(GateRequest {
            refresh_token: refresh_token.as_deref(),
            access_token: access_token.as_deref(),
            renewal,
            required_role: guard.required_role,
        })
        .await?;

    tracing::debug!(
        principal_kind = %guard.kind,
        principal_id = %session.principal.id,
        renewal,
        "Request authorized"
    );
    request.extensions_mut().insert(session);

    Ok(next.run(request).await)
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then(|| token.to_string())
}

pub fn is_renewal_path(path: &str) -> bool {
    path.split('/').any(|segment| segment == RENEWAL_SEGMENT)
}
