//! Session routes shared by `/users` and `/sellers`. The nesting decides the
//! principal kind; the handlers are the same for both.

use std::sync::Arc;

use axum::{
    Extension, Json, Router,
    extract::State,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    adapters::http::{
        app_state::AppState,
        cookies::with_refresh_cookie,
        middleware::{GateGuard, RENEWAL_SEGMENT, gate_middleware},
    },
    app_error::AppResult,
    domain::entities::principal::{PrincipalKind, Role},
    use_cases::{
        auth::{AuthUseCases, RegisterInput},
        gate::AuthenticatedPrincipal,
    },
};

#[derive(Deserialize)]
struct RegisterPayload {
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

#[derive(Deserialize)]
struct LoginPayload {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

#[derive(Deserialize)]
struct LogoutPayload {
    #[serde(default)]
    email: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TokenResponse {
    access_token: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LogoutResponse {
    status: &'static str,
    message: &'static str,
    user: String,
    logged_out: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PrincipalProfileResponse {
    id: Uuid,
    kind: PrincipalKind,
    email: String,
    name: String,
    role: Role,
}

pub fn router(app_state: AppState, kind: PrincipalKind) -> Router<AppState> {
    let guard = GateGuard {
        app_state,
        kind,
        required_role: Some(kind.default_role()),
    };
    let whoami_path = match kind {
        PrincipalKind::User => "/me",
        PrincipalKind::Seller => "/whoami",
    };

    let protected = Router::new()
        .route("/logout", post(logout))
        .route(&format!("/{RENEWAL_SEGMENT}"), post(refresh_token))
        .route(whoami_path, get(whoami))
        .route_layer(middleware::from_fn_with_state(guard, gate_middleware));

    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .merge(protected)
        .layer(Extension(kind))
}

async fn register(
    State(auth): State<Arc<AuthUseCases>>,
    State(app_state): State<AppState>,
    Extension(kind): Extension<PrincipalKind>,
    jar: CookieJar,
    Json(payload): Json<RegisterPayload>,
) -> AppResult<impl IntoResponse> {
    let session = auth
        .register(
            kind,
            RegisterInput {
                name: payload.name,
                email: payload.email,
                password: payload.password,
            },
        )
        .await?;

    let jar = with_refresh_cookie(jar, &app_state.config, kind, session.tokens.refresh);
    Ok((
        StatusCode::CREATED,
        jar,
        Json(TokenResponse {
            access_token: session.tokens.access,
        }),
    ))
}

async fn login(
    State(auth): State<Arc<AuthUseCases>>,
    State(app_state): State<AppState>,
    Extension(kind): Extension<PrincipalKind>,
    jar: CookieJar,
    Json(payload): Json<LoginPayload>,
) -> AppResult<impl IntoResponse> {
    let session = auth.login(kind, &payload.email, &payload.password).await?;

    let jar = with_refresh_cookie(jar, &app_state.config, kind, session.tokens.refresh);
    Ok((
        jar,
        Json(TokenResponse {
            access_token: session.tokens.access,
        }),
    ))
}

async fn logout(
    State(auth): State<Arc<AuthUseCases>>,
    Extension(session): Extension<AuthenticatedPrincipal>,
    Json(payload): Json<LogoutPayload>,
) -> AppResult<impl IntoResponse> {
    let outcome = auth.logout(&session, &payload.email).await?;

    let (status, response) = if outcome.logged_out {
        (
            StatusCode::OK,
            LogoutResponse {
                status: "success",
                message: "Logged out",
                user: outcome.email,
                logged_out: true,
            },
        )
    } else {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            LogoutResponse {
                status: "error",
                message: "Logout failed",
                user: outcome.email,
                logged_out: false,
            },
        )
    };
    Ok((status, Json(response)))
}

async fn refresh_token(
    State(auth): State<Arc<AuthUseCases>>,
    State(app_state): State<AppState>,
    Extension(session): Extension<AuthenticatedPrincipal>,
    jar: CookieJar,
) -> AppResult<impl IntoResponse> {
    let kind = session.principal.kind;
    let tokens = auth.refresh(&session)?;

    let jar = with_refresh_cookie(jar, &app_state.config, kind, tokens.refresh);
    Ok((
        jar,
        Json(TokenResponse {
            access_token: tokens.access,
        }),
    ))
}

async fn whoami(
    Extension(session): Extension<AuthenticatedPrincipal>,
) -> Json<PrincipalProfileResponse> {
    let principal = session.principal;
    Json(PrincipalProfileResponse {
        id: principal.id,
        kind: principal.kind,
        email: principal.email,
        name: principal.name,
        role: principal.role,
    })
}
