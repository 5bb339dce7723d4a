use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::{domain::entities::principal::PrincipalKind, infra::config::AppConfig};

/// Name of the refresh-token cookie.
pub const REFRESH_COOKIE: &str = "jid";

/// Sets the refresh cookie on the jar. Max-age follows the kind's refresh lifetime.
pub fn with_refresh_cookie(
    jar: CookieJar,
    config: &AppConfig,
    kind: PrincipalKind,
    token: String,
) -> CookieJar {
    let same_site = if config.cookie_same_site_strict {
        SameSite::Strict
    } else {
        SameSite::None
    };
    let cookie = Cookie::build((REFRESH_COOKIE, token))
        .http_only(true)
        .secure(true)
        .same_site(same_site)
        .path("/")
        .max_age(config.tokens.profile(kind).refresh_ttl)
        .build();
    jar.add(cookie)
}

pub fn refresh_token(jar: &CookieJar) -> Option<String> {
    jar.get(REFRESH_COOKIE)
        .map(|c| c.value().to_owned())
        .filter(|v| !v.is_empty())
}
