use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderName, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use chrono::{DateTime, Utc};

use crate::models::principal::Role;
use crate::routes::{self, Route};
use crate::services::session_service::TOKEN_COOKIE;
use crate::utils::token;

pub const ROLE_HEADER: &str = "x-user-role";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    Expired,
    Authenticated(Role),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow { role: Option<Role> },
    Redirect { to: String, clear_token: bool },
}

impl GuardDecision {
    fn redirect(to: &str) -> Self {
        GuardDecision::Redirect {
            to: to.to_string(),
            clear_token: false,
        }
    }
}

/// Per-navigation authorization decided from the session token alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct RouteGuard;

impl RouteGuard {
    pub fn new() -> Self {
        Self
    }

    pub fn session_state(token: Option<&str>, now: DateTime<Utc>) -> SessionState {
        let Some(token) = token.filter(|t| !t.is_empty()) else {
            return SessionState::Unauthenticated;
        };
        match token::try_decode(token) {
            Some(claims) if !claims.is_expired_at(now) => SessionState::Authenticated(claims.role),
            _ => SessionState::Expired,
        }
    }

    pub fn evaluate(&self, path: &str, token: Option<&str>, now: DateTime<Utc>) -> GuardDecision {
        let public_only = routes::is_public_only(path);

        match Self::session_state(token, now) {
            SessionState::Unauthenticated if public_only => GuardDecision::Allow { role: None },
            SessionState::Unauthenticated => GuardDecision::redirect(routes::SIGN_IN),
            SessionState::Expired => GuardDecision::Redirect {
                to: routes::SIGN_IN.to_string(),
                clear_token: true,
            },
            SessionState::Authenticated(_) if public_only => {
                GuardDecision::redirect(routes::DASHBOARD)
            }
            SessionState::Authenticated(role) => match Route::parse(path).required_role() {
                Some(required) if required != role => GuardDecision::redirect(routes::DASHBOARD),
                _ => GuardDecision::Allow { role: Some(role) },
            },
        }
    }
}

pub fn token_from_cookies(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|raw| raw.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == TOKEN_COOKIE)
        .map(|(_, value)| value.to_string())
        .filter(|value| !value.is_empty())
}

/// Axum adapter: redirects or forwards, exposing the role downstream.
pub async fn route_guard(State(guard): State<RouteGuard>, mut req: Request, next: Next) -> Response {
    let path = req.uri().path().to_string();
    if routes::bypasses_guard(&path) {
        return next.run(req).await;
    }

    let token = token_from_cookies(req.headers());
    match guard.evaluate(&path, token.as_deref(), Utc::now()) {
        GuardDecision::Redirect { to, clear_token } => {
            tracing::debug!(%path, %to, clear_token, "Route guard redirect");
            let mut response = Redirect::temporary(&to).into_response();
            if clear_token {
                response.headers_mut().append(
                    header::SET_COOKIE,
                    HeaderValue::from_static("token=; Path=/; Max-Age=0"),
                );
            }
            response
        }
        GuardDecision::Allow { role } => {
            if let Some(role) = role {
                req.extensions_mut().insert(role);
            }
            let mut response = next.run(req).await;
            if let Some(role) = role {
                response.headers_mut().insert(
                    HeaderName::from_static(ROLE_HEADER),
                    HeaderValue::from_static(role.as_str()),
                );
            }
            response
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::token::test_tokens::issue;
    use chrono::Duration;

    fn guard() -> RouteGuard {
        RouteGuard::new()
    }

    #[test]
    fn anonymous_visitor_may_only_open_public_pages() {
        let now = Utc::now();
        assert_eq!(guard().evaluate("/sign-in", None, now), GuardDecision::Allow { role: None });
        assert_eq!(guard().evaluate("/register/company", None, now), GuardDecision::Allow { role: None });
        assert_eq!(guard().evaluate("/jobs", None, now), GuardDecision::redirect("/sign-in"));
        assert_eq!(guard().evaluate("/", Some(""), now), GuardDecision::redirect("/sign-in"));
    }

    #[test]
    fn expired_token_is_dropped_even_on_public_pages() {
        let token = issue("5", "user", Duration::minutes(-1));
        for path in ["/jobs", "/sign-in"] {
            assert_eq!(
                guard().evaluate(path, Some(&token), Utc::now()),
                GuardDecision::Redirect { to: "/sign-in".into(), clear_token: true }
            );
        }
    }

    #[test]
    fn malformed_token_counts_as_expired() {
        assert_eq!(
            RouteGuard::session_state(Some("garbage"), Utc::now()),
            SessionState::Expired
        );
    }

    #[test]
    fn signed_in_visitor_is_sent_away_from_public_pages() {
        for role in ["user", "company"] {
            let token = issue("5", role, Duration::hours(1));
            assert_eq!(guard().evaluate("/register", Some(&token), Utc::now()), GuardDecision::redirect("/"));
            assert_eq!(guard().evaluate("/sign-in", Some(&token), Utc::now()), GuardDecision::redirect("/"));
        }
    }

    #[test]
    fn role_scoped_pages_redirect_on_mismatch() {
        let user = issue("5", "user", Duration::hours(1));
        let company = issue("9", "company", Duration::hours(1));
        let now = Utc::now();
        assert_eq!(guard().evaluate("/jobs/new", Some(&user), now), GuardDecision::redirect("/"));
        assert_eq!(guard().evaluate("/applications", Some(&company), now), GuardDecision::redirect("/"));
        assert_eq!(
            guard().evaluate("/jobs/3/candidates", Some(&company), now),
            GuardDecision::Allow { role: Some(Role::Company) }
        );
        assert_eq!(
            guard().evaluate("/jobs/3", Some(&user), now),
            GuardDecision::Allow { role: Some(Role::User) }
        );
    }

    #[test]
    fn reads_token_among_other_cookies() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("theme=dark; token=abc.def.ghi"));
        assert_eq!(token_from_cookies(&headers).as_deref(), Some("abc.def.ghi"));
        headers.insert(header::COOKIE, HeaderValue::from_static("token="));
        assert_eq!(token_from_cookies(&headers), None);
    }
}
