//! Identity extractors.
//!
//! The upstream authorization layer verifies credentials and attaches the
//! caller's identity to each request as headers. These extractors turn that
//! context into a typed [`Identity`] and enforce role requirements; no
//! password or token verification happens here.

use crate::error::AppError;
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{HeaderMap, request::Parts},
};
use gatehouse_core::types::{Identity, Role, UserId};

/// Header carrying the verified subject identifier.
pub const USER_ID_HEADER: &str = "x-user-id";
/// Header carrying the verified email address.
pub const USER_EMAIL_HEADER: &str = "x-user-email";
/// Header carrying the granted role.
pub const USER_ROLE_HEADER: &str = "x-user-role";
/// Header carrying comma-separated group memberships.
pub const USER_GROUPS_HEADER: &str = "x-user-groups";

fn identity_from_headers(headers: &HeaderMap) -> Result<Identity, AppError> {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .filter(|value| !value.is_empty())
            .map(ToString::to_string)
    };

    let user_id = header(USER_ID_HEADER)
        .ok_or_else(|| AppError::unauthorized("Authentication required"))?;
    let email = header(USER_EMAIL_HEADER)
        .ok_or_else(|| AppError::unauthorized("Authentication required"))?;
    let role: Role = header(USER_ROLE_HEADER)
        .ok_or_else(|| AppError::unauthorized("Authentication required"))?
        .parse()
        .map_err(|_| AppError::unauthorized("Unrecognized role"))?;
    let groups = header(USER_GROUPS_HEADER)
        .map(|value| {
            value
                .split(',')
                .filter(|group| !group.is_empty())
                .map(ToString::to_string)
                .collect()
        })
        .unwrap_or_default();

    Ok(Identity {
        user_id: UserId::from(user_id),
        email,
        role,
        groups,
    })
}

/// Any authenticated caller.
#[derive(Debug, Clone)]
pub struct Caller(pub Identity);

#[async_trait]
impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        identity_from_headers(&parts.headers).map(Self)
    }
}

/// A caller holding the administrator role.
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub Identity);

#[async_trait]
impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let identity = identity_from_headers(&parts.headers)?;
        if !identity.is_admin() {
            return Err(AppError::forbidden("Admin access required"));
        }
        Ok(Self(identity))
    }
}

/// A caller allowed to operate a check-in scanner (greeter or admin).
#[derive(Debug, Clone)]
pub struct RequireScanner(pub Identity);

#[async_trait]
impl<S> FromRequestParts<S> for RequireScanner
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let identity = identity_from_headers(&parts.headers)?;
        if !identity.can_scan() {
            return Err(AppError::forbidden("Greeter or admin access required"));
        }
        Ok(Self(identity))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts(headers: &[(&str, &str)]) -> Parts {
        let mut builder = Request::builder().uri("/");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn extracts_full_identity() {
        let mut parts = parts(&[
            (USER_ID_HEADER, "usr_1"),
            (USER_EMAIL_HEADER, "pat@example.com"),
            (USER_ROLE_HEADER, "GREETER"),
            (USER_GROUPS_HEADER, "greeters,volunteers"),
        ]);

        let Caller(identity) = Caller::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(identity.user_id.as_str(), "usr_1");
        assert_eq!(identity.role, Role::Greeter);
        assert_eq!(identity.groups, vec!["greeters", "volunteers"]);
        assert!(identity.can_scan());
    }

    #[tokio::test]
    async fn missing_identity_is_unauthorized() {
        let mut parts = parts(&[]);
        let err = Caller::from_request_parts(&mut parts, &()).await.unwrap_err();
        assert_eq!(err.code(), "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn non_admin_is_forbidden_from_admin_routes() {
        let mut parts = parts(&[
            (USER_ID_HEADER, "usr_1"),
            (USER_EMAIL_HEADER, "pat@example.com"),
            (USER_ROLE_HEADER, "USER"),
        ]);

        let err = RequireAdmin::from_request_parts(&mut parts, &())
            .await
            .unwrap_err();
        assert_eq!(err.code(), "FORBIDDEN");
    }

    #[tokio::test]
    async fn greeter_may_scan_but_not_administer() {
        let headers = [
            (USER_ID_HEADER, "usr_g"),
            (USER_EMAIL_HEADER, "g@example.com"),
            (USER_ROLE_HEADER, "GREETER"),
        ];

        let mut scanner_parts = parts(&headers);
        assert!(
            RequireScanner::from_request_parts(&mut scanner_parts, &())
                .await
                .is_ok()
        );

        let mut admin_parts = parts(&headers);
        assert!(
            RequireAdmin::from_request_parts(&mut admin_parts, &())
                .await
                .is_err()
        );
    }
}
