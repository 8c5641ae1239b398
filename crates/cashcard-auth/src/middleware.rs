//! Authentication Middleware for Axum
//!
//! - [`AuthLayer`] decodes HTTP Basic credentials, verifies them through the
//!   injected [`Authenticator`] and stores the [`AuthenticatedUser`] in the
//!   request extensions
//! - [`require_card_owner`] guards routes that need the card-owner role

use axum::{
    body::Body,
    extract::Request,
    http::{header, StatusCode},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{Layer, Service};

use crate::basic::extract_basic_credentials;
use crate::error::{AuthError, ErrorResponse};
use crate::registry::Authenticator;
use crate::types::{AuthRealm, AuthenticatedUser, Role};

/// Authentication middleware layer
#[derive(Clone)]
pub struct AuthLayer {
    authenticator: Arc<dyn Authenticator>,
    realm: AuthRealm,
}

impl AuthLayer {
    pub fn new(authenticator: Arc<dyn Authenticator>, realm: impl Into<Arc<str>>) -> Self {
        Self {
            authenticator,
            realm: AuthRealm(realm.into()),
        }
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthMiddleware {
            inner,
            authenticator: self.authenticator.clone(),
            realm: self.realm.clone(),
        }
    }
}

/// Authentication middleware service
#[derive(Clone)]
pub struct AuthMiddleware<S> {
    inner: S,
    authenticator: Arc<dyn Authenticator>,
    realm: AuthRealm,
}

impl<S> Service<Request> for AuthMiddleware<S>
where
    S: Service<Request, Response = Response> + Send + Clone + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request) -> Self::Future {
        let authenticator = self.authenticator.clone();
        let realm = self.realm.clone();
        // Take the service that was driven to readiness.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            let (mut parts, body) = req.into_parts();
            parts.extensions.insert(realm.clone());

            let credentials = match extract_basic_credentials(&parts.headers) {
                Ok(credentials) => credentials,
                Err(e) => return Ok(auth_error_response(e, &realm)),
            };

            if let Some(credentials) = credentials {
                match authenticator.verify(&credentials).await {
                    Ok(user) => {
                        tracing::debug!(username = %user.username, "Authenticated request");
                        parts.extensions.insert(user);
                    }
                    Err(e) => {
                        if e.is_challenge() {
                            tracing::warn!(username = %credentials.username, error = %e, "Authentication failed");
                        } else {
                            tracing::error!(error = ?e, "Authentication error");
                        }
                        return Ok(auth_error_response(e, &realm));
                    }
                }
            }

            // No credentials: let the request through without a user; route
            // guards decide whether that is acceptable.
            inner.call(Request::from_parts(parts, body)).await
        })
    }
}

/// Build the error response for authentication failures
pub fn auth_error_response(error: AuthError, realm: &AuthRealm) -> Response {
    let status =
        StatusCode::from_u16(error.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let body = ErrorResponse::from(&error);

    let mut res = Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, "application/json");

    if error.is_challenge() {
        res = res.header(header::WWW_AUTHENTICATE, realm.challenge());
    }

    res.body(Body::from(serde_json::to_string(&body).unwrap_or_default()))
        .unwrap_or_else(|_| Response::new(Body::empty()))
}

/// Reject requests without an authenticated user holding `role`
pub fn check_role(req: &Request, role: Role) -> Result<(), Response> {
    let realm = req.extensions().get::<AuthRealm>().cloned().unwrap_or_default();

    let user = req
        .extensions()
        .get::<AuthenticatedUser>()
        .ok_or_else(|| auth_error_response(AuthError::Unauthenticated, &realm))?;

    if !user.has_role(role) {
        tracing::warn!(username = %user.username, required = %role, "Role check failed");
        return Err(auth_error_response(AuthError::InsufficientPermissions, &realm));
    }

    Ok(())
}

/// Route guard: 401 without credentials, 403 without the card-owner role
pub async fn require_card_owner(req: Request, next: Next) -> Result<Response, Response> {
    check_role(&req, Role::CardOwner)?;
    Ok(next.run(req).await)
}
