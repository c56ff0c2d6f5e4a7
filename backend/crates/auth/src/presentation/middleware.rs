//! Auth Middleware
//!
//! Two stages run in front of every handler:
//! 1. [`attach_identity`] turns a bearer token into a [`RequestIdentity`]
//! 2. [`authorization_gate`] enforces the admin role on privileged paths and audits them

use axum::extract::{FromRequestParts, OptionalFromRequestParts, Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, request::Parts};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use kernel::error::app_error::ErrorReport;
use std::convert::Infallible;
use std::sync::Arc;

use crate::application::token::{TokenService, strip_bearer};
use crate::domain::identity::RequestIdentity;
use crate::error::{AuthError, AuthResult, TokenError};
use crate::presentation::audit::{AuditEvent, AuditOutcome, AuditSink};

// ============================================================================
// Identity stage
// ============================================================================

/// Validate the bearer token, if any, and attach the caller's identity
///
/// No `Authorization` header means an anonymous request. A header that is
/// present but unusable is rejected with 401 rather than silently ignored.
pub async fn attach_identity(
    State(tokens): State<Arc<TokenService>>,
    mut req: Request,
    next: Next,
) -> Response {
    match identify(req.headers(), &tokens) {
        Ok(Some(identity)) => {
            req.extensions_mut().insert(identity);
        }
        Ok(None) => {}
        Err(e) => return e.into_response(),
    }

    next.run(req).await
}

fn identify(headers: &HeaderMap, tokens: &TokenService) -> AuthResult<Option<RequestIdentity>> {
    let Some(value) = headers.get(AUTHORIZATION) else {
        return Ok(None);
    };

    let value = value.to_str().map_err(|_| TokenError::MalformedToken)?;
    let token = strip_bearer(value).ok_or(TokenError::MalformedToken)?;
    let claims = tokens.validate(token)?;

    Ok(Some(RequestIdentity::from(&claims)))
}

// ============================================================================
// Authorization gate
// ============================================================================

/// Role check for privileged path prefixes
#[derive(Clone)]
pub struct AuthorizationGate {
    prefixes: Arc<[String]>,
    audit: Arc<dyn AuditSink>,
}

impl AuthorizationGate {
    pub fn new<I, S>(prefixes: I, audit: Arc<dyn AuditSink>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            prefixes: prefixes.into_iter().map(Into::into).collect(),
            audit,
        }
    }

    /// Plain prefix match: `/admin` covers `/admin/x` and `/administrator` too
    pub fn is_privileged(&self, path: &str) -> bool {
        self.prefixes
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
    }

    /// Admit only an admin identity; a missing identity is a denial, not an error
    pub fn authorize(&self, identity: Option<&RequestIdentity>) -> AuthResult<()> {
        match identity {
            Some(identity) if identity.role.is_admin() => Ok(()),
            _ => Err(AuthError::Forbidden),
        }
    }
}

/// Middleware enforcing [`AuthorizationGate`] and writing the audit trail
///
/// Order of audit lines for a privileged path:
/// - denied: `FORBIDDEN` only, the handler never runs
/// - admitted: `GRANTED`, then `COMPLETED` or `FAILED` once the handler returns
pub async fn authorization_gate(
    State(gate): State<AuthorizationGate>,
    req: Request,
    next: Next,
) -> Response {
    if !gate.is_privileged(req.uri().path()) {
        return next.run(req).await;
    }

    let path = req.uri().path().to_owned();
    let method = req.method().to_string();
    let identity = req.extensions().get::<RequestIdentity>().copied();

    if let Err(e) = gate.authorize(identity.as_ref()) {
        gate.audit.record(&AuditEvent::new(
            identity.as_ref(),
            path,
            method,
            AuditOutcome::Forbidden,
        ));
        return e.into_response();
    }

    gate.audit.record(&AuditEvent::new(
        identity.as_ref(),
        path.as_str(),
        method.as_str(),
        AuditOutcome::Granted,
    ));

    let response = next.run(req).await;

    let event = if response.status().is_server_error() {
        let error = response
            .extensions()
            .get::<ErrorReport>()
            .map(|report| report.message.clone())
            .unwrap_or_else(|| response.status().to_string());
        AuditEvent::new(identity.as_ref(), path, method, AuditOutcome::Failed).with_error(error)
    } else {
        AuditEvent::new(identity.as_ref(), path, method, AuditOutcome::Completed)
    };
    gate.audit.record(&event);

    response
}

// ============================================================================
// Extractor
// ============================================================================

impl<S> FromRequestParts<S> for RequestIdentity
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestIdentity>()
            .copied()
            .ok_or(AuthError::Unauthenticated)
    }
}

impl<S> OptionalFromRequestParts<S> for RequestIdentity
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(parts.extensions.get::<RequestIdentity>().copied())
    }
}
