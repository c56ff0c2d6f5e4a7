//! Auth Router

use axum::{
    Router, middleware,
    routing::{get, post},
};
use platform::password::PasswordHasher;
use sqlx::PgPool;
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::{AuthService, TokenService};
use crate::domain::repository::UserRepository;
use crate::error::{AuthError, AuthResult};
use crate::infra::postgres::PgUserRepository;
use crate::presentation::audit::{AuditSink, TracingAuditSink};
use crate::presentation::handlers::{self, AuthAppState};
use crate::presentation::middleware::{AuthorizationGate, attach_identity, authorization_gate};

/// Create the Auth router with PostgreSQL repository and `tracing` audit log
pub fn auth_router(pool: PgPool, config: &AuthConfig) -> AuthResult<Router> {
    auth_router_generic(PgUserRepository::new(pool), config, Arc::new(TracingAuditSink))
}

/// Create a generic Auth router for any repository implementation
///
/// The returned router is already wrapped by [`protect`].
pub fn auth_router_generic<R>(
    repo: R,
    config: &AuthConfig,
    audit: Arc<dyn AuditSink>,
) -> AuthResult<Router>
where
    R: UserRepository + Send + Sync + 'static,
{
    let hasher = PasswordHasher::new(config.hashing_cost, config.pepper().map(<[u8]>::to_vec))
        .map_err(|e| AuthError::Internal(e.to_string()))?;
    let tokens = Arc::new(TokenService::new(config)?);
    let service = AuthService::new(Arc::new(repo), Arc::new(hasher), Arc::clone(&tokens));

    let gate = AuthorizationGate::new(config.admin_path_prefixes.iter().cloned(), audit);

    Ok(protect(auth_routes(Arc::new(service)), tokens, gate))
}

/// Sign-up, sign-in, the admin ping and the health check, unprotected
pub fn auth_routes<R>(service: Arc<AuthService<R>>) -> Router
where
    R: UserRepository + Send + Sync + 'static,
{
    let state = AuthAppState { service };

    Router::new()
        .route("/auth/signup", post(handlers::sign_up::<R>))
        .route("/auth/signin", post(handlers::sign_in::<R>))
        .route("/admin/ping", get(handlers::admin_ping))
        .route("/health", get(handlers::health))
        .with_state(state)
}

/// Wrap every route in the identity stage and then the admin gate
///
/// Layers added last run first, so a request meets `attach_identity`
/// before `authorization_gate` sees it.
pub fn protect(router: Router, tokens: Arc<TokenService>, gate: AuthorizationGate) -> Router {
    router
        .layer(middleware::from_fn_with_state(gate, authorization_gate))
        .layer(middleware::from_fn_with_state(tokens, attach_identity))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::config::HashingCost;
    use crate::domain::value_object::{email::Email, user_role::UserRole};
    use crate::infra::memory::InMemoryUserRepository;
    use crate::presentation::audit::{AuditOutcome, MemoryAuditSink};
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use kernel::id::UserId;
    use serde_json::{Value, json};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::ServiceExt;

    struct Harness {
        app: Router,
        tokens: Arc<TokenService>,
        audit: MemoryAuditSink,
        calls: Arc<AtomicUsize>,
    }

    fn harness() -> Harness {
        let config = AuthConfig {
            hashing_cost: HashingCost::new(1024, 1, 1),
            ..AuthConfig::with_random_secret()
        };
        let tokens = Arc::new(TokenService::new(&config).unwrap());
        let hasher = Arc::new(PasswordHasher::new(config.hashing_cost, None).unwrap());
        let service = Arc::new(AuthService::new(
            Arc::new(InMemoryUserRepository::new()),
            hasher,
            Arc::clone(&tokens),
        ));

        let calls = Arc::new(AtomicUsize::new(0));
        let counted = Arc::clone(&calls);
        let extra = Router::new()
            .route(
                "/admin/reports",
                get(move || {
                    let counted = Arc::clone(&counted);
                    async move {
                        counted.fetch_add(1, Ordering::SeqCst);
                        "reports"
                    }
                }),
            )
            .route(
                "/admin/broken",
                get(|| async { AuthError::Internal("report generation crashed".into()) }),
            );

        let audit = MemoryAuditSink::new();
        let sink: Arc<dyn AuditSink> = Arc::new(audit.clone());
        let gate = AuthorizationGate::new(config.admin_path_prefixes.iter().cloned(), sink);

        let app = protect(auth_routes(service).merge(extra), Arc::clone(&tokens), gate);

        Harness {
            app,
            tokens,
            audit,
            calls,
        }
    }

    impl Harness {
        fn bearer(&self, role: UserRole) -> (UserId, String) {
            let user_id = UserId::new();
            let token = self
                .tokens
                .issue(user_id, &Email::new("someone@x.com").unwrap(), role)
                .unwrap();
            (user_id, format!("Bearer {}", token))
        }

        async fn get(&self, path: &str, authorization: Option<&str>) -> (StatusCode, Vec<u8>) {
            let mut builder = Request::builder().method("GET").uri(path);
            if let Some(value) = authorization {
                builder = builder.header(header::AUTHORIZATION, value);
            }
            self.send(builder.body(Body::empty()).unwrap()).await
        }

        async fn post_json(&self, path: &str, body: Value) -> (StatusCode, Value) {
            let request = Request::builder()
                .method("POST")
                .uri(path)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap();
            let (status, bytes) = self.send(request).await;
            (status, serde_json::from_slice(&bytes).unwrap())
        }

        async fn send(&self, request: Request<Body>) -> (StatusCode, Vec<u8>) {
            let response = self.app.clone().oneshot(request).await.unwrap();
            let status = response.status();
            let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            (status, bytes.to_vec())
        }
    }

    #[tokio::test]
    async fn test_admin_reaches_handler_and_is_audited() {
        let h = harness();
        let (user_id, bearer) = h.bearer(UserRole::Admin);

        let (status, body) = h.get("/admin/reports", Some(&bearer)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"reports");
        assert_eq!(h.calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            h.audit.outcomes(),
            vec![AuditOutcome::Granted, AuditOutcome::Completed]
        );

        let events = h.audit.events();
        assert!(events.iter().all(|e| e.user_id == Some(user_id)));
        assert!(events.iter().all(|e| e.path == "/admin/reports"));
        assert!(events.iter().all(|e| e.method == "GET"));
    }

    #[tokio::test]
    async fn test_user_role_is_forbidden_without_invoking_handler() {
        let h = harness();
        let (user_id, bearer) = h.bearer(UserRole::User);

        let (status, body) = h.get("/admin/reports", Some(&bearer)).await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["detail"], crate::error::FORBIDDEN_MESSAGE);
        assert_eq!(h.calls.load(Ordering::SeqCst), 0);

        let events = h.audit.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].outcome, AuditOutcome::Forbidden);
        assert_eq!(events[0].user_id, Some(user_id));
        assert_eq!(events[0].role, Some(UserRole::User));
    }

    #[tokio::test]
    async fn test_missing_identity_is_forbidden() {
        let h = harness();

        let (status, _) = h.get("/admin/reports", None).await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(h.calls.load(Ordering::SeqCst), 0);

        let events = h.audit.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].outcome, AuditOutcome::Forbidden);
        assert_eq!(events[0].user_id, None);
        assert_eq!(events[0].role, None);
    }

    #[tokio::test]
    async fn test_invalid_token_is_rejected_before_gate() {
        let h = harness();
        let (_, bearer) = h.bearer(UserRole::Admin);
        let tampered = format!("{}x", bearer);

        for value in [tampered.as_str(), "Bearer not.a.token", "Token abc"] {
            let (status, body) = h.get("/admin/reports", Some(value)).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            let body: Value = serde_json::from_slice(&body).unwrap();
            assert_eq!(body["detail"], "Authentication required");
        }

        assert_eq!(h.calls.load(Ordering::SeqCst), 0);
        assert!(h.audit.events().is_empty());
    }

    #[tokio::test]
    async fn test_server_error_in_handler_is_audited_as_failed() {
        let h = harness();
        let (_, bearer) = h.bearer(UserRole::Admin);

        let (status, _) = h.get("/admin/broken", Some(&bearer)).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            h.audit.outcomes(),
            vec![AuditOutcome::Granted, AuditOutcome::Failed]
        );
        assert_eq!(
            h.audit.events()[1].error.as_deref(),
            Some("Internal server error")
        );
    }

    #[tokio::test]
    async fn test_public_paths_are_not_audited() {
        let h = harness();

        let (status, body) = h.get("/health", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"ok");
        assert!(h.audit.events().is_empty());
    }

    #[tokio::test]
    async fn test_sign_up_then_use_token_on_admin_route() {
        let h = harness();

        let (status, body) = h
            .post_json(
                "/auth/signup",
                json!({ "email": "root@x.com", "password": "Passw0rd", "userRole": "ADMIN" }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["email"], "root@x.com");
        let bearer = body["bearerToken"].as_str().unwrap().to_string();
        assert!(bearer.starts_with("Bearer "));

        let (status, ping) = h.get("/admin/ping", Some(&bearer)).await;
        assert_eq!(status, StatusCode::OK);
        let ping: Value = serde_json::from_slice(&ping).unwrap();
        assert_eq!(ping["role"], "ADMIN");
        assert_eq!(ping["userId"], body["userId"]);
    }

    #[tokio::test]
    async fn test_signed_up_user_cannot_reach_admin_route() {
        let h = harness();

        let (_, body) = h
            .post_json(
                "/auth/signup",
                json!({ "email": "a@x.com", "password": "Passw0rd" }),
            )
            .await;
        let bearer = body["bearerToken"].as_str().unwrap().to_string();

        let (status, _) = h.get("/admin/ping", Some(&bearer)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_sign_up_failures_over_http() {
        let h = harness();
        let signup = json!({ "email": "a@x.com", "password": "Passw0rd", "roleName": "USER" });

        let (status, _) = h.post_json("/auth/signup", signup.clone()).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = h.post_json("/auth/signup", signup).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["detail"], "Email is already registered");

        let (status, body) = h
            .post_json(
                "/auth/signup",
                json!({ "email": "b@x.com", "password": "Passw0rd", "userRole": "INVALID_ROLE" }),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["detail"].as_str().unwrap().contains("INVALID_ROLE"));
    }

    #[tokio::test]
    async fn test_sign_in_over_http() {
        let h = harness();
        let (_, signed_up) = h
            .post_json(
                "/auth/signup",
                json!({ "email": "a@x.com", "password": "Passw0rd" }),
            )
            .await;

        let (status, body) = h
            .post_json(
                "/auth/signin",
                json!({ "email": "a@x.com", "password": "Passw0rd" }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["userId"], signed_up["userId"]);
        assert!(body["bearerToken"].as_str().unwrap().starts_with("Bearer "));

        let (wrong_status, wrong) = h
            .post_json(
                "/auth/signin",
                json!({ "email": "a@x.com", "password": "wrong" }),
            )
            .await;
        let (unknown_status, unknown) = h
            .post_json(
                "/auth/signin",
                json!({ "email": "nonexistent@test.com", "password": "Password123" }),
            )
            .await;

        assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
        assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
        assert_eq!(wrong["detail"], unknown["detail"]);
    }
}
