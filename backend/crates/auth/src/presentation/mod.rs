//! Presentation Layer
//!
//! HTTP handlers, DTOs, router, middleware and the admin audit trail.

pub mod audit;
pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod router;

pub use audit::{AuditEvent, AuditOutcome, AuditSink, MemoryAuditSink, TracingAuditSink};
pub use handlers::AuthAppState;
pub use middleware::{AuthorizationGate, attach_identity, authorization_gate};
pub use router::{auth_router, auth_router_generic, auth_routes, protect};
