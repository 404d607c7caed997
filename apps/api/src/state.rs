use crate::relay::Relay;

/// Shared application state injected into all route handlers via Axum extractors.
/// Read-only for the lifetime of the process.
#[derive(Clone)]
pub struct AppState {
    pub relay: Relay,
}
