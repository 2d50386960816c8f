//! Application state for the Gatehouse HTTP server.

use crate::config::Config;
use gatehouse_core::admission::AdmissionService;
use gatehouse_core::checkout::CheckoutService;
use gatehouse_core::clock::Clock;
use gatehouse_core::comp::CompService;
use gatehouse_core::confirmation::ConfirmationService;
use gatehouse_core::store::LedgerStore;
use gatehouse_core::webhook::WebhookVerifier;
use std::sync::Arc;

/// Application state shared across all HTTP handlers.
///
/// Cloned (cheaply via `Arc`) for each request. Everything here is immutable
/// after startup; the ledger behind `store` is the only shared mutable
/// resource, and the services mutate it exclusively through its atomic
/// primitives.
#[derive(Clone)]
pub struct AppState {
    /// The ledger, for direct reads by the CRUD handlers.
    pub store: Arc<dyn LedgerStore>,
    /// Checkout orchestrator.
    pub checkout: CheckoutService,
    /// Payment confirmation handler.
    pub confirmation: ConfirmationService,
    /// Admission validator.
    pub admission: AdmissionService,
    /// Comp issuance service.
    pub comp: CompService,
    /// Webhook signature verifier.
    pub webhooks: WebhookVerifier,
    /// Wall clock, injected for testability.
    pub clock: Arc<dyn Clock>,
    /// Process-wide configuration.
    pub config: Arc<Config>,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        store: Arc<dyn LedgerStore>,
        checkout: CheckoutService,
        confirmation: ConfirmationService,
        admission: AdmissionService,
        comp: CompService,
        webhooks: WebhookVerifier,
        clock: Arc<dyn Clock>,
        config: Arc<Config>,
    ) -> Self {
        Self {
            store,
            checkout,
            confirmation,
            admission,
            comp,
            webhooks,
            clock,
            config,
        }
    }
}
