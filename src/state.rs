use crate::config::Config;
use crate::payment::PaymentLinkGenerator;
use crate::service::StakeService;
use std::sync::Arc;

/// Shared by every request handler. Built once in `main`.
pub struct AppState {
    pub config: Config,
    pub stakes: StakeService,
    pub payments: Arc<dyn PaymentLinkGenerator>,
}
