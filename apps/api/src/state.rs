use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::backend_client::BackendClient;
use crate::config::Config;
use crate::explanation::Explainer;
use crate::segmentation::Segmenter;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Gateway to the generation backend. May be unconfigured.
    pub backend: BackendClient,
    /// Pluggable segmentation source. Default: BackendSegmenter over `backend`.
    pub segmenter: Arc<dyn Segmenter>,
    /// Pluggable explanation source. Default: BackendExplainer over `backend`.
    pub explainer: Arc<dyn Explainer>,
}

impl AppState {
    /// A fresh generator for one heuristic computation.
    pub fn rng(&self) -> StdRng {
        heuristic_rng(self.config.heuristic_seed)
    }
}

/// Seeded when `seed` is set, from OS entropy otherwise.
pub fn heuristic_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}
