pub mod boarding;
#[cfg(feature = "web-form")]
pub mod form;

use axum::Router;
use std::sync::Arc;

/// Routes mounted under `/api`.
pub fn routes() -> Router<Arc<crate::AppState>> {
    Router::new().merge(boarding::routes())
}

/// Browser-facing pages mounted at the root.
pub fn pages() -> Router<Arc<crate::AppState>> {
    let router = Router::new();
    #[cfg(feature = "web-form")]
    let router = router.merge(form::routes());
    router
}
