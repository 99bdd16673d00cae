use axum::extract::{Query, State};
use axum::response::Redirect;
use axum::Json;
use serde::Deserialize;

use crate::app_state::AppState;
use crate::services::backend::Backend;
use crate::services::home::{load_home_feed, search_redirect, HomeFeed};

#[derive(Debug, Deserialize)]
pub struct HomeSearchParams {
    #[serde(default)]
    pub q: String,
}

/// GET /api/v1/home: featured and recent jobs for the landing page.
pub async fn home_feed<B: Backend>(State(state): State<AppState<B>>) -> Json<HomeFeed> {
    Json(load_home_feed(state.backend.as_ref()).await)
}

/// GET /api/v1/home/search?q=: hand the term over to the listing page.
/// A blank term stays on the landing page.
pub async fn home_search(Query(params): Query<HomeSearchParams>) -> Redirect {
    match search_redirect(&params.q) {
        Some(location) => Redirect::to(&location),
        None => Redirect::to("/"),
    }
}
