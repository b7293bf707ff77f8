//! `GET /` — the file browser page, rendered with the current listing.

use crate::{
    services::storage_service::StorageService,
    web::{browser::FETCH_ERROR, page::render_index},
};
use axum::{extract::State, response::Html};
use tracing::warn;

pub async fn index(State(service): State<StorageService>) -> Html<String> {
    match service.list_files().await {
        Ok(files) => Html(render_index(&files, None)),
        Err(err) => {
            warn!("listing files for index page failed: {}", err);
            Html(render_index(&[], Some(FETCH_ERROR)))
        }
    }
}
