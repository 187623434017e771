use axum::{
    Router,
    routing::{get, post},
};

use crate::handlers::records::{create_record, delete_record, read_record, update_record};
use crate::service::CollectionService;

#[derive(Clone)]
pub struct TabulaState {
    pub collections: CollectionService,
}

impl TabulaState {
    pub fn new(collections: CollectionService) -> Self {
        Self { collections }
    }
}

pub fn tabula_router(state: TabulaState) -> Router {
    Router::new()
        .route("/{collection}", post(create_record))
        .route(
            "/{collection}/{id}",
            get(read_record)
                .post(update_record)
                .put(update_record)
                .delete(delete_record),
        )
        .with_state(state)
}
