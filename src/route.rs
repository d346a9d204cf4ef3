use std::sync::Arc;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Router,
};

use crate::{handler::*, middleware::mw_require_auth, AppState};

pub fn create_router(app_state: Arc<AppState>) -> Router {
    // Creating a todo and reading per-owner stats need a resolved caller;
    // everything else is open.
    let protected = Router::new()
        .route("/todos/", post(create_todo))
        .route("/todos/stats", get(get_todo_stats))
        .route_layer(from_fn_with_state(app_state.clone(), mw_require_auth));

    Router::new()
        .route("/todos/", get(get_todos))
        .route("/todos/overdue", get(get_overdue_todos))
        .route("/todos/:id", put(update_todo).delete(delete_todo))
        .route("/users/", post(create_user))
        .route("/token", post(login))
        .route("/", get(health_checker_handler))
        .merge(protected)
        .with_state(app_state)
}
