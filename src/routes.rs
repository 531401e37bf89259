// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{delete, get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{auth, classes, completion, exercises, export, students},
    state::AppState,
    utils::jwt::admin_middleware,
};

/// Assembles the main application router.
///
/// * Public routes: session login/logout and the completion form API.
/// * Admin routes: everything else, behind `admin_middleware`.
/// * Applies global middleware (Trace, CORS).
pub fn create_router(state: AppState) -> Router {
    let origins = [
        HeaderValue::from_static("http://localhost:3000"),
        HeaderValue::from_static("http://127.0.0.1:3000"),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .expose_headers([header::CONTENT_DISPOSITION])
        .allow_credentials(true);

    let public_routes = Router::new()
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route(
            "/complete/{token}",
            get(completion::get_target).post(completion::submit_completion),
        );

    let admin_routes = Router::new()
        .route("/classes", get(classes::list_classes).post(classes::create_class))
        .route(
            "/classes/{id}",
            get(classes::get_class)
                .put(classes::update_class)
                .delete(classes::delete_class),
        )
        .route(
            "/classes/{id}/students",
            get(students::list_students).post(students::create_student),
        )
        .route(
            "/classes/{id}/exercises",
            get(exercises::list_exercises).post(exercises::create_exercise),
        )
        .route("/classes/{id}/export", get(export::export_class))
        .route("/students/{id}", delete(students::delete_student))
        .route(
            "/exercises/{id}",
            get(exercises::get_exercise).delete(exercises::delete_exercise),
        )
        .route("/exercises/{id}/completions", get(exercises::list_completions))
        .route("/exercises/{id}/export", get(export::export_exercise))
        // Only matched routes are guarded, unknown paths still answer 404
        .route_layer(middleware::from_fn_with_state(state.clone(), admin_middleware));

    Router::new()
        .nest("/api", public_routes.merge(admin_routes))
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
