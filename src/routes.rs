// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{get, post, put},
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{academy, admin, quiz, sales},
    state::AppState,
    utils::jwt::{admin_middleware, auth_middleware, staff_middleware},
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (academy, sales, admin).
/// * Every route requires a bearer token; sales need a staff role and
///   admin routes the admin role.
/// * Applies global middleware (Trace, CORS).
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin([
            HeaderValue::from_static("http://localhost:3000"),
            HeaderValue::from_static("http://127.0.0.1:3000"),
        ])
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let academy_routes = Router::new()
        .route("/courses", get(academy::list_courses))
        .route("/courses/{id}", get(academy::get_course))
        .route("/courses/{id}/enroll", post(academy::enroll))
        .route("/courses/{id}/certificate", get(academy::certificate_status))
        .route("/lessons/{id}", get(academy::get_lesson))
        .route("/lessons/{id}/complete", post(academy::complete_lesson))
        .route("/quizzes/{id}/submit", post(quiz::submit_quiz))
        .route("/me/attempts", get(quiz::my_attempts))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    let sales_routes = Router::new()
        .route("/", post(sales::create_sale))
        .route("/summary", get(sales::sales_summary))
        // Auth runs first, then the role check
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
                .layer(middleware::from_fn(staff_middleware)),
        );

    let admin_routes = Router::new()
        .route("/dashboard", get(admin::dashboard))
        .route("/users", get(admin::list_users))
        .route("/users/{id}/sales", get(admin::user_sales))
        .route("/courses", post(admin::create_course))
        .route("/courses/{id}/lessons", post(admin::create_lesson))
        .route("/lessons/{id}/quiz", post(admin::create_quiz))
        .route(
            "/quizzes/{id}",
            put(admin::update_quiz).delete(admin::delete_quiz),
        )
        .route("/activity", get(admin::list_activity))
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
                .layer(middleware::from_fn(admin_middleware)),
        );

    Router::new()
        .nest("/api/academy", academy_routes)
        .nest("/api/sales", sales_routes)
        .nest("/api/admin", admin_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
