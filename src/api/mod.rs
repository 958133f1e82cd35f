mod handlers;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::db::Database;

pub fn create_router(db: Database) -> Router {
    let api = Router::new()
        // Careers
        .route("/careers", get(handlers::list_careers))
        .route("/careers", post(handlers::create_career))
        .route("/careers/{id}", get(handlers::get_career))
        .route("/careers/{id}", put(handlers::update_career))
        .route("/careers/{id}", delete(handlers::delete_career))
        // Subjects
        .route("/subjects", get(handlers::list_subjects))
        .route("/subjects", post(handlers::create_subject))
        .route("/subjects/{id}", get(handlers::get_subject))
        .route("/subjects/{id}", put(handlers::update_subject))
        .route("/subjects/{id}", delete(handlers::delete_subject))
        // Classrooms
        .route("/classrooms", get(handlers::list_classrooms))
        .route("/classrooms", post(handlers::create_classroom))
        .route("/classrooms/{id}", get(handlers::get_classroom))
        .route("/classrooms/{id}", put(handlers::update_classroom))
        .route("/classrooms/{id}", delete(handlers::delete_classroom))
        // Time slots
        .route("/schedules", get(handlers::list_time_slots))
        .route("/schedules", post(handlers::create_time_slot))
        .route("/schedules/{id}", get(handlers::get_time_slot))
        .route("/schedules/{id}", put(handlers::update_time_slot))
        .route("/schedules/{id}", delete(handlers::delete_time_slot))
        // Teachers
        .route("/teachers", get(handlers::list_teachers))
        .route("/teachers", post(handlers::create_teacher))
        .route("/teachers/{id}", get(handlers::get_teacher))
        .route("/teachers/{id}", put(handlers::update_teacher))
        .route("/teachers/{id}", delete(handlers::delete_teacher))
        // Students
        .route("/students", get(handlers::list_students))
        .route("/students", post(handlers::create_student))
        .route("/students/{id}", get(handlers::get_student))
        .route("/students/{id}", put(handlers::update_student))
        .route("/students/{id}", delete(handlers::delete_student))
        // Groups
        .route("/groups", get(handlers::list_groups))
        .route("/groups", post(handlers::create_group))
        .route("/groups/{id}", get(handlers::get_group))
        .route("/groups/{id}", put(handlers::update_group))
        .route("/groups/{id}", delete(handlers::delete_group))
        // Health
        .route("/health", get(handlers::health));

    Router::new()
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(db)
}
