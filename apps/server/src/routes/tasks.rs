use actix_web::{HttpResponse, get, post, web};
use latmon::tasks::Admission;

use crate::error::AppError;
use crate::state::AppState;

/// Every task the registry knows about, completed runs included.
#[get("/tasks")]
pub async fn list_tasks(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(state.scheduler.list_tasks())
}

#[get("/tasks/{label}")]
pub async fn get_task(
    state: web::Data<AppState>,
    label: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    match state.scheduler.get_task(&label) {
        Some(task) => Ok(HttpResponse::Ok().json(task)),
        None => Err(AppError::NotFound),
    }
}

/// Trigger a probing run.
///
/// Replies 200 with the in-flight label when a run is already underway,
/// 201 with a fresh label otherwise. The run itself proceeds in the
/// background; callers poll the task for progress.
#[post("/tasks")]
pub async fn trigger_run(state: web::Data<AppState>) -> HttpResponse {
    match state.scheduler.start_run() {
        Admission::AlreadyRunning(label) => HttpResponse::Ok().json(label),
        Admission::Started(label) => HttpResponse::Created().json(label),
    }
}
