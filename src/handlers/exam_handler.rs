use actix_web::{get, web, HttpResponse};

use crate::{
    app_state::AppState, auth::CurrentStudent, errors::AppError, models::dto::response::ExamDto,
};

#[get("/api/health")]
pub async fn health_check(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    state.db.health_check().await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "status": "ok" })))
}

/// Exam with its question set, answer key stripped.
#[get("/api/exams/{exam_id}")]
pub async fn get_exam(
    state: web::Data<AppState>,
    exam_id: web::Path<String>,
    _student: CurrentStudent,
) -> Result<HttpResponse, AppError> {
    let exam = state.attempt_service.get_exam(&exam_id).await?;
    Ok(HttpResponse::Ok().json(ExamDto::from(exam)))
}
