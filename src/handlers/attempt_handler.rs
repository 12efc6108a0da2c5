use actix_web::{post, put, web, HttpResponse};
use chrono::Utc;
use validator::Validate;

use crate::{
    app_state::AppState,
    auth::CurrentStudent,
    errors::AppError,
    models::dto::{
        request::RecordAnswerRequest,
        response::{AttemptDto, ResultDto},
    },
    services::countdown,
};

/// Resume-or-start for the current student. Opens the attempt's timer
/// session so the deadline is enforced server-side even if the client
/// disconnects.
#[post("/api/exams/{exam_id}/attempts")]
pub async fn start_attempt(
    state: web::Data<AppState>,
    exam_id: web::Path<String>,
    student: CurrentStudent,
) -> Result<HttpResponse, AppError> {
    let attempt = state
        .attempt_service
        .resume_or_start(&exam_id, &student.0)
        .await?;
    let saved = state.attempt_service.saved_answers(&attempt.id).await?;

    state
        .sessions
        .open(
            state.attempt_service.clone(),
            &attempt,
            state.config.countdown_tick(),
            state.config.autosave_interval(),
        )
        .await;

    let remaining = countdown::remaining_seconds(attempt.deadline, Utc::now());
    Ok(HttpResponse::Ok().json(AttemptDto::from_parts(&attempt, saved, remaining)))
}

/// Per-question answer save, fired on edit and on question navigation.
///
/// The answer is staged in the session buffer and flushed immediately; a
/// transient storage failure is answered 202 and left to the autosave tick
/// to retry, per the bounded-staleness design. Without a live session
/// (e.g. after a server restart) the answer is written through directly.
#[put("/api/attempts/{attempt_id}/answers/{question_id}")]
pub async fn record_answer(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
    request: web::Json<RecordAnswerRequest>,
    student: CurrentStudent,
) -> Result<HttpResponse, AppError> {
    request.validate()?;
    let (attempt_id, question_id) = path.into_inner();

    let Some(session) = state.sessions.get(&attempt_id).await else {
        state
            .attempt_service
            .record_answer(&attempt_id, &student.0, &question_id, &request.value)
            .await?;
        return Ok(HttpResponse::NoContent().finish());
    };

    // The session buffer belongs to the attempt's owner; verify ownership
    // before staging anything into it.
    state
        .attempt_service
        .owned_attempt(&attempt_id, &student.0)
        .await?;

    session.stage_answer(&question_id, &request.value).await;
    match session.flush_answers().await {
        Ok(()) => Ok(HttpResponse::NoContent().finish()),
        Err(err) if err.is_transient() => {
            log::warn!(
                "deferred save for question {} on attempt {}: {}",
                question_id,
                attempt_id,
                err
            );
            Ok(HttpResponse::Accepted().finish())
        }
        Err(err) => Err(err),
    }
}

/// Explicit submit. Errors surface so the client can retry; idempotence on
/// the service side makes the retry safe. The timer session is released only
/// after the submit succeeds.
#[post("/api/attempts/{attempt_id}/submit")]
pub async fn submit_attempt(
    state: web::Data<AppState>,
    attempt_id: web::Path<String>,
    student: CurrentStudent,
) -> Result<HttpResponse, AppError> {
    let attempt_id = attempt_id.into_inner();

    // Verify ownership before the flush below can touch the owner's
    // staged answer on behalf of a foreign caller.
    state
        .attempt_service
        .owned_attempt(&attempt_id, &student.0)
        .await?;

    if let Some(session) = state.sessions.get(&attempt_id).await {
        // Best-effort flush of the in-flight answer before scoring; a failed
        // flush must not block submission.
        if let Err(err) = session.flush_answers().await {
            log::warn!(
                "pre-submit flush for attempt {} failed: {}",
                attempt_id,
                err
            );
        }
    }

    let attempt = state
        .attempt_service
        .submit(&attempt_id, &student.0)
        .await?;
    state.sessions.close(&attempt_id).await;

    Ok(HttpResponse::Ok().json(ResultDto::from(attempt)))
}
