use std::future::{ready, Ready};

use actix_web::{dev::Payload, FromRequest, HttpRequest};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::AppError;

/// Header carrying the authenticated student's identity, set by the upstream
/// auth collaborator. Authentication itself is out of scope for this service;
/// unauthenticated callers are redirected to login before they reach us.
pub const STUDENT_ID_HEADER: &str = "x-student-id";

static STUDENT_ID_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]{1,64}$").expect("student id pattern is valid"));

/// Extractor for the current student identity forwarded by the auth layer.
#[derive(Debug, Clone)]
pub struct CurrentStudent(pub String);

impl FromRequest for CurrentStudent {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let student_id = req
            .headers()
            .get(STUDENT_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .filter(|value| STUDENT_ID_REGEX.is_match(value))
            .map(|value| value.to_string());

        ready(student_id.map(CurrentStudent).ok_or_else(|| {
            AppError::Unauthorized("Missing or malformed student identity".to_string())
        }))
    }
}
