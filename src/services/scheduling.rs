// src/services/scheduling.rs

use chrono::{DateTime, Duration, Utc};
use url::Url;

use crate::{error::AppError, models::interview::Interview};

/// Builds the video room URL for an interview under `base_url`.
pub fn meeting_url(base_url: &str, interview_id: &str) -> Result<String, AppError> {
    let mut base = Url::parse(base_url)
        .map_err(|e| AppError::InternalServerError(format!("Invalid meeting base URL: {e}")))?;
    // Without a trailing slash `join` would replace the last path segment.
    if !base.path().ends_with('/') {
        base.set_path(&format!("{}/", base.path()));
    }
    let room: String = format!("interview-{interview_id}")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect();
    let url = base
        .join(&room)
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;
    Ok(url.to_string())
}

/// Rejects start times in the past and overlaps with the interviewer's agenda.
pub fn check_slot(
    existing: &[Interview],
    start: DateTime<Utc>,
    duration_minutes: u32,
    now: DateTime<Utc>,
) -> Result<(), AppError> {
    if start <= now {
        return Err(AppError::Validation(
            "Interviews must be scheduled in the future".to_string(),
        ));
    }
    let end = start + Duration::minutes(i64::from(duration_minutes));
    if let Some(clash) = existing.iter().find(|i| i.overlaps(start, end)) {
        return Err(AppError::Conflict(format!(
            "Interviewer already has an interview at {}",
            clash.scheduled_at.to_rfc3339()
        )));
    }
    Ok(())
}
