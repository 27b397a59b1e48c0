// src/models/interview.rs

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::{error::AppError, models::parse_db_enum};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterviewStatus {
    Scheduled,
    Cancelled,
}

impl InterviewStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InterviewStatus::Scheduled => "scheduled",
            InterviewStatus::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Interview {
    pub id: String,
    pub candidate_id: String,
    pub interviewer_id: String,
    pub scheduled_at: DateTime<Utc>,
    pub duration_minutes: u32,
    /// Video-conferencing room the front end embeds.
    pub meeting_url: String,
    pub status: InterviewStatus,
    pub created_at: DateTime<Utc>,
}

impl Interview {
    pub fn ends_at(&self) -> DateTime<Utc> {
        self.scheduled_at + Duration::minutes(i64::from(self.duration_minutes))
    }

    /// Half-open interval overlap.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.status == InterviewStatus::Scheduled && self.scheduled_at < end && start < self.ends_at()
    }
}

/// Represents the 'interviews' table in the database.
#[derive(Debug, FromRow)]
pub struct InterviewRow {
    pub id: String,
    pub candidate_id: String,
    pub interviewer_id: String,
    pub scheduled_at: DateTime<Utc>,
    pub duration_minutes: i64,
    pub meeting_url: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<InterviewRow> for Interview {
    type Error = AppError;

    fn try_from(row: InterviewRow) -> Result<Self, Self::Error> {
        Ok(Interview {
            id: row.id,
            candidate_id: row.candidate_id,
            interviewer_id: row.interviewer_id,
            scheduled_at: row.scheduled_at,
            duration_minutes: u32::try_from(row.duration_minutes)
                .map_err(|e| AppError::InternalServerError(e.to_string()))?,
            meeting_url: row.meeting_url,
            status: parse_db_enum("status", &row.status)?,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct ScheduleInterviewRequest {
    pub scheduled_at: DateTime<Utc>,
    #[validate(range(min = 15, max = 480))]
    pub duration_minutes: u32,
    /// Defaults to the caller.
    #[serde(default)]
    pub interviewer_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interview(start: DateTime<Utc>, minutes: u32, status: InterviewStatus) -> Interview {
        Interview {
            id: "i1".to_string(),
            candidate_id: "c1".to_string(),
            interviewer_id: "u1".to_string(),
            scheduled_at: start,
            duration_minutes: minutes,
            meeting_url: "https://meet.example.test/i1".to_string(),
            status,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn overlap_is_half_open() {
        let start = Utc::now() + Duration::days(1);
        let existing = interview(start, 60, InterviewStatus::Scheduled);

        // Back-to-back does not overlap.
        let next = start + Duration::minutes(60);
        assert!(!existing.overlaps(next, next + Duration::minutes(30)));

        let inside = start + Duration::minutes(30);
        assert!(existing.overlaps(inside, inside + Duration::minutes(30)));

        let before = start - Duration::minutes(30);
        assert!(!existing.overlaps(before, start));
    }

    #[test]
    fn cancelled_never_overlaps() {
        let start = Utc::now() + Duration::days(1);
        let existing = interview(start, 60, InterviewStatus::Cancelled);
        assert!(!existing.overlaps(start, start + Duration::minutes(60)));
    }
}
