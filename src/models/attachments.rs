use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use uuid::Uuid;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, sqlx::Type,
)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DocType {
    FeedbackSummary,
    Attendance,
    Other,
}

impl DocType {
    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            DocType::FeedbackSummary => "Feedback Summary",
            DocType::Attendance => "Attendance Report",
            DocType::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct WorkshopPhoto {
    pub id: Uuid,
    pub workshop_id: Uuid,
    /// Stored path relative to the storage root.
    pub image_path: String,
    pub caption: String,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct WorkshopDocument {
    pub id: Uuid,
    pub workshop_id: Uuid,
    pub doc_type: DocType,
    /// Stored path relative to the storage root.
    pub file_path: String,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewWorkshopPhoto {
    pub workshop_id: Uuid,
    pub image_path: String,
    pub caption: String,
}

#[derive(Debug, Clone)]
pub struct NewWorkshopDocument {
    pub workshop_id: Uuid,
    pub doc_type: DocType,
    pub file_path: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_doc_type_serialization() {
        assert_eq!(DocType::FeedbackSummary.to_string(), "feedback_summary");
        assert_eq!(
            DocType::from_str("attendance").unwrap(),
            DocType::Attendance
        );
        assert_eq!(DocType::Attendance.label(), "Attendance Report");
    }
}
