use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use uuid::Uuid;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, sqlx::Type,
)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Mode {
    Physical,
    Online,
}

impl Mode {
    /// Human-readable label used in exports.
    pub fn label(&self) -> &'static str {
        match self {
            Mode::Physical => "Physical",
            Mode::Online => "Online",
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, sqlx::Type,
)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum WorkshopStatus {
    Upcoming,
    Live,
    Completed,
}

impl WorkshopStatus {
    /// Human-readable label used in exports.
    pub fn label(&self) -> &'static str {
        match self {
            WorkshopStatus::Upcoming => "Upcoming",
            WorkshopStatus::Live => "Live",
            WorkshopStatus::Completed => "Completed",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Workshop {
    pub id: Uuid,
    pub title: String,
    pub topic: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub city: String,
    pub state: String,
    pub institute: String,
    pub online_link: String,
    pub mode: Mode,
    pub coordinator_id: Uuid,
    pub coordinator_email: String,
    pub coordinator_phone: String,
    pub registration_link: String,
    pub feedback_form_link: String,
    /// Stored path of the agenda file, relative to the storage root.
    pub agenda_pdf: Option<String>,
    pub status: WorkshopStatus,
    pub participants_count: i32,
    pub category: String,
    pub reports_approved: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Column values for inserting a workshop. The coordinator and defaults
/// have already been resolved by the service layer.
#[derive(Debug, Clone)]
pub struct NewWorkshop {
    pub title: String,
    pub topic: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub city: String,
    pub state: String,
    pub institute: String,
    pub online_link: String,
    pub mode: Mode,
    pub coordinator_id: Uuid,
    pub coordinator_email: String,
    pub coordinator_phone: String,
    pub registration_link: String,
    pub feedback_form_link: String,
    pub agenda_pdf: Option<String>,
    pub status: WorkshopStatus,
    pub participants_count: i32,
    pub category: String,
}

/// Aggregate rows backing the dashboard.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct YearCount {
    pub year: i32,
    pub total: i64,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct GroupCount {
    pub name: String,
    pub total: i64,
}

/// One spreadsheet/PDF export row, workshop joined with its coordinator.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ExportRow {
    pub title: String,
    pub topic: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub mode: Mode,
    pub city: String,
    pub state: String,
    pub institute: String,
    pub coordinator_name: String,
    pub coordinator_email: String,
    pub coordinator_phone: String,
    pub status: WorkshopStatus,
    pub participants_count: i32,
    pub category: String,
    pub registration_link: String,
}

impl ExportRow {
    /// Location shown on the PDF summary line: city, else state, else institute.
    pub fn place(&self) -> &str {
        if !self.city.is_empty() {
            &self.city
        } else if !self.state.is_empty() {
            &self.state
        } else {
            &self.institute
        }
    }
}
