//! Request and response payloads for the HTTP layer.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{
    attachments::{DocType, WorkshopDocument, WorkshopPhoto},
    workshops::{GroupCount, Mode, Workshop, WorkshopStatus, YearCount},
};

/// A file travelling inside a JSON body as base64 content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileUpload {
    pub filename: String,
    /// Base64-encoded file content.
    pub content: String,
}

/// Create/edit payload for a workshop.
///
/// Optional text fields default to empty strings; `status` defaults to
/// upcoming on create and to the stored value on edit. `agenda_pdf` is
/// only touched when a new upload is supplied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkshopForm {
    pub title: String,
    #[serde(default)]
    pub topic: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub institute: String,
    #[serde(default)]
    pub online_link: String,
    pub mode: Mode,
    #[serde(default)]
    pub coordinator_email: String,
    #[serde(default)]
    pub coordinator_phone: String,
    #[serde(default)]
    pub registration_link: String,
    #[serde(default)]
    pub feedback_form_link: String,
    pub status: Option<WorkshopStatus>,
    pub participants_count: Option<i32>,
    #[serde(default)]
    pub category: String,
    pub agenda_pdf: Option<FileUpload>,
}

/// Query parameters of the workshop listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    pub tab: Option<String>,
    pub topic: Option<String>,
    pub location: Option<String>,
    pub mode: Option<String>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub page: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct WorkshopListResponse {
    pub workshops: Vec<Workshop>,
    pub tab: WorkshopStatus,
    pub page: u32,
    pub total_pages: u32,
    pub total_count: i64,
}

#[derive(Debug, Serialize)]
pub struct WorkshopDetailResponse {
    pub workshop: Workshop,
    pub photos: Vec<WorkshopPhoto>,
    pub documents: Vec<WorkshopDocument>,
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub year_counts: Vec<YearCount>,
    pub total_workshops: i64,
    pub total_participants: i64,
    pub state_counts: Vec<GroupCount>,
    pub category_counts: Vec<GroupCount>,
    pub my_workshops: Vec<Workshop>,
}

/// One photo row of the uploads form.
///
/// A missing `id` means a new photo (the image is then required); with an
/// `id` the entry updates the caption, replaces the image when one is
/// supplied, or removes the photo when `remove` is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhotoEntry {
    pub id: Option<Uuid>,
    #[serde(default)]
    pub caption: String,
    pub image: Option<FileUpload>,
    #[serde(default)]
    pub remove: bool,
}

/// One document row of the uploads form; same lifecycle as [`PhotoEntry`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentEntry {
    pub id: Option<Uuid>,
    pub doc_type: DocType,
    pub file: Option<FileUpload>,
    #[serde(default)]
    pub remove: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ManageUploadsForm {
    #[serde(default)]
    pub photos: Vec<PhotoEntry>,
    #[serde(default)]
    pub documents: Vec<DocumentEntry>,
}
