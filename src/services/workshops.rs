//! Workshop business logic: creation defaults, edit semantics, the
//! coordinator capability rule, listing filters, and dashboard assembly.

use std::str::FromStr;

use uuid::Uuid;

use crate::{
    database::DbConn,
    error::{Error, Result},
    models::{
        requests::{
            DashboardResponse, ListQuery, WorkshopDetailResponse, WorkshopForm,
            WorkshopListResponse,
        },
        workshops::{Mode, NewWorkshop, Workshop, WorkshopStatus},
    },
    queries::{attachments, dashboard, workshops},
    services::storage::FileStorageService,
    validation::{FieldErrors, validate_workshop_form},
};

/// Whether a user may edit a workshop or manage its uploads: the
/// coordinator may, and so may any superuser.
pub fn can_manage(user_id: Uuid, is_superuser: bool, workshop: &Workshop) -> bool {
    is_superuser || workshop.coordinator_id == user_id
}

/// Creates a workshop on behalf of an authenticated user.
///
/// The creator becomes the coordinator; an empty coordinator email
/// defaults to the creator's account email.
pub async fn create_workshop(
    conn: &mut DbConn,
    storage: &FileStorageService,
    creator_id: Uuid,
    creator_email: &str,
    form: WorkshopForm,
) -> Result<Workshop> {
    let mut errors = FieldErrors::new();
    let agenda_bytes = validate_workshop_form(&form, false, &mut errors);
    errors.into_result()?;

    let agenda_pdf = match (&form.agenda_pdf, agenda_bytes) {
        (Some(upload), Some(bytes)) => Some(storage.store_agenda(&upload.filename, &bytes).await?),
        _ => None,
    };

    let coordinator_email = if form.coordinator_email.trim().is_empty() {
        creator_email.to_string()
    } else {
        form.coordinator_email.trim().to_string()
    };

    let new = NewWorkshop {
        title: form.title,
        topic: form.topic,
        start_date: form.start_date,
        end_date: form.end_date,
        city: form.city,
        state: form.state,
        institute: form.institute,
        online_link: form.online_link,
        mode: form.mode,
        coordinator_id: creator_id,
        coordinator_email,
        coordinator_phone: form.coordinator_phone,
        registration_link: form.registration_link,
        feedback_form_link: form.feedback_form_link,
        agenda_pdf,
        status: form.status.unwrap_or(WorkshopStatus::Upcoming),
        participants_count: form.participants_count.unwrap_or(0),
        category: form.category,
    };

    workshops::create_workshop(conn, new).await
}

/// Applies an edit form to an existing workshop.
///
/// A new agenda upload replaces the stored file (the old one is removed
/// after the row update succeeds); omitting the upload keeps it.
pub async fn update_workshop(
    conn: &mut DbConn,
    storage: &FileStorageService,
    current: Workshop,
    form: WorkshopForm,
) -> Result<Workshop> {
    let mut errors = FieldErrors::new();
    let agenda_bytes = validate_workshop_form(&form, true, &mut errors);
    errors.into_result()?;

    let mut replaced_agenda = None;
    let agenda_pdf = match (&form.agenda_pdf, agenda_bytes) {
        (Some(upload), Some(bytes)) => {
            replaced_agenda = current.agenda_pdf.clone();
            Some(storage.store_agenda(&upload.filename, &bytes).await?)
        }
        _ => current.agenda_pdf.clone(),
    };

    let new = NewWorkshop {
        title: form.title,
        topic: form.topic,
        start_date: form.start_date,
        end_date: form.end_date,
        city: form.city,
        state: form.state,
        institute: form.institute,
        online_link: form.online_link,
        mode: form.mode,
        coordinator_id: current.coordinator_id,
        coordinator_email: form.coordinator_email.trim().to_string(),
        coordinator_phone: form.coordinator_phone,
        registration_link: form.registration_link,
        feedback_form_link: form.feedback_form_link,
        agenda_pdf,
        status: form.status.unwrap_or(current.status),
        participants_count: form.participants_count.unwrap_or(current.participants_count),
        category: form.category,
    };

    let updated = workshops::update_workshop(conn, current.id, new).await?;

    if let Some(old_path) = replaced_agenda {
        if let Err(e) = storage.remove_file(&old_path).await {
            tracing::warn!(path = %old_path, error = %e, "Failed to remove replaced agenda file");
        }
    }

    Ok(updated)
}

/// Resolves raw listing params into query filters.
///
/// An unknown or missing tab falls back to upcoming; an unknown mode is
/// ignored rather than rejected.
pub fn resolve_filters(query: &ListQuery) -> workshops::ListFilters {
    let status = query
        .tab
        .as_deref()
        .and_then(|tab| WorkshopStatus::from_str(tab).ok())
        .unwrap_or(WorkshopStatus::Upcoming);

    let mode = query.mode.as_deref().and_then(|m| Mode::from_str(m).ok());

    workshops::ListFilters {
        status,
        topic: query.topic.clone(),
        location: query.location.clone(),
        mode,
        start: query.start,
        end: query.end,
    }
}

/// Runs the filtered, paginated listing.
pub async fn list_workshops(conn: &mut DbConn, query: &ListQuery) -> Result<WorkshopListResponse> {
    let filters = resolve_filters(query);
    let page = query.page.unwrap_or(1).max(1);

    let total_count = workshops::count_workshops(conn, &filters).await?;
    let items = workshops::list_workshops(conn, &filters, page).await?;
    let total_pages = (total_count.max(0) as u32).div_ceil(workshops::PAGE_SIZE).max(1);

    Ok(WorkshopListResponse {
        workshops: items,
        tab: filters.status,
        page,
        total_pages,
        total_count,
    })
}

/// Loads a workshop with its photo and document sets.
pub async fn get_workshop_detail(conn: &mut DbConn, id: Uuid) -> Result<WorkshopDetailResponse> {
    let workshop = workshops::get_workshop_by_id(conn, id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Workshop {id} not found")))?;

    let photos = attachments::list_photos(conn, id).await?;
    let documents = attachments::list_documents(conn, id).await?;

    Ok(WorkshopDetailResponse {
        workshop,
        photos,
        documents,
    })
}

/// Assembles the dashboard aggregates for the acting user.
///
/// Superusers see the 20 most recent workshops overall under
/// `my_workshops`; everyone else sees only the ones they coordinate.
pub async fn dashboard(
    conn: &mut DbConn,
    user_id: Uuid,
    is_superuser: bool,
) -> Result<DashboardResponse> {
    let coordinator_filter = if is_superuser { None } else { Some(user_id) };

    Ok(DashboardResponse {
        year_counts: dashboard::year_counts(conn).await?,
        total_workshops: dashboard::total_workshops(conn).await?,
        total_participants: dashboard::total_participants(conn).await?,
        state_counts: dashboard::state_counts(conn).await?,
        category_counts: dashboard::category_counts(conn).await?,
        my_workshops: dashboard::recent_workshops(conn, coordinator_filter).await?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    fn workshop(coordinator_id: Uuid) -> Workshop {
        Workshop {
            id: Uuid::now_v7(),
            title: "Workshop".to_string(),
            topic: String::new(),
            start_date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            end_date: None,
            city: "Delhi".to_string(),
            state: String::new(),
            institute: String::new(),
            online_link: String::new(),
            mode: Mode::Physical,
            coordinator_id,
            coordinator_email: "c@example.com".to_string(),
            coordinator_phone: "123".to_string(),
            registration_link: String::new(),
            feedback_form_link: String::new(),
            agenda_pdf: None,
            status: WorkshopStatus::Upcoming,
            participants_count: 0,
            category: String::new(),
            reports_approved: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_coordinator_can_manage_own_workshop() {
        let coordinator = Uuid::now_v7();
        let w = workshop(coordinator);
        assert!(can_manage(coordinator, false, &w));
    }

    #[test]
    fn test_other_user_cannot_manage() {
        let w = workshop(Uuid::now_v7());
        assert!(!can_manage(Uuid::now_v7(), false, &w));
    }

    #[test]
    fn test_superuser_can_manage_any_workshop() {
        let w = workshop(Uuid::now_v7());
        assert!(can_manage(Uuid::now_v7(), true, &w));
    }

    #[test]
    fn test_tab_defaults_to_upcoming() {
        let filters = resolve_filters(&ListQuery::default());
        assert_eq!(filters.status, WorkshopStatus::Upcoming);

        let filters = resolve_filters(&ListQuery {
            tab: Some("archived".to_string()),
            ..Default::default()
        });
        assert_eq!(filters.status, WorkshopStatus::Upcoming);
    }

    #[test]
    fn test_tab_live_selects_live() {
        let filters = resolve_filters(&ListQuery {
            tab: Some("live".to_string()),
            ..Default::default()
        });
        assert_eq!(filters.status, WorkshopStatus::Live);
    }

    #[test]
    fn test_unknown_mode_is_ignored() {
        let filters = resolve_filters(&ListQuery {
            mode: Some("hybrid".to_string()),
            ..Default::default()
        });
        assert!(filters.mode.is_none());

        let filters = resolve_filters(&ListQuery {
            mode: Some("online".to_string()),
            ..Default::default()
        });
        assert_eq!(filters.mode, Some(Mode::Online));
    }
}
