use chrono::NaiveDate;
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    database::DbConn,
    error::{Error, Result},
    models::workshops::{ExportRow, Mode, NewWorkshop, Workshop, WorkshopStatus},
};

const WORKSHOP_COLUMNS: &str = "id, title, topic, start_date, end_date, city, state, institute, \
     online_link, mode, coordinator_id, coordinator_email, coordinator_phone, registration_link, \
     feedback_form_link, agenda_pdf, status, participants_count, category, reports_approved, \
     created_at, updated_at";

/// Listing page size.
pub const PAGE_SIZE: u32 = 10;

/// Resolved listing filters; built from raw query params by the service layer.
#[derive(Debug, Clone)]
pub struct ListFilters {
    pub status: WorkshopStatus,
    pub topic: Option<String>,
    pub location: Option<String>,
    pub mode: Option<Mode>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

/// Creates a new workshop in the database.
pub async fn create_workshop(conn: &mut DbConn, new: NewWorkshop) -> Result<Workshop> {
    let sql = format!(
        "INSERT INTO workshops (id, title, topic, start_date, end_date, city, state, institute, \
         online_link, mode, coordinator_id, coordinator_email, coordinator_phone, \
         registration_link, feedback_form_link, agenda_pdf, status, participants_count, category) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19) \
         RETURNING {WORKSHOP_COLUMNS}"
    );

    let workshop = sqlx::query_as::<_, Workshop>(&sql)
        .bind(Uuid::now_v7())
        .bind(&new.title)
        .bind(&new.topic)
        .bind(new.start_date)
        .bind(new.end_date)
        .bind(&new.city)
        .bind(&new.state)
        .bind(&new.institute)
        .bind(&new.online_link)
        .bind(new.mode)
        .bind(new.coordinator_id)
        .bind(&new.coordinator_email)
        .bind(&new.coordinator_phone)
        .bind(&new.registration_link)
        .bind(&new.feedback_form_link)
        .bind(&new.agenda_pdf)
        .bind(new.status)
        .bind(new.participants_count)
        .bind(&new.category)
        .fetch_one(conn)
        .await
        .map_err(Error::Sqlx)?;

    Ok(workshop)
}

/// Gets a single workshop by its ID. The workshop may not exist.
pub async fn get_workshop_by_id(conn: &mut DbConn, id: Uuid) -> Result<Option<Workshop>> {
    let sql = format!("SELECT {WORKSHOP_COLUMNS} FROM workshops WHERE id = $1");

    let workshop = sqlx::query_as::<_, Workshop>(&sql)
        .bind(id)
        .fetch_optional(conn)
        .await
        .map_err(Error::Sqlx)?;

    Ok(workshop)
}

/// Replaces the editable fields of a workshop.
///
/// The coordinator is never reassigned here; creation fixed it and the
/// access layer already restricted callers to the coordinator or a
/// superuser.
pub async fn update_workshop(conn: &mut DbConn, id: Uuid, new: NewWorkshop) -> Result<Workshop> {
    let sql = format!(
        "UPDATE workshops SET title = $1, topic = $2, start_date = $3, end_date = $4, city = $5, \
         state = $6, institute = $7, online_link = $8, mode = $9, coordinator_email = $10, \
         coordinator_phone = $11, registration_link = $12, feedback_form_link = $13, \
         agenda_pdf = $14, status = $15, participants_count = $16, category = $17, \
         updated_at = now() \
         WHERE id = $18 \
         RETURNING {WORKSHOP_COLUMNS}"
    );

    let workshop = sqlx::query_as::<_, Workshop>(&sql)
        .bind(&new.title)
        .bind(&new.topic)
        .bind(new.start_date)
        .bind(new.end_date)
        .bind(&new.city)
        .bind(&new.state)
        .bind(&new.institute)
        .bind(&new.online_link)
        .bind(new.mode)
        .bind(&new.coordinator_email)
        .bind(&new.coordinator_phone)
        .bind(&new.registration_link)
        .bind(&new.feedback_form_link)
        .bind(&new.agenda_pdf)
        .bind(new.status)
        .bind(new.participants_count)
        .bind(&new.category)
        .bind(id)
        .fetch_optional(conn)
        .await
        .map_err(Error::Sqlx)?;

    workshop.ok_or_else(|| Error::NotFound(format!("Workshop {id} not found")))
}

/// Escapes LIKE/ILIKE wildcards in user-supplied substrings.
pub fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

fn push_filters(query: &mut QueryBuilder<'_, Postgres>, filters: &ListFilters) {
    query.push(" WHERE status = ").push_bind(filters.status);

    if let Some(topic) = filters.topic.as_deref().filter(|t| !t.is_empty()) {
        let pattern = format!("%{}%", escape_like(topic));
        query
            .push(" AND (title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR topic ILIKE ")
            .push_bind(pattern)
            .push(")");
    }

    if let Some(location) = filters.location.as_deref().filter(|l| !l.is_empty()) {
        let pattern = format!("%{}%", escape_like(location));
        query
            .push(" AND (city ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR institute ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR state ILIKE ")
            .push_bind(pattern)
            .push(")");
    }

    if let Some(mode) = filters.mode {
        query.push(" AND mode = ").push_bind(mode);
    }

    if let Some(start) = filters.start {
        query.push(" AND start_date >= ").push_bind(start);
    }

    if let Some(end) = filters.end {
        query.push(" AND end_date <= ").push_bind(end);
    }
}

/// Runs the filtered listing query for one page (most recent first).
pub async fn list_workshops(
    conn: &mut DbConn,
    filters: &ListFilters,
    page: u32,
) -> Result<Vec<Workshop>> {
    let page = page.max(1);
    let offset = (page - 1) * PAGE_SIZE;

    let mut query = QueryBuilder::new(format!("SELECT {WORKSHOP_COLUMNS} FROM workshops"));
    push_filters(&mut query, filters);
    query
        .push(" ORDER BY start_date DESC, created_at DESC LIMIT ")
        .push_bind(PAGE_SIZE as i64)
        .push(" OFFSET ")
        .push_bind(offset as i64);

    let workshops = query
        .build_query_as::<Workshop>()
        .fetch_all(conn)
        .await
        .map_err(Error::Sqlx)?;

    Ok(workshops)
}

/// Counts the rows matching the listing filters (for pagination).
pub async fn count_workshops(conn: &mut DbConn, filters: &ListFilters) -> Result<i64> {
    let mut query = QueryBuilder::new("SELECT COUNT(*) FROM workshops");
    push_filters(&mut query, filters);

    let count: i64 = query
        .build_query_scalar()
        .fetch_one(conn)
        .await
        .map_err(Error::Sqlx)?;

    Ok(count)
}

/// Fetches export rows (workshop joined with its coordinator), most recent
/// start date first. `limit` bounds the result for the PDF summary; `None`
/// exports everything.
pub async fn export_rows(conn: &mut DbConn, limit: Option<i64>) -> Result<Vec<ExportRow>> {
    let mut sql = String::from(
        "SELECT w.title, w.topic, w.start_date, w.end_date, w.mode, w.city, w.state, \
         w.institute, COALESCE(NULLIF(u.full_name, ''), u.username) AS coordinator_name, \
         w.coordinator_email, w.coordinator_phone, w.status, w.participants_count, w.category, \
         w.registration_link \
         FROM workshops w \
         JOIN users u ON u.id = w.coordinator_id \
         ORDER BY w.start_date DESC",
    );
    if limit.is_some() {
        sql.push_str(" LIMIT $1");
    }

    let mut query = sqlx::query_as::<_, ExportRow>(&sql);
    if let Some(limit) = limit {
        query = query.bind(limit);
    }

    let rows = query.fetch_all(conn).await.map_err(Error::Sqlx)?;

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like_wildcards() {
        assert_eq!(escape_like("50%_off"), "50\\%\\_off");
        assert_eq!(escape_like("plain"), "plain");
        assert_eq!(escape_like("back\\slash"), "back\\\\slash");
    }

    #[test]
    fn test_push_filters_renders_all_clauses() {
        let filters = ListFilters {
            status: WorkshopStatus::Live,
            topic: Some("vlsi".to_string()),
            location: Some("Delhi".to_string()),
            mode: Some(Mode::Physical),
            start: NaiveDate::from_ymd_opt(2025, 1, 1),
            end: NaiveDate::from_ymd_opt(2025, 12, 31),
        };

        let mut query = QueryBuilder::new("SELECT COUNT(*) FROM workshops");
        push_filters(&mut query, &filters);
        let sql = query.sql();

        assert!(sql.contains("status ="));
        assert!(sql.contains("title ILIKE"));
        assert!(sql.contains("topic ILIKE"));
        assert!(sql.contains("city ILIKE"));
        assert!(sql.contains("institute ILIKE"));
        assert!(sql.contains("state ILIKE"));
        assert!(sql.contains("mode ="));
        assert!(sql.contains("start_date >="));
        assert!(sql.contains("end_date <="));
    }

    #[test]
    fn test_push_filters_skips_empty_values() {
        let filters = ListFilters {
            status: WorkshopStatus::Upcoming,
            topic: Some(String::new()),
            location: None,
            mode: None,
            start: None,
            end: None,
        };

        let mut query = QueryBuilder::new("SELECT COUNT(*) FROM workshops");
        push_filters(&mut query, &filters);
        let sql = query.sql();

        assert!(sql.contains("status ="));
        assert!(!sql.contains("ILIKE"));
        assert!(!sql.contains("start_date"));
    }
}
