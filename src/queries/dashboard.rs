//! Aggregation queries backing the dashboard.

use uuid::Uuid;

use crate::{
    database::DbConn,
    error::{Error, Result},
    models::workshops::{GroupCount, Workshop, YearCount},
};

/// Workshop count per start-date year, ascending by year.
pub async fn year_counts(conn: &mut DbConn) -> Result<Vec<YearCount>> {
    let rows = sqlx::query_as::<_, YearCount>(
        "SELECT EXTRACT(YEAR FROM start_date)::INT AS year, COUNT(*) AS total \
         FROM workshops \
         GROUP BY year \
         ORDER BY year",
    )
    .fetch_all(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(rows)
}

/// Total number of workshops.
pub async fn total_workshops(conn: &mut DbConn) -> Result<i64> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM workshops")
        .fetch_one(conn)
        .await
        .map_err(Error::Sqlx)?;

    Ok(total)
}

/// Sum of participants across all workshops; 0 when there are none.
pub async fn total_participants(conn: &mut DbConn) -> Result<i64> {
    let total: i64 =
        sqlx::query_scalar("SELECT COALESCE(SUM(participants_count), 0)::BIGINT FROM workshops")
            .fetch_one(conn)
            .await
            .map_err(Error::Sqlx)?;

    Ok(total)
}

/// Top 10 non-empty states by workshop count, descending.
pub async fn state_counts(conn: &mut DbConn) -> Result<Vec<GroupCount>> {
    let rows = sqlx::query_as::<_, GroupCount>(
        "SELECT state AS name, COUNT(*) AS total \
         FROM workshops \
         WHERE state <> '' \
         GROUP BY state \
         ORDER BY total DESC \
         LIMIT 10",
    )
    .fetch_all(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(rows)
}

/// Top 10 non-empty categories by workshop count, descending.
pub async fn category_counts(conn: &mut DbConn) -> Result<Vec<GroupCount>> {
    let rows = sqlx::query_as::<_, GroupCount>(
        "SELECT category AS name, COUNT(*) AS total \
         FROM workshops \
         WHERE category <> '' \
         GROUP BY category \
         ORDER BY total DESC \
         LIMIT 10",
    )
    .fetch_all(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(rows)
}

/// The 20 most recently created workshops, restricted to a coordinator
/// when `coordinator_id` is set (superusers see every workshop).
pub async fn recent_workshops(
    conn: &mut DbConn,
    coordinator_id: Option<Uuid>,
) -> Result<Vec<Workshop>> {
    let mut query = sqlx::QueryBuilder::<sqlx::Postgres>::new(
        "SELECT id, title, topic, start_date, end_date, city, state, institute, online_link, \
         mode, coordinator_id, coordinator_email, coordinator_phone, registration_link, \
         feedback_form_link, agenda_pdf, status, participants_count, category, reports_approved, \
         created_at, updated_at \
         FROM workshops",
    );

    if let Some(coordinator_id) = coordinator_id {
        query.push(" WHERE coordinator_id = ").push_bind(coordinator_id);
    }
    query.push(" ORDER BY created_at DESC LIMIT 20");

    let workshops = query
        .build_query_as::<Workshop>()
        .fetch_all(conn)
        .await
        .map_err(Error::Sqlx)?;

    Ok(workshops)
}
