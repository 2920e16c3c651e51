use uuid::Uuid;

use crate::{
    database::DbConn,
    error::{Error, Result},
    models::users::{NewUser, User},
};

const USER_COLUMNS: &str =
    "id, username, email, password_hash, full_name, is_superuser, created_at, updated_at";

/// Creates a new user in the database.
pub async fn create_user(conn: &mut DbConn, new_user: NewUser) -> Result<User> {
    let sql = format!(
        "INSERT INTO users (id, username, email, password_hash, full_name) \
         VALUES ($1, $2, $3, $4, $5) \
         RETURNING {USER_COLUMNS}"
    );

    let user = sqlx::query_as::<_, User>(&sql)
        .bind(Uuid::now_v7())
        .bind(&new_user.username)
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .bind(&new_user.full_name)
        .fetch_one(conn)
        .await
        .map_err(|e| {
            let error_msg = e.to_string().to_lowercase();
            // Unique constraint violations surface as a conflict rather than
            // a bare database error.
            if error_msg.contains("unique") || error_msg.contains("duplicate key") {
                Error::Conflict("Username or email is already in use".to_string())
            } else {
                Error::Sqlx(e)
            }
        })?;

    Ok(user)
}

/// Gets a single user by their ID. The user may not exist.
pub async fn get_user_by_id(conn: &mut DbConn, id: Uuid) -> Result<Option<User>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");

    let user = sqlx::query_as::<_, User>(&sql)
        .bind(id)
        .fetch_optional(conn)
        .await
        .map_err(Error::Sqlx)?;

    Ok(user)
}

/// Looks a user up by login identifier: exact username match, or
/// case-insensitive email match. The user may not exist.
pub async fn find_user_by_identifier(conn: &mut DbConn, identifier: &str) -> Result<Option<User>> {
    let sql = format!(
        "SELECT {USER_COLUMNS} FROM users \
         WHERE username = $1 OR lower(email) = lower($1) \
         LIMIT 1"
    );

    let user = sqlx::query_as::<_, User>(&sql)
        .bind(identifier)
        .fetch_optional(conn)
        .await
        .map_err(Error::Sqlx)?;

    Ok(user)
}
