use uuid::Uuid;

use crate::{
    database::DbConn,
    error::{Error, Result},
    models::attachments::{
        DocType, NewWorkshopDocument, NewWorkshopPhoto, WorkshopDocument, WorkshopPhoto,
    },
};

const PHOTO_COLUMNS: &str = "id, workshop_id, image_path, caption, uploaded_at";
const DOCUMENT_COLUMNS: &str = "id, workshop_id, doc_type, file_path, uploaded_at";

/// Lists the photos of a workshop, oldest upload first.
pub async fn list_photos(conn: &mut DbConn, workshop_id: Uuid) -> Result<Vec<WorkshopPhoto>> {
    let sql = format!(
        "SELECT {PHOTO_COLUMNS} FROM workshop_photos WHERE workshop_id = $1 ORDER BY uploaded_at"
    );

    let photos = sqlx::query_as::<_, WorkshopPhoto>(&sql)
        .bind(workshop_id)
        .fetch_all(conn)
        .await
        .map_err(Error::Sqlx)?;

    Ok(photos)
}

/// Gets one photo scoped to its workshop. The photo may not exist.
pub async fn get_photo(
    conn: &mut DbConn,
    workshop_id: Uuid,
    id: Uuid,
) -> Result<Option<WorkshopPhoto>> {
    let sql = format!("SELECT {PHOTO_COLUMNS} FROM workshop_photos WHERE id = $1 AND workshop_id = $2");

    let photo = sqlx::query_as::<_, WorkshopPhoto>(&sql)
        .bind(id)
        .bind(workshop_id)
        .fetch_optional(conn)
        .await
        .map_err(Error::Sqlx)?;

    Ok(photo)
}

pub async fn insert_photo(conn: &mut DbConn, new: NewWorkshopPhoto) -> Result<WorkshopPhoto> {
    let sql = format!(
        "INSERT INTO workshop_photos (id, workshop_id, image_path, caption) \
         VALUES ($1, $2, $3, $4) \
         RETURNING {PHOTO_COLUMNS}"
    );

    let photo = sqlx::query_as::<_, WorkshopPhoto>(&sql)
        .bind(Uuid::now_v7())
        .bind(new.workshop_id)
        .bind(&new.image_path)
        .bind(&new.caption)
        .fetch_one(conn)
        .await
        .map_err(Error::Sqlx)?;

    Ok(photo)
}

/// Updates a photo's caption and, when a replacement was uploaded, its
/// stored image path.
pub async fn update_photo(
    conn: &mut DbConn,
    id: Uuid,
    caption: &str,
    image_path: Option<&str>,
) -> Result<WorkshopPhoto> {
    let sql = format!(
        "UPDATE workshop_photos \
         SET caption = $1, image_path = COALESCE($2, image_path) \
         WHERE id = $3 \
         RETURNING {PHOTO_COLUMNS}"
    );

    let photo = sqlx::query_as::<_, WorkshopPhoto>(&sql)
        .bind(caption)
        .bind(image_path)
        .bind(id)
        .fetch_one(conn)
        .await
        .map_err(Error::Sqlx)?;

    Ok(photo)
}

pub async fn delete_photo(conn: &mut DbConn, id: Uuid) -> Result<()> {
    sqlx::query("DELETE FROM workshop_photos WHERE id = $1")
        .bind(id)
        .execute(conn)
        .await
        .map_err(Error::Sqlx)?;

    Ok(())
}

/// Lists the documents of a workshop, oldest upload first.
pub async fn list_documents(conn: &mut DbConn, workshop_id: Uuid) -> Result<Vec<WorkshopDocument>> {
    let sql = format!(
        "SELECT {DOCUMENT_COLUMNS} FROM workshop_documents WHERE workshop_id = $1 ORDER BY uploaded_at"
    );

    let documents = sqlx::query_as::<_, WorkshopDocument>(&sql)
        .bind(workshop_id)
        .fetch_all(conn)
        .await
        .map_err(Error::Sqlx)?;

    Ok(documents)
}

/// Gets one document scoped to its workshop. The document may not exist.
pub async fn get_document(
    conn: &mut DbConn,
    workshop_id: Uuid,
    id: Uuid,
) -> Result<Option<WorkshopDocument>> {
    let sql = format!(
        "SELECT {DOCUMENT_COLUMNS} FROM workshop_documents WHERE id = $1 AND workshop_id = $2"
    );

    let document = sqlx::query_as::<_, WorkshopDocument>(&sql)
        .bind(id)
        .bind(workshop_id)
        .fetch_optional(conn)
        .await
        .map_err(Error::Sqlx)?;

    Ok(document)
}

pub async fn insert_document(
    conn: &mut DbConn,
    new: NewWorkshopDocument,
) -> Result<WorkshopDocument> {
    let sql = format!(
        "INSERT INTO workshop_documents (id, workshop_id, doc_type, file_path) \
         VALUES ($1, $2, $3, $4) \
         RETURNING {DOCUMENT_COLUMNS}"
    );

    let document = sqlx::query_as::<_, WorkshopDocument>(&sql)
        .bind(Uuid::now_v7())
        .bind(new.workshop_id)
        .bind(new.doc_type)
        .bind(&new.file_path)
        .fetch_one(conn)
        .await
        .map_err(Error::Sqlx)?;

    Ok(document)
}

/// Updates a document's type and, when a replacement was uploaded, its
/// stored file path.
pub async fn update_document(
    conn: &mut DbConn,
    id: Uuid,
    doc_type: DocType,
    file_path: Option<&str>,
) -> Result<WorkshopDocument> {
    let sql = format!(
        "UPDATE workshop_documents \
         SET doc_type = $1, file_path = COALESCE($2, file_path) \
         WHERE id = $3 \
         RETURNING {DOCUMENT_COLUMNS}"
    );

    let document = sqlx::query_as::<_, WorkshopDocument>(&sql)
        .bind(doc_type)
        .bind(file_path)
        .bind(id)
        .fetch_one(conn)
        .await
        .map_err(Error::Sqlx)?;

    Ok(document)
}

pub async fn delete_document(conn: &mut DbConn, id: Uuid) -> Result<()> {
    sqlx::query("DELETE FROM workshop_documents WHERE id = $1")
        .bind(id)
        .execute(conn)
        .await
        .map_err(Error::Sqlx)?;

    Ok(())
}
