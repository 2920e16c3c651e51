//! Batch photo/document management for a workshop.
//!
//! Every entry of the submitted sets is validated first; only when both
//! sets are fully valid are the adds, updates and removals applied inside
//! one database transaction. Invalid submissions change nothing.

use std::collections::HashMap;

use sqlx::Acquire;
use uuid::Uuid;

use crate::{
    database::DbConn,
    error::Result,
    models::{
        attachments::{
            DocType, NewWorkshopDocument, NewWorkshopPhoto, WorkshopDocument, WorkshopPhoto,
        },
        requests::ManageUploadsForm,
        workshops::Workshop,
    },
    queries::attachments,
    services::storage::FileStorageService,
    validation::{FieldErrors, decode_upload, require_pdf},
};

#[derive(Debug)]
enum PhotoAction {
    Add {
        caption: String,
        filename: String,
        bytes: Vec<u8>,
    },
    Update {
        id: Uuid,
        caption: String,
        /// `(filename, bytes, old stored path)` when the image is replaced.
        replacement: Option<(String, Vec<u8>, String)>,
    },
    Remove {
        id: Uuid,
        old_path: String,
    },
}

#[derive(Debug)]
enum DocumentAction {
    Add {
        doc_type: DocType,
        filename: String,
        bytes: Vec<u8>,
    },
    Update {
        id: Uuid,
        doc_type: DocType,
        replacement: Option<(String, Vec<u8>, String)>,
    },
    Remove {
        id: Uuid,
        old_path: String,
    },
}

/// Validates the whole form against the workshop's current photo and
/// document sets and turns it into a list of actions.
///
/// Errors are field-scoped per entry (`photos[2].image`) and collected
/// across both sets; any error means no actions at all.
fn plan_actions(
    form: &ManageUploadsForm,
    existing_photos: &HashMap<Uuid, WorkshopPhoto>,
    existing_documents: &HashMap<Uuid, WorkshopDocument>,
) -> Result<(Vec<PhotoAction>, Vec<DocumentAction>)> {
    let mut errors = FieldErrors::new();
    let mut photo_actions = Vec::new();
    let mut document_actions = Vec::new();

    for (i, entry) in form.photos.iter().enumerate() {
        match entry.id {
            Some(id) => {
                let Some(existing) = existing_photos.get(&id) else {
                    errors.add(format!("photos[{i}].id"), "Unknown photo for this workshop");
                    continue;
                };
                if entry.remove {
                    photo_actions.push(PhotoAction::Remove {
                        id,
                        old_path: existing.image_path.clone(),
                    });
                    continue;
                }
                let replacement = entry.image.as_ref().and_then(|upload| {
                    decode_upload(&format!("photos[{i}].image"), upload, &mut errors).map(|bytes| {
                        (upload.filename.clone(), bytes, existing.image_path.clone())
                    })
                });
                photo_actions.push(PhotoAction::Update {
                    id,
                    caption: entry.caption.clone(),
                    replacement,
                });
            }
            None => {
                if entry.remove {
                    continue;
                }
                let Some(upload) = entry.image.as_ref() else {
                    errors.add(format!("photos[{i}].image"), "An image file is required");
                    continue;
                };
                if let Some(bytes) =
                    decode_upload(&format!("photos[{i}].image"), upload, &mut errors)
                {
                    photo_actions.push(PhotoAction::Add {
                        caption: entry.caption.clone(),
                        filename: upload.filename.clone(),
                        bytes,
                    });
                }
            }
        }
    }

    for (i, entry) in form.documents.iter().enumerate() {
        if let Some(upload) = entry.file.as_ref() {
            require_pdf(&format!("documents[{i}].file"), &upload.filename, &mut errors);
        }
        match entry.id {
            Some(id) => {
                let Some(existing) = existing_documents.get(&id) else {
                    errors.add(format!("documents[{i}].id"), "Unknown document for this workshop");
                    continue;
                };
                if entry.remove {
                    document_actions.push(DocumentAction::Remove {
                        id,
                        old_path: existing.file_path.clone(),
                    });
                    continue;
                }
                let replacement = entry.file.as_ref().and_then(|upload| {
                    decode_upload(&format!("documents[{i}].file"), upload, &mut errors).map(
                        |bytes| (upload.filename.clone(), bytes, existing.file_path.clone()),
                    )
                });
                document_actions.push(DocumentAction::Update {
                    id,
                    doc_type: entry.doc_type,
                    replacement,
                });
            }
            None => {
                if entry.remove {
                    continue;
                }
                let Some(upload) = entry.file.as_ref() else {
                    errors.add(format!("documents[{i}].file"), "A PDF file is required");
                    continue;
                };
                if let Some(bytes) =
                    decode_upload(&format!("documents[{i}].file"), upload, &mut errors)
                {
                    document_actions.push(DocumentAction::Add {
                        doc_type: entry.doc_type,
                        filename: upload.filename.clone(),
                        bytes,
                    });
                }
            }
        }
    }

    errors.into_result()?;
    Ok((photo_actions, document_actions))
}

/// Validates and applies an uploads form against a workshop.
///
/// Returns the resulting photo and document sets. Validation failures are
/// collected across both sets and reported together; nothing is persisted
/// in that case.
pub async fn manage_uploads(
    conn: &mut DbConn,
    storage: &FileStorageService,
    workshop: &Workshop,
    form: ManageUploadsForm,
) -> Result<(Vec<WorkshopPhoto>, Vec<WorkshopDocument>)> {
    let existing_photos: HashMap<Uuid, WorkshopPhoto> =
        attachments::list_photos(conn, workshop.id)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();
    let existing_documents: HashMap<Uuid, WorkshopDocument> =
        attachments::list_documents(conn, workshop.id)
            .await?
            .into_iter()
            .map(|d| (d.id, d))
            .collect();

    let (photo_actions, document_actions) =
        plan_actions(&form, &existing_photos, &existing_documents)?;

    // All entries are valid. Write new files first, then apply every
    // database change in one transaction; old files are only removed once
    // the transaction has committed.
    let mut written = Vec::new();
    let mut obsolete = Vec::new();

    let mut stored_photos = Vec::new();
    for action in photo_actions {
        stored_photos.push(match action {
            PhotoAction::Add {
                caption,
                filename,
                bytes,
            } => {
                let path = storage
                    .store_workshop_file(workshop.id, &filename, &bytes)
                    .await?;
                written.push(path.clone());
                StoredPhotoAction::Add { caption, path }
            }
            PhotoAction::Update {
                id,
                caption,
                replacement,
            } => match replacement {
                Some((filename, bytes, old_path)) => {
                    let path = storage
                        .store_workshop_file(workshop.id, &filename, &bytes)
                        .await?;
                    written.push(path.clone());
                    obsolete.push(old_path);
                    StoredPhotoAction::Update {
                        id,
                        caption,
                        path: Some(path),
                    }
                }
                None => StoredPhotoAction::Update {
                    id,
                    caption,
                    path: None,
                },
            },
            PhotoAction::Remove { id, old_path } => {
                obsolete.push(old_path);
                StoredPhotoAction::Remove { id }
            }
        });
    }

    let mut stored_documents = Vec::new();
    for action in document_actions {
        stored_documents.push(match action {
            DocumentAction::Add {
                doc_type,
                filename,
                bytes,
            } => {
                let path = storage
                    .store_workshop_file(workshop.id, &filename, &bytes)
                    .await?;
                written.push(path.clone());
                StoredDocumentAction::Add { doc_type, path }
            }
            DocumentAction::Update {
                id,
                doc_type,
                replacement,
            } => match replacement {
                Some((filename, bytes, old_path)) => {
                    let path = storage
                        .store_workshop_file(workshop.id, &filename, &bytes)
                        .await?;
                    written.push(path.clone());
                    obsolete.push(old_path);
                    StoredDocumentAction::Update {
                        id,
                        doc_type,
                        path: Some(path),
                    }
                }
                None => StoredDocumentAction::Update {
                    id,
                    doc_type,
                    path: None,
                },
            },
            DocumentAction::Remove { id, old_path } => {
                obsolete.push(old_path);
                StoredDocumentAction::Remove { id }
            }
        });
    }

    let result = apply_actions(conn, workshop, stored_photos, stored_documents).await;

    match result {
        Ok(()) => {
            for path in obsolete {
                if let Err(e) = storage.remove_file(&path).await {
                    tracing::warn!(path = %path, error = %e, "Failed to remove obsolete upload");
                }
            }
        }
        Err(e) => {
            // The transaction rolled back; drop the files written for it.
            for path in written {
                if let Err(cleanup) = storage.remove_file(&path).await {
                    tracing::warn!(path = %path, error = %cleanup, "Failed to clean up upload after rollback");
                }
            }
            return Err(e);
        }
    }

    let photos = attachments::list_photos(conn, workshop.id).await?;
    let documents = attachments::list_documents(conn, workshop.id).await?;
    Ok((photos, documents))
}

enum StoredPhotoAction {
    Add { caption: String, path: String },
    Update { id: Uuid, caption: String, path: Option<String> },
    Remove { id: Uuid },
}

enum StoredDocumentAction {
    Add { doc_type: DocType, path: String },
    Update { id: Uuid, doc_type: DocType, path: Option<String> },
    Remove { id: Uuid },
}

async fn apply_actions(
    conn: &mut DbConn,
    workshop: &Workshop,
    photos: Vec<StoredPhotoAction>,
    documents: Vec<StoredDocumentAction>,
) -> Result<()> {
    let mut tx = conn.begin().await?;

    for action in photos {
        match action {
            StoredPhotoAction::Add { caption, path } => {
                attachments::insert_photo(
                    &mut *tx,
                    NewWorkshopPhoto {
                        workshop_id: workshop.id,
                        image_path: path,
                        caption,
                    },
                )
                .await?;
            }
            StoredPhotoAction::Update { id, caption, path } => {
                attachments::update_photo(&mut *tx, id, &caption, path.as_deref()).await?;
            }
            StoredPhotoAction::Remove { id } => {
                attachments::delete_photo(&mut *tx, id).await?;
            }
        }
    }

    for action in documents {
        match action {
            StoredDocumentAction::Add { doc_type, path } => {
                attachments::insert_document(
                    &mut *tx,
                    NewWorkshopDocument {
                        workshop_id: workshop.id,
                        doc_type,
                        file_path: path,
                    },
                )
                .await?;
            }
            StoredDocumentAction::Update { id, doc_type, path } => {
                attachments::update_document(&mut *tx, id, doc_type, path.as_deref()).await?;
            }
            StoredDocumentAction::Remove { id } => {
                attachments::delete_document(&mut *tx, id).await?;
            }
        }
    }

    tx.commit().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::{Error, ValidationErrors},
        models::requests::{DocumentEntry, FileUpload, PhotoEntry},
        validation::MAX_UPLOAD_BYTES,
    };
    use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
    use chrono::Utc;

    fn upload(filename: &str, bytes: &[u8]) -> FileUpload {
        FileUpload {
            filename: filename.to_string(),
            content: BASE64.encode(bytes),
        }
    }

    fn existing_photo(workshop_id: Uuid) -> WorkshopPhoto {
        WorkshopPhoto {
            id: Uuid::now_v7(),
            workshop_id,
            image_path: "workshops/x/old.jpg".to_string(),
            caption: "Opening session".to_string(),
            uploaded_at: Utc::now(),
        }
    }

    fn existing_document(workshop_id: Uuid) -> WorkshopDocument {
        WorkshopDocument {
            id: Uuid::now_v7(),
            workshop_id,
            doc_type: DocType::Attendance,
            file_path: "workshops/x/old.pdf".to_string(),
            uploaded_at: Utc::now(),
        }
    }

    fn fields_of(err: Error) -> std::collections::HashMap<String, String> {
        match err {
            Error::Validation(ValidationErrors::Multiple { fields }) => fields,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_plan_valid_mixed_batch() {
        let workshop_id = Uuid::now_v7();
        let photo = existing_photo(workshop_id);
        let document = existing_document(workshop_id);
        let photos = HashMap::from([(photo.id, photo.clone())]);
        let documents = HashMap::from([(document.id, document.clone())]);

        let form = ManageUploadsForm {
            photos: vec![
                PhotoEntry {
                    id: None,
                    caption: "Lab tour".to_string(),
                    image: Some(upload("tour.jpg", b"jpeg bytes")),
                    remove: false,
                },
                PhotoEntry {
                    id: Some(photo.id),
                    caption: "Updated caption".to_string(),
                    image: None,
                    remove: false,
                },
            ],
            documents: vec![DocumentEntry {
                id: Some(document.id),
                doc_type: DocType::Attendance,
                file: None,
                remove: true,
            }],
        };

        let (photo_actions, document_actions) =
            plan_actions(&form, &photos, &documents).unwrap();
        assert_eq!(photo_actions.len(), 2);
        assert_eq!(document_actions.len(), 1);
        assert!(matches!(photo_actions[0], PhotoAction::Add { .. }));
        assert!(matches!(
            photo_actions[1],
            PhotoAction::Update { replacement: None, .. }
        ));
        assert!(matches!(document_actions[0], DocumentAction::Remove { .. }));
    }

    #[test]
    fn test_non_pdf_document_rejected() {
        let form = ManageUploadsForm {
            photos: vec![],
            documents: vec![DocumentEntry {
                id: None,
                doc_type: DocType::FeedbackSummary,
                file: Some(upload("summary.docx", b"doc bytes")),
                remove: false,
            }],
        };

        let err = plan_actions(&form, &HashMap::new(), &HashMap::new()).unwrap_err();
        let fields = fields_of(err);
        assert!(fields.contains_key("documents[0].file"));
    }

    #[test]
    fn test_oversized_photo_rejected() {
        let form = ManageUploadsForm {
            photos: vec![PhotoEntry {
                id: None,
                caption: String::new(),
                image: Some(upload("big.jpg", &vec![0u8; MAX_UPLOAD_BYTES + 1])),
                remove: false,
            }],
            documents: vec![],
        };

        let err = plan_actions(&form, &HashMap::new(), &HashMap::new()).unwrap_err();
        let fields = fields_of(err);
        assert!(fields.contains_key("photos[0].image"));
    }

    #[test]
    fn test_new_photo_requires_image() {
        let form = ManageUploadsForm {
            photos: vec![PhotoEntry {
                id: None,
                caption: "No file attached".to_string(),
                image: None,
                remove: false,
            }],
            documents: vec![],
        };

        let err = plan_actions(&form, &HashMap::new(), &HashMap::new()).unwrap_err();
        assert!(fields_of(err).contains_key("photos[0].image"));
    }

    #[test]
    fn test_unknown_ids_rejected() {
        let form = ManageUploadsForm {
            photos: vec![PhotoEntry {
                id: Some(Uuid::now_v7()),
                caption: String::new(),
                image: None,
                remove: false,
            }],
            documents: vec![DocumentEntry {
                id: Some(Uuid::now_v7()),
                doc_type: DocType::Other,
                file: None,
                remove: true,
            }],
        };

        let err = plan_actions(&form, &HashMap::new(), &HashMap::new()).unwrap_err();
        let fields = fields_of(err);
        assert!(fields.contains_key("photos[0].id"));
        assert!(fields.contains_key("documents[0].id"));
    }

    #[test]
    fn test_one_bad_entry_blocks_the_whole_batch() {
        // A valid photo alongside an invalid document: nothing may be planned.
        let form = ManageUploadsForm {
            photos: vec![PhotoEntry {
                id: None,
                caption: "Fine".to_string(),
                image: Some(upload("ok.jpg", b"bytes")),
                remove: false,
            }],
            documents: vec![DocumentEntry {
                id: None,
                doc_type: DocType::Other,
                file: Some(upload("notes.txt", b"bytes")),
                remove: false,
            }],
        };

        let err = plan_actions(&form, &HashMap::new(), &HashMap::new()).unwrap_err();
        let fields = fields_of(err);
        assert_eq!(fields.len(), 1);
        assert!(fields.contains_key("documents[0].file"));
    }

    #[test]
    fn test_replacement_keeps_old_path_for_cleanup() {
        let workshop_id = Uuid::now_v7();
        let photo = existing_photo(workshop_id);
        let photos = HashMap::from([(photo.id, photo.clone())]);

        let form = ManageUploadsForm {
            photos: vec![PhotoEntry {
                id: Some(photo.id),
                caption: photo.caption.clone(),
                image: Some(upload("new.jpg", b"new bytes")),
                remove: false,
            }],
            documents: vec![],
        };

        let (photo_actions, _) = plan_actions(&form, &photos, &HashMap::new()).unwrap();
        match &photo_actions[0] {
            PhotoAction::Update {
                replacement: Some((filename, bytes, old_path)),
                ..
            } => {
                assert_eq!(filename, "new.jpg");
                assert_eq!(bytes, b"new bytes");
                assert_eq!(old_path, &photo.image_path);
            }
            other => panic!("expected replacement update, got {other:?}"),
        }
    }
}
