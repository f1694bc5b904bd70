//! Public forms: tool submissions, newsletter signups, career applications, avatars.

use super::id_string;
use crate::auth::User;
use crate::error::{AppError, Result};
use crate::files::{
    object_path, FileStorage, StoredObject, AVATARS_BUCKET, LOGOS_BUCKET, RESUMES_BUCKET,
};
use crate::forms::requests::UploadPayload;
use crate::forms::{
    AvatarUpload, CareerApplication, FieldErrors, NewsletterSignup, ToolSubmission, Validate,
};
use crate::store::{DataStore, Row, RowFilter, Table};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Receipt {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationReceipt {
    pub id: String,
    pub resume_url: String,
}

/// Decodes an inline upload, enforcing the size limit as a field error.
fn decode_upload(field: &str, payload: &UploadPayload, max_bytes: usize) -> Result<Vec<u8>> {
    let mut errors = FieldErrors::new();
    match payload.decode() {
        Ok(bytes) if bytes.len() > max_bytes => {
            errors.add(field, format!("must be at most {} bytes", max_bytes));
        }
        Ok(bytes) => return Ok(bytes),
        Err(_) => errors.add(field, "is not valid base64"),
    }
    Err(AppError::FieldError(errors))
}

fn receipt(row: Row) -> Result<Receipt> {
    super::decode_row(row)
}

/// Stores a submission in the pending table. It is not visible in the catalog
/// until an admin approves it.
pub async fn submit_tool(
    store: &dyn DataStore,
    files: &dyn FileStorage,
    submission: ToolSubmission,
    max_upload_bytes: usize,
) -> Result<Receipt> {
    submission.validate()?;

    let logo_url = match &submission.logo {
        Some(logo) => {
            let bytes = decode_upload("logo", logo, max_upload_bytes)?;
            let path = object_path("submissions", logo.extension().as_deref());
            let stored = files
                .upload(LOGOS_BUCKET, &path, bytes, logo.content_type.as_deref())
                .await?;
            Some(stored.public_url)
        }
        None => None,
    };

    let stored = store
        .insert_one(Table::Submissions, submission.into_row(logo_url))
        .await?;
    metrics::counter!("tool_submissions_total").increment(1);
    receipt(stored)
}

pub async fn subscribe_newsletter(store: &dyn DataStore, signup: NewsletterSignup) -> Result<Receipt> {
    signup.validate()?;
    let email = signup.email.trim().to_lowercase();

    let existing = store
        .select(
            Table::NewsletterSubscribers,
            &RowFilter::all().eq("email", email.as_str()),
        )
        .await?;
    if !existing.is_empty() {
        return Err(AppError::ConflictError(
            "This email is already subscribed".to_string(),
        ));
    }

    let mut row = Row::new();
    row.insert("email".to_string(), Value::from(email));
    let stored = store.insert_one(Table::NewsletterSubscribers, row).await?;
    receipt(stored)
}

/// Uploads the résumé, then records the application.
///
/// A failure in either step is reported as one generic failure; an uploaded
/// résumé is not removed when the insert fails.
pub async fn apply_for_career(
    store: &dyn DataStore,
    files: &dyn FileStorage,
    application: CareerApplication,
    max_upload_bytes: usize,
) -> Result<ApplicationReceipt> {
    application.validate()?;
    let bytes = decode_upload("resume", &application.resume, max_upload_bytes)?;

    let outcome: Result<ApplicationReceipt> = async {
        let path = object_path(&application.email, application.resume.extension().as_deref());
        let stored = files
            .upload(
                RESUMES_BUCKET,
                &path,
                bytes,
                application.resume.content_type.as_deref(),
            )
            .await?;

        let mut row = Row::new();
        row.insert("full_name".to_string(), Value::from(application.full_name.trim()));
        row.insert("email".to_string(), Value::from(application.email.trim()));
        row.insert("position".to_string(), Value::from(application.position.trim()));
        row.insert(
            "cover_letter".to_string(),
            Value::from(application.cover_letter.clone().unwrap_or_default()),
        );
        row.insert("resume_url".to_string(), Value::from(stored.public_url.as_str()));
        let inserted = store.insert_one(Table::CareerApplications, row).await?;

        Ok::<_, AppError>(ApplicationReceipt {
            id: receipt(inserted)?.id,
            resume_url: stored.public_url,
        })
    }
    .await;

    outcome.map_err(|e| {
        tracing::error!(error = %e, "Career application failed");
        AppError::StoreError("the application could not be submitted, please try again".to_string())
    })
}

pub async fn upload_avatar(
    files: &dyn FileStorage,
    user: &User,
    upload: AvatarUpload,
    max_upload_bytes: usize,
) -> Result<StoredObject> {
    upload.validate()?;
    let bytes = decode_upload("image", &upload.image, max_upload_bytes)?;
    let path = object_path(&user.id, upload.image.extension().as_deref());
    Ok(files
        .upload(AVATARS_BUCKET, &path, bytes, upload.image.content_type.as_deref())
        .await?)
}
