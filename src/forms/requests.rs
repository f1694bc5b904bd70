//! Request bodies for every form the service accepts.

use super::{FieldErrors, Validate};
use crate::catalog::types::{Pricing, MAX_RATING};
use crate::store::Row;
use base64::Engine;
use serde::Deserialize;
use serde_json::{json, Value};

pub const MIN_PASSWORD_LENGTH: usize = 8;

const RESUME_EXTENSIONS: &[&str] = &["pdf", "doc", "docx"];
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "gif", "svg"];

/// A file sent inline as base64.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadPayload {
    pub file_name: String,
    #[serde(default)]
    pub content_type: Option<String>,
    pub data: String,
}

impl UploadPayload {
    pub fn extension(&self) -> Option<String> {
        self.file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .filter(|ext| !ext.is_empty())
    }

    pub fn decode(&self) -> Result<Vec<u8>, base64::DecodeError> {
        base64::engine::general_purpose::STANDARD.decode(self.data.trim())
    }

    fn check(&self, field: &str, allowed: &[&str], errors: &mut FieldErrors) {
        match self.extension() {
            Some(ext) if allowed.contains(&ext.as_str()) => {}
            _ => errors.add(field, format!("must be one of: {}", allowed.join(", "))),
        }
        match self.decode() {
            Ok(bytes) if bytes.is_empty() => errors.add(field, "is empty"),
            Ok(_) => {}
            Err(_) => errors.add(field, "is not valid base64"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Validate for Credentials {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.check_email("email", &self.email);
        if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            errors.add(
                "password",
                format!("must be at least {} characters", MIN_PASSWORD_LENGTH),
            );
        }
        errors.into_result()
    }
}

/// A public "submit a tool" request. Lands in the pending submissions table.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolSubmission {
    pub name: String,
    pub url: String,
    pub description: String,
    #[serde(default)]
    pub category: Vec<String>,
    pub pricing: String,
    pub submitter_email: String,
    #[serde(default)]
    pub logo: Option<UploadPayload>,
}

impl Validate for ToolSubmission {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.check_length("name", &self.name, 1, 100);
        errors.check_url("url", &self.url);
        errors.check_length("description", &self.description, 20, 2000);
        if self.category.iter().all(|c| c.trim().is_empty()) {
            errors.add("category", "select at least one category");
        }
        if self.pricing.parse::<Pricing>().is_err() {
            errors.add("pricing", "is not a known pricing option");
        }
        errors.check_email("submitterEmail", &self.submitter_email);
        if let Some(logo) = &self.logo {
            logo.check("logo", IMAGE_EXTENSIONS, &mut errors);
        }
        errors.into_result()
    }
}

impl ToolSubmission {
    /// Row for the pending submissions table, with the logo already stored.
    pub fn into_row(self, logo_url: Option<String>) -> Row {
        let row = json!({
            "name": self.name.trim(),
            "url": self.url.trim(),
            "description": self.description.trim(),
            "category": self.category,
            "pricing": self.pricing,
            "submitter_email": self.submitter_email.trim(),
            "logo": logo_url.unwrap_or_default(),
            "status": "pending",
        });
        into_row(row)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReviewForm {
    pub rating: u8,
    pub text: String,
}

impl Validate for ReviewForm {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if !(1..=5).contains(&self.rating) {
            errors.add("rating", "must be between 1 and 5");
        }
        errors.check_length("text", &self.text, 10, 2000);
        errors.into_result()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommentForm {
    pub body: String,
}

impl Validate for CommentForm {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.check_length("body", &self.body, 1, 1000);
        errors.into_result()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewsletterSignup {
    pub email: String,
}

impl Validate for NewsletterSignup {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.check_email("email", &self.email);
        errors.into_result()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CareerApplication {
    pub full_name: String,
    pub email: String,
    pub position: String,
    #[serde(default)]
    pub cover_letter: Option<String>,
    pub resume: UploadPayload,
}

impl Validate for CareerApplication {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.check_length("fullName", &self.full_name, 2, 120);
        errors.check_email("email", &self.email);
        errors.check_length("position", &self.position, 2, 120);
        if let Some(letter) = &self.cover_letter {
            errors.check_length("coverLetter", letter, 0, 5000);
        }
        self.resume.check("resume", RESUME_EXTENSIONS, &mut errors);
        errors.into_result()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AvatarUpload {
    pub image: UploadPayload,
}

impl Validate for AvatarUpload {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        self.image.check("image", IMAGE_EXTENSIONS, &mut errors);
        errors.into_result()
    }
}

/// Admin payload describing a full tool listing.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolInput {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub logo: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub short_description: String,
    #[serde(default)]
    pub category: Vec<String>,
    pub pricing: Pricing,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub review_count: u64,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub api_access: bool,
    #[serde(default)]
    pub pros: Option<Vec<String>>,
    #[serde(default)]
    pub cons: Option<Vec<String>>,
    #[serde(default)]
    pub use_cases: Option<Vec<String>>,
}

fn check_rating(rating: Option<f64>, errors: &mut FieldErrors) {
    if let Some(r) = rating {
        if !(0.0..=MAX_RATING).contains(&r) {
            errors.add("rating", "must be between 0 and 5");
        }
    }
}

impl Validate for ToolInput {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.check_length("name", &self.name, 1, 100);
        errors.check_url("url", &self.url);
        check_rating(self.rating, &mut errors);
        errors.into_result()
    }
}

impl ToolInput {
    /// Row in the live catalog's column naming.
    pub fn into_row(self) -> Row {
        into_row(json!({
            "name": self.name.trim(),
            "url": self.url.trim(),
            "logo": self.logo,
            "description": self.description,
            "shortdescription": self.short_description,
            "category": self.category,
            "pricing": self.pricing,
            "rating": self.rating,
            "reviewcount": self.review_count,
            "features": self.features,
            "apiaccess": self.api_access,
            "pros": self.pros,
            "cons": self.cons,
            "usecases": self.use_cases,
        }))
    }
}

/// Admin payload for a partial update; only present fields are written.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolPatch {
    pub name: Option<String>,
    pub url: Option<String>,
    pub logo: Option<String>,
    pub description: Option<String>,
    pub short_description: Option<String>,
    pub category: Option<Vec<String>>,
    pub pricing: Option<Pricing>,
    pub rating: Option<f64>,
    pub review_count: Option<u64>,
    pub features: Option<Vec<String>>,
    pub api_access: Option<bool>,
    pub pros: Option<Vec<String>>,
    pub cons: Option<Vec<String>>,
    pub use_cases: Option<Vec<String>>,
}

impl Validate for ToolPatch {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if let Some(name) = &self.name {
            errors.check_length("name", name, 1, 100);
        }
        if let Some(url) = &self.url {
            errors.check_url("url", url);
        }
        check_rating(self.rating, &mut errors);
        errors.into_result()
    }
}

impl ToolPatch {
    pub fn into_row(self) -> Row {
        let mut row = Row::new();
        let mut set = |column: &str, value: Option<Value>| {
            if let Some(value) = value {
                row.insert(column.to_string(), value);
            }
        };
        set("name", self.name.map(Value::from));
        set("url", self.url.map(Value::from));
        set("logo", self.logo.map(Value::from));
        set("description", self.description.map(Value::from));
        set("shortdescription", self.short_description.map(Value::from));
        set("category", self.category.map(Value::from));
        set("pricing", self.pricing.map(|p| Value::from(p.label())));
        set("rating", self.rating.map(Value::from));
        set("reviewcount", self.review_count.map(Value::from));
        set("features", self.features.map(Value::from));
        set("apiaccess", self.api_access.map(Value::from));
        set("pros", self.pros.map(Value::from));
        set("cons", self.cons.map(Value::from));
        set("usecases", self.use_cases.map(Value::from));
        row
    }
}

fn into_row(value: Value) -> Row {
    match value {
        Value::Object(row) => row,
        _ => Row::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingestion::map_row;

    fn encoded(bytes: &[u8]) -> String {
        base64::engine::general_purpose::STANDARD.encode(bytes)
    }

    #[test]
    fn test_review_bounds() {
        let ok = ReviewForm { rating: 5, text: "Really useful for drafts".into() };
        assert!(ok.validate().is_ok());

        let errors = ReviewForm { rating: 0, text: "meh".into() }.validate().unwrap_err();
        assert_eq!(errors.get("rating"), Some("must be between 1 and 5"));
        assert_eq!(errors.get("text"), Some("must be at least 10 characters"));
    }

    #[test]
    fn test_submission_collects_every_field_error() {
        let submission = ToolSubmission {
            name: String::new(),
            url: "not a url".into(),
            description: "too short".into(),
            category: vec![],
            pricing: "Cheap".into(),
            submitter_email: "nobody".into(),
            logo: None,
        };
        let errors = submission.validate().unwrap_err();
        let fields: Vec<&str> = errors.fields().collect();
        assert_eq!(
            fields,
            vec!["category", "description", "name", "pricing", "submitterEmail", "url"]
        );
    }

    #[test]
    fn test_resume_extension_and_payload() {
        let mut application = CareerApplication {
            full_name: "Ada Lovelace".into(),
            email: "ada@example.com".into(),
            position: "Engineer".into(),
            cover_letter: None,
            resume: UploadPayload {
                file_name: "cv.PDF".into(),
                content_type: Some("application/pdf".into()),
                data: encoded(b"%PDF-1.7"),
            },
        };
        assert!(application.validate().is_ok());

        application.resume.file_name = "cv.exe".into();
        application.resume.data = "***".into();
        let errors = application.validate().unwrap_err();
        assert_eq!(errors.get("resume"), Some("must be one of: pdf, doc, docx"));
    }

    #[test]
    fn test_credentials_password_length() {
        let creds = Credentials { email: "a@b.io".into(), password: "short".into() };
        assert!(creds.validate().unwrap_err().get("password").is_some());
    }

    #[test]
    fn test_tool_input_row_maps_back_to_tool() {
        let input: ToolInput = serde_json::from_value(serde_json::json!({
            "name": "Scribe",
            "url": "https://scribe.example.com",
            "category": ["Writing"],
            "pricing": "Freemium",
            "shortDescription": "Drafts text",
            "useCases": ["Blogging"]
        }))
        .unwrap();
        assert!(input.validate().is_ok());

        let mut row = input.into_row();
        row.insert("id".into(), "t9".into());
        let tool = map_row(&row).unwrap();
        assert_eq!(tool.name, "Scribe");
        assert_eq!(tool.short_description, "Drafts text");
        assert_eq!(tool.pricing, Pricing::Freemium);
        assert_eq!(tool.use_cases(), ["Blogging".to_string()]);
        assert_eq!(tool.pros, None);
    }

    #[test]
    fn test_patch_only_writes_present_fields() {
        let patch = ToolPatch {
            rating: Some(4.2),
            pricing: Some(Pricing::OpenSource),
            ..Default::default()
        };
        let row = patch.into_row();
        assert_eq!(row.len(), 2);
        assert_eq!(row["pricing"], "Open Source");
    }
}
