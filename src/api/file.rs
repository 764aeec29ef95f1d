//! File endpoint payloads and responses.

use serde::{Deserialize, Serialize};

use super::category::Category;

/// An uploaded audio file record as the backend returns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioFile {
    pub id: String,
    pub user_id: String,
    pub description: String,
    pub path: String,
    pub status: String,
    pub categories: Vec<Category>,
    pub created_at: String,
    pub updated_at: String,
}

/// Body of `GET /file`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileList {
    pub files: Vec<AudioFile>,
}

/// Body of a successful `POST /file/new` upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub file: AudioFile,
}

/// Multipart field names for `POST /file/new`.
pub mod upload_field {
    pub const AUDIO_FILE: &str = "audiofile";
    pub const DESCRIPTION: &str = "description";
    pub const CATEGORY_ID: &str = "categoryId";
}
