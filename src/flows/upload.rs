//! Upload screen flows: the upload form itself plus the category sidebar.

use std::sync::RwLock;

use crate::api::Api;
use crate::api::category::{Category, CategoryList, NewCategoryPayload, NewCategoryResponse};
use crate::api::file::{AudioFile, UploadResponse, upload_field};
use crate::error::{Fault, fault_code};
use crate::fetch::Controller;
use crate::upload::{MultipartPayload, UploadController};

use super::UNKNOWN_ERROR_MESSAGE;

/// A file the user has picked, held until submit.
#[derive(Debug, Clone)]
pub struct SelectedFile {
    pub name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadError {
    /// No file selected; nothing was sent.
    BlankField,
    CategoryNotFound,
    Unknown,
}

impl UploadError {
    pub fn message(self) -> &'static str {
        match self {
            UploadError::BlankField => "Please choose a file",
            UploadError::CategoryNotFound => "Category not found",
            UploadError::Unknown => UNKNOWN_ERROR_MESSAGE,
        }
    }

    fn from_fault(fault: Option<&Fault>) -> Self {
        match fault.and_then(Fault::code) {
            Some(fault_code::CATEGORY_NOT_FOUND) => UploadError::CategoryNotFound,
            _ => UploadError::Unknown,
        }
    }
}

/// The upload form: a description, an optional category and the picked
/// file, wrapped around a multipart controller.
///
/// A failed submit clears the description and the file so the user starts
/// the form over; the category selection is kept.
pub struct UploadForm {
    controller: UploadController<UploadResponse>,
    description: RwLock<String>,
    file: RwLock<Option<SelectedFile>>,
    category_id: RwLock<Option<String>>,
}

impl UploadForm {
    pub fn new(api: &Api) -> Self {
        Self {
            controller: api.upload_file(),
            description: RwLock::new(String::new()),
            file: RwLock::new(None),
            category_id: RwLock::new(None),
        }
    }

    pub fn set_description(&self, description: impl Into<String>) {
        *self.description.write().unwrap() = description.into();
    }

    pub fn description(&self) -> String {
        self.description.read().unwrap().clone()
    }

    pub fn choose_file(&self, file: SelectedFile) {
        *self.file.write().unwrap() = Some(file);
    }

    pub fn file_name(&self) -> Option<String> {
        self.file.read().unwrap().as_ref().map(|f| f.name.clone())
    }

    pub fn set_category(&self, category_id: Option<String>) {
        *self.category_id.write().unwrap() = category_id;
    }

    pub fn category_id(&self) -> Option<String> {
        self.category_id.read().unwrap().clone()
    }

    /// Submit the form as `POST /file/new`.
    pub async fn submit(&self) -> Result<AudioFile, UploadError> {
        let Some(file) = self.file.read().unwrap().clone() else {
            return Err(UploadError::BlankField);
        };

        let mut payload = MultipartPayload::new().file(
            upload_field::AUDIO_FILE,
            file.name,
            file.mime,
            file.bytes,
        );
        let description = self.description();
        if !description.is_empty() {
            payload = payload.text(upload_field::DESCRIPTION, description);
        }
        if let Some(category_id) = self.category_id() {
            payload = payload.text(upload_field::CATEGORY_ID, category_id);
        }

        self.controller.trigger(payload).await;

        if let Some(response) = self.controller.result() {
            return Ok(response.file);
        }

        // Start the form over on failure, keeping the category selection.
        self.reset();
        Err(UploadError::from_fault(self.controller.fault().as_ref()))
    }

    fn reset(&self) {
        *self.description.write().unwrap() = String::new();
        *self.file.write().unwrap() = None;
    }

    pub fn controller(&self) -> &UploadController<UploadResponse> {
        &self.controller
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddCategoryError {
    BlankField,
    Unknown,
}

impl AddCategoryError {
    pub fn message(self) -> &'static str {
        match self {
            AddCategoryError::BlankField => "Please fill in the new category name",
            AddCategoryError::Unknown => UNKNOWN_ERROR_MESSAGE,
        }
    }
}

/// Drives `POST /category/new`.
pub struct AddCategoryFlow {
    controller: Controller<NewCategoryResponse>,
}

impl AddCategoryFlow {
    pub fn new(api: &Api) -> Self {
        Self {
            controller: api.new_category(),
        }
    }

    pub async fn submit(&self, name: &str) -> Result<Category, AddCategoryError> {
        if name.is_empty() {
            return Err(AddCategoryError::BlankField);
        }

        self.controller
            .trigger(&NewCategoryPayload {
                name: name.to_string(),
            })
            .await;

        match self.controller.result() {
            Some(response) => Ok(response.category),
            None => Err(AddCategoryError::Unknown),
        }
    }

    pub fn controller(&self) -> &Controller<NewCategoryResponse> {
        &self.controller
    }
}

/// Drives `GET /category`.
pub struct CategoriesFlow {
    controller: Controller<CategoryList>,
}

impl CategoriesFlow {
    pub fn new(api: &Api) -> Self {
        Self {
            controller: api.categories(),
        }
    }

    pub async fn load(&self) -> Result<Vec<Category>, Fault> {
        self.controller.trigger_empty().await;

        match self.controller.result() {
            Some(list) => Ok(list.categories),
            None => match self.controller.fault() {
                Some(fault) => Err(fault),
                None => Err(Fault::Transport("category list missing".to_string())),
            },
        }
    }

    pub fn controller(&self) -> &Controller<CategoryList> {
        &self.controller
    }
}
