//! Dashboard flow: listing the user's uploaded files.

use crate::api::Api;
use crate::api::file::{AudioFile, FileList};
use crate::error::Fault;
use crate::fetch::Controller;

/// Drives `GET /file`.
pub struct FilesFlow {
    controller: Controller<FileList>,
}

impl FilesFlow {
    pub fn new(api: &Api) -> Self {
        Self {
            controller: api.files(),
        }
    }

    pub async fn load(&self) -> Result<Vec<AudioFile>, Fault> {
        self.controller.trigger_empty().await;

        match self.controller.result() {
            Some(list) => Ok(list.files),
            None => match self.controller.fault() {
                Some(fault) => Err(fault),
                None => Err(Fault::Transport("file list missing".to_string())),
            },
        }
    }

    pub fn controller(&self) -> &Controller<FileList> {
        &self.controller
    }
}
