//! Form submission flows.
//!
//! The non-rendering half of each screen: local validation before any
//! network call, a trigger through the screen's controller, mapping of
//! backend fault codes to user-facing messages, and the optimistic
//! session updates. Unrecognized fault codes always map to the generic
//! unknown-error message; flows never retry.

pub mod account;
pub mod files;
pub mod login;
pub mod signup;
pub mod upload;

pub use account::{
    ChangePasswordError, ChangePasswordFlow, DeleteAccountError, DeleteAccountFlow, LogoutFlow,
};
pub use files::FilesFlow;
pub use login::{LoginError, LoginFlow};
pub use signup::{SignupError, SignupFlow};
pub use upload::{AddCategoryError, AddCategoryFlow, CategoriesFlow, SelectedFile, UploadError, UploadForm};

/// Generic message for faults no flow knows how to phrase.
pub const UNKNOWN_ERROR_MESSAGE: &str = "An unknown error occurred";
