//! Native file-picker dialog wrappers.
//!
//! Thin pass-throughs over rfd. `None` means the user canceled, which is
//! not an error. These block the calling thread; the gateway runs them on a
//! blocking task.

use std::path::PathBuf;

/// Show a native open-file dialog.
pub fn pick_open_file() -> Option<PathBuf> {
    rfd::FileDialog::new().pick_file()
}

/// Show a native open-folder dialog.
pub fn pick_folder() -> Option<PathBuf> {
    rfd::FileDialog::new().pick_folder()
}

/// Show a native save dialog.
pub fn pick_save_path() -> Option<PathBuf> {
    rfd::FileDialog::new().save_file()
}
