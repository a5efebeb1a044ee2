use std::fs;
use std::path::Path;
use std::time;

/// An extension trait for [`Path`] types.
pub trait PathExt {
    fn metadata_modified(&self) -> Option<time::SystemTime>;
}

impl PathExt for Path {
    /// Returns the modified time of the file if available.
    fn metadata_modified(&self) -> Option<time::SystemTime> {
        fs::metadata(self).and_then(|m| m.modified()).ok()
    }
}
