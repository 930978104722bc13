//! Application data directory resolution.

use std::path::PathBuf;

pub const APP_DIR_NAME: &str = "skiff";

/// Per-user data directory for Skiff, if the platform exposes one.
pub fn data_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|base| base.join(APP_DIR_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_dir_ends_with_app_name() {
        if let Some(dir) = data_dir() {
            assert_eq!(dir.file_name().unwrap(), APP_DIR_NAME);
        }
    }
}
