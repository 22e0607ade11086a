use std::path::{Path, PathBuf};

use crate::units::UnitKey;

pub const STORE_DIR: &str = ".subtitle_studio";

#[must_use]
pub fn store_root(base: &Path) -> PathBuf {
    base.join(STORE_DIR)
}

#[must_use]
pub fn unit_file_name(key: UnitKey) -> String {
    format!("{}.json", key.as_str())
}

#[must_use]
pub(crate) fn staging_file_name(key: UnitKey) -> String {
    format!(".{}.json.tmp", key.as_str())
}
