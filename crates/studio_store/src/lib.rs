mod error;
mod history;
mod paths;
mod preferences;
mod units;

pub use error::StoreError;
pub use history::{
    now_millis, HistoryLog, HistoryOrigin, HistoryRecord, HistoryStore, HISTORY_CAPACITY,
};
pub use paths::{store_root, unit_file_name, STORE_DIR};
pub use preferences::{
    load_language, load_settings_value, load_theme, save_language, save_settings, save_theme,
    Theme,
};
pub use units::{FileUnitStore, MemoryUnitStore, UnitKey, UnitStore};
