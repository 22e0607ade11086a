use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Extensions read directly as UTF-8 text.
pub const TEXT_EXTENSIONS: [&str; 4] = ["txt", "md", "srt", "vtt"];

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("unsupported source file {path}: {reason}")]
    Unsupported { path: PathBuf, reason: &'static str },

    #[error("failed to read source file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Load source text for a generation from a file on disk.
pub fn load_source(path: &Path) -> Result<String, SourceError> {
    let extension = path
        .extension()
        .and_then(|extension| extension.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some(extension) if TEXT_EXTENSIONS.contains(&extension) => {
            fs::read_to_string(path).map_err(|source| SourceError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
        Some("docx") => Err(SourceError::Unsupported {
            path: path.to_path_buf(),
            reason: "document extraction is not available; export the text first",
        }),
        _ => Err(SourceError::Unsupported {
            path: path.to_path_buf(),
            reason: "expected a .txt, .md, .srt or .vtt file",
        }),
    }
}
