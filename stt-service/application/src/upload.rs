use std::{
    io::{self, Write},
    path::Path,
};

use tempfile::NamedTempFile;

const DEFAULT_SUFFIX: &str = ".wav";

/// An uploaded payload staged on disk for the model runtime, which only reads files.
/// The file is deleted when this value is dropped.
pub struct ScopedUpload {
    file: NamedTempFile,
}

impl ScopedUpload {
    pub fn create(bytes: &[u8], filename: Option<&str>) -> io::Result<Self> {
        let suffix = upload_suffix(filename);
        let mut file = tempfile::Builder::new()
            .prefix("stt-upload-")
            .suffix(&suffix)
            .tempfile()?;
        file.write_all(bytes)?;
        file.flush()?;

        tracing::debug!(path = %file.path().display(), bytes = bytes.len(), "staged upload");
        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

fn upload_suffix(filename: Option<&str>) -> String {
    filename
        .and_then(|name| Path::new(name).extension())
        .and_then(|extension| extension.to_str())
        .filter(|extension| !extension.is_empty())
        .map(|extension| format!(".{extension}"))
        .unwrap_or_else(|| DEFAULT_SUFFIX.to_string())
}
