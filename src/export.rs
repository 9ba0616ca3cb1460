use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::AppError;

pub fn export_file_name(subject_name: &str) -> String {
    let name = subject_name.trim();
    let name = if name.is_empty() { "subject" } else { name };
    let safe: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '\0' => '_',
            other => other,
        })
        .collect();
    format!("{}-planning.xlsx", safe)
}

pub async fn write_export(dir: &Path, subject_name: &str, bytes: &[u8]) -> Result<PathBuf, AppError> {
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(export_file_name(subject_name));
    tokio::fs::write(&path, bytes).await?;
    info!("export saved to {} ({} bytes)", path.display(), bytes.len());
    Ok(path)
}
