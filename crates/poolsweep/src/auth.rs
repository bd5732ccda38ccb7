//! Secret loading for broker and provider access.

use std::path::Path;

use anyhow::{bail, Context, Result};

/// Read a secret from a file, trimming surrounding whitespace.
///
/// Both the broker password and the provider API key come from files so
/// they stay out of argv and the process environment.
pub async fn read_secret_file(path: &Path) -> Result<String> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read secret file {}", path.display()))?;
    let secret = raw.trim();
    if secret.is_empty() {
        bail!("secret file {} is empty", path.display());
    }
    Ok(secret.to_string())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[tokio::test]
    async fn trims_trailing_newlines() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "s3cret-key").unwrap();
        let secret = read_secret_file(file.path()).await.unwrap();
        assert_eq!(secret, "s3cret-key");
    }

    #[tokio::test]
    async fn rejects_an_empty_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "\n  \n").unwrap();
        let err = read_secret_file(file.path()).await.unwrap_err();
        assert!(err.to_string().contains("is empty"));
    }

    #[tokio::test]
    async fn missing_file_names_the_path() {
        let err = read_secret_file(Path::new("/does/not/exist"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("/does/not/exist"));
    }
}
