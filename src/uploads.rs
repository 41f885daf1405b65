//! On-disk storage for product images.
//!
//! Files live flat under the configured upload directory and are referenced
//! from the database by their public path, `/uploads/<name>`.

use std::path::{Path, PathBuf};

use anyhow::Context;
use tokio::{fs, io::AsyncWriteExt};

pub const PUBLIC_PREFIX: &str = "/uploads/";

const MAX_NAME_ATTEMPTS: u32 = 100;

/// `<millis>-<name>`, with client directory components dropped and whitespace runs
/// collapsed to `_`.
pub fn stored_file_name(original: &str, timestamp_millis: i64) -> String {
    let base = original
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();
    let sanitized = base.split_whitespace().collect::<Vec<_>>().join("_");
    let sanitized = if sanitized.is_empty() || sanitized == "." || sanitized == ".." {
        "upload".to_string()
    } else {
        sanitized
    };
    format!("{timestamp_millis}-{sanitized}")
}

/// `n`-th alternative for a taken name: `<stem>-<n>.<ext>`.
pub fn numbered_file_name(file_name: &str, n: u32) -> String {
    match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{stem}-{n}.{ext}"),
        _ => format!("{file_name}-{n}"),
    }
}

/// Normalize a stored reference so it is always reachable under `/uploads/`.
/// Empty references have no public path.
pub fn public_path(stored: &str) -> Option<String> {
    let stored = stored.trim();
    if stored.is_empty() {
        None
    } else if stored.starts_with(PUBLIC_PREFIX) {
        Some(stored.to_string())
    } else if stored.starts_with("uploads/") {
        Some(format!("/{stored}"))
    } else {
        Some(format!("{PUBLIC_PREFIX}{stored}"))
    }
}

pub fn public_path_opt(stored: Option<&str>) -> Option<String> {
    stored.and_then(public_path)
}

/// Map a public path back to the file it names inside `upload_dir`.
/// Anything outside the prefix, or naming a nested path, is not ours to touch.
pub fn disk_path(upload_dir: &Path, public: &str) -> Option<PathBuf> {
    let name = public.strip_prefix(PUBLIC_PREFIX)?;
    if name.is_empty() || name.contains(['/', '\\']) || name == ".." {
        return None;
    }
    Some(upload_dir.join(name))
}

/// Write one image and return its public path. Existing files are never
/// overwritten; a taken name gets a numeric suffix.
pub async fn save_image(upload_dir: &Path, original_name: &str, bytes: &[u8]) -> anyhow::Result<String> {
    fs::create_dir_all(upload_dir)
        .await
        .with_context(|| format!("creating upload dir {}", upload_dir.display()))?;

    let base = stored_file_name(original_name, chrono::Utc::now().timestamp_millis());
    for attempt in 0..MAX_NAME_ATTEMPTS {
        let file_name = if attempt == 0 {
            base.clone()
        } else {
            numbered_file_name(&base, attempt)
        };
        let target = upload_dir.join(&file_name);

        let mut file = match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
            .await
        {
            Ok(file) => file,
            Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => continue,
            Err(err) => {
                return Err(err).with_context(|| format!("creating upload {}", target.display()));
            }
        };

        let written = async {
            file.write_all(bytes).await?;
            file.flush().await
        }
        .await;
        if let Err(err) = written {
            drop(file);
            let _ = fs::remove_file(&target).await;
            return Err(err).with_context(|| format!("writing upload {}", target.display()));
        }

        tracing::debug!(path = %target.display(), size = bytes.len(), "saved upload");
        return Ok(format!("{PUBLIC_PREFIX}{file_name}"));
    }

    anyhow::bail!("no free upload name for {base} in {}", upload_dir.display())
}

/// Best-effort removal; failures are logged and swallowed.
pub async fn remove_images<'a>(upload_dir: &Path, public_paths: impl IntoIterator<Item = &'a str>) {
    for public in public_paths {
        let Some(path) = disk_path(upload_dir, public) else {
            continue;
        };
        match fs::remove_file(&path).await {
            Ok(()) => tracing::debug!(path = %path.display(), "removed upload"),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => tracing::warn!(path = %path.display(), error = %err, "failed to remove upload"),
        }
    }
}
