use std::path::{Path, PathBuf};

use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

/// Storage folder an upload lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    ProfilePicture,
    Logo,
    Material,
}

impl MediaKind {
    pub fn directory(self) -> &'static str {
        match self {
            MediaKind::ProfilePicture => "profile",
            MediaKind::Logo => "logo",
            MediaKind::Material => "material",
        }
    }
}

/// Media given either as an already hosted url or as a local file to upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaSource {
    Url(String),
    File(PathBuf),
}

impl MediaSource {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.starts_with("http://") || raw.starts_with("https://") {
            MediaSource::Url(raw.to_string())
        } else {
            MediaSource::File(PathBuf::from(raw))
        }
    }
}

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("media uploads are not configured; cannot upload '{}'", path.display())]
    UploadsUnavailable { path: PathBuf },
    #[error("media file '{}' does not exist", path.display())]
    MissingFile { path: PathBuf },
}

/// Object storage for pictures, logos and partner materials. Returns the
/// public url of the stored object.
#[async_trait]
pub trait MediaUploader: Send + Sync {
    async fn upload(&self, kind: MediaKind, object_name: &str, path: &Path) -> Result<String>;
}

pub struct MissingMediaUploader;

#[async_trait]
impl MediaUploader for MissingMediaUploader {
    async fn upload(&self, _kind: MediaKind, _object_name: &str, path: &Path) -> Result<String> {
        Err(MediaError::UploadsUnavailable {
            path: path.to_path_buf(),
        }
        .into())
    }
}

/// Fresh object name keeping the original extension: `<uuid>.<ext>`.
pub fn object_name(path: &Path) -> String {
    let suffix = path
        .extension()
        .or_else(|| path.file_name())
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("{}.{suffix}", Uuid::new_v4())
}

pub async fn resolve_media(
    uploader: &dyn MediaUploader,
    kind: MediaKind,
    source: &MediaSource,
) -> Result<String> {
    match source {
        MediaSource::Url(url) => Ok(url.clone()),
        MediaSource::File(path) => {
            if !path.exists() {
                return Err(MediaError::MissingFile { path: path.clone() }.into());
            }
            let name = object_name(path);
            let url = uploader.upload(kind, &name, path).await?;
            info!(kind = kind.directory(), %url, "uploaded media");
            Ok(url)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hosted_urls_and_local_paths() {
        assert_eq!(
            MediaSource::parse("https://cdn.example/logo.png"),
            MediaSource::Url("https://cdn.example/logo.png".into())
        );
        assert_eq!(
            MediaSource::parse("./logo.png"),
            MediaSource::File(PathBuf::from("./logo.png"))
        );
    }

    #[test]
    fn object_names_keep_the_extension() {
        let name = object_name(Path::new("/tmp/headshot.final.jpeg"));
        assert!(name.ends_with(".jpeg"), "unexpected name {name}");
        assert_eq!(name.len(), 36 + ".jpeg".len());
    }

    #[tokio::test]
    async fn urls_pass_through_without_upload() {
        let url = resolve_media(
            &MissingMediaUploader,
            MediaKind::Logo,
            &MediaSource::Url("https://cdn.example/logo.png".into()),
        )
        .await
        .expect("resolve");
        assert_eq!(url, "https://cdn.example/logo.png");
    }

    #[tokio::test]
    async fn local_files_need_an_uploader() {
        let path = std::env::temp_dir().join(format!("ves_media_{}.png", Uuid::new_v4()));
        std::fs::write(&path, b"png").expect("write temp file");

        let err = resolve_media(
            &MissingMediaUploader,
            MediaKind::ProfilePicture,
            &MediaSource::File(path.clone()),
        )
        .await
        .expect_err("must fail");
        assert!(err.to_string().contains("not configured"), "unexpected error: {err}");

        std::fs::remove_file(path).expect("cleanup");
    }
}
