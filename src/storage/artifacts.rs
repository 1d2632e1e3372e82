use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

use super::source::ArtifactSource;

/// Bytes read from the start of a local file when validating it
pub const SIGNATURE_LEN: usize = 10;

const PICKLE_PROTO: u8 = 0x80;

/// True when `header` starts with a pickle PROTO opcode and a known protocol (2-5)
pub fn has_pickle_signature(header: &[u8]) -> bool {
    matches!(header, [PICKLE_PROTO, protocol, ..] if (2..=5).contains(protocol))
}

/// The two artifacts the recommender needs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    Movies,
    Similarity,
}

impl ArtifactKind {
    /// File name used for the downloaded copy
    pub fn file_name(self) -> &'static str {
        match self {
            ArtifactKind::Movies => "movies.pkl",
            ArtifactKind::Similarity => "similarity.pkl",
        }
    }

    /// File name used for a manually uploaded copy
    pub fn upload_file_name(self) -> &'static str {
        match self {
            ArtifactKind::Movies => "movies_uploaded.pkl",
            ArtifactKind::Similarity => "similarity_uploaded.pkl",
        }
    }
}

impl Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArtifactKind::Movies => write!(f, "movies"),
            ArtifactKind::Similarity => write!(f, "similarity"),
        }
    }
}

impl FromStr for ArtifactKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "movies" | "catalog" => Ok(ArtifactKind::Movies),
            "similarity" | "matrix" => Ok(ArtifactKind::Similarity),
            other => Err(AppError::InvalidInput(format!(
                "Unknown artifact '{}', expected 'movies' or 'similarity'",
                other
            ))),
        }
    }
}

/// Local mirror of the remote artifacts
#[derive(Clone)]
pub struct ArtifactStore {
    data_dir: PathBuf,
    source: Arc<dyn ArtifactSource>,
}

impl ArtifactStore {
    pub fn new(data_dir: impl Into<PathBuf>, source: Arc<dyn ArtifactSource>) -> Self {
        Self {
            data_dir: data_dir.into(),
            source,
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Where the downloaded copy of `kind` lives
    pub fn path_for(&self, kind: ArtifactKind) -> PathBuf {
        self.data_dir.join(kind.file_name())
    }

    /// Where the uploaded copy of `kind` lives
    pub fn upload_path_for(&self, kind: ArtifactKind) -> PathBuf {
        self.data_dir.join(kind.upload_file_name())
    }

    /// Makes sure a valid copy of `remote_id` exists at `local_path`
    ///
    /// An existing file with a pickle signature is reused as-is. Anything else
    /// is removed and the artifact is downloaded again. The download is only
    /// moved into place once its signature checks out.
    pub async fn ensure_artifact(&self, remote_id: &str, local_path: &Path) -> AppResult<PathBuf> {
        let artifact = local_path.display().to_string();

        if fs::try_exists(local_path).await? {
            match read_signature(local_path).await {
                Ok(header) if has_pickle_signature(&header) => {
                    tracing::info!(path = %artifact, "Reusing existing artifact");
                    return Ok(local_path.to_path_buf());
                }
                Ok(_) => {
                    tracing::warn!(path = %artifact, "Existing artifact has no pickle signature, removing");
                    fs::remove_file(local_path).await?;
                }
                Err(e) => {
                    tracing::warn!(path = %artifact, error = %e, "Existing artifact unreadable, removing");
                    fs::remove_file(local_path).await?;
                }
            }
        }

        tracing::info!(
            path = %artifact,
            remote_id = %remote_id,
            source = self.source.name(),
            "Downloading artifact"
        );

        let bytes = self.source.fetch(remote_id).await.map_err(|e| {
            tracing::error!(path = %artifact, error = %e, "Artifact download failed");
            AppError::provisioning(&artifact, e)
        })?;

        if !has_pickle_signature(&bytes[..bytes.len().min(SIGNATURE_LEN)]) {
            tracing::error!(
                path = %artifact,
                bytes = bytes.len(),
                "Downloaded artifact has no pickle signature"
            );
            return Err(AppError::provisioning(
                &artifact,
                "downloaded file is not in pickle format",
            ));
        }

        write_atomically(local_path, &bytes).await?;

        tracing::info!(path = %artifact, bytes = bytes.len(), "Artifact stored");

        Ok(local_path.to_path_buf())
    }

    /// Stores user-supplied bytes for `kind` verbatim, without validation
    pub async fn persist_upload(&self, kind: ArtifactKind, bytes: &[u8]) -> AppResult<PathBuf> {
        let path = self.upload_path_for(kind);
        write_atomically(&path, bytes).await?;

        tracing::info!(
            artifact = %kind,
            path = %path.display(),
            bytes = bytes.len(),
            "Uploaded artifact stored"
        );

        Ok(path)
    }

    /// Paths of both uploaded artifacts, if both have been supplied
    pub async fn uploaded_paths(&self) -> AppResult<Option<(PathBuf, PathBuf)>> {
        let movies = self.upload_path_for(ArtifactKind::Movies);
        let similarity = self.upload_path_for(ArtifactKind::Similarity);

        if fs::try_exists(&movies).await? && fs::try_exists(&similarity).await? {
            Ok(Some((movies, similarity)))
        } else {
            Ok(None)
        }
    }
}

/// Reads up to the first `SIGNATURE_LEN` bytes of a file
async fn read_signature(path: &Path) -> std::io::Result<Vec<u8>> {
    let file = fs::File::open(path).await?;
    let mut header = Vec::with_capacity(SIGNATURE_LEN);
    file.take(SIGNATURE_LEN as u64).read_to_end(&mut header).await?;
    Ok(header)
}

/// Writes `bytes` to a sibling temp file, then renames it onto `path`
async fn write_atomically(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let part = path.with_file_name(format!(".{}.{}.part", file_name, Uuid::new_v4().simple()));

    let written: std::io::Result<()> = async {
        let mut file = fs::File::create(&part).await?;
        file.write_all(bytes).await?;
        file.sync_all().await
    }
    .await;

    if let Err(e) = written {
        let _ = fs::remove_file(&part).await;
        return Err(e);
    }

    if let Err(e) = fs::rename(&part, path).await {
        let _ = fs::remove_file(&part).await;
        return Err(e);
    }

    Ok(())
}
