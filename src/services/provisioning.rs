use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use crate::{
    error::{AppError, AppResult},
    models::{ArtifactOrigin, RecommendationContext},
    storage::{decode_catalog, decode_similarity, ArtifactKind, ArtifactStore},
};

/// Result of storing one manually uploaded artifact
#[derive(Debug)]
pub enum UploadOutcome {
    /// Stored; the other artifact has not been uploaded yet
    Staged { awaiting: ArtifactKind },
    /// Both uploads are present and were loaded and installed
    Loaded(Arc<RecommendationContext>),
}

/// Brings the catalog and similarity matrix onto local disk and into memory
///
/// Owns the installed [`RecommendationContext`]. A context is only swapped in
/// while the provisioning lock is held, so installs happen in the same order
/// as the passes that produced them.
pub struct Provisioner {
    store: ArtifactStore,
    movies_remote_id: String,
    similarity_remote_id: String,
    // Serialises provisioning, uploads and installs within this process
    lock: Mutex<()>,
    current: RwLock<Option<Arc<RecommendationContext>>>,
}

impl Provisioner {
    pub fn new(store: ArtifactStore, movies_remote_id: String, similarity_remote_id: String) -> Self {
        Self {
            store,
            movies_remote_id,
            similarity_remote_id,
            lock: Mutex::new(()),
            current: RwLock::new(None),
        }
    }

    /// The installed context, if any pass has succeeded yet
    pub async fn current(&self) -> Option<Arc<RecommendationContext>> {
        self.current.read().await.clone()
    }

    /// Ensures both artifacts are present, loads them and installs the result
    ///
    /// Both downloads are attempted even if the first fails. When either
    /// download fails or the downloaded pair cannot be decoded, a complete
    /// pair of earlier uploads is used instead if one exists. On failure the
    /// previously installed context is left in place.
    pub async fn provision(&self) -> AppResult<Arc<RecommendationContext>> {
        let _guard = self.lock.lock().await;

        let context = match self.load_remote().await {
            Ok(context) => context,
            Err(error) => match self.store.uploaded_paths().await? {
                Some((movies, similarity)) => {
                    tracing::warn!(
                        error = %error,
                        "Remote artifacts unusable, loading previously uploaded artifacts"
                    );
                    load_context(&movies, &similarity, ArtifactOrigin::Upload).await?
                }
                None => {
                    tracing::warn!(error = %error, "Provisioning failed, awaiting manual upload");
                    return Err(error);
                }
            },
        };

        Ok(self.install(context).await)
    }

    /// Stores an uploaded artifact and installs the pair once both are present
    pub async fn stage_upload(&self, kind: ArtifactKind, bytes: &[u8]) -> AppResult<UploadOutcome> {
        let _guard = self.lock.lock().await;

        self.store.persist_upload(kind, bytes).await?;

        let other = match kind {
            ArtifactKind::Movies => ArtifactKind::Similarity,
            ArtifactKind::Similarity => ArtifactKind::Movies,
        };

        match self.store.uploaded_paths().await? {
            Some((movies, similarity)) => {
                let context = load_context(&movies, &similarity, ArtifactOrigin::Upload).await?;
                Ok(UploadOutcome::Loaded(self.install(context).await))
            }
            None => Ok(UploadOutcome::Staged { awaiting: other }),
        }
    }

    async fn load_remote(&self) -> AppResult<RecommendationContext> {
        let movies = self
            .store
            .ensure_artifact(&self.movies_remote_id, &self.store.path_for(ArtifactKind::Movies))
            .await;
        let similarity = self
            .store
            .ensure_artifact(
                &self.similarity_remote_id,
                &self.store.path_for(ArtifactKind::Similarity),
            )
            .await;

        let (movies, similarity) = (movies?, similarity?);
        load_context(&movies, &similarity, ArtifactOrigin::Remote).await
    }

    // Callers must hold `lock`
    async fn install(&self, context: RecommendationContext) -> Arc<RecommendationContext> {
        let context = Arc::new(context);
        *self.current.write().await = Some(context.clone());
        context
    }
}

/// Reads and decodes both artifacts into a context
pub async fn load_context(
    movies_path: &Path,
    similarity_path: &Path,
    origin: ArtifactOrigin,
) -> AppResult<RecommendationContext> {
    let movies_bytes = tokio::fs::read(movies_path).await?;
    let similarity_bytes = tokio::fs::read(similarity_path).await?;
    let movies_path: PathBuf = movies_path.to_path_buf();
    let similarity_path: PathBuf = similarity_path.to_path_buf();

    let context = tokio::task::spawn_blocking(move || {
        let catalog = decode_catalog(&movies_bytes)?;
        let matrix = decode_similarity(&similarity_bytes)?;
        RecommendationContext::new(catalog, matrix, origin, movies_path, similarity_path)
    })
    .await
    .map_err(|e| AppError::Internal(format!("artifact decoding task failed: {}", e)))??;

    tracing::info!(
        movies = context.catalog.len(),
        origin = ?context.origin,
        "Recommendation data loaded"
    );

    Ok(context)
}
