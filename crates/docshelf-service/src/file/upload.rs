//! Upload pipeline: admission, ingest and best-effort thumbnails.

use bytes::Bytes;
use tracing::{info, warn};

use docshelf_core::config::library::LibraryConfig;
use docshelf_core::error::AppError;
use docshelf_core::result::AppResult;
use docshelf_core::types::{FileId, FolderId};
use docshelf_entity::UploadCandidate;
use docshelf_storage::ThumbnailGenerator;

use crate::library::LibraryService;

/// Result of one candidate in a batch.
#[derive(Debug, Clone)]
pub struct UploadOutcome {
    /// Name the candidate was offered under.
    pub name: String,
    /// The new file id, or why the candidate was not stored.
    pub result: Result<FileId, AppError>,
}

/// Per-candidate results of a batch, in input order.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    /// One entry per candidate.
    pub outcomes: Vec<UploadOutcome>,
}

impl BatchReport {
    /// Ids of the files that were stored.
    pub fn admitted(&self) -> Vec<FileId> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok().copied())
            .collect()
    }

    /// Names and errors of the candidates that were not stored.
    pub fn rejected(&self) -> Vec<(&str, &AppError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (o.name.as_str(), e)))
            .collect()
    }

    /// Returns `true` when every candidate was stored.
    pub fn all_admitted(&self) -> bool {
        self.outcomes.iter().all(|o| o.result.is_ok())
    }
}

/// Admits PDF uploads into a library.
#[derive(Debug, Clone)]
pub struct UploadService {
    /// Largest accepted payload in bytes.
    max_file_size: u64,
    /// Thumbnail generator, if thumbnails are wanted.
    thumbnails: Option<ThumbnailGenerator>,
}

impl UploadService {
    /// Creates a new upload service.
    pub fn new(config: &LibraryConfig, thumbnails: Option<ThumbnailGenerator>) -> Self {
        Self {
            max_file_size: config.max_file_size_bytes,
            thumbnails: thumbnails.filter(ThumbnailGenerator::is_enabled),
        }
    }

    /// Check type and size. Fails with `OversizeOrWrongType`.
    pub fn admit(&self, candidate: &UploadCandidate) -> AppResult<()> {
        if !candidate.is_pdf() {
            return Err(AppError::oversize_or_wrong_type(format!(
                "'{}' is {}, only PDF files are accepted",
                candidate.name, candidate.mime_type
            )));
        }
        let size = candidate.size.max(candidate.data.len() as u64);
        if size > self.max_file_size {
            return Err(AppError::oversize_or_wrong_type(format!(
                "'{}' is {size} bytes, the limit is {} bytes",
                candidate.name, self.max_file_size
            )));
        }
        Ok(())
    }

    /// Admit one candidate and store it in `folder_id`.
    ///
    /// A thumbnail is generated when possible; failing to generate one does
    /// not fail the upload.
    pub async fn upload(
        &self,
        library: &mut LibraryService,
        folder_id: FolderId,
        candidate: UploadCandidate,
    ) -> AppResult<FileId> {
        self.admit(&candidate)?;
        if library.library().resolve_folder(folder_id).is_none() {
            return Err(AppError::parent_not_found(format!(
                "Target folder {folder_id} not found"
            )));
        }

        let thumbnail = self.thumbnail(&candidate.name, candidate.data.clone()).await;
        library
            .add_file(folder_id, &candidate.name, candidate.data, thumbnail)
            .await
    }

    /// Upload every candidate in order, one at a time.
    pub async fn upload_batch(
        &self,
        library: &mut LibraryService,
        folder_id: FolderId,
        candidates: Vec<UploadCandidate>,
    ) -> BatchReport {
        let mut report = BatchReport::default();
        for candidate in candidates {
            let name = candidate.name.clone();
            let result = self.upload(library, folder_id, candidate).await;
            if let Err(e) = &result {
                warn!(name = %name, error = %e, "Upload rejected");
            }
            report.outcomes.push(UploadOutcome { name, result });
        }

        info!(
            admitted = report.admitted().len(),
            rejected = report.rejected().len(),
            "Upload batch finished"
        );
        report
    }

    async fn thumbnail(&self, name: &str, data: Bytes) -> Option<Bytes> {
        let generator = self.thumbnails.as_ref()?;
        match generator.generate(data).await {
            Ok(png) => Some(png),
            Err(e) => {
                warn!(name, error = %e, "Thumbnail generation failed, storing without one");
                None
            }
        }
    }
}
