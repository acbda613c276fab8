//! Cached hospital directory.
//!
//! Building the directory means walking the archive's entire series and
//! study collections, which is far too expensive per request. The service
//! wraps the fetch-then-aggregate pipeline in a fixed-TTL cache; both
//! collection walks run concurrently and the aggregation starts once both
//! have joined.
//!
//! Directory availability is best-effort: any failure in the pipeline is
//! swallowed and yields an empty list, never an error to the caller. There
//! is no stampede protection; concurrent cache misses may each rebuild,
//! which is accepted at the request rates an internal directory sees.

use std::sync::Arc;
use std::time::Duration;

use pacsgate_client::ArchiveClient;
use pacsgate_core::{Result, TtlCell, tags};

use crate::institutions::{Institution, build_institutions};

/// Column projection requested for the series walk.
const SERIES_INCLUDE_FIELDS: [&str; 8] = [
    tags::INSTITUTION_NAME,
    tags::INSTITUTION_ADDRESS,
    tags::DEPARTMENT_NAME,
    tags::MODALITY,
    tags::STUDY_INSTANCE_UID,
    tags::PATIENT_ID,
    tags::SERIES_DATE,
    tags::SERIES_TIME,
];

/// Column projection requested for the supplemental study walk.
const STUDY_INCLUDE_FIELDS: [&str; 7] = [
    tags::INSTITUTION_NAME,
    tags::INSTITUTION_ADDRESS,
    tags::DEPARTMENT_NAME,
    tags::MODALITIES_IN_STUDY,
    tags::STUDY_INSTANCE_UID,
    tags::PATIENT_ID,
    tags::STUDY_DATE,
];

/// TTL-cached institution directory over the archive.
pub struct DirectoryService {
    archive: Arc<ArchiveClient>,
    cache: TtlCell<Vec<Institution>>,
    ttl: Duration,
}

impl DirectoryService {
    #[must_use]
    pub fn new(archive: Arc<ArchiveClient>, ttl: Duration) -> Self {
        Self {
            archive,
            cache: TtlCell::new(),
            ttl,
        }
    }

    /// Returns the institution directory, rebuilding it when the cached
    /// copy is missing or expired.
    ///
    /// Never fails: a rebuild error is logged and an empty directory is
    /// returned, so a broken archive cannot take dependent features down
    /// with it. Cached state is fully rebuildable from the archive at any
    /// time, which is what makes this aggressive degradation safe.
    pub async fn get_directory(&self) -> Vec<Institution> {
        if let Some(cached) = self.cache.get().await {
            tracing::trace!("Directory cache hit ({} institutions)", cached.len());
            return cached;
        }

        match self.rebuild().await {
            Ok(institutions) => {
                self.cache.put(institutions.clone(), self.ttl).await;
                institutions
            }
            Err(e) => {
                tracing::warn!("Directory rebuild failed: {e}");
                Vec::new()
            }
        }
    }

    /// Resolves a positional directory id to its institution.
    pub async fn find_by_id(&self, id: usize) -> Option<Institution> {
        self.get_directory()
            .await
            .into_iter()
            .find(|institution| institution.id == id)
    }

    /// Drops the cached directory so the next call rebuilds.
    pub async fn invalidate(&self) {
        self.cache.clear().await;
    }

    async fn rebuild(&self) -> Result<Vec<Institution>> {
        let series_params = [("includefield", SERIES_INCLUDE_FIELDS.join(","))];
        let study_params = [("includefield", STUDY_INCLUDE_FIELDS.join(","))];

        // Both walks are independent; aggregation needs both joined.
        let (series, studies) = tokio::join!(
            self.archive.fetch_all("series", &series_params),
            self.archive.fetch_all("studies", &study_params),
        );
        let series = series?;
        let studies = studies?;

        let institutions = build_institutions(&series, &studies);
        tracing::debug!(
            "Built {} institutions from {} series + {} studies",
            institutions.len(),
            series.len(),
            studies.len()
        );
        Ok(institutions)
    }
}
