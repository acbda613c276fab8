//! Dashboard service.
//!
//! Ties the archive client and the institution directory to the pure
//! [`aggregate_stats`] transform. Study retrieval here is deliberately a
//! single bounded window ordered newest-first rather than a full
//! collection walk; the dashboard is a summary view and a recency-biased
//! sample is the intended input for its histograms.

use std::sync::Arc;

use pacsgate_client::ArchiveClient;
use pacsgate_core::{DicomRecord, Result};

use crate::dashboard::{DashboardStats, aggregate_stats};
use crate::directory::DirectoryService;

/// How many newest-first studies feed one dashboard aggregation.
const DASHBOARD_STUDY_WINDOW: usize = 1000;

const ORDER_NEWEST_FIRST: &str = "-StudyDate";

/// Network-wide and per-hospital dashboard statistics.
pub struct DashboardService {
    archive: Arc<ArchiveClient>,
    directory: Arc<DirectoryService>,
}

impl DashboardService {
    #[must_use]
    pub fn new(archive: Arc<ArchiveClient>, directory: Arc<DirectoryService>) -> Self {
        Self { archive, directory }
    }

    /// Aggregates statistics over the whole archive.
    ///
    /// The patient total comes from the archive-declared count, not from
    /// the sampled studies, so it stays accurate beyond the study window.
    ///
    /// # Errors
    ///
    /// Only an authentication failure propagates; any other archive
    /// failure degrades to statistics over whatever was retrieved.
    pub async fn network_stats(&self) -> Result<DashboardStats> {
        let studies = self.study_window(&[]).await?;
        let total_patients = self.archive.total_count("patients", &[]).await?;
        Ok(aggregate_stats(&studies, total_patients, None))
    }

    /// Aggregates statistics for one directory entry.
    ///
    /// Resolves the positional id through the directory, then filters the
    /// study window and the patient count by a wildcard match on the
    /// institution name. When the filtered window comes back empty the
    /// unfiltered window is used instead; some archives never record
    /// InstitutionName on studies and an all-zero dashboard would read as
    /// an outage.
    ///
    /// Returns `Ok(None)` when the id does not parse or is not in the
    /// directory.
    ///
    /// # Errors
    ///
    /// Only an authentication failure propagates.
    pub async fn hospital_stats(&self, hospital_id: &str) -> Result<Option<DashboardStats>> {
        let Ok(id) = hospital_id.parse::<usize>() else {
            return Ok(None);
        };
        let Some(institution) = self.directory.find_by_id(id).await else {
            return Ok(None);
        };

        let name_filter = format!("*{}*", institution.institution_name);
        let filter_params = [("InstitutionName", name_filter.clone())];

        let mut studies = self.study_window(&filter_params).await?;
        if studies.is_empty() {
            tracing::debug!(
                "No studies matched institution {:?}, using unfiltered window",
                institution.institution_name
            );
            studies = self.study_window(&[]).await?;
        }

        let total_patients = self.archive.total_count("patients", &filter_params).await?;
        Ok(Some(aggregate_stats(
            &studies,
            total_patients,
            Some(hospital_id.to_string()),
        )))
    }

    /// One newest-first study window, with the degraded error policy:
    /// only an authentication failure propagates, everything else yields
    /// an empty window.
    async fn study_window(&self, extra_params: &[(&str, String)]) -> Result<Vec<DicomRecord>> {
        let mut params: Vec<(&str, String)> = extra_params.to_vec();
        params.push(("limit", DASHBOARD_STUDY_WINDOW.to_string()));
        params.push(("orderby", ORDER_NEWEST_FIRST.to_string()));

        match self.archive.query("studies", &params).await {
            Ok(studies) => Ok(studies),
            Err(e) if e.is_auth_error() => Err(e),
            Err(e) => {
                tracing::warn!("Dashboard study window failed: {e}");
                Ok(Vec::new())
            }
        }
    }
}
