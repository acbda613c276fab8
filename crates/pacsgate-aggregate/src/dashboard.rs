//! Dashboard statistics aggregation.
//!
//! A pure, context-free transform over a study collection: histograms and
//! a bounded recent-items projection. Nothing here caches or fetches;
//! callers decide where the studies and the patient total come from (see
//! [`crate::service::DashboardService`]).

use std::collections::BTreeMap;

use indexmap::IndexMap;
use pacsgate_core::{DicomRecord, format_dicom_date, tags};
use serde::{Deserialize, Serialize};

/// Upper bound on the date histogram: the 30 latest distinct date keys.
///
/// This is a top-30-distinct-keys rule, not a calendar window; it only
/// approximates "the last month" when the input is recency-biased.
pub const DATE_HISTOGRAM_LIMIT: usize = 30;

/// Upper bound on the recent-studies projection.
pub const RECENT_STUDIES_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModalityCount {
    pub modality: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateCount {
    pub date: String,
    pub count: u64,
}

/// One row of the recent-studies projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentStudy {
    pub id: String,
    #[serde(rename = "studyInstanceUID")]
    pub study_instance_uid: String,
    pub patient_name: String,
    pub patient_id: String,
    pub study_date: String,
    pub modality: String,
    pub description: String,
    pub accession_number: String,
    pub number_of_instances: u64,
    pub number_of_series: u64,
}

/// Bounded dashboard statistics over a study collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_studies: usize,
    pub total_patients: u64,
    pub total_series: u64,
    pub total_instances: u64,
    pub studies_by_modality: Vec<ModalityCount>,
    pub studies_by_date: Vec<DateCount>,
    pub recent_studies: Vec<RecentStudy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hospital_id: Option<String>,
}

/// Aggregates dashboard statistics from a study collection.
///
/// `total_patients` is supplied by the caller rather than computed here:
/// depending on context it may be a unique-id count, a server-declared
/// total, or an external hint, and keeping it out of this function keeps
/// the transform pure.
///
/// The modality histogram is sorted strictly descending by count (order
/// among equal counts is unspecified); the date histogram holds at most
/// [`DATE_HISTOGRAM_LIMIT`] of the latest distinct date keys in ascending
/// order; `recent_studies` is the first [`RECENT_STUDIES_LIMIT`] input
/// records in input order. Malformed records contribute zeros and empty
/// strings, never an error.
pub fn aggregate_stats(
    studies: &[DicomRecord],
    total_patients: u64,
    hospital_id: Option<String>,
) -> DashboardStats {
    let mut modality_counts: IndexMap<String, u64> = IndexMap::new();
    let mut date_counts: BTreeMap<String, u64> = BTreeMap::new();
    let mut total_series: u64 = 0;
    let mut total_instances: u64 = 0;

    for study in studies {
        for modality in study.str_values(tags::MODALITIES_IN_STUDY) {
            *modality_counts.entry(modality).or_insert(0) += 1;
        }

        let date = format_dicom_date(&study.str_value(tags::STUDY_DATE));
        if !date.is_empty() {
            *date_counts.entry(date).or_insert(0) += 1;
        }

        total_series += study.count_value(
            "numberOfStudyRelatedSeries",
            tags::NUMBER_OF_STUDY_RELATED_SERIES,
        );
        total_instances += study.count_value(
            "numberOfStudyRelatedInstances",
            tags::NUMBER_OF_STUDY_RELATED_INSTANCES,
        );
    }

    let mut studies_by_modality: Vec<ModalityCount> = modality_counts
        .into_iter()
        .map(|(modality, count)| ModalityCount { modality, count })
        .collect();
    studies_by_modality.sort_by(|a, b| b.count.cmp(&a.count));

    // BTreeMap iterates ascending; keep only the latest distinct keys.
    let skip = date_counts.len().saturating_sub(DATE_HISTOGRAM_LIMIT);
    let studies_by_date: Vec<DateCount> = date_counts
        .into_iter()
        .skip(skip)
        .map(|(date, count)| DateCount { date, count })
        .collect();

    let recent_studies: Vec<RecentStudy> = studies
        .iter()
        .take(RECENT_STUDIES_LIMIT)
        .enumerate()
        .map(|(index, study)| project_recent_study(study, index))
        .collect();

    DashboardStats {
        total_studies: studies.len(),
        total_patients,
        total_series,
        total_instances,
        studies_by_modality,
        studies_by_date,
        recent_studies,
        hospital_id,
    }
}

/// Stateless per-record transform behind the recent-studies projection.
fn project_recent_study(study: &DicomRecord, index: usize) -> RecentStudy {
    let study_instance_uid = study.str_value(tags::STUDY_INSTANCE_UID);
    let id = if study_instance_uid.is_empty() {
        format!("study_{index}")
    } else {
        study_instance_uid.clone()
    };

    let mut patient_name = study.person_name(tags::PATIENT_NAME);
    if patient_name.is_empty() {
        patient_name = "Unknown".to_string();
    }

    RecentStudy {
        id,
        study_instance_uid,
        patient_name,
        patient_id: study.str_value(tags::PATIENT_ID),
        study_date: format_dicom_date(&study.str_value(tags::STUDY_DATE)),
        modality: study.str_values(tags::MODALITIES_IN_STUDY).join(", "),
        description: study.str_value(tags::STUDY_DESCRIPTION),
        accession_number: study.str_value(tags::ACCESSION_NUMBER),
        number_of_instances: study.count_value(
            "numberOfStudyRelatedInstances",
            tags::NUMBER_OF_STUDY_RELATED_INSTANCES,
        ),
        number_of_series: study.count_value(
            "numberOfStudyRelatedSeries",
            tags::NUMBER_OF_STUDY_RELATED_SERIES,
        ),
    }
}
