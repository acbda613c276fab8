//! Institution directory aggregation.
//!
//! The archive has no first-class facility concept; the closest thing is
//! the InstitutionName tag recorded per imaging record. That tag appears
//! at two granularities with inconsistent presence: most series carry it,
//! but some institutions only ever show up on study records. The
//! aggregator therefore runs a series pass first and a supplemental study
//! pass second, merging both into exact-name buckets.
//!
//! Buckets are rebuilt from scratch on every pass; nothing here persists.

use std::collections::HashSet;

use indexmap::IndexMap;
use pacsgate_core::{DicomRecord, format_dicom_date, tags};
use serde::{Deserialize, Serialize};

/// One directory entry, projected from an aggregation bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Institution {
    /// Positional id, 1-based, assigned by post-aggregation sort order.
    /// Not stable across independent rebuilds; key on `name` for identity.
    pub id: usize,
    pub name: String,
    pub institution_name: String,
    pub address: String,
    pub status: String,
    pub study_count: usize,
    pub patient_count: usize,
    pub modalities: Vec<String>,
    pub departments: Vec<String>,
    pub last_study_date: Option<String>,
}

/// Accumulation state for one institution name.
#[derive(Debug, Default)]
struct InstitutionBucket {
    address: String,
    study_uids: HashSet<String>,
    patient_ids: HashSet<String>,
    modalities: HashSet<String>,
    departments: HashSet<String>,
    dates: Vec<String>,
}

impl InstitutionBucket {
    fn merge_common(&mut self, record: &DicomRecord, date_tag: &str) {
        insert_nonempty(&mut self.study_uids, record.str_value(tags::STUDY_INSTANCE_UID));
        insert_nonempty(&mut self.patient_ids, record.str_value(tags::PATIENT_ID));
        insert_nonempty(&mut self.departments, record.str_value(tags::DEPARTMENT_NAME));

        let date = record.str_value(date_tag);
        if !date.is_empty() {
            self.dates.push(date);
        }
    }
}

fn insert_nonempty(set: &mut HashSet<String>, value: String) {
    if !value.is_empty() {
        set.insert(value);
    }
}

/// The trimmed institution name of a record, or `None` when the field is
/// missing or whitespace-only. Empty keys never produce a bucket.
fn institution_key(record: &DicomRecord) -> Option<String> {
    let name = record.str_value(tags::INSTITUTION_NAME);
    let trimmed = name.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn bucket_for<'a>(
    buckets: &'a mut IndexMap<String, InstitutionBucket>,
    key: String,
    record: &DicomRecord,
) -> &'a mut InstitutionBucket {
    buckets.entry(key).or_insert_with(|| InstitutionBucket {
        // Address is captured at first discovery only.
        address: record.str_value(tags::INSTITUTION_ADDRESS),
        ..InstitutionBucket::default()
    })
}

/// Builds the institution directory from full series and study collections.
///
/// The series pass carries the finer granularity (single Modality tag,
/// SeriesDate); the supplemental study pass recovers institutions that are
/// only indicated on study records and merges the multi-valued
/// ModalitiesInStudy tag element-wise. Set semantics deduplicate study and
/// patient identifiers seen in both passes.
///
/// The result is sorted descending by study count, ties broken by first
/// discovery order, with sequential 1-based ids. Missing or malformed
/// fields degrade to empty values; this function never fails.
pub fn build_institutions(series: &[DicomRecord], studies: &[DicomRecord]) -> Vec<Institution> {
    let mut buckets: IndexMap<String, InstitutionBucket> = IndexMap::new();

    for record in series {
        let Some(key) = institution_key(record) else {
            continue;
        };
        let bucket = bucket_for(&mut buckets, key, record);
        bucket.merge_common(record, tags::SERIES_DATE);
        insert_nonempty(&mut bucket.modalities, record.str_value(tags::MODALITY));
    }

    for record in studies {
        let Some(key) = institution_key(record) else {
            continue;
        };
        let bucket = bucket_for(&mut buckets, key, record);
        bucket.merge_common(record, tags::STUDY_DATE);
        for modality in record.str_values(tags::MODALITIES_IN_STUDY) {
            bucket.modalities.insert(modality);
        }
    }

    let mut ranked: Vec<(String, InstitutionBucket)> = buckets.into_iter().collect();
    // Stable sort keeps first-discovery order among equal study counts.
    ranked.sort_by(|a, b| b.1.study_uids.len().cmp(&a.1.study_uids.len()));

    ranked
        .into_iter()
        .enumerate()
        .map(|(index, (name, bucket))| {
            let mut modalities: Vec<String> = bucket.modalities.into_iter().collect();
            modalities.sort_unstable();
            let mut departments: Vec<String> = bucket.departments.into_iter().collect();
            departments.sort_unstable();

            Institution {
                id: index + 1,
                institution_name: name.clone(),
                name,
                address: bucket.address,
                status: "active".to_string(),
                study_count: bucket.study_uids.len(),
                patient_count: bucket.patient_ids.len(),
                modalities,
                departments,
                // Dates are fixed-width and zero-padded, so the
                // lexicographic max is the latest.
                last_study_date: bucket
                    .dates
                    .iter()
                    .max()
                    .map(|date| format_dicom_date(date)),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_json_diff::assert_json_eq;
    use serde_json::json;

    fn series_record(
        institution: &str,
        study_uid: &str,
        patient_id: &str,
        modality: &str,
        date: &str,
    ) -> DicomRecord {
        DicomRecord::new(json!({
            "00080080": {"vr": "LO", "Value": [institution]},
            "0020000D": {"vr": "UI", "Value": [study_uid]},
            "00100020": {"vr": "LO", "Value": [patient_id]},
            "00080060": {"vr": "CS", "Value": [modality]},
            "00080021": {"vr": "DA", "Value": [date]}
        }))
    }

    fn study_record(
        institution: &str,
        study_uid: &str,
        patient_id: &str,
        modalities: &[&str],
        date: &str,
    ) -> DicomRecord {
        DicomRecord::new(json!({
            "00080080": {"vr": "LO", "Value": [institution]},
            "0020000D": {"vr": "UI", "Value": [study_uid]},
            "00100020": {"vr": "LO", "Value": [patient_id]},
            "00080061": {"vr": "CS", "Value": modalities},
            "00080020": {"vr": "DA", "Value": [date]}
        }))
    }

    #[test]
    fn test_empty_input_yields_empty_directory() {
        assert!(build_institutions(&[], &[]).is_empty());
    }

    #[test]
    fn test_trimmed_names_merge_into_one_bucket() {
        let series = vec![series_record("General ", "1.1", "P1", "CT", "20240101")];
        let studies = vec![study_record("General", "1.2", "P2", &["MR"], "20240102")];

        let institutions = build_institutions(&series, &studies);
        assert_eq!(institutions.len(), 1);
        assert_eq!(institutions[0].name, "General");
        assert_eq!(institutions[0].study_count, 2);
        assert_eq!(institutions[0].patient_count, 2);
        assert_eq!(institutions[0].modalities, vec!["CT", "MR"]);
    }

    #[test]
    fn test_whitespace_only_names_are_skipped() {
        let series = vec![
            series_record("  ", "1.1", "P1", "CT", "20240101"),
            series_record("", "1.2", "P2", "MR", "20240101"),
        ];
        let studies = vec![study_record("   ", "1.3", "P3", &["US"], "20240101")];

        assert!(build_institutions(&series, &studies).is_empty());
    }

    #[test]
    fn test_same_study_in_both_passes_counts_once() {
        let series = vec![series_record("Ward", "1.1", "P1", "CT", "20240101")];
        let studies = vec![study_record("Ward", "1.1", "P1", &["CT"], "20240101")];

        let institutions = build_institutions(&series, &studies);
        assert_eq!(institutions[0].study_count, 1);
        assert_eq!(institutions[0].patient_count, 1);
    }

    #[test]
    fn test_study_pass_recovers_missing_institutions() {
        // No series carries this institution; only the coarser record does.
        let series = vec![series_record("Alpha", "1.1", "P1", "CT", "20240101")];
        let studies = vec![study_record("Beta", "2.1", "P9", &["MR", "SR"], "20240103")];

        let institutions = build_institutions(&series, &studies);
        assert_eq!(institutions.len(), 2);
        let beta = institutions.iter().find(|i| i.name == "Beta").unwrap();
        assert_eq!(beta.modalities, vec!["MR", "SR"]);
        assert_eq!(beta.last_study_date.as_deref(), Some("2024-01-03"));
    }

    #[test]
    fn test_sorted_by_study_count_with_stable_ties() {
        let series = vec![
            series_record("Small", "1.1", "P1", "CT", "20240101"),
            series_record("Big", "2.1", "P2", "CT", "20240101"),
            series_record("Big", "2.2", "P2", "CT", "20240102"),
            // Same study count as Small, discovered later.
            series_record("AlsoSmall", "3.1", "P3", "MR", "20240101"),
        ];

        let institutions = build_institutions(&series, &[]);
        let names: Vec<&str> = institutions.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Big", "Small", "AlsoSmall"]);
        let ids: Vec<usize> = institutions.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_last_study_date_is_max_reformatted() {
        let series = vec![
            series_record("General", "1.1", "P1", "CT", "20231231"),
            series_record("General", "1.2", "P1", "CT", "20240215"),
            series_record("General", "1.3", "P1", "CT", "20240101"),
        ];

        let institutions = build_institutions(&series, &[]);
        assert_eq!(
            institutions[0].last_study_date.as_deref(),
            Some("2024-02-15")
        );
    }

    #[test]
    fn test_no_dates_yields_no_last_study_date() {
        let record = DicomRecord::new(json!({
            "00080080": {"vr": "LO", "Value": ["Dateless"]},
            "0020000D": {"vr": "UI", "Value": ["1.1"]}
        }));

        let institutions = build_institutions(&[record], &[]);
        assert_eq!(institutions[0].last_study_date, None);
        assert_eq!(institutions[0].study_count, 1);
        // Missing fields degrade to empty, never abort the pass.
        assert_eq!(institutions[0].patient_count, 0);
        assert!(institutions[0].modalities.is_empty());
    }

    #[test]
    fn test_address_captured_at_first_discovery() {
        let first = DicomRecord::new(json!({
            "00080080": {"vr": "LO", "Value": ["General"]},
            "00080081": {"vr": "ST", "Value": ["1 Main St"]},
            "0020000D": {"vr": "UI", "Value": ["1.1"]}
        }));
        let second = DicomRecord::new(json!({
            "00080080": {"vr": "LO", "Value": ["General"]},
            "00080081": {"vr": "ST", "Value": ["2 Other Rd"]},
            "0020000D": {"vr": "UI", "Value": ["1.2"]}
        }));

        let institutions = build_institutions(&[first, second], &[]);
        assert_eq!(institutions[0].address, "1 Main St");
    }

    #[test]
    fn test_projection_json_contract() {
        let series = vec![series_record("General", "1.1", "P1", "CT", "20240115")];
        let institutions = build_institutions(&series, &[]);

        assert_json_eq!(
            serde_json::to_value(&institutions[0]).unwrap(),
            json!({
                "id": 1,
                "name": "General",
                "institutionName": "General",
                "address": "",
                "status": "active",
                "studyCount": 1,
                "patientCount": 1,
                "modalities": ["CT"],
                "departments": [],
                "lastStudyDate": "2024-01-15"
            })
        );
    }
}
