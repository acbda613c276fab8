//! Opaque accessor over heterogeneously-shaped archive records.
//!
//! The archive returns DICOM JSON: a mapping of 8-character tag strings to
//! `{"vr": ..., "Value": [...]}` entries, with optional vendor extras as
//! plain top-level fields. The shapes vary between archives and even
//! between records, so no attempt is made to type the full schema; a
//! [`DicomRecord`] wraps the raw value and offers total, never-failing
//! lookups that degrade to empty or zero defaults.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single series or study entry as returned by the archive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DicomRecord(Value);

impl DicomRecord {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn inner(&self) -> &Value {
        &self.0
    }

    pub fn into_inner(self) -> Value {
        self.0
    }

    /// The `Value` array of a tag entry, if present.
    fn tag_values(&self, tag: &str) -> Option<&Vec<Value>> {
        self.0.get(tag)?.get("Value")?.as_array()
    }

    /// First element of a tag's `Value` array, if any.
    pub fn first_value(&self, tag: &str) -> Option<&Value> {
        self.tag_values(tag)?.first()
    }

    /// First value at a tag as a string, or `""` when the tag is missing,
    /// empty or not string-like.
    pub fn str_value(&self, tag: &str) -> String {
        self.first_value(tag).map(value_to_string).unwrap_or_default()
    }

    /// All values at a tag as strings, skipping nulls and empties.
    ///
    /// Used for multi-valued tags such as ModalitiesInStudy.
    pub fn str_values(&self, tag: &str) -> Vec<String> {
        self.tag_values(tag)
            .map(|values| {
                values
                    .iter()
                    .map(value_to_string)
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Tolerantly coerces a declared count to an integer.
    ///
    /// An explicit top-level field (e.g. `numberOfStudyRelatedSeries`) is
    /// preferred over the declarative tag lookup; whichever candidate is
    /// first non-empty and non-zero wins. Missing or non-numeric values
    /// contribute 0, never an error.
    pub fn count_value(&self, field: &str, tag: &str) -> u64 {
        let candidates = [self.0.get(field), self.first_value(tag)];
        for value in candidates.into_iter().flatten() {
            match value {
                Value::Number(n) => {
                    if let Some(i) = n.as_u64() {
                        if i != 0 {
                            return i;
                        }
                    } else if let Some(f) = n.as_f64()
                        && f > 0.0
                    {
                        return f as u64;
                    }
                }
                Value::String(s) => {
                    let trimmed = s.trim();
                    if !trimmed.is_empty() {
                        return trimmed.parse::<u64>().unwrap_or(0);
                    }
                }
                _ => {}
            }
        }
        0
    }

    /// Display form of a person-name tag.
    ///
    /// DICOM person names carry an `Alphabetic` representation with
    /// caret-delimited components (`Family^Given^...`). When at least two
    /// components exist the first two are re-ordered as "given family";
    /// otherwise the raw representation is used. Returns `""` when the tag
    /// is absent; callers supply their own placeholder.
    pub fn person_name(&self, tag: &str) -> String {
        match self.first_value(tag) {
            Some(Value::Object(map)) => {
                let alphabetic = map
                    .get("Alphabetic")
                    .and_then(Value::as_str)
                    .unwrap_or_default();
                let parts: Vec<&str> = alphabetic.split('^').collect();
                if parts.len() > 1 {
                    format!("{} {}", parts[1], parts[0])
                } else {
                    alphabetic.to_string()
                }
            }
            Some(other) => value_to_string(other),
            None => String::new(),
        }
    }
}

impl From<Value> for DicomRecord {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tags;
    use serde_json::json;

    fn study_record() -> DicomRecord {
        DicomRecord::new(json!({
            "0020000D": {"vr": "UI", "Value": ["1.2.840.1"]},
            "00080020": {"vr": "DA", "Value": ["20240115"]},
            "00080061": {"vr": "CS", "Value": ["CT", "SR", ""]},
            "00100010": {"vr": "PN", "Value": [{"Alphabetic": "Doe^Jane"}]},
            "00201206": {"vr": "IS", "Value": ["4"]},
            "numberOfStudyRelatedInstances": 120
        }))
    }

    #[test]
    fn test_str_value() {
        let record = study_record();
        assert_eq!(record.str_value(tags::STUDY_INSTANCE_UID), "1.2.840.1");
        assert_eq!(record.str_value(tags::STUDY_DATE), "20240115");
    }

    #[test]
    fn test_str_value_missing_tag_is_empty() {
        let record = study_record();
        assert_eq!(record.str_value(tags::ACCESSION_NUMBER), "");
        assert_eq!(record.str_value("00000000"), "");
    }

    #[test]
    fn test_str_value_malformed_entry_is_empty() {
        let record = DicomRecord::new(json!({
            "00080020": "not a tag entry",
            "00080050": {"vr": "SH"},
            "00081030": {"vr": "LO", "Value": []}
        }));
        assert_eq!(record.str_value(tags::STUDY_DATE), "");
        assert_eq!(record.str_value(tags::ACCESSION_NUMBER), "");
        assert_eq!(record.str_value(tags::STUDY_DESCRIPTION), "");
    }

    #[test]
    fn test_str_values_skips_empty_entries() {
        let record = study_record();
        assert_eq!(record.str_values(tags::MODALITIES_IN_STUDY), vec!["CT", "SR"]);
        assert!(record.str_values(tags::MODALITY).is_empty());
    }

    #[test]
    fn test_count_value_prefers_top_level_field() {
        let record = study_record();
        assert_eq!(
            record.count_value(
                "numberOfStudyRelatedInstances",
                tags::NUMBER_OF_STUDY_RELATED_INSTANCES
            ),
            120
        );
    }

    #[test]
    fn test_count_value_falls_back_to_tag() {
        let record = study_record();
        assert_eq!(
            record.count_value(
                "numberOfStudyRelatedSeries",
                tags::NUMBER_OF_STUDY_RELATED_SERIES
            ),
            4
        );
    }

    #[test]
    fn test_count_value_tolerates_garbage() {
        let record = DicomRecord::new(json!({
            "numberOfStudyRelatedSeries": "not a number",
            "00201208": {"vr": "IS", "Value": [null]}
        }));
        assert_eq!(
            record.count_value(
                "numberOfStudyRelatedSeries",
                tags::NUMBER_OF_STUDY_RELATED_SERIES
            ),
            0
        );
        assert_eq!(
            record.count_value(
                "numberOfStudyRelatedInstances",
                tags::NUMBER_OF_STUDY_RELATED_INSTANCES
            ),
            0
        );
    }

    #[test]
    fn test_count_value_skips_zero_top_level() {
        // A zero top-level field falls through to the tag value.
        let record = DicomRecord::new(json!({
            "numberOfStudyRelatedSeries": 0,
            "00201206": {"vr": "IS", "Value": ["7"]}
        }));
        assert_eq!(
            record.count_value(
                "numberOfStudyRelatedSeries",
                tags::NUMBER_OF_STUDY_RELATED_SERIES
            ),
            7
        );
    }

    #[test]
    fn test_person_name_reorders_components() {
        let record = study_record();
        assert_eq!(record.person_name(tags::PATIENT_NAME), "Jane Doe");
    }

    #[test]
    fn test_person_name_single_component() {
        let record = DicomRecord::new(json!({
            "00100010": {"vr": "PN", "Value": [{"Alphabetic": "Mononym"}]}
        }));
        assert_eq!(record.person_name(tags::PATIENT_NAME), "Mononym");
    }

    #[test]
    fn test_person_name_plain_string() {
        let record = DicomRecord::new(json!({
            "00100010": {"vr": "PN", "Value": ["Smith, John"]}
        }));
        assert_eq!(record.person_name(tags::PATIENT_NAME), "Smith, John");
    }

    #[test]
    fn test_person_name_absent() {
        let record = DicomRecord::new(json!({}));
        assert_eq!(record.person_name(tags::PATIENT_NAME), "");
    }

    #[test]
    fn test_serde_transparent_roundtrip() {
        let raw = json!({
            "0020000D": {"vr": "UI", "Value": ["1.2.3"]}
        });
        let record: DicomRecord = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(serde_json::to_value(&record).unwrap(), raw);
    }
}
