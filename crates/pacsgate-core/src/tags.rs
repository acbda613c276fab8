//! DICOM tag paths used by the aggregation layer.
//!
//! Records coming back from the archive are keyed by 8-character tag
//! strings in DICOM JSON form. Only the handful of tags the directory and
//! dashboard care about are named here; everything else in a record is
//! carried opaquely.

/// InstitutionName (0008,0080) — the grouping key for the directory.
pub const INSTITUTION_NAME: &str = "00080080";

/// InstitutionAddress (0008,0081)
pub const INSTITUTION_ADDRESS: &str = "00080081";

/// InstitutionalDepartmentName (0008,1040)
pub const DEPARTMENT_NAME: &str = "00081040";

/// Modality (0008,0060) — single code, series granularity.
pub const MODALITY: &str = "00080060";

/// ModalitiesInStudy (0008,0061) — zero or more codes, study granularity.
pub const MODALITIES_IN_STUDY: &str = "00080061";

/// StudyInstanceUID (0020,000D)
pub const STUDY_INSTANCE_UID: &str = "0020000D";

/// PatientID (0010,0020)
pub const PATIENT_ID: &str = "00100020";

/// PatientName (0010,0010) — person-name value, may carry an `Alphabetic`
/// caret-delimited representation.
pub const PATIENT_NAME: &str = "00100010";

/// StudyDate (0008,0020)
pub const STUDY_DATE: &str = "00080020";

/// SeriesDate (0008,0021)
pub const SERIES_DATE: &str = "00080021";

/// SeriesTime (0008,0031)
pub const SERIES_TIME: &str = "00080031";

/// StudyDescription (0008,1030)
pub const STUDY_DESCRIPTION: &str = "00081030";

/// AccessionNumber (0008,0050)
pub const ACCESSION_NUMBER: &str = "00080050";

/// NumberOfStudyRelatedSeries (0020,1206)
pub const NUMBER_OF_STUDY_RELATED_SERIES: &str = "00201206";

/// NumberOfStudyRelatedInstances (0020,1208)
pub const NUMBER_OF_STUDY_RELATED_INSTANCES: &str = "00201208";
