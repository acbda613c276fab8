pub mod cache;
pub mod date;
pub mod error;
pub mod record;
pub mod tags;

pub use cache::TtlCell;
pub use date::format_dicom_date;
pub use error::{GatewayError, Result};
pub use record::DicomRecord;
