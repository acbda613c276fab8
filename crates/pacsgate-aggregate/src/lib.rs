pub mod dashboard;
pub mod directory;
pub mod institutions;
pub mod service;

pub use dashboard::{DashboardStats, DateCount, ModalityCount, RecentStudy, aggregate_stats};
pub use directory::DirectoryService;
pub use institutions::{Institution, build_institutions};
pub use service::DashboardService;
