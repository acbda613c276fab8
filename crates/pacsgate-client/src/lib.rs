pub mod archive;
pub mod config;
pub mod token;

pub use archive::ArchiveClient;
pub use config::{ArchiveSettings, AuthSettings, DirectorySettings, GatewayConfig};
pub use token::TokenService;
