pub mod executor;
pub mod history;
pub mod location;
pub mod parser;
pub mod repository;
pub mod status;
pub mod version;

// Re-export commonly used types
pub use executor::{CommandOutput, GitCommand, GitExecutor};
pub use history::CommandHistory;
pub use location::Location;
pub use parser::parse_status_branch_line;
pub use repository::Repository;
pub use status::{BranchState, RelativePosition, StatusResult, TrackInfo};
pub use version::GitVersion;

/// Name of the machine running this process, for commit and history provenance
pub fn host_name() -> String {
    std::env::var("HOSTNAME")
        .ok()
        .or_else(|| std::fs::read_to_string("/etc/hostname").ok())
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}
