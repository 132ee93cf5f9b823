pub mod config;
pub mod error;
pub mod git;

// Re-export commonly used types for convenience
pub use config::{Config, ConfigError};
pub use error::{CommandFailure, GitError, GitResult, MergeConflict};
pub use git::{
    BranchState, GitVersion, Location, RelativePosition, Repository, StatusResult, TrackInfo,
};
