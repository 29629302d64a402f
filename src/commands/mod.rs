//! CLI commands implementation

pub mod extract;
pub mod init;
pub mod migrate;
pub mod query;
pub mod status;

pub use extract::*;
pub use init::*;
pub use migrate::*;
pub use query::*;
pub use status::*;
