pub mod check;
pub mod enrich;
pub mod init;

// Re-export command functions for convenience
pub use check::check;
pub use enrich::{cursor, enrich};
pub use init::init;
