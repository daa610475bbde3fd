#![deny(unreachable_patterns)]
//! Stage worker contracts shared by the three stage binaries (`src/bin/`):
//! the Download Worker (§4.3), Analysis Worker (§4.4) and Extraction Worker
//! (§4.5). Each binary owns its own run loop; this crate holds what they
//! share: config, error taxonomy, logging, retry, temp-directory handling,
//! Clip metadata generation, and the shutdown signal.

pub mod clip_meta;
pub mod config;
pub mod error;
pub mod logging;
pub mod retry;
pub mod shutdown;
pub mod tempdir;

pub use error::{WorkerError, WorkerResult};
pub use logging::JobLogger;
pub use shutdown::Shutdown;
