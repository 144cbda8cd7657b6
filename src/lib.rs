//! Pre-build hook library for multi-target firmware projects
//!
//! Two steps run once per build, before compilation:
//! - [`resolver`] picks the source directory for the active build environment
//! - [`version_header`] stamps the firmware version and build time into
//!   `include/version.h`, rewriting it only when the content changes
//!
//! [`hook`] ties both together for callers that want the full sequence.

pub mod cli;
pub mod color;
pub mod commands;
pub mod definitions;
pub mod environment;
pub mod hook;
pub mod project;
pub mod resolver;
pub mod version_header;
