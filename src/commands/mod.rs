//! Operations behind the command-line surface.
//!
//! Sub-modules are grouped by concern:
//! - [`file`]: load a project from the service or a local document
//! - [`project`]: show, browse, list and remove stored projects
//! - [`credentials`]: decode and encode obfuscated passwords
//!
//! Every operation is an `_inner` function taking its collaborators
//! explicitly, so it is testable without the binary.

pub mod credentials;
pub mod file;
pub mod project;
