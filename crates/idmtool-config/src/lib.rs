#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Local configuration for idmtool: target URL resolution and the jolokia
//! credential file.
//!
//! Layout: `properties.rs` (`key=value` file parsing), `target.rs` (base URL
//! resolution from overrides or the pax-web config), `jolokia.rs` (auth-mode
//! detection and password rewrite), `error.rs` (`ConfigError`).

pub mod error;
pub mod jolokia;
pub mod properties;
pub mod target;

pub use error::{ConfigError, ConfigResult};
pub use jolokia::{AuthModeFile, JOLOKIA_CFG_FILENAME};
pub use properties::{Properties, load_properties, parse_properties};
pub use target::{PAX_WEB_CFG_FILENAME, Target, default_etc_dir, default_target};
