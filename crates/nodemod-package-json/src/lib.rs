//! package.json handling for nodemod
//!
//! - [`manifest`] - Reading, editing and writing package.json dependency tables
//! - [`package_manager`] - npm / yarn / pnpm / bun detection and install

pub mod manifest;
pub mod package_manager;

pub use manifest::{find_package_json, DependencySection, PackageJson, PACKAGE_JSON};
pub use package_manager::{detect_for_manifest, detect_package_manager, install, PackageManager};
