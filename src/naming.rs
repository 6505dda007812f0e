//! Binary name derivation from archive paths.
//!
//! Release archives follow a fixed naming convention shared with the release
//! tooling that produced them: `<binaryName>_<platform-qualifier...>.tar.gz`,
//! e.g. `service_Linux_x86_64.tar.gz` installs a binary named `service`. The
//! derivation is exact: strip the `.tar.gz` suffix, take everything before the
//! first underscore. Archives that do not yield a non-empty name are rejected;
//! there is no fallback heuristic.

use std::path::Path;

use crate::core::InstallError;

/// The archive suffix the naming convention is defined over
pub const ARCHIVE_SUFFIX: &str = ".tar.gz";

/// Derive the binary name from an archive path.
///
/// Returns [`InstallError::InvalidArchiveName`] when nothing precedes the
/// first underscore (`_foo.tar.gz`) or the name is empty (`.tar.gz`).
///
/// # Examples
///
/// ```
/// use bindrop::naming::derive_binary_name;
///
/// let name = derive_binary_name("/tmp/service_Linux_x86_64.tar.gz").unwrap();
/// assert_eq!(name, "service");
/// ```
pub fn derive_binary_name(upload_path: &str) -> Result<String, InstallError> {
    let file_name = Path::new(upload_path)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default();
    let stem = file_name.strip_suffix(ARCHIVE_SUFFIX).unwrap_or(file_name);
    let name = stem.split('_').next().unwrap_or_default();

    if name.is_empty() {
        return Err(InstallError::InvalidArchiveName {
            path: upload_path.to_string(),
        });
    }

    Ok(name.to_string())
}
