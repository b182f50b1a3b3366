//! Plugin C ABI definitions

use semver::Version;
use std::os::raw::c_char;

/// Plugin API version implemented by the host when none is configured
pub const DEFAULT_FRAMEWORK_API_VERSION: Version = Version::new(3, 0, 0);

/// `const char* plugin_get_required_api_version()`
pub const SYM_REQUIRED_API_VERSION: &[u8] = b"plugin_get_required_api_version\0";
/// `const char* plugin_get_name()`
pub const SYM_NAME: &[u8] = b"plugin_get_name\0";
/// `const char* plugin_get_version()`
pub const SYM_VERSION: &[u8] = b"plugin_get_version\0";
/// `const char* plugin_get_description()`
pub const SYM_DESCRIPTION: &[u8] = b"plugin_get_description\0";
/// `const char* plugin_get_contact()`
pub const SYM_CONTACT: &[u8] = b"plugin_get_contact\0";

/// Signature shared by every string getter of the plugin ABI
pub type StringGetter = unsafe extern "C" fn() -> *const c_char;

/// Printable symbol name without the trailing NUL
pub fn symbol_name(symbol: &[u8]) -> &str {
    std::str::from_utf8(symbol.strip_suffix(b"\0").unwrap_or(symbol)).unwrap_or("<invalid>")
}

/// Whether a host implementing `framework` can run a plugin requiring `required`
///
/// Majors must match, and the plugin may not require a newer minor/patch
/// than the host provides. Prerelease and build metadata are ignored.
pub fn is_api_compatible(required: &Version, framework: &Version) -> bool {
    required.major == framework.major
        && (required.minor, required.patch) <= (framework.minor, framework.patch)
}
