//! Shared library plugin loading

use crate::api::{
    is_api_compatible, symbol_name, StringGetter, DEFAULT_FRAMEWORK_API_VERSION, SYM_CONTACT,
    SYM_DESCRIPTION, SYM_NAME, SYM_REQUIRED_API_VERSION, SYM_VERSION,
};
use crate::{PluginHandle, PluginInfo, PluginLoader};
use libloading::{Library, Symbol};
use semver::Version;
use std::ffi::CStr;
use std::path::Path;
use thiserror::Error;

/// Errors raised while opening a plugin shared object
#[derive(Error, Debug)]
pub enum LoaderError {
    /// The dynamic linker refused the file
    #[error("unable to load library: {0}")]
    Library(#[source] libloading::Error),

    /// A mandatory ABI function is not exported
    #[error("missing symbol {symbol}: {source}")]
    MissingSymbol {
        symbol: &'static str,
        #[source]
        source: libloading::Error,
    },

    /// A getter returned NULL
    #[error("symbol {symbol} returned a null string")]
    NullString { symbol: &'static str },

    /// A getter returned bytes that are not UTF-8
    #[error("symbol {symbol} returned a string that is not valid UTF-8")]
    InvalidString { symbol: &'static str },

    /// The declared required API version is not a semantic version
    #[error("invalid required API version {version:?}: {source}")]
    InvalidApiVersion {
        version: String,
        #[source]
        source: semver::Error,
    },

    /// The plugin needs an API the host does not provide
    #[error(
        "plugin required API version {required} is not compatible with framework API version {framework}"
    )]
    IncompatibleApiVersion { required: String, framework: Version },
}

/// Loads plugins through the platform dynamic linker
#[derive(Debug, Clone)]
pub struct SharedLibraryLoader {
    framework_api_version: Version,
}

impl Default for SharedLibraryLoader {
    fn default() -> Self {
        Self {
            framework_api_version: DEFAULT_FRAMEWORK_API_VERSION,
        }
    }
}

impl SharedLibraryLoader {
    pub fn new(framework_api_version: Version) -> Self {
        Self {
            framework_api_version,
        }
    }

    /// Build a loader from a textual framework API version
    pub fn with_framework_api_version(version: &str) -> Result<Self, semver::Error> {
        Ok(Self::new(Version::parse(version.trim())?))
    }

    pub fn framework_api_version(&self) -> &Version {
        &self.framework_api_version
    }

    /// Reject required API versions the host cannot satisfy
    pub fn check_api_version(&self, required: &str) -> Result<Version, LoaderError> {
        let parsed = Version::parse(required).map_err(|source| LoaderError::InvalidApiVersion {
            version: required.to_string(),
            source,
        })?;

        if !is_api_compatible(&parsed, &self.framework_api_version) {
            return Err(LoaderError::IncompatibleApiVersion {
                required: required.to_string(),
                framework: self.framework_api_version.clone(),
            });
        }

        Ok(parsed)
    }
}

impl PluginLoader for SharedLibraryLoader {
    type Plugin = SharedLibraryPlugin;
    type Error = LoaderError;

    fn open(&self, path: &Path) -> Result<SharedLibraryPlugin, LoaderError> {
        // SAFETY: loading runs the library's initialisers. Plugin artifacts are
        // build outputs of the registry being published, not untrusted input.
        let library = unsafe { Library::new(path) }.map_err(LoaderError::Library)?;

        let required_api_version = read_string(&library, SYM_REQUIRED_API_VERSION)?;
        self.check_api_version(&required_api_version)?;

        let info = PluginInfo {
            name: read_string(&library, SYM_NAME)?,
            version: read_string(&library, SYM_VERSION)?,
            description: read_optional_string(&library, SYM_DESCRIPTION)?,
            contact: read_optional_string(&library, SYM_CONTACT)?,
            required_api_version,
        };

        tracing::debug!(
            "Loaded plugin {} v{} from {:?} (API {})",
            info.name,
            info.version,
            path,
            info.required_api_version
        );

        Ok(SharedLibraryPlugin {
            info,
            _library: library,
        })
    }
}

/// A plugin kept loaded for as long as the handle lives
pub struct SharedLibraryPlugin {
    info: PluginInfo,
    _library: Library,
}

impl PluginHandle for SharedLibraryPlugin {
    fn info(&self) -> &PluginInfo {
        &self.info
    }
}

fn read_string(library: &Library, symbol: &'static [u8]) -> Result<String, LoaderError> {
    // SAFETY: every string getter of the plugin ABI takes no arguments and
    // returns a NUL terminated string owned by the plugin.
    let getter: Symbol<StringGetter> =
        unsafe { library.get(symbol) }.map_err(|source| LoaderError::MissingSymbol {
            symbol: symbol_name(symbol),
            source,
        })?;
    call_getter(*getter, symbol)
}

fn read_optional_string(
    library: &Library,
    symbol: &'static [u8],
) -> Result<Option<String>, LoaderError> {
    // SAFETY: see `read_string`.
    match unsafe { library.get::<StringGetter>(symbol) } {
        Ok(getter) => call_getter(*getter, symbol).map(Some),
        Err(_) => Ok(None),
    }
}

fn call_getter(getter: StringGetter, symbol: &'static [u8]) -> Result<String, LoaderError> {
    let symbol = symbol_name(symbol);
    // SAFETY: the getter follows the plugin ABI; the pointer is checked for NULL
    // and the string is copied before the library can be unloaded.
    let ptr = unsafe { getter() };
    if ptr.is_null() {
        return Err(LoaderError::NullString { symbol });
    }

    let value = unsafe { CStr::from_ptr(ptr) };
    value
        .to_str()
        .map(str::to_owned)
        .map_err(|_| LoaderError::InvalidString { symbol })
}
