//! Minimal plugin exporting the C ABI string getters.
//!
//! Built as a cdylib by the shared library tests; `--cfg` flags select
//! variants:
//! - `api_3_5`: requires API 3.5.0 instead of 3.0.0
//! - `minimal`: no description or contact getters
//! - `null_name`: `plugin_get_name` returns NULL
//! - `no_version`: `plugin_get_version` is not exported

use std::os::raw::c_char;
use std::ptr;

#[cfg(not(api_3_5))]
const REQUIRED_API_VERSION: &[u8] = b"3.0.0\0";
#[cfg(api_3_5)]
const REQUIRED_API_VERSION: &[u8] = b"3.5.0\0";

#[no_mangle]
pub extern "C" fn plugin_get_required_api_version() -> *const c_char {
    REQUIRED_API_VERSION.as_ptr().cast()
}

#[no_mangle]
pub extern "C" fn plugin_get_name() -> *const c_char {
    if cfg!(null_name) {
        ptr::null()
    } else {
        b"fixture\0".as_ptr().cast()
    }
}

#[cfg(not(no_version))]
#[no_mangle]
pub extern "C" fn plugin_get_version() -> *const c_char {
    b"0.2.1\0".as_ptr().cast()
}

#[cfg(not(minimal))]
#[no_mangle]
pub extern "C" fn plugin_get_description() -> *const c_char {
    b"Fixture plugin\0".as_ptr().cast()
}

#[cfg(not(minimal))]
#[no_mangle]
pub extern "C" fn plugin_get_contact() -> *const c_char {
    b"maintainers@example.com\0".as_ptr().cast()
}
