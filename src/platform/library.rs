/*
 *  platform/library.rs
 *
 *  vkdyn - Vulkan dynamic loading shim
 *  (c) 2020-26 Stuart Hunter
 *
 *  OS shared library handle (dlopen / LoadLibrary via libloading)
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use std::ffi::{c_void, CStr, OsStr};
use std::mem;

use ash::vk;
use libloading::Library;
use log::{debug, info, warn};

use super::{RawProc, SymbolSource};
use crate::error::LoaderError;

/// One open dynamic library
///
/// Owns the OS handle from a successful [`SharedLibrary::load`] until
/// [`SharedLibrary::close`] or drop. Closing twice is a no-op.
pub struct SharedLibrary {
    /// The loaded shared library, `None` once closed
    library: Option<Library>,

    /// Name the library was opened with
    name: String,
}

impl SharedLibrary {
    /// Open the first loadable name from `candidates`
    ///
    /// Names are handed to the platform loader unchanged, so bare names use
    /// the system search path and anything with a separator is a path.
    pub fn load<S: AsRef<OsStr>>(candidates: &[S]) -> Result<Self, LoaderError> {
        let mut failures = Vec::new();

        for candidate in candidates {
            let name = candidate.as_ref().to_string_lossy().into_owned();
            debug!("Trying driver library: {}", name);

            // Opening a library runs its initialisers; the candidates are
            // driver libraries the caller asked for.
            match unsafe { Library::new(candidate.as_ref()) } {
                Ok(library) => {
                    info!("Opened driver library: {}", name);
                    return Ok(Self {
                        library: Some(library),
                        name,
                    });
                }
                Err(e) => {
                    debug!("Could not open {}: {}", name, e);
                    failures.push(format!("{}: {}", name, e));
                }
            }
        }

        if failures.is_empty() {
            return Err(LoaderError::IncompatibleDriver(
                "no candidate driver library names".to_string(),
            ));
        }

        Err(LoaderError::IncompatibleDriver(format!(
            "no driver library could be opened ({})",
            failures.join("; ")
        )))
    }

    /// Release the OS handle. Safe to call on a closed library.
    pub fn close(&mut self) {
        let Some(library) = self.library.take() else {
            return;
        };

        match library.close() {
            Ok(()) => info!("Closed driver library: {}", self.name),
            Err(e) => warn!("Closing driver library {} failed: {}", self.name, e),
        }
    }

    pub fn is_open(&self) -> bool {
        self.library.is_some()
    }
}

impl SymbolSource for SharedLibrary {
    fn symbol(&self, name: &CStr) -> vk::PFN_vkVoidFunction {
        let library = self.library.as_ref()?;

        // Fetched as a data pointer so a null export never becomes a fn pointer
        let address = unsafe { library.get::<*mut c_void>(name.to_bytes_with_nul()) }
            .ok()
            .map(|symbol| *symbol)
            .filter(|address| !address.is_null())?;

        Some(unsafe { mem::transmute::<*mut c_void, RawProc>(address) })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for SharedLibrary {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for SharedLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedLibrary")
            .field("name", &self.name)
            .field("open", &self.is_open())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_library_is_incompatible_driver() {
        let err = SharedLibrary::load(&["libvkdyn-does-not-exist.so", "vkdyn-missing-2.dll"])
            .unwrap_err();

        assert!(err.is_incompatible_driver());
        assert!(err.to_string().contains("libvkdyn-does-not-exist.so"));
        assert!(err.to_string().contains("vkdyn-missing-2.dll"));
    }

    #[test]
    fn test_empty_candidate_list() {
        let candidates: [&str; 0] = [];
        let err = SharedLibrary::load(&candidates).unwrap_err();
        assert!(err.is_incompatible_driver());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_first_loadable_candidate_wins() {
        let mut library = SharedLibrary::load(&["libvkdyn-does-not-exist.so", "libc.so.6"])
            .expect("libc should always be loadable");

        assert_eq!(library.name(), "libc.so.6");
        assert!(library.is_open());

        // libc is not a Vulkan driver but does export malloc
        assert!(library.symbol(c"malloc").is_some());
        assert!(library.symbol(c"vkGetInstanceProcAddr").is_none());

        library.close();
        assert!(!library.is_open());
        assert!(library.symbol(c"malloc").is_none());

        // second close is a no-op
        library.close();
    }
}
