/*
 *  loader.rs
 *
 *  vkdyn - Vulkan dynamic loading shim
 *  (c) 2020-26 Stuart Hunter
 *
 *  Owning handle over the driver shared library
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

//! The loader handle
//!
//! A [`Loader`] owns exactly one open driver library. It is move-only:
//! there is no `Clone`, so the library can never be closed twice.
//!
//! State machine: null -> [`Loader::create`] -> loaded -> [`Loader::destroy`]
//! (or drop) -> null. A destroyed loader is never reopened; create a new one.

use std::ffi::OsStr;
use std::mem;

use log::{debug, info};

use crate::config::LoaderConfig;
use crate::error::LoaderError;
use crate::platform::{SharedLibrary, SymbolSource};

/// Exclusive owner of the driver library
#[derive(Default)]
pub struct Loader {
    /// Open driver library, `None` for a null (moved-from or destroyed) loader
    source: Option<Box<dyn SymbolSource>>,
}

impl Loader {
    /// Open the platform driver library
    ///
    /// Tries `$VKDYN_LIBRARY` first, then the platform default names.
    pub fn create() -> Result<Self, LoaderError> {
        Self::with_config(&LoaderConfig::from_env())
    }

    /// Open the first loadable candidate described by `config`
    pub fn with_config(config: &LoaderConfig) -> Result<Self, LoaderError> {
        let candidates = config.candidates();
        debug!("Driver library candidates: {:?}", candidates);
        Self::open(&candidates)
    }

    /// Open the first loadable name from an explicit candidate list
    pub fn open<S: AsRef<OsStr>>(candidates: &[S]) -> Result<Self, LoaderError> {
        SharedLibrary::load(candidates).map(Self::from_source)
    }

    /// Wrap an already available symbol source (static driver, stub, ...)
    pub fn from_source<S: SymbolSource + 'static>(source: S) -> Self {
        Self {
            source: Some(Box::new(source)),
        }
    }

    /// A loader that owns nothing
    pub fn null() -> Self {
        Self::default()
    }

    pub fn is_loaded(&self) -> bool {
        self.source.is_some()
    }

    /// Name of the open driver library
    pub fn name(&self) -> Option<&str> {
        self.source.as_deref().map(|source| source.name())
    }

    /// The symbol source behind this loader, `None` when null
    pub fn source(&self) -> Option<&dyn SymbolSource> {
        self.source.as_deref()
    }

    /// Close the driver library. Safe on a null loader.
    pub fn destroy(&mut self) {
        if let Some(source) = self.source.take() {
            info!("Destroying loader for {}", source.name());
            drop(source);
        }
    }

    /// Move ownership out, leaving a null loader behind
    pub fn take(&mut self) -> Self {
        mem::take(self)
    }
}

impl Drop for Loader {
    fn drop(&mut self) {
        self.destroy();
    }
}

impl std::fmt::Debug for Loader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Loader")
            .field("library", &self.name())
            .finish()
    }
}

/// Open the platform driver library (flat form of [`Loader::create`])
pub fn create_loader() -> Result<Loader, LoaderError> {
    Loader::create()
}

/// Close the driver library owned by `loader`
pub fn destroy_loader(mut loader: Loader) {
    loader.destroy();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::ExportTable;

    #[test]
    fn test_null_loader() {
        let mut loader = Loader::null();
        assert!(!loader.is_loaded());
        assert!(loader.name().is_none());
        assert!(loader.source().is_none());

        // destroying a null loader is a no-op, twice over
        loader.destroy();
        loader.destroy();
        assert!(!loader.is_loaded());
    }

    #[test]
    fn test_take_leaves_source_null() {
        let mut source = Loader::from_source(ExportTable::new("stub"));
        let destination = source.take();

        assert!(!source.is_loaded());
        assert!(destination.is_loaded());
        assert_eq!(destination.name(), Some("stub"));
    }

    #[test]
    fn test_assignment_replaces_previous_library() {
        let mut loader = Loader::from_source(ExportTable::new("first"));
        assert_eq!(loader.name(), Some("first"));
        loader = Loader::from_source(ExportTable::new("second"));
        assert_eq!(loader.name(), Some("second"));
    }

    #[test]
    fn test_open_missing_library() {
        let err = Loader::open(&["libvkdyn-does-not-exist.so.9"]).unwrap_err();
        assert!(err.is_incompatible_driver());
    }
}
