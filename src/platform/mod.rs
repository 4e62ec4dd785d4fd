/*
 *  platform/mod.rs
 *
 *  vkdyn - Vulkan dynamic loading shim
 *  (c) 2020-26 Stuart Hunter
 *
 *  Platform library abstraction - the only OS specific piece
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

//! Platform shared library abstraction
//!
//! Everything above this module sees the driver through a [`SymbolSource`]:
//! something that hands back a function address for a registered API name.
//! The OS dynamic linker (and its process wide state) stays behind
//! [`SharedLibrary`]; in-process sources such as [`ExportTable`] let a
//! statically linked or stub driver stand in for it.
//!
//! ## Library Naming
//!
//! Candidate names are tried in order, first successful open wins:
//!
//! - Windows: `vulkan-1.dll`
//! - macOS / iOS: `libvulkan.1.dylib`, `libvulkan.dylib`, `libMoltenVK.dylib`
//! - other unix: `libvulkan.so`, `libvulkan.so.1`

use std::ffi::CStr;

use ash::vk;

pub mod exports;
pub mod library;

pub use exports::ExportTable;
pub use library::SharedLibrary;

/// Raw address type every resolved symbol is stored as
pub type RawProc = unsafe extern "system" fn();

/// A provider of driver entry points, looked up by exact API name
///
/// Implementations must never fail hard: an absent symbol is `None`.
pub trait SymbolSource: Send + Sync {
    /// Address of `name`, or `None` when it is not exported
    fn symbol(&self, name: &CStr) -> vk::PFN_vkVoidFunction;

    /// Human readable name for logs (library file name, "stub", ...)
    fn name(&self) -> &str;
}

/// Platform default driver library names in priority order
pub fn default_library_names() -> Vec<String> {
    let mut names = Vec::new();

    #[cfg(windows)]
    {
        names.push("vulkan-1.dll".to_string());
    }

    #[cfg(any(target_os = "macos", target_os = "ios"))]
    {
        names.push("libvulkan.1.dylib".to_string());
        names.push("libvulkan.dylib".to_string());
        names.push("libMoltenVK.dylib".to_string());
    }

    #[cfg(all(unix, not(any(target_os = "macos", target_os = "ios"))))]
    {
        names.push("libvulkan.so".to_string());
        names.push("libvulkan.so.1".to_string());
    }

    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_library_names() {
        let names = default_library_names();
        assert!(!names.is_empty());

        #[cfg(target_os = "linux")]
        {
            assert_eq!(names, vec!["libvulkan.so".to_string(), "libvulkan.so.1".to_string()]);
        }

        #[cfg(target_os = "windows")]
        {
            assert_eq!(names, vec!["vulkan-1.dll".to_string()]);
        }
    }
}
