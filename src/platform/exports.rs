/*
 *  platform/exports.rs
 *
 *  vkdyn - Vulkan dynamic loading shim
 *  (c) 2020-26 Stuart Hunter
 *
 *  In-process symbol source for statically linked or stub drivers
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

use std::ffi::CStr;

use ash::vk;

use super::{RawProc, SymbolSource};

/// A fixed set of exports living in the current process
///
/// Stands in for a shared library when the driver entry points are linked
/// in directly, e.g. a software rasteriser or a test stub.
#[derive(Debug, Clone, Default)]
pub struct ExportTable {
    name: String,
    exports: Vec<(&'static CStr, RawProc)>,
}

impl ExportTable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            exports: Vec::new(),
        }
    }

    /// Add (or replace) an export
    pub fn with(mut self, name: &'static CStr, address: RawProc) -> Self {
        self.exports.retain(|(existing, _)| *existing != name);
        self.exports.push((name, address));
        self
    }

    /// Export `vkGetInstanceProcAddr`
    pub fn with_instance_proc_addr(self, address: vk::PFN_vkGetInstanceProcAddr) -> Self {
        // SAFETY: both are plain code addresses of the same size; the caller
        // casts back to the real signature before calling.
        let raw = unsafe { std::mem::transmute::<vk::PFN_vkGetInstanceProcAddr, RawProc>(address) };
        self.with(c"vkGetInstanceProcAddr", raw)
    }

    pub fn len(&self) -> usize {
        self.exports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exports.is_empty()
    }
}

impl SymbolSource for ExportTable {
    fn symbol(&self, name: &CStr) -> vk::PFN_vkVoidFunction {
        self.exports
            .iter()
            .find(|(export, _)| *export == name)
            .map(|(_, address)| *address)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    unsafe extern "system" fn noop() {}
    unsafe extern "system" fn other() {}

    #[test]
    fn test_lookup_by_exact_name() {
        let exports = ExportTable::new("stub")
            .with(c"vkCreateInstance", noop);

        assert_eq!(exports.name(), "stub");
        assert!(exports.symbol(c"vkCreateInstance").is_some());
        assert!(exports.symbol(c"vkCreateInstanceKHR").is_none());
        assert!(exports.symbol(c"CreateInstance").is_none());
    }

    #[test]
    fn test_with_replaces_existing_export() {
        let exports = ExportTable::new("stub")
            .with(c"vkCreateInstance", noop)
            .with(c"vkCreateInstance", other);

        assert_eq!(exports.len(), 1);
        let address = exports.symbol(c"vkCreateInstance").map(|f| f as usize);
        assert_eq!(address, Some(other as RawProc as usize));
    }
}
