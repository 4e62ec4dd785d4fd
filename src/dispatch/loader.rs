/*
 *  dispatch/loader.rs
 *
 *  vkdyn - Vulkan dynamic loading shim
 *  (c) 2020-26 Stuart Hunter
 *
 *  Tier 1 - entry points usable without an instance
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

use ash::vk;
use log::debug;

use super::{cast_proc, populate, GET_INSTANCE_PROC_ADDR};
use crate::error::LoaderError;
use crate::loader::Loader;

dispatch_table! {
    /// Tier 1 dispatch: instance creation and global enumeration
    ///
    /// Built from a [`Loader`]; `get_instance_proc_addr` comes straight from
    /// the driver library and seeds [`InstanceDispatch`](super::InstanceDispatch).
    pub struct LoaderDispatch: Loader {
        /// Bootstrap resolver, looked up in the driver library itself
        pub get_instance_proc_addr: Option<vk::PFN_vkGetInstanceProcAddr>,
    }

    [all()] "VK_VERSION_1_0" {
        create_instance = c"vkCreateInstance",
        enumerate_instance_extension_properties = c"vkEnumerateInstanceExtensionProperties",
        enumerate_instance_layer_properties = c"vkEnumerateInstanceLayerProperties",
    }
    [feature = "vk_1_1"] "VK_VERSION_1_1" {
        enumerate_instance_version = c"vkEnumerateInstanceVersion",
    }
}

impl LoaderDispatch {
    /// Resolve tier 1 from `loader`
    pub fn new(loader: &Loader) -> Result<Self, LoaderError> {
        resolve_loader_dispatch(loader)
    }

    /// Resolve tier 1, discarding the result code
    ///
    /// An all-null table comes back when resolution fails.
    pub fn new_or_default(loader: &Loader) -> Self {
        Self::new(loader).unwrap_or_default()
    }
}

/// Build the loader dispatch table
///
/// Fails with `IncompatibleDriver` only when the library does not export
/// `vkGetInstanceProcAddr`; every other field may be null.
pub fn resolve_loader_dispatch(loader: &Loader) -> Result<LoaderDispatch, LoaderError> {
    let source = loader
        .source()
        .ok_or_else(|| LoaderError::OutOfHostMemory("loader handle is null".to_string()))?;

    // SAFETY: the exported vkGetInstanceProcAddr has exactly this signature
    let bootstrap = unsafe {
        cast_proc::<vk::PFN_vkGetInstanceProcAddr>(source.symbol(GET_INSTANCE_PROC_ADDR))
    }
    .ok_or_else(|| {
        LoaderError::IncompatibleDriver(format!(
            "{} does not export vkGetInstanceProcAddr",
            source.name()
        ))
    })?;

    let mut table = LoaderDispatch {
        get_instance_proc_addr: Some(bootstrap),
        ..Default::default()
    };

    let entries = LoaderDispatch::entries();
    let resolved = populate(&mut table, entries, |name| unsafe {
        bootstrap(vk::Instance::null(), name.as_ptr())
    });

    debug!("{} dispatch ready: {}/{} symbols resolved from {}",
        LoaderDispatch::TIER, resolved, entries.len(), source.name());

    Ok(table)
}
