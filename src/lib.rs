/*
 *  lib.rs
 *
 *  vkdyn - Vulkan dynamic loading shim
 *  (c) 2020-26 Stuart Hunter
 *
 *  Runtime Vulkan loader shim
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

//! # vkdyn
//!
//! Loads the Vulkan driver library at run time and resolves its entry points
//! into three dispatch tables, so nothing links against the import library.
//!
//! ```ignore
//! let loader = vkdyn::create_loader()?;
//! let loader_dispatch = vkdyn::resolve_loader_dispatch(&loader)?;
//!
//! let create_instance = unsafe {
//!     vkdyn::cast_proc::<vk::PFN_vkCreateInstance>(loader_dispatch.create_instance)
//! }.expect("vkCreateInstance");
//! // ... create `instance` ...
//!
//! let instance_dispatch = vkdyn::resolve_instance_dispatch(instance, &loader_dispatch)?;
//! // ... create `device` ...
//! let device_dispatch = vkdyn::resolve_device_dispatch(device, &instance_dispatch)?;
//! ```
//!
//! Every non-bootstrap field is nullable. A field being compiled in (its
//! version or extension feature is enabled) says nothing about driver
//! support; check for `None` before calling.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod loader;
pub mod platform;

pub use dispatch::{
    cast_proc,
    resolve_device_dispatch,
    resolve_instance_dispatch,
    resolve_loader_dispatch,
    DeviceDispatch,
    InstanceDispatch,
    LoaderDispatch,
    SymbolInfo,
    Tier,
};
pub use error::LoaderError;
pub use loader::{create_loader, destroy_loader, Loader};
pub use platform::{ExportTable, SharedLibrary, SymbolSource};
