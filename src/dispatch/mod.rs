/*
 *  dispatch/mod.rs
 *
 *  vkdyn - Vulkan dynamic loading shim
 *  (c) 2020-26 Stuart Hunter
 *
 *  Dispatch table declaration macro and the symbol resolution engine
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

//! Three-tier dispatch tables
//!
//! Vulkan entry points are resolved in three stages, each seeded by the one
//! before it:
//!
//! 1. **Loader** ([`LoaderDispatch`]) - `vkGetInstanceProcAddr` straight from
//!    the driver library, then the calls usable without an instance
//! 2. **Instance** ([`InstanceDispatch`]) - the tier 1 resolver scoped to a
//!    `VkInstance`, plus `vkGetDeviceProcAddr` to seed tier 3
//! 3. **Device** ([`DeviceDispatch`]) - `vkGetDeviceProcAddr` scoped to a
//!    `VkDevice`
//!
//! Each table is declared once with `dispatch_table!`: a list of symbol
//! groups, every group carrying the `cfg` predicate that gates it (API
//! version or extension feature). The macro emits the struct and a catalog
//! of [`SymbolInfo`] entries with field accessors, so one loop
//! ([`populate`]) resolves every table. Only a tier's bootstrap resolver is
//! load bearing; any other symbol may come back null and the table is still
//! valid.

use std::ffi::CStr;
use std::fmt;
use std::mem;

use ash::vk;

use crate::platform::RawProc;

/// Declares a dispatch table and its symbol catalog.
///
/// Bootstrap fields are typed and filled by the tier's resolve function;
/// every group field is an untyped nullable `PFN_vkVoidFunction`.
macro_rules! dispatch_table {
    (
        $(#[$meta:meta])*
        pub struct $table:ident : $tier:ident {
            $(
                $(#[$boot_meta:meta])*
                pub $boot:ident: $boot_ty:ty,
            )+
        }

        $(
            [$gate:meta] $group:literal {
                $( $field:ident = $name:literal, )*
            }
        )*
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Default)]
        pub struct $table {
            $(
                $(#[$boot_meta])*
                pub $boot: $boot_ty,
            )+
            $($(
                #[cfg($gate)]
                pub $field: ::ash::vk::PFN_vkVoidFunction,
            )*)*
        }

        impl $table {
            /// Resolution tier of this table
            pub const TIER: $crate::dispatch::Tier = $crate::dispatch::Tier::$tier;

            /// Compiled-in symbols, in resolution order
            pub fn symbols() -> Vec<$crate::dispatch::SymbolInfo> {
                Self::entries().iter().map(|entry| entry.info).collect()
            }

            /// Catalog with field accessors, built on first use
            pub(crate) fn entries() -> &'static [$crate::dispatch::Entry<Self>] {
                static ENTRIES: ::std::sync::LazyLock<Vec<$crate::dispatch::Entry<$table>>> =
                    ::std::sync::LazyLock::new($table::catalog);
                &ENTRIES
            }

            fn catalog() -> Vec<$crate::dispatch::Entry<Self>> {
                #[allow(unused_mut)]
                let mut entries = Vec::new();
                $($(
                    #[cfg($gate)]
                    entries.push($crate::dispatch::Entry::<Self> {
                        info: $crate::dispatch::SymbolInfo {
                            name: $name,
                            field: stringify!($field),
                            group: $group,
                        },
                        slot: |table| &mut table.$field,
                        read: |table| table.$field,
                    });
                )*)*
                entries
            }

            /// Resolved address for an API name such as `"vkCreateInstance"`
            ///
            /// `None` when the symbol is not compiled in or did not resolve.
            pub fn get(&self, api_name: &str) -> ::ash::vk::PFN_vkVoidFunction {
                Self::entries()
                    .iter()
                    .find(|entry| entry.info.api_name() == api_name)
                    .and_then(|entry| (entry.read)(self))
            }

            /// Every compiled-in symbol with its current address
            pub fn slots(&self) -> Vec<($crate::dispatch::SymbolInfo, ::ash::vk::PFN_vkVoidFunction)> {
                Self::entries()
                    .iter()
                    .map(|entry| (entry.info, (entry.read)(self)))
                    .collect()
            }

            /// Number of non-bootstrap symbols that resolved
            pub fn resolved_count(&self) -> usize {
                Self::entries()
                    .iter()
                    .filter(|entry| (entry.read)(self).is_some())
                    .count()
            }

            fn addresses(&self) -> Vec<usize> {
                let mut addresses = vec![
                    $( self.$boot.map_or(0, |f| f as usize), )+
                ];
                addresses.extend(
                    Self::entries()
                        .iter()
                        .map(|entry| (entry.read)(self).map_or(0, |f| f as usize)),
                );
                addresses
            }
        }

        impl PartialEq for $table {
            fn eq(&self, other: &Self) -> bool {
                self.addresses() == other.addresses()
            }
        }

        impl Eq for $table {}

        impl ::std::fmt::Debug for $table {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.debug_struct(stringify!($table))
                    $( .field(stringify!($boot), &self.$boot.is_some()) )+
                    .field("resolved", &self.resolved_count())
                    .field("symbols", &Self::entries().len())
                    .finish()
            }
        }
    };
}

pub mod device;
pub mod instance;
pub mod loader;

pub use device::{resolve_device_dispatch, DeviceDispatch};
pub use instance::{resolve_instance_dispatch, InstanceDispatch};
pub use loader::{resolve_loader_dispatch, LoaderDispatch};

/// Bootstrap resolver of tiers 1 and 2
pub const GET_INSTANCE_PROC_ADDR: &CStr = c"vkGetInstanceProcAddr";

/// Bootstrap resolver of tier 3
pub const GET_DEVICE_PROC_ADDR: &CStr = c"vkGetDeviceProcAddr";

/// Resolution stage of a dispatch table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    Loader,
    Instance,
    Device,
}

impl Tier {
    /// Symbol that must resolve for the tier to exist at all
    pub fn bootstrap_symbol(self) -> &'static CStr {
        match self {
            Tier::Loader | Tier::Instance => GET_INSTANCE_PROC_ADDR,
            Tier::Device => GET_DEVICE_PROC_ADDR,
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tier::Loader => write!(f, "loader"),
            Tier::Instance => write!(f, "instance"),
            Tier::Device => write!(f, "device"),
        }
    }
}

/// Catalog entry for one table field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolInfo {
    /// Registered API name, e.g. `vkCreateInstance`
    pub name: &'static CStr,

    /// Field name in the table, e.g. `create_instance`
    pub field: &'static str,

    /// Version or extension group, e.g. `VK_VERSION_1_1` or `VK_KHR_surface`
    pub group: &'static str,
}

impl SymbolInfo {
    pub fn api_name(&self) -> &'static str {
        // catalog names are ASCII literals
        self.name.to_str().unwrap_or_default()
    }

    /// Core API version symbol (always attempted), as opposed to extension
    pub fn is_core(&self) -> bool {
        self.group.starts_with("VK_VERSION_")
    }
}

/// Catalog entry plus accessors into a concrete table
pub(crate) struct Entry<T> {
    pub(crate) info: SymbolInfo,
    pub(crate) slot: fn(&mut T) -> &mut vk::PFN_vkVoidFunction,
    pub(crate) read: fn(&T) -> vk::PFN_vkVoidFunction,
}

/// Resolve every entry through `lookup`, storing whatever comes back
///
/// Nulls are stored as-is. Returns how many entries resolved.
pub(crate) fn populate<T>(
    table: &mut T,
    entries: &[Entry<T>],
    mut lookup: impl FnMut(&CStr) -> vk::PFN_vkVoidFunction,
) -> usize {
    let mut resolved = 0;
    for entry in entries {
        let address = lookup(entry.info.name);
        resolved += usize::from(address.is_some());
        *(entry.slot)(table) = address;
    }
    resolved
}

/// Reinterpret a resolved address as its real function pointer type
///
/// ```ignore
/// let create_instance = unsafe {
///     vkdyn::cast_proc::<vk::PFN_vkCreateInstance>(loader_dispatch.create_instance)
/// };
/// ```
///
/// # Safety
///
/// `F` must be the function pointer type matching the symbol's real
/// signature. Calling through a wrong type is undefined behaviour.
/// A target that is not pointer sized does not build:
///
/// ```compile_fail
/// let _ = unsafe { vkdyn::cast_proc::<u8>(None) };
/// ```
pub unsafe fn cast_proc<F: Copy>(address: vk::PFN_vkVoidFunction) -> Option<F> {
    const {
        assert!(
            mem::size_of::<F>() == mem::size_of::<RawProc>(),
            "cast_proc target must be a function pointer"
        )
    };
    address.map(|raw| unsafe { mem::transmute_copy::<RawProc, F>(&raw) })
}

#[cfg(test)]
mod tests {
    use super::*;

    dispatch_table! {
        /// Two-group table for exercising the macro
        pub struct TestDispatch: Loader {
            pub bootstrap: Option<vk::PFN_vkGetInstanceProcAddr>,
        }

        [all()] "VK_VERSION_1_0" {
            first = c"vkFirst",
            second = c"vkSecond",
        }
        [any()] "VK_TEST_disabled" {
            gated = c"vkGated",
        }
        [all()] "VK_TEST_enabled" {
            third_ext = c"vkThirdEXT",
        }
    }

    unsafe extern "system" fn noop() {}

    #[test]
    fn test_catalog_respects_gates() {
        let names: Vec<_> = TestDispatch::symbols().iter().map(|s| s.api_name()).collect();
        assert_eq!(names, vec!["vkFirst", "vkSecond", "vkThirdEXT"]);

        let symbols = TestDispatch::symbols();
        assert!(symbols[0].is_core());
        assert_eq!(symbols[0].field, "first");
        assert!(!symbols[2].is_core());
        assert_eq!(symbols[2].group, "VK_TEST_enabled");
        assert_eq!(TestDispatch::TIER, Tier::Loader);
    }

    #[test]
    fn test_populate_stores_nulls() {
        let mut table = TestDispatch::default();
        let resolved = populate(&mut table, TestDispatch::entries(), |name| {
            (name == c"vkSecond").then_some(noop as RawProc)
        });

        assert_eq!(resolved, 1);
        assert!(table.first.is_none());
        assert!(table.second.is_some());
        assert!(table.third_ext.is_none());
        assert_eq!(table.resolved_count(), 1);
        assert!(table.get("vkSecond").is_some());
        assert!(table.get("vkFirst").is_none());
        assert!(table.get("vkGated").is_none());
    }

    #[test]
    fn test_catalog_built_once() {
        let first = TestDispatch::entries();
        let second = TestDispatch::entries();
        assert!(std::ptr::eq(first, second));
        assert_eq!(first.len(), 3);
    }

    #[test]
    fn test_equality_is_field_for_field() {
        let mut a = TestDispatch::default();
        let mut b = TestDispatch::default();
        assert_eq!(a, b);

        a.first = Some(noop);
        assert_ne!(a, b);
        b.first = Some(noop);
        assert_eq!(a, b);
    }

    #[test]
    fn test_cast_proc_round_trip() {
        let typed = unsafe { cast_proc::<unsafe extern "system" fn()>(Some(noop)) };
        assert_eq!(typed.map(|f| f as usize), Some(noop as RawProc as usize));

        let none = unsafe { cast_proc::<vk::PFN_vkGetDeviceProcAddr>(None) };
        assert!(none.is_none());
    }

    #[test]
    fn test_tier_bootstrap_symbols() {
        assert_eq!(Tier::Loader.bootstrap_symbol(), c"vkGetInstanceProcAddr");
        assert_eq!(Tier::Instance.bootstrap_symbol(), c"vkGetInstanceProcAddr");
        assert_eq!(Tier::Device.bootstrap_symbol(), c"vkGetDeviceProcAddr");
        assert_eq!(Tier::Device.to_string(), "device");
    }
}
