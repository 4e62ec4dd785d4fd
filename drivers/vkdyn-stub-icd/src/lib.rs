/*
 *  vkdyn stub driver
 */

//! # vkdyn stub ICD
//!
//! A shared library exporting `vkGetInstanceProcAddr` and just enough of the
//! instance API to walk the loader and instance tiers: instance creation,
//! global enumeration (always empty) and a physical device list with no
//! devices in it.

use std::ffi::{c_char, CStr};
use std::panic::{catch_unwind, AssertUnwindSafe};

use ash::vk::{self, Handle};

type RawProc = unsafe extern "system" fn();

/// Reported by `vkEnumerateInstanceVersion`
const STUB_API_VERSION: u32 = vk::make_api_version(0, 1, 2, 0);

/// Backing storage for a created instance handle
struct StubInstance {
    _api_version: u32,
}

macro_rules! erase {
    ($f:expr, $pfn:ty) => {
        Some(unsafe { std::mem::transmute::<$pfn, RawProc>($f) })
    };
}

macro_rules! guard {
    ($fallback:expr, $code:block) => {
        match catch_unwind(AssertUnwindSafe(|| $code)) {
            Ok(result) => result,
            Err(_) => $fallback,
        }
    };
}

fn lookup(instance: vk::Instance, name: &CStr) -> vk::PFN_vkVoidFunction {
    match name.to_bytes() {
        b"vkGetInstanceProcAddr" => {
            erase!(vkGetInstanceProcAddr, vk::PFN_vkGetInstanceProcAddr)
        }
        b"vkCreateInstance" if instance == vk::Instance::null() => {
            erase!(create_instance, vk::PFN_vkCreateInstance)
        }
        b"vkEnumerateInstanceVersion" if instance == vk::Instance::null() => {
            erase!(enumerate_instance_version, vk::PFN_vkEnumerateInstanceVersion)
        }
        b"vkEnumerateInstanceExtensionProperties" if instance == vk::Instance::null() => erase!(
            enumerate_instance_extension_properties,
            vk::PFN_vkEnumerateInstanceExtensionProperties
        ),
        b"vkEnumerateInstanceLayerProperties" if instance == vk::Instance::null() => erase!(
            enumerate_instance_layer_properties,
            vk::PFN_vkEnumerateInstanceLayerProperties
        ),
        b"vkDestroyInstance" if instance != vk::Instance::null() => {
            erase!(destroy_instance, vk::PFN_vkDestroyInstance)
        }
        b"vkEnumeratePhysicalDevices" if instance != vk::Instance::null() => {
            erase!(enumerate_physical_devices, vk::PFN_vkEnumeratePhysicalDevices)
        }
        b"vkGetDeviceProcAddr" if instance != vk::Instance::null() => {
            erase!(get_device_proc_addr, vk::PFN_vkGetDeviceProcAddr)
        }
        _ => None,
    }
}

/// # Safety
///
/// `p_name` must point at a NUL terminated string.
#[no_mangle]
pub unsafe extern "system" fn vkGetInstanceProcAddr(
    instance: vk::Instance,
    p_name: *const c_char,
) -> vk::PFN_vkVoidFunction {
    if p_name.is_null() {
        return None;
    }
    let name = CStr::from_ptr(p_name);
    guard!(None, { lookup(instance, name) })
}

unsafe extern "system" fn create_instance(
    p_create_info: *const vk::InstanceCreateInfo<'_>,
    _p_allocator: *const vk::AllocationCallbacks<'_>,
    p_instance: *mut vk::Instance,
) -> vk::Result {
    if p_create_info.is_null() || p_instance.is_null() {
        return vk::Result::ERROR_INITIALIZATION_FAILED;
    }
    let create_info = &*p_create_info;
    if create_info.enabled_extension_count > 0 || create_info.enabled_layer_count > 0 {
        return vk::Result::ERROR_EXTENSION_NOT_PRESENT;
    }
    let api_version = if create_info.p_application_info.is_null() {
        vk::API_VERSION_1_0
    } else {
        (*create_info.p_application_info).api_version
    };

    let stub = Box::new(StubInstance {
        _api_version: api_version,
    });
    *p_instance = vk::Instance::from_raw(Box::into_raw(stub) as u64);
    vk::Result::SUCCESS
}

unsafe extern "system" fn destroy_instance(
    instance: vk::Instance,
    _p_allocator: *const vk::AllocationCallbacks<'_>,
) {
    if instance != vk::Instance::null() {
        drop(Box::from_raw(instance.as_raw() as *mut StubInstance));
    }
}

unsafe extern "system" fn enumerate_instance_version(p_api_version: *mut u32) -> vk::Result {
    if p_api_version.is_null() {
        return vk::Result::ERROR_INITIALIZATION_FAILED;
    }
    *p_api_version = STUB_API_VERSION;
    vk::Result::SUCCESS
}

unsafe extern "system" fn enumerate_instance_extension_properties(
    _p_layer_name: *const c_char,
    p_property_count: *mut u32,
    _p_properties: *mut vk::ExtensionProperties,
) -> vk::Result {
    empty_enumeration(p_property_count)
}

unsafe extern "system" fn enumerate_instance_layer_properties(
    p_property_count: *mut u32,
    _p_properties: *mut vk::LayerProperties,
) -> vk::Result {
    empty_enumeration(p_property_count)
}

unsafe extern "system" fn enumerate_physical_devices(
    _instance: vk::Instance,
    p_physical_device_count: *mut u32,
    _p_physical_devices: *mut vk::PhysicalDevice,
) -> vk::Result {
    empty_enumeration(p_physical_device_count)
}

unsafe extern "system" fn get_device_proc_addr(
    _device: vk::Device,
    p_name: *const c_char,
) -> vk::PFN_vkVoidFunction {
    if p_name.is_null() {
        return None;
    }
    match CStr::from_ptr(p_name).to_bytes() {
        b"vkGetDeviceProcAddr" => erase!(get_device_proc_addr, vk::PFN_vkGetDeviceProcAddr),
        _ => None,
    }
}

unsafe fn empty_enumeration(p_count: *mut u32) -> vk::Result {
    if p_count.is_null() {
        return vk::Result::ERROR_INITIALIZATION_FAILED;
    }
    *p_count = 0;
    vk::Result::SUCCESS
}
