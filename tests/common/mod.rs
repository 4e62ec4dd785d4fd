/*
 *  tests/common/mod.rs
 *
 *  In-process stub drivers shared by the integration tests
 *
 *  vkdyn - Vulkan dynamic loading shim
 *  (c) 2020-26 Stuart Hunter
 */

#![allow(dead_code)]

use std::ffi::{c_char, CStr};

use ash::vk::{self, Handle};
use vkdyn::{DeviceDispatch, ExportTable, InstanceDispatch, LoaderDispatch};

pub type RawProc = unsafe extern "system" fn();

/// Stand-in for every driver entry point; never actually called
pub unsafe extern "system" fn noop() {}

pub fn address(proc_addr: vk::PFN_vkVoidFunction) -> usize {
    proc_addr.map_or(0, |f| f as usize)
}

pub fn noop_address() -> usize {
    noop as RawProc as usize
}

pub fn fake_instance() -> vk::Instance {
    vk::Instance::from_raw(0x1000)
}

pub fn fake_device() -> vk::Device {
    vk::Device::from_raw(0x2000)
}

unsafe fn name_of<'a>(name: *const c_char) -> &'a CStr {
    unsafe { CStr::from_ptr(name) }
}

fn erase_gipa(f: vk::PFN_vkGetInstanceProcAddr) -> RawProc {
    unsafe { std::mem::transmute::<vk::PFN_vkGetInstanceProcAddr, RawProc>(f) }
}

fn erase_gdpa(f: vk::PFN_vkGetDeviceProcAddr) -> RawProc {
    unsafe { std::mem::transmute::<vk::PFN_vkGetDeviceProcAddr, RawProc>(f) }
}

fn is_core(symbols: Vec<vkdyn::SymbolInfo>, name: &CStr) -> bool {
    symbols.iter().any(|symbol| symbol.is_core() && symbol.name == name)
}

/// Driver that only knows vkCreateInstance (and itself)
pub unsafe extern "system" fn gipa_minimal(
    _instance: vk::Instance,
    name: *const c_char,
) -> vk::PFN_vkVoidFunction {
    let name = unsafe { name_of(name) };
    if name == c"vkCreateInstance" {
        Some(noop)
    } else if name == c"vkGetInstanceProcAddr" {
        Some(erase_gipa(gipa_minimal))
    } else {
        None
    }
}

/// Driver supporting every core symbol of every tier and no extension
pub unsafe extern "system" fn gipa_core(
    instance: vk::Instance,
    name: *const c_char,
) -> vk::PFN_vkVoidFunction {
    let name = unsafe { name_of(name) };
    if name == c"vkGetInstanceProcAddr" {
        return Some(erase_gipa(gipa_core));
    }
    if instance.as_raw() == 0 {
        return is_core(LoaderDispatch::symbols(), name).then_some(noop as RawProc);
    }
    if name == c"vkGetDeviceProcAddr" {
        return Some(erase_gdpa(gdpa_core));
    }
    is_core(InstanceDispatch::symbols(), name).then_some(noop as RawProc)
}

pub unsafe extern "system" fn gdpa_core(
    _device: vk::Device,
    name: *const c_char,
) -> vk::PFN_vkVoidFunction {
    let name = unsafe { name_of(name) };
    if name == c"vkGetDeviceProcAddr" {
        return Some(erase_gdpa(gdpa_core));
    }
    is_core(DeviceDispatch::symbols(), name).then_some(noop as RawProc)
}

/// Driver whose instance-scoped lookup refuses to hand back any resolver
pub unsafe extern "system" fn gipa_unscoped(
    instance: vk::Instance,
    name: *const c_char,
) -> vk::PFN_vkVoidFunction {
    let name = unsafe { name_of(name) };
    if instance.as_raw() != 0 {
        return None;
    }
    (name == c"vkCreateInstance").then_some(noop as RawProc)
}

/// Driver with an instance tier but no device tier
pub unsafe extern "system" fn gipa_no_device(
    _instance: vk::Instance,
    name: *const c_char,
) -> vk::PFN_vkVoidFunction {
    let name = unsafe { name_of(name) };
    if name == c"vkGetInstanceProcAddr" {
        return Some(erase_gipa(gipa_no_device));
    }
    (name == c"vkDestroyInstance").then_some(noop as RawProc)
}

/// Device resolver that will not resolve itself for a device
pub unsafe extern "system" fn gdpa_unscoped(
    _device: vk::Device,
    _name: *const c_char,
) -> vk::PFN_vkVoidFunction {
    None
}

pub fn minimal_driver() -> ExportTable {
    ExportTable::new("stub-minimal").with_instance_proc_addr(gipa_minimal)
}

pub fn core_driver() -> ExportTable {
    ExportTable::new("stub-core").with_instance_proc_addr(gipa_core)
}
