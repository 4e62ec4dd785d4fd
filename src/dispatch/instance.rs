/*
 *  dispatch/instance.rs
 *
 *  vkdyn - Vulkan dynamic loading shim
 *  (c) 2020-26 Stuart Hunter
 *
 *  Tier 2 - entry points scoped to a VkInstance
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

use ash::vk::{self, Handle};
use log::debug;

use super::{cast_proc, populate, LoaderDispatch, GET_DEVICE_PROC_ADDR, GET_INSTANCE_PROC_ADDR};
use crate::error::LoaderError;

dispatch_table! {
    /// Tier 2 dispatch: instance and physical device entry points
    ///
    /// Seeded by [`LoaderDispatch::get_instance_proc_addr`]. Core symbols are
    /// always attempted; each extension group is compiled in only when its
    /// feature is enabled, and is still null when the driver lacks it.
    pub struct InstanceDispatch: Instance {
        /// Instance-scoped `vkGetInstanceProcAddr`
        pub get_instance_proc_addr: Option<vk::PFN_vkGetInstanceProcAddr>,
        /// Seeds [`DeviceDispatch`](super::DeviceDispatch)
        pub get_device_proc_addr: Option<vk::PFN_vkGetDeviceProcAddr>,
    }

    [all()] "VK_VERSION_1_0" {
        destroy_instance = c"vkDestroyInstance",
        enumerate_physical_devices = c"vkEnumeratePhysicalDevices",
        get_physical_device_features = c"vkGetPhysicalDeviceFeatures",
        get_physical_device_format_properties = c"vkGetPhysicalDeviceFormatProperties",
        get_physical_device_image_format_properties = c"vkGetPhysicalDeviceImageFormatProperties",
        get_physical_device_properties = c"vkGetPhysicalDeviceProperties",
        get_physical_device_queue_family_properties = c"vkGetPhysicalDeviceQueueFamilyProperties",
        get_physical_device_memory_properties = c"vkGetPhysicalDeviceMemoryProperties",
        create_device = c"vkCreateDevice",
        enumerate_device_extension_properties = c"vkEnumerateDeviceExtensionProperties",
        enumerate_device_layer_properties = c"vkEnumerateDeviceLayerProperties",
        get_physical_device_sparse_image_format_properties = c"vkGetPhysicalDeviceSparseImageFormatProperties",
    }
    [feature = "vk_1_1"] "VK_VERSION_1_1" {
        enumerate_physical_device_groups = c"vkEnumeratePhysicalDeviceGroups",
        get_physical_device_features2 = c"vkGetPhysicalDeviceFeatures2",
        get_physical_device_properties2 = c"vkGetPhysicalDeviceProperties2",
        get_physical_device_format_properties2 = c"vkGetPhysicalDeviceFormatProperties2",
        get_physical_device_image_format_properties2 = c"vkGetPhysicalDeviceImageFormatProperties2",
        get_physical_device_queue_family_properties2 = c"vkGetPhysicalDeviceQueueFamilyProperties2",
        get_physical_device_memory_properties2 = c"vkGetPhysicalDeviceMemoryProperties2",
        get_physical_device_sparse_image_format_properties2 = c"vkGetPhysicalDeviceSparseImageFormatProperties2",
        get_physical_device_external_buffer_properties = c"vkGetPhysicalDeviceExternalBufferProperties",
        get_physical_device_external_fence_properties = c"vkGetPhysicalDeviceExternalFenceProperties",
        get_physical_device_external_semaphore_properties = c"vkGetPhysicalDeviceExternalSemaphoreProperties",
    }
    [feature = "khr_surface"] "VK_KHR_surface" {
        destroy_surface_khr = c"vkDestroySurfaceKHR",
        get_physical_device_surface_support_khr = c"vkGetPhysicalDeviceSurfaceSupportKHR",
        get_physical_device_surface_capabilities_khr = c"vkGetPhysicalDeviceSurfaceCapabilitiesKHR",
        get_physical_device_surface_formats_khr = c"vkGetPhysicalDeviceSurfaceFormatsKHR",
        get_physical_device_surface_present_modes_khr = c"vkGetPhysicalDeviceSurfacePresentModesKHR",
    }
    [feature = "khr_display"] "VK_KHR_display" {
        get_physical_device_display_properties_khr = c"vkGetPhysicalDeviceDisplayPropertiesKHR",
        get_physical_device_display_plane_properties_khr = c"vkGetPhysicalDeviceDisplayPlanePropertiesKHR",
        get_display_plane_supported_displays_khr = c"vkGetDisplayPlaneSupportedDisplaysKHR",
        get_display_mode_properties_khr = c"vkGetDisplayModePropertiesKHR",
        create_display_mode_khr = c"vkCreateDisplayModeKHR",
        get_display_plane_capabilities_khr = c"vkGetDisplayPlaneCapabilitiesKHR",
        create_display_plane_surface_khr = c"vkCreateDisplayPlaneSurfaceKHR",
    }
    [all(feature = "khr_xlib_surface", unix, not(any(target_os = "macos", target_os = "ios", target_os = "android")))] "VK_KHR_xlib_surface" {
        create_xlib_surface_khr = c"vkCreateXlibSurfaceKHR",
        get_physical_device_xlib_presentation_support_khr = c"vkGetPhysicalDeviceXlibPresentationSupportKHR",
    }
    [all(feature = "khr_xcb_surface", unix, not(any(target_os = "macos", target_os = "ios", target_os = "android")))] "VK_KHR_xcb_surface" {
        create_xcb_surface_khr = c"vkCreateXcbSurfaceKHR",
        get_physical_device_xcb_presentation_support_khr = c"vkGetPhysicalDeviceXcbPresentationSupportKHR",
    }
    [all(feature = "khr_wayland_surface", unix, not(any(target_os = "macos", target_os = "ios", target_os = "android")))] "VK_KHR_wayland_surface" {
        create_wayland_surface_khr = c"vkCreateWaylandSurfaceKHR",
        get_physical_device_wayland_presentation_support_khr = c"vkGetPhysicalDeviceWaylandPresentationSupportKHR",
    }
    [all(feature = "khr_android_surface", target_os = "android")] "VK_KHR_android_surface" {
        create_android_surface_khr = c"vkCreateAndroidSurfaceKHR",
    }
    [all(feature = "khr_win32_surface", windows)] "VK_KHR_win32_surface" {
        create_win32_surface_khr = c"vkCreateWin32SurfaceKHR",
        get_physical_device_win32_presentation_support_khr = c"vkGetPhysicalDeviceWin32PresentationSupportKHR",
    }
    [feature = "ext_debug_report"] "VK_EXT_debug_report" {
        create_debug_report_callback_ext = c"vkCreateDebugReportCallbackEXT",
        destroy_debug_report_callback_ext = c"vkDestroyDebugReportCallbackEXT",
        debug_report_message_ext = c"vkDebugReportMessageEXT",
    }
    [feature = "ggp_stream_descriptor_surface"] "VK_GGP_stream_descriptor_surface" {
        create_stream_descriptor_surface_ggp = c"vkCreateStreamDescriptorSurfaceGGP",
    }
    [feature = "nv_external_memory_capabilities"] "VK_NV_external_memory_capabilities" {
        get_physical_device_external_image_format_properties_nv = c"vkGetPhysicalDeviceExternalImageFormatPropertiesNV",
    }
    [feature = "khr_get_physical_device_properties2"] "VK_KHR_get_physical_device_properties2" {
        get_physical_device_features2_khr = c"vkGetPhysicalDeviceFeatures2KHR",
        get_physical_device_properties2_khr = c"vkGetPhysicalDeviceProperties2KHR",
        get_physical_device_format_properties2_khr = c"vkGetPhysicalDeviceFormatProperties2KHR",
        get_physical_device_image_format_properties2_khr = c"vkGetPhysicalDeviceImageFormatProperties2KHR",
        get_physical_device_queue_family_properties2_khr = c"vkGetPhysicalDeviceQueueFamilyProperties2KHR",
        get_physical_device_memory_properties2_khr = c"vkGetPhysicalDeviceMemoryProperties2KHR",
        get_physical_device_sparse_image_format_properties2_khr = c"vkGetPhysicalDeviceSparseImageFormatProperties2KHR",
    }
    [feature = "nn_vi_surface"] "VK_NN_vi_surface" {
        create_vi_surface_nn = c"vkCreateViSurfaceNN",
    }
    [feature = "khr_device_group_creation"] "VK_KHR_device_group_creation" {
        enumerate_physical_device_groups_khr = c"vkEnumeratePhysicalDeviceGroupsKHR",
    }
    [feature = "khr_external_memory_capabilities"] "VK_KHR_external_memory_capabilities" {
        get_physical_device_external_buffer_properties_khr = c"vkGetPhysicalDeviceExternalBufferPropertiesKHR",
    }
    [feature = "khr_external_semaphore_capabilities"] "VK_KHR_external_semaphore_capabilities" {
        get_physical_device_external_semaphore_properties_khr = c"vkGetPhysicalDeviceExternalSemaphorePropertiesKHR",
    }
    [feature = "ext_direct_mode_display"] "VK_EXT_direct_mode_display" {
        release_display_ext = c"vkReleaseDisplayEXT",
    }
    [all(feature = "ext_acquire_xlib_display", unix, not(any(target_os = "macos", target_os = "ios", target_os = "android")))] "VK_EXT_acquire_xlib_display" {
        acquire_xlib_display_ext = c"vkAcquireXlibDisplayEXT",
        get_rand_r_output_display_ext = c"vkGetRandROutputDisplayEXT",
    }
    [feature = "ext_display_surface_counter"] "VK_EXT_display_surface_counter" {
        get_physical_device_surface_capabilities2_ext = c"vkGetPhysicalDeviceSurfaceCapabilities2EXT",
    }
    [feature = "khr_external_fence_capabilities"] "VK_KHR_external_fence_capabilities" {
        get_physical_device_external_fence_properties_khr = c"vkGetPhysicalDeviceExternalFencePropertiesKHR",
    }
    [feature = "khr_get_surface_capabilities2"] "VK_KHR_get_surface_capabilities2" {
        get_physical_device_surface_capabilities2_khr = c"vkGetPhysicalDeviceSurfaceCapabilities2KHR",
        get_physical_device_surface_formats2_khr = c"vkGetPhysicalDeviceSurfaceFormats2KHR",
    }
    [feature = "khr_get_display_properties2"] "VK_KHR_get_display_properties2" {
        get_physical_device_display_properties2_khr = c"vkGetPhysicalDeviceDisplayProperties2KHR",
        get_physical_device_display_plane_properties2_khr = c"vkGetPhysicalDeviceDisplayPlaneProperties2KHR",
        get_display_mode_properties2_khr = c"vkGetDisplayModeProperties2KHR",
        get_display_plane_capabilities2_khr = c"vkGetDisplayPlaneCapabilities2KHR",
    }
    [all(feature = "mvk_ios_surface", target_os = "ios")] "VK_MVK_ios_surface" {
        create_ios_surface_mvk = c"vkCreateIOSSurfaceMVK",
    }
    [all(feature = "mvk_macos_surface", target_os = "macos")] "VK_MVK_macos_surface" {
        create_mac_os_surface_mvk = c"vkCreateMacOSSurfaceMVK",
    }
    [feature = "ext_debug_utils"] "VK_EXT_debug_utils" {
        set_debug_utils_object_name_ext = c"vkSetDebugUtilsObjectNameEXT",
        set_debug_utils_object_tag_ext = c"vkSetDebugUtilsObjectTagEXT",
        queue_begin_debug_utils_label_ext = c"vkQueueBeginDebugUtilsLabelEXT",
        queue_end_debug_utils_label_ext = c"vkQueueEndDebugUtilsLabelEXT",
        queue_insert_debug_utils_label_ext = c"vkQueueInsertDebugUtilsLabelEXT",
        cmd_begin_debug_utils_label_ext = c"vkCmdBeginDebugUtilsLabelEXT",
        cmd_end_debug_utils_label_ext = c"vkCmdEndDebugUtilsLabelEXT",
        cmd_insert_debug_utils_label_ext = c"vkCmdInsertDebugUtilsLabelEXT",
        create_debug_utils_messenger_ext = c"vkCreateDebugUtilsMessengerEXT",
        destroy_debug_utils_messenger_ext = c"vkDestroyDebugUtilsMessengerEXT",
        submit_debug_utils_message_ext = c"vkSubmitDebugUtilsMessageEXT",
    }
    [all(feature = "fuchsia_imagepipe_surface", target_os = "fuchsia")] "VK_FUCHSIA_imagepipe_surface" {
        create_image_pipe_surface_fuchsia = c"vkCreateImagePipeSurfaceFUCHSIA",
    }
    [all(feature = "ext_metal_surface", any(target_os = "macos", target_os = "ios"))] "VK_EXT_metal_surface" {
        create_metal_surface_ext = c"vkCreateMetalSurfaceEXT",
    }
    [feature = "ext_headless_surface"] "VK_EXT_headless_surface" {
        create_headless_surface_ext = c"vkCreateHeadlessSurfaceEXT",
    }
    [feature = "ext_acquire_drm_display"] "VK_EXT_acquire_drm_display" {
        acquire_drm_display_ext = c"vkAcquireDrmDisplayEXT",
        get_drm_display_ext = c"vkGetDrmDisplayEXT",
    }
    [all(feature = "ext_directfb_surface", unix, not(any(target_os = "macos", target_os = "ios", target_os = "android")))] "VK_EXT_directfb_surface" {
        create_direct_fb_surface_ext = c"vkCreateDirectFBSurfaceEXT",
        get_physical_device_direct_fb_presentation_support_ext = c"vkGetPhysicalDeviceDirectFBPresentationSupportEXT",
    }
    [feature = "qnx_screen_surface"] "VK_QNX_screen_surface" {
        create_screen_surface_qnx = c"vkCreateScreenSurfaceQNX",
        get_physical_device_screen_presentation_support_qnx = c"vkGetPhysicalDeviceScreenPresentationSupportQNX",
    }
}

impl InstanceDispatch {
    /// Resolve tier 2 for `instance`
    pub fn new(instance: vk::Instance, loader_dispatch: &LoaderDispatch) -> Result<Self, LoaderError> {
        resolve_instance_dispatch(instance, loader_dispatch)
    }

    /// Resolve tier 2, discarding the result code
    pub fn new_or_default(instance: vk::Instance, loader_dispatch: &LoaderDispatch) -> Self {
        Self::new(instance, loader_dispatch).unwrap_or_default()
    }
}

/// Build the instance dispatch table
///
/// The loader tier's resolver is used to look up `vkGetInstanceProcAddr`
/// again, this time scoped to `instance`; that scoped resolver then answers
/// `vkGetDeviceProcAddr` and every catalog symbol. Fails with
/// `IncompatibleDriver` only when no instance-scoped resolver is available.
pub fn resolve_instance_dispatch(
    instance: vk::Instance,
    loader_dispatch: &LoaderDispatch,
) -> Result<InstanceDispatch, LoaderError> {
    if instance.as_raw() == 0 {
        return Err(LoaderError::OutOfHostMemory("instance handle is null".to_string()));
    }

    let seed = loader_dispatch.get_instance_proc_addr.ok_or_else(|| {
        LoaderError::IncompatibleDriver("loader dispatch has no vkGetInstanceProcAddr".to_string())
    })?;

    // SAFETY: `seed` is a vkGetInstanceProcAddr and `instance` is live
    let bootstrap = unsafe {
        cast_proc::<vk::PFN_vkGetInstanceProcAddr>(seed(instance, GET_INSTANCE_PROC_ADDR.as_ptr()))
    }
    .ok_or_else(|| {
        LoaderError::IncompatibleDriver("vkGetInstanceProcAddr not available for instance".to_string())
    })?;

    let mut table = InstanceDispatch {
        get_instance_proc_addr: Some(bootstrap),
        get_device_proc_addr: unsafe {
            cast_proc::<vk::PFN_vkGetDeviceProcAddr>(bootstrap(instance, GET_DEVICE_PROC_ADDR.as_ptr()))
        },
        ..Default::default()
    };

    let entries = InstanceDispatch::entries();
    let resolved = populate(&mut table, entries, |name| unsafe {
        bootstrap(instance, name.as_ptr())
    });

    debug!("{} dispatch ready: {}/{} symbols resolved for instance {:#x}",
        InstanceDispatch::TIER, resolved, entries.len(), instance.as_raw());

    Ok(table)
}
