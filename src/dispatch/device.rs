/*
 *  dispatch/device.rs
 *
 *  vkdyn - Vulkan dynamic loading shim
 *  (c) 2020-26 Stuart Hunter
 *
 *  Tier 3 - entry points scoped to a VkDevice
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

use super::{cast_proc, populate, InstanceDispatch, GET_DEVICE_PROC_ADDR};
use crate::error::LoaderError;

dispatch_table! {
    /// Tier 3 dispatch: everything called on a device, its queues and
    /// command buffers
    ///
    /// Seeded by [`InstanceDispatch::get_device_proc_addr`]. Covers core
    /// 1.0-1.2 and the device extension catalog (swapchain, synchronization2,
    /// ray tracing, video, transform feedback, performance queries, ...).
    pub struct DeviceDispatch: Device {
        /// Device-scoped `vkGetDeviceProcAddr`
        pub get_device_proc_addr: Option<vk::PFN_vkGetDeviceProcAddr>,
    }

    [all()] "VK_VERSION_1_0" {
        destroy_device = c"vkDestroyDevice",
        get_device_queue = c"vkGetDeviceQueue",
        queue_submit = c"vkQueueSubmit",
        queue_wait_idle = c"vkQueueWaitIdle",
        device_wait_idle = c"vkDeviceWaitIdle",
        allocate_memory = c"vkAllocateMemory",
        free_memory = c"vkFreeMemory",
        map_memory = c"vkMapMemory",
        unmap_memory = c"vkUnmapMemory",
        flush_mapped_memory_ranges = c"vkFlushMappedMemoryRanges",
        invalidate_mapped_memory_ranges = c"vkInvalidateMappedMemoryRanges",
        get_device_memory_commitment = c"vkGetDeviceMemoryCommitment",
        bind_buffer_memory = c"vkBindBufferMemory",
        bind_image_memory = c"vkBindImageMemory",
        get_buffer_memory_requirements = c"vkGetBufferMemoryRequirements",
        get_image_memory_requirements = c"vkGetImageMemoryRequirements",
        get_image_sparse_memory_requirements = c"vkGetImageSparseMemoryRequirements",
        queue_bind_sparse = c"vkQueueBindSparse",
        create_fence = c"vkCreateFence",
        destroy_fence = c"vkDestroyFence",
        reset_fences = c"vkResetFences",
        get_fence_status = c"vkGetFenceStatus",
        wait_for_fences = c"vkWaitForFences",
        create_semaphore = c"vkCreateSemaphore",
        destroy_semaphore = c"vkDestroySemaphore",
        create_event = c"vkCreateEvent",
        destroy_event = c"vkDestroyEvent",
        get_event_status = c"vkGetEventStatus",
        set_event = c"vkSetEvent",
        reset_event = c"vkResetEvent",
        create_query_pool = c"vkCreateQueryPool",
        destroy_query_pool = c"vkDestroyQueryPool",
        get_query_pool_results = c"vkGetQueryPoolResults",
        create_buffer = c"vkCreateBuffer",
        destroy_buffer = c"vkDestroyBuffer",
        create_buffer_view = c"vkCreateBufferView",
        destroy_buffer_view = c"vkDestroyBufferView",
        create_image = c"vkCreateImage",
        destroy_image = c"vkDestroyImage",
        get_image_subresource_layout = c"vkGetImageSubresourceLayout",
        create_image_view = c"vkCreateImageView",
        destroy_image_view = c"vkDestroyImageView",
        create_shader_module = c"vkCreateShaderModule",
        destroy_shader_module = c"vkDestroyShaderModule",
        create_pipeline_cache = c"vkCreatePipelineCache",
        destroy_pipeline_cache = c"vkDestroyPipelineCache",
        get_pipeline_cache_data = c"vkGetPipelineCacheData",
        merge_pipeline_caches = c"vkMergePipelineCaches",
        create_graphics_pipelines = c"vkCreateGraphicsPipelines",
        create_compute_pipelines = c"vkCreateComputePipelines",
        destroy_pipeline = c"vkDestroyPipeline",
        create_pipeline_layout = c"vkCreatePipelineLayout",
        destroy_pipeline_layout = c"vkDestroyPipelineLayout",
        create_sampler = c"vkCreateSampler",
        destroy_sampler = c"vkDestroySampler",
        create_descriptor_set_layout = c"vkCreateDescriptorSetLayout",
        destroy_descriptor_set_layout = c"vkDestroyDescriptorSetLayout",
        create_descriptor_pool = c"vkCreateDescriptorPool",
        destroy_descriptor_pool = c"vkDestroyDescriptorPool",
        reset_descriptor_pool = c"vkResetDescriptorPool",
        allocate_descriptor_sets = c"vkAllocateDescriptorSets",
        free_descriptor_sets = c"vkFreeDescriptorSets",
        update_descriptor_sets = c"vkUpdateDescriptorSets",
        create_framebuffer = c"vkCreateFramebuffer",
        destroy_framebuffer = c"vkDestroyFramebuffer",
        create_render_pass = c"vkCreateRenderPass",
        destroy_render_pass = c"vkDestroyRenderPass",
        get_render_area_granularity = c"vkGetRenderAreaGranularity",
        create_command_pool = c"vkCreateCommandPool",
        destroy_command_pool = c"vkDestroyCommandPool",
        reset_command_pool = c"vkResetCommandPool",
        allocate_command_buffers = c"vkAllocateCommandBuffers",
        free_command_buffers = c"vkFreeCommandBuffers",
        begin_command_buffer = c"vkBeginCommandBuffer",
        end_command_buffer = c"vkEndCommandBuffer",
        reset_command_buffer = c"vkResetCommandBuffer",
        cmd_bind_pipeline = c"vkCmdBindPipeline",
        cmd_set_viewport = c"vkCmdSetViewport",
        cmd_set_scissor = c"vkCmdSetScissor",
        cmd_set_line_width = c"vkCmdSetLineWidth",
        cmd_set_depth_bias = c"vkCmdSetDepthBias",
        cmd_set_blend_constants = c"vkCmdSetBlendConstants",
        cmd_set_depth_bounds = c"vkCmdSetDepthBounds",
        cmd_set_stencil_compare_mask = c"vkCmdSetStencilCompareMask",
        cmd_set_stencil_write_mask = c"vkCmdSetStencilWriteMask",
        cmd_set_stencil_reference = c"vkCmdSetStencilReference",
        cmd_bind_descriptor_sets = c"vkCmdBindDescriptorSets",
        cmd_bind_index_buffer = c"vkCmdBindIndexBuffer",
        cmd_bind_vertex_buffers = c"vkCmdBindVertexBuffers",
        cmd_draw = c"vkCmdDraw",
        cmd_draw_indexed = c"vkCmdDrawIndexed",
        cmd_draw_indirect = c"vkCmdDrawIndirect",
        cmd_draw_indexed_indirect = c"vkCmdDrawIndexedIndirect",
        cmd_dispatch = c"vkCmdDispatch",
        cmd_dispatch_indirect = c"vkCmdDispatchIndirect",
        cmd_copy_buffer = c"vkCmdCopyBuffer",
        cmd_copy_image = c"vkCmdCopyImage",
        cmd_blit_image = c"vkCmdBlitImage",
        cmd_copy_buffer_to_image = c"vkCmdCopyBufferToImage",
        cmd_copy_image_to_buffer = c"vkCmdCopyImageToBuffer",
        cmd_update_buffer = c"vkCmdUpdateBuffer",
        cmd_fill_buffer = c"vkCmdFillBuffer",
        cmd_clear_color_image = c"vkCmdClearColorImage",
        cmd_clear_depth_stencil_image = c"vkCmdClearDepthStencilImage",
        cmd_clear_attachments = c"vkCmdClearAttachments",
        cmd_resolve_image = c"vkCmdResolveImage",
        cmd_set_event = c"vkCmdSetEvent",
        cmd_reset_event = c"vkCmdResetEvent",
        cmd_wait_events = c"vkCmdWaitEvents",
        cmd_pipeline_barrier = c"vkCmdPipelineBarrier",
        cmd_begin_query = c"vkCmdBeginQuery",
        cmd_end_query = c"vkCmdEndQuery",
        cmd_reset_query_pool = c"vkCmdResetQueryPool",
        cmd_write_timestamp = c"vkCmdWriteTimestamp",
        cmd_copy_query_pool_results = c"vkCmdCopyQueryPoolResults",
        cmd_push_constants = c"vkCmdPushConstants",
        cmd_begin_render_pass = c"vkCmdBeginRenderPass",
        cmd_next_subpass = c"vkCmdNextSubpass",
        cmd_end_render_pass = c"vkCmdEndRenderPass",
        cmd_execute_commands = c"vkCmdExecuteCommands",
    }
    [feature = "vk_1_1"] "VK_VERSION_1_1" {
        bind_buffer_memory2 = c"vkBindBufferMemory2",
        bind_image_memory2 = c"vkBindImageMemory2",
        get_device_group_peer_memory_features = c"vkGetDeviceGroupPeerMemoryFeatures",
        cmd_set_device_mask = c"vkCmdSetDeviceMask",
        cmd_dispatch_base = c"vkCmdDispatchBase",
        get_image_memory_requirements2 = c"vkGetImageMemoryRequirements2",
        get_buffer_memory_requirements2 = c"vkGetBufferMemoryRequirements2",
        get_image_sparse_memory_requirements2 = c"vkGetImageSparseMemoryRequirements2",
        trim_command_pool = c"vkTrimCommandPool",
        get_device_queue2 = c"vkGetDeviceQueue2",
        create_sampler_ycbcr_conversion = c"vkCreateSamplerYcbcrConversion",
        destroy_sampler_ycbcr_conversion = c"vkDestroySamplerYcbcrConversion",
        create_descriptor_update_template = c"vkCreateDescriptorUpdateTemplate",
        destroy_descriptor_update_template = c"vkDestroyDescriptorUpdateTemplate",
        update_descriptor_set_with_template = c"vkUpdateDescriptorSetWithTemplate",
        get_descriptor_set_layout_support = c"vkGetDescriptorSetLayoutSupport",
    }
    [feature = "vk_1_2"] "VK_VERSION_1_2" {
        cmd_draw_indirect_count = c"vkCmdDrawIndirectCount",
        cmd_draw_indexed_indirect_count = c"vkCmdDrawIndexedIndirectCount",
        create_render_pass2 = c"vkCreateRenderPass2",
        cmd_begin_render_pass2 = c"vkCmdBeginRenderPass2",
        cmd_next_subpass2 = c"vkCmdNextSubpass2",
        cmd_end_render_pass2 = c"vkCmdEndRenderPass2",
        reset_query_pool = c"vkResetQueryPool",
        get_semaphore_counter_value = c"vkGetSemaphoreCounterValue",
        wait_semaphores = c"vkWaitSemaphores",
        signal_semaphore = c"vkSignalSemaphore",
        get_buffer_device_address = c"vkGetBufferDeviceAddress",
        get_buffer_opaque_capture_address = c"vkGetBufferOpaqueCaptureAddress",
        get_device_memory_opaque_capture_address = c"vkGetDeviceMemoryOpaqueCaptureAddress",
    }
    [feature = "khr_swapchain"] "VK_KHR_swapchain" {
        create_swapchain_khr = c"vkCreateSwapchainKHR",
        destroy_swapchain_khr = c"vkDestroySwapchainKHR",
        get_swapchain_images_khr = c"vkGetSwapchainImagesKHR",
        acquire_next_image_khr = c"vkAcquireNextImageKHR",
        queue_present_khr = c"vkQueuePresentKHR",
    }
    [feature = "khr_display_swapchain"] "VK_KHR_display_swapchain" {
        create_shared_swapchains_khr = c"vkCreateSharedSwapchainsKHR",
    }
    [feature = "ext_debug_marker"] "VK_EXT_debug_marker" {
        debug_marker_set_object_tag_ext = c"vkDebugMarkerSetObjectTagEXT",
        debug_marker_set_object_name_ext = c"vkDebugMarkerSetObjectNameEXT",
        cmd_debug_marker_begin_ext = c"vkCmdDebugMarkerBeginEXT",
        cmd_debug_marker_end_ext = c"vkCmdDebugMarkerEndEXT",
        cmd_debug_marker_insert_ext = c"vkCmdDebugMarkerInsertEXT",
    }
    [all(feature = "khr_video_queue", feature = "provisional")] "VK_KHR_video_queue" {
        get_physical_device_video_capabilities_khr = c"vkGetPhysicalDeviceVideoCapabilitiesKHR",
        get_physical_device_video_format_properties_khr = c"vkGetPhysicalDeviceVideoFormatPropertiesKHR",
        create_video_session_khr = c"vkCreateVideoSessionKHR",
        destroy_video_session_khr = c"vkDestroyVideoSessionKHR",
        get_video_session_memory_requirements_khr = c"vkGetVideoSessionMemoryRequirementsKHR",
        bind_video_session_memory_khr = c"vkBindVideoSessionMemoryKHR",
        create_video_session_parameters_khr = c"vkCreateVideoSessionParametersKHR",
        update_video_session_parameters_khr = c"vkUpdateVideoSessionParametersKHR",
        destroy_video_session_parameters_khr = c"vkDestroyVideoSessionParametersKHR",
        cmd_begin_video_coding_khr = c"vkCmdBeginVideoCodingKHR",
        cmd_end_video_coding_khr = c"vkCmdEndVideoCodingKHR",
        cmd_control_video_coding_khr = c"vkCmdControlVideoCodingKHR",
    }
    [all(feature = "khr_video_decode_queue", feature = "provisional")] "VK_KHR_video_decode_queue" {
        cmd_decode_video_khr = c"vkCmdDecodeVideoKHR",
    }
    [feature = "ext_transform_feedback"] "VK_EXT_transform_feedback" {
        cmd_bind_transform_feedback_buffers_ext = c"vkCmdBindTransformFeedbackBuffersEXT",
        cmd_begin_transform_feedback_ext = c"vkCmdBeginTransformFeedbackEXT",
        cmd_end_transform_feedback_ext = c"vkCmdEndTransformFeedbackEXT",
        cmd_begin_query_indexed_ext = c"vkCmdBeginQueryIndexedEXT",
        cmd_end_query_indexed_ext = c"vkCmdEndQueryIndexedEXT",
        cmd_draw_indirect_byte_count_ext = c"vkCmdDrawIndirectByteCountEXT",
    }
    [feature = "nvx_binary_import"] "VK_NVX_binary_import" {
        create_cu_module_nvx = c"vkCreateCuModuleNVX",
        create_cu_function_nvx = c"vkCreateCuFunctionNVX",
        destroy_cu_module_nvx = c"vkDestroyCuModuleNVX",
        destroy_cu_function_nvx = c"vkDestroyCuFunctionNVX",
        cmd_cu_launch_kernel_nvx = c"vkCmdCuLaunchKernelNVX",
    }
    [feature = "nvx_image_view_handle"] "VK_NVX_image_view_handle" {
        get_image_view_handle_nvx = c"vkGetImageViewHandleNVX",
        get_image_view_address_nvx = c"vkGetImageViewAddressNVX",
    }
    [feature = "amd_draw_indirect_count"] "VK_AMD_draw_indirect_count" {
        cmd_draw_indirect_count_amd = c"vkCmdDrawIndirectCountAMD",
        cmd_draw_indexed_indirect_count_amd = c"vkCmdDrawIndexedIndirectCountAMD",
    }
    [feature = "amd_shader_info"] "VK_AMD_shader_info" {
        get_shader_info_amd = c"vkGetShaderInfoAMD",
    }
    [all(feature = "nv_external_memory_win32", windows)] "VK_NV_external_memory_win32" {
        get_memory_win32_handle_nv = c"vkGetMemoryWin32HandleNV",
    }
    [feature = "khr_device_group"] "VK_KHR_device_group" {
        get_device_group_peer_memory_features_khr = c"vkGetDeviceGroupPeerMemoryFeaturesKHR",
        cmd_set_device_mask_khr = c"vkCmdSetDeviceMaskKHR",
        cmd_dispatch_base_khr = c"vkCmdDispatchBaseKHR",
    }
    [feature = "khr_maintenance1"] "VK_KHR_maintenance1" {
        trim_command_pool_khr = c"vkTrimCommandPoolKHR",
    }
    [all(feature = "khr_external_memory_win32", windows)] "VK_KHR_external_memory_win32" {
        get_memory_win32_handle_khr = c"vkGetMemoryWin32HandleKHR",
        get_memory_win32_handle_properties_khr = c"vkGetMemoryWin32HandlePropertiesKHR",
    }
    [feature = "khr_external_memory_fd"] "VK_KHR_external_memory_fd" {
        get_memory_fd_khr = c"vkGetMemoryFdKHR",
        get_memory_fd_properties_khr = c"vkGetMemoryFdPropertiesKHR",
    }
    [all(feature = "khr_external_semaphore_win32", windows)] "VK_KHR_external_semaphore_win32" {
        import_semaphore_win32_handle_khr = c"vkImportSemaphoreWin32HandleKHR",
        get_semaphore_win32_handle_khr = c"vkGetSemaphoreWin32HandleKHR",
    }
    [feature = "khr_external_semaphore_fd"] "VK_KHR_external_semaphore_fd" {
        import_semaphore_fd_khr = c"vkImportSemaphoreFdKHR",
        get_semaphore_fd_khr = c"vkGetSemaphoreFdKHR",
    }
    [feature = "khr_push_descriptor"] "VK_KHR_push_descriptor" {
        cmd_push_descriptor_set_khr = c"vkCmdPushDescriptorSetKHR",
    }
    [feature = "ext_conditional_rendering"] "VK_EXT_conditional_rendering" {
        cmd_begin_conditional_rendering_ext = c"vkCmdBeginConditionalRenderingEXT",
        cmd_end_conditional_rendering_ext = c"vkCmdEndConditionalRenderingEXT",
    }
    [feature = "khr_descriptor_update_template"] "VK_KHR_descriptor_update_template" {
        create_descriptor_update_template_khr = c"vkCreateDescriptorUpdateTemplateKHR",
        destroy_descriptor_update_template_khr = c"vkDestroyDescriptorUpdateTemplateKHR",
        update_descriptor_set_with_template_khr = c"vkUpdateDescriptorSetWithTemplateKHR",
    }
    [feature = "nv_clip_space_w_scaling"] "VK_NV_clip_space_w_scaling" {
        cmd_set_viewport_w_scaling_nv = c"vkCmdSetViewportWScalingNV",
    }
    [feature = "ext_display_control"] "VK_EXT_display_control" {
        display_power_control_ext = c"vkDisplayPowerControlEXT",
        register_device_event_ext = c"vkRegisterDeviceEventEXT",
        register_display_event_ext = c"vkRegisterDisplayEventEXT",
        get_swapchain_counter_ext = c"vkGetSwapchainCounterEXT",
    }
    [feature = "google_display_timing"] "VK_GOOGLE_display_timing" {
        get_refresh_cycle_duration_google = c"vkGetRefreshCycleDurationGOOGLE",
        get_past_presentation_timing_google = c"vkGetPastPresentationTimingGOOGLE",
    }
    [feature = "ext_discard_rectangles"] "VK_EXT_discard_rectangles" {
        cmd_set_discard_rectangle_ext = c"vkCmdSetDiscardRectangleEXT",
    }
    [feature = "ext_hdr_metadata"] "VK_EXT_hdr_metadata" {
        set_hdr_metadata_ext = c"vkSetHdrMetadataEXT",
    }
    [feature = "khr_create_renderpass2"] "VK_KHR_create_renderpass2" {
        create_render_pass2_khr = c"vkCreateRenderPass2KHR",
        cmd_begin_render_pass2_khr = c"vkCmdBeginRenderPass2KHR",
        cmd_next_subpass2_khr = c"vkCmdNextSubpass2KHR",
        cmd_end_render_pass2_khr = c"vkCmdEndRenderPass2KHR",
    }
    [feature = "khr_shared_presentable_image"] "VK_KHR_shared_presentable_image" {
        get_swapchain_status_khr = c"vkGetSwapchainStatusKHR",
    }
    [all(feature = "khr_external_fence_win32", windows)] "VK_KHR_external_fence_win32" {
        import_fence_win32_handle_khr = c"vkImportFenceWin32HandleKHR",
        get_fence_win32_handle_khr = c"vkGetFenceWin32HandleKHR",
    }
    [feature = "khr_external_fence_fd"] "VK_KHR_external_fence_fd" {
        import_fence_fd_khr = c"vkImportFenceFdKHR",
        get_fence_fd_khr = c"vkGetFenceFdKHR",
    }
    [feature = "khr_performance_query"] "VK_KHR_performance_query" {
        enumerate_physical_device_queue_family_performance_query_counters_khr = c"vkEnumeratePhysicalDeviceQueueFamilyPerformanceQueryCountersKHR",
        get_physical_device_queue_family_performance_query_passes_khr = c"vkGetPhysicalDeviceQueueFamilyPerformanceQueryPassesKHR",
        acquire_profiling_lock_khr = c"vkAcquireProfilingLockKHR",
        release_profiling_lock_khr = c"vkReleaseProfilingLockKHR",
    }
    [all(feature = "android_external_memory_android_hardware_buffer", target_os = "android")] "VK_ANDROID_external_memory_android_hardware_buffer" {
        get_android_hardware_buffer_properties_android = c"vkGetAndroidHardwareBufferPropertiesANDROID",
        get_memory_android_hardware_buffer_android = c"vkGetMemoryAndroidHardwareBufferANDROID",
    }
    [feature = "ext_sample_locations"] "VK_EXT_sample_locations" {
        cmd_set_sample_locations_ext = c"vkCmdSetSampleLocationsEXT",
        get_physical_device_multisample_properties_ext = c"vkGetPhysicalDeviceMultisamplePropertiesEXT",
    }
    [feature = "khr_get_memory_requirements2"] "VK_KHR_get_memory_requirements2" {
        get_image_memory_requirements2_khr = c"vkGetImageMemoryRequirements2KHR",
        get_buffer_memory_requirements2_khr = c"vkGetBufferMemoryRequirements2KHR",
        get_image_sparse_memory_requirements2_khr = c"vkGetImageSparseMemoryRequirements2KHR",
    }
    [feature = "khr_acceleration_structure"] "VK_KHR_acceleration_structure" {
        create_acceleration_structure_khr = c"vkCreateAccelerationStructureKHR",
        destroy_acceleration_structure_khr = c"vkDestroyAccelerationStructureKHR",
        cmd_build_acceleration_structures_khr = c"vkCmdBuildAccelerationStructuresKHR",
        cmd_build_acceleration_structures_indirect_khr = c"vkCmdBuildAccelerationStructuresIndirectKHR",
        build_acceleration_structures_khr = c"vkBuildAccelerationStructuresKHR",
        copy_acceleration_structure_khr = c"vkCopyAccelerationStructureKHR",
        copy_acceleration_structure_to_memory_khr = c"vkCopyAccelerationStructureToMemoryKHR",
        copy_memory_to_acceleration_structure_khr = c"vkCopyMemoryToAccelerationStructureKHR",
        write_acceleration_structures_properties_khr = c"vkWriteAccelerationStructuresPropertiesKHR",
        cmd_copy_acceleration_structure_khr = c"vkCmdCopyAccelerationStructureKHR",
        cmd_copy_acceleration_structure_to_memory_khr = c"vkCmdCopyAccelerationStructureToMemoryKHR",
        cmd_copy_memory_to_acceleration_structure_khr = c"vkCmdCopyMemoryToAccelerationStructureKHR",
        get_acceleration_structure_device_address_khr = c"vkGetAccelerationStructureDeviceAddressKHR",
        cmd_write_acceleration_structures_properties_khr = c"vkCmdWriteAccelerationStructuresPropertiesKHR",
        get_device_acceleration_structure_compatibility_khr = c"vkGetDeviceAccelerationStructureCompatibilityKHR",
        get_acceleration_structure_build_sizes_khr = c"vkGetAccelerationStructureBuildSizesKHR",
    }
    [feature = "khr_ray_tracing_pipeline"] "VK_KHR_ray_tracing_pipeline" {
        cmd_trace_rays_khr = c"vkCmdTraceRaysKHR",
        create_ray_tracing_pipelines_khr = c"vkCreateRayTracingPipelinesKHR",
        get_ray_tracing_shader_group_handles_khr = c"vkGetRayTracingShaderGroupHandlesKHR",
        get_ray_tracing_capture_replay_shader_group_handles_khr = c"vkGetRayTracingCaptureReplayShaderGroupHandlesKHR",
        cmd_trace_rays_indirect_khr = c"vkCmdTraceRaysIndirectKHR",
        get_ray_tracing_shader_group_stack_size_khr = c"vkGetRayTracingShaderGroupStackSizeKHR",
        cmd_set_ray_tracing_pipeline_stack_size_khr = c"vkCmdSetRayTracingPipelineStackSizeKHR",
    }
    [feature = "khr_sampler_ycbcr_conversion"] "VK_KHR_sampler_ycbcr_conversion" {
        create_sampler_ycbcr_conversion_khr = c"vkCreateSamplerYcbcrConversionKHR",
        destroy_sampler_ycbcr_conversion_khr = c"vkDestroySamplerYcbcrConversionKHR",
    }
    [feature = "khr_bind_memory2"] "VK_KHR_bind_memory2" {
        bind_buffer_memory2_khr = c"vkBindBufferMemory2KHR",
        bind_image_memory2_khr = c"vkBindImageMemory2KHR",
    }
    [feature = "ext_image_drm_format_modifier"] "VK_EXT_image_drm_format_modifier" {
        get_image_drm_format_modifier_properties_ext = c"vkGetImageDrmFormatModifierPropertiesEXT",
    }
    [feature = "ext_validation_cache"] "VK_EXT_validation_cache" {
        create_validation_cache_ext = c"vkCreateValidationCacheEXT",
        destroy_validation_cache_ext = c"vkDestroyValidationCacheEXT",
        merge_validation_caches_ext = c"vkMergeValidationCachesEXT",
        get_validation_cache_data_ext = c"vkGetValidationCacheDataEXT",
    }
    [feature = "nv_shading_rate_image"] "VK_NV_shading_rate_image" {
        cmd_bind_shading_rate_image_nv = c"vkCmdBindShadingRateImageNV",
        cmd_set_viewport_shading_rate_palette_nv = c"vkCmdSetViewportShadingRatePaletteNV",
        cmd_set_coarse_sample_order_nv = c"vkCmdSetCoarseSampleOrderNV",
    }
    [feature = "nv_ray_tracing"] "VK_NV_ray_tracing" {
        create_acceleration_structure_nv = c"vkCreateAccelerationStructureNV",
        destroy_acceleration_structure_nv = c"vkDestroyAccelerationStructureNV",
        get_acceleration_structure_memory_requirements_nv = c"vkGetAccelerationStructureMemoryRequirementsNV",
        bind_acceleration_structure_memory_nv = c"vkBindAccelerationStructureMemoryNV",
        cmd_build_acceleration_structure_nv = c"vkCmdBuildAccelerationStructureNV",
        cmd_copy_acceleration_structure_nv = c"vkCmdCopyAccelerationStructureNV",
        cmd_trace_rays_nv = c"vkCmdTraceRaysNV",
        create_ray_tracing_pipelines_nv = c"vkCreateRayTracingPipelinesNV",
        get_ray_tracing_shader_group_handles_nv = c"vkGetRayTracingShaderGroupHandlesNV",
        get_acceleration_structure_handle_nv = c"vkGetAccelerationStructureHandleNV",
        cmd_write_acceleration_structures_properties_nv = c"vkCmdWriteAccelerationStructuresPropertiesNV",
        compile_deferred_nv = c"vkCompileDeferredNV",
    }
    [feature = "khr_maintenance3"] "VK_KHR_maintenance3" {
        get_descriptor_set_layout_support_khr = c"vkGetDescriptorSetLayoutSupportKHR",
    }
    [feature = "khr_draw_indirect_count"] "VK_KHR_draw_indirect_count" {
        cmd_draw_indirect_count_khr = c"vkCmdDrawIndirectCountKHR",
        cmd_draw_indexed_indirect_count_khr = c"vkCmdDrawIndexedIndirectCountKHR",
    }
    [feature = "ext_external_memory_host"] "VK_EXT_external_memory_host" {
        get_memory_host_pointer_properties_ext = c"vkGetMemoryHostPointerPropertiesEXT",
    }
    [feature = "amd_buffer_marker"] "VK_AMD_buffer_marker" {
        cmd_write_buffer_marker_amd = c"vkCmdWriteBufferMarkerAMD",
    }
    [feature = "ext_calibrated_timestamps"] "VK_EXT_calibrated_timestamps" {
        get_physical_device_calibrateable_time_domains_ext = c"vkGetPhysicalDeviceCalibrateableTimeDomainsEXT",
        get_calibrated_timestamps_ext = c"vkGetCalibratedTimestampsEXT",
    }
    [feature = "nv_mesh_shader"] "VK_NV_mesh_shader" {
        cmd_draw_mesh_tasks_nv = c"vkCmdDrawMeshTasksNV",
        cmd_draw_mesh_tasks_indirect_nv = c"vkCmdDrawMeshTasksIndirectNV",
        cmd_draw_mesh_tasks_indirect_count_nv = c"vkCmdDrawMeshTasksIndirectCountNV",
    }
    [feature = "nv_scissor_exclusive"] "VK_NV_scissor_exclusive" {
        cmd_set_exclusive_scissor_nv = c"vkCmdSetExclusiveScissorNV",
    }
    [feature = "nv_device_diagnostic_checkpoints"] "VK_NV_device_diagnostic_checkpoints" {
        cmd_set_checkpoint_nv = c"vkCmdSetCheckpointNV",
        get_queue_checkpoint_data_nv = c"vkGetQueueCheckpointDataNV",
    }
    [feature = "khr_timeline_semaphore"] "VK_KHR_timeline_semaphore" {
        get_semaphore_counter_value_khr = c"vkGetSemaphoreCounterValueKHR",
        wait_semaphores_khr = c"vkWaitSemaphoresKHR",
        signal_semaphore_khr = c"vkSignalSemaphoreKHR",
    }
    [feature = "intel_performance_query"] "VK_INTEL_performance_query" {
        initialize_performance_api_intel = c"vkInitializePerformanceApiINTEL",
        uninitialize_performance_api_intel = c"vkUninitializePerformanceApiINTEL",
        cmd_set_performance_marker_intel = c"vkCmdSetPerformanceMarkerINTEL",
        cmd_set_performance_stream_marker_intel = c"vkCmdSetPerformanceStreamMarkerINTEL",
        cmd_set_performance_override_intel = c"vkCmdSetPerformanceOverrideINTEL",
        acquire_performance_configuration_intel = c"vkAcquirePerformanceConfigurationINTEL",
        release_performance_configuration_intel = c"vkReleasePerformanceConfigurationINTEL",
        queue_set_performance_configuration_intel = c"vkQueueSetPerformanceConfigurationINTEL",
        get_performance_parameter_intel = c"vkGetPerformanceParameterINTEL",
    }
    [feature = "amd_display_native_hdr"] "VK_AMD_display_native_hdr" {
        set_local_dimming_amd = c"vkSetLocalDimmingAMD",
    }
    [feature = "khr_fragment_shading_rate"] "VK_KHR_fragment_shading_rate" {
        get_physical_device_fragment_shading_rates_khr = c"vkGetPhysicalDeviceFragmentShadingRatesKHR",
        cmd_set_fragment_shading_rate_khr = c"vkCmdSetFragmentShadingRateKHR",
    }
    [feature = "ext_buffer_device_address"] "VK_EXT_buffer_device_address" {
        get_buffer_device_address_ext = c"vkGetBufferDeviceAddressEXT",
    }
    [feature = "ext_tooling_info"] "VK_EXT_tooling_info" {
        get_physical_device_tool_properties_ext = c"vkGetPhysicalDeviceToolPropertiesEXT",
    }
    [feature = "khr_present_wait"] "VK_KHR_present_wait" {
        wait_for_present_khr = c"vkWaitForPresentKHR",
    }
    [feature = "nv_cooperative_matrix"] "VK_NV_cooperative_matrix" {
        get_physical_device_cooperative_matrix_properties_nv = c"vkGetPhysicalDeviceCooperativeMatrixPropertiesNV",
    }
    [feature = "nv_coverage_reduction_mode"] "VK_NV_coverage_reduction_mode" {
        get_physical_device_supported_framebuffer_mixed_samples_combinations_nv = c"vkGetPhysicalDeviceSupportedFramebufferMixedSamplesCombinationsNV",
    }
    [all(feature = "ext_full_screen_exclusive", windows)] "VK_EXT_full_screen_exclusive" {
        get_physical_device_surface_present_modes2_ext = c"vkGetPhysicalDeviceSurfacePresentModes2EXT",
        acquire_full_screen_exclusive_mode_ext = c"vkAcquireFullScreenExclusiveModeEXT",
        release_full_screen_exclusive_mode_ext = c"vkReleaseFullScreenExclusiveModeEXT",
        get_device_group_surface_present_modes2_ext = c"vkGetDeviceGroupSurfacePresentModes2EXT",
    }
    [feature = "khr_buffer_device_address"] "VK_KHR_buffer_device_address" {
        get_buffer_device_address_khr = c"vkGetBufferDeviceAddressKHR",
        get_buffer_opaque_capture_address_khr = c"vkGetBufferOpaqueCaptureAddressKHR",
        get_device_memory_opaque_capture_address_khr = c"vkGetDeviceMemoryOpaqueCaptureAddressKHR",
    }
    [feature = "ext_line_rasterization"] "VK_EXT_line_rasterization" {
        cmd_set_line_stipple_ext = c"vkCmdSetLineStippleEXT",
    }
    [feature = "ext_host_query_reset"] "VK_EXT_host_query_reset" {
        reset_query_pool_ext = c"vkResetQueryPoolEXT",
    }
    [feature = "ext_extended_dynamic_state"] "VK_EXT_extended_dynamic_state" {
        cmd_set_cull_mode_ext = c"vkCmdSetCullModeEXT",
        cmd_set_front_face_ext = c"vkCmdSetFrontFaceEXT",
        cmd_set_primitive_topology_ext = c"vkCmdSetPrimitiveTopologyEXT",
        cmd_set_viewport_with_count_ext = c"vkCmdSetViewportWithCountEXT",
        cmd_set_scissor_with_count_ext = c"vkCmdSetScissorWithCountEXT",
        cmd_bind_vertex_buffers2_ext = c"vkCmdBindVertexBuffers2EXT",
        cmd_set_depth_test_enable_ext = c"vkCmdSetDepthTestEnableEXT",
        cmd_set_depth_write_enable_ext = c"vkCmdSetDepthWriteEnableEXT",
        cmd_set_depth_compare_op_ext = c"vkCmdSetDepthCompareOpEXT",
        cmd_set_depth_bounds_test_enable_ext = c"vkCmdSetDepthBoundsTestEnableEXT",
        cmd_set_stencil_test_enable_ext = c"vkCmdSetStencilTestEnableEXT",
        cmd_set_stencil_op_ext = c"vkCmdSetStencilOpEXT",
    }
    [feature = "khr_deferred_host_operations"] "VK_KHR_deferred_host_operations" {
        create_deferred_operation_khr = c"vkCreateDeferredOperationKHR",
        destroy_deferred_operation_khr = c"vkDestroyDeferredOperationKHR",
        get_deferred_operation_max_concurrency_khr = c"vkGetDeferredOperationMaxConcurrencyKHR",
        get_deferred_operation_result_khr = c"vkGetDeferredOperationResultKHR",
        deferred_operation_join_khr = c"vkDeferredOperationJoinKHR",
    }
    [feature = "khr_pipeline_executable_properties"] "VK_KHR_pipeline_executable_properties" {
        get_pipeline_executable_properties_khr = c"vkGetPipelineExecutablePropertiesKHR",
        get_pipeline_executable_statistics_khr = c"vkGetPipelineExecutableStatisticsKHR",
        get_pipeline_executable_internal_representations_khr = c"vkGetPipelineExecutableInternalRepresentationsKHR",
    }
    [feature = "nv_device_generated_commands"] "VK_NV_device_generated_commands" {
        get_generated_commands_memory_requirements_nv = c"vkGetGeneratedCommandsMemoryRequirementsNV",
        cmd_preprocess_generated_commands_nv = c"vkCmdPreprocessGeneratedCommandsNV",
        cmd_execute_generated_commands_nv = c"vkCmdExecuteGeneratedCommandsNV",
        cmd_bind_pipeline_shader_group_nv = c"vkCmdBindPipelineShaderGroupNV",
        create_indirect_commands_layout_nv = c"vkCreateIndirectCommandsLayoutNV",
        destroy_indirect_commands_layout_nv = c"vkDestroyIndirectCommandsLayoutNV",
    }
    [feature = "ext_private_data"] "VK_EXT_private_data" {
        create_private_data_slot_ext = c"vkCreatePrivateDataSlotEXT",
        destroy_private_data_slot_ext = c"vkDestroyPrivateDataSlotEXT",
        set_private_data_ext = c"vkSetPrivateDataEXT",
        get_private_data_ext = c"vkGetPrivateDataEXT",
    }
    [all(feature = "khr_video_encode_queue", feature = "provisional")] "VK_KHR_video_encode_queue" {
        cmd_encode_video_khr = c"vkCmdEncodeVideoKHR",
    }
    [feature = "khr_synchronization2"] "VK_KHR_synchronization2" {
        cmd_set_event2_khr = c"vkCmdSetEvent2KHR",
        cmd_reset_event2_khr = c"vkCmdResetEvent2KHR",
        cmd_wait_events2_khr = c"vkCmdWaitEvents2KHR",
        cmd_pipeline_barrier2_khr = c"vkCmdPipelineBarrier2KHR",
        cmd_write_timestamp2_khr = c"vkCmdWriteTimestamp2KHR",
        queue_submit2_khr = c"vkQueueSubmit2KHR",
        cmd_write_buffer_marker2_amd = c"vkCmdWriteBufferMarker2AMD",
        get_queue_checkpoint_data2_nv = c"vkGetQueueCheckpointData2NV",
    }
    [feature = "nv_fragment_shading_rate_enums"] "VK_NV_fragment_shading_rate_enums" {
        cmd_set_fragment_shading_rate_enum_nv = c"vkCmdSetFragmentShadingRateEnumNV",
    }
    [feature = "khr_copy_commands2"] "VK_KHR_copy_commands2" {
        cmd_copy_buffer2_khr = c"vkCmdCopyBuffer2KHR",
        cmd_copy_image2_khr = c"vkCmdCopyImage2KHR",
        cmd_copy_buffer_to_image2_khr = c"vkCmdCopyBufferToImage2KHR",
        cmd_copy_image_to_buffer2_khr = c"vkCmdCopyImageToBuffer2KHR",
        cmd_blit_image2_khr = c"vkCmdBlitImage2KHR",
        cmd_resolve_image2_khr = c"vkCmdResolveImage2KHR",
    }
    [all(feature = "nv_acquire_winrt_display", windows)] "VK_NV_acquire_winrt_display" {
        acquire_winrt_display_nv = c"vkAcquireWinrtDisplayNV",
        get_winrt_display_nv = c"vkGetWinrtDisplayNV",
    }
    [feature = "ext_vertex_input_dynamic_state"] "VK_EXT_vertex_input_dynamic_state" {
        cmd_set_vertex_input_ext = c"vkCmdSetVertexInputEXT",
    }
    [all(feature = "fuchsia_external_memory", target_os = "fuchsia")] "VK_FUCHSIA_external_memory" {
        get_memory_zircon_handle_fuchsia = c"vkGetMemoryZirconHandleFUCHSIA",
        get_memory_zircon_handle_properties_fuchsia = c"vkGetMemoryZirconHandlePropertiesFUCHSIA",
    }
    [all(feature = "fuchsia_external_semaphore", target_os = "fuchsia")] "VK_FUCHSIA_external_semaphore" {
        import_semaphore_zircon_handle_fuchsia = c"vkImportSemaphoreZirconHandleFUCHSIA",
        get_semaphore_zircon_handle_fuchsia = c"vkGetSemaphoreZirconHandleFUCHSIA",
    }
    [feature = "huawei_subpass_shading"] "VK_HUAWEI_subpass_shading" {
        get_device_subpass_shading_max_workgroup_size_huawei = c"vkGetDeviceSubpassShadingMaxWorkgroupSizeHUAWEI",
        cmd_subpass_shading_huawei = c"vkCmdSubpassShadingHUAWEI",
    }
    [feature = "huawei_invocation_mask"] "VK_HUAWEI_invocation_mask" {
        cmd_bind_invocation_mask_huawei = c"vkCmdBindInvocationMaskHUAWEI",
    }
    [feature = "nv_external_memory_rdma"] "VK_NV_external_memory_rdma" {
        get_memory_remote_address_nv = c"vkGetMemoryRemoteAddressNV",
    }
    [feature = "ext_extended_dynamic_state2"] "VK_EXT_extended_dynamic_state2" {
        cmd_set_patch_control_points_ext = c"vkCmdSetPatchControlPointsEXT",
        cmd_set_rasterizer_discard_enable_ext = c"vkCmdSetRasterizerDiscardEnableEXT",
        cmd_set_depth_bias_enable_ext = c"vkCmdSetDepthBiasEnableEXT",
        cmd_set_logic_op_ext = c"vkCmdSetLogicOpEXT",
        cmd_set_primitive_restart_enable_ext = c"vkCmdSetPrimitiveRestartEnableEXT",
    }
    [feature = "ext_color_write_enable"] "VK_EXT_color_write_enable" {
        cmd_set_color_write_enable_ext = c"vkCmdSetColorWriteEnableEXT",
    }
    [feature = "ext_multi_draw"] "VK_EXT_multi_draw" {
        cmd_draw_multi_ext = c"vkCmdDrawMultiEXT",
        cmd_draw_multi_indexed_ext = c"vkCmdDrawMultiIndexedEXT",
    }
    [feature = "ext_pageable_device_local_memory"] "VK_EXT_pageable_device_local_memory" {
        set_device_memory_priority_ext = c"vkSetDeviceMemoryPriorityEXT",
    }
    [any(feature = "khr_device_group", feature = "khr_swapchain")] "VK_KHR_device_group || VK_KHR_swapchain" {
        get_device_group_present_capabilities_khr = c"vkGetDeviceGroupPresentCapabilitiesKHR",
        get_device_group_surface_present_modes_khr = c"vkGetDeviceGroupSurfacePresentModesKHR",
        get_physical_device_present_rectangles_khr = c"vkGetPhysicalDevicePresentRectanglesKHR",
        acquire_next_image2_khr = c"vkAcquireNextImage2KHR",
    }
    [any(feature = "khr_push_descriptor", feature = "khr_descriptor_update_template")] "VK_KHR_push_descriptor || VK_KHR_descriptor_update_template" {
        cmd_push_descriptor_set_with_template_khr = c"vkCmdPushDescriptorSetWithTemplateKHR",
    }
}

impl DeviceDispatch {
    /// Resolve tier 3 for `device`
    pub fn new(device: vk::Device, instance_dispatch: &InstanceDispatch) -> Result<Self, LoaderError> {
        resolve_device_dispatch(device, instance_dispatch)
    }

    /// Resolve tier 3, discarding the result code
    pub fn new_or_default(device: vk::Device, instance_dispatch: &InstanceDispatch) -> Self {
        Self::new(device, instance_dispatch).unwrap_or_default()
    }
}

/// Build the device dispatch table
///
/// Same shape as [`resolve_instance_dispatch`](super::resolve_instance_dispatch),
/// seeded by the instance tier's `vkGetDeviceProcAddr`.
pub fn resolve_device_dispatch(
    device: vk::Device,
    instance_dispatch: &InstanceDispatch,
) -> Result<DeviceDispatch, LoaderError> {
    if device.as_raw() == 0 {
        return Err(LoaderError::OutOfHostMemory("device handle is null".to_string()));
    }

    let seed = instance_dispatch.get_device_proc_addr.ok_or_else(|| {
        LoaderError::IncompatibleDriver("instance dispatch has no vkGetDeviceProcAddr".to_string())
    })?;

    // SAFETY: `seed` is a vkGetDeviceProcAddr and `device` is live
    let bootstrap = unsafe {
        cast_proc::<vk::PFN_vkGetDeviceProcAddr>(seed(device, GET_DEVICE_PROC_ADDR.as_ptr()))
    }
    .ok_or_else(|| {
        LoaderError::IncompatibleDriver("vkGetDeviceProcAddr not available for device".to_string())
    })?;

    let mut table = DeviceDispatch {
        get_device_proc_addr: Some(bootstrap),
        ..Default::default()
    };

    let entries = DeviceDispatch::entries();
    let resolved = populate(&mut table, entries, |name| unsafe {
        bootstrap(device, name.as_ptr())
    });

    debug!("{} dispatch ready: {}/{} symbols resolved for device {:#x}",
        DeviceDispatch::TIER, resolved, entries.len(), device.as_raw());

    Ok(table)
}
