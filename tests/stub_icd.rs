/*
 *  tests/stub_icd.rs
 *
 *  End-to-end run against the vkdyn-stub-icd shared library
 *
 *  vkdyn - Vulkan dynamic loading shim
 *  (c) 2020-26 Stuart Hunter
 */

use std::path::PathBuf;
use std::ptr;

use ash::vk;
use vkdyn::{cast_proc, InstanceDispatch, Loader, LoaderDispatch};

fn stub_library() -> PathBuf {
    let target = std::env::var_os("CARGO_TARGET_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("target"));
    target
        .join("debug")
        .join(libloading::library_filename("vkdyn_stub_icd"))
}

#[test]
#[ignore = "needs `cargo build -p vkdyn-stub-icd` first"]
fn test_stub_driver_loader_and_instance_tiers() {
    let library = stub_library();
    let mut loader = Loader::open(&[library.as_os_str()]).expect("stub driver builds next to the tests");

    let dispatch = LoaderDispatch::new(&loader).unwrap();
    assert!(dispatch.create_instance.is_some());
    assert!(dispatch.enumerate_instance_layer_properties.is_some());

    let create_instance =
        unsafe { cast_proc::<vk::PFN_vkCreateInstance>(dispatch.create_instance) }.unwrap();
    let create_info = vk::InstanceCreateInfo::default();
    let mut instance = vk::Instance::null();
    let result = unsafe { create_instance(&create_info, ptr::null(), &mut instance) };
    assert_eq!(result, vk::Result::SUCCESS);
    assert_ne!(instance, vk::Instance::null());

    let instance_dispatch = InstanceDispatch::new(instance, &dispatch).unwrap();
    assert!(instance_dispatch.get_device_proc_addr.is_some());

    let enumerate =
        unsafe { cast_proc::<vk::PFN_vkEnumeratePhysicalDevices>(instance_dispatch.enumerate_physical_devices) }
            .unwrap();
    let mut count = u32::MAX;
    let result = unsafe { enumerate(instance, &mut count, ptr::null_mut()) };
    assert_eq!(result, vk::Result::SUCCESS);
    assert_eq!(count, 0);

    let destroy =
        unsafe { cast_proc::<vk::PFN_vkDestroyInstance>(instance_dispatch.destroy_instance) }.unwrap();
    unsafe { destroy(instance, ptr::null()) };

    loader.destroy();
    assert!(!loader.is_loaded());
}
