/*
 *  tests/dispatch_tiers.rs
 *
 *  Loader -> instance -> device resolution against in-process stub drivers
 *
 *  vkdyn - Vulkan dynamic loading shim
 *  (c) 2020-26 Stuart Hunter
 */

mod common;

use ash::vk;
use common::*;
use vkdyn::{
    resolve_device_dispatch, resolve_instance_dispatch, resolve_loader_dispatch,
    DeviceDispatch, ExportTable, InstanceDispatch, Loader, LoaderDispatch, LoaderError,
};

#[test]
fn test_loader_tier_minimal_driver() {
    // only vkGetInstanceProcAddr is exported; it answers vkCreateInstance
    let loader = Loader::from_source(minimal_driver());
    let dispatch = resolve_loader_dispatch(&loader).expect("bootstrap is exported");

    assert!(dispatch.get_instance_proc_addr.is_some());
    assert_eq!(address(dispatch.create_instance), noop_address());
    assert!(dispatch.enumerate_instance_extension_properties.is_none());
    assert!(dispatch.enumerate_instance_layer_properties.is_none());
    #[cfg(feature = "vk_1_1")]
    assert!(dispatch.enumerate_instance_version.is_none());
    assert_eq!(dispatch.resolved_count(), 1);
}

#[test]
fn test_loader_tier_missing_bootstrap() {
    // the library opens but has no vkGetInstanceProcAddr
    let loader = Loader::from_source(ExportTable::new("no-bootstrap").with(c"vkCreateInstance", noop));
    assert!(loader.is_loaded());

    let err = resolve_loader_dispatch(&loader).unwrap_err();
    assert!(matches!(err, LoaderError::IncompatibleDriver(_)));
    assert_eq!(err.vk_result(), vk::Result::ERROR_INCOMPATIBLE_DRIVER);

    assert_eq!(LoaderDispatch::new_or_default(&loader), LoaderDispatch::default());
}

#[cfg(target_os = "linux")]
#[test]
fn test_loader_tier_opened_library_without_bootstrap() {
    // a real dlopen: libc opens fine but exports no vkGetInstanceProcAddr
    let mut loader = Loader::open(&["libc.so.6"]).expect("libc is always present");
    assert!(loader.is_loaded());
    assert_eq!(loader.name(), Some("libc.so.6"));

    let err = resolve_loader_dispatch(&loader).unwrap_err();
    assert!(err.is_incompatible_driver());
    assert_eq!(vkdyn::error::result_code(&Err::<(), _>(err)), vk::Result::ERROR_INCOMPATIBLE_DRIVER);
    assert_eq!(LoaderDispatch::new_or_default(&loader), LoaderDispatch::default());

    loader.destroy();
    assert!(!loader.is_loaded());
}

#[test]
fn test_loader_tier_null_loader() {
    let loader = Loader::null();
    let err = resolve_loader_dispatch(&loader).unwrap_err();
    assert_eq!(err.vk_result(), vk::Result::ERROR_OUT_OF_HOST_MEMORY);
}

#[test]
fn test_instance_tier_core_only_driver() {
    let loader = Loader::from_source(core_driver());
    let loader_dispatch = LoaderDispatch::new(&loader).unwrap();
    let dispatch = resolve_instance_dispatch(fake_instance(), &loader_dispatch)
        .expect("core driver resolves the instance tier");

    assert!(dispatch.get_instance_proc_addr.is_some());
    assert!(dispatch.get_device_proc_addr.is_some());

    for (symbol, proc_addr) in dispatch.slots() {
        if symbol.is_core() {
            assert!(proc_addr.is_some(), "{} should resolve", symbol.api_name());
        } else {
            assert!(proc_addr.is_none(), "{} should be null", symbol.api_name());
        }
    }

    let core = InstanceDispatch::symbols().iter().filter(|s| s.is_core()).count();
    assert_eq!(dispatch.resolved_count(), core);
    assert!(dispatch.get("vkEnumeratePhysicalDevices").is_some());
}

#[test]
fn test_instance_tier_without_loader_bootstrap() {
    let err = resolve_instance_dispatch(fake_instance(), &LoaderDispatch::default()).unwrap_err();
    assert!(err.is_incompatible_driver());

    let table = InstanceDispatch::new_or_default(fake_instance(), &LoaderDispatch::default());
    assert_eq!(table, InstanceDispatch::default());
    assert_eq!(table.resolved_count(), 0);
}

#[test]
fn test_instance_tier_unscoped_bootstrap() {
    let loader = Loader::from_source(ExportTable::new("unscoped").with_instance_proc_addr(gipa_unscoped));
    let loader_dispatch = LoaderDispatch::new(&loader).unwrap();
    assert!(loader_dispatch.create_instance.is_some());

    let err = resolve_instance_dispatch(fake_instance(), &loader_dispatch).unwrap_err();
    assert!(err.is_incompatible_driver());
}

#[test]
fn test_instance_tier_null_instance() {
    let loader = Loader::from_source(core_driver());
    let loader_dispatch = LoaderDispatch::new(&loader).unwrap();

    let err = resolve_instance_dispatch(vk::Instance::null(), &loader_dispatch).unwrap_err();
    assert_eq!(err.vk_result(), vk::Result::ERROR_OUT_OF_HOST_MEMORY);
}

#[test]
fn test_device_tier_core_only_driver() {
    let loader = Loader::from_source(core_driver());
    let loader_dispatch = LoaderDispatch::new(&loader).unwrap();
    let instance_dispatch = InstanceDispatch::new(fake_instance(), &loader_dispatch).unwrap();
    let dispatch = resolve_device_dispatch(fake_device(), &instance_dispatch).unwrap();

    assert!(dispatch.get_device_proc_addr.is_some());
    assert!(dispatch.queue_submit.is_some());
    assert!(dispatch.cmd_draw.is_some());
    #[cfg(feature = "khr_swapchain")]
    assert!(dispatch.create_swapchain_khr.is_none());
    #[cfg(feature = "khr_synchronization2")]
    assert!(dispatch.cmd_pipeline_barrier2_khr.is_none());

    for (symbol, proc_addr) in dispatch.slots() {
        assert_eq!(proc_addr.is_some(), symbol.is_core(), "{}", symbol.api_name());
    }
}

#[test]
fn test_device_tier_without_device_bootstrap() {
    let loader = Loader::from_source(ExportTable::new("no-device").with_instance_proc_addr(gipa_no_device));
    let loader_dispatch = LoaderDispatch::new(&loader).unwrap();
    let instance_dispatch = InstanceDispatch::new(fake_instance(), &loader_dispatch).unwrap();

    assert!(instance_dispatch.get_device_proc_addr.is_none());
    assert!(instance_dispatch.destroy_instance.is_some());

    let err = resolve_device_dispatch(fake_device(), &instance_dispatch).unwrap_err();
    assert!(err.is_incompatible_driver());
    assert_eq!(
        DeviceDispatch::new_or_default(fake_device(), &instance_dispatch),
        DeviceDispatch::default()
    );
}

#[test]
fn test_device_tier_unscoped_bootstrap() {
    let instance_dispatch = InstanceDispatch {
        get_device_proc_addr: Some(gdpa_unscoped),
        ..Default::default()
    };

    let err = resolve_device_dispatch(fake_device(), &instance_dispatch).unwrap_err();
    assert!(err.is_incompatible_driver());
}

#[test]
fn test_device_tier_null_device() {
    let instance_dispatch = InstanceDispatch {
        get_device_proc_addr: Some(gdpa_core),
        ..Default::default()
    };

    let err = resolve_device_dispatch(vk::Device::null(), &instance_dispatch).unwrap_err();
    assert_eq!(err.vk_result(), vk::Result::ERROR_OUT_OF_HOST_MEMORY);
}

#[test]
fn test_resolution_is_idempotent() {
    let loader = Loader::from_source(core_driver());

    let first = resolve_loader_dispatch(&loader).unwrap();
    let second = resolve_loader_dispatch(&loader).unwrap();
    assert_eq!(first, second);

    let instance_a = resolve_instance_dispatch(fake_instance(), &first).unwrap();
    let instance_b = resolve_instance_dispatch(fake_instance(), &second).unwrap();
    assert_eq!(instance_a, instance_b);

    let device_a = resolve_device_dispatch(fake_device(), &instance_a).unwrap();
    let device_b = resolve_device_dispatch(fake_device(), &instance_b).unwrap();
    assert_eq!(device_a, device_b);
}

#[test]
fn test_tables_are_plain_values() {
    let loader = Loader::from_source(core_driver());
    let dispatch = LoaderDispatch::new(&loader).unwrap();
    let copy = dispatch;

    // tables hold no reference to the loader
    drop(loader);
    assert_eq!(copy, dispatch);
    assert_eq!(address(copy.create_instance), noop_address());
}

#[test]
fn test_independent_loaders_on_threads() {
    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|i| {
                scope.spawn(move || {
                    let loader = if i % 2 == 0 {
                        Loader::from_source(core_driver())
                    } else {
                        Loader::from_source(minimal_driver())
                    };
                    resolve_loader_dispatch(&loader).unwrap().resolved_count()
                })
            })
            .collect();

        let counts: Vec<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let core = LoaderDispatch::symbols().len();
        assert_eq!(counts, vec![core, 1, core, 1]);
    });
}
