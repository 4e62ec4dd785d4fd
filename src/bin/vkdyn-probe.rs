/*
 *  bin/vkdyn-probe.rs
 *
 *  vkdyn - Vulkan dynamic loading shim
 *  (c) 2020-26 Stuart Hunter
 *
 *  Walk the dispatch tiers against whatever driver is installed
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

use std::path::PathBuf;
use std::ptr;

use anyhow::{anyhow, Context, Result};
use ash::vk;
use clap::{Arg, ArgAction, ArgMatches, Command};
use env_logger::Env;
use log::{debug, info, warn};

use vkdyn::config::{self, Config, LoaderConfig};
use vkdyn::{
    cast_proc, DeviceDispatch, InstanceDispatch, Loader, LoaderDispatch, SymbolInfo, Tier,
};

include!(concat!(env!("OUT_DIR"), "/build_info.rs"));

fn cli() -> Command {
    Command::new("vkdyn-probe")
        .version(env!("CARGO_PKG_VERSION"))
        .author(env!("CARGO_PKG_AUTHORS"))
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .arg(Arg::new("debug")
            .action(ArgAction::SetTrue)
            .long("debug")
            .short('v')
            .alias("verbose")
            .global(true)
            .help("Enable debug log level"))
        .arg(Arg::new("log-level")
            .long("log-level")
            .value_parser(["error", "warn", "info", "debug", "trace", "off"])
            .global(true)
            .help("Log level, overrides the config file"))
        .arg(Arg::new("config")
            .short('c')
            .long("config")
            .value_parser(clap::value_parser!(PathBuf))
            .global(true)
            .help("vkdyn config file (default: first of ~/.config/vkdyn/config.yaml, ~/.config/vkdyn.yaml, ./vkdyn.yaml)"))
        .arg(Arg::new("library")
            .short('l')
            .long("library")
            .action(ArgAction::Append)
            .global(true)
            .help("Driver library name or path, repeat to add fallbacks"))
        .arg(Arg::new("dump-config")
            .long("dump-config")
            .action(ArgAction::SetTrue)
            .global(true)
            .help("Print the effective configuration as YAML and exit"))
        .subcommand_required(true)
        .subcommand(Command::new("symbols")
            .about("List the compiled-in symbol catalog")
            .arg(Arg::new("tier")
                .short('t')
                .long("tier")
                .value_parser(["loader", "instance", "device", "all"])
                .default_value("all")
                .help("Dispatch tier to list"))
            .arg(Arg::new("core-only")
                .long("core-only")
                .action(ArgAction::SetTrue)
                .help("Skip extension symbols")))
        .subcommand(Command::new("instance")
            .about("Resolve the loader and instance tiers against a fresh VkInstance"))
        .subcommand(Command::new("devices")
            .about("List physical devices, optionally resolving the device tier")
            .arg(Arg::new("create-device")
                .long("create-device")
                .action(ArgAction::SetTrue)
                .help("Create a VkDevice on each physical device and resolve its dispatch")))
        .after_help("vkdyn-probe:\
            \n\tLoads the Vulkan driver library at runtime and reports\
            \n\thow many entry points each dispatch tier resolves.\
            \n\n\
            ENVIRONMENT:\
            \n\tVKDYN_LIBRARY\tdriver library tried before all others\
            \n\tRUST_LOG\tenv_logger filter")
}

fn main() -> Result<()> {
    let matches = cli().get_matches();

    let cfg = effective_config(&matches)?;

    let default_level = if matches.get_flag("debug") {
        "debug"
    } else {
        cfg.log_level.as_deref().unwrap_or("info")
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_level))
        .format_timestamp_secs()
        .init();

    info!("{} v.{} built {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"), BUILD_DATE);

    if matches.get_flag("dump-config") {
        print!("{}", serde_yaml::to_string(&cfg).context("serializing config")?);
        return Ok(());
    }

    let loader_config = cfg
        .loader
        .clone()
        .unwrap_or_default()
        .with_override(std::env::var(config::LIBRARY_ENV_VAR).ok());

    match matches.subcommand() {
        Some(("symbols", sub)) => {
            let tier = sub.get_one::<String>("tier").map(String::as_str).unwrap_or("all");
            list_symbols(tier, sub.get_flag("core-only"));
            Ok(())
        }
        Some(("instance", _)) => probe_instance(&loader_config),
        Some(("devices", sub)) => probe_devices(&loader_config, sub.get_flag("create-device")),
        _ => Err(anyhow!("no subcommand given")),
    }
}

/// Config file, then command line overrides
fn effective_config(matches: &ArgMatches) -> Result<Config> {
    let path = matches.get_one::<PathBuf>("config");
    let mut cfg = config::load(path.map(PathBuf::as_path)).context("loading config")?;

    let libraries: Vec<String> = matches
        .get_many::<String>("library")
        .map(|values| values.cloned().collect())
        .unwrap_or_default();
    config::apply_overrides(&mut cfg, matches.get_one::<String>("log-level").cloned(), libraries);
    config::validate(&cfg).context("validating config")?;

    Ok(cfg)
}

fn list_symbols(tier: &str, core_only: bool) {
    let tiers: Vec<(Tier, Vec<SymbolInfo>)> = vec![
        (LoaderDispatch::TIER, LoaderDispatch::symbols()),
        (InstanceDispatch::TIER, InstanceDispatch::symbols()),
        (DeviceDispatch::TIER, DeviceDispatch::symbols()),
    ];

    for (t, symbols) in tiers {
        if tier != "all" && tier != t.to_string() {
            continue;
        }
        println!("[{}] bootstrap {}", t, t.bootstrap_symbol().to_string_lossy());
        let mut shown = 0;
        for symbol in symbols.iter().filter(|s| !core_only || s.is_core()) {
            println!("  {:<56} {}", symbol.api_name(), symbol.group);
            shown += 1;
        }
        println!("  {} of {} symbols", shown, symbols.len());
    }
}

fn open_loader(loader_config: &LoaderConfig) -> Result<Loader> {
    let loader = Loader::with_config(loader_config).context("opening Vulkan driver library")?;
    info!("Driver library: {}", loader.name().unwrap_or("?"));
    Ok(loader)
}

/// Instance created with no layers or extensions; caller destroys it
fn create_instance(dispatch: &LoaderDispatch, api_version: u32) -> Result<vk::Instance> {
    // SAFETY: field holds vkCreateInstance when non-null
    let create = unsafe { cast_proc::<vk::PFN_vkCreateInstance>(dispatch.create_instance) }
        .ok_or_else(|| anyhow!("driver does not export vkCreateInstance"))?;

    let app_info = vk::ApplicationInfo::default()
        .application_name(c"vkdyn-probe")
        .engine_name(c"vkdyn")
        .api_version(api_version);
    let create_info = vk::InstanceCreateInfo::default().application_info(&app_info);

    let mut instance = vk::Instance::null();
    let result = unsafe { create(&create_info, ptr::null(), &mut instance) };
    if result != vk::Result::SUCCESS {
        return Err(anyhow!("vkCreateInstance failed: {:?}", result));
    }
    Ok(instance)
}

fn destroy_instance(instance: vk::Instance, dispatch: &InstanceDispatch) {
    match unsafe { cast_proc::<vk::PFN_vkDestroyInstance>(dispatch.destroy_instance) } {
        Some(destroy) => unsafe { destroy(instance, ptr::null()) },
        None => warn!("vkDestroyInstance not resolved, leaking instance"),
    }
}

fn instance_version(dispatch: &LoaderDispatch) -> u32 {
    #[cfg(feature = "vk_1_1")]
    {
        if let Some(enumerate) =
            unsafe { cast_proc::<vk::PFN_vkEnumerateInstanceVersion>(dispatch.enumerate_instance_version) }
        {
            let mut version = 0;
            if unsafe { enumerate(&mut version) } == vk::Result::SUCCESS {
                return version;
            }
        }
    }
    #[cfg(not(feature = "vk_1_1"))]
    let _ = dispatch;
    vk::API_VERSION_1_0
}

fn version_string(version: u32) -> String {
    format!(
        "{}.{}.{}",
        vk::api_version_major(version),
        vk::api_version_minor(version),
        vk::api_version_patch(version)
    )
}

fn report(tier: Tier, resolved: usize, total: usize) {
    println!("{:<9} {:>4} / {:<4} symbols resolved", tier, resolved, total);
}

fn probe_instance(loader_config: &LoaderConfig) -> Result<()> {
    let loader = open_loader(loader_config)?;
    let loader_dispatch = LoaderDispatch::new(&loader)?;
    report(Tier::Loader, loader_dispatch.resolved_count(), LoaderDispatch::symbols().len());
    let api_version = instance_version(&loader_dispatch);
    println!("instance version {}", version_string(api_version));

    let instance = create_instance(&loader_dispatch, api_version)?;
    let instance_dispatch = InstanceDispatch::new(instance, &loader_dispatch)?;
    report(Tier::Instance, instance_dispatch.resolved_count(), InstanceDispatch::symbols().len());

    destroy_instance(instance, &instance_dispatch);
    Ok(())
}

fn probe_devices(loader_config: &LoaderConfig, create_devices: bool) -> Result<()> {
    let loader = open_loader(loader_config)?;
    let loader_dispatch = LoaderDispatch::new(&loader)?;
    let api_version = instance_version(&loader_dispatch);
    let instance = create_instance(&loader_dispatch, api_version)?;
    let instance_dispatch = InstanceDispatch::new(instance, &loader_dispatch)?;

    let result = list_devices(instance, &instance_dispatch, api_version, create_devices);
    destroy_instance(instance, &instance_dispatch);
    result
}

fn list_devices(
    instance: vk::Instance,
    dispatch: &InstanceDispatch,
    api_version: u32,
    create_devices: bool,
) -> Result<()> {
    let enumerate = unsafe {
        cast_proc::<vk::PFN_vkEnumeratePhysicalDevices>(dispatch.enumerate_physical_devices)
    }
    .ok_or_else(|| anyhow!("vkEnumeratePhysicalDevices not resolved"))?;

    let mut count = 0;
    let result = unsafe { enumerate(instance, &mut count, ptr::null_mut()) };
    if result != vk::Result::SUCCESS {
        return Err(anyhow!("vkEnumeratePhysicalDevices failed: {:?}", result));
    }
    let mut devices = vec![vk::PhysicalDevice::null(); count as usize];
    let result = unsafe { enumerate(instance, &mut count, devices.as_mut_ptr()) };
    if result != vk::Result::SUCCESS && result != vk::Result::INCOMPLETE {
        return Err(anyhow!("vkEnumeratePhysicalDevices failed: {:?}", result));
    }
    devices.truncate(count as usize);

    if devices.is_empty() {
        println!("no physical devices");
        return Ok(());
    }

    let properties = unsafe {
        cast_proc::<vk::PFN_vkGetPhysicalDeviceProperties>(dispatch.get_physical_device_properties)
    }
    .ok_or_else(|| anyhow!("vkGetPhysicalDeviceProperties not resolved"))?;

    for (index, physical) in devices.iter().enumerate() {
        let mut props = vk::PhysicalDeviceProperties::default();
        unsafe { properties(*physical, &mut props) };
        let name = props
            .device_name_as_c_str()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        println!(
            "#{} {} ({:?}) api {} driver {:#x}",
            index,
            name,
            props.device_type,
            version_string(props.api_version),
            props.driver_version
        );

        if driver_properties_supported(api_version, props.api_version) {
            match driver_description(*physical, dispatch) {
                Some(driver) => println!("   driver {}", driver),
                None => debug!("device #{}: no driver properties reported", index),
            }
        } else {
            debug!("device #{}: driver properties need Vulkan 1.2 on instance and device", index);
        }

        if create_devices {
            if let Err(err) = probe_device(*physical, dispatch) {
                warn!("device #{}: {:#}", index, err);
            }
        }
    }
    Ok(())
}

/// VkPhysicalDeviceDriverProperties is core 1.2; both the instance and the
/// device have to be at least that
fn driver_properties_supported(instance_version: u32, device_version: u32) -> bool {
    cfg!(feature = "vk_1_2")
        && instance_version >= vk::API_VERSION_1_2
        && device_version >= vk::API_VERSION_1_2
}

/// Driver name and info via vkGetPhysicalDeviceProperties2, when the
/// instance resolved it
#[cfg(feature = "vk_1_2")]
fn driver_description(physical: vk::PhysicalDevice, dispatch: &InstanceDispatch) -> Option<String> {
    let properties2 = unsafe {
        cast_proc::<vk::PFN_vkGetPhysicalDeviceProperties2>(dispatch.get_physical_device_properties2)
    }?;

    let mut driver = vk::PhysicalDeviceDriverProperties::default();
    let mut props = vk::PhysicalDeviceProperties2::default().push_next(&mut driver);
    unsafe { properties2(physical, &mut props) };

    let name = driver.driver_name_as_c_str().ok()?.to_string_lossy().into_owned();
    let info = driver.driver_info_as_c_str().ok()?.to_string_lossy().into_owned();
    (!name.is_empty()).then(|| format!("{} {} ({:?})", name, info, driver.driver_id))
}

#[cfg(not(feature = "vk_1_2"))]
fn driver_description(_physical: vk::PhysicalDevice, _dispatch: &InstanceDispatch) -> Option<String> {
    None
}

fn probe_device(physical: vk::PhysicalDevice, dispatch: &InstanceDispatch) -> Result<()> {
    let create = unsafe { cast_proc::<vk::PFN_vkCreateDevice>(dispatch.create_device) }
        .ok_or_else(|| anyhow!("vkCreateDevice not resolved"))?;

    let priorities = [1.0f32];
    let queue_info = [vk::DeviceQueueCreateInfo::default()
        .queue_family_index(0)
        .queue_priorities(&priorities)];
    let create_info = vk::DeviceCreateInfo::default().queue_create_infos(&queue_info);

    let mut device = vk::Device::null();
    let result = unsafe { create(physical, &create_info, ptr::null(), &mut device) };
    if result != vk::Result::SUCCESS {
        return Err(anyhow!("vkCreateDevice failed: {:?}", result));
    }
    debug!("Created device {:?}", device);

    report_device(device, dispatch)
}

/// Resolve and report the device tier, then destroy `device` either way
fn report_device(device: vk::Device, dispatch: &InstanceDispatch) -> Result<()> {
    let device_dispatch = match DeviceDispatch::new(device, dispatch) {
        Ok(table) => table,
        Err(err) => {
            destroy_device(device, dispatch, None);
            return Err(err).context("resolving device dispatch");
        }
    };
    report(Tier::Device, device_dispatch.resolved_count(), DeviceDispatch::symbols().len());

    destroy_device(device, dispatch, Some(&device_dispatch));
    Ok(())
}

/// vkDestroyDevice from the device tier, or straight from the instance's
/// vkGetDeviceProcAddr when the device tier did not resolve
fn destroy_device(device: vk::Device, dispatch: &InstanceDispatch, device_dispatch: Option<&DeviceDispatch>) {
    let address = device_dispatch
        .and_then(|table| table.destroy_device)
        .or_else(|| {
            dispatch
                .get_device_proc_addr
                .and_then(|gdpa| unsafe { gdpa(device, c"vkDestroyDevice".as_ptr()) })
        });

    match unsafe { cast_proc::<vk::PFN_vkDestroyDevice>(address) } {
        Some(destroy) => unsafe { destroy(device, ptr::null()) },
        None => warn!("vkDestroyDevice not resolved, leaking device"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::c_char;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use ash::vk::Handle;

    type RawProc = unsafe extern "system" fn();

    static DESTROYED: AtomicUsize = AtomicUsize::new(0);

    unsafe extern "system" fn enumerate_none(
        _instance: vk::Instance,
        p_count: *mut u32,
        _p_devices: *mut vk::PhysicalDevice,
    ) -> vk::Result {
        unsafe { *p_count = 0 };
        vk::Result::SUCCESS
    }

    unsafe extern "system" fn destroy_device_counted(
        _device: vk::Device,
        _p_allocator: *const vk::AllocationCallbacks<'_>,
    ) {
        DESTROYED.fetch_add(1, Ordering::SeqCst);
    }

    /// Answers vkDestroyDevice but not itself, so the device tier fails
    unsafe extern "system" fn gdpa_destroy_only(
        _device: vk::Device,
        p_name: *const c_char,
    ) -> vk::PFN_vkVoidFunction {
        let name = unsafe { std::ffi::CStr::from_ptr(p_name) };
        (name == c"vkDestroyDevice").then(|| unsafe {
            std::mem::transmute::<vk::PFN_vkDestroyDevice, RawProc>(destroy_device_counted)
        })
    }

    #[test]
    fn test_driver_properties_need_vulkan_1_2() {
        assert!(!driver_properties_supported(vk::API_VERSION_1_0, vk::API_VERSION_1_3));
        assert!(!driver_properties_supported(vk::API_VERSION_1_3, vk::API_VERSION_1_1));
        assert_eq!(
            driver_properties_supported(vk::API_VERSION_1_2, vk::API_VERSION_1_2),
            cfg!(feature = "vk_1_2")
        );
    }

    #[test]
    fn test_no_physical_devices_needs_no_properties_call() {
        let enumerate = unsafe {
            std::mem::transmute::<vk::PFN_vkEnumeratePhysicalDevices, RawProc>(enumerate_none)
        };
        let dispatch = InstanceDispatch {
            enumerate_physical_devices: Some(enumerate),
            ..Default::default()
        };
        assert!(dispatch.get_physical_device_properties.is_none());

        let instance = vk::Instance::from_raw(0x1000);
        assert!(list_devices(instance, &dispatch, vk::API_VERSION_1_0, false).is_ok());
    }

    #[test]
    fn test_failed_device_tier_still_destroys_device() {
        let dispatch = InstanceDispatch {
            get_device_proc_addr: Some(gdpa_destroy_only),
            ..Default::default()
        };
        let before = DESTROYED.load(Ordering::SeqCst);

        let err = report_device(vk::Device::from_raw(0x2000), &dispatch).unwrap_err();
        assert!(format!("{:#}", err).contains("incompatible driver"));
        assert_eq!(DESTROYED.load(Ordering::SeqCst), before + 1);
    }
}
