//! Vulkan core - instance and physical device selection.

use std::ffi::{CStr, CString};

use ash::{Entry, Instance, vk};
use raw_window_handle::HasDisplayHandle;
use rift_core::log;
use winit::window::Window;

use crate::renderer::RendererConfig;
use crate::swapchain::SurfaceWindow;

/// Validation layers to enable when the `validation` feature is on.
#[cfg(feature = "validation")]
const VALIDATION_LAYERS: &[&CStr] = &[c"VK_LAYER_KHRONOS_validation"];

/// Scoring weights for physical device selection.
const SCORE_DISCRETE_GPU: u32 = 10000;
const SCORE_INTEGRATED_GPU: u32 = 1000;
const SCORE_PER_GB_VRAM: u32 = 100;

/// Physical device plus the cached properties every allocation consults.
#[derive(Clone)]
pub struct PhysicalDevice {
    handle: vk::PhysicalDevice,
    properties: vk::PhysicalDeviceProperties,
    memory_properties: vk::PhysicalDeviceMemoryProperties,

    /// Queue family used for both graphics and present.
    queue_family: u32,
}

impl PhysicalDevice {
    pub fn handle(&self) -> vk::PhysicalDevice {
        self.handle
    }

    pub fn properties(&self) -> &vk::PhysicalDeviceProperties {
        &self.properties
    }

    pub fn memory_properties(&self) -> &vk::PhysicalDeviceMemoryProperties {
        &self.memory_properties
    }

    pub fn queue_family(&self) -> u32 {
        self.queue_family
    }
}

/// Global entry point for Vulkan initialization: loader, instance and the
/// optional validation messenger.
pub struct VkCore {
    entry: Entry,
    instance: Instance,

    #[cfg(feature = "validation")]
    debug_utils: Option<ash::ext::debug_utils::Instance>,
    #[cfg(feature = "validation")]
    debug_messenger: Option<vk::DebugUtilsMessengerEXT>,
}

impl VkCore {
    #[profiling::function]
    pub fn new(window: &Window, config: &RendererConfig) -> Result<Self, anyhow::Error> {
        // Load Vulkan dynamically
        let entry = unsafe { Entry::load()? };

        let display_handle = window.display_handle()?.as_raw();
        let instance = create_instance(&entry, display_handle, config)?;

        #[cfg(feature = "validation")]
        let (debug_utils, debug_messenger) = setup_debug_messenger(&entry, &instance)?;

        Ok(Self {
            entry,
            instance,
            #[cfg(feature = "validation")]
            debug_utils,
            #[cfg(feature = "validation")]
            debug_messenger,
        })
    }

    pub fn entry(&self) -> &Entry {
        &self.entry
    }

    pub fn instance(&self) -> &Instance {
        &self.instance
    }
}

impl Drop for VkCore {
    fn drop(&mut self) {
        unsafe {
            #[cfg(feature = "validation")]
            if let (Some(debug_utils), Some(messenger)) = (&self.debug_utils, self.debug_messenger)
            {
                debug_utils.destroy_debug_utils_messenger(messenger, None);
            }

            self.instance.destroy_instance(None);
        }
    }
}

/// Create the Vulkan instance with windowing extensions and validation
/// layers.
fn create_instance(
    entry: &Entry,
    display_handle: raw_window_handle::RawDisplayHandle,
    config: &RendererConfig,
) -> Result<Instance, anyhow::Error> {
    let app_name = CString::new(config.app_name.as_str())?;

    let app_info = vk::ApplicationInfo::default()
        .application_name(&app_name)
        .application_version(vk::make_api_version(0, 1, 0, 0))
        .engine_name(c"rift")
        .engine_version(vk::make_api_version(0, 0, 1, 0))
        .api_version(vk::API_VERSION_1_1);

    let mut extensions = ash_window::enumerate_required_extensions(display_handle)?.to_vec();

    #[cfg(feature = "validation")]
    extensions.push(ash::ext::debug_utils::NAME.as_ptr());

    #[cfg(feature = "validation")]
    let layer_pointers: Vec<*const std::ffi::c_char> =
        VALIDATION_LAYERS.iter().map(|s| s.as_ptr()).collect();

    let mut create_info = vk::InstanceCreateInfo::default()
        .application_info(&app_info)
        .enabled_extension_names(&extensions);

    #[cfg(feature = "validation")]
    {
        create_info = create_info.enabled_layer_names(&layer_pointers);
    }

    let instance = unsafe { entry.create_instance(&create_info, None)? };
    Ok(instance)
}

/// Setup the debug messenger for validation layers.
#[cfg(feature = "validation")]
fn setup_debug_messenger(
    entry: &Entry,
    instance: &Instance,
) -> Result<
    (
        Option<ash::ext::debug_utils::Instance>,
        Option<vk::DebugUtilsMessengerEXT>,
    ),
    vk::Result,
> {
    let debug_utils = ash::ext::debug_utils::Instance::new(entry, instance);

    let create_info = vk::DebugUtilsMessengerCreateInfoEXT::default()
        .message_severity(
            vk::DebugUtilsMessageSeverityFlagsEXT::ERROR
                | vk::DebugUtilsMessageSeverityFlagsEXT::WARNING,
        )
        .message_type(
            vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
                | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION
                | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE,
        )
        .pfn_user_callback(Some(vulkan_debug_callback));

    let messenger = unsafe { debug_utils.create_debug_utils_messenger(&create_info, None)? };

    Ok((Some(debug_utils), Some(messenger)))
}

/// Vulkan debug callback function.
#[cfg(feature = "validation")]
unsafe extern "system" fn vulkan_debug_callback(
    message_severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    message_type: vk::DebugUtilsMessageTypeFlagsEXT,
    p_callback_data: *const vk::DebugUtilsMessengerCallbackDataEXT<'_>,
    _user_data: *mut std::ffi::c_void,
) -> vk::Bool32 {
    let callback_data = unsafe { *p_callback_data };
    let message = unsafe { CStr::from_ptr(callback_data.p_message) }.to_string_lossy();

    let type_str = match message_type {
        vk::DebugUtilsMessageTypeFlagsEXT::GENERAL => "[General]",
        vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION => "[Validation]",
        vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE => "[Performance]",
        _ => "[Unknown]",
    };

    match message_severity {
        vk::DebugUtilsMessageSeverityFlagsEXT::ERROR => {
            log::error!("Vulkan {}: {}", type_str, message);
        }
        vk::DebugUtilsMessageSeverityFlagsEXT::WARNING => {
            log::warn!("Vulkan {}: {}", type_str, message);
        }
        _ => {
            log::debug!("Vulkan {}: {}", type_str, message);
        }
    }

    vk::FALSE
}

/// Find a queue family that supports both graphics and present.
///
/// The renderer records and presents on a single queue; devices that split
/// those across families are skipped.
fn find_queue_family(
    instance: &Instance,
    physical_device: vk::PhysicalDevice,
    surface: &SurfaceWindow,
) -> Option<u32> {
    let queue_families =
        unsafe { instance.get_physical_device_queue_family_properties(physical_device) };

    for (index, family) in queue_families.iter().enumerate() {
        let index = index as u32;

        if !family.queue_flags.contains(vk::QueueFlags::GRAPHICS) {
            continue;
        }

        let present_support = unsafe {
            surface
                .surface_loader()
                .get_physical_device_surface_support(physical_device, index, surface.surface())
                .unwrap_or(false)
        };

        if present_support {
            return Some(index);
        }
    }

    None
}

/// Calculate a score for the physical device (higher is better).
fn score_physical_device(
    properties: &vk::PhysicalDeviceProperties,
    memory_properties: &vk::PhysicalDeviceMemoryProperties,
) -> u32 {
    let mut score = 0u32;

    // Device type scoring (discrete > integrated > others)
    match properties.device_type {
        vk::PhysicalDeviceType::DISCRETE_GPU => score += SCORE_DISCRETE_GPU,
        vk::PhysicalDeviceType::INTEGRATED_GPU => score += SCORE_INTEGRATED_GPU,
        vk::PhysicalDeviceType::VIRTUAL_GPU => score += 500,
        vk::PhysicalDeviceType::CPU => score += 100,
        _ => score += 10,
    }

    // VRAM scoring (total device-local memory)
    let vram_bytes: u64 = memory_properties.memory_heaps
        [..memory_properties.memory_heap_count as usize]
        .iter()
        .filter(|heap| heap.flags.contains(vk::MemoryHeapFlags::DEVICE_LOCAL))
        .map(|heap| heap.size)
        .sum();

    let vram_gb = (vram_bytes / (1024 * 1024 * 1024)) as u32;
    score += vram_gb * SCORE_PER_GB_VRAM;

    score
}

/// Select the best physical device that can render and present.
pub fn select_physical_device(
    instance: &Instance,
    surface: &SurfaceWindow,
) -> Result<PhysicalDevice, anyhow::Error> {
    let physical_devices = unsafe { instance.enumerate_physical_devices()? };

    if physical_devices.is_empty() {
        return Err(anyhow::anyhow!("No Vulkan-capable GPU found"));
    }

    let mut best_device = None;
    let mut best_device_score = 0u32;

    for device in physical_devices {
        let properties = unsafe { instance.get_physical_device_properties(device) };
        let memory_properties = unsafe { instance.get_physical_device_memory_properties(device) };

        let device_name =
            unsafe { CStr::from_ptr(properties.device_name.as_ptr()).to_string_lossy() };

        let Some(queue_family) = find_queue_family(instance, device, surface) else {
            log::info!("Skipping GPU without a graphics+present queue: {device_name}");
            continue;
        };

        let score = score_physical_device(&properties, &memory_properties);

        log::info!(
            "Found GPU: {} (score: {}, type: {:?})",
            device_name,
            score,
            properties.device_type
        );

        if score > best_device_score {
            best_device = Some(PhysicalDevice {
                handle: device,
                properties,
                memory_properties,
                queue_family,
            });
            best_device_score = score;
        }
    }

    best_device.ok_or_else(|| anyhow::anyhow!("No suitable GPU found"))
}
