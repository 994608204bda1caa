//! Device-level entry point dispatch.
//!
//! The renderer requires a fixed set of device functions. They are resolved
//! exactly once, right after logical device creation, into a table of typed
//! function pointers. A driver missing any required entry point fails device
//! creation with the offending name instead of crashing mid-frame.

use std::ffi::CStr;

use ash::vk;

use crate::paste;

/// A required entry point could not be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveError {
    MissingEntryPoint(&'static str),
}

impl std::fmt::Display for ResolveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolveError::MissingEntryPoint(name) => {
                write!(f, "Device does not expose required entry point {}", name)
            }
        }
    }
}

impl std::error::Error for ResolveError {}

macro_rules! device_fns {
    ($($field:ident => $vkname:ident),+ $(,)?) => {
        paste! {
            /// Device entry points, resolved once per logical device.
            ///
            /// Every field is a valid function pointer for the device the
            /// table was resolved against; `resolve` refuses to construct a
            /// partially-filled table.
            #[derive(Clone, Copy, Debug)]
            pub struct DeviceFns {
                $(pub $field: vk::[<PFN_ $vkname>],)+
            }

            impl DeviceFns {
                /// Names of every required entry point, in resolution order.
                pub const NAMES: &'static [&'static str] = &[
                    $(stringify!($vkname),)+
                ];

                /// Resolve the whole table through `load`, typically
                /// `vkGetDeviceProcAddr` for a freshly created device.
                pub fn resolve<L>(mut load: L) -> Result<Self, ResolveError>
                where
                    L: FnMut(&CStr) -> vk::PFN_vkVoidFunction,
                {
                    $(
                        let $field = {
                            const NAME: &CStr = unsafe {
                                CStr::from_bytes_with_nul_unchecked(
                                    concat!(stringify!($vkname), "\0").as_bytes(),
                                )
                            };
                            load(NAME).ok_or(ResolveError::MissingEntryPoint(
                                stringify!($vkname),
                            ))?
                        };
                    )+

                    // SAFETY: each pointer was returned by the loader for
                    // exactly this entry point name, so it has the prototype
                    // its PFN type declares.
                    Ok(Self {
                        $($field: unsafe {
                            std::mem::transmute::<
                                unsafe extern "system" fn(),
                                vk::[<PFN_ $vkname>],
                            >($field)
                        },)+
                    })
                }
            }
        }
    };
}

device_fns! {
    get_device_queue => vkGetDeviceQueue,
    create_swapchain_khr => vkCreateSwapchainKHR,
    get_swapchain_images_khr => vkGetSwapchainImagesKHR,
    destroy_swapchain_khr => vkDestroySwapchainKHR,
    create_image_view => vkCreateImageView,
    create_framebuffer => vkCreateFramebuffer,
    create_render_pass => vkCreateRenderPass,
    create_pipeline_layout => vkCreatePipelineLayout,
    create_graphics_pipelines => vkCreateGraphicsPipelines,
    create_shader_module => vkCreateShaderModule,
    create_command_pool => vkCreateCommandPool,
    allocate_command_buffers => vkAllocateCommandBuffers,
    create_buffer => vkCreateBuffer,
    get_buffer_memory_requirements => vkGetBufferMemoryRequirements,
    allocate_memory => vkAllocateMemory,
    bind_buffer_memory => vkBindBufferMemory,
    map_memory => vkMapMemory,
    unmap_memory => vkUnmapMemory,
    destroy_buffer => vkDestroyBuffer,
    free_memory => vkFreeMemory,
    acquire_next_image_khr => vkAcquireNextImageKHR,
    cmd_begin_render_pass => vkCmdBeginRenderPass,
    cmd_execute_commands => vkCmdExecuteCommands,
    cmd_end_render_pass => vkCmdEndRenderPass,
    end_command_buffer => vkEndCommandBuffer,
    queue_submit => vkQueueSubmit,
    queue_present_khr => vkQueuePresentKHR,
    wait_for_fences => vkWaitForFences,
    reset_fences => vkResetFences,
    create_semaphore => vkCreateSemaphore,
    destroy_semaphore => vkDestroySemaphore,
    create_fence => vkCreateFence,
    destroy_fence => vkDestroyFence,
    begin_command_buffer => vkBeginCommandBuffer,
    cmd_bind_pipeline => vkCmdBindPipeline,
    cmd_bind_vertex_buffers => vkCmdBindVertexBuffers,
    cmd_draw => vkCmdDraw,
    destroy_command_pool => vkDestroyCommandPool,
    destroy_image_view => vkDestroyImageView,
    destroy_framebuffer => vkDestroyFramebuffer,
    destroy_render_pass => vkDestroyRenderPass,
    destroy_shader_module => vkDestroyShaderModule,
    destroy_pipeline => vkDestroyPipeline,
    destroy_pipeline_layout => vkDestroyPipelineLayout,
    create_image => vkCreateImage,
    get_image_memory_requirements => vkGetImageMemoryRequirements,
    bind_image_memory => vkBindImageMemory,
    cmd_pipeline_barrier => vkCmdPipelineBarrier,
    cmd_copy_buffer_to_image => vkCmdCopyBufferToImage,
    queue_wait_idle => vkQueueWaitIdle,
    destroy_image => vkDestroyImage,
    cmd_bind_descriptor_sets => vkCmdBindDescriptorSets,
    create_sampler => vkCreateSampler,
    destroy_sampler => vkDestroySampler,
    create_descriptor_pool => vkCreateDescriptorPool,
    destroy_descriptor_pool => vkDestroyDescriptorPool,
    create_descriptor_set_layout => vkCreateDescriptorSetLayout,
    allocate_descriptor_sets => vkAllocateDescriptorSets,
    update_descriptor_sets => vkUpdateDescriptorSets,
}

#[cfg(test)]
mod tests {
    use super::*;

    unsafe extern "system" fn stub() {}

    #[test]
    fn resolve_with_complete_loader() {
        let mut resolved = Vec::new();
        let fns = DeviceFns::resolve(|name| {
            resolved.push(name.to_str().unwrap().to_owned());
            Some(stub as unsafe extern "system" fn())
        })
        .unwrap();

        // Every enumerated name was requested, exactly once, in order.
        assert_eq!(
            resolved.iter().map(String::as_str).collect::<Vec<_>>(),
            DeviceFns::NAMES
        );

        // Spot-check that resolution produced callable pointers.
        let stub_addr = stub as unsafe extern "system" fn() as usize;
        assert_eq!(fns.map_memory as usize, stub_addr);
        assert_eq!(fns.queue_wait_idle as usize, stub_addr);
        assert_eq!(fns.update_descriptor_sets as usize, stub_addr);
    }

    #[test]
    fn resolve_fails_on_missing_entry_point() {
        let err = DeviceFns::resolve(|name| {
            if name.to_str().unwrap() == "vkAcquireNextImageKHR" {
                None
            } else {
                Some(stub as unsafe extern "system" fn())
            }
        })
        .unwrap_err();

        assert_eq!(err, ResolveError::MissingEntryPoint("vkAcquireNextImageKHR"));
    }

    #[test]
    fn entry_point_list_has_no_duplicates() {
        let mut names = DeviceFns::NAMES.to_vec();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), DeviceFns::NAMES.len());
    }
}
