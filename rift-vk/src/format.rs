//! Texel format metadata.
//!
//! Pure lookups over `vk::Format`: storage size of one texel block, and the
//! non-color-managed (UNORM) sibling of sRGB formats. Both tables mirror the
//! Vulkan format enumeration and must stay in sync with it.

use ash::vk;

/// Size in bytes of one texel block of `format`.
///
/// Total over every `vk::Format` value: identifiers outside the enumeration
/// (including `UNDEFINED`) report 4 bytes rather than failing, so callers
/// sizing uploads never have to handle an error path here.
pub fn texel_block_size(format: vk::Format) -> u32 {
    match format {
        vk::Format::R4G4_UNORM_PACK8
        | vk::Format::R8_UNORM
        | vk::Format::R8_SNORM
        | vk::Format::R8_USCALED
        | vk::Format::R8_SSCALED
        | vk::Format::R8_UINT
        | vk::Format::R8_SINT
        | vk::Format::R8_SRGB => 1,

        vk::Format::R10X6_UNORM_PACK16
        | vk::Format::R12X4_UNORM_PACK16
        | vk::Format::A4R4G4B4_UNORM_PACK16
        | vk::Format::A4B4G4R4_UNORM_PACK16
        | vk::Format::R4G4B4A4_UNORM_PACK16
        | vk::Format::B4G4R4A4_UNORM_PACK16
        | vk::Format::R5G6B5_UNORM_PACK16
        | vk::Format::B5G6R5_UNORM_PACK16
        | vk::Format::R5G5B5A1_UNORM_PACK16
        | vk::Format::B5G5R5A1_UNORM_PACK16
        | vk::Format::A1R5G5B5_UNORM_PACK16
        | vk::Format::R8G8_UNORM
        | vk::Format::R8G8_SNORM
        | vk::Format::R8G8_USCALED
        | vk::Format::R8G8_SSCALED
        | vk::Format::R8G8_UINT
        | vk::Format::R8G8_SINT
        | vk::Format::R8G8_SRGB
        | vk::Format::R16_UNORM
        | vk::Format::R16_SNORM
        | vk::Format::R16_USCALED
        | vk::Format::R16_SSCALED
        | vk::Format::R16_UINT
        | vk::Format::R16_SINT
        | vk::Format::R16_SFLOAT => 2,

        vk::Format::R8G8B8_UNORM
        | vk::Format::R8G8B8_SNORM
        | vk::Format::R8G8B8_USCALED
        | vk::Format::R8G8B8_SSCALED
        | vk::Format::R8G8B8_UINT
        | vk::Format::R8G8B8_SINT
        | vk::Format::R8G8B8_SRGB
        | vk::Format::B8G8R8_UNORM
        | vk::Format::B8G8R8_SNORM
        | vk::Format::B8G8R8_USCALED
        | vk::Format::B8G8R8_SSCALED
        | vk::Format::B8G8R8_UINT
        | vk::Format::B8G8R8_SINT
        | vk::Format::B8G8R8_SRGB => 3,

        vk::Format::R10X6G10X6_UNORM_2PACK16
        | vk::Format::R12X4G12X4_UNORM_2PACK16
        | vk::Format::R8G8B8A8_UNORM
        | vk::Format::R8G8B8A8_SNORM
        | vk::Format::R8G8B8A8_USCALED
        | vk::Format::R8G8B8A8_SSCALED
        | vk::Format::R8G8B8A8_UINT
        | vk::Format::R8G8B8A8_SINT
        | vk::Format::R8G8B8A8_SRGB
        | vk::Format::B8G8R8A8_UNORM
        | vk::Format::B8G8R8A8_SNORM
        | vk::Format::B8G8R8A8_USCALED
        | vk::Format::B8G8R8A8_SSCALED
        | vk::Format::B8G8R8A8_UINT
        | vk::Format::B8G8R8A8_SINT
        | vk::Format::B8G8R8A8_SRGB
        | vk::Format::A8B8G8R8_UNORM_PACK32
        | vk::Format::A8B8G8R8_SNORM_PACK32
        | vk::Format::A8B8G8R8_USCALED_PACK32
        | vk::Format::A8B8G8R8_SSCALED_PACK32
        | vk::Format::A8B8G8R8_UINT_PACK32
        | vk::Format::A8B8G8R8_SINT_PACK32
        | vk::Format::A8B8G8R8_SRGB_PACK32
        | vk::Format::A2R10G10B10_UNORM_PACK32
        | vk::Format::A2R10G10B10_SNORM_PACK32
        | vk::Format::A2R10G10B10_USCALED_PACK32
        | vk::Format::A2R10G10B10_SSCALED_PACK32
        | vk::Format::A2R10G10B10_UINT_PACK32
        | vk::Format::A2R10G10B10_SINT_PACK32
        | vk::Format::A2B10G10R10_UNORM_PACK32
        | vk::Format::A2B10G10R10_SNORM_PACK32
        | vk::Format::A2B10G10R10_USCALED_PACK32
        | vk::Format::A2B10G10R10_SSCALED_PACK32
        | vk::Format::A2B10G10R10_UINT_PACK32
        | vk::Format::A2B10G10R10_SINT_PACK32
        | vk::Format::R16G16_UNORM
        | vk::Format::R16G16_SNORM
        | vk::Format::R16G16_USCALED
        | vk::Format::R16G16_SSCALED
        | vk::Format::R16G16_UINT
        | vk::Format::R16G16_SINT
        | vk::Format::R16G16_SFLOAT
        | vk::Format::R32_UINT
        | vk::Format::R32_SINT
        | vk::Format::R32_SFLOAT
        | vk::Format::B10G11R11_UFLOAT_PACK32
        | vk::Format::E5B9G9R9_UFLOAT_PACK32 => 4,

        vk::Format::R16G16B16_UNORM
        | vk::Format::R16G16B16_SNORM
        | vk::Format::R16G16B16_USCALED
        | vk::Format::R16G16B16_SSCALED
        | vk::Format::R16G16B16_UINT
        | vk::Format::R16G16B16_SINT
        | vk::Format::R16G16B16_SFLOAT => 6,

        vk::Format::R16G16B16A16_UNORM
        | vk::Format::R16G16B16A16_SNORM
        | vk::Format::R16G16B16A16_USCALED
        | vk::Format::R16G16B16A16_SSCALED
        | vk::Format::R16G16B16A16_UINT
        | vk::Format::R16G16B16A16_SINT
        | vk::Format::R16G16B16A16_SFLOAT
        | vk::Format::R32G32_UINT
        | vk::Format::R32G32_SINT
        | vk::Format::R32G32_SFLOAT
        | vk::Format::R64_UINT
        | vk::Format::R64_SINT
        | vk::Format::R64_SFLOAT => 8,

        vk::Format::R32G32B32_UINT
        | vk::Format::R32G32B32_SINT
        | vk::Format::R32G32B32_SFLOAT => 12,

        vk::Format::R32G32B32A32_UINT
        | vk::Format::R32G32B32A32_SINT
        | vk::Format::R32G32B32A32_SFLOAT
        | vk::Format::R64G64_UINT
        | vk::Format::R64G64_SINT
        | vk::Format::R64G64_SFLOAT => 16,

        vk::Format::R64G64B64_UINT
        | vk::Format::R64G64B64_SINT
        | vk::Format::R64G64B64_SFLOAT => 24,

        vk::Format::R64G64B64A64_UINT
        | vk::Format::R64G64B64A64_SINT
        | vk::Format::R64G64B64A64_SFLOAT => 32,

        vk::Format::D16_UNORM => 2,
        vk::Format::X8_D24_UNORM_PACK32 => 4,
        vk::Format::D32_SFLOAT => 4,
        vk::Format::S8_UINT => 2,
        vk::Format::D16_UNORM_S8_UINT => 3,
        vk::Format::D24_UNORM_S8_UINT => 4,
        vk::Format::D32_SFLOAT_S8_UINT => 5,

        vk::Format::BC1_RGB_UNORM_BLOCK
        | vk::Format::BC1_RGB_SRGB_BLOCK
        | vk::Format::BC1_RGBA_UNORM_BLOCK
        | vk::Format::BC1_RGBA_SRGB_BLOCK => 8,

        vk::Format::BC2_UNORM_BLOCK
        | vk::Format::BC2_SRGB_BLOCK
        | vk::Format::BC3_UNORM_BLOCK
        | vk::Format::BC3_SRGB_BLOCK => 16,

        vk::Format::BC4_UNORM_BLOCK | vk::Format::BC4_SNORM_BLOCK => 8,

        vk::Format::BC5_UNORM_BLOCK
        | vk::Format::BC5_SNORM_BLOCK
        | vk::Format::BC6H_UFLOAT_BLOCK
        | vk::Format::BC6H_SFLOAT_BLOCK
        | vk::Format::BC7_UNORM_BLOCK
        | vk::Format::BC7_SRGB_BLOCK => 16,

        vk::Format::ETC2_R8G8B8_UNORM_BLOCK
        | vk::Format::ETC2_R8G8B8_SRGB_BLOCK
        | vk::Format::ETC2_R8G8B8A1_UNORM_BLOCK
        | vk::Format::ETC2_R8G8B8A1_SRGB_BLOCK => 8,

        vk::Format::ETC2_R8G8B8A8_UNORM_BLOCK
        | vk::Format::ETC2_R8G8B8A8_SRGB_BLOCK => 16,

        vk::Format::EAC_R11_UNORM_BLOCK | vk::Format::EAC_R11_SNORM_BLOCK => 8,

        vk::Format::EAC_R11G11_UNORM_BLOCK
        | vk::Format::EAC_R11G11_SNORM_BLOCK => 16,

        vk::Format::ASTC_4X4_SFLOAT_BLOCK
        | vk::Format::ASTC_4X4_UNORM_BLOCK
        | vk::Format::ASTC_4X4_SRGB_BLOCK
        | vk::Format::ASTC_5X4_SFLOAT_BLOCK
        | vk::Format::ASTC_5X4_UNORM_BLOCK
        | vk::Format::ASTC_5X4_SRGB_BLOCK
        | vk::Format::ASTC_5X5_SFLOAT_BLOCK
        | vk::Format::ASTC_5X5_UNORM_BLOCK
        | vk::Format::ASTC_5X5_SRGB_BLOCK
        | vk::Format::ASTC_6X5_SFLOAT_BLOCK
        | vk::Format::ASTC_6X5_UNORM_BLOCK
        | vk::Format::ASTC_6X5_SRGB_BLOCK
        | vk::Format::ASTC_6X6_SFLOAT_BLOCK
        | vk::Format::ASTC_6X6_UNORM_BLOCK
        | vk::Format::ASTC_6X6_SRGB_BLOCK
        | vk::Format::ASTC_8X5_SFLOAT_BLOCK
        | vk::Format::ASTC_8X5_UNORM_BLOCK
        | vk::Format::ASTC_8X5_SRGB_BLOCK
        | vk::Format::ASTC_8X6_SFLOAT_BLOCK
        | vk::Format::ASTC_8X6_UNORM_BLOCK
        | vk::Format::ASTC_8X6_SRGB_BLOCK
        | vk::Format::ASTC_8X8_SFLOAT_BLOCK
        | vk::Format::ASTC_8X8_UNORM_BLOCK
        | vk::Format::ASTC_8X8_SRGB_BLOCK
        | vk::Format::ASTC_10X5_SFLOAT_BLOCK
        | vk::Format::ASTC_10X5_UNORM_BLOCK
        | vk::Format::ASTC_10X5_SRGB_BLOCK
        | vk::Format::ASTC_10X6_SFLOAT_BLOCK
        | vk::Format::ASTC_10X6_UNORM_BLOCK
        | vk::Format::ASTC_10X6_SRGB_BLOCK
        | vk::Format::ASTC_10X8_SFLOAT_BLOCK
        | vk::Format::ASTC_10X8_UNORM_BLOCK
        | vk::Format::ASTC_10X8_SRGB_BLOCK
        | vk::Format::ASTC_10X10_SFLOAT_BLOCK
        | vk::Format::ASTC_10X10_UNORM_BLOCK
        | vk::Format::ASTC_10X10_SRGB_BLOCK
        | vk::Format::ASTC_12X10_SFLOAT_BLOCK
        | vk::Format::ASTC_12X10_UNORM_BLOCK
        | vk::Format::ASTC_12X10_SRGB_BLOCK
        | vk::Format::ASTC_12X12_SFLOAT_BLOCK
        | vk::Format::ASTC_12X12_UNORM_BLOCK
        | vk::Format::ASTC_12X12_SRGB_BLOCK => 16,

        vk::Format::G8B8G8R8_422_UNORM | vk::Format::B8G8R8G8_422_UNORM => 4,

        vk::Format::G8_B8_R8_3PLANE_420_UNORM
        | vk::Format::G8_B8R8_2PLANE_420_UNORM
        | vk::Format::G8_B8_R8_3PLANE_422_UNORM
        | vk::Format::G8_B8R8_2PLANE_422_UNORM
        | vk::Format::G8_B8_R8_3PLANE_444_UNORM
        | vk::Format::G8_B8R8_2PLANE_444_UNORM => 3,

        vk::Format::R10X6G10X6B10X6A10X6_UNORM_4PACK16
        | vk::Format::G10X6B10X6G10X6R10X6_422_UNORM_4PACK16
        | vk::Format::B10X6G10X6R10X6G10X6_422_UNORM_4PACK16
        | vk::Format::R12X4G12X4B12X4A12X4_UNORM_4PACK16
        | vk::Format::G12X4B12X4G12X4R12X4_422_UNORM_4PACK16
        | vk::Format::B12X4G12X4R12X4G12X4_422_UNORM_4PACK16 => 8,

        vk::Format::G10X6_B10X6_R10X6_3PLANE_420_UNORM_3PACK16
        | vk::Format::G10X6_B10X6R10X6_2PLANE_420_UNORM_3PACK16
        | vk::Format::G10X6_B10X6_R10X6_3PLANE_422_UNORM_3PACK16
        | vk::Format::G10X6_B10X6R10X6_2PLANE_422_UNORM_3PACK16
        | vk::Format::G10X6_B10X6_R10X6_3PLANE_444_UNORM_3PACK16
        | vk::Format::G10X6_B10X6R10X6_2PLANE_444_UNORM_3PACK16
        | vk::Format::G12X4_B12X4_R12X4_3PLANE_420_UNORM_3PACK16
        | vk::Format::G12X4_B12X4R12X4_2PLANE_420_UNORM_3PACK16
        | vk::Format::G12X4_B12X4_R12X4_3PLANE_422_UNORM_3PACK16
        | vk::Format::G12X4_B12X4R12X4_2PLANE_422_UNORM_3PACK16
        | vk::Format::G12X4_B12X4_R12X4_3PLANE_444_UNORM_3PACK16
        | vk::Format::G12X4_B12X4R12X4_2PLANE_444_UNORM_3PACK16 => 6,

        vk::Format::G16B16G16R16_422_UNORM
        | vk::Format::B16G16R16G16_422_UNORM => 8,

        vk::Format::G16_B16_R16_3PLANE_420_UNORM
        | vk::Format::G16_B16R16_2PLANE_420_UNORM
        | vk::Format::G16_B16_R16_3PLANE_422_UNORM
        | vk::Format::G16_B16R16_2PLANE_422_UNORM
        | vk::Format::G16_B16_R16_3PLANE_444_UNORM
        | vk::Format::G16_B16R16_2PLANE_444_UNORM => 6,

        vk::Format::PVRTC1_2BPP_UNORM_BLOCK_IMG
        | vk::Format::PVRTC1_2BPP_SRGB_BLOCK_IMG
        | vk::Format::PVRTC1_4BPP_UNORM_BLOCK_IMG
        | vk::Format::PVRTC1_4BPP_SRGB_BLOCK_IMG
        | vk::Format::PVRTC2_2BPP_UNORM_BLOCK_IMG
        | vk::Format::PVRTC2_2BPP_SRGB_BLOCK_IMG
        | vk::Format::PVRTC2_4BPP_UNORM_BLOCK_IMG
        | vk::Format::PVRTC2_4BPP_SRGB_BLOCK_IMG => 8,

        // UNDEFINED, extension formats we never sample, and any value outside
        // the enumeration.
        _ => 4,
    }
}

/// The linear (UNORM) sibling of `format`.
///
/// sRGB formats map to their UNORM bit-layout twin, UNORM formats map to
/// themselves, and formats without a linear counterpart map to
/// `vk::Format::UNDEFINED`. Used to create non-color-managed views of sRGB
/// images.
pub fn linear_format(format: vk::Format) -> vk::Format {
    match format {
        vk::Format::R8_SRGB | vk::Format::R8_UNORM => vk::Format::R8_UNORM,
        vk::Format::R8G8_SRGB | vk::Format::R8G8_UNORM => vk::Format::R8G8_UNORM,
        vk::Format::R8G8B8_SRGB | vk::Format::R8G8B8_UNORM => vk::Format::R8G8B8_UNORM,
        vk::Format::B8G8R8_SRGB | vk::Format::B8G8R8_UNORM => vk::Format::B8G8R8_UNORM,
        vk::Format::R8G8B8A8_SRGB | vk::Format::R8G8B8A8_UNORM => vk::Format::R8G8B8A8_UNORM,
        vk::Format::B8G8R8A8_SRGB | vk::Format::B8G8R8A8_UNORM => vk::Format::B8G8R8A8_UNORM,
        vk::Format::A8B8G8R8_SRGB_PACK32 | vk::Format::A8B8G8R8_UNORM_PACK32 => {
            vk::Format::A8B8G8R8_UNORM_PACK32
        }
        vk::Format::BC1_RGB_SRGB_BLOCK | vk::Format::BC1_RGB_UNORM_BLOCK => {
            vk::Format::BC1_RGB_UNORM_BLOCK
        }
        vk::Format::BC1_RGBA_SRGB_BLOCK | vk::Format::BC1_RGBA_UNORM_BLOCK => {
            vk::Format::BC1_RGBA_UNORM_BLOCK
        }
        vk::Format::BC2_SRGB_BLOCK | vk::Format::BC2_UNORM_BLOCK => vk::Format::BC2_UNORM_BLOCK,
        vk::Format::BC3_SRGB_BLOCK | vk::Format::BC3_UNORM_BLOCK => vk::Format::BC3_UNORM_BLOCK,
        vk::Format::BC7_SRGB_BLOCK | vk::Format::BC7_UNORM_BLOCK => vk::Format::BC7_UNORM_BLOCK,
        vk::Format::ETC2_R8G8B8_SRGB_BLOCK | vk::Format::ETC2_R8G8B8_UNORM_BLOCK => {
            vk::Format::ETC2_R8G8B8_UNORM_BLOCK
        }
        vk::Format::ETC2_R8G8B8A1_SRGB_BLOCK | vk::Format::ETC2_R8G8B8A1_UNORM_BLOCK => {
            vk::Format::ETC2_R8G8B8A1_UNORM_BLOCK
        }
        vk::Format::ETC2_R8G8B8A8_SRGB_BLOCK | vk::Format::ETC2_R8G8B8A8_UNORM_BLOCK => {
            vk::Format::ETC2_R8G8B8A8_UNORM_BLOCK
        }
        vk::Format::ASTC_4X4_SRGB_BLOCK | vk::Format::ASTC_4X4_UNORM_BLOCK => {
            vk::Format::ASTC_4X4_UNORM_BLOCK
        }
        vk::Format::ASTC_5X4_SRGB_BLOCK | vk::Format::ASTC_5X4_UNORM_BLOCK => {
            vk::Format::ASTC_5X4_UNORM_BLOCK
        }
        vk::Format::ASTC_5X5_SRGB_BLOCK | vk::Format::ASTC_5X5_UNORM_BLOCK => {
            vk::Format::ASTC_5X5_UNORM_BLOCK
        }
        vk::Format::ASTC_6X5_SRGB_BLOCK | vk::Format::ASTC_6X5_UNORM_BLOCK => {
            vk::Format::ASTC_6X5_UNORM_BLOCK
        }
        vk::Format::ASTC_6X6_SRGB_BLOCK | vk::Format::ASTC_6X6_UNORM_BLOCK => {
            vk::Format::ASTC_6X6_UNORM_BLOCK
        }
        vk::Format::ASTC_8X5_SRGB_BLOCK | vk::Format::ASTC_8X5_UNORM_BLOCK => {
            vk::Format::ASTC_8X5_UNORM_BLOCK
        }
        vk::Format::ASTC_8X6_SRGB_BLOCK | vk::Format::ASTC_8X6_UNORM_BLOCK => {
            vk::Format::ASTC_8X6_UNORM_BLOCK
        }
        vk::Format::ASTC_8X8_SRGB_BLOCK | vk::Format::ASTC_8X8_UNORM_BLOCK => {
            vk::Format::ASTC_8X8_UNORM_BLOCK
        }
        vk::Format::ASTC_10X5_SRGB_BLOCK | vk::Format::ASTC_10X5_UNORM_BLOCK => {
            vk::Format::ASTC_10X5_UNORM_BLOCK
        }
        vk::Format::ASTC_10X6_SRGB_BLOCK | vk::Format::ASTC_10X6_UNORM_BLOCK => {
            vk::Format::ASTC_10X6_UNORM_BLOCK
        }
        vk::Format::ASTC_10X8_SRGB_BLOCK | vk::Format::ASTC_10X8_UNORM_BLOCK => {
            vk::Format::ASTC_10X8_UNORM_BLOCK
        }
        vk::Format::ASTC_10X10_SRGB_BLOCK | vk::Format::ASTC_10X10_UNORM_BLOCK => {
            vk::Format::ASTC_10X10_UNORM_BLOCK
        }
        vk::Format::ASTC_12X10_SRGB_BLOCK | vk::Format::ASTC_12X10_UNORM_BLOCK => {
            vk::Format::ASTC_12X10_UNORM_BLOCK
        }
        vk::Format::ASTC_12X12_SRGB_BLOCK | vk::Format::ASTC_12X12_UNORM_BLOCK => {
            vk::Format::ASTC_12X12_UNORM_BLOCK
        }
        vk::Format::PVRTC1_2BPP_SRGB_BLOCK_IMG | vk::Format::PVRTC1_2BPP_UNORM_BLOCK_IMG => {
            vk::Format::PVRTC1_2BPP_UNORM_BLOCK_IMG
        }
        vk::Format::PVRTC1_4BPP_SRGB_BLOCK_IMG | vk::Format::PVRTC1_4BPP_UNORM_BLOCK_IMG => {
            vk::Format::PVRTC1_4BPP_UNORM_BLOCK_IMG
        }
        vk::Format::PVRTC2_2BPP_SRGB_BLOCK_IMG | vk::Format::PVRTC2_2BPP_UNORM_BLOCK_IMG => {
            vk::Format::PVRTC2_2BPP_UNORM_BLOCK_IMG
        }
        vk::Format::PVRTC2_4BPP_SRGB_BLOCK_IMG | vk::Format::PVRTC2_4BPP_UNORM_BLOCK_IMG => {
            vk::Format::PVRTC2_4BPP_UNORM_BLOCK_IMG
        }
        _ => vk::Format::UNDEFINED,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every sRGB format that has a linear sibling.
    const SRGB_FORMATS: &[vk::Format] = &[
        vk::Format::R8_SRGB,
        vk::Format::R8G8_SRGB,
        vk::Format::R8G8B8_SRGB,
        vk::Format::B8G8R8_SRGB,
        vk::Format::R8G8B8A8_SRGB,
        vk::Format::B8G8R8A8_SRGB,
        vk::Format::A8B8G8R8_SRGB_PACK32,
        vk::Format::BC1_RGB_SRGB_BLOCK,
        vk::Format::BC1_RGBA_SRGB_BLOCK,
        vk::Format::BC2_SRGB_BLOCK,
        vk::Format::BC3_SRGB_BLOCK,
        vk::Format::BC7_SRGB_BLOCK,
        vk::Format::ETC2_R8G8B8_SRGB_BLOCK,
        vk::Format::ETC2_R8G8B8A1_SRGB_BLOCK,
        vk::Format::ETC2_R8G8B8A8_SRGB_BLOCK,
        vk::Format::ASTC_4X4_SRGB_BLOCK,
        vk::Format::ASTC_5X4_SRGB_BLOCK,
        vk::Format::ASTC_5X5_SRGB_BLOCK,
        vk::Format::ASTC_6X5_SRGB_BLOCK,
        vk::Format::ASTC_6X6_SRGB_BLOCK,
        vk::Format::ASTC_8X5_SRGB_BLOCK,
        vk::Format::ASTC_8X6_SRGB_BLOCK,
        vk::Format::ASTC_8X8_SRGB_BLOCK,
        vk::Format::ASTC_10X5_SRGB_BLOCK,
        vk::Format::ASTC_10X6_SRGB_BLOCK,
        vk::Format::ASTC_10X8_SRGB_BLOCK,
        vk::Format::ASTC_10X10_SRGB_BLOCK,
        vk::Format::ASTC_12X10_SRGB_BLOCK,
        vk::Format::ASTC_12X12_SRGB_BLOCK,
        vk::Format::PVRTC1_2BPP_SRGB_BLOCK_IMG,
        vk::Format::PVRTC1_4BPP_SRGB_BLOCK_IMG,
        vk::Format::PVRTC2_2BPP_SRGB_BLOCK_IMG,
        vk::Format::PVRTC2_4BPP_SRGB_BLOCK_IMG,
    ];

    #[test]
    fn block_size_uncompressed() {
        assert_eq!(texel_block_size(vk::Format::R8_UNORM), 1);
        assert_eq!(texel_block_size(vk::Format::R4G4_UNORM_PACK8), 1);
        assert_eq!(texel_block_size(vk::Format::R5G6B5_UNORM_PACK16), 2);
        assert_eq!(texel_block_size(vk::Format::R16_SFLOAT), 2);
        assert_eq!(texel_block_size(vk::Format::R8G8B8_SRGB), 3);
        assert_eq!(texel_block_size(vk::Format::B8G8R8A8_SRGB), 4);
        assert_eq!(texel_block_size(vk::Format::A2B10G10R10_UNORM_PACK32), 4);
        assert_eq!(texel_block_size(vk::Format::B10G11R11_UFLOAT_PACK32), 4);
        assert_eq!(texel_block_size(vk::Format::R16G16B16_SFLOAT), 6);
        assert_eq!(texel_block_size(vk::Format::R16G16B16A16_SFLOAT), 8);
        assert_eq!(texel_block_size(vk::Format::R32G32B32_SFLOAT), 12);
        assert_eq!(texel_block_size(vk::Format::R32G32B32A32_SFLOAT), 16);
        assert_eq!(texel_block_size(vk::Format::R64G64B64_SFLOAT), 24);
        assert_eq!(texel_block_size(vk::Format::R64G64B64A64_SFLOAT), 32);
    }

    #[test]
    fn block_size_depth_stencil() {
        assert_eq!(texel_block_size(vk::Format::D16_UNORM), 2);
        assert_eq!(texel_block_size(vk::Format::X8_D24_UNORM_PACK32), 4);
        assert_eq!(texel_block_size(vk::Format::D32_SFLOAT), 4);
        assert_eq!(texel_block_size(vk::Format::S8_UINT), 2);
        assert_eq!(texel_block_size(vk::Format::D16_UNORM_S8_UINT), 3);
        assert_eq!(texel_block_size(vk::Format::D24_UNORM_S8_UINT), 4);
        assert_eq!(texel_block_size(vk::Format::D32_SFLOAT_S8_UINT), 5);
    }

    #[test]
    fn block_size_compressed() {
        assert_eq!(texel_block_size(vk::Format::BC1_RGB_UNORM_BLOCK), 8);
        assert_eq!(texel_block_size(vk::Format::BC1_RGBA_SRGB_BLOCK), 8);
        assert_eq!(texel_block_size(vk::Format::BC2_UNORM_BLOCK), 16);
        assert_eq!(texel_block_size(vk::Format::BC3_SRGB_BLOCK), 16);
        assert_eq!(texel_block_size(vk::Format::BC4_SNORM_BLOCK), 8);
        assert_eq!(texel_block_size(vk::Format::BC5_UNORM_BLOCK), 16);
        assert_eq!(texel_block_size(vk::Format::BC6H_UFLOAT_BLOCK), 16);
        assert_eq!(texel_block_size(vk::Format::BC7_SRGB_BLOCK), 16);
        assert_eq!(texel_block_size(vk::Format::ETC2_R8G8B8_UNORM_BLOCK), 8);
        assert_eq!(texel_block_size(vk::Format::ETC2_R8G8B8A8_SRGB_BLOCK), 16);
        assert_eq!(texel_block_size(vk::Format::EAC_R11_UNORM_BLOCK), 8);
        assert_eq!(texel_block_size(vk::Format::EAC_R11G11_SNORM_BLOCK), 16);
        assert_eq!(texel_block_size(vk::Format::ASTC_4X4_UNORM_BLOCK), 16);
        assert_eq!(texel_block_size(vk::Format::ASTC_12X12_SFLOAT_BLOCK), 16);
        assert_eq!(texel_block_size(vk::Format::PVRTC1_2BPP_UNORM_BLOCK_IMG), 8);
    }

    #[test]
    fn block_size_planar() {
        assert_eq!(texel_block_size(vk::Format::G8B8G8R8_422_UNORM), 4);
        assert_eq!(texel_block_size(vk::Format::G8_B8_R8_3PLANE_420_UNORM), 3);
        assert_eq!(texel_block_size(vk::Format::G8_B8R8_2PLANE_444_UNORM), 3);
        assert_eq!(
            texel_block_size(vk::Format::R10X6G10X6B10X6A10X6_UNORM_4PACK16),
            8
        );
        assert_eq!(
            texel_block_size(vk::Format::G12X4_B12X4R12X4_2PLANE_422_UNORM_3PACK16),
            6
        );
        assert_eq!(texel_block_size(vk::Format::G16B16G16R16_422_UNORM), 8);
        assert_eq!(texel_block_size(vk::Format::G16_B16_R16_3PLANE_444_UNORM), 6);
    }

    #[test]
    fn block_size_is_total_with_default() {
        // Sentinels and identifiers outside the enumeration still report a
        // usable size.
        assert_eq!(texel_block_size(vk::Format::UNDEFINED), 4);
        assert_eq!(texel_block_size(vk::Format::from_raw(i32::MAX)), 4);
        assert_eq!(texel_block_size(vk::Format::from_raw(-1)), 4);

        for raw in 0..=1500 {
            assert!(texel_block_size(vk::Format::from_raw(raw)) > 0);
        }
    }

    #[test]
    fn linear_format_is_idempotent() {
        for &format in SRGB_FORMATS {
            let linear = linear_format(format);
            assert_eq!(linear_format(linear), linear, "{format:?}");
        }
        // Formats with no linear sibling stay at the sentinel.
        assert_eq!(linear_format(vk::Format::UNDEFINED), vk::Format::UNDEFINED);
        assert_eq!(
            linear_format(linear_format(vk::Format::D32_SFLOAT)),
            vk::Format::UNDEFINED
        );
    }

    #[test]
    fn linear_format_changes_srgb_but_not_size() {
        for &format in SRGB_FORMATS {
            let linear = linear_format(format);
            assert_ne!(linear, format, "{format:?}");
            assert_ne!(linear, vk::Format::UNDEFINED, "{format:?}");
            assert_eq!(
                texel_block_size(linear),
                texel_block_size(format),
                "{format:?}"
            );
        }
    }

    #[test]
    fn linear_format_maps_unorm_to_itself() {
        for format in [
            vk::Format::R8_UNORM,
            vk::Format::R8G8B8A8_UNORM,
            vk::Format::B8G8R8A8_UNORM,
            vk::Format::BC3_UNORM_BLOCK,
            vk::Format::ASTC_8X8_UNORM_BLOCK,
            vk::Format::PVRTC2_4BPP_UNORM_BLOCK_IMG,
        ] {
            assert_eq!(linear_format(format), format, "{format:?}");
        }
    }

    #[test]
    fn linear_format_undefined_for_non_color_formats() {
        for format in [
            vk::Format::D24_UNORM_S8_UINT,
            vk::Format::R32G32B32A32_SFLOAT,
            vk::Format::R16_SFLOAT,
            vk::Format::BC4_UNORM_BLOCK,
        ] {
            assert_eq!(linear_format(format), vk::Format::UNDEFINED, "{format:?}");
        }
    }
}
