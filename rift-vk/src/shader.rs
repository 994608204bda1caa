//! Shader module loading from precompiled SPIR-V.

use std::path::Path;

use ash::vk;

use crate::RenderDevice;

const SPIRV_MAGIC: u32 = 0x0723_0203;

/// SPIR-V loading failure.
#[derive(Debug)]
pub enum ShaderError {
    Io(std::io::Error),
    /// The byte stream is not a multiple of the SPIR-V word size.
    Misaligned { len: usize },
    /// The stream does not start with the SPIR-V magic number.
    BadMagic { found: u32 },
    Creation(vk::Result),
}

impl std::fmt::Display for ShaderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShaderError::Io(err) => write!(f, "Reading shader failed: {}", err),
            ShaderError::Misaligned { len } => {
                write!(f, "SPIR-V stream of {} bytes is not word-aligned", len)
            }
            ShaderError::BadMagic { found } => {
                write!(f, "Not a SPIR-V stream (magic {:#010x})", found)
            }
            ShaderError::Creation(result) => {
                write!(f, "Shader module creation failed: {:?}", result)
            }
        }
    }
}

impl std::error::Error for ShaderError {}

impl From<std::io::Error> for ShaderError {
    fn from(err: std::io::Error) -> Self {
        ShaderError::Io(err)
    }
}

/// Decode a raw byte stream into SPIR-V words, validating alignment and
/// magic.
pub fn spirv_words(bytes: &[u8]) -> Result<Vec<u32>, ShaderError> {
    if bytes.is_empty() || bytes.len() % 4 != 0 {
        return Err(ShaderError::Misaligned { len: bytes.len() });
    }

    let words: Vec<u32> = bytes
        .chunks_exact(4)
        .map(|chunk| u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect();

    if words[0] != SPIRV_MAGIC {
        return Err(ShaderError::BadMagic { found: words[0] });
    }

    Ok(words)
}

/// Owning shader module wrapper.
pub struct ShaderModule {
    device: ash::Device,
    module: vk::ShaderModule,
}

impl ShaderModule {
    /// Create a shader module from an in-memory SPIR-V byte stream.
    pub fn from_spirv_bytes(device: &RenderDevice, bytes: &[u8]) -> Result<Self, ShaderError> {
        let words = spirv_words(bytes)?;

        let create_info = vk::ShaderModuleCreateInfo::default().code(&words);
        let module = unsafe {
            device
                .handle()
                .create_shader_module(&create_info, None)
                .map_err(ShaderError::Creation)?
        };

        Ok(Self {
            device: device.handle().clone(),
            module,
        })
    }

    /// Load a precompiled SPIR-V file.
    pub fn load(device: &RenderDevice, path: &Path) -> Result<Self, ShaderError> {
        let bytes = std::fs::read(path)?;
        Self::from_spirv_bytes(device, &bytes)
    }

    pub fn handle(&self) -> vk::ShaderModule {
        self.module
    }
}

impl Drop for ShaderModule {
    fn drop(&mut self) {
        unsafe {
            self.device.destroy_shader_module(self.module, None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_minimal_header() {
        // Magic, version 1.0, zero generator, bound 1, schema 0.
        let mut bytes = Vec::new();
        for word in [SPIRV_MAGIC, 0x0001_0000, 0, 1, 0] {
            bytes.extend_from_slice(&u32::to_le_bytes(word));
        }

        let words = spirv_words(&bytes).unwrap();
        assert_eq!(words.len(), 5);
        assert_eq!(words[0], SPIRV_MAGIC);
    }

    #[test]
    fn rejects_misaligned_stream() {
        let err = spirv_words(&[1, 2, 3]).unwrap_err();
        assert!(matches!(err, ShaderError::Misaligned { len: 3 }));

        let err = spirv_words(&[]).unwrap_err();
        assert!(matches!(err, ShaderError::Misaligned { len: 0 }));
    }

    #[test]
    fn rejects_wrong_magic() {
        let bytes = u32::to_le_bytes(0xdead_beef);
        let err = spirv_words(&bytes).unwrap_err();
        assert!(matches!(err, ShaderError::BadMagic { found: 0xdead_beef }));
    }
}
