//! Sampled GPU textures: upload, validation, and the font atlas.

use crate::font::generate_font_atlas;

/// Errors that can occur during texture creation.
#[derive(Debug, thiserror::Error)]
pub enum TextureError {
    #[error("texture data size ({actual}) does not match expected ({expected}) for {width}x{height} {format:?}")]
    DataSizeMismatch {
        actual: usize,
        expected: usize,
        width: u32,
        height: u32,
        format: wgpu::TextureFormat,
    },

    #[error("texture dimensions must be non-zero, got {width}x{height}")]
    ZeroDimensions { width: u32, height: u32 },
}

/// A sampled 2D texture with its default view and sampler.
pub struct Texture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
    /// Width and height in texels.
    pub dimensions: (u32, u32),
    pub format: wgpu::TextureFormat,
}

impl Texture {
    /// Upload tightly packed pixel rows. Sampled with nearest filtering and clamped edges.
    pub fn from_pixels(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        label: &str,
        data: &[u8],
        (width, height): (u32, u32),
        format: wgpu::TextureFormat,
    ) -> Result<Self, TextureError> {
        validate_dimensions(width, height)?;
        validate_data_size(data, width, height, format)?;

        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            data,
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(bytes_per_row(width, format)),
                rows_per_image: None,
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("sampler-nearest"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        log::info!("Created texture '{label}' ({width}x{height} {format:?})");
        Ok(Self {
            texture,
            view,
            sampler,
            dimensions: (width, height),
            format,
        })
    }

    /// The bitmap font as a single-channel coverage texture.
    pub fn font_atlas(device: &wgpu::Device, queue: &wgpu::Queue) -> Result<Self, TextureError> {
        let (pixels, width, height) = generate_font_atlas();
        Self::from_pixels(
            device,
            queue,
            "font-atlas",
            &pixels,
            (width, height),
            wgpu::TextureFormat::R8Unorm,
        )
    }
}

fn expected_byte_size(width: u32, height: u32, format: wgpu::TextureFormat) -> usize {
    let bpp = format.block_copy_size(None).unwrap_or(4) as usize;
    width as usize * height as usize * bpp
}

fn bytes_per_row(width: u32, format: wgpu::TextureFormat) -> u32 {
    width * format.block_copy_size(None).unwrap_or(4)
}

fn validate_dimensions(width: u32, height: u32) -> Result<(), TextureError> {
    if width == 0 || height == 0 {
        return Err(TextureError::ZeroDimensions { width, height });
    }
    Ok(())
}

fn validate_data_size(data: &[u8], width: u32, height: u32, format: wgpu::TextureFormat) -> Result<(), TextureError> {
    let expected = expected_byte_size(width, height, format);
    if data.len() != expected {
        return Err(TextureError::DataSizeMismatch {
            actual: data.len(),
            expected,
            width,
            height,
            format,
        });
    }
    Ok(())
}

/// Headless device for GPU-backed tests. `None` when no adapter is available.
#[cfg(test)]
pub(crate) fn create_test_device_queue() -> Option<(wgpu::Device, wgpu::Queue)> {
    pollster::block_on(async {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await?;
        adapter
            .request_device(&wgpu::DeviceDescriptor::default(), None)
            .await
            .ok()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_dimensions_are_rejected() {
        assert!(matches!(
            validate_dimensions(0, 8),
            Err(TextureError::ZeroDimensions { width: 0, height: 8 })
        ));
        assert!(validate_dimensions(8, 8).is_ok());
    }

    #[test]
    fn data_size_follows_format() {
        assert_eq!(expected_byte_size(16, 8, wgpu::TextureFormat::R8Unorm), 128);
        assert_eq!(expected_byte_size(16, 8, wgpu::TextureFormat::Rgba8Unorm), 512);
        assert_eq!(bytes_per_row(16, wgpu::TextureFormat::Rgba8Unorm), 64);

        let short = vec![0u8; 100];
        let err = validate_data_size(&short, 16, 8, wgpu::TextureFormat::R8Unorm).unwrap_err();
        assert!(matches!(err, TextureError::DataSizeMismatch { actual: 100, expected: 128, .. }));
    }

    #[test]
    fn font_atlas_matches_its_upload_size() {
        let (pixels, width, height) = generate_font_atlas();
        assert!(validate_data_size(&pixels, width, height, wgpu::TextureFormat::R8Unorm).is_ok());
    }

    #[test]
    fn font_atlas_uploads() {
        let Some((device, queue)) = create_test_device_queue() else {
            return;
        };
        let atlas = Texture::font_atlas(&device, &queue).unwrap();
        let (_, width, height) = generate_font_atlas();
        assert_eq!(atlas.dimensions, (width, height));
        assert_eq!(atlas.format, wgpu::TextureFormat::R8Unorm);
    }
}
