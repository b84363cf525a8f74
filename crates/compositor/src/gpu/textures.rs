use image::imageops::flip_vertical_in_place;
use wgpu::util::{DeviceExt, TextureDataOrder};

use crate::software::load_rgba;
use crate::types::{TextureLoadError, TextureSet, TextureSlot, TextureSource};

/// An uploaded texture plus the sampler the pipeline binds it with.
pub(crate) struct TextureResources {
    pub _texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

/// The three uploaded inputs in bind-order: A, B, displacement field.
pub(crate) struct TextureInputs {
    pub image_a: TextureResources,
    pub image_b: TextureResources,
    pub displacement: TextureResources,
}

impl TextureInputs {
    pub(crate) fn upload(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        textures: &TextureSet,
    ) -> Result<Self, TextureLoadError> {
        Ok(Self {
            image_a: upload_texture(device, queue, TextureSlot::ImageA, &textures.image_a)?,
            image_b: upload_texture(device, queue, TextureSlot::ImageB, &textures.image_b)?,
            displacement: upload_texture(
                device,
                queue,
                TextureSlot::Displacement,
                &textures.displacement,
            )?,
        })
    }
}

fn upload_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    slot: TextureSlot,
    source: &TextureSource,
) -> Result<TextureResources, TextureLoadError> {
    let mut rgba = load_rgba(slot, source)?;
    let (width, height) = rgba.dimensions();
    // The fullscreen-triangle UVs have a bottom-left origin; flip rows so the
    // image reads upright on screen.
    flip_vertical_in_place(&mut rgba);
    tracing::debug!(%slot, width, height, "uploading texture");

    let texture = device.create_texture_with_data(
        queue,
        &wgpu::TextureDescriptor {
            label: Some(&format!("{slot} texture")),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        },
        TextureDataOrder::LayerMajor,
        &rgba,
    );

    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::FilterMode::Linear,
        ..Default::default()
    });

    Ok(TextureResources {
        _texture: texture,
        view,
        sampler,
    })
}
