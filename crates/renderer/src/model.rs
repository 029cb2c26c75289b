//! GPU-side model: one vertex/index buffer pair and one material binding per
//! surface. Every appearance change rebinds all surfaces.

use std::sync::Arc;

use asset::{ModelData, TextureData};
use bytemuck::{Pod, Zeroable};
use corelib::material::{self, SurfaceMaterial, TextureSlot};
use corelib::transform::Transform;
use corelib::{Appearance, vec3};
use wgpu::util::DeviceExt;
use wgpu::{
    BindGroup, BindGroupLayout, Buffer, BufferUsages, Device, Queue, Sampler, TextureView,
    VertexBufferLayout, VertexStepMode,
};

/// Vertex: position + normal + uv.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct Vertex {
    pub pos: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    pub const LAYOUT: VertexBufferLayout<'static> = VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex>() as u64,
        step_mode: VertexStepMode::Vertex,
        attributes: &wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2],
    };
}

/// Material UBO (16-byte aligned).
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub(crate) struct MaterialUniform {
    base_color: [f32; 4],
}

impl From<&SurfaceMaterial> for MaterialUniform {
    fn from(m: &SurfaceMaterial) -> Self {
        Self {
            base_color: m.base_color,
        }
    }
}

/// Uploaded RGBA8 sRGB texture.
pub struct GpuTexture {
    #[allow(dead_code)]
    texture: wgpu::Texture,
    view: TextureView,
}

impl GpuTexture {
    pub fn from_data(device: &Device, queue: &Queue, label: &str, data: &TextureData) -> Self {
        let texture = device.create_texture_with_data(
            queue,
            &wgpu::TextureDescriptor {
                label: Some(label),
                size: wgpu::Extent3d {
                    width: data.width,
                    height: data.height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8UnormSrgb,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            &data.data,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { texture, view }
    }

    #[inline]
    pub fn view(&self) -> &TextureView {
        &self.view
    }
}

pub(crate) struct GpuSurface {
    name: String,
    vertex_buf: Buffer,
    index_buf: Buffer,
    index_count: u32,
    material_buf: Buffer,
    bind_group: BindGroup,
}

/// Shared material resources: layout, sampler, the default white image and
/// the most recently applied texture (replaced, never explicitly freed).
pub(crate) struct MaterialResources {
    pub layout: BindGroupLayout,
    sampler: Sampler,
    default_texture: GpuTexture,
    active_texture: Option<(String, GpuTexture)>,
}

impl MaterialResources {
    pub fn new(device: &Device, queue: &Queue) -> Self {
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Material BGL"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: wgpu::BufferSize::new(
                            std::mem::size_of::<MaterialUniform>() as u64,
                        ),
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Material Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let default_texture = GpuTexture::from_data(
            device,
            queue,
            "Default White",
            &TextureData::solid([255, 255, 255, 255]),
        );

        Self {
            layout,
            sampler,
            default_texture,
            active_texture: None,
        }
    }

    /// Upload `image` for `slot` unless it is already resident.
    fn prepare(
        &mut self,
        device: &Device,
        queue: &Queue,
        slot: &TextureSlot,
        image: Option<&Arc<TextureData>>,
    ) {
        let TextureSlot::Image(path) = slot else {
            return;
        };
        if self.active_texture.as_ref().is_some_and(|(p, _)| p == path) {
            return;
        }
        let max = device.limits().max_texture_dimension_2d;
        match image {
            Some(data) if data.width > max || data.height > max => log::warn!(
                "Texture {path} is {}x{}, device limit is {max}; using default material image",
                data.width,
                data.height
            ),
            Some(data) => {
                log::info!("Uploading texture {path} ({}x{})", data.width, data.height);
                self.active_texture =
                    Some((path.clone(), GpuTexture::from_data(device, queue, path, data)));
            }
            None => log::warn!("No image data for {path}, using default material image"),
        }
    }

    fn view(&self, slot: &TextureSlot) -> &TextureView {
        match (slot, &self.active_texture) {
            (TextureSlot::Image(path), Some((resident, texture))) if resident == path => {
                texture.view()
            }
            _ => self.default_texture.view(),
        }
    }

    fn bind_group(&self, device: &Device, material_buf: &Buffer, view: &TextureView) -> BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Material BG"),
            layout: &self.layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: material_buf.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        })
    }
}

pub(crate) struct GpuModel {
    surfaces: Vec<GpuSurface>,
    /// CPU mirror of what each surface is bound to.
    materials: Vec<SurfaceMaterial>,
    pub fit: Transform,
}

impl GpuModel {
    pub fn upload(device: &Device, queue: &Queue, res: &MaterialResources, model: &ModelData) -> Self {
        let neutral = SurfaceMaterial::neutral();
        let surfaces: Vec<GpuSurface> = model
            .surfaces
            .iter()
            .map(|surface| {
                let vertices: Vec<Vertex> = surface
                    .mesh
                    .vertices
                    .iter()
                    .map(|v| Vertex {
                        pos: v.position,
                        normal: v.normal,
                        uv: v.uv,
                    })
                    .collect();
                let vertex_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Surface VB"),
                    contents: bytemuck::cast_slice(&vertices),
                    usage: BufferUsages::VERTEX,
                });
                let index_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Surface IB"),
                    contents: bytemuck::cast_slice(&surface.mesh.indices),
                    usage: BufferUsages::INDEX,
                });
                let material_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Material UBO"),
                    contents: bytemuck::bytes_of(&MaterialUniform::from(&neutral)),
                    usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
                });
                let bind_group =
                    res.bind_group(device, &material_buf, res.default_texture.view());
                GpuSurface {
                    name: surface.name.clone(),
                    vertex_buf,
                    index_buf,
                    index_count: surface.mesh.indices.len() as u32,
                    material_buf,
                    bind_group,
                }
            })
            .collect();

        let fit = match model.bounds() {
            Some((lo, hi)) => {
                Transform::fit_bounds(vec3(lo[0], lo[1], lo[2]), vec3(hi[0], hi[1], hi[2]))
            }
            None => Transform::identity(),
        };

        log::info!(
            "Uploaded model: {} surfaces, {} triangles",
            surfaces.len(),
            model.triangle_count()
        );

        Self {
            materials: vec![neutral; surfaces.len()],
            surfaces,
            fit,
        }
    }

    /// Rebind every surface to `appearance`.
    pub fn bind_appearance(
        &mut self,
        device: &Device,
        queue: &Queue,
        res: &mut MaterialResources,
        appearance: &Appearance<Arc<TextureData>>,
    ) {
        material::bind_all(&mut self.materials, appearance);
        let Some(first) = self.materials.first() else {
            return;
        };
        let slot = first.texture.clone();
        res.prepare(device, queue, &slot, appearance.active_image());
        let view = res.view(&slot);

        for (surface, material) in self.surfaces.iter_mut().zip(&self.materials) {
            queue.write_buffer(
                &surface.material_buf,
                0,
                bytemuck::bytes_of(&MaterialUniform::from(material)),
            );
            surface.bind_group = res.bind_group(device, &surface.material_buf, view);
            log::trace!("Rebound surface '{}'", surface.name);
        }
    }

    pub fn draw(&self, rpass: &mut wgpu::RenderPass<'_>) {
        for surface in &self.surfaces {
            rpass.set_bind_group(1, &surface.bind_group, &[]);
            rpass.set_vertex_buffer(0, surface.vertex_buf.slice(..));
            rpass.set_index_buffer(surface.index_buf.slice(..), wgpu::IndexFormat::Uint32);
            rpass.draw_indexed(0..surface.index_count, 0, 0..1);
        }
    }
}
