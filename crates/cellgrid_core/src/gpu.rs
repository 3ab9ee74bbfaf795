//! wgpu implementation of [`SurfaceBackend`].
//!
//! Every tile surface owns one instance buffer of [`PackedCell`]s. Cell
//! writes become `queue.write_buffer` calls at the cell's byte offset, and
//! [`GpuBackend::present`] draws the surfaces submitted this frame in
//! submission order, one instanced quad per cell.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use glam::Mat4;
use image::GenericImageView;
use winit::window::Window;

use crate::backend::{AtlasInfo, AtlasProvider, AtlasRegistry, SurfaceBackend, SurfaceHandle};
use crate::cell::{Color, PackedCell, TILEMAP_COUNT};

const ATLAS_SLOTS: usize = TILEMAP_COUNT as usize;
const CELL_ATTRIBUTES: [wgpu::VertexAttribute; 6] = wgpu::vertex_attr_array![
    0 => Float32x2,
    1 => Uint32,
    2 => Uint32,
    3 => Float32x4,
    4 => Uint32,
    5 => Uint32,
];

fn cell_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: PackedCell::STRIDE,
        step_mode: wgpu::VertexStepMode::Instance,
        attributes: &CELL_ATTRIBUTES,
    }
}

/// Uniform block shared by every draw; mirrors `Globals` in tile.wgsl.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct Globals {
    projection: [[f32; 4]; 4],
    time: [f32; 4],
    atlases: [[u32; 4]; ATLAS_SLOTS],
}

struct CellBuffer {
    buffer: wgpu::Buffer,
    width: u32,
    height: u32,
}

impl CellBuffer {
    fn count(&self) -> u32 {
        self.width * self.height
    }
}

struct Atlas {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
}

enum Target {
    Window {
        surface: wgpu::Surface<'static>,
        config: wgpu::SurfaceConfiguration,
    },
    Offscreen {
        texture: wgpu::Texture,
        width: u32,
        height: u32,
    },
}

pub struct GpuBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,
    target: Target,
    format: wgpu::TextureFormat,
    pipeline: wgpu::RenderPipeline,

    globals: Globals,
    globals_buffer: wgpu::Buffer,
    globals_bind_group: wgpu::BindGroup,

    atlas_layout: wgpu::BindGroupLayout,
    atlas_bind_group: wgpu::BindGroup,
    atlas_sampler: wgpu::Sampler,
    blank_view: wgpu::TextureView,
    atlas_textures: Vec<Option<Atlas>>,
    atlases: AtlasRegistry,

    buffers: HashMap<u32, CellBuffer>,
    next_handle: u32,
    draw_list: Vec<SurfaceHandle>,
    clear_color: wgpu::Color,
}

impl GpuBackend {
    /// Backend presenting to `window`.
    pub async fn new(window: Arc<Window>) -> Result<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("creating window surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("Failed to find suitable GPU adapter"))?;
        let info = adapter.get_info();
        tracing::info!("GPU adapter: {} ({:?})", info.name, info.backend);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("cellgrid_device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::default(),
                },
                None,
            )
            .await
            .context("requesting GPU device")?;

        let surface_caps = surface.get_capabilities(&adapter);
        let format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or_else(|| anyhow::anyhow!("window surface reports no formats"))?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: surface_caps.present_modes.first().copied().unwrap_or(wgpu::PresentMode::Fifo),
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        Ok(Self::build(device, queue, format, Target::Window { surface, config }))
    }

    /// Backend rendering into a `width` x `height` texture, read back with
    /// [`GpuBackend::read_pixels`].
    pub async fn new_headless(width: u32, height: u32) -> Result<Self> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor::default());
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("No adapter"))?;
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("offscreen_device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::downlevel_defaults(),
                    memory_hints: wgpu::MemoryHints::default(),
                },
                None,
            )
            .await
            .context("requesting offscreen GPU device")?;
        let format = wgpu::TextureFormat::Rgba8UnormSrgb;
        let (width, height) = (width.max(1), height.max(1));
        let texture = create_target_texture(&device, format, width, height);
        Ok(Self::build(device, queue, format, Target::Offscreen { texture, width, height }))
    }

    fn build(device: wgpu::Device, queue: wgpu::Queue, format: wgpu::TextureFormat, target: Target) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("tile_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/tile.wgsl").into()),
        });

        let globals = Globals {
            projection: Mat4::IDENTITY.to_cols_array_2d(),
            time: [0.0; 4],
            atlases: [[0; 4]; ATLAS_SLOTS],
        };
        let globals_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("globals_buffer"),
            size: std::mem::size_of::<Globals>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        queue.write_buffer(&globals_buffer, 0, bytemuck::bytes_of(&globals));

        let globals_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
            label: Some("globals_bind_group_layout"),
        });
        let globals_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &globals_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_buffer.as_entire_binding(),
            }],
            label: Some("globals_bind_group"),
        });

        let mut atlas_entries: Vec<wgpu::BindGroupLayoutEntry> = (0..ATLAS_SLOTS as u32)
            .map(|binding| wgpu::BindGroupLayoutEntry {
                binding,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension: wgpu::TextureViewDimension::D2,
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                },
                count: None,
            })
            .collect();
        atlas_entries.push(wgpu::BindGroupLayoutEntry {
            binding: ATLAS_SLOTS as u32,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
            count: None,
        });
        let atlas_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &atlas_entries,
            label: Some("atlas_bind_group_layout"),
        });

        // Pixel art: no filtering between texels.
        let atlas_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let blank = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("blank_atlas"),
            size: wgpu::Extent3d { width: 1, height: 1, depth_or_array_layers: 1 },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let blank_view = blank.create_view(&wgpu::TextureViewDescriptor::default());

        let atlas_textures: Vec<Option<Atlas>> = (0..ATLAS_SLOTS).map(|_| None).collect();
        let atlas_bind_group =
            create_atlas_bind_group(&device, &atlas_layout, &atlas_textures, &blank_view, &atlas_sampler);

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("tile_pipeline_layout"),
            bind_group_layouts: &[&globals_layout, &atlas_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("tile_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[cell_layout()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                // The y-down projection flips winding.
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        Self {
            device,
            queue,
            target,
            format,
            pipeline,
            globals,
            globals_buffer,
            globals_bind_group,
            atlas_layout,
            atlas_bind_group,
            atlas_sampler,
            blank_view,
            atlas_textures,
            atlases: AtlasRegistry::new(),
            buffers: HashMap::new(),
            next_handle: 1,
            draw_list: Vec::new(),
            clear_color: wgpu::Color::BLACK,
        }
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.format
    }

    pub fn target_size(&self) -> (u32, u32) {
        match &self.target {
            Target::Window { config, .. } => (config.width, config.height),
            Target::Offscreen { width, height, .. } => (*width, *height),
        }
    }

    pub fn atlases(&self) -> &AtlasRegistry {
        &self.atlases
    }

    pub fn set_projection(&mut self, projection: Mat4) {
        self.globals.projection = projection.to_cols_array_2d();
    }

    /// Seconds since start, driving shader effects.
    pub fn set_time(&mut self, seconds: f32) {
        self.globals.time[0] = seconds;
    }

    pub fn set_clear_color(&mut self, color: Color) {
        let [r, g, b, a] = color.to_f32();
        self.clear_color = wgpu::Color { r: r as f64, g: g as f64, b: b as f64, a: a as f64 };
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        match &mut self.target {
            Target::Window { surface, config } => {
                config.width = width;
                config.height = height;
                surface.configure(&self.device, config);
            }
            Target::Offscreen { texture, width: w, height: h } => {
                *texture = create_target_texture(&self.device, self.format, width, height);
                *w = width;
                *h = height;
            }
        }
    }

    /// Decode an encoded image (PNG, ...) into atlas slot `tilemap_id`.
    pub fn load_atlas(&mut self, tilemap_id: u32, bytes: &[u8], tile_width: u32, tile_height: u32) -> Result<AtlasInfo> {
        let img = image::load_from_memory(bytes).with_context(|| format!("decoding atlas {}", tilemap_id))?;
        self.load_atlas_image(tilemap_id, &img, tile_width, tile_height)
    }

    pub fn load_atlas_image(
        &mut self,
        tilemap_id: u32,
        img: &image::DynamicImage,
        tile_width: u32,
        tile_height: u32,
    ) -> Result<AtlasInfo> {
        let slot = tilemap_id as usize;
        if slot >= ATLAS_SLOTS {
            anyhow::bail!("atlas id {} out of range (max {})", tilemap_id, ATLAS_SLOTS - 1);
        }
        let (width, height) = img.dimensions();
        let info = AtlasInfo {
            columns: width / tile_width.max(1),
            rows: height / tile_height.max(1),
            tile_width: tile_width.max(1),
            tile_height: tile_height.max(1),
        };
        if info.tile_count() == 0 {
            anyhow::bail!(
                "atlas {} is {}x{}px, smaller than one {}x{} tile",
                tilemap_id,
                width,
                height,
                info.tile_width,
                info.tile_height
            );
        }

        let rgba = img.to_rgba8();
        let size = wgpu::Extent3d { width, height, depth_or_array_layers: 1 };
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("atlas"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        self.queue.write_texture(
            wgpu::ImageCopyTexture {
                aspect: wgpu::TextureAspect::All,
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
            },
            &rgba,
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            size,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        self.atlas_textures[slot] = Some(Atlas { _texture: texture, view });
        self.atlases.register(tilemap_id, info);
        // Usable atlas area is whole tiles only.
        self.globals.atlases[slot] = [info.columns, info.rows, 1, 0];
        self.atlas_bind_group = create_atlas_bind_group(
            &self.device,
            &self.atlas_layout,
            &self.atlas_textures,
            &self.blank_view,
            &self.atlas_sampler,
        );
        if info.columns * info.tile_width != width || info.rows * info.tile_height != height {
            tracing::debug!("atlas {}: {}x{}px is not a whole number of tiles", tilemap_id, width, height);
        }
        Ok(info)
    }

    /// Number of cell buffers currently allocated.
    pub fn live_surfaces(&self) -> usize {
        self.buffers.len()
    }

    /// Draw everything submitted since the last present, then clear the draw list.
    pub fn present(&mut self) -> Result<()> {
        self.queue
            .write_buffer(&self.globals_buffer, 0, bytemuck::bytes_of(&self.globals));
        let draws = std::mem::take(&mut self.draw_list);

        match &self.target {
            Target::Window { surface, config } => {
                let output = match surface.get_current_texture() {
                    Ok(output) => output,
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        tracing::debug!("surface lost, reconfiguring");
                        surface.configure(&self.device, config);
                        return Ok(());
                    }
                    Err(wgpu::SurfaceError::Timeout) => {
                        tracing::warn!("surface timeout, skipping frame");
                        return Ok(());
                    }
                    Err(e) => {
                        tracing::error!("surface error: {}", e);
                        return Err(e.into());
                    }
                };
                let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());
                self.encode_and_submit(&view, &draws);
                output.present();
            }
            Target::Offscreen { texture, .. } => {
                let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
                self.encode_and_submit(&view, &draws);
            }
        }
        Ok(())
    }

    fn encode_and_submit(&self, view: &wgpu::TextureView, draws: &[SurfaceHandle]) {
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some("tile_encoder") });
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("tile_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            rpass.set_pipeline(&self.pipeline);
            rpass.set_bind_group(0, &self.globals_bind_group, &[]);
            rpass.set_bind_group(1, &self.atlas_bind_group, &[]);
            for handle in draws {
                let Some(cells) = self.buffers.get(&handle.0) else {
                    continue;
                };
                rpass.set_vertex_buffer(0, cells.buffer.slice(..));
                rpass.draw(0..6, 0..cells.count());
            }
        }
        self.queue.submit(Some(encoder.finish()));
    }

    /// RGBA8 pixels of the offscreen target, row-major without padding.
    pub fn read_pixels(&self) -> Result<Vec<u8>> {
        let Target::Offscreen { texture, width, height } = &self.target else {
            anyhow::bail!("read_pixels needs an offscreen backend");
        };
        let (width, height) = (*width, *height);
        let bytes_per_pixel = 4u32;
        let unpadded = width * bytes_per_pixel;
        let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
        let padded = unpadded.div_ceil(align) * align;

        let staging = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("readback"),
            size: (padded * height) as u64,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some("readback_encoder") });
        encoder.copy_texture_to_buffer(
            wgpu::ImageCopyTexture {
                texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::ImageCopyBuffer {
                buffer: &staging,
                layout: wgpu::ImageDataLayout {
                    offset: 0,
                    bytes_per_row: Some(padded),
                    rows_per_image: Some(height),
                },
            },
            wgpu::Extent3d { width, height, depth_or_array_layers: 1 },
        );
        self.queue.submit(Some(encoder.finish()));

        let slice = staging.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        self.device.poll(wgpu::Maintain::Wait);
        rx.recv()
            .context("readback callback dropped")?
            .context("mapping readback buffer")?;

        let data = slice.get_mapped_range();
        let mut pixels = Vec::with_capacity((unpadded * height) as usize);
        for row in data.chunks_exact(padded as usize) {
            pixels.extend_from_slice(&row[..unpadded as usize]);
        }
        drop(data);
        staging.unmap();
        Ok(pixels)
    }
}

impl SurfaceBackend for GpuBackend {
    fn allocate_surface(&mut self, width: u32, height: u32) -> SurfaceHandle {
        let (width, height) = (width.max(1), height.max(1));
        let handle = SurfaceHandle(self.next_handle);
        self.next_handle += 1;
        let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("cell_buffer"),
            size: width as u64 * height as u64 * PackedCell::STRIDE,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        self.buffers.insert(handle.0, CellBuffer { buffer, width, height });
        handle
    }

    fn upload_cell(&mut self, handle: SurfaceHandle, col: u32, row: u32, cell: PackedCell) {
        let Some(cells) = self.buffers.get(&handle.0) else {
            return;
        };
        if col >= cells.width || row >= cells.height {
            return;
        }
        let offset = (row as u64 * cells.width as u64 + col as u64) * PackedCell::STRIDE;
        self.queue.write_buffer(&cells.buffer, offset, bytemuck::bytes_of(&cell));
    }

    fn upload_all(&mut self, handle: SurfaceHandle, _width: u32, cells: &[PackedCell]) {
        let Some(target) = self.buffers.get(&handle.0) else {
            return;
        };
        let n = cells.len().min(target.count() as usize);
        if n > 0 {
            self.queue.write_buffer(&target.buffer, 0, bytemuck::cast_slice(&cells[..n]));
        }
    }

    fn submit(&mut self, handle: SurfaceHandle) {
        if self.buffers.contains_key(&handle.0) {
            self.draw_list.push(handle);
        }
    }

    fn free(&mut self, handle: SurfaceHandle) {
        if let Some(cells) = self.buffers.remove(&handle.0) {
            cells.buffer.destroy();
        }
        self.draw_list.retain(|h| *h != handle);
    }
}

impl AtlasProvider for GpuBackend {
    fn atlas(&self, tilemap_id: u32) -> Option<AtlasInfo> {
        self.atlases.atlas(tilemap_id)
    }
}

fn create_target_texture(device: &wgpu::Device, format: wgpu::TextureFormat, width: u32, height: u32) -> wgpu::Texture {
    device.create_texture(&wgpu::TextureDescriptor {
        label: Some("offscreen_target"),
        size: wgpu::Extent3d { width, height, depth_or_array_layers: 1 },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    })
}

fn create_atlas_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    atlases: &[Option<Atlas>],
    blank: &wgpu::TextureView,
    sampler: &wgpu::Sampler,
) -> wgpu::BindGroup {
    let mut entries: Vec<wgpu::BindGroupEntry> = atlases
        .iter()
        .enumerate()
        .map(|(i, atlas)| wgpu::BindGroupEntry {
            binding: i as u32,
            resource: wgpu::BindingResource::TextureView(atlas.as_ref().map_or(blank, |a| &a.view)),
        })
        .collect();
    entries.push(wgpu::BindGroupEntry {
        binding: atlases.len() as u32,
        resource: wgpu::BindingResource::Sampler(sampler),
    });
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout,
        entries: &entries,
        label: Some("atlas_bind_group"),
    })
}
