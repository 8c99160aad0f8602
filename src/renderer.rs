// renderer.rs - 渲染器：地球外圆 + 经纬网（LineList）+ egui 界面

use glam::DVec2;
use globe_viewer::config::Style;
use globe_viewer::scene::Scene;
use wgpu::util::DeviceExt;
use winit::window::Window;

/// GPU setup failures; per-frame surface errors are handled by the event loop.
#[derive(Debug, thiserror::Error)]
pub enum RendererError {
    #[error("failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),
    #[error("no compatible graphics adapter")]
    NoAdapter,
    #[error("failed to request device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
}

fn setup_egui_ui_fonts(ctx: &egui::Context) {
    // 界面字体：简中需要 CJK 字体，其余语言 egui 默认字体即可覆盖。
    // ab_glyph 对 .ttc 支持不稳定，优先 .ttf/.otf；解析失败的文件直接跳过。
    fn try_load_font_from_path(path: &std::path::Path) -> Option<Vec<u8>> {
        let bytes = std::fs::read(path).ok()?;
        ab_glyph::FontArc::try_from_vec(bytes.clone()).ok()?;
        Some(bytes)
    }

    let mut candidates: Vec<std::path::PathBuf> = Vec::new();

    if cfg!(windows) {
        let win_fonts = std::path::PathBuf::from(r"C:\Windows\Fonts");
        candidates.push(win_fonts.join("msyh.ttf"));
        candidates.push(win_fonts.join("simhei.ttf"));
        candidates.push(win_fonts.join("Deng.ttf"));
    } else if cfg!(target_os = "macos") {
        candidates.push("/System/Library/Fonts/Supplemental/Arial Unicode.ttf".into());
        candidates.push("/Library/Fonts/NotoSansSC-Regular.otf".into());
        candidates.push("/System/Library/Fonts/PingFang.ttc".into());
    } else if cfg!(unix) {
        for p in [
            "/usr/share/fonts/opentype/noto/NotoSansSC-Regular.otf",
            "/usr/share/fonts/truetype/noto/NotoSansSC-Regular.ttf",
            "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc",
            "/usr/share/fonts/truetype/wqy/wqy-microhei.ttc",
        ] {
            candidates.push(p.into());
        }
    }

    // 用户可在 assets 下自行放置字体
    for f in ["NotoSansSC-Regular.otf", "NotoSansSC-Regular.ttf"] {
        if let Ok(exe) = std::env::current_exe() {
            if let Some(dir) = exe.parent() {
                candidates.push(dir.join("assets").join(f));
            }
        }
        candidates.push(std::path::PathBuf::from("assets").join(f));
    }

    let Some((font_path, font_bytes)) = candidates
        .into_iter()
        .find_map(|p| try_load_font_from_path(&p).map(|b| (p, b)))
    else {
        log::warn!("{}", crate::i18n::tr("font.not_found"));
        return;
    };

    log::info!(
        "{}",
        crate::i18n::tr_with("font.using", &[("path", font_path.display().to_string())])
    );

    let mut fonts = egui::FontDefinitions::default();
    fonts.font_data.insert("ui".to_owned(), egui::FontData::from_owned(font_bytes));
    // 追加在默认字体之后，仅作为缺字回退
    for family in [egui::FontFamily::Proportional, egui::FontFamily::Monospace] {
        if let Some(list) = fonts.families.get_mut(&family) {
            list.push("ui".to_owned());
        }
    }
    ctx.set_fonts(fonts);
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LineVertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl LineVertex {
    const ATTRIBS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x4];

    fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<LineVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

fn srgb_to_linear(c: u8) -> f32 {
    let c = f32::from(c) / 255.0;
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

fn linear_rgba([r, g, b]: [u8; 3], alpha: f32) -> [f32; 4] {
    [srgb_to_linear(r), srgb_to_linear(g), srgb_to_linear(b), alpha]
}

/// Expands the scene polylines into a line list in normalized device coordinates.
/// `size` is the surface size in the same pixels as the scene.
pub fn scene_vertices(scene: &Scene, style: &Style, size: DVec2) -> Vec<LineVertex> {
    let to_ndc = |p: DVec2| -> [f32; 2] {
        [(2.0 * p.x / size.x - 1.0) as f32, (1.0 - 2.0 * p.y / size.y) as f32]
    };

    let mut out = Vec::with_capacity(2 * scene.segment_count());
    let mut push_line = |line: &[DVec2], color: [f32; 4]| {
        for w in line.windows(2) {
            out.push(LineVertex { position: to_ndc(w[0]), color });
            out.push(LineVertex { position: to_ndc(w[1]), color });
        }
    };

    push_line(scene.outline.as_slice(), linear_rgba(style.outline, style.opacity));
    let graticule_color = linear_rgba(style.graticule, style.opacity);
    for line in &scene.graticule {
        push_line(line.as_slice(), graticule_color);
    }
    out
}

pub struct Renderer {
    surface: wgpu::Surface,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    pub size: winit::dpi::PhysicalSize<u32>,
    line_pipeline: wgpu::RenderPipeline,

    // 每次旋转变化后整体重建
    vertex_buffer: wgpu::Buffer,
    vertex_count: u32,

    // UI
    pub egui_ctx: egui::Context,
    pub egui_state: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

impl Renderer {
    pub async fn new(window: std::sync::Arc<Window>) -> Result<Self, RendererError> {
        let size = window.inner_size();
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        // SAFETY: 窗口由 Arc 持有，生命周期覆盖整个事件循环
        let surface = unsafe { instance.create_surface(window.as_ref()) }?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(RendererError::NoAdapter)?;
        log::info!("using adapter: {}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    features: wgpu::Features::empty(),
                    limits: if cfg!(target_arch = "wasm32") {
                        wgpu::Limits::downlevel_webgl2_defaults()
                    } else {
                        wgpu::Limits::default().using_resolution(adapter.limits())
                    },
                    label: None,
                },
                None,
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
        };
        surface.configure(&device, &config);

        let shader = device.create_shader_module(wgpu::include_wgsl!("shader_lines.wgsl"));
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Line Pipeline Layout"),
            bind_group_layouts: &[],
            push_constant_ranges: &[],
        });

        let line_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Line Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: "vs_main",
                buffers: &[LineVertex::desc()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::LineList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
        });

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Scene Vertex Buffer"),
            contents: &[],
            usage: wgpu::BufferUsages::VERTEX,
        });

        let egui_ctx = egui::Context::default();
        setup_egui_ui_fonts(&egui_ctx);

        // 高 DPI：egui 使用逻辑像素，场景使用物理像素
        let mut egui_state = egui_winit::State::new(window.as_ref());
        egui_state.set_pixels_per_point(window.scale_factor() as f32);

        let egui_renderer = egui_wgpu::Renderer::new(&device, config.format, None, 1);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            size,
            line_pipeline,
            vertex_buffer,
            vertex_count: 0,
            egui_ctx,
            egui_state,
            egui_renderer,
        })
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    /// Replaces the GPU copy of the scene. Call after every rotation or layout change.
    pub fn upload_scene(&mut self, scene: &Scene, style: &Style) {
        let size = DVec2::new(f64::from(self.config.width), f64::from(self.config.height));
        let vertices = scene_vertices(scene, style, size);
        self.vertex_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Scene Vertex Buffer"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        self.vertex_count = vertices.len() as u32;
    }

    pub fn render_with_ui(
        &mut self,
        window: &Window,
        run_ui: impl FnOnce(&egui::Context),
    ) -> Result<(), wgpu::SurfaceError> {
        let output = self.surface.get_current_texture()?;
        let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Render Encoder"),
        });

        // 1. 场景
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color { r: 0.02, g: 0.02, b: 0.03, a: 1.0 }),
                        store: true,
                    },
                })],
                depth_stencil_attachment: None,
            });

            if self.vertex_count > 0 {
                render_pass.set_pipeline(&self.line_pipeline);
                render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
                render_pass.draw(0..self.vertex_count, 0..1);
            }
        }

        // 2. UI
        let raw_input = self.egui_state.take_egui_input(window);
        let full_output = self.egui_ctx.run(raw_input, run_ui);

        self.egui_state
            .handle_platform_output(window, &self.egui_ctx, full_output.platform_output);
        let clipped_primitives = self.egui_ctx.tessellate(full_output.shapes);

        let screen_descriptor = egui_wgpu::renderer::ScreenDescriptor {
            size_in_pixels: [self.config.width, self.config.height],
            pixels_per_point: window.scale_factor() as f32,
        };

        for (id, delta) in &full_output.textures_delta.set {
            self.egui_renderer.update_texture(&self.device, &self.queue, *id, delta);
        }

        self.egui_renderer.update_buffers(
            &self.device,
            &self.queue,
            &mut encoder,
            &clipped_primitives,
            &screen_descriptor,
        );

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Egui Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations { load: wgpu::LoadOp::Load, store: true },
                })],
                depth_stencil_attachment: None,
            });
            self.egui_renderer.render(&mut render_pass, &clipped_primitives, &screen_descriptor);
        }

        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn srgb_endpoints() {
        assert_eq!(srgb_to_linear(0), 0.0);
        assert!((srgb_to_linear(255) - 1.0).abs() < 1e-6);
        assert!(srgb_to_linear(128) < 0.5);
    }

    #[test]
    fn vertices_map_pixels_to_ndc() {
        let scene = Scene {
            outline: vec![DVec2::new(0.0, 0.0), DVec2::new(100.0, 50.0)],
            graticule: vec![vec![DVec2::new(50.0, 25.0), DVec2::new(100.0, 0.0), DVec2::new(0.0, 50.0)]],
        };
        let v = scene_vertices(&scene, &Style::default(), DVec2::new(100.0, 50.0));
        // 1 条外圆线段 + 2 条经纬线段
        assert_eq!(v.len(), 6);
        assert_eq!(v[0].position, [-1.0, 1.0]);
        assert_eq!(v[1].position, [1.0, -1.0]);
        assert_eq!(v[2].position, [0.0, 0.0]);
        assert_eq!(v[0].color[3], 0.5);
        assert_ne!(v[0].color, v[2].color);
    }
}
