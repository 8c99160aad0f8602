// main.rs - 窗口、事件循环、菜单与状态栏；指针事件交给 Globe 处理

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // Release 模式下隐藏控制台窗口

mod i18n;
mod renderer;

use glam::DVec2;
use globe_viewer::config::GlobeConfig;
use globe_viewer::drag::PointerEvent;
use globe_viewer::globe::Globe;
use globe_viewer::projection::{fit_to_viewport, Rotation};
use globe_viewer::svg;
use renderer::Renderer;

use std::path::PathBuf;
use std::sync::Arc;
use winit::{
    dpi::{LogicalSize, PhysicalPosition, PhysicalSize},
    event::*,
    event_loop::{ControlFlow, EventLoop},
    window::WindowBuilder,
};

/// Requests collected from one egui frame, applied once the frame is done.
#[derive(Debug, Default)]
struct UiActions {
    export_to: Option<PathBuf>,
    set_rotation: Option<Rotation>,
    reset_rotation: bool,
    exit: bool,
}

fn main() {
    env_logger::init();

    let mut current_lang = i18n::resolve_lang_from_args();
    i18n::init(current_lang.clone());
    let config = GlobeConfig::resolve();

    let event_loop = EventLoop::new();
    let window = match WindowBuilder::new()
        .with_title(i18n::tr("app.title"))
        .with_inner_size(LogicalSize::new(1280, 720))
        .build(&event_loop)
    {
        Ok(w) => Arc::new(w),
        Err(e) => {
            log::error!("failed to create window: {e}");
            return;
        }
    };

    let mut renderer = match pollster::block_on(Renderer::new(window.clone())) {
        Ok(r) => r,
        Err(e) => {
            log::error!("{e}");
            return;
        }
    };

    let (scale, center) = layout_for(renderer.size, &config);
    let mut globe = Globe::new(&config, scale, center);
    renderer.upload_scene(&globe.scene(), &config.style);

    // 交互状态
    let mut cursor: Option<PhysicalPosition<f64>> = None;
    let mut status: Option<String> = None;

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Poll;
        let mut scene_dirty = false;

        match event {
            Event::WindowEvent { event, .. } => {
                // 拖拽进行中时不让 egui 吞掉指针事件，否则会丢失 Up
                let response = renderer.egui_state.on_event(&renderer.egui_ctx, &event);
                if response.consumed && !globe.is_dragging() {
                    return;
                }

                match event {
                    WindowEvent::CloseRequested => {
                        *control_flow = ControlFlow::Exit;
                    }

                    WindowEvent::Resized(new_size) => {
                        renderer.resize(new_size);
                        let (scale, center) = layout_for(renderer.size, &config);
                        scene_dirty |= globe.set_layout(scale, center);
                    }

                    WindowEvent::MouseInput { state, button: MouseButton::Left, .. } => {
                        if let Some(pos) = cursor {
                            let pt = DVec2::new(pos.x, pos.y);
                            let pointer = match state {
                                ElementState::Pressed => PointerEvent::Down(pt),
                                ElementState::Released => PointerEvent::Up(pt),
                            };
                            globe.handle(pointer, |_| scene_dirty = true);
                        }
                    }

                    WindowEvent::CursorMoved { position, .. } => {
                        cursor = Some(position);
                        globe.handle(PointerEvent::Move(DVec2::new(position.x, position.y)), |_| {
                            scene_dirty = true
                        });
                    }

                    // 指针离开窗口：以最后位置补发一次 Up
                    WindowEvent::CursorLeft { .. } => {
                        if let Some(pos) = cursor.filter(|_| globe.is_dragging()) {
                            globe.handle(PointerEvent::Up(DVec2::new(pos.x, pos.y)), |_| scene_dirty = true);
                        }
                    }

                    _ => {}
                }
            }

            Event::RedrawRequested(_) => {
                let mut actions = UiActions::default();
                let render_result = renderer.render_with_ui(&window, |ctx| {
                    draw_ui(ctx, &globe, &mut actions, status.as_deref(), &window, &mut current_lang);
                });

                if let Some(rotation) = actions.set_rotation {
                    globe.set_rotation(rotation);
                    scene_dirty = true;
                }
                if actions.reset_rotation {
                    globe.reset_rotation();
                    scene_dirty = true;
                }
                if let Some(path) = actions.export_to {
                    status = Some(export_svg(&globe, &config, &path));
                }
                if actions.exit {
                    *control_flow = ControlFlow::Exit;
                }

                match render_result {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => renderer.resize(renderer.size),
                    Err(wgpu::SurfaceError::OutOfMemory) => *control_flow = ControlFlow::Exit,
                    Err(e) => log::error!("render error: {e:?}"),
                }
            }

            Event::MainEventsCleared => {
                window.request_redraw();
            }

            _ => {}
        }

        if scene_dirty {
            renderer.upload_scene(&globe.scene(), &config.style);
        }
    });
}

fn layout_for(size: PhysicalSize<u32>, config: &GlobeConfig) -> (f64, DVec2) {
    fit_to_viewport(
        f64::from(size.width),
        f64::from(size.height),
        config.radius,
        config.padding,
    )
}

fn export_svg(globe: &Globe, config: &GlobeConfig, path: &std::path::Path) -> String {
    let projection = globe.projection();
    let padding = config.padding * projection.scale() / config.radius;
    let view_box = svg::view_box(projection.translate(), projection.scale(), padding);
    match svg::export(
        path,
        &globe.scene(),
        &config.style,
        projection.translate(),
        projection.scale(),
        view_box,
    ) {
        Ok(()) => i18n::tr_with("status.exported", &[("path", path.display().to_string())]),
        Err(e) => {
            log::warn!("svg export to {} failed: {e}", path.display());
            i18n::tr_with("error.export", &[("err", e.to_string())])
        }
    }
}

fn draw_ui(
    ctx: &egui::Context,
    globe: &Globe,
    actions: &mut UiActions,
    status: Option<&str>,
    window: &winit::window::Window,
    current_lang: &mut String,
) {
    egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
        egui::menu::bar(ui, |ui| {
            ui.menu_button(i18n::tr("menu.file"), |ui| {
                if ui.button(i18n::tr("menu.export_svg")).clicked() {
                    ui.close_menu();
                    actions.export_to = rfd::FileDialog::new()
                        .add_filter(&i18n::tr("file.filter.svg"), &["svg"])
                        .set_file_name("globe.svg")
                        .save_file();
                }
                if ui.button(i18n::tr("menu.exit")).clicked() {
                    actions.exit = true;
                }
            });

            ui.menu_button(i18n::tr("menu.view"), |ui| {
                if ui.button(i18n::tr("view.reset")).clicked() {
                    actions.reset_rotation = true;
                    ui.close_menu();
                }

                ui.separator();
                ui.label(i18n::tr("view.rotation"));
                let mut r = globe.projection().rotate();
                let mut changed = false;
                egui::Grid::new("rotation_grid").num_columns(2).show(ui, |ui| {
                    for (key, value) in [
                        ("view.yaw", &mut r.lambda),
                        ("view.pitch", &mut r.phi),
                        ("view.roll", &mut r.gamma),
                    ] {
                        ui.label(i18n::tr(key));
                        changed |= ui
                            .add(egui::DragValue::new(value).speed(0.5).suffix("°").max_decimals(1))
                            .changed();
                        ui.end_row();
                    }
                });
                if changed {
                    actions.set_rotation = Some(r);
                }
            });

            ui.menu_button(i18n::tr("menu.language"), |ui| {
                for (code, name) in i18n::LANGUAGES {
                    if ui.radio_value(current_lang, code.to_string(), name).clicked() {
                        i18n::init(current_lang.clone());
                        window.set_title(&i18n::tr("app.title"));
                        ui.close_menu();
                    }
                }
            });
        });
    });

    egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
        ui.horizontal(|ui| {
            let r = globe.projection().rotate().wrapped();
            ui.label(format!("{}: {:.1}°", i18n::tr("view.yaw"), r.lambda));
            ui.label("|");
            ui.label(format!("{}: {:.1}°", i18n::tr("view.pitch"), r.phi));
            ui.label("|");
            ui.label(format!("{}: {:.1}°", i18n::tr("view.roll"), r.gamma));
            ui.label("|");
            if globe.is_dragging() {
                ui.label(egui::RichText::new(i18n::tr("status.dragging")).color(egui::Color32::YELLOW));
            } else {
                ui.label(i18n::tr("status.idle"));
            }

            if let Some(msg) = status {
                ui.label("|");
                ui.label(msg);
            }
        });
    });
}
