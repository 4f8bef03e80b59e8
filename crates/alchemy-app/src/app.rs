//! Core application state and lifecycle.

use alchemy_core::{BrushConfig, MouseButton as PointerButton, PointerEvent, SettingsUpdate, TouchPhase};
use alchemy_render::{Bitmap, BrushCanvas, DrawSurface, PREVIEW_LIMIT};
use kurbo::{Affine, Point, Rect};
use peniko::{Blob, Color, Fill, ImageAlphaType, ImageData, ImageFormat};
use std::path::Path;
use std::sync::Arc;
use vello::util::{RenderContext, RenderSurface};
use vello::wgpu::PresentMode;
use vello::{AaConfig, RenderParams, RendererOptions, Scene};
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalPosition, LogicalSize, PhysicalPosition, PhysicalSize};
use winit::event::{ElementState, MouseButton, Touch, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::{Key, ModifiersState, NamedKey};
use winit::window::{Window, WindowId};

use crate::shortcuts::{ShortcutAction, ShortcutRegistry};

#[cfg(feature = "native")]
mod file_ops {
    use alchemy_render::EXPORT_FILE_NAME;

    /// Export PNG to file using native file dialog.
    pub fn export_png(png_data: &[u8]) {
        let dialog = rfd::FileDialog::new()
            .set_title("Export PNG")
            .set_file_name(EXPORT_FILE_NAME)
            .add_filter("PNG Image", &["png"]);

        let Some(path) = dialog.save_file() else {
            log::info!("Export cancelled");
            return;
        };
        if let Err(e) = std::fs::write(&path, png_data) {
            log::error!("Failed to write PNG: {}", e);
        } else {
            log::info!("Exported PNG to: {:?}", path);
        }
    }

    /// Pick SVG files to import and read them.
    pub fn pick_svg_files() -> Vec<String> {
        let dialog = rfd::FileDialog::new()
            .set_title("Import Shapes")
            .add_filter("SVG", &["svg"]);

        dialog
            .pick_files()
            .unwrap_or_default()
            .iter()
            .filter_map(|path| super::read_svg(path))
            .collect()
    }
}

#[cfg(not(feature = "native"))]
mod file_ops {
    use alchemy_render::EXPORT_FILE_NAME;

    /// Without a dialog, export lands in the working directory.
    pub fn export_png(png_data: &[u8]) {
        if let Err(e) = std::fs::write(EXPORT_FILE_NAME, png_data) {
            log::error!("Failed to write PNG: {}", e);
        } else {
            log::info!("Exported PNG to: {}", EXPORT_FILE_NAME);
        }
    }

    pub fn pick_svg_files() -> Vec<String> {
        log::warn!("No file dialog available; drop SVG files on the window instead");
        Vec::new()
    }
}

fn read_svg(path: &Path) -> Option<String> {
    match std::fs::read_to_string(path) {
        Ok(svg) => Some(svg),
        Err(e) => {
            log::error!("Failed to read {:?}: {}", path, e);
            None
        }
    }
}

fn is_svg(path: &Path) -> bool {
    path.extension()
        .map(|e| e.to_string_lossy().eq_ignore_ascii_case("svg"))
        .unwrap_or(false)
}

/// Tints cycled by the color shortcut.
const PALETTE: [&str; 6] = ["#ffffff", "#f87171", "#fbbf24", "#34d399", "#60a5fa", "#c084fc"];
const SIZE_STEP: f64 = 10.0;
const OPACITY_STEP: f64 = 0.05;

/// Edge length of a group preview tile on screen.
const PREVIEW_TILE: f64 = 28.0;
const PREVIEW_MARGIN: f64 = 8.0;
const PREVIEW_GAP: f64 = 4.0;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub brush: BrushConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "Alchemy Brush".to_string(),
            width: 1280,
            height: 800,
            brush: BrushConfig::default(),
        }
    }
}

/// Premultiplied RGBA pixels wrapped for the presenter.
fn premultiplied_image(data: &[u8], width: u32, height: u32) -> ImageData {
    ImageData {
        data: Blob::new(Arc::new(data.to_vec())),
        format: ImageFormat::Rgba8,
        width,
        height,
        alpha_type: ImageAlphaType::AlphaPremultiplied,
    }
}

fn surface_image(surface: &DrawSurface) -> Option<ImageData> {
    let pixmap = surface.pixmap()?;
    Some(premultiplied_image(pixmap.data(), pixmap.width(), pixmap.height()))
}

fn bitmap_image(bitmap: &Bitmap) -> ImageData {
    premultiplied_image(bitmap.pixmap().data(), bitmap.width(), bitmap.height())
}

/// White previews of one shape group.
struct GroupPreview {
    name: String,
    images: Vec<ImageData>,
}

fn build_previews(canvas: &BrushCanvas) -> Vec<GroupPreview> {
    canvas
        .previews()
        .into_iter()
        .map(|(name, bitmaps)| GroupPreview {
            name,
            images: bitmaps.iter().map(bitmap_image).collect(),
        })
        .collect()
}

/// Runtime state for the application, alive while the window is.
struct AppState {
    // Windowing
    window: Arc<Window>,
    surface: RenderSurface<'static>,

    // Rendering
    vello_renderer: vello::Renderer,
    texture_blitter: vello::wgpu::util::TextureBlitter,
    scene: Scene,
    /// Last uploaded copy of the drawing; `None` when it must be refreshed.
    frame: Option<ImageData>,
    previews: Vec<GroupPreview>,

    // Session
    canvas: BrushCanvas,
    background: Color,
    /// Last known pointer position in logical units.
    cursor: Option<Point>,
    scale_factor: f64,
    modifiers: ModifiersState,
    palette_index: usize,
}

impl AppState {
    fn mark_dirty(&mut self) {
        self.frame = None;
        self.window.request_redraw();
    }

    fn pointer(&mut self, event: PointerEvent) {
        self.canvas.handle_pointer_event(event);
        if self.canvas.is_drawing() {
            self.mark_dirty();
        }
    }

    fn import(&mut self, payloads: Vec<String>) {
        if self.canvas.import_shapes(payloads).is_empty() {
            return;
        }
        self.previews = build_previews(&self.canvas);
        self.window.request_redraw();
    }

    fn run_shortcut(&mut self, action: ShortcutAction) {
        let settings = self.canvas.brush_settings();
        match action {
            ShortcutAction::Clear => {
                self.canvas.clear();
                self.mark_dirty();
            }
            ShortcutAction::Export => match self.canvas.export_png() {
                Ok(png) => file_ops::export_png(&png),
                Err(e) => log::error!("Export failed: {}", e),
            },
            ShortcutAction::Import => {
                let payloads = file_ops::pick_svg_files();
                self.import(payloads);
            }
            ShortcutAction::ToggleMirror => {
                let mirrored = !self.canvas.is_mirrored();
                self.canvas.set_mirrored(mirrored);
                log::info!("Mirror {}", if mirrored { "on" } else { "off" });
            }
            ShortcutAction::NextColor => {
                self.palette_index = (self.palette_index + 1) % PALETTE.len();
                let mut update = SettingsUpdate::from((settings, self.canvas.is_mirrored()));
                update.color = PALETTE[self.palette_index].to_string();
                match self.canvas.apply_settings(&update) {
                    Ok(()) => log::info!("Brush color {}", update.color),
                    Err(e) => log::warn!("Rejected brush color: {}", e),
                }
            }
            ShortcutAction::SizeDown | ShortcutAction::SizeUp => {
                let step = if action == ShortcutAction::SizeUp { SIZE_STEP } else { -SIZE_STEP };
                let settings = settings.with_size(settings.size + step);
                self.canvas.set_brush_settings(settings);
                log::info!("Brush size {}", settings.size);
            }
            ShortcutAction::OpacityDown | ShortcutAction::OpacityUp => {
                let step = if action == ShortcutAction::OpacityUp {
                    OPACITY_STEP
                } else {
                    -OPACITY_STEP
                };
                let settings = settings.with_opacity(settings.opacity + step);
                self.canvas.set_brush_settings(settings);
                log::info!("Brush opacity {:.2}", settings.opacity);
            }
            ShortcutAction::ToggleGroup(index) => {
                let Some(name) = self.canvas.library().groups().get(index).map(|g| g.name.clone()) else {
                    return;
                };
                if let Some(active) = self.canvas.toggle_group(&name) {
                    log::info!("Group '{}' {}", name, if active { "enabled" } else { "disabled" });
                }
                self.window.request_redraw();
            }
            ShortcutAction::ShowHelp => ShortcutRegistry::log_all(),
        }
    }

    /// Track the window size in logical units. Zero-area sizes are skipped.
    fn resize_canvas(&mut self, size: PhysicalSize<u32>) {
        if let Some((width, height)) = logical_size(size, self.scale_factor) {
            self.canvas.request_resize(width, height);
        }
    }

    /// Build the scene: the drawing, then the group previews on top.
    ///
    /// The canvas works in logical units; the scene scales it to device pixels.
    fn build_scene(&mut self) {
        self.scene.reset();
        let view = Affine::scale(self.scale_factor);

        if self.frame.is_none() {
            self.frame = surface_image(self.canvas.surface());
        }
        if let Some(frame) = &self.frame {
            self.scene.draw_image(&frame.clone().into(), view);
        }

        let scale = PREVIEW_TILE / alchemy_render::STAMP_BITMAP_SIZE as f64;
        let dim = Color::from_rgba8(17, 24, 39, 190);
        for (row, preview) in self.previews.iter().enumerate() {
            let y = PREVIEW_MARGIN + row as f64 * (PREVIEW_TILE + PREVIEW_GAP * 2.0);
            for (col, image) in preview.images.iter().enumerate() {
                let x = PREVIEW_MARGIN + col as f64 * (PREVIEW_TILE + PREVIEW_GAP);
                let transform = view * Affine::translate((x, y)) * Affine::scale(scale);
                self.scene.draw_image(&image.clone().into(), transform);
            }
            if !self.canvas.library().is_group_active(&preview.name) {
                let width = PREVIEW_LIMIT as f64 * (PREVIEW_TILE + PREVIEW_GAP);
                let rect = Rect::new(PREVIEW_MARGIN, y, PREVIEW_MARGIN + width, y + PREVIEW_TILE);
                self.scene.fill(Fill::NonZero, view, dim, None, &rect);
            }
        }
    }

    fn render(&mut self, render_cx: &RenderContext) {
        if self.canvas.flush_resize() {
            self.frame = None;
        }
        self.canvas.poll_rasterizer();
        self.build_scene();

        let device_handle = &render_cx.devices[self.surface.dev_id];
        let device = &device_handle.device;
        let queue = &device_handle.queue;

        let surface_texture = match self.surface.surface.get_current_texture() {
            Ok(t) => t,
            Err(e) => {
                log::warn!("Failed to get surface texture: {:?}", e);
                return;
            }
        };

        let width = self.surface.config.width;
        let height = self.surface.config.height;

        let params = RenderParams {
            base_color: self.background,
            width,
            height,
            antialiasing_method: AaConfig::Area,
        };

        // Vello needs a storage-bindable Rgba8Unorm target; the surface may be Bgra8Unorm.
        let render_texture = device.create_texture(&vello::wgpu::TextureDescriptor {
            label: Some("vello render texture"),
            size: vello::wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: vello::wgpu::TextureDimension::D2,
            format: vello::wgpu::TextureFormat::Rgba8Unorm,
            usage: vello::wgpu::TextureUsages::STORAGE_BINDING
                | vello::wgpu::TextureUsages::COPY_SRC
                | vello::wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let render_texture_view =
            render_texture.create_view(&vello::wgpu::TextureViewDescriptor::default());

        if let Err(e) = self.vello_renderer.render_to_texture(
            device,
            queue,
            &self.scene,
            &render_texture_view,
            &params,
        ) {
            log::error!("Failed to render: {:?}", e);
            return;
        }

        let surface_view = surface_texture
            .texture
            .create_view(&vello::wgpu::TextureViewDescriptor::default());
        let mut blit_encoder = device.create_command_encoder(&vello::wgpu::CommandEncoderDescriptor {
            label: Some("blit encoder"),
        });
        self.texture_blitter
            .copy(device, &mut blit_encoder, &render_texture_view, &surface_view);
        queue.submit(std::iter::once(blit_encoder.finish()));
        surface_texture.present();

        // Keep polling until the shape cache settles.
        if self.canvas.cache().is_rebuilding() {
            self.window.request_redraw();
        }
    }
}

/// Main application struct.
pub struct App {
    config: AppConfig,
    state: Option<AppState>,
    render_cx: Option<RenderContext>,
}

impl App {
    /// Create an application with the user's brush configuration.
    pub fn new() -> Self {
        Self::with_config(AppConfig {
            brush: BrushConfig::load_or_default(),
            ..AppConfig::default()
        })
    }

    /// Create a new application with custom configuration.
    pub fn with_config(config: AppConfig) -> Self {
        Self {
            config,
            state: None,
            render_cx: None,
        }
    }

    /// Run the application.
    pub async fn run() {
        let event_loop = match EventLoop::new() {
            Ok(event_loop) => event_loop,
            Err(e) => {
                log::error!("Failed to create event loop: {}", e);
                return;
            }
        };
        let mut app = App::new();
        if let Err(e) = event_loop.run_app(&mut app) {
            log::error!("Event loop error: {}", e);
        }
    }

    /// Create the window, its render surface and a fresh drawing session.
    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<AppState, String> {
        let window_attrs = Window::default_attributes()
            .with_title(&self.config.title)
            .with_inner_size(LogicalSize::new(self.config.width, self.config.height));
        let window = Arc::new(
            event_loop
                .create_window(window_attrs)
                .map_err(|e| format!("Failed to create window: {}", e))?,
        );

        let size = window.inner_size();
        let (width, height) = if size.width == 0 || size.height == 0 {
            (self.config.width, self.config.height)
        } else {
            (size.width, size.height)
        };

        let render_cx = self.render_cx.get_or_insert_with(RenderContext::new);
        let surface = pollster::block_on(render_cx.create_surface(
            window.clone(),
            width,
            height,
            PresentMode::AutoVsync,
        ))
        .map_err(|e| format!("Failed to create surface: {:?}", e))?;

        let device = &render_cx.devices[surface.dev_id].device;
        let vello_renderer = vello::Renderer::new(device, RendererOptions::default())
            .map_err(|e| format!("Failed to create Vello renderer: {:?}", e))?;
        let texture_blitter = vello::wgpu::util::TextureBlitter::new(device, surface.config.format);

        let scale_factor = window.scale_factor();
        let (canvas_width, canvas_height) = logical_size(
            PhysicalSize::new(surface.config.width, surface.config.height),
            scale_factor,
        )
        .unwrap_or((self.config.width, self.config.height));
        let canvas = BrushCanvas::new(canvas_width, canvas_height, &self.config.brush);
        let previews = build_previews(&canvas);

        log::info!(
            "Alchemy Brush initialized - {}x{} (scale {})",
            canvas_width,
            canvas_height,
            scale_factor
        );
        log::info!("Press H to list keyboard shortcuts");

        Ok(AppState {
            window,
            surface,
            vello_renderer,
            texture_blitter,
            scene: Scene::new(),
            frame: None,
            previews,
            canvas,
            background: self.config.brush.background.into(),
            cursor: None,
            scale_factor,
            modifiers: ModifiersState::default(),
            palette_index: 0,
        })
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

fn pointer_button(button: MouseButton) -> Option<PointerButton> {
    match button {
        MouseButton::Left => Some(PointerButton::Left),
        MouseButton::Right => Some(PointerButton::Right),
        MouseButton::Middle => Some(PointerButton::Middle),
        _ => None,
    }
}

/// Pointer event for a mouse button, or `None` until the cursor position is known.
fn button_event(cursor: Option<Point>, state: ElementState, button: MouseButton) -> Option<PointerEvent> {
    let position = cursor?;
    let button = pointer_button(button)?;
    Some(match state {
        ElementState::Pressed => PointerEvent::Down { position, button },
        ElementState::Released => PointerEvent::Up { position, button },
    })
}

/// Window size in logical units, or `None` for a zero-area (minimized) window.
fn logical_size(size: PhysicalSize<u32>, scale_factor: f64) -> Option<(u32, u32)> {
    if size.width == 0 || size.height == 0 {
        return None;
    }
    let logical: LogicalSize<u32> = size.to_logical(scale_factor);
    Some((logical.width.max(1), logical.height.max(1)))
}

fn logical_point(position: PhysicalPosition<f64>, scale_factor: f64) -> Point {
    let logical: LogicalPosition<f64> = position.to_logical(scale_factor);
    Point::new(logical.x, logical.y)
}

fn touch_phase(phase: winit::event::TouchPhase) -> TouchPhase {
    match phase {
        winit::event::TouchPhase::Started => TouchPhase::Started,
        winit::event::TouchPhase::Moved => TouchPhase::Moved,
        winit::event::TouchPhase::Ended => TouchPhase::Ended,
        winit::event::TouchPhase::Cancelled => TouchPhase::Cancelled,
    }
}

/// Name a key the way the shortcut registry spells it.
fn key_name(key: &Key) -> Option<&str> {
    match key {
        Key::Character(c) => Some(c.as_str()),
        Key::Named(NamedKey::Delete) | Key::Named(NamedKey::Backspace) => Some("Delete"),
        _ => None,
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }

        log::info!("Creating window...");
        match self.init(event_loop) {
            Ok(state) => {
                state.window.request_redraw();
                self.state = Some(state);
            }
            Err(e) => {
                log::error!("{}", e);
                event_loop.exit();
            }
        }
    }

    fn suspended(&mut self, _event_loop: &ActiveEventLoop) {
        if self.state.take().is_some() {
            log::info!("Suspended; drawing session released");
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(state) = &mut self.state else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => {
                self.state = None;
                event_loop.exit();
            }

            WindowEvent::Resized(size) => {
                if size.width == 0 || size.height == 0 {
                    return;
                }
                state.resize_canvas(size);
                if let Some(render_cx) = self.render_cx.as_mut() {
                    render_cx.resize_surface(&mut state.surface, size.width, size.height);
                }
                state.window.request_redraw();
            }

            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                state.scale_factor = scale_factor;
                let size = state.window.inner_size();
                state.resize_canvas(size);
                state.mark_dirty();
            }

            WindowEvent::RedrawRequested => {
                if let Some(render_cx) = self.render_cx.as_ref() {
                    state.render(render_cx);
                }
            }

            WindowEvent::CursorMoved { position, .. } => {
                let position = logical_point(position, state.scale_factor);
                state.cursor = Some(position);
                state.pointer(PointerEvent::Move { position });
            }

            WindowEvent::CursorLeft { .. } => {
                state.cursor = None;
                state.pointer(PointerEvent::Leave);
            }

            WindowEvent::MouseInput {
                state: btn_state,
                button,
                ..
            } => {
                if let Some(event) = button_event(state.cursor, btn_state, button) {
                    state.pointer(event);
                }
            }

            WindowEvent::Touch(Touch {
                id, phase, location, ..
            }) => {
                state.pointer(PointerEvent::Touch {
                    id,
                    phase: touch_phase(phase),
                    position: logical_point(location, state.scale_factor),
                });
            }

            WindowEvent::ModifiersChanged(modifiers) => {
                state.modifiers = modifiers.state();
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if event.state != ElementState::Pressed {
                    return;
                }
                let ctrl = state.modifiers.control_key() || state.modifiers.super_key();
                let Some(action) = key_name(&event.logical_key)
                    .and_then(|key| ShortcutRegistry::lookup(key, ctrl))
                else {
                    return;
                };
                let repeatable = matches!(
                    action,
                    ShortcutAction::SizeDown
                        | ShortcutAction::SizeUp
                        | ShortcutAction::OpacityDown
                        | ShortcutAction::OpacityUp
                );
                if event.repeat && !repeatable {
                    return;
                }
                state.run_shortcut(action);
            }

            WindowEvent::DroppedFile(path) => {
                if !is_svg(&path) {
                    log::warn!("Ignoring dropped file {:?}: not an SVG", path.file_name());
                    return;
                }
                if let Some(svg) = read_svg(&path) {
                    log::info!("Dropped shape: {:?}", path.file_name());
                    state.import(vec![svg]);
                }
            }

            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_is_svg() {
        assert!(is_svg(&PathBuf::from("star.svg")));
        assert!(is_svg(&PathBuf::from("/tmp/STAR.SVG")));
        assert!(!is_svg(&PathBuf::from("photo.png")));
        assert!(!is_svg(&PathBuf::from("svg")));
    }

    #[test]
    fn test_key_name() {
        assert_eq!(key_name(&Key::Character("m".into())), Some("m"));
        assert_eq!(key_name(&Key::Named(NamedKey::Backspace)), Some("Delete"));
        assert_eq!(key_name(&Key::Named(NamedKey::Escape)), None);
    }

    #[test]
    fn test_pointer_button_mapping() {
        assert_eq!(pointer_button(MouseButton::Left), Some(PointerButton::Left));
        assert_eq!(pointer_button(MouseButton::Back), None);
    }

    #[test]
    fn test_button_ignored_until_cursor_known() {
        assert_eq!(button_event(None, ElementState::Pressed, MouseButton::Left), None);

        let position = Point::new(12.0, 34.0);
        assert_eq!(
            button_event(Some(position), ElementState::Pressed, MouseButton::Left),
            Some(PointerEvent::Down {
                position,
                button: PointerButton::Left
            })
        );
        assert_eq!(
            button_event(Some(position), ElementState::Released, MouseButton::Right),
            Some(PointerEvent::Up {
                position,
                button: PointerButton::Right
            })
        );
        assert_eq!(button_event(Some(position), ElementState::Pressed, MouseButton::Back), None);
    }

    #[test]
    fn test_logical_size() {
        assert_eq!(logical_size(PhysicalSize::new(200, 100), 2.0), Some((100, 50)));
        assert_eq!(logical_size(PhysicalSize::new(800, 600), 1.0), Some((800, 600)));
        assert_eq!(logical_size(PhysicalSize::new(1, 1), 2.0), Some((1, 1)));
        assert_eq!(logical_size(PhysicalSize::new(0, 600), 1.0), None);
        assert_eq!(logical_size(PhysicalSize::new(0, 0), 2.0), None);
    }

    #[test]
    fn test_logical_point() {
        let point = logical_point(PhysicalPosition::new(300.0, 150.0), 1.5);
        assert!((point.x - 200.0).abs() < 1e-9);
        assert!((point.y - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_surface_image_is_premultiplied_rgba() {
        let surface = DrawSurface::new(3, 2, alchemy_core::BrushColor::BACKGROUND);
        let image = surface_image(&surface).unwrap();
        assert_eq!((image.width, image.height), (3, 2));
        assert_eq!(image.data.data().len(), 3 * 2 * 4);
        assert_eq!(image.alpha_type, ImageAlphaType::AlphaPremultiplied);

        assert!(surface_image(&DrawSurface::new(0, 0, alchemy_core::BrushColor::BLACK)).is_none());
    }

    #[test]
    fn test_palette_colors_parse() {
        for color in PALETTE {
            assert!(alchemy_core::BrushColor::from_hex(color).is_ok());
        }
    }
}
