//!
//! The windowed presenter. Opens a `pixel-canvas` window and drives a [RenderLoop] from its
//! redraw callback, so every redraw paints the vertex plane of the front buffer. Each pixel
//! becomes a `scale`×`scale` square. Once a stop is requested the last frame stays up.
//!
//! The window owns the thread that opens it (the main thread, on most platforms) and never
//! returns: closing it ends the process.
//!

use crate::framebuffer::{FrameBuffer, FLOATS_PER_VERTEX};
use crate::gpu::{Present, RenderLoop};
use crate::stop::Stop;
use glium::glutin;
use pixel_canvas::{
    canvas::CanvasInfo,
    input::{Event, WindowEvent},
    Canvas, Color,
};
use std::sync::Arc;

struct WindowState {
    stop: Stop,
}

impl WindowState {
    fn handle_input(_info: &CanvasInfo, state: &mut WindowState, event: &Event<()>) -> bool {
        match event {
            Event::WindowEvent {
                event:
                    WindowEvent::KeyboardInput {
                        input:
                            glutin::event::KeyboardInput {
                                state: glutin::event::ElementState::Pressed,
                                virtual_keycode: Some(glutin::event::VirtualKeyCode::Escape),
                                ..
                            },
                        ..
                    },
                ..
            } => {
                tracing::debug!("escape pressed");
                state.stop.request();
                false
            }
            _ => false,
        }
    }
}

fn channel(x: f32) -> u8 {
    (x.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Paints vertices into an image of `(width * scale) × (height * scale)` colors whose first row
/// is the bottom one. Alpha is ignored.
pub fn paint(vertices: &[f32], width: usize, height: usize, scale: usize, image: &mut [Color]) {
    let row_len = width * scale;

    for vertex in vertices.chunks_exact(FLOATS_PER_VERTEX) {
        let (r, g, b, u, v) = (vertex[2], vertex[3], vertex[4], vertex[6], vertex[7]);
        let x = (u * width as f32).round() as usize;
        let y = (v * height as f32).round() as usize;
        if x >= width || y >= height {
            continue;
        }

        let color = Color {
            r: channel(r),
            g: channel(g),
            b: channel(b),
        };

        let top = (height - 1 - y) * scale;
        for row in top..top + scale {
            let start = row * row_len + x * scale;
            if let Some(square) = image.get_mut(start..start + scale) {
                square.fill(color);
            }
        }
    }
}

/// Paints every frame into its own image, which the canvas copies on redraw
pub struct Window {
    width: usize,
    height: usize,
    scale: usize,
    image: Vec<Color>,
}

impl Window {
    pub fn new(width: usize, height: usize, scale: usize) -> Self {
        let black = Color { r: 0, g: 0, b: 0 };
        Self {
            width,
            height,
            scale,
            image: vec![black; width * height * scale * scale],
        }
    }

    pub fn image(&self) -> &[Color] {
        &self.image
    }
}

impl Present for Window {
    fn present(&mut self, vertices: &[f32]) -> bool {
        paint(vertices, self.width, self.height, self.scale, &mut self.image);
        true
    }
}

/// Opens the window and blocks forever. Pressing Escape requests `stop`.
pub fn init(frame_buffer: Arc<FrameBuffer>, scale: usize, stop: Stop) {
    let (width, height) = (frame_buffer.width(), frame_buffer.height());
    let mut render = RenderLoop::new(frame_buffer, Window::new(width, height, scale), stop.clone());

    let canvas = Canvas::new(width * scale, height * scale)
        .title("framerv")
        .state(WindowState { stop })
        .input(WindowState::handle_input);

    #[cfg(feature = "show_ms")]
    let canvas = canvas.show_ms(true);

    canvas.render(move |_state, image| {
        if render.frame() {
            image.clone_from_slice(render.presenter().image());
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framebuffer::vertex;

    fn black() -> Color {
        Color { r: 0, g: 0, b: 0 }
    }

    #[test]
    fn test_paint_flips_and_scales() {
        let (w, h, scale) = (2, 2, 2);
        let mut vertices = Vec::new();
        for i in 0..w * h {
            let argb = if i == 0 { 0xffff_0000 } else { 0 };
            vertices.extend_from_slice(&vertex(i, argb, w, h));
        }

        let mut image = vec![black(); w * h * scale * scale];
        paint(&vertices, w, h, scale, &mut image);

        // pixel 0 is the top-left one, which is the last two rows of the image
        let row_len = w * scale;
        for row in 0..h * scale {
            for col in 0..row_len {
                let red = image[row * row_len + col].r;
                let expected = if row >= 2 && col < 2 { 255 } else { 0 };
                assert_eq!(red, expected, "row {} col {}", row, col);
            }
        }
    }

    #[test]
    fn test_window_follows_the_render_loop() {
        let fb = Arc::new(FrameBuffer::new(1, 1));
        fb.write_pixel(0, 0x0000_ff00).unwrap();
        fb.swap();

        let stop = Stop::new();
        let mut render = RenderLoop::new(fb.clone(), Window::new(1, 1, 2), stop.clone());
        assert!(render.frame());
        assert!(render.presenter().image().iter().all(|c| (c.r, c.g, c.b) == (0, 255, 0)));

        // after a stop the image keeps the last frame
        fb.write_pixel(0, 0x00ff_0000).unwrap();
        fb.swap();
        stop.request();
        assert!(!render.frame());
        assert!(render.presenter().image().iter().all(|c| c.g == 255));
    }

    #[test]
    fn test_paint_channels() {
        let mut image = vec![black(); 1];
        paint(&vertex(0, 0x0011_2233, 1, 1), 1, 1, 1, &mut image);
        assert_eq!((image[0].r, image[0].g, image[0].b), (0x11, 0x22, 0x33));
    }
}
