//!
//! The render loop. It runs on its own thread, independently of the simulator, and on every
//! iteration copies the vertex plane of the front buffer and hands it to a [Present]er.
//!

use crate::framebuffer::FrameBuffer;
use crate::stop::Stop;
use std::io;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Something that can show a frame, given its vertex attributes
pub trait Present {
    /// Shows one frame. Returns `false` once the surface is closed.
    fn present(&mut self, vertices: &[f32]) -> bool;

    /// Called once, after the last frame
    fn release(&mut self) {}
}

pub struct RenderLoop<P: Present> {
    frame_buffer: Arc<FrameBuffer>,
    presenter: P,
    stop: Stop,
    vertices: Vec<f32>,
    frames: u64,
}

impl<P: Present> RenderLoop<P> {
    pub fn new(frame_buffer: Arc<FrameBuffer>, presenter: P, stop: Stop) -> Self {
        let vertices = Vec::with_capacity(frame_buffer.vertex_count());
        Self {
            frame_buffer,
            presenter,
            stop,
            vertices,
            frames: 0,
        }
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Presents one frame. Returns `false` without presenting anything if a stop was requested,
    /// and requests one if the presenter closes.
    pub fn frame(&mut self) -> bool {
        if self.stop.is_requested() {
            return false;
        }

        self.frame_buffer.read_vertices_into(&mut self.vertices);
        if !self.presenter.present(&self.vertices) {
            tracing::debug!("surface closed");
            self.stop.request();
            return false;
        }
        self.frames += 1;
        true
    }

    /// Presents frames until a stop is requested or the presenter closes. Returns how many frames
    /// were presented.
    pub fn run(mut self) -> u64 {
        while self.frame() {}

        self.presenter.release();
        tracing::debug!(frames = self.frames, "render loop finished");
        self.frames
    }
}

impl<P: Present + Send + 'static> RenderLoop<P> {
    pub fn spawn(self) -> io::Result<thread::JoinHandle<u64>> {
        thread::Builder::new()
            .name("framerv render".into())
            .spawn(move || self.run())
    }
}

/// Presents nothing, at a fixed rate
#[derive(Debug)]
pub struct Headless {
    period: Duration,
    last: Option<Instant>,
}

impl Headless {
    /// `fps == 0` means no pacing at all
    pub fn new(fps: u32) -> Self {
        let period = match fps {
            0 => Duration::ZERO,
            fps => Duration::from_secs(1) / fps,
        };
        Self { period, last: None }
    }
}

impl Present for Headless {
    fn present(&mut self, _vertices: &[f32]) -> bool {
        if let Some(last) = self.last {
            let elapsed = last.elapsed();
            if elapsed < self.period {
                thread::sleep(self.period - elapsed);
            }
        }
        self.last = Some(Instant::now());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Closes after a fixed number of frames and remembers what it saw
    struct Recorder {
        left: usize,
        seen: Vec<Vec<f32>>,
        released: Arc<parking_lot::Mutex<bool>>,
    }

    impl Present for Recorder {
        fn present(&mut self, vertices: &[f32]) -> bool {
            if self.left == 0 {
                return false;
            }
            self.left -= 1;
            self.seen.push(vertices.to_vec());
            true
        }

        fn release(&mut self) {
            *self.released.lock() = true;
        }
    }

    #[test]
    fn test_closing_surface_requests_stop() {
        let fb = Arc::new(FrameBuffer::new(2, 2));
        fb.write_pixel(3, 0xffff_ffff).unwrap();
        fb.swap();

        let released = Arc::new(parking_lot::Mutex::new(false));
        let stop = Stop::new();
        let recorder = Recorder {
            left: 3,
            seen: Vec::new(),
            released: released.clone(),
        };

        let frames = RenderLoop::new(fb.clone(), recorder, stop.clone()).run();
        assert_eq!(frames, 3);
        assert!(stop.is_requested());
        assert!(*released.lock());
    }

    #[test]
    fn test_presents_front_vertices() {
        struct Check(Arc<FrameBuffer>);
        impl Present for Check {
            fn present(&mut self, vertices: &[f32]) -> bool {
                assert_eq!(vertices.len(), self.0.vertex_count());
                let expected = crate::framebuffer::vertex(1, 0xff00_ff00, 2, 1);
                assert_eq!(&vertices[8..16], &expected[..]);
                false
            }
        }

        let fb = Arc::new(FrameBuffer::new(2, 1));
        fb.write_pixel(1, 0xff00_ff00).unwrap();
        fb.swap();

        let frames = RenderLoop::new(fb.clone(), Check(fb), Stop::new()).run();
        assert_eq!(frames, 0);
    }

    #[test]
    fn test_stop_ends_spawned_loop() {
        let fb = Arc::new(FrameBuffer::new(2, 2));
        let stop = Stop::new();
        let handle = RenderLoop::new(fb, Headless::new(1000), stop.clone())
            .spawn()
            .unwrap();

        thread::sleep(Duration::from_millis(20));
        stop.request();
        assert!(handle.join().unwrap() > 0);
    }

    #[test]
    fn test_headless_pacing() {
        let mut headless = Headless::new(100);
        let start = Instant::now();
        for _ in 0..4 {
            assert!(headless.present(&[]));
        }
        assert!(start.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn test_frame_checks_stop_first() {
        let stop = Stop::new();
        let mut render = RenderLoop::new(Arc::new(FrameBuffer::new(1, 1)), Headless::new(0), stop.clone());

        assert!(render.frame());
        assert!(render.frame());
        stop.request();
        assert!(!render.frame());
        assert_eq!(render.frames(), 2);
    }

    #[test]
    fn test_stopped_before_start() {
        let stop = Stop::new();
        stop.request();
        let frames = RenderLoop::new(Arc::new(FrameBuffer::new(1, 1)), Headless::new(0), stop).run();
        assert_eq!(frames, 0);
    }
}
