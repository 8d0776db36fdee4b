//!
//! The Pixel Surface: two equally sized byte buffers, `front` and `back`.
//!
//! The execution thread only ever writes to `back` and the render thread only ever reads `front`.
//! Both buffers sit behind a single lock that is held for the whole duration of every access, and
//! [`FrameBuffer::swap`] exchanges them under that same lock, so a reader never sees a buffer
//! that is being written and a writer never touches the buffer that is on display.
//!
//! Each buffer is laid out as a *pixel plane* (one little-endian ARGB word per pixel, the part
//! that's visible on the bus) followed by a *vertex plane* with [`FLOATS_PER_VERTEX`] floats per
//! pixel, which the renderer consumes.
//!

use crate::error::MemoryError;
use byteorder::{ByteOrder, LittleEndian};
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

mod vertex;
pub use vertex::{vertex, FLOATS_PER_VERTEX};

pub const DEFAULT_WIDTH: usize = 512;
pub const DEFAULT_HEIGHT: usize = 512;

const WORD: usize = 4;

struct Buffers {
    front: Box<[u8]>,
    back: Box<[u8]>,
}

pub struct FrameBuffer {
    width: usize,
    height: usize,
    buffers: Mutex<Buffers>,
    swaps: AtomicU64,
}

impl fmt::Debug for FrameBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("buffer_size", &self.buffer_size())
            .field("swaps", &self.swaps())
            .finish()
    }
}

/// Checks that `len` elements can be written starting at element `offset`
fn check_write(offset: usize, len: usize, capacity: usize) -> Result<(), MemoryError> {
    match offset.checked_add(len) {
        Some(end) if end <= capacity => Ok(()),
        _ => Err(MemoryError::Capacity {
            offset,
            len,
            capacity,
        }),
    }
}

/// Checks that `begin..end` is a non-empty range inside `0..capacity`
fn check_read(begin: usize, end: usize, capacity: usize) -> Result<(), MemoryError> {
    if begin >= end || end > capacity {
        Err(MemoryError::InvalidRange {
            begin,
            end,
            capacity,
        })
    } else {
        Ok(())
    }
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height * WORD * (1 + FLOATS_PER_VERTEX);
        Self {
            width,
            height,
            buffers: Mutex::new(Buffers {
                front: vec![0; size].into_boxed_slice(),
                back: vec![0; size].into_boxed_slice(),
            }),
            swaps: AtomicU64::new(0),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    /// Size in bytes of the pixel plane, which is what the bus maps into the address space
    pub fn pixel_plane_size(&self) -> usize {
        self.pixel_count() * WORD
    }

    /// Size in bytes of each of the two buffers
    pub fn buffer_size(&self) -> usize {
        self.pixel_count() * WORD * (1 + FLOATS_PER_VERTEX)
    }

    /// Number of floats in the vertex plane
    pub fn vertex_count(&self) -> usize {
        self.pixel_count() * FLOATS_PER_VERTEX
    }

    /// Float offset of the vertex attributes of the `index`-th pixel
    pub fn vertex_offset(&self, index: usize) -> usize {
        self.pixel_count() + FLOATS_PER_VERTEX * index
    }

    /// How many times the buffers have been swapped
    pub fn swaps(&self) -> u64 {
        self.swaps.load(Ordering::Acquire)
    }

    /// Exchanges `front` and `back`. Only the boxes move, the bytes stay where they are.
    pub fn swap(&self) {
        let mut buffers = self.buffers.lock();
        let Buffers { front, back } = &mut *buffers;
        std::mem::swap(front, back);
        self.swaps.fetch_add(1, Ordering::AcqRel);
        tracing::trace!(swaps = self.swaps.load(Ordering::Relaxed), "framebuffer swapped");
    }

    pub fn write_bytes(&self, offset: usize, data: &[u8]) -> Result<(), MemoryError> {
        check_write(offset, data.len(), self.buffer_size())?;
        let mut buffers = self.buffers.lock();
        buffers.back[offset..offset + data.len()].copy_from_slice(data);
        Ok(())
    }

    /// `offset` is measured in words
    pub fn write_ints(&self, offset: usize, data: &[u32]) -> Result<(), MemoryError> {
        check_write(offset, data.len(), self.buffer_size() / WORD)?;
        let start = offset * WORD;
        let mut buffers = self.buffers.lock();
        LittleEndian::write_u32_into(data, &mut buffers.back[start..start + data.len() * WORD]);
        Ok(())
    }

    /// `offset` is measured in floats
    pub fn write_floats(&self, offset: usize, data: &[f32]) -> Result<(), MemoryError> {
        check_write(offset, data.len(), self.buffer_size() / WORD)?;
        let start = offset * WORD;
        let mut buffers = self.buffers.lock();
        LittleEndian::write_f32_into(data, &mut buffers.back[start..start + data.len() * WORD]);
        Ok(())
    }

    pub fn read_bytes(&self, begin: usize, end: usize) -> Result<Vec<u8>, MemoryError> {
        check_read(begin, end, self.buffer_size())?;
        let buffers = self.buffers.lock();
        Ok(buffers.front[begin..end].to_vec())
    }

    /// `begin` and `end` are measured in words
    pub fn read_ints(&self, begin: usize, end: usize) -> Result<Vec<u32>, MemoryError> {
        check_read(begin, end, self.buffer_size() / WORD)?;
        let mut out = vec![0; end - begin];
        let buffers = self.buffers.lock();
        LittleEndian::read_u32_into(&buffers.front[begin * WORD..end * WORD], &mut out);
        Ok(out)
    }

    /// `begin` and `end` are measured in floats
    pub fn read_floats(&self, begin: usize, end: usize) -> Result<Vec<f32>, MemoryError> {
        check_read(begin, end, self.buffer_size() / WORD)?;
        let mut out = vec![0.0; end - begin];
        let buffers = self.buffers.lock();
        LittleEndian::read_f32_into(&buffers.front[begin * WORD..end * WORD], &mut out);
        Ok(out)
    }

    /// Copies the whole vertex plane of the front buffer into `out`, reusing its allocation
    pub fn read_vertices_into(&self, out: &mut Vec<f32>) {
        out.resize(self.vertex_count(), 0.0);
        let start = self.pixel_plane_size();
        let buffers = self.buffers.lock();
        LittleEndian::read_f32_into(&buffers.front[start..], out);
    }

    /// Writes the `index`-th pixel and its vertex attributes to the back buffer
    pub fn write_pixel(&self, index: usize, argb: u32) -> Result<(), MemoryError> {
        check_write(index, 1, self.pixel_count())?;
        let mut buffers = self.buffers.lock();
        self.put_pixel(&mut buffers.back, index, argb);
        Ok(())
    }

    fn put_pixel(&self, back: &mut [u8], index: usize, argb: u32) {
        LittleEndian::write_u32(&mut back[index * WORD..], argb);

        let attributes = vertex(index, argb, self.width, self.height);
        let start = self.vertex_offset(index) * WORD;
        LittleEndian::write_f32_into(&attributes, &mut back[start..start + attributes.len() * WORD]);
    }

    /// Bus-facing write of raw bytes into the pixel plane of the back buffer. Every pixel touched
    /// by the write gets its vertex attributes derived again from the resulting pixel value.
    pub fn store(&self, offset: usize, data: &[u8]) -> Result<(), MemoryError> {
        check_write(offset, data.len(), self.pixel_plane_size())?;
        if data.is_empty() {
            return Ok(());
        }

        let mut buffers = self.buffers.lock();
        buffers.back[offset..offset + data.len()].copy_from_slice(data);

        let first = offset / WORD;
        let last = (offset + data.len() - 1) / WORD;
        for index in first..=last {
            let argb = LittleEndian::read_u32(&buffers.back[index * WORD..]);
            self.put_pixel(&mut buffers.back, index, argb);
        }
        Ok(())
    }

    /// Bus-facing read of raw bytes from the pixel plane of the front buffer
    pub fn load(&self, offset: usize, buf: &mut [u8]) -> Result<(), MemoryError> {
        check_write(offset, buf.len(), self.pixel_plane_size())?;
        let buffers = self.buffers.lock();
        buf.copy_from_slice(&buffers.front[offset..offset + buf.len()]);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::Arc;
    use std::thread;

    const W: usize = 8;
    const H: usize = 4;

    #[test]
    fn test_layout() {
        let fb = FrameBuffer::new(W, H);
        assert_eq!(fb.pixel_plane_size(), 4 * W * H);
        assert_eq!(fb.buffer_size(), 36 * W * H);
        assert_eq!(fb.vertex_count(), 8 * W * H);
        assert_eq!(fb.vertex_offset(0), W * H);
    }

    #[test]
    fn test_writes_go_to_back() {
        let fb = FrameBuffer::new(W, H);
        fb.write_bytes(0, &[1, 2, 3]).unwrap();
        assert_eq!(fb.read_bytes(0, 3), Ok(vec![0, 0, 0]));
        fb.swap();
        assert_eq!(fb.read_bytes(0, 3), Ok(vec![1, 2, 3]));
    }

    #[test]
    fn test_typed_views() {
        let fb = FrameBuffer::new(W, H);
        fb.write_ints(2, &[0xaabb_ccdd, 7]).unwrap();
        fb.write_floats(10, &[1.5, -0.25]).unwrap();
        fb.swap();
        assert_eq!(fb.read_ints(2, 4), Ok(vec![0xaabb_ccdd, 7]));
        assert_eq!(fb.read_bytes(8, 9), Ok(vec![0xdd]));
        assert_eq!(fb.read_floats(10, 12), Ok(vec![1.5, -0.25]));
    }

    #[test]
    fn test_write_bounds() {
        let fb = FrameBuffer::new(W, H);
        let bytes = fb.buffer_size();
        let words = bytes / 4;

        assert!(fb.write_bytes(bytes, &[0]).is_err());
        assert!(fb.write_bytes(bytes - 1, &[0]).is_ok());
        assert!(fb.write_ints(words, &[0]).is_err());
        assert!(fb.write_ints(words - 1, &[0]).is_ok());
        assert!(fb.write_floats(words, &[0.0]).is_err());
        assert!(fb.write_floats(words - 1, &[0.0]).is_ok());
        assert!(fb.write_ints(usize::MAX, &[0]).is_err());
    }

    #[test]
    fn test_read_bounds() {
        let fb = FrameBuffer::new(W, H);
        let bytes = fb.buffer_size();
        let words = bytes / 4;

        assert!(fb.read_bytes(bytes, bytes + 1).is_err());
        assert!(fb.read_bytes(bytes - 1, bytes).is_ok());
        assert!(fb.read_ints(words, words + 1).is_err());
        assert!(fb.read_ints(words - 1, words).is_ok());
        assert!(fb.read_floats(words - 1, words).is_ok());

        // Inverted and empty ranges
        assert!(fb.read_bytes(4, 2).is_err());
        assert!(fb.read_ints(3, 3).is_err());
    }

    #[test]
    fn test_failed_write_changes_nothing() {
        let fb = FrameBuffer::new(W, H);
        let words = fb.buffer_size() / 4;
        assert!(fb.write_ints(words - 1, &[1, 2]).is_err());
        fb.swap();
        assert_eq!(fb.read_ints(words - 1, words), Ok(vec![0]));
    }

    #[test]
    fn test_double_swap_is_identity() {
        let fb = FrameBuffer::new(W, H);
        fb.write_pixel(3, 0xff11_2233).unwrap();
        let before = fb.read_ints(0, W * H).unwrap();

        fb.swap();
        fb.swap();

        assert_eq!(fb.read_ints(0, W * H).unwrap(), before);
        assert_eq!(fb.swaps(), 2);

        // the pixel is still waiting in the back buffer
        fb.swap();
        assert_eq!(fb.read_ints(3, 4), Ok(vec![0xff11_2233]));
    }

    #[test]
    fn test_pixel_index_bounds() {
        let fb = FrameBuffer::new(W, H);
        assert!(fb.write_pixel(W * H, 0).is_err());
        assert!(fb.write_pixel(W * H - 1, 0).is_ok());
    }

    #[test]
    fn test_store_refreshes_vertex() {
        let fb = FrameBuffer::new(W, H);
        // write only the red channel of pixel 1
        fb.store(4 + 2, &[0xff]).unwrap();
        fb.swap();

        assert_eq!(fb.read_ints(1, 2), Ok(vec![0x00ff_0000]));
        let start = fb.vertex_offset(1);
        let v = fb.read_floats(start, start + FLOATS_PER_VERTEX).unwrap();
        assert_eq!(v, vertex(1, 0x00ff_0000, W, H).to_vec());
    }

    #[test]
    fn test_store_spanning_pixels() {
        let fb = FrameBuffer::new(W, H);
        fb.store(2, &[0x11, 0x22, 0x33, 0x44]).unwrap();
        fb.swap();
        assert_eq!(fb.read_ints(0, 2), Ok(vec![0x2211_0000, 0x0000_4433]));

        let start = fb.vertex_offset(1);
        let v = fb.read_floats(start, start + FLOATS_PER_VERTEX).unwrap();
        assert_eq!(v, vertex(1, 0x0000_4433, W, H).to_vec());
    }

    #[test]
    fn test_store_and_load_are_limited_to_pixels() {
        let fb = FrameBuffer::new(W, H);
        let size = fb.pixel_plane_size();
        assert!(fb.store(size, &[0]).is_err());
        assert!(fb.store(size - 4, &[0; 4]).is_ok());

        let mut buf = [0; 4];
        assert!(fb.load(size - 2, &mut buf).is_err());
        assert!(fb.load(size - 4, &mut buf).is_ok());
    }

    #[test]
    fn test_no_tearing() {
        let fb = Arc::new(FrameBuffer::new(W, H));
        let frames = 200u32;

        let writer = {
            let fb = fb.clone();
            thread::spawn(move || {
                for frame in 1..=frames {
                    for i in 0..W * H {
                        fb.write_pixel(i, frame).unwrap();
                    }
                    fb.swap();
                }
            })
        };

        let mut vertices = Vec::new();
        while fb.swaps() < frames as u64 {
            let pixels = fb.read_ints(0, W * H).unwrap();
            assert!(pixels.iter().all(|&p| p == pixels[0]), "torn frame");

            fb.read_vertices_into(&mut vertices);
            assert_eq!(vertices.len(), fb.vertex_count());
        }

        writer.join().unwrap();
    }

    proptest! {
        #[test]
        fn pixel_round_trip(index in 0..W * H, argb in any::<u32>()) {
            let fb = FrameBuffer::new(W, H);
            fb.write_pixel(index, argb).unwrap();
            fb.swap();

            prop_assert_eq!(fb.read_ints(index, index + 1).unwrap(), vec![argb]);

            let (x, y) = ((index % W) as f32, (index / W) as f32);
            let expected = [
                x / W as f32 * 2.0 - 1.0,
                (H as f32 - y) / H as f32 * 2.0 - 1.0,
                ((argb >> 16) & 0xff) as f32 / 255.0,
                ((argb >> 8) & 0xff) as f32 / 255.0,
                (argb & 0xff) as f32 / 255.0,
                (argb >> 24) as f32 / 255.0,
                x / W as f32,
                y / H as f32,
            ];

            let start = fb.vertex_offset(index);
            let got = fb.read_floats(start, start + FLOATS_PER_VERTEX).unwrap();
            for (g, e) in got.iter().zip(expected) {
                prop_assert!((g - e).abs() < 1e-6, "{} != {}", g, e);
            }

            let mut vertices = Vec::new();
            fb.read_vertices_into(&mut vertices);
            let at = FLOATS_PER_VERTEX * index;
            prop_assert_eq!(&vertices[at..at + FLOATS_PER_VERTEX], &got[..]);
        }
    }
}
