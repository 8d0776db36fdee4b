//! Derivation of the per-pixel vertex attributes consumed by the renderer

/// Floats stored for each pixel: ndc x, ndc y, r, g, b, a, u, v
pub const FLOATS_PER_VERTEX: usize = 8;

/// Maps the `index`-th pixel of a `width`×`height` surface, with color `argb`, to its vertex
/// attributes. Row 0 is the top of the screen, so it gets the largest NDC y.
pub fn vertex(index: usize, argb: u32, width: usize, height: usize) -> [f32; FLOATS_PER_VERTEX] {
    let (x, y) = (index % width, index / width);
    let (w, h) = (width as f32, height as f32);

    let channel = |shift: u32| ((argb >> shift) & 0xff) as f32 / 255.0;

    [
        (x as f32 / w) * 2.0 - 1.0,
        ((h - y as f32) / h) * 2.0 - 1.0,
        channel(16),
        channel(8),
        channel(0),
        channel(24),
        x as f32 / w,
        y as f32 / h,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: &[f32], b: &[f32]) -> bool {
        a.len() == b.len() && a.iter().zip(b).all(|(x, y)| (x - y).abs() < 1e-6)
    }

    #[test]
    fn test_top_left_corner() {
        let v = vertex(0, 0xff00_0000, 4, 2);
        assert!(close(&v, &[-1.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0]));
    }

    #[test]
    fn test_channels() {
        let v = vertex(0, 0x80ff_3300, 4, 4);
        assert!(close(
            &v[2..6],
            &[1.0, 0x33 as f32 / 255.0, 0.0, 0x80 as f32 / 255.0]
        ));
    }

    #[test]
    fn test_position() {
        // x = 3, y = 1 on a 4x2 surface
        let v = vertex(7, 0, 4, 2);
        assert!(close(&v[0..2], &[0.5, 0.0]));
        assert!(close(&v[6..8], &[0.75, 0.5]));
    }
}
