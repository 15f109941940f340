use crate::foundation::core::Canvas;
use crate::foundation::error::{TesseraError, TesseraResult};

/// A rendered frame: tightly packed RGBA8, row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// `width * height * 4` bytes.
    pub data: Vec<u8>,
    /// Whether `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Canvas covered by this frame.
    pub fn canvas(&self) -> Canvas {
        Canvas::new(self.width, self.height)
    }

    /// RGBA bytes at `(x, y)`, or `None` outside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        let px = self.data.get(idx..idx + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Straight-alpha RGBA composited over `bg`, alpha forced to 255. Suitable for PNG and
    /// video encoders.
    pub fn to_opaque_rgba8(&self, bg: [u8; 3]) -> TesseraResult<Vec<u8>> {
        let mut out = vec![0u8; self.data.len()];
        flatten_to_opaque_rgba8(&mut out, &self.data, self.premultiplied, bg)?;
        Ok(out)
    }
}

pub(crate) fn flatten_to_opaque_rgba8(
    dst: &mut [u8],
    src: &[u8],
    src_is_premul: bool,
    bg: [u8; 3],
) -> TesseraResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(TesseraError::render(
            "frame flattening expects equal-length RGBA8 buffers",
        ));
    }

    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let a = u16::from(s[3]);
        let inv = 255 - a;
        for c in 0..3 {
            let fg = if src_is_premul {
                u16::from(s[c])
            } else {
                mul_div255(u16::from(s[c]), a)
            };
            d[c] = (fg + mul_div255(u16::from(bg[c]), inv)).min(255) as u8;
        }
        d[3] = 255;
    }
    Ok(())
}

fn mul_div255(x: u16, y: u16) -> u16 {
    ((u32::from(x) * u32::from(y) + 127) / 255) as u16
}

#[cfg(test)]
#[path = "../../tests/unit/render/frame.rs"]
mod tests;
