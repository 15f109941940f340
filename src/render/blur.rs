use crate::foundation::error::{TesseraError, TesseraResult};

/// Uniform kernel of `2 * radius + 1` taps in Q16 fixed point. Weights sum to exactly `1 << 16`.
pub fn box_kernel_q16(radius: u32) -> Vec<u32> {
    let taps = 2 * radius as usize + 1;
    let base = (1u32 << 16) / taps as u32;
    let mut kernel = vec![base; taps];
    let rem = (1u32 << 16) - base * taps as u32;
    kernel[taps / 2] += rem;
    kernel
}

/// Pixel radius used for a configured blur radius. Fractions round to the nearest pixel.
pub fn radius_px(blur_radius: f64) -> u32 {
    if blur_radius.is_finite() && blur_radius > 0.0 {
        blur_radius.round().min(f64::from(u16::MAX)) as u32
    } else {
        0
    }
}

/// Box-blur a premultiplied RGBA8 buffer, returning a new buffer. Edges clamp.
pub fn box_blur_rgba8_premul(
    src: &[u8],
    width: u32,
    height: u32,
    radius: u32,
) -> TesseraResult<Vec<u8>> {
    let mut out = src.to_vec();
    let mut scratch = Vec::new();
    blur_in_place(&mut out, &mut scratch, width, height, &box_kernel_q16(radius))?;
    Ok(out)
}

/// Blur `buf` in place with a separable kernel. `scratch` is resized as needed and can be reused
/// across frames.
pub(crate) fn blur_in_place(
    buf: &mut [u8],
    scratch: &mut Vec<u8>,
    width: u32,
    height: u32,
    kernel: &[u32],
) -> TesseraResult<()> {
    let expected = (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(4))
        .ok_or_else(|| TesseraError::render("blur buffer size overflow"))?;
    if buf.len() != expected {
        return Err(TesseraError::render(format!(
            "blur buffer is {} bytes, expected {expected} for {width}x{height}",
            buf.len()
        )));
    }
    if kernel.len() <= 1 || expected == 0 {
        return Ok(());
    }

    scratch.resize(expected, 0);
    let w = width as usize;
    let h = height as usize;
    // Rows, then columns.
    convolve(buf, scratch, h, w, 4, w * 4, kernel);
    convolve(scratch, buf, w, h, w * 4, 4, kernel);
    Ok(())
}

/// One separable pass. `lines` independent lines of `len` pixels; `step` is the byte distance
/// between neighbouring pixels along a line and `line_stride` the distance between line starts.
fn convolve(
    src: &[u8],
    dst: &mut [u8],
    lines: usize,
    len: usize,
    step: usize,
    line_stride: usize,
    kernel: &[u32],
) {
    let radius = (kernel.len() / 2) as isize;
    let last = len as isize - 1;
    for line in 0..lines {
        let origin = line * line_stride;
        for i in 0..len {
            let mut acc = [0u64; 4];
            for (k, &weight) in kernel.iter().enumerate() {
                let j = (i as isize + k as isize - radius).clamp(0, last) as usize;
                let px = origin + j * step;
                for (c, slot) in acc.iter_mut().enumerate() {
                    *slot += u64::from(weight) * u64::from(src[px + c]);
                }
            }
            let out = origin + i * step;
            for (c, v) in acc.into_iter().enumerate() {
                dst[out + c] = ((v + (1 << 15)) >> 16).min(255) as u8;
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/blur.rs"]
mod tests;
