use crate::color::model::Rgb;

/// Maps integer positions of a `[0, domain)` range onto a multi-stop gradient.
///
/// The stops split the unit interval into `stops.len() - 1` equal segments. Position `p` maps to
/// `t = p / (domain - 1)`, so the first and last positions land exactly on the first and last
/// stop. A sampler is immutable; changing the stops or the domain means building a new one.
#[derive(Clone, Debug, PartialEq)]
pub struct PaletteSampler {
    stops: Vec<Rgb>,
    domain: usize,
}

impl PaletteSampler {
    /// Build a sampler. An empty stop list samples as black.
    pub fn new(stops: &[Rgb], domain: usize) -> Self {
        Self {
            stops: stops.to_vec(),
            domain,
        }
    }

    /// Number of positions in the domain.
    pub fn domain(&self) -> usize {
        self.domain
    }

    /// Stops this sampler interpolates across.
    pub fn stops(&self) -> &[Rgb] {
        &self.stops
    }

    /// Interpolated color at `position`. Positions past the end clamp to the last one.
    pub fn color_at(&self, position: usize) -> Rgb {
        let (first, last) = match (self.stops.first(), self.stops.last()) {
            (Some(first), Some(last)) => (*first, *last),
            _ => return Rgb::new(0, 0, 0),
        };
        let segments = self.stops.len() - 1;
        if segments == 0 || self.domain <= 1 {
            return first;
        }

        let span = (self.domain - 1) as f64;
        let t = (position.min(self.domain - 1) as f64) / span;
        if t >= 1.0 {
            return last;
        }

        let scaled = t * segments as f64;
        let seg = (scaled.floor() as usize).min(segments - 1);
        let local = scaled - seg as f64;
        lerp_rgb(self.stops[seg], self.stops[seg + 1], local)
    }
}

fn lerp_rgb(a: Rgb, b: Rgb, t: f64) -> Rgb {
    let lerp = |x: u8, y: u8| -> u8 {
        let xf = f64::from(x);
        let yf = f64::from(y);
        (xf + (yf - xf) * t).round().clamp(0.0, 255.0) as u8
    };
    Rgb::new(lerp(a.r, b.r), lerp(a.g, b.g), lerp(a.b, b.b))
}

#[cfg(test)]
#[path = "../../tests/unit/palette/sampler.rs"]
mod tests;
