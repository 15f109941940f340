use serde::{Deserialize, Serialize};

use crate::color::model::Rgb;
use crate::foundation::error::{TesseraError, TesseraResult};

/// A named gradient used as a cross-fade target. Always holds at least two stops.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SwatchDef", into = "SwatchDef")]
pub struct Swatch {
    name: String,
    stops: Vec<Rgb>,
}

#[derive(Serialize, Deserialize)]
struct SwatchDef {
    #[serde(default)]
    name: String,
    gradient: Vec<String>,
}

impl Swatch {
    /// Build a swatch from hex strings (`#rgb` or `#rrggbb`).
    pub fn new<S: AsRef<str>>(name: impl Into<String>, hex_stops: &[S]) -> TesseraResult<Self> {
        let name = name.into();
        if hex_stops.len() < 2 {
            return Err(TesseraError::validation(format!(
                "swatch \"{name}\" needs at least 2 colors, got {}",
                hex_stops.len()
            )));
        }

        let stops = hex_stops
            .iter()
            .map(|s| {
                Rgb::from_hex(s.as_ref()).map_err(|e| e.within(format_args!("swatch \"{name}\"")))
            })
            .collect::<TesseraResult<Vec<_>>>()?;

        Ok(Self { name, stops })
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stops in gradient order.
    pub fn stops(&self) -> &[Rgb] {
        &self.stops
    }
}

impl TryFrom<SwatchDef> for Swatch {
    type Error = TesseraError;

    fn try_from(def: SwatchDef) -> Result<Self, Self::Error> {
        Self::new(def.name, &def.gradient)
    }
}

impl From<Swatch> for SwatchDef {
    fn from(swatch: Swatch) -> Self {
        Self {
            name: swatch.name,
            gradient: swatch.stops.iter().map(|c| c.to_hex()).collect(),
        }
    }
}

/// Built-in swatches used when a configuration names none.
pub fn default_swatches() -> Vec<Swatch> {
    const BUILTIN: [(&str, [&str; 2]); 5] = [
        ("Deep Sea Space", ["#4CA1AF", "#2C3E50"]),
        ("Dusk", ["#19547b", "#ffd89b"]),
        ("Starfall", ["#F0C27B", "#4B1248"]),
        ("Horizon", ["#E5E5BE", "#003973"]),
        ("Aqua Marine", ["#26D0CE", "#1A2980"]),
    ];

    BUILTIN
        .iter()
        .filter_map(|(name, stops)| Swatch::new(*name, stops).ok())
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/color/swatch.rs"]
mod tests;
