//! QR rendering options and composition
//!
//! [`RenderOptions`] aggregates the styling fields captured from the form with
//! the prepared logo. Options are purely presentational: they never affect the
//! encoded payload, only how the symbol is drawn.

pub mod raster;

pub use raster::compose;

use crate::form::StyleFields;
use crate::logo::LogoAsset;

/// Dot style used for the dark modules
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ModuleShape {
    #[default]
    Square,
    Circle,
}

impl ModuleShape {
    /// Parse the submitted shape value; anything unrecognized is a square.
    fn from_field(value: Option<&str>) -> Self {
        match value {
            Some("circle") => ModuleShape::Circle,
            _ => ModuleShape::Square,
        }
    }
}

/// Presentation directives handed to the composition step
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Color override for the dark modules; the raster layer falls back to
    /// black when this does not parse
    pub foreground_hex: Option<String>,
    pub shape: ModuleShape,
    /// Always populated; the transparent placeholder stands in when no usable
    /// logo was uploaded
    pub logo: LogoAsset,
}

impl RenderOptions {
    /// Aggregate captured styling with the prepared logo
    pub fn build(style: StyleFields, logo: LogoAsset) -> Self {
        Self {
            foreground_hex: style.color,
            shape: ModuleShape::from_field(style.shape.as_deref()),
            logo,
        }
    }
}
