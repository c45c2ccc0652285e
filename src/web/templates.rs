//! Page templates served from the assets directory
//!
//! No template engine: the pages are plain HTML files, and the result page
//! carries a single `{{image}}` token that gets replaced with the
//! base64-encoded PNG.

use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

/// Token in `show.html` replaced by the base64 image data
const IMAGE_TOKEN: &str = "{{image}}";

/// Read a page template out of the assets directory
pub fn load_page(assets_dir: &Path, name: &str) -> Result<String> {
    let path = assets_dir.join(name);
    fs::read_to_string(&path)
        .map_err(|e| Error::TemplateError(format!("cannot read {}: {}", path.display(), e)))
}

/// Render the result page with the encoded image substituted in
pub fn render_result(assets_dir: &Path, image_base64: &str) -> Result<String> {
    Ok(load_page(assets_dir, "show.html")?.replace(IMAGE_TOKEN, image_base64))
}
