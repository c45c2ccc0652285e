//! Qrcard
//!
//! A small web service that turns a contact form into a scannable QR code.
//! A submitted form is mapped into a contact record, serialized as a vCard,
//! encoded into a QR symbol with an optional logo stamped at the center, and
//! returned inline as a base64 PNG in the result page.
//!
//! # Pipeline
//!
//! - **Form mapping**: submitted field/value pairs become a [`card::ContactRecord`]
//!   plus presentation options, via an explicit field table
//! - **Serialization**: the record renders to vCard 3.0 text (never fails)
//! - **Logo preprocessing**: an uploaded image is sniffed, decoded, and resized;
//!   anything unusable degrades to a transparent placeholder
//! - **Composition**: the vCard text is QR-encoded and rastered with the chosen
//!   color, module shape, and logo overlay
//!
//! # Example
//!
//! ```no_run
//! use qrcard::ServerConfig;
//!
//! # fn main() -> qrcard::Result<()> {
//! let config = ServerConfig {
//!     addr: "127.0.0.1:9000".to_string(),
//!     ..Default::default()
//! };
//! qrcard::web::serve(config)?;
//! # Ok(())
//! # }
//! ```

use std::path::PathBuf;

pub mod error;
pub use error::{Error, Result};

pub mod card;
pub mod form;
pub mod logo;
pub mod render;
pub mod web;

/// Configuration for the card service
///
/// Constructed once at startup and passed to every component that needs it;
/// request handling never reads ambient process state.
///
/// # Examples
///
/// ```
/// let cfg = qrcard::ServerConfig::default();
/// assert_eq!(cfg.logo_dimension, 244);
/// ```
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the HTTP server binds to
    pub addr: String,
    /// Directory holding the page templates and static files
    pub assets_dir: PathBuf,
    /// Cumulative cap on accepted form text, excluding file parts
    pub max_form_bytes: usize,
    /// Side length of the square logo overlay in pixels
    pub logo_dimension: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "0.0.0.0:9000".to_string(),
            assets_dir: PathBuf::from("assets"),
            max_form_bytes: 8192,
            logo_dimension: 244,
        }
    }
}
