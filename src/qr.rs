//! QR rendering for the pairing flow
//!
//! The gateway hands us an opaque pairing string; we render it once and keep
//! both forms around: Unicode blocks for the terminal log and SVG markup for
//! the dashboard page.

use qrcode::render::{svg, unicode};
use qrcode::types::QrError;
use qrcode::QrCode;

/// A pairing code rendered in both output formats
#[derive(Debug, Clone)]
pub struct QrImage {
    /// SVG markup, embedded as-is in the dashboard page
    pub svg: String,
    /// Half-block Unicode rendering for terminal output
    pub terminal: String,
}

impl QrImage {
    pub fn render(payload: &str) -> Result<Self, QrError> {
        let code = QrCode::new(payload.as_bytes())?;

        let svg = code
            .render::<svg::Color>()
            .min_dimensions(240, 240)
            .dark_color(svg::Color("#000000"))
            .light_color(svg::Color("#ffffff"))
            .build();

        let terminal = code
            .render::<unicode::Dense1x2>()
            .dark_color(unicode::Dense1x2::Light)
            .light_color(unicode::Dense1x2::Dark)
            .build();

        Ok(Self { svg, terminal })
    }
}
