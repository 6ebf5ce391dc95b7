//! QR codes attached to entries. The payload is derived from the athlete name
//! and control number; the UI regenerates the image on every add and edit
//! before the entry reaches the store, which only persists the bytes.

use anyhow::{Context, Result};
use qrcode::render::{svg, unicode};
use qrcode::QrCode;

use crate::models::Entry;

/// Smallest edge, in pixels, of the stored SVG image.
const IMAGE_SIZE: u32 = 200;

/// `First Last Control#`, exactly as encoded into the code.
pub fn payload(entry: &Entry) -> String {
    format!(
        "{} {} {}",
        entry.first_name, entry.last_name, entry.control_number
    )
}

/// Regenerate the entry's QR image from its current fields.
pub fn attach(entry: &mut Entry) -> Result<()> {
    let code = encode(&payload(entry))?;
    let image = code
        .render::<svg::Color<'_>>()
        .min_dimensions(IMAGE_SIZE, IMAGE_SIZE)
        .build();
    entry.qr_image = Some(image.into_bytes());
    Ok(())
}

/// Render a payload as half-block rows for terminal display.
pub fn preview_lines(payload: &str) -> Result<Vec<String>> {
    let code = encode(payload)?;
    let rendered = code
        .render::<unicode::Dense1x2>()
        .dark_color(unicode::Dense1x2::Light)
        .light_color(unicode::Dense1x2::Dark)
        .build();
    Ok(rendered.lines().map(str::to_string).collect())
}

fn encode(payload: &str) -> Result<QrCode> {
    QrCode::new(payload.as_bytes()).context("failed to encode QR payload")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_is_name_and_control_number() {
        let mut entry = Entry::new(42);
        entry.first_name = "Jamie".into();
        entry.last_name = "Ortiz".into();
        assert_eq!(payload(&entry), "Jamie Ortiz 42");
    }

    #[test]
    fn attach_regenerates_on_edit() {
        let mut entry = Entry::new(1);
        entry.first_name = "Sam".into();
        attach(&mut entry).expect("qr should render");
        let first = entry.qr_image.clone().expect("image attached");
        assert!(String::from_utf8_lossy(&first).contains("<svg"));

        entry.control_number = 2;
        attach(&mut entry).expect("qr should render");
        assert_ne!(entry.qr_image, Some(first));
    }

    #[test]
    fn preview_has_rows() {
        let lines = preview_lines("Sam Lee 3").expect("preview should render");
        assert!(!lines.is_empty());
    }
}
