//! End-to-end pipeline scenarios: submitted form pairs in, PNG bytes out.
//!
//! These exercise the same composition path the `/make` handler runs, minus
//! the HTTP socket: field mapping, logo preprocessing, vCard serialization,
//! and QR rastering.

use std::io::Cursor;

use anyhow::Result;
use image::{ImageFormat, Rgba, RgbaImage};
use sha2::{Digest, Sha256};

use qrcard::form::map_fields;
use qrcard::logo::{prepare_logo, LogoOutcome, RejectReason};
use qrcard::render::{compose, RenderOptions};

const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];

fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
    raw.iter().map(|(n, v)| (n.to_string(), v.to_string())).collect()
}

/// Run the full pipeline the way the request handler does
fn run_pipeline(raw: &[(&str, &str)], logo_upload: Option<&[u8]>) -> Result<(String, Vec<u8>)> {
    let (record, style) = map_fields(pairs(raw));
    let asset = prepare_logo(logo_upload, 244);
    let vcard = record.to_vcard();
    let options = RenderOptions::build(style, asset);
    let png = compose(&vcard, &options)?;
    Ok((vcard, png))
}

fn solid_png(width: u32, height: u32, pixel: Rgba<u8>) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, pixel);
    let mut out = Vec::new();
    img.write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
        .expect("encode fixture PNG");
    out
}

fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Pull one property line out of a serialized card: (params, unescaped value)
fn property<'a>(card: &'a str, name: &str) -> Option<(String, String)> {
    for line in card.split("\r\n") {
        let Some(rest) = line.strip_prefix(name) else {
            continue;
        };
        let Some((params, value)) = rest.split_once(':') else {
            continue;
        };
        return Some((params.trim_start_matches(';').to_string(), unescape(value)));
    }
    None
}

fn unescape(value: &str) -> String {
    let mut out = String::new();
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}

#[test]
fn scenario_full_form_without_logo() -> Result<()> {
    let (vcard, png) = run_pipeline(
        &[
            ("first_name", "Ada"),
            ("last_name", "Lovelace"),
            ("mobile", "+1234"),
            ("color", "#FF0000"),
            ("shape", "circle"),
        ],
        None,
    )?;

    assert!(vcard.contains("N:Lovelace;Ada;;;\r\n"));
    assert!(vcard.contains("FN:Ada Lovelace\r\n"));
    assert!(vcard.contains("TEL;TYPE=CELL,VOICE:+1234\r\n"));

    // Red circular modules, nothing from the transparent placeholder.
    let img = image::load_from_memory(&png)?.to_rgba8();
    let red = Rgba([255u8, 0, 0, 255]);
    let white = Rgba([255u8, 255, 255, 255]);
    assert!(img.pixels().any(|p| *p == red));
    assert!(img.pixels().all(|p| *p == red || *p == white));
    Ok(())
}

#[test]
fn scenario_valid_logo_is_stamped_at_the_center() -> Result<()> {
    let blue = Rgba([20u8, 40, 200, 255]);
    let upload = solid_png(100, 100, blue);

    let asset = prepare_logo(Some(&upload), 244);
    assert!(asset.present());
    assert_eq!(asset.pixels.dimensions(), (244, 244));

    let (_, png) = run_pipeline(&[("first_name", "Ada")], Some(&upload))?;
    let img = image::load_from_memory(&png)?.to_rgba8();
    let center = img.get_pixel(img.width() / 2, img.height() / 2);
    assert_eq!(center.0[3], 255);
    // Resampling a solid color may round channels by one.
    for (got, want) in center.0.iter().zip(blue.0.iter()) {
        assert!(got.abs_diff(*want) <= 1, "center {:?} != logo {:?}", center, blue);
    }
    Ok(())
}

#[test]
fn scenario_text_upload_degrades_to_placeholder() -> Result<()> {
    let upload = b"these are not the bytes of an image";

    let asset = prepare_logo(Some(upload.as_slice()), 244);
    assert_eq!(asset.outcome, LogoOutcome::Rejected(RejectReason::UnsupportedType));

    // The request still succeeds end to end.
    let (vcard, png) = run_pipeline(&[("first_name", "Ada")], Some(upload.as_slice()))?;
    assert!(vcard.contains("FN:Ada\r\n"));
    assert_eq!(&png[..8], &PNG_MAGIC);
    Ok(())
}

#[test]
fn scenario_empty_form_still_produces_a_card() -> Result<()> {
    let (vcard, png) = run_pipeline(&[], None)?;
    assert!(vcard.starts_with("BEGIN:VCARD\r\n"));
    assert!(vcard.contains("VERSION:3.0\r\n"));
    assert!(vcard.contains("N:;;;;\r\n"));
    assert!(vcard.ends_with("END:VCARD\r\n"));
    assert_eq!(&png[..8], &PNG_MAGIC);
    Ok(())
}

#[test]
fn identical_input_produces_identical_output() -> Result<()> {
    let fields: &[(&str, &str)] = &[
        ("first_name", "Ada"),
        ("last_name", "Lovelace"),
        ("mobile", "+1234"),
        ("office", "+5678"),
        ("email", "ada@example.com"),
        ("org", "Analytical Engines"),
        ("color", "#336699"),
        ("shape", "circle"),
    ];
    let upload = solid_png(64, 64, Rgba([1, 2, 3, 255]));

    let (vcard_a, png_a) = run_pipeline(fields, Some(&upload))?;
    let (vcard_b, png_b) = run_pipeline(fields, Some(&upload))?;

    assert_eq!(vcard_a, vcard_b);
    assert_eq!(sha256_hex(vcard_a.as_bytes()), sha256_hex(vcard_b.as_bytes()));
    assert_eq!(sha256_hex(&png_a), sha256_hex(&png_b));
    Ok(())
}

#[test]
fn serialized_card_round_trips_under_the_vcard_grammar() -> Result<()> {
    let (vcard, _) = run_pipeline(
        &[
            ("first_name", "Ada"),
            ("last_name", "Lovelace"),
            ("formatted_name", "Ada King, Countess of Lovelace"),
            ("mobile", "+1234"),
            ("email", "ada@example.com"),
            ("org", "Babbage, Lovelace & Co"),
            ("designation", "Analyst"),
            ("url", "https://example.com/ada"),
        ],
        None,
    )?;

    let (_, n) = property(&vcard, "N").expect("N line");
    assert_eq!(n, "Lovelace;Ada;;;");

    let (_, formatted) = property(&vcard, "FN").expect("FN line");
    assert_eq!(formatted, "Ada King, Countess of Lovelace");

    let (tel_params, tel) = property(&vcard, "TEL").expect("TEL line");
    assert_eq!(tel_params, "TYPE=CELL,VOICE");
    assert_eq!(tel, "+1234");

    let (email_params, email) = property(&vcard, "EMAIL").expect("EMAIL line");
    assert_eq!(email_params, "TYPE=WORK");
    assert_eq!(email, "ada@example.com");

    let (_, org) = property(&vcard, "ORG").expect("ORG line");
    assert_eq!(org, "Babbage, Lovelace & Co");

    let (_, title) = property(&vcard, "TITLE").expect("TITLE line");
    assert_eq!(title, "Analyst");

    let (_, url) = property(&vcard, "URL").expect("URL line");
    assert_eq!(url, "https://example.com/ada");
    Ok(())
}

#[test]
fn unknown_fields_never_break_the_pipeline() -> Result<()> {
    let (vcard, png) = run_pipeline(
        &[
            ("totally_unknown", "value"),
            ("another-one", "value"),
            ("first_name", "Ada"),
        ],
        None,
    )?;
    assert!(vcard.contains("FN:Ada\r\n"));
    assert_eq!(&png[..8], &PNG_MAGIC);
    Ok(())
}
