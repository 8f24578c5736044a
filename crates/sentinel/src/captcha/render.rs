//! CAPTCHA answer and image generation.
//!
//! The image is one SVG `<text>` per glyph, each in
//! its own fixed-size cell, so the canvas grows with the answer length.
//! Distortion-heavy rendering is out of scope here.

use base64::{Engine, engine::general_purpose::STANDARD};
use rand::Rng;
use std::fmt::Write;

/// Width of one glyph cell (px)
const CELL: u32 = 36;
/// Canvas height (px)
const CANVAS_HEIGHT: u32 = 56;
/// Largest tilt applied to a glyph (degrees)
const MAX_TILT: i32 = 12;

/// Uppercase alphanumeric answer
pub fn random_answer<R: Rng + ?Sized>(rng: &mut R, length: usize) -> String {
    (0..length)
        .map(|_| {
            let idx = rng.random_range(0..36u8);
            if idx < 10 {
                (b'0' + idx) as char
            } else {
                (b'A' + idx - 10) as char
            }
        })
        .collect()
}

/// Render `answer` as a base64 SVG data URI
pub fn render_data_uri(answer: &str) -> String {
    let svg = glyph_svg(&mut rand::rng(), answer);
    format!("data:image/svg+xml;base64,{}", STANDARD.encode(svg))
}

fn glyph_svg<R: Rng + ?Sized>(rng: &mut R, answer: &str) -> String {
    let cells = answer.chars().count().max(1) as u32;
    let width = CELL * cells;
    let baseline = CANVAS_HEIGHT * 2 / 3;

    let mut svg = String::new();
    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {width} {CANVAS_HEIGHT}" width="{width}" height="{CANVAS_HEIGHT}" font-family="monospace" font-size="{}" text-anchor="middle">"#,
        CELL - 6
    );

    for (cell, glyph) in answer.chars().enumerate() {
        let cx = CELL * cell as u32 + CELL / 2;
        let tilt = rng.random_range(-MAX_TILT..=MAX_TILT);
        let _ = write!(
            svg,
            r#"<text x="{cx}" y="{baseline}" transform="rotate({tilt} {cx} {baseline})">{glyph}</text>"#
        );
    }

    svg.push_str("</svg>");
    svg
}
