//! Content stream generation for page overlays.
//!
//! The mutation operations (page numbers, watermark, signature stamp,
//! redaction) draw by appending a small content stream to a page. This
//! module builds those streams operator by operator.

use std::fmt::Write;

/// Fill color for overlay drawing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Color {
    /// RGB color, each component in [0.0, 1.0]
    Rgb(f64, f64, f64),
    /// Grayscale, 0.0 = black, 1.0 = white
    Gray(f64),
}

impl Color {
    pub fn rgb(r: f64, g: f64, b: f64) -> Self {
        Color::Rgb(r, g, b)
    }

    pub fn gray(value: f64) -> Self {
        Color::Gray(value)
    }

    pub fn black() -> Self {
        Color::Gray(0.0)
    }
}

/// Builds a content stream from drawing operators.
///
/// Coordinates follow the page coordinate space: origin at the lower-left
/// corner, units in points.
#[derive(Debug, Default, Clone)]
pub struct ContentBuilder {
    operations: String,
}

impl ContentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Save the graphics state (`q`)
    pub fn save_state(&mut self) -> &mut Self {
        self.operations.push_str("q\n");
        self
    }

    /// Restore the graphics state (`Q`)
    pub fn restore_state(&mut self) -> &mut Self {
        self.operations.push_str("Q\n");
        self
    }

    /// Translate the coordinate system
    pub fn translate(&mut self, tx: f64, ty: f64) -> &mut Self {
        writeln!(&mut self.operations, "1 0 0 1 {tx:.2} {ty:.2} cm").unwrap();
        self
    }

    /// Rotate the coordinate system by an angle in radians
    pub fn rotate(&mut self, angle: f64) -> &mut Self {
        let cos = angle.cos();
        let sin = angle.sin();
        writeln!(
            &mut self.operations,
            "{cos:.6} {sin:.6} {:.6} {cos:.6} 0 0 cm",
            -sin
        )
        .unwrap();
        self
    }

    /// Set the fill color
    pub fn set_fill_color(&mut self, color: Color) -> &mut Self {
        match color {
            Color::Rgb(r, g, b) => {
                writeln!(&mut self.operations, "{r:.3} {g:.3} {b:.3} rg").unwrap()
            }
            Color::Gray(g) => writeln!(&mut self.operations, "{g:.3} g").unwrap(),
        }
        self
    }

    /// Reference a graphics state parameter dictionary from the page
    /// resources (`gs`), typically for alpha blending
    pub fn set_ext_gstate(&mut self, name: &str) -> &mut Self {
        writeln!(&mut self.operations, "/{name} gs").unwrap();
        self
    }

    /// Add a rectangle to the current path
    pub fn rect(&mut self, x: f64, y: f64, width: f64, height: f64) -> &mut Self {
        writeln!(
            &mut self.operations,
            "{x:.2} {y:.2} {width:.2} {height:.2} re"
        )
        .unwrap();
        self
    }

    /// Fill the current path (`f`)
    pub fn fill(&mut self) -> &mut Self {
        self.operations.push_str("f\n");
        self
    }

    /// Begin a text object (`BT`)
    pub fn begin_text(&mut self) -> &mut Self {
        self.operations.push_str("BT\n");
        self
    }

    /// End a text object (`ET`)
    pub fn end_text(&mut self) -> &mut Self {
        self.operations.push_str("ET\n");
        self
    }

    /// Select a font resource by name at the given size
    pub fn set_font(&mut self, name: &str, size: f64) -> &mut Self {
        writeln!(&mut self.operations, "/{name} {size:.2} Tf").unwrap();
        self
    }

    /// Move the text position
    pub fn text_position(&mut self, x: f64, y: f64) -> &mut Self {
        writeln!(&mut self.operations, "{x:.2} {y:.2} Td").unwrap();
        self
    }

    /// Show a text string (`Tj`), escaping delimiter characters
    pub fn show_text(&mut self, text: &str) -> &mut Self {
        writeln!(&mut self.operations, "({}) Tj", escape_string(text)).unwrap();
        self
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Finished operator sequence as stream data
    pub fn into_bytes(self) -> Vec<u8> {
        self.operations.into_bytes()
    }

    #[cfg(test)]
    pub(crate) fn as_str(&self) -> &str {
        &self.operations
    }
}

/// Escape characters that delimit literal strings in content streams.
pub fn escape_string(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '(' => escaped.push_str("\\("),
            ')' => escaped.push_str("\\)"),
            '\\' => escaped.push_str("\\\\"),
            _ => escaped.push(c),
        }
    }
    escaped
}
