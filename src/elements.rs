//! Custom `genpdf` elements used by the PDF emitter.
//!
//! Besides the millimetre helpers this module loads the department logo through the [`image`]
//! crate and provides [`SignatureLine`], the rule-plus-name block printed above the footer.

use std::path::Path;

use image::GenericImageView;

use genpdf::elements::{Image, Paragraph};
use genpdf::error::{Context as _, Error};
use genpdf::style::Style;
use genpdf::{render, Alignment, Element, Mm, Position, RenderResult, Scale, Size};

use crate::model::HorizontalAlignment;

const DEFAULT_IMAGE_DPI: f64 = 300.0;
const MM_PER_INCH: f64 = 25.4;
const DEFAULT_SIGNATURE_WIDTH_MM: f64 = 60.0;
const DEFAULT_SIGNATURE_GAP_MM: f64 = 12.0;
const LABEL_SPACING_MM: f64 = 1.5;

pub(crate) fn mm_from_f64(value: f64) -> Mm {
    Mm::from(printpdf::Mm(value))
}

impl From<HorizontalAlignment> for Alignment {
    fn from(alignment: HorizontalAlignment) -> Self {
        match alignment {
            HorizontalAlignment::Left => Alignment::Left,
            HorizontalAlignment::Center => Alignment::Center,
            HorizontalAlignment::Right => Alignment::Right,
        }
    }
}

fn estimated_image_width(image: &image::DynamicImage, dpi: f64) -> f64 {
    let (px_width, _) = image.dimensions();
    MM_PER_INCH * (px_width as f64) / dpi
}

/// Loads an image from the given path using the [`image`] crate with descriptive errors.
pub fn decode_image_from_path(path: impl AsRef<Path>) -> Result<image::DynamicImage, Error> {
    let path = path.as_ref();
    let reader = image::io::Reader::open(path)
        .with_context(|| format!("Failed to open image file {}", path.display()))?;
    reader
        .with_guessed_format()
        .context("Unable to determine image format")?
        .decode()
        .with_context(|| format!("Failed to decode image file {}", path.display()))
}

/// Loads the logo at `path`, scaled to `width_mm` and aligned as requested.
pub fn logo_from_path(
    path: impl AsRef<Path>,
    width_mm: f64,
    alignment: Alignment,
) -> Result<Image, Error> {
    let dynamic = decode_image_from_path(path)?;
    let natural = estimated_image_width(&dynamic, DEFAULT_IMAGE_DPI);
    let mut image = Image::from_dynamic_image(dynamic)?;
    if natural > f64::EPSILON {
        let scale = width_mm / natural;
        image.set_scale(Scale::new(scale, scale));
    }
    image.set_alignment(alignment);
    Ok(image)
}

/// A horizontal rule with a name centred underneath, leaving room above for a handwritten
/// signature.
pub struct SignatureLine {
    label: String,
    alignment: Alignment,
    width: Mm,
    gap: Mm,
}

impl SignatureLine {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            alignment: Alignment::Right,
            width: mm_from_f64(DEFAULT_SIGNATURE_WIDTH_MM),
            gap: mm_from_f64(DEFAULT_SIGNATURE_GAP_MM),
        }
    }

    /// Sets where the line sits within the available width.
    pub fn with_alignment(mut self, alignment: impl Into<Alignment>) -> Self {
        self.alignment = alignment.into();
        self
    }

    /// Sets the length of the rule.
    pub fn with_width(mut self, width: Mm) -> Self {
        self.width = width;
        self
    }

    /// Sets the blank space left above the rule.
    pub fn with_gap(mut self, gap: Mm) -> Self {
        self.gap = gap;
        self
    }
}

impl Element for SignatureLine {
    fn render(
        &mut self,
        context: &genpdf::Context,
        area: render::Area<'_>,
        style: Style,
    ) -> Result<RenderResult, Error> {
        let mut result = RenderResult::default();

        let spacing = mm_from_f64(LABEL_SPACING_MM);
        let needed = self.gap + spacing + style.line_height(&context.font_cache);
        if needed > area.size().height {
            result.has_more = true;
            return Ok(result);
        }

        let available = area.size().width;
        let width = if self.width > available {
            available
        } else {
            self.width
        };
        let x_offset = match self.alignment {
            Alignment::Left => Mm::default(),
            Alignment::Center => (available - width) / 2.0,
            Alignment::Right => available - width,
        };

        area.draw_line(
            vec![
                Position::new(x_offset, self.gap),
                Position::new(x_offset + width, self.gap),
            ],
            Style::new(),
        );

        let mut label_area = area.clone();
        label_area.add_offset(Position::new(x_offset, self.gap + spacing));
        label_area.set_width(width);
        let mut label = Paragraph::new(self.label.as_str());
        label.set_alignment(Alignment::Center);
        let label_result = label.render(context, label_area, style)?;

        result.size = Size::new(available, self.gap + spacing + label_result.size.height);
        result.has_more = label_result.has_more;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_line_renders_into_a_document() {
        if !crate::fonts::default_fonts_available() {
            eprintln!("Skipping signature_line_renders_into_a_document: no fonts found.");
            return;
        }
        let family = crate::fonts::default_font_family().expect("fonts load");
        let mut document = genpdf::Document::new(family);
        document.push(
            SignatureLine::new("Head of Department")
                .with_alignment(HorizontalAlignment::Center)
                .with_width(mm_from_f64(40.0)),
        );
        let mut bytes = Vec::new();
        document.render(&mut bytes).expect("signature line renders");
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn alignments_map_onto_genpdf() {
        assert_eq!(Alignment::from(HorizontalAlignment::Right), Alignment::Right);
        assert_eq!(Alignment::from(HorizontalAlignment::Center), Alignment::Center);
    }

    #[test]
    fn missing_logo_is_reported() {
        let err = logo_from_path("/nonexistent/logo.png", 20.0, Alignment::Center)
            .err()
            .expect("missing file must fail");
        assert!(err.to_string().contains("logo.png"));
    }
}
