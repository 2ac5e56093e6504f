//! Styled text fragments for the genpdf emitter.
//!
//! Plans describe emphasis with [`Tone`] so they stay independent of any renderer. This module is
//! where tones become `genpdf` styles: a [`Span`] carries text plus bold/italic/color flags and
//! converts into a [`StyledString`] right before an element is built.

use genpdf::style::{Color, Style, StyledString};

use crate::model::{Cell, Tone};

/// Text colour of approved statuses.
pub const APPROVED_COLOR: Color = Color::Rgb(30, 120, 60);
/// Text colour of pending statuses and pending staff stages.
pub const PENDING_COLOR: Color = Color::Rgb(190, 120, 20);
/// Text colour of rejected statuses.
pub const REJECTED_COLOR: Color = Color::Rgb(180, 40, 40);
/// Text colour of placeholder values.
pub const MUTED_COLOR: Color = Color::Rgb(120, 120, 120);

/// A slice of text together with inline style attributes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Span {
    text: String,
    bold: bool,
    italic: bool,
    color: Option<Color>,
}

impl Span {
    /// Creates a new span with the provided text and no styles applied.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Builds the span for a table cell according to its tone.
    pub fn from_cell(cell: &Cell) -> Self {
        let span = Self::new(cell.text());
        match cell.tone() {
            Tone::Plain => span,
            Tone::Strong => span.bold(),
            Tone::Approved => span.colored(APPROVED_COLOR),
            Tone::Pending => span.colored(PENDING_COLOR),
            Tone::Rejected => span.colored(REJECTED_COLOR),
            Tone::Muted => span.italic().colored(MUTED_COLOR),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_bold(&self) -> bool {
        self.bold
    }

    pub fn is_italic(&self) -> bool {
        self.italic
    }

    pub fn color(&self) -> Option<Color> {
        self.color
    }

    /// Marks the span as bold.
    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    /// Marks the span as italic.
    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    /// Assigns a color to the span.
    pub fn colored(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    fn to_style(&self) -> Style {
        let mut style = Style::new();
        if let Some(color) = self.color {
            style.set_color(color);
        }
        if self.bold {
            style.set_bold();
        }
        if self.italic {
            style.set_italic();
        }
        style
    }

    /// Converts the span into a [`StyledString`].
    pub fn to_styled_string(&self) -> StyledString {
        StyledString::new(self.text.clone(), self.to_style())
    }
}

impl From<&Span> for StyledString {
    fn from(span: &Span) -> Self {
        span.to_styled_string()
    }
}

impl From<Span> for StyledString {
    fn from(span: Span) -> Self {
        span.to_styled_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_to_style_reflects_flags() {
        let span = Span::new("Hello")
            .bold()
            .italic()
            .colored(Color::Rgb(10, 20, 30));
        let styled = span.to_styled_string();
        assert_eq!(styled.s, "Hello");
        assert!(styled.style.is_bold());
        assert!(styled.style.is_italic());
        assert_eq!(styled.style.color(), Some(Color::Rgb(10, 20, 30)));
    }

    #[test]
    fn tones_map_to_colors() {
        let pending = Span::from_cell(&Cell::new("A (pending)").with_tone(Tone::Pending));
        assert_eq!(pending.color(), Some(PENDING_COLOR));
        assert!(!pending.is_bold());

        let muted = Span::from_cell(&Cell::new("Not Assigned").with_tone(Tone::Muted));
        assert!(muted.is_italic());
        assert_eq!(muted.color(), Some(MUTED_COLOR));

        let header = Span::from_cell(&Cell::new("Name").with_tone(Tone::Strong));
        assert!(header.is_bold());
        assert_eq!(header.color(), None);
    }
}
