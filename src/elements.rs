//! Custom `genpdf` elements used by the sheet export.
//!
//! `genpdf` ships paragraphs, lists, tables and images but nothing for the
//! decorations a character sheet needs: barred section headings, separating
//! rules and attribute labels prefixed by a stroked icon.  This module also
//! holds the raster helpers that turn encoded image bytes into sized images.

use image::GenericImageView;

use genpdf::elements::Image;
use genpdf::error::{Context as _, Error};
use genpdf::style::{Color, Style, StyledString};
use genpdf::{render, Alignment, Element, Mm, Position, RenderResult, Scale, Size};

use crate::icons::Icon;

const DEFAULT_IMAGE_DPI: f64 = 300.0;
const MM_PER_INCH: f64 = 25.4;
const HEADING_BAR_WIDTH_MM: f64 = 1.2;
const HEADING_BAR_STROKE_MM: f64 = 0.3;
const HEADING_TEXT_INSET_MM: f64 = 3.0;
const RULE_SPACING_MM: f64 = 3.0;
const ICON_GAP_MM: f64 = 1.2;

pub(crate) fn mm_from_f64(value: f64) -> Mm {
    Mm::from(printpdf::Mm(value))
}

pub(crate) fn mm_to_f64(value: Mm) -> f64 {
    let mm: printpdf::Mm = value.into();
    mm.0
}

fn estimated_image_size(image: &image::DynamicImage, dpi: f64) -> Size {
    let (px_width, px_height) = image.dimensions();
    let width_mm = MM_PER_INCH * (px_width as f64) / dpi;
    let height_mm = MM_PER_INCH * (px_height as f64) / dpi;
    Size::new(mm_from_f64(width_mm), mm_from_f64(height_mm))
}

/// Loads an image from in-memory bytes using the [`image`] crate with descriptive errors.
pub fn decode_image_from_bytes(bytes: impl AsRef<[u8]>) -> Result<image::DynamicImage, Error> {
    image::load_from_memory(bytes.as_ref()).context("Failed to decode image from provided bytes")
}

/// Decodes `bytes` into a `genpdf` image scaled to `width`, keeping the aspect ratio.
pub fn image_with_width(bytes: impl AsRef<[u8]>, width: Mm) -> Result<Image, Error> {
    let dynamic = decode_image_from_bytes(bytes)?;
    let natural = mm_to_f64(estimated_image_size(&dynamic, DEFAULT_IMAGE_DPI).width);
    let mut image = Image::from_dynamic_image(dynamic)?;
    if natural > f64::EPSILON {
        let scale = mm_to_f64(width) / natural;
        image.set_scale(Scale::new(scale, scale));
    }
    Ok(image)
}

pub(crate) fn text_width(context: &genpdf::Context, text: &str, style: Style) -> Mm {
    StyledString::new(text.to_string(), style).width(&context.font_cache)
}

/// Shortens `text` with a trailing ellipsis until it fits on one line of `width`.
pub(crate) fn fit_to_width(
    context: &genpdf::Context,
    text: &str,
    style: Style,
    width: Mm,
) -> String {
    if text_width(context, text, style) <= width {
        return text.to_string();
    }

    let mut chars: Vec<char> = text.chars().collect();
    while chars.pop().is_some() {
        let kept: String = chars.iter().collect();
        let candidate = format!("{}…", kept.trim_end());
        if text_width(context, &candidate, style) <= width {
            return candidate;
        }
    }
    String::new()
}

fn does_not_fit() -> RenderResult {
    let mut result = RenderResult::default();
    result.has_more = true;
    result
}

/// Section title with a thick bar on its left edge.
pub struct SectionHeading {
    text: String,
    style: Style,
    bar_color: Color,
}

impl SectionHeading {
    /// Creates a bold heading with a black bar.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: Style::new().bold().with_font_size(16),
            bar_color: Color::Rgb(0, 0, 0),
        }
    }

    /// Sets the bar color and returns the updated heading.
    pub fn with_bar_color(mut self, color: Color) -> Self {
        self.bar_color = color;
        self
    }
}

impl Element for SectionHeading {
    fn render(
        &mut self,
        context: &genpdf::Context,
        area: render::Area<'_>,
        style: Style,
    ) -> Result<RenderResult, Error> {
        let style = style.and(self.style);
        let line_height = style.line_height(&context.font_cache);
        if line_height > area.size().height {
            return Ok(does_not_fit());
        }

        let inset = mm_from_f64(HEADING_TEXT_INSET_MM);
        match area.text_section(&context.font_cache, Position::new(inset, 0), style) {
            Some(mut section) => section.print_str(&self.text, style)?,
            None => return Ok(does_not_fit()),
        }

        // genpdf strokes have a fixed width, so the bar is built from parallel lines.
        let bar_style = Style::new().with_color(self.bar_color);
        let mut x = 0.0;
        while x <= HEADING_BAR_WIDTH_MM {
            area.draw_line(
                vec![
                    Position::new(mm_from_f64(x), 0),
                    Position::new(mm_from_f64(x), line_height),
                ],
                bar_style,
            );
            x += HEADING_BAR_STROKE_MM;
        }

        let mut result = RenderResult::default();
        result.size = Size::new(area.size().width, line_height);
        Ok(result)
    }
}

/// Full-width separator drawn between sections.
pub struct Rule {
    color: Color,
    spacing: Mm,
}

impl Rule {
    /// Creates a rule in the given color with the default spacing.
    pub fn new(color: Color) -> Self {
        Self {
            color,
            spacing: mm_from_f64(RULE_SPACING_MM),
        }
    }
}

impl Element for Rule {
    fn render(
        &mut self,
        _context: &genpdf::Context,
        area: render::Area<'_>,
        _style: Style,
    ) -> Result<RenderResult, Error> {
        let height = self.spacing + self.spacing;
        if height > area.size().height {
            return Ok(does_not_fit());
        }

        let width = area.size().width;
        area.draw_line(
            vec![
                Position::new(0, self.spacing),
                Position::new(width, self.spacing),
            ],
            Style::new().with_color(self.color),
        );

        let mut result = RenderResult::default();
        result.size = Size::new(width, height);
        Ok(result)
    }
}

/// A single line of text prefixed by a stroked icon.
///
/// Labels without an icon render the text alone, so unknown attribute names
/// still line up with the others.
pub struct IconLabel {
    icon: Option<Icon>,
    text: String,
    style: Style,
    alignment: Alignment,
}

impl IconLabel {
    /// Creates a left aligned label.
    pub fn new(icon: Option<Icon>, text: impl Into<String>) -> Self {
        Self {
            icon,
            text: text.into(),
            style: Style::new(),
            alignment: Alignment::Left,
        }
    }

    /// Sets the text style and returns the updated label.
    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// Sets the alignment and returns the updated label.
    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }
}

impl Element for IconLabel {
    fn render(
        &mut self,
        context: &genpdf::Context,
        area: render::Area<'_>,
        style: Style,
    ) -> Result<RenderResult, Error> {
        let style = style.and(self.style);
        let line_height = style.line_height(&context.font_cache);
        if line_height > area.size().height {
            return Ok(does_not_fit());
        }

        let icon_size = mm_to_f64(line_height) * 0.8;
        let icon_width = if self.icon.is_some() {
            mm_from_f64(icon_size + ICON_GAP_MM)
        } else {
            Mm::default()
        };
        let total_width = icon_width + text_width(context, &self.text, style);

        let available_width = area.size().width;
        let x_offset = match self.alignment {
            Alignment::Left => Mm::default(),
            Alignment::Center => (available_width - total_width) / 2.0,
            Alignment::Right => available_width - total_width,
        };

        if let Some(icon) = self.icon {
            let left = mm_to_f64(x_offset);
            let top = (mm_to_f64(line_height) - icon_size) / 2.0;
            let stroke_style = match style.color() {
                Some(color) => Style::new().with_color(color),
                None => Style::new(),
            };
            for stroke in icon.strokes() {
                let points = stroke
                    .into_iter()
                    .map(|(x, y)| {
                        Position::new(
                            mm_from_f64(left + x * icon_size),
                            mm_from_f64(top + y * icon_size),
                        )
                    })
                    .collect::<Vec<_>>();
                area.draw_line(points, stroke_style);
            }
        }

        match area.text_section(
            &context.font_cache,
            Position::new(x_offset + icon_width, 0),
            style,
        ) {
            Some(mut section) => section.print_str(&self.text, style)?,
            None => return Ok(does_not_fit()),
        }

        let mut result = RenderResult::default();
        result.size = Size::new(total_width, line_height);
        Ok(result)
    }
}
