//! Exporting a sheet to PDF.
//!
//! The export mirrors the terminal layout: one barred heading per section,
//! the attributes as a three column grid of framed cards, and the racial
//! abilities as a bulleted list.  Page geometry and raster settings are fixed
//! by [`ExportSettings::default`]: US Letter in portrait, half-inch margins,
//! raster art at twice the CSS pixel density and JPEG quality 0.98.

use std::fs;
use std::io::{self, Cursor};
use std::path::{Path, PathBuf};

use genpdf::elements::{FrameCellDecorator, LinearLayout, Paragraph, TableLayout, UnorderedList};
use genpdf::error::{Error, ErrorKind};
use genpdf::style::{Color, Style, StyledString};
use genpdf::{Alignment, Element, Margins, Mm, PageDecorator, Position, Size};
use image::{DynamicImage, ImageBuffer, ImageOutputFormat, Rgb};
use log::{debug, info};

use crate::elements::{self, IconLabel, Rule, SectionHeading};
use crate::fonts;
use crate::layout::{self, modifier_label, AttributeCell, Section, SheetLayout, Stat, SHEET_TITLE};
use crate::model::CharacterSheet;

/// Prefix shared by every exported file name.
pub const FILENAME_PREFIX: &str = "ficha-personagem";

const MM_PER_INCH: f64 = 25.4;
const LETTER_WIDTH_IN: f64 = 8.5;
const LETTER_HEIGHT_IN: f64 = 11.0;
const CSS_PX_PER_INCH: f64 = 96.0;
const ATTRIBUTE_COLUMNS: usize = 3;
const BANNER_HEIGHT_IN: f64 = 0.4;
const FOOTER_HEIGHT_MM: f64 = 8.0;
const FOOTER_SLACK_MM: f64 = 2.0;

const STONE_600: Color = Color::Rgb(87, 83, 78);
const INK: Color = Color::Rgb(20, 18, 16);

/// Errors that can occur while exporting a sheet.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("PDF rendering failed: {0}")]
    Pdf(#[from] Error),

    #[error("Failed to encode raster content: {0}")]
    Raster(#[from] image::ImageError),

    #[error("Failed to write {}: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },
}

/// Geometry and raster settings of an export.
///
/// The values are fixed: US Letter in portrait, half-inch margins, raster art
/// at twice the CSS pixel density and JPEG quality 0.98.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExportSettings {
    margin_in: f64,
    jpeg_quality: f64,
    raster_scale: f64,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            margin_in: 0.5,
            jpeg_quality: 0.98,
            raster_scale: 2.0,
        }
    }
}

impl ExportSettings {
    /// Returns the margin on every side, in inches.
    pub fn margin_in(&self) -> f64 {
        self.margin_in
    }

    /// Returns the JPEG quality in the `0.0..=1.0` range.
    pub fn jpeg_quality(&self) -> f64 {
        self.jpeg_quality
    }

    /// Returns the raster density multiplier.
    pub fn raster_scale(&self) -> f64 {
        self.raster_scale
    }

    /// Returns the US Letter page size in portrait.
    pub fn page_size(&self) -> Size {
        Size::new(
            elements::mm_from_f64(LETTER_WIDTH_IN * MM_PER_INCH),
            elements::mm_from_f64(LETTER_HEIGHT_IN * MM_PER_INCH),
        )
    }

    /// Returns the page margins.
    pub fn margins(&self) -> Margins {
        let margin = elements::mm_from_f64(self.margin_in * MM_PER_INCH);
        Margins::trbl(margin, margin, margin, margin)
    }

    /// Returns the width available between the margins, in millimetres.
    pub fn content_width_mm(&self) -> f64 {
        elements::mm_to_f64(self.page_size().width) - 2.0 * self.margin_in * MM_PER_INCH
    }

    /// Returns the JPEG quality as the percentage expected by the encoder.
    pub fn jpeg_quality_percent(&self) -> u8 {
        (self.jpeg_quality * 100.0).round().clamp(1.0, 100.0) as u8
    }

    /// Returns the pixel density used for raster art.
    pub fn raster_dpi(&self) -> f64 {
        CSS_PX_PER_INCH * self.raster_scale
    }
}

/// Returns the file name an export of `sheet` is saved under.
///
/// Race and class are used as sent by the generator; only path separators are
/// replaced so the file always lands in the chosen directory.
pub fn export_filename(sheet: &CharacterSheet) -> String {
    format!(
        "{}-{}-{}.pdf",
        FILENAME_PREFIX,
        filename_component(sheet.race()),
        filename_component(sheet.class())
    )
}

fn filename_component(value: &str) -> String {
    value
        .chars()
        .map(|c| match c {
            '/' | '\\' | '\0' => '-',
            other => other,
        })
        .collect()
}

/// A rendered PDF together with the name it should be saved under.
#[derive(Clone, Debug)]
pub struct RenderedSheet {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Renders sheets to PDF.
#[derive(Clone, Debug, Default)]
pub struct SheetExporter {
    settings: ExportSettings,
}

impl SheetExporter {
    /// Returns the settings used for exports.
    pub fn settings(&self) -> &ExportSettings {
        &self.settings
    }

    /// Renders `sheet` to PDF bytes.
    pub fn render(&self, sheet: &CharacterSheet) -> Result<RenderedSheet, ExportError> {
        let layout = layout::render_sheet(sheet);
        let document = self.build_document(sheet, &layout)?;

        let mut bytes = Vec::new();
        document.render(&mut bytes)?;

        Ok(RenderedSheet {
            filename: export_filename(sheet),
            bytes,
        })
    }

    /// Renders the sheet and saves it into `directory`, creating the directory
    /// when it is missing.
    ///
    /// Does nothing and returns `Ok(None)` when there is no sheet to export.
    pub fn export(
        &self,
        sheet: Option<&CharacterSheet>,
        directory: impl AsRef<Path>,
    ) -> Result<Option<PathBuf>, ExportError> {
        let Some(sheet) = sheet else {
            debug!("Export skipped: no sheet loaded");
            return Ok(None);
        };

        let rendered = self.render(sheet)?;
        let directory = directory.as_ref();
        fs::create_dir_all(directory).map_err(|source| ExportError::Write {
            path: directory.to_path_buf(),
            source,
        })?;
        let path = directory.join(&rendered.filename);
        fs::write(&path, &rendered.bytes).map_err(|source| ExportError::Write {
            path: path.clone(),
            source,
        })?;

        info!(
            "Exported {} ({} bytes)",
            path.display(),
            rendered.bytes.len()
        );
        Ok(Some(path))
    }

    fn build_document(
        &self,
        sheet: &CharacterSheet,
        layout: &SheetLayout,
    ) -> Result<genpdf::Document, ExportError> {
        let font_family = fonts::default_font_family()?;
        let mut document = genpdf::Document::new(font_family);
        document.set_title(format!("{} - {} {}", SHEET_TITLE, sheet.race(), sheet.class()));
        document.set_paper_size(self.settings.page_size());
        document.set_font_size(11);
        document.set_page_decorator(SheetPageDecorator::new(
            self.settings.margins(),
            format!("{} • {}", sheet.race(), sheet.class()),
        ));

        let content_width = elements::mm_from_f64(self.settings.content_width_mm());
        document.push(elements::image_with_width(
            self.parchment_banner()?,
            content_width,
        )?);

        let mut title = Paragraph::new(StyledString::new(
            SHEET_TITLE.to_uppercase(),
            Style::new().bold().with_font_size(20),
        ));
        title.set_alignment(Alignment::Center);
        document.push(title.padded(Margins::trbl(3, 0, 3, 0)));

        for section in layout.sections() {
            document.push(SectionHeading::new(section.title()).with_bar_color(INK));
            match section {
                Section::Identity { race, class } => {
                    document.push(labelled("Raça", race));
                    document.push(labelled("Classe", class));
                }
                Section::Attributes(cells) => document.push(attribute_grid(cells)?),
                Section::Combat(stats) => document.push(combat_block(stats)),
                Section::Abilities(items) => {
                    if !items.is_empty() {
                        document.push(ability_list(items));
                    }
                }
            }
            document.push(Rule::new(STONE_600));
        }

        Ok(document)
    }

    /// Generates the parchment strip placed above the sheet as JPEG bytes.
    fn parchment_banner(&self) -> Result<Vec<u8>, ExportError> {
        let dpi = self.settings.raster_dpi();
        let width_in = self.settings.content_width_mm() / MM_PER_INCH;
        let width = (width_in * dpi).round().max(1.0) as u32;
        let height = (BANNER_HEIGHT_IN * dpi).round().max(1.0) as u32;

        let buffer = ImageBuffer::from_fn(width, height, |x, y| {
            let grain = (noise(x / 3, y / 3) % 18) as u8;
            let fade = ((y as f64 / height as f64) * 14.0) as u8;
            Rgb([
                236u8.saturating_sub(grain).saturating_sub(fade),
                219u8.saturating_sub(grain).saturating_sub(fade),
                178u8.saturating_sub(grain / 2).saturating_sub(fade),
            ])
        });

        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(buffer).write_to(
            &mut Cursor::new(&mut bytes),
            ImageOutputFormat::Jpeg(self.settings.jpeg_quality_percent()),
        )?;
        Ok(bytes)
    }
}

fn noise(x: u32, y: u32) -> u32 {
    let mut h = x.wrapping_mul(374_761_393) ^ y.wrapping_mul(668_265_263);
    h = (h ^ (h >> 13)).wrapping_mul(1_274_126_177);
    h ^ (h >> 16)
}

fn labelled(label: &str, value: &str) -> Paragraph {
    let mut paragraph = Paragraph::default();
    paragraph.push(StyledString::new(format!("{label}: "), Style::new().bold()));
    paragraph.push(StyledString::new(value.to_string(), Style::new()));
    paragraph
}

fn centered(text: String, style: Style) -> Paragraph {
    let mut paragraph = Paragraph::new(StyledString::new(text, style));
    paragraph.set_alignment(Alignment::Center);
    paragraph
}

fn attribute_card(cell: &AttributeCell) -> impl Element {
    let mut card = LinearLayout::vertical();
    card.push(
        IconLabel::new(cell.icon, cell.name.to_uppercase())
            .with_style(Style::new().bold().with_font_size(12))
            .with_alignment(Alignment::Center),
    );
    card.push(centered(cell.score.to_string(), Style::new().with_font_size(18)));
    card.push(centered(
        modifier_label(cell.modifier),
        Style::new().with_font_size(9).with_color(STONE_600),
    ));
    card.padded(Margins::trbl(2, 2, 2, 2))
}

fn attribute_grid(cells: &[AttributeCell]) -> Result<LinearLayout, Error> {
    let mut wrapper = LinearLayout::vertical();
    if cells.is_empty() {
        wrapper.push(Paragraph::new("—"));
        return Ok(wrapper);
    }

    let mut table = TableLayout::new(vec![1; ATTRIBUTE_COLUMNS]);
    table.set_cell_decorator(FrameCellDecorator::new(true, true, false));
    for chunk in cells.chunks(ATTRIBUTE_COLUMNS) {
        let mut row = table.row();
        for cell in chunk {
            row = row.element(attribute_card(cell));
        }
        for _ in chunk.len()..ATTRIBUTE_COLUMNS {
            row = row.element(Paragraph::default());
        }
        row.push()?;
    }
    wrapper.push(table);
    Ok(wrapper)
}

fn combat_block(stats: &[Stat]) -> LinearLayout {
    let mut block = LinearLayout::vertical();
    for stat in stats {
        block.push(labelled(&stat.label, &stat.value.to_string()));
    }
    block
}

fn ability_list(items: &[String]) -> UnorderedList {
    let mut list = UnorderedList::new();
    for item in items {
        list.push(Paragraph::new(item.as_str()));
    }
    list
}

/// Applies the page margins and stamps a footer with the page number.
struct SheetPageDecorator {
    page: usize,
    margins: Margins,
    footer_text: String,
}

impl SheetPageDecorator {
    fn new(margins: Margins, footer_text: String) -> Self {
        Self {
            page: 0,
            margins,
            footer_text,
        }
    }
}

impl PageDecorator for SheetPageDecorator {
    fn decorate_page<'a>(
        &mut self,
        context: &genpdf::Context,
        mut area: genpdf::render::Area<'a>,
        style: Style,
    ) -> Result<genpdf::render::Area<'a>, Error> {
        self.page += 1;
        area.add_margins(self.margins);

        let footer_height: Mm = elements::mm_from_f64(FOOTER_HEIGHT_MM);
        let available = area.size().height;
        if footer_height > available {
            return Err(Error::new(
                "Footer height exceeds available space",
                ErrorKind::InvalidData,
            ));
        }

        let mut footer_area = area.clone();
        footer_area.add_offset(Position::new(0, available - footer_height));
        let footer_style = Style::new().with_font_size(8).with_color(STONE_600);
        let page_label = format!(" • {}", self.page);
        let merged = style.and(footer_style);
        let label_width = elements::text_width(context, &page_label, merged);
        let room = area.size().width - label_width - elements::mm_from_f64(FOOTER_SLACK_MM);
        let text = elements::fit_to_width(context, &self.footer_text, merged, room);
        let mut footer = Paragraph::new(StyledString::new(
            format!("{text}{page_label}"),
            footer_style,
        ));
        footer.set_alignment(Alignment::Right);
        let result = footer.render(context, footer_area, style)?;
        if result.has_more {
            return Err(Error::new(
                "Footer does not fit into the reserved space",
                ErrorKind::PageSizeExceeded,
            ));
        }

        area.set_height(available - footer_height);
        Ok(area)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::GenericImageView;

    #[test]
    fn filename_uses_race_and_class() {
        let sheet = CharacterSheet::new("Elfo", "Guerreiro");
        assert_eq!(export_filename(&sheet), "ficha-personagem-Elfo-Guerreiro.pdf");
    }

    #[test]
    fn filename_keeps_accents_but_not_separators() {
        let sheet = CharacterSheet::new("Meio/Elfo", "Clérigo");
        assert_eq!(export_filename(&sheet), "ficha-personagem-Meio-Elfo-Clérigo.pdf");
    }

    #[test]
    fn default_settings_are_letter_portrait() {
        let settings = ExportSettings::default();
        assert_eq!(settings.margin_in(), 0.5);
        assert_eq!(settings.jpeg_quality_percent(), 98);
        assert_eq!(settings.raster_dpi(), 192.0);

        let size = settings.page_size();
        assert!((elements::mm_to_f64(size.width) - 215.9).abs() < 0.1);
        assert!((elements::mm_to_f64(size.height) - 279.4).abs() < 0.1);
        assert!((settings.content_width_mm() - 190.5).abs() < 0.1);
    }

    #[test]
    fn banner_is_jpeg_at_raster_density() {
        let exporter = SheetExporter::default();
        let bytes = exporter.parchment_banner().expect("banner");
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);

        let decoded = elements::decode_image_from_bytes(&bytes).expect("decode");
        assert_eq!(decoded.width(), 1440);
        assert_eq!(decoded.height(), 77);
    }

    #[test]
    fn exporting_nothing_writes_nothing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let exported = SheetExporter::default()
            .export(None, dir.path())
            .expect("no-op export");
        assert!(exported.is_none());
        assert_eq!(fs::read_dir(dir.path()).expect("read dir").count(), 0);
    }
}
