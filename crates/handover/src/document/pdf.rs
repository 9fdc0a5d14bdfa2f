//! Paints a [`Layout`] onto PDF pages with printpdf.

use printpdf::path::PaintMode;
use printpdf::{
    BuiltinFont, Color, Greyscale, IndirectFontRef, Mm, PdfDocument, PdfLayerReference, Rect,
};

use super::layout::{
    Element, Font, Layout, GRID_SHADE, GRID_THICKNESS, HEADER_SHADE, PAGE_HEIGHT, PAGE_WIDTH,
};
use crate::error::{Error, Result};

const LAYER_NAME: &str = "Form";

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

impl Fonts {
    fn get(&self, font: Font) -> &IndirectFontRef {
        match font {
            Font::Regular => &self.regular,
            Font::Bold => &self.bold,
        }
    }
}

fn grey(level: f32) -> Color {
    Color::Greyscale(Greyscale::new(level, None))
}

/// Layout coordinates grow downward, PDF coordinates grow upward.
fn flip(y: f32) -> Mm {
    Mm(PAGE_HEIGHT - y)
}

fn paint_element(layer: &PdfLayerReference, fonts: &Fonts, element: &Element) {
    match element {
        Element::Text {
            x,
            y,
            size,
            font,
            text,
        } => {
            layer.set_fill_color(grey(0.0));
            layer.use_text(text.as_str(), *size, Mm(*x), flip(*y), fonts.get(*font));
        }
        Element::Cell {
            x,
            y,
            width,
            height,
            shaded,
        } => {
            let mode = if *shaded {
                layer.set_fill_color(grey(HEADER_SHADE));
                PaintMode::FillStroke
            } else {
                PaintMode::Stroke
            };
            let rect = Rect::new(Mm(*x), flip(y + height), Mm(x + width), flip(*y)).with_mode(mode);
            layer.add_rect(rect);
        }
    }
}

/// Produce PDF bytes for a layout.
///
/// # Errors
///
/// Returns an error if printpdf cannot load a built-in font or serialize the
/// document.
pub fn paint(layout: &Layout) -> Result<Vec<u8>> {
    let (doc, first_page, first_layer) = PdfDocument::new(
        layout.title.as_str(),
        Mm(PAGE_WIDTH),
        Mm(PAGE_HEIGHT),
        LAYER_NAME,
    );

    let fonts = Fonts {
        regular: doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| Error::render(format!("loading Helvetica: {e}")))?,
        bold: doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| Error::render(format!("loading Helvetica-Bold: {e}")))?,
    };

    for (index, page) in layout.pages.iter().enumerate() {
        let layer = if index == 0 {
            doc.get_page(first_page).get_layer(first_layer)
        } else {
            let (page, layer) = doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), LAYER_NAME);
            doc.get_page(page).get_layer(layer)
        };

        layer.set_outline_color(grey(GRID_SHADE));
        layer.set_outline_thickness(GRID_THICKNESS);
        for element in &page.elements {
            paint_element(&layer, &fonts, element);
        }
    }

    doc.save_to_bytes()
        .map_err(|e| Error::render(format!("serializing PDF: {e}")))
}
