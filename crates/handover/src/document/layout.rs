//! Fixed page layout of the printed handover form.
//!
//! [`compose`] places every piece of text and every table cell of the form on
//! A4 pages. All positions are millimetres measured from the top-left corner
//! of the page; text positions are baselines. The layout is plain data, so
//! the same record always yields the same layout, and painting it is a
//! separate step.

use crate::record::{Field, HandoverRecord, Section};

/// A4 page width in millimetres.
pub const PAGE_WIDTH: f32 = 210.0;
/// A4 page height in millimetres.
pub const PAGE_HEIGHT: f32 = 297.0;

/// Left edge of all content.
const MARGIN_LEFT: f32 = 20.0;
/// Where content resumes on an overflow page.
const MARGIN_TOP: f32 = 20.0;
/// Nothing is placed below this line.
const MARGIN_BOTTOM: f32 = 282.0;

const TITLE: &str = "IT Asset Handover Form";
const TITLE_Y: f32 = 20.0;
const RECORD_ID_Y: f32 = 28.0;
const DATE_Y: f32 = 34.0;

const EMPLOYEE_HEADING: &str = "Employee Information";
const EMPLOYEE_HEADING_Y: f32 = 44.0;
const EMPLOYEE_TABLE_Y: f32 = 48.0;

const ASSET_HEADING: &str = "Asset Information";
const ASSET_HEADING_Y: f32 = 130.0;
const ASSET_TABLE_Y: f32 = 134.0;

const ACKNOWLEDGMENT_HEADING: &str = "Employee Acknowledgment";
const ACKNOWLEDGMENT_HEADING_Y: f32 = 220.0;
const ACKNOWLEDGMENT_Y: f32 = 230.0;
const ACKNOWLEDGMENT: &[&str] = &[
    "I acknowledge receiving the above IT asset(s) in good working condition.",
    "I agree to safeguard the equipment, use it only for work purposes, and return it upon \
     request or when leaving the organization.",
    "",
    "In case of loss, misuse, or damage caused by negligence, I accept full responsibility.",
];

const EMPLOYEE_SIGNATURE: &str = "Employee Signature: ____________________________";
const EMPLOYEE_SIGNATURE_Y: f32 = 270.0;
const IT_SIGNATURE: &str = "IT Department: ________________________________";
const IT_SIGNATURE_Y: f32 = 280.0;

/// Label column width.
const KEY_COLUMN_WIDTH: f32 = 60.0;
/// Value column width.
const VALUE_COLUMN_WIDTH: f32 = 100.0;
/// Minimum table row height.
const ROW_HEIGHT: f32 = 8.0;
/// Horizontal padding inside a cell.
const CELL_PADDING: f32 = 2.0;
/// Distance from a row's top edge to the first baseline.
const CELL_BASELINE: f32 = 5.5;
/// Leading for wrapped lines inside a cell and for paragraphs.
const LINE_HEIGHT: f32 = 5.0;
/// Space taken below a title, heading or single labelled line.
const LABEL_ADVANCE: f32 = 4.0;
/// Space between a section's last row and the next heading.
const SECTION_GAP: f32 = 5.0;

const TITLE_SIZE: f32 = 16.0;
const HEADING_SIZE: f32 = 12.0;
const BODY_SIZE: f32 = 10.0;

/// Grey level of the shaded header row (1.0 is white).
pub const HEADER_SHADE: f32 = 0.83;
/// Grey level of grid lines.
pub const GRID_SHADE: f32 = 0.5;
/// Grid line thickness in points.
pub const GRID_THICKNESS: f32 = 0.5;

/// Millimetres per point.
const MM_PER_PT: f32 = 25.4 / 72.0;

/// The two built-in typefaces the form uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    /// Helvetica.
    Regular,
    /// Helvetica-Bold.
    Bold,
}

/// One drawable item.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    /// A single line of text.
    Text {
        /// Left edge.
        x: f32,
        /// Baseline.
        y: f32,
        /// Font size in points.
        size: f32,
        /// Typeface.
        font: Font,
        /// The text itself.
        text: String,
    },
    /// A table cell box.
    Cell {
        /// Left edge.
        x: f32,
        /// Top edge.
        y: f32,
        /// Width.
        width: f32,
        /// Height.
        height: f32,
        /// Whether the cell is shaded as a header.
        shaded: bool,
    },
}

/// One page worth of elements.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    /// Elements in paint order.
    pub elements: Vec<Element>,
}

/// A complete positioned document.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    /// Document title stored in the PDF metadata.
    pub title: String,
    /// Pages in order; never empty.
    pub pages: Vec<Page>,
}

impl Layout {
    /// Every text line in paint order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.pages
            .iter()
            .flat_map(|page| page.elements.iter())
            .filter_map(|element| match element {
                Element::Text { text, .. } => Some(text.as_str()),
                Element::Cell { .. } => None,
            })
    }

    /// Whether any text line contains `needle`.
    #[must_use]
    pub fn contains_text(&self, needle: &str) -> bool {
        self.texts().any(|text| text.contains(needle))
    }
}

/// Helvetica advance width in thousandths of the font size.
///
/// Characters outside printable ASCII count as a full em, which is at least
/// as wide as any glyph the built-in fonts can draw.
fn glyph_width(c: char) -> u16 {
    match c {
        'i' | 'j' | 'l' => 222,
        '\'' => 191,
        '|' => 260,
        ' ' | '!' | ',' | '.' | '/' | ':' | ';' | '[' | '\\' | ']' | 'I' | 'f' | 't' => 278,
        '(' | ')' | '-' | '`' | 'r' => 333,
        '{' | '}' => 334,
        '"' => 355,
        '*' => 389,
        '^' => 469,
        'J' | 'c' | 'k' | 's' | 'v' | 'x' | 'y' | 'z' => 500,
        '#' | '$' | '0'..='9' | '?' | '_' | 'L' | 'a' | 'b' | 'd' | 'e' | 'g' | 'h' | 'n'
        | 'o' | 'p' | 'q' | 'u' => 556,
        '+' | '<' | '=' | '>' | '~' => 584,
        'F' | 'T' | 'Z' => 611,
        '&' | 'A' | 'B' | 'E' | 'K' | 'P' | 'S' | 'V' | 'X' | 'Y' => 667,
        'C' | 'D' | 'H' | 'N' | 'R' | 'U' | 'w' => 722,
        'G' | 'O' | 'Q' => 778,
        'M' | 'm' => 833,
        '%' => 889,
        'W' => 944,
        '@' => 1015,
        _ => 1000,
    }
}

fn glyph_mm(c: char, size: f32) -> f32 {
    f32::from(glyph_width(c)) / 1000.0 * size * MM_PER_PT
}

/// Width in millimetres of `text` set in Helvetica at `size` points.
#[must_use]
pub fn text_width(text: &str, size: f32) -> f32 {
    text.chars().map(|c| glyph_mm(c, size)).sum()
}

/// Byte offset of the longest prefix of `word` that fits in `width`.
/// Always at least one character.
fn split_point(word: &str, width: f32, size: f32) -> usize {
    let mut used = 0.0;
    for (index, c) in word.char_indices() {
        used += glyph_mm(c, size);
        if used > width {
            return if index == 0 { c.len_utf8() } else { index };
        }
    }
    word.len()
}

/// Word-wrap `text` so each line is at most `width` millimetres wide at
/// `size` points.
///
/// Explicit line breaks are kept, words longer than a line are split, and
/// empty input yields a single empty line.
#[must_use]
pub fn wrap(text: &str, width: f32, size: f32) -> Vec<String> {
    let space = glyph_mm(' ', size);
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut current = String::new();
        let mut current_width = 0.0;

        for word in paragraph.split_whitespace() {
            let mut word = word;

            while !word.is_empty() {
                let word_width = text_width(word, size);
                let gap = if current.is_empty() { 0.0 } else { space };
                if current_width + gap + word_width <= width {
                    if !current.is_empty() {
                        current.push(' ');
                    }
                    current.push_str(word);
                    current_width += gap + word_width;
                    word = "";
                } else if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                    current_width = 0.0;
                } else {
                    let (head, rest) = word.split_at(split_point(word, width, size));
                    lines.push(head.to_string());
                    word = rest;
                }
            }
        }

        lines.push(current);
    }

    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Places elements top to bottom and starts new pages as needed.
struct Composer {
    pages: Vec<Page>,
    cursor: f32,
}

impl Composer {
    fn new() -> Self {
        Self {
            pages: vec![Page::default()],
            cursor: MARGIN_TOP,
        }
    }

    fn on_first_page(&self) -> bool {
        self.pages.len() == 1
    }

    fn new_page(&mut self) {
        self.pages.push(Page::default());
        self.cursor = MARGIN_TOP;
    }

    /// Move to a fixed first-page anchor, unless content already passed it.
    fn anchor(&mut self, y: f32) {
        if self.on_first_page() {
            self.cursor = self.cursor.max(y);
        }
    }

    fn push(&mut self, element: Element) {
        if let Some(page) = self.pages.last_mut() {
            page.elements.push(element);
        }
    }

    /// Text whose baseline sits at the cursor, then move down by `advance`.
    ///
    /// Empty lines only take up space.
    fn text(&mut self, font: Font, size: f32, text: impl Into<String>, advance: f32) {
        if self.cursor > MARGIN_BOTTOM {
            self.new_page();
        }
        let text = text.into();
        if !text.is_empty() {
            self.push(Element::Text {
                x: MARGIN_LEFT,
                y: self.cursor,
                size,
                font,
                text,
            });
        }
        self.cursor += advance;
    }

    /// Text at a fixed first-page line.
    fn line_at(&mut self, y: f32, font: Font, size: f32, text: impl Into<String>) {
        self.anchor(y);
        self.text(font, size, text, LABEL_ADVANCE);
    }

    /// How many wrapped cell lines fit between the cursor and the bottom margin.
    fn lines_fitting(&self) -> usize {
        let available = MARGIN_BOTTOM - self.cursor;
        if available < ROW_HEIGHT {
            return 0;
        }
        // Truncation is intended: a partial line does not fit
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let extra = ((available - ROW_HEIGHT) / LINE_HEIGHT).floor() as usize;
        extra + 1
    }

    /// One row segment holding `lines` wrapped lines per column.
    fn row(&mut self, lines: usize, columns: [(f32, f32, Vec<String>); 2], shaded: bool) {
        #[allow(clippy::cast_precision_loss)]
        let height = ROW_HEIGHT + LINE_HEIGHT * lines.saturating_sub(1) as f32;
        let top = self.cursor;

        for (x, width, column) in columns {
            self.push(Element::Cell {
                x,
                y: top,
                width,
                height,
                shaded,
            });
            for (n, line) in column.into_iter().enumerate() {
                if line.is_empty() {
                    continue;
                }
                #[allow(clippy::cast_precision_loss)]
                let baseline = top + CELL_BASELINE + LINE_HEIGHT * n as f32;
                self.push(Element::Text {
                    x: x + CELL_PADDING,
                    y: baseline,
                    size: BODY_SIZE,
                    font: Font::Regular,
                    text: line,
                });
            }
        }

        self.cursor = top + height;
    }

    /// A two-column key/value table with the top edge at the cursor.
    ///
    /// The first row is shaded. A row too tall for the rest of the page
    /// continues on the next one.
    fn table(&mut self, rows: &[(&str, &str)]) {
        let key_width = KEY_COLUMN_WIDTH - 2.0 * CELL_PADDING;
        let value_width = VALUE_COLUMN_WIDTH - 2.0 * CELL_PADDING;

        for (index, (key, value)) in rows.iter().enumerate() {
            let mut key_lines = wrap(key, key_width, BODY_SIZE);
            let mut value_lines = wrap(value, value_width, BODY_SIZE);
            let shaded = index == 0;

            loop {
                let fit = self.lines_fitting();
                if fit == 0 {
                    self.new_page();
                    continue;
                }

                let lines = key_lines.len().max(value_lines.len()).min(fit);
                let key_part = key_lines.drain(..lines.min(key_lines.len())).collect();
                let value_part = value_lines.drain(..lines.min(value_lines.len())).collect();
                self.row(
                    lines,
                    [
                        (MARGIN_LEFT, KEY_COLUMN_WIDTH, key_part),
                        (MARGIN_LEFT + KEY_COLUMN_WIDTH, VALUE_COLUMN_WIDTH, value_part),
                    ],
                    shaded,
                );

                if key_lines.is_empty() && value_lines.is_empty() {
                    break;
                }
                self.new_page();
            }
        }
    }

    fn finish(self, title: String) -> Layout {
        Layout {
            title,
            pages: self.pages,
        }
    }
}

fn section_rows(record: &HandoverRecord, section: Section) -> Vec<(&'static str, &str)> {
    Field::in_section(section)
        .map(|field| (field.label(), record.text(field)))
        .collect()
}

/// Lay out the printed form for one record.
#[must_use]
pub fn compose(record: &HandoverRecord) -> Layout {
    let mut page = Composer::new();

    page.line_at(TITLE_Y, Font::Bold, TITLE_SIZE, TITLE);
    page.line_at(
        RECORD_ID_Y,
        Font::Regular,
        BODY_SIZE,
        format!("Record ID: {}", record.id),
    );
    page.line_at(
        DATE_Y,
        Font::Regular,
        BODY_SIZE,
        format!("Date: {}", record.text(Field::Date)),
    );

    page.line_at(EMPLOYEE_HEADING_Y, Font::Bold, HEADING_SIZE, EMPLOYEE_HEADING);
    page.anchor(EMPLOYEE_TABLE_Y);
    page.table(&section_rows(record, Section::Employee));

    page.cursor += SECTION_GAP;
    page.line_at(ASSET_HEADING_Y, Font::Bold, HEADING_SIZE, ASSET_HEADING);
    page.anchor(ASSET_TABLE_Y);
    page.table(&section_rows(record, Section::Asset));

    page.cursor += SECTION_GAP;
    page.line_at(
        ACKNOWLEDGMENT_HEADING_Y,
        Font::Bold,
        HEADING_SIZE,
        ACKNOWLEDGMENT_HEADING,
    );
    page.anchor(ACKNOWLEDGMENT_Y);
    let paragraph_width = PAGE_WIDTH - 2.0 * MARGIN_LEFT;
    for paragraph in ACKNOWLEDGMENT {
        for line in wrap(paragraph, paragraph_width, BODY_SIZE) {
            page.text(Font::Regular, BODY_SIZE, line, LINE_HEIGHT);
        }
    }

    page.cursor += SECTION_GAP;
    page.line_at(EMPLOYEE_SIGNATURE_Y, Font::Regular, BODY_SIZE, EMPLOYEE_SIGNATURE);
    page.cursor += SECTION_GAP;
    page.line_at(IT_SIGNATURE_Y, Font::Regular, BODY_SIZE, IT_SIGNATURE);

    page.finish(format!("IT Asset Handover {}", record.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::HandoverFields;

    fn record(fields: HandoverFields) -> HandoverRecord {
        HandoverRecord {
            id: 1,
            created_at: None,
            fields,
        }
    }

    fn text_at(layout: &Layout, needle: &str) -> Option<(usize, f32, f32)> {
        layout.pages.iter().enumerate().find_map(|(n, page)| {
            page.elements.iter().find_map(|element| match element {
                Element::Text { x, y, text, .. } if text == needle => Some((n, *x, *y)),
                _ => None,
            })
        })
    }

    fn cells(page: &Page) -> Vec<(f32, f32, f32, f32, bool)> {
        page.elements
            .iter()
            .filter_map(|element| match element {
                Element::Cell {
                    x,
                    y,
                    width,
                    height,
                    shaded,
                } => Some((*x, *y, *width, *height, *shaded)),
                Element::Text { .. } => None,
            })
            .collect()
    }

    fn text_extents(layout: &Layout) -> Vec<(f32, f32, &str)> {
        layout
            .pages
            .iter()
            .flat_map(|page| page.elements.iter())
            .filter_map(|element| match element {
                Element::Text { x, size, text, .. } => {
                    Some((*x, text_width(text, *size), text.as_str()))
                }
                Element::Cell { .. } => None,
            })
            .collect()
    }

    #[test]
    fn test_text_width() {
        assert!(text_width("", BODY_SIZE).abs() < f32::EPSILON);
        assert!(text_width("W", BODY_SIZE) > text_width("i", BODY_SIZE));
        assert!((text_width("0123456789", 10.0) - 10.0 * 5.56 * MM_PER_PT).abs() < 1e-3);
    }

    #[test]
    fn test_wrap_short_text() {
        assert_eq!(wrap("Laptop", 60.0, BODY_SIZE), vec!["Laptop"]);
    }

    #[test]
    fn test_wrap_empty_text() {
        assert_eq!(wrap("", 60.0, BODY_SIZE), vec![String::new()]);
    }

    #[test]
    fn test_wrap_breaks_on_words() {
        assert_eq!(
            wrap("charger mouse keyboard bag", 30.0, 10.0),
            vec!["charger mouse", "keyboard bag"]
        );
    }

    #[test]
    fn test_wrap_splits_long_words() {
        assert_eq!(
            wrap(&"W".repeat(10), 10.0, 10.0),
            vec!["WWW", "WWW", "WWW", "W"]
        );
    }

    #[test]
    fn test_wrap_keeps_line_breaks() {
        assert_eq!(wrap("one\ntwo", 60.0, BODY_SIZE), vec!["one", "two"]);
    }

    #[test]
    fn test_wrap_splits_on_char_boundaries() {
        assert_eq!(wrap("علي حسن", 12.0, 10.0), vec!["علي", "حسن"]);
    }

    #[test]
    fn test_wrap_wide_capitals_stay_inside_column() {
        let width = VALUE_COLUMN_WIDTH - 2.0 * CELL_PADDING;
        let lines = wrap(&"WIDE MEMORY MODULE ".repeat(10), width, BODY_SIZE);

        assert!(lines.len() > 1);
        for line in &lines {
            assert!(text_width(line, BODY_SIZE) <= width, "{line} overflows");
        }
    }

    #[test]
    fn test_wide_values_stay_inside_table() {
        let right_edge = MARGIN_LEFT + KEY_COLUMN_WIDTH + VALUE_COLUMN_WIDTH;
        let layout = compose(&record(
            HandoverFields::default()
                .with(Field::Accessories, "WWWW MMMM ".repeat(12))
                .with(Field::Serial, "W".repeat(80)),
        ));

        for (x, width, text) in text_extents(&layout) {
            if x > MARGIN_LEFT {
                assert!(x + width <= right_edge - CELL_PADDING, "{text} overflows");
            }
        }
    }

    #[test]
    fn test_fixed_positions_for_ordinary_record() {
        let layout = compose(&record(
            HandoverFields::default()
                .with(Field::Date, "2024-01-01")
                .with(Field::EmployeeName, "Ali Hassan"),
        ));

        assert_eq!(layout.pages.len(), 1);
        assert_eq!(text_at(&layout, TITLE), Some((0, 20.0, 20.0)));
        assert_eq!(text_at(&layout, "Record ID: 1"), Some((0, 20.0, 28.0)));
        assert_eq!(text_at(&layout, "Date: 2024-01-01"), Some((0, 20.0, 34.0)));
        assert_eq!(text_at(&layout, EMPLOYEE_HEADING), Some((0, 20.0, 44.0)));
        assert_eq!(text_at(&layout, ASSET_HEADING), Some((0, 20.0, 130.0)));
        assert_eq!(
            text_at(&layout, ACKNOWLEDGMENT_HEADING),
            Some((0, 20.0, 220.0))
        );
        assert_eq!(text_at(&layout, EMPLOYEE_SIGNATURE), Some((0, 20.0, 270.0)));
        assert_eq!(text_at(&layout, IT_SIGNATURE), Some((0, 20.0, 280.0)));
        assert_eq!(text_at(&layout, "Ali Hassan"), Some((0, 82.0, 53.5)));
    }

    #[test]
    fn test_tables_have_expected_rows() {
        let layout = compose(&record(HandoverFields::default()));
        let cells = cells(&layout.pages[0]);

        // Two cells per row: 7 employee rows and 6 asset rows
        assert_eq!(cells.len(), 26);
        assert_eq!(cells[0], (20.0, 48.0, 60.0, 8.0, true));
        assert_eq!(cells[1], (80.0, 48.0, 100.0, 8.0, true));
        assert_eq!(cells[2], (20.0, 56.0, 60.0, 8.0, false));
        assert_eq!(cells[14], (20.0, 134.0, 60.0, 8.0, true));
        assert_eq!(cells.iter().filter(|c| c.4).count(), 4);
    }

    #[test]
    fn test_labels_present_and_missing_values_blank() {
        let layout = compose(&record(HandoverFields::default()));

        for field in Field::ALL {
            if field != Field::Date {
                assert!(layout.contains_text(field.label()), "{field} label missing");
            }
        }
        assert!(layout.contains_text("Date: "));
        assert!(!layout.texts().any(str::is_empty));
    }

    #[test]
    fn test_acknowledgment_is_wrapped_to_page_width() {
        let layout = compose(&record(HandoverFields::default()));
        let limit = PAGE_WIDTH - 2.0 * MARGIN_LEFT;

        assert!(layout.contains_text("I acknowledge receiving"));
        assert!(layout.contains_text("I accept full responsibility."));
        for (_, width, text) in text_extents(&layout) {
            assert!(width <= limit, "{text} overflows");
        }
    }

    #[test]
    fn test_long_values_grow_rows_and_push_sections() {
        let notes = "Screen has a small scratch near the hinge. ".repeat(30);
        let layout = compose(&record(HandoverFields::default().with(Field::Notes, notes)));

        let (_, _, asset_y) = text_at(&layout, ASSET_HEADING).unwrap();
        assert!(asset_y > ASSET_HEADING_Y || layout.pages.len() > 1);
        assert!(layout.contains_text(IT_SIGNATURE));
    }

    #[test]
    fn test_overflow_starts_new_page() {
        let long = "word ".repeat(600);
        let mut fields = HandoverFields::default();
        for field in [Field::Notes, Field::Accessories] {
            fields.set(field, Some(long.clone()));
        }
        let layout = compose(&record(fields));

        assert!(layout.pages.len() > 1);
        for page in &layout.pages {
            for element in &page.elements {
                if let Element::Text { y, .. } = element {
                    assert!(*y <= MARGIN_BOTTOM, "text below bottom margin at {y}");
                }
            }
        }
        let (page, _, _) = text_at(&layout, IT_SIGNATURE).unwrap();
        assert_eq!(page, layout.pages.len() - 1);
    }

    #[test]
    fn test_compose_is_deterministic() {
        let fields = HandoverFields::default()
            .with(Field::EmployeeName, "Ali Hassan")
            .with(Field::Accessories, "Charger, mouse");
        assert_eq!(compose(&record(fields.clone())), compose(&record(fields)));
    }
}
