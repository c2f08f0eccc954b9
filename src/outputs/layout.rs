//! Page geometry and column flow for the edition.
//!
//! [`flow`] turns articles into positioned lines on A4 pages, without touching
//! the PDF writer. Each page has a masthead band at the top and two columns
//! below it. Blocks fill column 1 top to bottom, then column 2, then a new
//! page. Title and byline blocks move whole to the next column when they do
//! not fit; body paragraphs split at line boundaries.
//!
//! All coordinates are PDF points with the origin at the bottom-left corner.

use super::metrics::Font;
use crate::models::{Article, Edition};
use crate::utils::long_date;

pub const PAGE_WIDTH: f32 = 595.2756;
pub const PAGE_HEIGHT: f32 = 841.8898;
const MARGIN: f32 = 7.2;
const USABLE_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN;
const USABLE_HEIGHT: f32 = PAGE_HEIGHT - 2.0 * MARGIN;
/// Half the gap between the two columns.
const HALF_GUTTER: f32 = 6.0;
/// Height reserved for the masthead above the columns.
const MASTHEAD_BAND: f32 = 86.4;
const FRAME_PADDING: f32 = 6.0;
const COLUMN_WIDTH: f32 = USABLE_WIDTH / 2.0 - HALF_GUTTER;
const COLUMN_HEIGHT: f32 = USABLE_HEIGHT - MASTHEAD_BAND;
const INNER_WIDTH: f32 = COLUMN_WIDTH - 2.0 * FRAME_PADDING;
const INNER_HEIGHT: f32 = COLUMN_HEIGHT - 2.0 * FRAME_PADDING;

pub const PUBLICATION: &str = "The Watchman";
pub const TAGLINE: &str = "Do not go gentle into that good night";
pub const PLACEHOLDER: &str = "No new content :(";
const SEPARATOR: &str = "   |   ";

/// Paragraph typography.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Style {
    pub font: Font,
    pub size: f32,
    pub leading: f32,
    pub first_line_indent: f32,
    pub space_after: f32,
    pub justify: bool,
}

pub const TITLE: Style = Style {
    font: Font::TimesBold,
    size: 32.0,
    leading: 32.0,
    first_line_indent: 0.0,
    space_after: 10.0,
    justify: false,
};

pub const BYLINE: Style = Style {
    font: Font::TimesItalic,
    size: 20.0,
    leading: 20.0,
    first_line_indent: 5.0,
    space_after: 10.0,
    justify: false,
};

pub const BODY: Style = Style {
    font: Font::Helvetica,
    size: 20.0,
    leading: 20.0,
    first_line_indent: 30.0,
    space_after: 10.0,
    justify: true,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Title,
    Byline,
    Body,
    Placeholder,
}

impl BlockKind {
    pub fn style(self) -> &'static Style {
        match self {
            BlockKind::Title | BlockKind::Placeholder => &TITLE,
            BlockKind::Byline => &BYLINE,
            BlockKind::Body => &BODY,
        }
    }

    fn keep_together(self) -> bool {
        !matches!(self, BlockKind::Body)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub kind: BlockKind,
    pub text: String,
}

/// The flowed content: one placeholder, or title/byline/body per article.
pub fn blocks_for(articles: &[Article]) -> Vec<Block> {
    if articles.is_empty() {
        return vec![Block {
            kind: BlockKind::Placeholder,
            text: PLACEHOLDER.to_string(),
        }];
    }
    articles
        .iter()
        .flat_map(|a| {
            [
                Block { kind: BlockKind::Title, text: a.title.clone() },
                Block { kind: BlockKind::Byline, text: a.details.clone() },
                Block { kind: BlockKind::Body, text: a.body.clone() },
            ]
        })
        .collect()
}

/// A single line of text at a fixed position.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub font: Font,
    pub size: f32,
    pub x: f32,
    pub y: f32,
}

/// Header band drawn on every page.
#[derive(Debug, Clone, PartialEq)]
pub struct Masthead {
    pub name: TextRun,
    pub strapline: TextRun,
    /// Horizontal rule: `(x_start, x_end, y)`.
    pub rule: (f32, f32, f32),
}

impl Masthead {
    pub fn new(edition: &Edition) -> Self {
        let strapline = [
            long_date(edition.date),
            format!("Edition {}", edition.number),
            TAGLINE.to_string(),
        ]
        .join(SEPARATOR);
        let strap_width = Font::TimesBold.width(&strapline, 14.0);

        Self {
            name: TextRun {
                text: PUBLICATION.to_string(),
                font: Font::TimesBold,
                size: 87.0,
                x: MARGIN,
                y: USABLE_HEIGHT - 50.4,
            },
            strapline: TextRun {
                text: strapline,
                font: Font::TimesBold,
                size: 14.0,
                x: USABLE_WIDTH / 2.0 - strap_width / 2.0,
                y: USABLE_HEIGHT - 72.0,
            },
            rule: (MARGIN, USABLE_WIDTH, USABLE_HEIGHT - 79.2),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedWord {
    pub text: String,
    pub x: f32,
}

/// One line of a block, positioned on its page.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    /// Index into [`Layout::blocks`].
    pub block: usize,
    pub column: usize,
    pub font: Font,
    pub size: f32,
    pub baseline: f32,
    pub words: Vec<PlacedWord>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub lines: Vec<PlacedLine>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub masthead: Masthead,
    pub blocks: Vec<Block>,
    pub pages: Vec<Page>,
}

/// Left edge of a column's frame.
fn column_x(column: usize) -> f32 {
    if column == 0 {
        MARGIN
    } else {
        MARGIN + USABLE_WIDTH / 2.0 + HALF_GUTTER
    }
}

fn column_top() -> f32 {
    MARGIN + COLUMN_HEIGHT - FRAME_PADDING
}

#[derive(Debug, Clone, PartialEq)]
struct Line {
    words: Vec<String>,
    /// Sum of word widths, spaces excluded.
    natural: f32,
    indent: f32,
    last: bool,
}

/// Break an overlong word into pieces no wider than `width`.
fn split_word(word: &str, style: &Style, width: f32) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    for c in word.chars() {
        current.push(c);
        if current.chars().count() > 1 && style.font.width(&current, style.size) > width {
            current.pop();
            pieces.push(std::mem::take(&mut current));
            current.push(c);
        }
    }
    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}

/// Greedy line breaking at word boundaries.
fn wrap(text: &str, style: &Style, width: f32) -> Vec<Line> {
    let space = style.font.width(" ", style.size);
    let narrowest = width - style.first_line_indent;

    let mut lines: Vec<Line> = Vec::new();
    let mut words: Vec<String> = Vec::new();
    let mut natural = 0.0;

    for word in text.split_whitespace() {
        let pieces = if style.font.width(word, style.size) > narrowest {
            split_word(word, style, narrowest)
        } else {
            vec![word.to_string()]
        };
        for piece in pieces {
            let w = style.font.width(&piece, style.size);
            let indent = if lines.is_empty() { style.first_line_indent } else { 0.0 };
            let spaces = space * words.len() as f32;
            if !words.is_empty() && indent + natural + spaces + w > width {
                lines.push(Line {
                    words: std::mem::take(&mut words),
                    natural,
                    indent,
                    last: false,
                });
                natural = 0.0;
            }
            words.push(piece);
            natural += w;
        }
    }
    if !words.is_empty() {
        let indent = if lines.is_empty() { style.first_line_indent } else { 0.0 };
        lines.push(Line {
            words,
            natural,
            indent,
            last: true,
        });
    }
    lines
}

fn place(line: Line, block: usize, style: &Style, column: usize, used: f32) -> PlacedLine {
    let space = style.font.width(" ", style.size);
    let gaps = line.words.len().saturating_sub(1);
    let gap = if style.justify && !line.last && gaps > 0 {
        let slack = INNER_WIDTH - line.indent - line.natural;
        slack / gaps as f32
    } else {
        space
    };

    let mut x = column_x(column) + FRAME_PADDING + line.indent;
    let mut words = Vec::with_capacity(line.words.len());
    for word in line.words {
        let w = style.font.width(&word, style.size);
        words.push(PlacedWord { text: word, x });
        x += w + gap;
    }

    PlacedLine {
        block,
        column,
        font: style.font,
        size: style.size,
        baseline: column_top() - used - style.size,
        words,
    }
}

/// Cursor over columns and pages.
struct Cursor {
    pages: Vec<Page>,
    column: usize,
    used: f32,
}

impl Cursor {
    fn advance(&mut self) {
        self.used = 0.0;
        self.column += 1;
        if self.column == 2 {
            self.column = 0;
            self.pages.push(Page::default());
        }
    }

    fn fits(&self, height: f32) -> bool {
        self.used + height <= INNER_HEIGHT + 0.01
    }
}

/// Lay out the edition's blocks across as many pages as needed.
///
/// Blocks fill the left column, then the right column, then a new page.
/// Titles, bylines and the placeholder move whole to the next column when
/// they do not fit in the current one. Body text splits by line.
///
/// # Arguments
///
/// * `articles` - Articles in run order; empty gives the placeholder block
/// * `edition` - Number and date printed on every masthead
///
/// # Returns
///
/// A [`Layout`] with at least one page. Placement only; nothing is drawn.
///
/// # Examples
///
/// ```ignore
/// let layout = flow(&[], &edition);
/// assert_eq!(layout.pages.len(), 1);
/// ```
pub fn flow(articles: &[Article], edition: &Edition) -> Layout {
    let blocks = blocks_for(articles);
    let mut cursor = Cursor {
        pages: vec![Page::default()],
        column: 0,
        used: 0.0,
    };

    for (index, block) in blocks.iter().enumerate() {
        let style = block.kind.style();
        let lines = wrap(&block.text, style, INNER_WIDTH);
        let height = lines.len() as f32 * style.leading;

        if block.kind.keep_together()
            && cursor.used > 0.0
            && !cursor.fits(height)
            && height <= INNER_HEIGHT
        {
            cursor.advance();
        }

        for line in lines {
            if cursor.used > 0.0 && !cursor.fits(style.leading) {
                cursor.advance();
            }
            let placed = place(line, index, style, cursor.column, cursor.used);
            if let Some(page) = cursor.pages.last_mut() {
                page.lines.push(placed);
            }
            cursor.used += style.leading;
        }
        // Space after a block is simply lost at the foot of a column.
        cursor.used += style.space_after;
    }

    Layout {
        masthead: Masthead::new(edition),
        blocks,
        pages: cursor.pages,
    }
}
