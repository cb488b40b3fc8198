//! Markdown → ratatui `Text` renderer.
//!
//! Walks `pulldown_cmark` events and emits styled `Line`/`Span` values.
//! Supports the GitHub extensions a chat reply tends to use: tables,
//! strikethrough and task lists, plus fenced code blocks highlighted with
//! syntect. Nothing is ever executed; raw HTML is shown as literal text.

use std::sync::LazyLock;

use pulldown_cmark::{
    Alignment, CodeBlockKind, CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd,
};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use syntect::easy::HighlightLines;
use syntect::highlighting::ThemeSet;
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;
use unicode_width::UnicodeWidthStr;

static SYNTAX_SET: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);
static THEME_SET: LazyLock<ThemeSet> = LazyLock::new(ThemeSet::load_defaults);

const CODE_THEME: &str = "base16-ocean.dark";

/// Parse markdown content into styled `Text`, using `base_fg` for body text.
///
/// Returns owned text (`'static`) so callers aren't tied to the input lifetime.
pub fn render(content: &str, base_fg: Color) -> Text<'static> {
    let mut opts = Options::empty();
    opts.insert(Options::ENABLE_TABLES);
    opts.insert(Options::ENABLE_STRIKETHROUGH);
    opts.insert(Options::ENABLE_TASKLISTS);

    let mut r = Renderer::new(base_fg);
    for event in Parser::new_ext(content, opts) {
        r.handle(event);
    }
    r.text
}

// ── Table buffering ─────────────────────────────────────────────────────────

/// Tables can only be laid out once every cell width is known, so cells are
/// collected as plain strings and emitted when the table closes.
struct TableBuffer {
    alignments: Vec<Alignment>,
    rows: Vec<Vec<String>>,
    header_rows: usize,
    row: Vec<String>,
    cell: String,
}

impl TableBuffer {
    fn new(alignments: Vec<Alignment>) -> Self {
        Self {
            alignments,
            rows: vec![],
            header_rows: 0,
            row: vec![],
            cell: String::new(),
        }
    }

    fn end_cell(&mut self) {
        let cell = std::mem::take(&mut self.cell);
        self.row.push(cell.trim().to_string());
    }

    fn end_row(&mut self) {
        let row = std::mem::take(&mut self.row);
        self.rows.push(row);
    }

    fn column_widths(&self) -> Vec<usize> {
        let columns = self.rows.iter().map(Vec::len).max().unwrap_or(0);
        (0..columns)
            .map(|c| {
                self.rows
                    .iter()
                    .filter_map(|row| row.get(c))
                    .map(|cell| cell.width())
                    .max()
                    .unwrap_or(0)
            })
            .collect()
    }
}

fn pad_cell(cell: &str, width: usize, alignment: Alignment) -> String {
    let gap = width.saturating_sub(cell.width());
    match alignment {
        Alignment::Right => format!("{}{}", " ".repeat(gap), cell),
        Alignment::Center => {
            let left = gap / 2;
            format!("{}{}{}", " ".repeat(left), cell, " ".repeat(gap - left))
        }
        Alignment::Left | Alignment::None => format!("{}{}", cell, " ".repeat(gap)),
    }
}

// ── Renderer ────────────────────────────────────────────────────────────────

struct Renderer {
    text: Text<'static>,
    base_fg: Color,
    /// Inline style stack. Each entry is already patched onto its parent,
    /// so nested bold+italic composes.
    styles: Vec<Style>,
    /// Per-line prefix spans (blockquote bar, code block border).
    prefixes: Vec<Span<'static>>,
    /// List nesting: None = bullet, Some(n) = next ordinal.
    lists: Vec<Option<u64>>,
    /// Set right after a list marker so a loose item's paragraph stays on the marker line.
    item_open: bool,
    highlighter: Option<HighlightLines<'static>>,
    in_code_block: bool,
    link_url: Option<String>,
    table: Option<TableBuffer>,
    /// Whether the next block element should be preceded by a blank line.
    needs_gap: bool,
}

impl Renderer {
    fn new(base_fg: Color) -> Self {
        Self {
            text: Text::default(),
            base_fg,
            styles: vec![],
            prefixes: vec![],
            lists: vec![],
            item_open: false,
            highlighter: None,
            in_code_block: false,
            link_url: None,
            table: None,
            needs_gap: false,
        }
    }

    fn style(&self) -> Style {
        self.styles
            .last()
            .copied()
            .unwrap_or_else(|| Style::default().fg(self.base_fg))
    }

    fn push_style(&mut self, overlay: Style) {
        self.styles.push(self.style().patch(overlay));
    }

    fn pop_style(&mut self) {
        self.styles.pop();
    }

    fn push_line(&mut self, line: Line<'static>) {
        let mut out = line;
        for pfx in self.prefixes.iter().rev().cloned() {
            out.spans.insert(0, pfx);
        }
        self.text.lines.push(out);
    }

    fn push_span(&mut self, span: Span<'static>) {
        match self.text.lines.last_mut() {
            Some(line) => line.push_span(span),
            None => self.push_line(Line::from(vec![span])),
        }
    }

    fn gap_if_needed(&mut self) {
        if self.needs_gap {
            self.push_line(Line::default());
            self.needs_gap = false;
        }
    }

    fn handle(&mut self, event: Event<'_>) {
        // Inside a table everything inline flattens into the current cell.
        if let Some(table) = self.table.as_mut() {
            match event {
                Event::Text(t) | Event::Code(t) | Event::InlineHtml(t) | Event::Html(t) => {
                    table.cell.push_str(&t);
                    return;
                }
                Event::SoftBreak | Event::HardBreak => {
                    table.cell.push(' ');
                    return;
                }
                Event::Start(Tag::TableCell) | Event::Start(Tag::TableRow) => return,
                Event::Start(Tag::TableHead) => return,
                Event::End(TagEnd::TableCell) => {
                    table.end_cell();
                    return;
                }
                Event::End(TagEnd::TableHead) => {
                    table.end_row();
                    table.header_rows = table.rows.len();
                    return;
                }
                Event::End(TagEnd::TableRow) => {
                    table.end_row();
                    return;
                }
                Event::End(TagEnd::Table) => {
                    if let Some(done) = self.table.take() {
                        self.emit_table(done);
                    }
                    return;
                }
                // Emphasis, links etc. inside cells: keep only their text
                _ => return,
            }
        }

        match event {
            Event::Start(tag) => self.open(tag),
            Event::End(tag) => self.close(tag),
            Event::Text(t) => self.text(t),
            Event::Code(c) => self.inline_code(c),
            Event::SoftBreak => self.push_span(Span::raw(" ")),
            Event::HardBreak => self.push_line(Line::default()),
            Event::Rule => {
                self.gap_if_needed();
                self.push_line(Line::from(Span::styled(
                    "─".repeat(40),
                    Style::default().fg(Color::DarkGray),
                )));
                self.needs_gap = true;
            }
            Event::TaskListMarker(checked) => {
                let marker = if checked { "[x] " } else { "[ ] " };
                self.push_span(Span::raw(marker));
            }
            Event::Html(html) => {
                // Block HTML is shown verbatim, one line per source line
                let style = Style::default().fg(self.base_fg).add_modifier(Modifier::DIM);
                for line in html.lines() {
                    self.push_line(Line::from(Span::styled(line.to_owned(), style)));
                }
                self.needs_gap = true;
            }
            Event::InlineHtml(html) => {
                let style = self.style();
                self.push_span(Span::styled(html.to_string(), style));
            }
            _ => {}
        }
    }

    fn open(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => {
                if self.item_open {
                    self.item_open = false;
                } else {
                    self.gap_if_needed();
                    self.push_line(Line::default());
                }
            }
            Tag::Heading { level, .. } => {
                self.gap_if_needed();
                let hs = heading_style(self.base_fg, level);
                self.push_line(Line::from(Span::styled(
                    format!("{} ", "#".repeat(level as usize)),
                    hs,
                )));
                self.push_style(hs);
            }
            Tag::BlockQuote(_) => {
                self.gap_if_needed();
                self.prefixes
                    .push(Span::styled("│ ", Style::default().fg(Color::DarkGray)));
                self.push_style(Style::default().add_modifier(Modifier::DIM | Modifier::ITALIC));
            }
            Tag::CodeBlock(kind) => {
                if !self.text.lines.is_empty() {
                    self.push_line(Line::default());
                }
                self.needs_gap = false;
                let lang = match &kind {
                    CodeBlockKind::Fenced(info) => info.split_whitespace().next().unwrap_or(""),
                    CodeBlockKind::Indented => "",
                };

                let border = Style::default().fg(Color::DarkGray);
                let top = if lang.is_empty() {
                    Line::from(Span::styled("╭──", border))
                } else {
                    Line::from(vec![
                        Span::styled("╭── ", border),
                        Span::styled(lang.to_owned(), border.add_modifier(Modifier::BOLD)),
                        Span::styled(" ──", border),
                    ])
                };
                self.push_line(top);
                self.prefixes.push(Span::styled("│ ", border));

                if !lang.is_empty()
                    && let Some(syntax) = SYNTAX_SET.find_syntax_by_token(lang)
                    && let Some(theme) = THEME_SET.themes.get(CODE_THEME)
                {
                    self.highlighter = Some(HighlightLines::new(syntax, theme));
                }
                self.in_code_block = true;
            }
            Tag::List(start) => {
                if self.lists.is_empty() {
                    self.gap_if_needed();
                }
                self.lists.push(start);
            }
            Tag::Item => {
                self.push_line(Line::default());
                let indent = "  ".repeat(self.lists.len().saturating_sub(1));
                if let Some(ordinal) = self.lists.last_mut() {
                    let marker = match ordinal {
                        None => format!("{indent}- "),
                        Some(n) => {
                            let s = format!("{indent}{n}. ");
                            *n += 1;
                            s
                        }
                    };
                    self.push_span(Span::styled(marker, Style::default().fg(Color::DarkGray)));
                }
                self.item_open = true;
            }
            Tag::Table(alignments) => {
                self.gap_if_needed();
                self.table = Some(TableBuffer::new(alignments));
            }
            Tag::Emphasis => self.push_style(Style::default().add_modifier(Modifier::ITALIC)),
            Tag::Strong => self.push_style(Style::default().add_modifier(Modifier::BOLD)),
            Tag::Strikethrough => {
                self.push_style(Style::default().add_modifier(Modifier::CROSSED_OUT))
            }
            Tag::Link { dest_url, .. } => {
                self.link_url = Some(dest_url.to_string());
                self.push_style(link_style());
            }
            _ => {} // Images, footnotes, definitions: their text still flows through
        }
    }

    fn close(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => self.needs_gap = true,
            TagEnd::Heading(_) => {
                self.pop_style();
                self.needs_gap = true;
            }
            TagEnd::BlockQuote(_) => {
                self.prefixes.pop();
                self.pop_style();
                self.needs_gap = true;
            }
            TagEnd::CodeBlock => {
                self.highlighter = None;
                self.in_code_block = false;
                self.prefixes.pop();
                self.push_line(Line::from(Span::styled(
                    "╰──",
                    Style::default().fg(Color::DarkGray),
                )));
                self.needs_gap = true;
            }
            TagEnd::List(_) => {
                self.lists.pop();
                self.needs_gap = true;
            }
            TagEnd::Item => self.item_open = false,
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough => self.pop_style(),
            TagEnd::Link => {
                self.pop_style();
                if let Some(url) = self.link_url.take() {
                    self.push_span(Span::raw(" ("));
                    self.push_span(Span::styled(url, link_style()));
                    self.push_span(Span::raw(")"));
                }
            }
            _ => {}
        }
    }

    fn text(&mut self, cow: CowStr<'_>) {
        self.item_open = false;
        // ratatui renders \t as zero-width
        let text = cow.replace('\t', "    ");

        if let Some(mut hl) = self.highlighter.take() {
            for line in LinesWithEndings::from(text.as_str()) {
                match hl.highlight_line(line, &SYNTAX_SET) {
                    Ok(ranges) => {
                        let spans: Vec<Span<'static>> = ranges
                            .into_iter()
                            .filter_map(|(hl_style, frag)| {
                                let content = frag.trim_end_matches('\n');
                                if content.is_empty() {
                                    return None;
                                }
                                let fg = Color::Rgb(
                                    hl_style.foreground.r,
                                    hl_style.foreground.g,
                                    hl_style.foreground.b,
                                );
                                Some(Span::styled(content.to_owned(), Style::default().fg(fg)))
                            })
                            .collect();
                        self.push_line(Line::from(spans));
                    }
                    // Highlighting failed for this line: show it plain
                    Err(_) => self.push_line(Line::from(Span::styled(
                        line.trim_end_matches('\n').to_owned(),
                        Style::default().fg(Color::White),
                    ))),
                }
            }
            self.highlighter = Some(hl);
            return;
        }

        if self.in_code_block {
            let code_style = Style::default().fg(Color::White);
            for line in text.lines() {
                self.push_line(Line::from(Span::styled(line.to_owned(), code_style)));
            }
            return;
        }

        let style = self.style();
        self.push_span(Span::styled(text, style));
    }

    fn inline_code(&mut self, cow: CowStr<'_>) {
        self.item_open = false;
        let style = Style::default().fg(Color::White).bg(Color::DarkGray);
        self.push_span(Span::styled(cow.to_string(), style));
    }

    fn emit_table(&mut self, table: TableBuffer) {
        let widths = table.column_widths();
        let border = Style::default().fg(Color::DarkGray);
        let body = Style::default().fg(self.base_fg);
        let header = body.add_modifier(Modifier::BOLD);

        for (i, row) in table.rows.iter().enumerate() {
            let is_header = i < table.header_rows;
            let mut spans = Vec::with_capacity(widths.len() * 2);
            for (c, width) in widths.iter().enumerate() {
                if c > 0 {
                    spans.push(Span::styled(" │ ", border));
                }
                let cell = row.get(c).map(String::as_str).unwrap_or("");
                let alignment = table.alignments.get(c).cloned().unwrap_or(Alignment::None);
                spans.push(Span::styled(
                    pad_cell(cell, *width, alignment),
                    if is_header { header } else { body },
                ));
            }
            self.push_line(Line::from(spans));

            if is_header && i + 1 == table.header_rows {
                let rule = widths
                    .iter()
                    .map(|w| "─".repeat(*w))
                    .collect::<Vec<_>>()
                    .join("─┼─");
                self.push_line(Line::from(Span::styled(rule, border)));
            }
        }
        self.needs_gap = true;
    }
}

fn link_style() -> Style {
    Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::UNDERLINED)
}

fn heading_style(base_fg: Color, level: HeadingLevel) -> Style {
    let style = Style::default().fg(base_fg);
    match level {
        HeadingLevel::H1 => style.add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        HeadingLevel::H2 => style.add_modifier(Modifier::BOLD),
        _ => style.add_modifier(Modifier::BOLD | Modifier::ITALIC),
    }
}
