use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};
use thiserror::Error;
use unicode_width::UnicodeWidthStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunKind {
    Math,
    Text,
    /// Source that could not be parsed, shown verbatim.
    Invalid,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Run {
    pub kind: RunKind,
    pub content: String,
}

impl Run {
    fn new(kind: RunKind, content: impl Into<String>) -> Self {
        Self {
            kind,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("unknown command \\{0}")]
    UnknownCommand(String),
    #[error("expected '{{' after \\{0}")]
    MissingGroup(String),
    #[error("unterminated group")]
    Unterminated,
    #[error("unexpected '}}' at offset {0}")]
    UnexpectedClose(usize),
    #[error("trailing backslash")]
    TrailingBackslash,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Return parse failures instead of falling back to the raw source.
    pub throw_on_error: bool,
}

/// Render `source` into runs.
///
/// Understands plain math, `\text{...}` for literal text, the `\times`, `\div`
/// and `\cdot` commands, `{}` grouping and the escapes `\{`, `\}`, `\\`.
///
/// With `throw_on_error` unset this never fails; malformed markup comes back
/// as a single [`RunKind::Invalid`] run holding the source.
pub fn render_markup(source: &str, options: &RenderOptions) -> Result<Vec<Run>, RenderError> {
    match parse(source) {
        Ok(runs) => Ok(runs),
        Err(err) if options.throw_on_error => Err(err),
        Err(_) => Ok(vec![Run::new(RunKind::Invalid, source)]),
    }
}

fn math_glyph(c: char) -> char {
    match c {
        '*' => '×',
        '/' => '÷',
        '-' => '−',
        c => c,
    }
}

fn command_glyph(name: &str) -> Option<char> {
    match name {
        "times" => Some('×'),
        "div" => Some('÷'),
        "cdot" => Some('·'),
        _ => None,
    }
}

fn parse(source: &str) -> Result<Vec<Run>, RenderError> {
    let mut runs: Vec<Run> = Vec::new();
    let mut math = String::new();
    let mut depth = 0usize;
    let mut chars = source.char_indices().peekable();

    while let Some((offset, c)) = chars.next() {
        match c {
            '\\' => {
                let Some(&(_, next)) = chars.peek() else {
                    return Err(RenderError::TrailingBackslash);
                };
                if matches!(next, '{' | '}' | '\\') {
                    chars.next();
                    math.push(next);
                    continue;
                }

                let mut name = String::new();
                while let Some(&(_, n)) = chars.peek() {
                    if !n.is_ascii_alphabetic() {
                        break;
                    }
                    name.push(n);
                    chars.next();
                }

                if name == "text" {
                    if !matches!(chars.next(), Some((_, '{'))) {
                        return Err(RenderError::MissingGroup(name));
                    }
                    let text = read_group(&mut chars)?;
                    if !math.is_empty() {
                        runs.push(Run::new(RunKind::Math, std::mem::take(&mut math)));
                    }
                    runs.push(Run::new(RunKind::Text, text));
                } else if let Some(glyph) = command_glyph(&name) {
                    math.push(glyph);
                } else {
                    return Err(RenderError::UnknownCommand(name));
                }
            }
            '{' => depth += 1,
            '}' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or(RenderError::UnexpectedClose(offset))?;
            }
            c if c.is_whitespace() => {}
            c => math.push(math_glyph(c)),
        }
    }

    if depth > 0 {
        return Err(RenderError::Unterminated);
    }
    if !math.is_empty() {
        runs.push(Run::new(RunKind::Math, math));
    }
    Ok(runs)
}

/// Read the body of a `{...}` group whose opening brace was consumed.
fn read_group(
    chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>,
) -> Result<String, RenderError> {
    let mut text = String::new();
    let mut depth = 0usize;
    while let Some((_, c)) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some((_, escaped)) => text.push(escaped),
                None => return Err(RenderError::TrailingBackslash),
            },
            '{' => depth += 1,
            '}' if depth == 0 => return Ok(text),
            '}' => depth -= 1,
            c => text.push(c),
        }
    }
    Err(RenderError::Unterminated)
}

/// A display region that typesets one markup string.
///
/// The field owns both its source and the rendered line; it re-renders only
/// when [`MathField::set_source`] receives something new.
#[derive(Debug, Clone)]
pub struct MathField {
    source: String,
    options: RenderOptions,
    style: Style,
    line: Line<'static>,
}

impl MathField {
    pub fn new(options: RenderOptions) -> Self {
        Self {
            source: String::new(),
            options,
            style: Style::default(),
            line: Line::default(),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn line(&self) -> &Line<'static> {
        &self.line
    }

    /// Base style patched under every run, e.g. red for errors.
    pub fn set_style(&mut self, style: Style) {
        if self.style != style {
            self.style = style;
            // a parse failure was already reported by set_source
            let _ = self.rerender();
        }
    }

    /// Replace the source. Returns whether anything was re-rendered.
    ///
    /// With `throw_on_error` set, a parse failure is returned after the field
    /// has been updated to show the raw source.
    pub fn set_source(&mut self, source: &str) -> Result<bool, RenderError> {
        if self.source == source {
            return Ok(false);
        }
        self.source = source.to_string();
        self.rerender().map(|()| true)
    }

    fn rerender(&mut self) -> Result<(), RenderError> {
        let (runs, result) = match render_markup(&self.source, &self.options) {
            Ok(runs) => (runs, Ok(())),
            Err(err) => (vec![Run::new(RunKind::Invalid, self.source.clone())], Err(err)),
        };
        self.line = Line::from(
            runs.into_iter()
                .map(|run| Span::styled(run.content, self.style.patch(run_style(run.kind))))
                .collect::<Vec<_>>(),
        );
        result
    }
}

fn run_style(kind: RunKind) -> Style {
    match kind {
        RunKind::Math => Style::default().add_modifier(Modifier::BOLD),
        RunKind::Text => Style::default().add_modifier(Modifier::ITALIC),
        RunKind::Invalid => Style::default().fg(Color::Red),
    }
}

impl Widget for &MathField {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let width = self.line.to_string().width();
        let paragraph = Paragraph::new(self.line.clone());
        // keep the newest input visible once the line overflows
        if width > area.width as usize {
            let hidden = u16::try_from(width - area.width as usize).unwrap_or(u16::MAX);
            paragraph.scroll((0, hidden)).render(area, buf);
        } else {
            paragraph.alignment(Alignment::Right).render(area, buf);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(source: &str) -> Vec<Run> {
        render_markup(source, &RenderOptions::default()).unwrap()
    }

    fn strict(source: &str) -> Result<Vec<Run>, RenderError> {
        render_markup(
            source,
            &RenderOptions {
                throw_on_error: true,
            },
        )
    }

    #[test]
    fn plain_math_is_one_run() {
        assert_eq!(render("7.5"), vec![Run::new(RunKind::Math, "7.5")]);
    }

    #[test]
    fn math_operators_get_typeset_glyphs() {
        assert_eq!(render("2*3/4-1"), vec![Run::new(RunKind::Math, "2×3÷4−1")]);
        assert_eq!(render("2\\times 3\\div 4"), vec![Run::new(RunKind::Math, "2×3÷4")]);
    }

    #[test]
    fn text_groups_are_literal() {
        assert_eq!(
            render("=\\text{Infinity}"),
            vec![
                Run::new(RunKind::Math, "="),
                Run::new(RunKind::Text, "Infinity"),
            ]
        );
        // no glyph substitution inside text
        assert_eq!(
            render("\\text{Error: 1-2}"),
            vec![Run::new(RunKind::Text, "Error: 1-2")]
        );
    }

    #[test]
    fn escapes_round_trip_through_markup() {
        let source = crate::markup::text("a{b}\\c");
        assert_eq!(render(&source), vec![Run::new(RunKind::Text, "a{b}\\c")]);
        assert_eq!(render("\\{1\\}"), vec![Run::new(RunKind::Math, "{1}")]);
    }

    #[test]
    fn grouping_braces_are_invisible() {
        assert_eq!(render("{1+2}"), vec![Run::new(RunKind::Math, "1+2")]);
    }

    #[test]
    fn malformed_markup_degrades_without_error() {
        for source in ["\\frac{1}{2}", "\\text{open", "1}", "{1", "2\\"] {
            assert_eq!(render(source), vec![Run::new(RunKind::Invalid, source)]);
        }
    }

    #[test]
    fn malformed_markup_errors_when_asked() {
        assert_eq!(
            strict("\\frac{1}{2}"),
            Err(RenderError::UnknownCommand("frac".to_string()))
        );
        assert_eq!(strict("\\text{open"), Err(RenderError::Unterminated));
        assert_eq!(strict("1}"), Err(RenderError::UnexpectedClose(1)));
        assert_eq!(strict("2\\"), Err(RenderError::TrailingBackslash));
        assert_eq!(
            strict("\\text 1"),
            Err(RenderError::MissingGroup("text".to_string()))
        );
    }

    #[test]
    fn field_rerenders_only_on_change() {
        let mut field = MathField::new(RenderOptions::default());
        assert_eq!(field.set_source("1+1"), Ok(true));
        assert_eq!(field.set_source("1+1"), Ok(false));
        assert_eq!(field.source(), "1+1");
        assert_eq!(field.line().to_string(), "1+1");
        assert_eq!(field.set_source("=\\text{NaN}"), Ok(true));
        assert_eq!(field.line().to_string(), "=NaN");
    }

    #[test]
    fn field_style_is_applied_to_runs() {
        let mut field = MathField::new(RenderOptions::default());
        field.set_source("\\text{Error: x}").unwrap();
        field.set_style(Style::default().fg(Color::Red));
        assert_eq!(field.line().spans[0].style.fg, Some(Color::Red));
    }

    #[test]
    fn strict_field_reports_but_still_shows_source() {
        let mut field = MathField::new(RenderOptions {
            throw_on_error: true,
        });
        assert!(field.set_source("\\oops").is_err());
        assert_eq!(field.line().to_string(), "\\oops");
    }

    #[test]
    fn overflowing_field_shows_the_tail() {
        let mut field = MathField::new(RenderOptions::default());
        field.set_source("123456789").unwrap();
        let area = Rect::new(0, 0, 4, 1);
        let mut buf = Buffer::empty(area);
        (&field).render(area, &mut buf);
        let content: String = buf.content.iter().map(|c| c.symbol()).collect();
        assert_eq!(content, "6789");
    }

    #[test]
    fn field_draws_right_aligned() {
        let mut field = MathField::new(RenderOptions::default());
        field.set_source("42").unwrap();
        let area = Rect::new(0, 0, 6, 1);
        let mut buf = Buffer::empty(area);
        (&field).render(area, &mut buf);
        let content: String = buf.content.iter().map(|c| c.symbol()).collect();
        assert_eq!(content, "    42");
    }
}
