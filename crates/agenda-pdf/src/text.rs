//! Content-stream text extraction
//!
//! A reduced text-state machine that tracks where strings are shown, not
//! what the glyphs look like. Shown bytes are decoded through the selected
//! font's [`FontDecoder`]. Font metrics are never read, so span widths are
//! estimated from the font size.
//!
//! ```text
//! content ops  ->  TextSpan[]  ->  TextLine[]  ->  clipped text
//!                  extract_spans   group_lines     clipped_text
//! ```

use agenda_core::Rect;
use lopdf::content::Operation;
use lopdf::Object;

use crate::cmap::{FontDecoder, FontMap};

/// Average glyph width as a fraction of the font size
const APPROX_CHAR_WIDTH_RATIO: f64 = 0.5;

/// Spans whose baselines are within this many points share a line
const LINE_TOLERANCE: f64 = 2.0;

/// Gap, as a fraction of the font size, that reads as a word break
const WORD_GAP_RATIO: f64 = 0.15;

/// `[a, b, c, d, e, f]`, the PDF affine matrix layout
type Matrix = [f64; 6];

const IDENTITY: Matrix = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

/// `m` applied first, then `n`
fn multiply(m: &Matrix, n: &Matrix) -> Matrix {
    [
        m[0] * n[0] + m[1] * n[2],
        m[0] * n[1] + m[1] * n[3],
        m[2] * n[0] + m[3] * n[2],
        m[2] * n[1] + m[3] * n[3],
        m[4] * n[0] + m[5] * n[2] + n[4],
        m[4] * n[1] + m[5] * n[3] + n[5],
    ]
}

fn transform(m: &Matrix, x: f64, y: f64) -> (f64, f64) {
    (m[0] * x + m[2] * y + m[4], m[1] * x + m[3] * y + m[5])
}

/// A string shown at one position, in page user space
#[derive(Debug, Clone, PartialEq)]
pub struct TextSpan {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub font_size: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    /// Baseline of the first span
    pub y: f64,
    pub text: String,
}

struct TextState<'f> {
    font: Option<&'f FontDecoder>,
    ctm: Matrix,
    saved: Vec<Matrix>,
    text_matrix: Matrix,
    line_matrix: Matrix,
    font_size: f64,
    horiz_scale: f64,
    char_spacing: f64,
    word_spacing: f64,
    leading: f64,
    rise: f64,
}

impl Default for TextState<'_> {
    fn default() -> Self {
        Self {
            font: None,
            ctm: IDENTITY,
            saved: Vec::new(),
            text_matrix: IDENTITY,
            line_matrix: IDENTITY,
            font_size: 0.0,
            horiz_scale: 1.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
            leading: 0.0,
            rise: 0.0,
        }
    }
}

impl TextState<'_> {
    fn decode(&self, bytes: &[u8]) -> String {
        match self.font {
            Some(font) => font.decode(bytes),
            None => decode_pdf_string(bytes),
        }
    }

    /// Current text origin in user space
    fn origin(&self) -> (f64, f64) {
        let render = multiply(&self.text_matrix, &self.ctm);
        transform(&render, 0.0, self.rise)
    }

    fn effective_font_size(&self) -> f64 {
        let render = multiply(&self.text_matrix, &self.ctm);
        (self.font_size * (render[1].powi(2) + render[3].powi(2)).sqrt()).abs()
    }

    fn advance_x(&mut self, dx: f64) {
        self.text_matrix[4] += dx * self.text_matrix[0];
        self.text_matrix[5] += dx * self.text_matrix[1];
    }

    fn translate_line(&mut self, tx: f64, ty: f64) {
        let m = self.line_matrix;
        self.line_matrix[4] = tx * m[0] + ty * m[2] + m[4];
        self.line_matrix[5] = tx * m[1] + ty * m[3] + m[5];
        self.text_matrix = self.line_matrix;
    }

    fn next_line(&mut self) {
        self.translate_line(0.0, -self.leading);
    }

    /// Text-space displacement for showing `text`
    fn displacement(&self, text: &str) -> f64 {
        text.chars()
            .map(|ch| {
                let spacing = if ch == ' ' { self.word_spacing } else { 0.0 };
                (self.font_size * APPROX_CHAR_WIDTH_RATIO + self.char_spacing + spacing)
                    * self.horiz_scale
            })
            .sum()
    }

    fn show(&mut self, operand: &Object, spans: &mut Vec<TextSpan>) {
        let Object::String(bytes, _) = operand else {
            return;
        };
        let start = self.origin();
        let text = self.decode(bytes);
        self.advance_x(self.displacement(&text));
        self.push_span(text, start, spans);
    }

    /// `TJ`: strings interleaved with adjustments in thousandths of a text
    /// unit. A large enough rightward adjustment reads as a space.
    fn show_array(&mut self, items: &[Object], spans: &mut Vec<TextSpan>) {
        let start = self.origin();
        let mut buf = String::new();

        for item in items {
            match item {
                Object::String(bytes, _) => {
                    let fragment = self.decode(bytes);
                    self.advance_x(self.displacement(&fragment));
                    buf.push_str(&fragment);
                }
                other => {
                    let Some(adjust) = number(other) else {
                        continue;
                    };
                    let dx = -adjust / 1000.0 * self.font_size * self.horiz_scale;
                    let gap = self.font_size * APPROX_CHAR_WIDTH_RATIO * self.horiz_scale * 0.3;
                    if dx > gap && !buf.is_empty() && !buf.ends_with(' ') {
                        buf.push(' ');
                    }
                    self.advance_x(dx);
                }
            }
        }

        self.push_span(buf, start, spans);
    }

    fn push_span(&self, text: String, start: (f64, f64), spans: &mut Vec<TextSpan>) {
        if text.trim().is_empty() {
            return;
        }
        let end = self.origin();
        spans.push(TextSpan {
            text,
            x: start.0,
            y: start.1,
            width: (end.0 - start.0).abs(),
            font_size: self.effective_font_size(),
        });
    }
}

fn number(object: &Object) -> Option<f64> {
    match object {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(*r as f64),
        _ => None,
    }
}

fn numbers<const N: usize>(operands: &[Object]) -> Option<[f64; N]> {
    let mut out = [0.0; N];
    for (slot, operand) in out.iter_mut().zip(operands.iter()) {
        *slot = number(operand)?;
    }
    (operands.len() >= N).then_some(out)
}

/// UTF-16BE when the string carries a byte order mark, otherwise one
/// character per byte
pub fn decode_pdf_string(bytes: &[u8]) -> String {
    match bytes.strip_prefix(&[0xFE, 0xFF]) {
        Some(rest) => {
            let units: Vec<u16> = rest
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect();
            String::from_utf16_lossy(&units)
        }
        None => bytes.iter().map(|&b| char::from(b)).collect(),
    }
}

/// Walk decoded content-stream operations and collect shown strings.
/// `fonts` maps the resource names selected by `Tf` to their decoders.
pub fn extract_spans(operations: &[Operation], fonts: &FontMap) -> Vec<TextSpan> {
    let mut state = TextState::default();
    let mut spans = Vec::new();

    for op in operations {
        let operands = op.operands.as_slice();
        match op.operator.as_str() {
            "q" => state.saved.push(state.ctm),
            "Q" => {
                if let Some(ctm) = state.saved.pop() {
                    state.ctm = ctm;
                }
            }
            "cm" => {
                if let Some(m) = numbers::<6>(operands) {
                    state.ctm = multiply(&m, &state.ctm);
                }
            }
            "BT" => {
                state.text_matrix = IDENTITY;
                state.line_matrix = IDENTITY;
            }
            "Tf" => {
                state.font = operands
                    .first()
                    .and_then(|name| name.as_name().ok())
                    .and_then(|name| fonts.get(name));
                if let Some(size) = operands.get(1).and_then(number) {
                    state.font_size = size;
                }
            }
            "Tm" => {
                if let Some(m) = numbers::<6>(operands) {
                    state.text_matrix = m;
                    state.line_matrix = m;
                }
            }
            "Td" => {
                if let Some([tx, ty]) = numbers::<2>(operands) {
                    state.translate_line(tx, ty);
                }
            }
            "TD" => {
                if let Some([tx, ty]) = numbers::<2>(operands) {
                    state.leading = -ty;
                    state.translate_line(tx, ty);
                }
            }
            "T*" => state.next_line(),
            "TL" => {
                if let Some([leading]) = numbers::<1>(operands) {
                    state.leading = leading;
                }
            }
            "Tc" => {
                if let Some([spacing]) = numbers::<1>(operands) {
                    state.char_spacing = spacing;
                }
            }
            "Tw" => {
                if let Some([spacing]) = numbers::<1>(operands) {
                    state.word_spacing = spacing;
                }
            }
            "Tz" => {
                if let Some([scale]) = numbers::<1>(operands) {
                    state.horiz_scale = scale / 100.0;
                }
            }
            "Ts" => {
                if let Some([rise]) = numbers::<1>(operands) {
                    state.rise = rise;
                }
            }
            "Tj" => {
                if let Some(operand) = operands.first() {
                    state.show(operand, &mut spans);
                }
            }
            "TJ" => {
                if let Some(Object::Array(items)) = operands.first() {
                    state.show_array(items, &mut spans);
                }
            }
            "'" => {
                state.next_line();
                if let Some(operand) = operands.first() {
                    state.show(operand, &mut spans);
                }
            }
            "\"" => {
                if let (Some([aw, ac]), Some(operand)) = (numbers::<2>(operands), operands.get(2))
                {
                    state.word_spacing = aw;
                    state.char_spacing = ac;
                    state.next_line();
                    state.show(operand, &mut spans);
                }
            }
            _ => {}
        }
    }

    spans
}

/// Group spans into lines: top to bottom, and left to right within a line
pub fn group_lines(mut spans: Vec<TextSpan>) -> Vec<TextLine> {
    spans.sort_by(|a, b| {
        b.y.partial_cmp(&a.y)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal))
    });

    let mut lines = Vec::new();
    let mut current: Vec<TextSpan> = Vec::new();

    for span in spans {
        let same_line = current
            .first()
            .is_some_and(|first| (first.y - span.y).abs() <= LINE_TOLERANCE);
        if !same_line && !current.is_empty() {
            lines.push(assemble_line(std::mem::take(&mut current)));
        }
        current.push(span);
    }
    if !current.is_empty() {
        lines.push(assemble_line(current));
    }

    lines
}

fn assemble_line(mut spans: Vec<TextSpan>) -> TextLine {
    spans.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal));

    let y = spans.first().map(|s| s.y).unwrap_or(0.0);
    let mut text = String::new();
    let mut prev_end: Option<(f64, f64)> = None;

    for span in &spans {
        if let Some((end, font_size)) = prev_end {
            let gap = span.x - end;
            let separated = text.ends_with(char::is_whitespace)
                || span.text.starts_with(char::is_whitespace);
            if gap > font_size * WORD_GAP_RATIO && !separated {
                text.push(' ');
            }
        }
        text.push_str(&span.text);
        prev_end = Some((span.x + span.width, span.font_size));
    }

    TextLine { y, text }
}

/// Lines of the spans whose origin lies inside `clip`, joined by `\n`
pub fn clipped_text(spans: Vec<TextSpan>, clip: Option<&Rect>) -> String {
    let visible: Vec<TextSpan> = spans
        .into_iter()
        .filter(|span| clip.map_or(true, |rect| rect.contains(span.x, span.y)))
        .collect();

    group_lines(visible)
        .into_iter()
        .map(|line| line.text)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmap::ToUnicodeMap;
    use lopdf::StringFormat;

    fn op(operator: &str, operands: Vec<Object>) -> Operation {
        Operation::new(operator, operands)
    }

    fn literal(text: &str) -> Object {
        Object::String(text.as_bytes().to_vec(), StringFormat::Literal)
    }

    fn line_ops(x: i64, y: i64, text: &str) -> Vec<Operation> {
        vec![
            op("BT", vec![]),
            op("Tf", vec![Object::Name(b"F1".to_vec()), Object::Integer(12)]),
            op("Td", vec![Object::Integer(x), Object::Integer(y)]),
            op("Tj", vec![literal(text)]),
            op("ET", vec![]),
        ]
    }

    #[test]
    fn test_td_positions_span() {
        let spans = extract_spans(&line_ops(72, 700, "1. Elect"), &FontMap::new());

        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "1. Elect");
        assert_eq!((spans[0].x, spans[0].y), (72.0, 700.0));
        assert_eq!(spans[0].font_size, 12.0);
        assert_eq!(spans[0].width, 8.0 * 6.0);
    }

    #[test]
    fn test_leading_and_next_line_operators() {
        let ops = vec![
            op("BT", vec![]),
            op("Tf", vec![Object::Name(b"F1".to_vec()), Object::Integer(10)]),
            op("TL", vec![Object::Integer(14)]),
            op("Td", vec![Object::Integer(72), Object::Integer(700)]),
            op("Tj", vec![literal("first")]),
            op("T*", vec![]),
            op("Tj", vec![literal("second")]),
            op("'", vec![literal("third")]),
            op("ET", vec![]),
        ];
        let spans = extract_spans(&ops, &FontMap::new());
        let ys: Vec<f64> = spans.iter().map(|s| s.y).collect();

        assert_eq!(ys, vec![700.0, 686.0, 672.0]);
        assert!(spans.iter().all(|s| s.x == 72.0));
    }

    #[test]
    fn test_cm_and_restore() {
        let mut ops = vec![
            op("q", vec![]),
            op(
                "cm",
                vec![
                    Object::Integer(1),
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(1),
                    Object::Integer(100),
                    Object::Integer(50),
                ],
            ),
        ];
        ops.extend(line_ops(10, 10, "shifted"));
        ops.push(op("Q", vec![]));
        ops.extend(line_ops(10, 10, "plain"));

        let spans = extract_spans(&ops, &FontMap::new());
        assert_eq!((spans[0].x, spans[0].y), (110.0, 60.0));
        assert_eq!((spans[1].x, spans[1].y), (10.0, 10.0));
    }

    #[test]
    fn test_tm_sets_absolute_position() {
        let ops = vec![
            op("BT", vec![]),
            op("Tf", vec![Object::Name(b"F1".to_vec()), Object::Real(9.0)]),
            op(
                "Tm",
                vec![
                    Object::Integer(1),
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(1),
                    Object::Real(300.5),
                    Object::Integer(400),
                ],
            ),
            op("Tj", vec![literal("x")]),
            op("ET", vec![]),
        ];
        let spans = extract_spans(&ops, &FontMap::new());
        assert_eq!((spans[0].x, spans[0].y), (300.5, 400.0));
    }

    #[test]
    fn test_tj_array_kerning_inserts_space() {
        let ops = vec![
            op("BT", vec![]),
            op("Tf", vec![Object::Name(b"F1".to_vec()), Object::Integer(12)]),
            op("Td", vec![Object::Integer(72), Object::Integer(700)]),
            op(
                "TJ",
                vec![Object::Array(vec![
                    literal("Ratify"),
                    Object::Integer(-400),
                    literal("Auditor"),
                    Object::Integer(-20),
                    literal("s"),
                ])],
            ),
            op("ET", vec![]),
        ];
        let spans = extract_spans(&ops, &FontMap::new());
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "Ratify Auditors");
    }

    #[test]
    fn test_group_lines_orders_and_joins() {
        let span = |text: &str, x: f64, y: f64| TextSpan {
            text: text.to_string(),
            x,
            y,
            width: text.len() as f64 * 6.0,
            font_size: 12.0,
        };
        let lines = group_lines(vec![
            span("Auditor", 130.0, 599.0),
            span("2. Ratify", 72.0, 600.0),
            span("1. Elect", 72.0, 700.0),
            span("Director", 130.0, 700.5),
        ]);

        let texts: Vec<&str> = lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["1. Elect Director", "2. Ratify Auditor"]);
    }

    #[test]
    fn test_group_lines_adjacent_spans_not_spaced() {
        let lines = group_lines(vec![
            TextSpan {
                text: "Merg".into(),
                x: 72.0,
                y: 700.0,
                width: 24.0,
                font_size: 12.0,
            },
            TextSpan {
                text: "er".into(),
                x: 96.0,
                y: 700.0,
                width: 12.0,
                font_size: 12.0,
            },
        ]);
        assert_eq!(lines[0].text, "Merger");
    }

    #[test]
    fn test_clipped_text_excludes_outside_spans() {
        let mut ops = line_ops(72, 700, "1. Inside");
        ops.extend(line_ops(560, 690, "Outside"));
        let spans = extract_spans(&ops, &FontMap::new());
        let clip = Rect::new(0.0, 0.0, 540.0, 792.0);

        assert_eq!(clipped_text(spans.clone(), Some(&clip)), "1. Inside");
        assert_eq!(clipped_text(spans, None), "1. Inside\nOutside");
    }

    #[test]
    fn test_tf_selects_font_decoder() {
        let cmap = ToUnicodeMap::parse(b"1 beginbfrange <0010> <0019> <0030> endbfrange");
        let mut fonts = FontMap::new();
        fonts.insert(b"F2".to_vec(), FontDecoder::new(true, Some(cmap)));

        let ops = vec![
            op("BT", vec![]),
            op("Tf", vec![Object::Name(b"F2".to_vec()), Object::Integer(12)]),
            op("Td", vec![Object::Integer(72), Object::Integer(700)]),
            op(
                "Tj",
                vec![Object::String(
                    vec![0x00, 0x11, 0x00, 0x12],
                    StringFormat::Hexadecimal,
                )],
            ),
            op("Tf", vec![Object::Name(b"F1".to_vec()), Object::Integer(12)]),
            op("Tj", vec![literal(". Elect")]),
            op("ET", vec![]),
        ];
        let spans = extract_spans(&ops, &fonts);

        let texts: Vec<&str> = spans.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["12", ". Elect"]);
        assert_eq!(spans[0].width, 2.0 * 6.0);
    }

    #[test]
    fn test_decode_pdf_string() {
        assert_eq!(decode_pdf_string(b"Caf\xe9"), "Café");
        assert_eq!(
            decode_pdf_string(&[0xFE, 0xFF, 0x00, 0x41, 0x20, 0x14, 0x00, 0x42]),
            "A\u{2014}B"
        );
    }
}
