//! Output collaborator used by the generation context and by generators.
//!
//! The engine never formats content itself; it only calls the structural
//! methods below and toggles silence around hidden parts. [`TextOutput`] is
//! the plain-text renderer installed when a caller does not provide one.

use std::io::{self, Write};

/// Identity and presentation details announced when an exercise starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub code: String,
    pub kind: u8,
    pub difficulty: i8,
    /// Cosmetic theme hue in degrees, `0..360`.
    pub theme_hue: u16,
}

/// Structural sink for generated content.
///
/// Silence nests: each `silence` lowers a signed depth and each `unsilence`
/// raises it. Emission calls made while the depth is negative must produce
/// no visible text.
pub trait Output {
    fn silence(&mut self);
    fn unsilence(&mut self);
    fn is_silenced(&self) -> bool;

    fn begin_exercise(&mut self, frame: &Frame);
    fn end_exercise(&mut self);

    fn heading(&mut self, level: u8, text: &str);
    fn paragraph(&mut self, text: &str);
    fn code_block(&mut self, code: &str);
    fn list(&mut self, items: &[String]);
    /// A `strong` divider separates independent exercise instances.
    fn divider(&mut self, strong: bool);

    /// Push everything emitted so far to the underlying destination.
    fn flush(&mut self) -> io::Result<()>;
}

/// Markdown-flavoured plain-text renderer writing to any `io::Write`.
///
/// Text is buffered until [`Output::flush`].
pub struct TextOutput<W: Write> {
    writer: W,
    buffer: String,
    depth: i32,
    current_code: Option<String>,
}

impl TextOutput<io::Stdout> {
    pub fn stdout() -> Self {
        TextOutput::new(io::stdout())
    }
}

impl<W: Write> TextOutput<W> {
    pub fn new(writer: W) -> Self {
        TextOutput { writer, buffer: String::new(), depth: 0, current_code: None }
    }

    /// Signed silence depth; negative means silenced.
    pub fn depth(&self) -> i32 {
        self.depth
    }

    fn emit(&mut self, text: &str) {
        if self.depth >= 0 {
            self.buffer.push_str(text);
        }
    }
}

impl<W: Write> Output for TextOutput<W> {
    fn silence(&mut self) {
        self.depth -= 1;
    }

    fn unsilence(&mut self) {
        self.depth += 1;
    }

    fn is_silenced(&self) -> bool {
        self.depth < 0
    }

    fn begin_exercise(&mut self, frame: &Frame) {
        self.current_code = Some(frame.code.clone());
        self.emit(&format!(
            "=== exercise {} (kind {}, difficulty {}, hue {}) ===\n\n",
            frame.code, frame.kind, frame.difficulty, frame.theme_hue
        ));
    }

    fn end_exercise(&mut self) {
        let code = self.current_code.take().unwrap_or_default();
        self.emit(&format!("=== end of exercise {code} ===\n"));
    }

    fn heading(&mut self, level: u8, text: &str) {
        let marks = "#".repeat(level.clamp(1, 6) as usize);
        self.emit(&format!("{marks} {text}\n\n"));
    }

    fn paragraph(&mut self, text: &str) {
        self.emit(&format!("{text}\n\n"));
    }

    fn code_block(&mut self, code: &str) {
        self.emit(&format!("```\n{}\n```\n\n", code.trim_end_matches('\n')));
    }

    fn list(&mut self, items: &[String]) {
        let mut text: String = items.iter().map(|item| format!("- {item}\n")).collect();
        text.push('\n');
        self.emit(&text);
    }

    fn divider(&mut self, strong: bool) {
        let rule = (if strong { "=" } else { "-" }).repeat(40);
        self.emit(&format!("{rule}\n\n"));
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.write_all(self.buffer.as_bytes())?;
        self.buffer.clear();
        self.writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(f: impl FnOnce(&mut TextOutput<&mut Vec<u8>>)) -> String {
        let mut sink = Vec::new();
        {
            let mut out = TextOutput::new(&mut sink);
            f(&mut out);
            out.flush().unwrap();
        }
        String::from_utf8(sink).unwrap()
    }

    #[test]
    fn renders_structural_calls() {
        let text = render(|out| {
            out.heading(2, "Part 1");
            out.paragraph("Compute 2 + 3.");
            out.list(&["a".to_string(), "b".to_string()]);
            out.code_block("let x = 5;\n");
            out.divider(true);
        });
        assert_eq!(
            text,
            format!("## Part 1\n\nCompute 2 + 3.\n\n- a\n- b\n\n```\nlet x = 5;\n```\n\n{}\n\n", "=".repeat(40))
        );
    }

    #[test]
    fn silence_nests_with_signed_depth() {
        let text = render(|out| {
            out.paragraph("one");
            out.silence();
            out.silence();
            out.paragraph("hidden");
            out.unsilence();
            assert!(out.is_silenced());
            out.paragraph("still hidden");
            out.unsilence();
            assert_eq!(out.depth(), 0);
            out.paragraph("two");
        });
        assert_eq!(text, "one\n\ntwo\n\n");
    }

    #[test]
    fn nothing_reaches_the_writer_before_flush() {
        let mut sink = Vec::new();
        let mut out = TextOutput::new(&mut sink);
        out.paragraph("pending");
        drop(out);
        assert!(sink.is_empty());
    }

    #[test]
    fn framing_markers_name_the_code() {
        let frame = Frame { code: "1373".into(), kind: 0, difficulty: 0, theme_hue: 210 };
        let text = render(|out| {
            out.begin_exercise(&frame);
            out.end_exercise();
        });
        assert!(text.starts_with("=== exercise 1373 (kind 0, difficulty 0, hue 210) ==="));
        assert!(text.ends_with("=== end of exercise 1373 ===\n"));
    }
}
