//! Line-indexed immutable source buffer.

use crate::SourceArea;

/// A named, line-indexed text store.
///
/// Rows are 1-based. Logical origin shifts from `#line` directives are
/// tracked by the scanner, not here; this buffer always indexes the raw
/// text so error snippets can be printed.
#[derive(Clone, Debug)]
pub struct SourceCode {
    filename: String,
    lines: Vec<String>,
}

impl SourceCode {
    pub fn new(filename: impl Into<String>, text: &str) -> Self {
        Self {
            filename: filename.into(),
            lines: text.lines().map(str::to_string).collect(),
        }
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn line_count(&self) -> u32 {
        self.lines.len() as u32
    }

    /// Fetches the raw text of a 1-based row.
    pub fn line(&self, row: u32) -> Option<&str> {
        if row == 0 {
            return None;
        }
        self.lines.get(row as usize - 1).map(String::as_str)
    }

    /// Renders the line an area points into plus a `~~~` marker line, for
    /// error snippets. Returns None for areas pointing into synthesized
    /// tokens.
    pub fn annotate(&self, area: SourceArea) -> Option<(String, String)> {
        let line = self.line(area.pos.row)?;
        let col = area.pos.col as usize;
        if col == 0 || col > line.chars().count() + 1 {
            return None;
        }
        let mut marker = String::new();
        for (i, ch) in line.chars().enumerate() {
            if i + 1 >= col {
                break;
            }
            marker.push(if ch == '\t' { '\t' } else { ' ' });
        }
        for _ in 0..area.length.max(1) {
            marker.push('~');
        }
        Some((line.to_string(), marker))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SourcePosition;

    #[test]
    fn lines_are_one_based() {
        let src = SourceCode::new("test.hlsl", "float x;\nint y;\n");
        assert_eq!(src.line(1), Some("float x;"));
        assert_eq!(src.line(2), Some("int y;"));
        assert_eq!(src.line(0), None);
        assert_eq!(src.line(3), None);
    }

    #[test]
    fn annotate_marks_area() {
        let src = SourceCode::new("test.hlsl", "float x;");
        let area = SourceArea::new(SourcePosition::new(1, 7), 1);
        let (line, marker) = src.annotate(area).unwrap();
        assert_eq!(line, "float x;");
        assert_eq!(marker, "      ~");
    }
}
