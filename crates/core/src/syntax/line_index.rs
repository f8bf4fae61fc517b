use crate::model::Position;

/// Line-start table for one version of a document's text.
///
/// Lines end at `\n`, `\r\n` or a lone `\r`. Columns are counted in UTF-16
/// code units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    line_starts: Vec<usize>,
    len: usize,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let bytes = text.as_bytes();
        let mut line_starts = vec![0];
        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                b'\n' => line_starts.push(i + 1),
                b'\r' => {
                    if bytes.get(i + 1) == Some(&b'\n') {
                        i += 1;
                    }
                    line_starts.push(i + 1);
                }
                _ => {}
            }
            i += 1;
        }
        Self {
            line_starts,
            len: text.len(),
        }
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Line/column of a byte offset. Offsets past the end clamp to the end;
    /// offsets inside a multi-byte character snap back to its start.
    pub fn position_at(&self, text: &str, offset: usize) -> Position {
        let mut offset = offset.min(self.len);
        while !text.is_char_boundary(offset) {
            offset -= 1;
        }
        let line = self.line_starts.partition_point(|&start| start <= offset) - 1;
        let line_start = self.line_starts[line];
        let character = text[line_start..offset].encode_utf16().count();
        Position::new(line as u32, character as u32)
    }

    /// Byte offset of a line/column. Columns past the end of a line clamp to
    /// the end of its content, before the line break.
    pub fn offset_at(&self, text: &str, position: Position) -> usize {
        let line = position.line as usize;
        let Some(&line_start) = self.line_starts.get(line) else {
            return self.len;
        };
        let line_end = self
            .line_starts
            .get(line + 1)
            .copied()
            .unwrap_or(self.len);

        let target = position.character as usize;
        let mut utf16 = 0;
        for (i, c) in text[line_start..line_end].char_indices() {
            if utf16 >= target {
                return line_start + i;
            }
            utf16 += c.len_utf16();
        }

        let content = &text[line_start..line_end];
        line_start + content.trim_end_matches(['\n', '\r']).len()
    }
}
