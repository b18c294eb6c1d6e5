//! Byte offset to line/column conversion.
//!
//! Terminal output counts columns in chars; LSP clients count UTF-16 code
//! units. Both walk the text once up to the offset.

use lsp_types::Position;

/// Zero-based line and char column of a byte offset.
pub fn offset_to_position(text: &str, offset: usize) -> Position {
    position_with(text, offset, |_| 1)
}

/// Zero-based line and UTF-16 column of a byte offset, as LSP expects.
pub fn offset_to_utf16_position(text: &str, offset: usize) -> Position {
    position_with(text, offset, |ch| ch.len_utf16() as u32)
}

fn position_with(text: &str, offset: usize, width: impl Fn(char) -> u32) -> Position {
    let mut line = 0;
    let mut character = 0;

    for (index, ch) in text.char_indices() {
        if index >= offset {
            break;
        }
        if ch == '\n' {
            line += 1;
            character = 0;
        } else {
            character += width(ch);
        }
    }

    Position { line, character }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lines_and_columns() {
        let text = "class A {\n  int x;\n}";
        assert_eq!(offset_to_position(text, 0), Position { line: 0, character: 0 });
        assert_eq!(offset_to_position(text, 9), Position { line: 0, character: 9 });
        assert_eq!(offset_to_position(text, 10), Position { line: 1, character: 0 });
        assert_eq!(offset_to_position(text, 12), Position { line: 1, character: 2 });
    }

    #[test]
    fn test_offset_past_end() {
        let text = "ab\ncd";
        assert_eq!(offset_to_position(text, 100), Position { line: 1, character: 2 });
    }

    #[test]
    fn test_utf16_columns() {
        // "é" is one char and one UTF-16 unit, "𝄞" is one char and two units
        let text = "s = \"é𝄞\"; x";
        let x = text.find('x').unwrap();
        assert_eq!(offset_to_position(text, x), Position { line: 0, character: 10 });
        assert_eq!(offset_to_utf16_position(text, x), Position { line: 0, character: 11 });
    }
}
