use crate::block::{
    Block, Document, CHECK_CHECKED_MARKER, CHECK_UNCHECKED_MARKER, INDENT, TOGGLE_MARKER,
};

/// Encodes a block tree back to its persisted text form.
///
/// The output is canonical: two spaces per nesting level, one line per
/// block, no trailing newline. Display state (`is_open`) is not part of
/// the text form and is dropped.
pub fn encode(doc: &Document) -> String {
    Encoder::new().encode(doc)
}

struct Encoder {
    indent_level: usize,
    lines: Vec<String>,
}

impl Encoder {
    fn new() -> Self {
        Self {
            indent_level: 0,
            lines: Vec::new(),
        }
    }

    fn encode(mut self, doc: &Document) -> String {
        for block in &doc.blocks {
            self.encode_block(block);
        }
        self.lines.join("\n")
    }

    fn encode_block(&mut self, block: &Block) {
        match block {
            Block::Line { content } => self.push_line(content),
            Block::Toggle {
                content, children, ..
            } => {
                self.push_line(&format!("{}{}", TOGGLE_MARKER, content));
                self.indent_level += 1;
                for child in children {
                    self.encode_block(child);
                }
                self.indent_level -= 1;
            }
            Block::Check { content, checked } => {
                let marker = if *checked {
                    CHECK_CHECKED_MARKER
                } else {
                    CHECK_UNCHECKED_MARKER
                };
                self.push_line(&format!("{}{}", marker, content));
            }
        }
    }

    fn push_line(&mut self, body: &str) {
        let mut line = INDENT.repeat(self.indent_level);
        line.push_str(body);
        self.lines.push(line);
    }
}
