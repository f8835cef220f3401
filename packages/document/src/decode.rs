//! Text-to-tree decoding.
//!
//! The persisted form is line oriented: `"> "` opens a toggle, `- [ ]` /
//! `- [x]` is a checkbox, anything else is a plain line. Two leading
//! spaces make one level of nesting. Decoding never fails; lines that fit
//! no rule come back as plain `Line` blocks.

use regex::Regex;

use crate::block::{Block, Document, INDENT, TOGGLE_MARKER};

/// Decodes persisted text into a block tree.
pub fn decode(text: &str) -> Document {
    Decoder::new().run(text)
}

/// A toggle whose children are still being collected.
struct OpenToggle {
    indent: usize,
    content: String,
    children: Vec<Block>,
}

struct Decoder {
    roots: Vec<Block>,
    /// Enclosing toggles, outermost first, keyed by their header indent.
    frames: Vec<OpenToggle>,
    check: Regex,
}

impl Decoder {
    fn new() -> Self {
        Self {
            roots: Vec::new(),
            frames: Vec::new(),
            check: Regex::new(r"^-\s*\[([ x])\]\s*(.*)$").unwrap(),
        }
    }

    fn run(mut self, text: &str) -> Document {
        for raw in text.split('\n') {
            let line = raw.strip_suffix('\r').unwrap_or(raw);
            self.push_line(line);
        }
        while !self.frames.is_empty() {
            self.close_frame();
        }
        Document::from(self.roots)
    }

    fn push_line(&mut self, line: &str) {
        let indent = indent_level(line);
        let body = line.trim_start();

        // A line at or above a toggle's own indent ends that toggle's
        // children; anything indented deeper belongs to it.
        while self.frames.last().map_or(false, |f| f.indent >= indent) {
            self.close_frame();
        }

        if let Some(rest) = body.strip_prefix(TOGGLE_MARKER) {
            self.frames.push(OpenToggle {
                indent,
                content: rest.trim_end().to_string(),
                children: Vec::new(),
            });
        } else if let Some(caps) = self.check.captures(body) {
            self.append(Block::Check {
                content: caps[2].trim_end().to_string(),
                checked: &caps[1] == "x",
            });
        } else {
            self.append(Block::Line {
                content: body.trim_end().to_string(),
            });
        }
    }

    fn append(&mut self, block: Block) {
        match self.frames.last_mut() {
            Some(frame) => frame.children.push(block),
            None => self.roots.push(block),
        }
    }

    fn close_frame(&mut self) {
        if let Some(frame) = self.frames.pop() {
            self.append(Block::Toggle {
                content: frame.content,
                is_open: true,
                children: frame.children,
            });
        }
    }
}

fn indent_level(line: &str) -> usize {
    line.chars().take_while(|c| *c == ' ').count() / INDENT.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contents(blocks: &[Block]) -> Vec<&str> {
        blocks.iter().map(|b| b.content()).collect()
    }

    #[test]
    fn test_decode_plain_lines() {
        let doc = decode("alpha\nbeta");
        assert_eq!(
            doc.blocks,
            vec![Block::line("alpha"), Block::line("beta")]
        );
    }

    #[test]
    fn test_decode_task_note() {
        let doc = decode("> Tasks\n  - [ ] buy milk\n  - [x] walk dog\nFooter");
        assert_eq!(doc.blocks.len(), 2);
        match &doc.blocks[0] {
            Block::Toggle {
                content, children, ..
            } => {
                assert_eq!(content, "Tasks");
                assert_eq!(
                    children.as_slice(),
                    &[
                        Block::Check {
                            content: "buy milk".to_string(),
                            checked: false,
                        },
                        Block::Check {
                            content: "walk dog".to_string(),
                            checked: true,
                        },
                    ]
                );
            }
            other => panic!("expected toggle, got {:?}", other),
        }
        assert_eq!(doc.blocks[1], Block::line("Footer"));
    }

    #[test]
    fn test_decode_nested_toggles() {
        let doc = decode("> a\n  > b\n    - [x] c\n  d\ne");
        assert_eq!(contents(&doc.blocks), vec!["a", "e"]);
        let a = doc.blocks[0].children().unwrap();
        assert_eq!(contents(a), vec!["b", "d"]);
        let b = a[0].children().unwrap();
        assert_eq!(b.len(), 1);
        assert_eq!(b[0].kind(), crate::block::BlockKind::Check);
    }

    #[test]
    fn test_decode_sibling_toggle_closes_previous() {
        let doc = decode("> first\n  inside\n> second");
        assert_eq!(contents(&doc.blocks), vec!["first", "second"]);
        assert_eq!(doc.blocks[0].children().unwrap().len(), 1);
        assert_eq!(doc.blocks[1].children().unwrap().len(), 0);
    }

    #[test]
    fn test_decode_overshoot_indent_attaches_to_nearest_toggle() {
        // Indent jumps two levels; the line still lands in the enclosing
        // toggle rather than being dropped.
        let doc = decode("> t\n      deep");
        let children = doc.blocks[0].children().unwrap();
        assert_eq!(contents(children), vec!["deep"]);
    }

    #[test]
    fn test_decode_blank_lines_become_empty_lines() {
        let doc = decode("a\n\nb");
        assert_eq!(contents(&doc.blocks), vec!["a", "", "b"]);
    }

    #[test]
    fn test_decode_indented_blank_line_stays_in_toggle() {
        let doc = decode("> t\n  x\n  \n  y");
        let children = doc.blocks[0].children().unwrap();
        assert_eq!(contents(children), vec!["x", "", "y"]);
    }

    #[test]
    fn test_decode_unindented_blank_line_closes_toggle() {
        let doc = decode("> t\n  x\n\ny");
        assert_eq!(doc.blocks.len(), 3);
        assert_eq!(contents(&doc.blocks), vec!["t", "", "y"]);
    }

    #[test]
    fn test_decode_lenient_checkbox_spacing() {
        let doc = decode("-[x] tight\n-  [ ]   spaced");
        assert_eq!(
            doc.blocks,
            vec![
                Block::Check {
                    content: "tight".to_string(),
                    checked: true,
                },
                Block::Check {
                    content: "spaced".to_string(),
                    checked: false,
                },
            ]
        );
    }

    #[test]
    fn test_decode_uppercase_checkbox_is_not_a_check() {
        let doc = decode("- [X] shout");
        assert_eq!(doc.blocks, vec![Block::line("- [X] shout")]);
    }

    #[test]
    fn test_decode_bare_angle_is_plain_text() {
        // ">" without a trailing space is not a toggle marker.
        let doc = decode(">\n>no space");
        assert_eq!(contents(&doc.blocks), vec![">", ">no space"]);
    }

    #[test]
    fn test_decode_crlf_input() {
        let doc = decode("> t\r\n  - [x] done\r\nend\r\n");
        assert_eq!(doc.blocks[0].content(), "t");
        assert_eq!(
            doc.blocks[0].children().unwrap()[0],
            Block::Check {
                content: "done".to_string(),
                checked: true,
            }
        );
        assert_eq!(doc.blocks[1], Block::line("end"));
        // The trailing newline carries an empty final line through.
        assert_eq!(doc.blocks[2], Block::line(""));
    }

    #[test]
    fn test_decode_empty_input_yields_one_empty_line() {
        let doc = decode("");
        assert_eq!(doc.blocks, vec![Block::line("")]);
    }

    #[test]
    fn test_decode_tolerates_malformed_input() {
        let doc = decode("\t> tabbed\n- [q] odd\n   stray");
        assert_eq!(doc.blocks.len(), 3);
        // Tab indentation is outside the grammar: the marker still counts
        // (content must never begin with one) but the nesting level is 0.
        assert_eq!(doc.blocks[0].content(), "tabbed");
        assert_eq!(doc.blocks[0].kind(), crate::block::BlockKind::Toggle);
        // "q" is not a valid checkbox state, so the line stays plain text.
        assert_eq!(doc.blocks[1], Block::line("- [q] odd"));
        assert_eq!(doc.blocks[2], Block::line("stray"));
    }

    #[test]
    fn test_decode_unclosed_toggles_at_end_of_input() {
        let doc = decode("> outer\n  > inner\n    leaf");
        assert_eq!(doc.blocks.len(), 1);
        let outer = doc.blocks[0].children().unwrap();
        let inner = outer[0].children().unwrap();
        assert_eq!(contents(inner), vec!["leaf"]);
    }
}
