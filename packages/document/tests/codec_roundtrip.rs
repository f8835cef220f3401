//! Integration tests for the text codec: decode/encode round trips.

use taskdown_document::{decode, encode, normalize, Block, BlockKind, Document};

const SAMPLE: &str = "> Tasks\n  - [ ] buy milk\n  - [x] walk dog\nFooter";

#[test]
fn test_round_trip_is_idempotent() {
    let inputs = [
        SAMPLE,
        "",
        "\n\n",
        "just one line",
        "> a\n  > b\n    - [ ] c",
        "   odd indent\n-[x] tight",
        "> lonely toggle",
        "a\r\nb\r\n",
        "  \n x",
        "- [X] not a checkbox\n- [q] also not",
    ];
    for input in inputs {
        let once = normalize(input);
        let twice = normalize(&once);
        assert_eq!(twice, once, "normalize not a fixed point for {:?}", input);
    }
}

#[test]
fn test_canonical_tree_survives_round_trip() {
    let doc = Document::from(vec![
        Block::Toggle {
            content: "a".to_string(),
            is_open: true,
            children: vec![
                Block::Toggle {
                    content: "b".to_string(),
                    is_open: true,
                    children: vec![Block::Check {
                        content: "c".to_string(),
                        checked: true,
                    }],
                },
                Block::line("d"),
            ],
        },
        Block::line("e"),
    ]);
    assert_eq!(decode(&encode(&doc)), doc);
}

#[test]
fn test_task_note_end_to_end() {
    let doc = decode(SAMPLE);

    assert_eq!(doc.blocks.len(), 2);
    assert_eq!(doc.blocks[0].kind(), BlockKind::Toggle);
    assert_eq!(doc.blocks[0].content(), "Tasks");

    let children = doc.blocks[0].children().unwrap();
    assert_eq!(children.len(), 2);
    assert_eq!(
        children[0],
        Block::Check {
            content: "buy milk".to_string(),
            checked: false,
        }
    );
    assert_eq!(
        children[1],
        Block::Check {
            content: "walk dog".to_string(),
            checked: true,
        }
    );
    assert_eq!(doc.blocks[1], Block::line("Footer"));

    assert_eq!(encode(&doc), SAMPLE);
}

#[test]
fn test_blank_lines_and_trailing_newline_are_preserved() {
    let text = "a\n\nb\n";
    assert_eq!(encode(&decode(text)), text);
}

#[test]
fn test_blank_child_lines_stay_nested() {
    let text = "> t\n  one\n  \n  two";
    let doc = decode(text);
    assert_eq!(doc.blocks.len(), 1);
    assert_eq!(doc.blocks[0].children().unwrap().len(), 3);
    // The blank child re-encodes as an indented empty line.
    assert_eq!(encode(&doc), "> t\n  one\n  \n  two");
}

#[test]
fn test_normalization_rewrites_loose_input() {
    // Indentation without an enclosing toggle flattens to the root, odd
    // indent widths snap to the two-space grid, and checkbox spacing is
    // canonicalized.
    assert_eq!(normalize("   floaty"), "floaty");
    assert_eq!(normalize("> t\n   three wide"), "> t\n  three wide");
    assert_eq!(normalize("-[x] tight"), "- [x] tight");
    assert_eq!(normalize("-  [ ]   wide  "), "- [ ] wide");
}
