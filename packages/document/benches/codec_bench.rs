use criterion::{black_box, criterion_group, criterion_main, Criterion};
use taskdown_document::{decode, encode};

fn decode_small_note(c: &mut Criterion) {
    let text = "> Today\n  - [ ] buy milk\n  - [x] walk dog\n  - [ ] water plants\nNotes for later";

    c.bench_function("decode_small_note", |b| b.iter(|| decode(black_box(text))));
}

fn decode_large_note(c: &mut Criterion) {
    // Simulate a long-running note: many sections with checklists and
    // free-form lines under each.
    let mut text = String::new();
    for section in 0..100 {
        text.push_str(&format!("> Section {}\n", section));
        for item in 0..8 {
            let mark = if item % 3 == 0 { 'x' } else { ' ' };
            text.push_str(&format!("  - [{}] task {}-{}\n", mark, section, item));
        }
        text.push_str("  wrap-up notes\n");
    }

    c.bench_function("decode_large_note_1000_lines", |b| {
        b.iter(|| decode(black_box(&text)))
    });
}

fn encode_large_note(c: &mut Criterion) {
    let mut text = String::new();
    for section in 0..100 {
        text.push_str(&format!("> Section {}\n", section));
        for item in 0..8 {
            text.push_str(&format!("  - [ ] task {}-{}\n", section, item));
        }
    }
    let doc = decode(&text);

    c.bench_function("encode_large_note", |b| b.iter(|| encode(black_box(&doc))));
}

fn round_trip_small_note(c: &mut Criterion) {
    let text = "> Today\n  - [ ] buy milk\n  - [x] walk dog\nFooter";

    c.bench_function("round_trip_small_note", |b| {
        b.iter(|| encode(&decode(black_box(text))))
    });
}

criterion_group!(
    benches,
    decode_small_note,
    decode_large_note,
    encode_large_note,
    round_trip_small_note
);
criterion_main!(benches);
