//! Benchmarks for the pure parts of the extraction pipeline.
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use unslide::extract::{group_words, merge};
use unslide::{ContentItem, OcrWord, TieBreak};

/// Synthetic OCR output: `lines` lines of 8 words with varied confidence.
fn synthetic_words(lines: u32) -> Vec<OcrWord> {
    let mut words = Vec::with_capacity(lines as usize * 8);
    for line in 0..lines {
        for w in 0..8u32 {
            let confidence = 40.0 + ((line * 7 + w * 13) % 60) as f32;
            words.push(
                OcrWord::new(format!("word{}", w), confidence, (w * 90) as i32, (line * 40) as i32)
                    .in_line(line / 10, line / 5, line),
            );
        }
    }
    // Engines report lines interleaved across blocks
    words.reverse();
    words
}

/// Synthetic slide items in scrambled order.
fn synthetic_items(count: u32) -> Vec<ContentItem> {
    (0..count)
        .map(|i| {
            let top = ((i * 37) % 540) as f32;
            let left = ((i * 53) % 960) as f32;
            if i % 5 == 0 {
                ContentItem::image(top, left, format!("IMAGE_{:04}.png", i))
            } else {
                ContentItem::text(top, left, format!("line {}", i))
            }
        })
        .collect()
}

fn bench_group_words(c: &mut Criterion) {
    let mut group = c.benchmark_group("group_words");
    for lines in [10u32, 100, 1000] {
        let words = synthetic_words(lines);
        group.bench_with_input(BenchmarkId::from_parameter(lines), &words, |b, words| {
            b.iter(|| group_words(black_box(words), 60.0))
        });
    }
    group.finish();
}

fn bench_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge");
    for count in [20u32, 200, 2000] {
        let items = synthetic_items(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &items, |b, items| {
            b.iter(|| merge(black_box(items.clone()), TieBreak::TextFirst))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_group_words, bench_merge);
criterion_main!(benches);
