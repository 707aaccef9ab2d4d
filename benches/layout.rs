use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};

use autofit::{
    Alignment, CellMeasurer, FitConfig, LayoutContext, Result, Size, blockify, recalculate,
    sanitize,
};

const POEM: &str = "Tyger Tyger, burning bright,
In the forests of the night;
What immortal hand or eye,
Could frame thy fearful symmetry?";

fn recalculate_shared(c: &mut Criterion) {
    let config = FitConfig {
        padding: 2,
        line_spacing: 1,
        ..FitConfig::default()
    };
    c.bench_function("recalculate_shared_size", |b| {
        b.iter(|| run(&config, black_box(POEM), Size::new(640, 400)).expect("recalculate"));
    });
}

fn recalculate_independent(c: &mut Criterion) {
    let config = FitConfig {
        padding: 2,
        line_spacing: 1,
        independent_resize: true,
        alignment: Alignment::SouthEast,
        ..FitConfig::default()
    };
    c.bench_function("recalculate_independent", |b| {
        b.iter(|| run(&config, black_box(POEM), Size::new(640, 400)).expect("recalculate"));
    });
}

fn rebuild_from_stream(c: &mut Criterion) {
    let raw: Vec<u8> = POEM
        .replace('\n', "\r\n\x1b[1m")
        .repeat(8)
        .into_bytes();
    c.bench_function("sanitize_and_blockify", |b| {
        b.iter(|| {
            let text = sanitize(black_box(&raw));
            blockify(&text).expect("blockify")
        });
    });
}

fn run(config: &FitConfig, text: &str, surface: Size) -> Result<u32> {
    let mut blocks = blockify(text)?;
    recalculate(LayoutContext::new(config, &CellMeasurer), &mut blocks, surface)?;
    Ok(blocks.iter().map(|block| block.size).sum())
}

criterion_group!(
    benches,
    recalculate_shared,
    recalculate_independent,
    rebuild_from_stream
);
criterion_main!(benches);
