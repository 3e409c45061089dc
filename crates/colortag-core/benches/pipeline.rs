//! Relabel and conversion benchmarks
//!
//! Relabeling should stay flat regardless of image size; conversion cost is
//! dominated by the engine.

use colortag_core::{
    BoundedByteSource, ChannelMasks, ColorSpace, ComponentModel, NamedSpace, PackedModel,
    PixelBuffer, SpaceConverter, TransferType, relabel_color_space,
};
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

fn generate_rgb8_data(count: usize) -> Vec<u8> {
    (0..count * 3).map(|i| ((i * 37) % 256) as u8).collect()
}

fn rgb8_buffer(side: u32) -> PixelBuffer {
    let model = ComponentModel::opaque(ColorSpace::srgb(), TransferType::U8);
    let data = generate_rgb8_data((side * side) as usize);
    PixelBuffer::new(side, side, model.into(), data).unwrap()
}

fn bench_relabel(c: &mut Criterion) {
    let mut group = c.benchmark_group("relabel");
    let target = ColorSpace::named(NamedSpace::AdobeRgb);

    for side in [16u32, 256, 1024] {
        let buffer = rgb8_buffer(side);
        group.bench_with_input(BenchmarkId::new("component_rgb8", side), &buffer, |b, buf| {
            b.iter(|| relabel_color_space(black_box(buf), black_box(&target)).unwrap())
        });
    }

    let packed = PackedModel::from_masks(ColorSpace::srgb(), ChannelMasks::RGB565).unwrap();
    let buffer = PixelBuffer::zeroed(256, 256, packed.into()).unwrap();
    group.bench_function("packed_rgb565", |b| {
        b.iter(|| relabel_color_space(black_box(&buffer), black_box(&target)).unwrap())
    });

    group.finish();
}

fn bench_convert(c: &mut Criterion) {
    let mut group = c.benchmark_group("convert");
    let converter = SpaceConverter::new();
    let from = ColorSpace::named(NamedSpace::AdobeRgb);
    let to = ColorSpace::srgb();

    for side in [64u32, 256] {
        let buffer = rgb8_buffer(side);
        group.throughput(Throughput::Elements(u64::from(side * side)));
        group.bench_with_input(BenchmarkId::new("adobe_to_srgb", side), &buffer, |b, buf| {
            b.iter(|| converter.convert(black_box(buf), &from, &to).unwrap())
        });
    }

    let packed = PackedModel::from_masks(ColorSpace::srgb(), ChannelMasks::RGB565).unwrap();
    let buffer = PixelBuffer::zeroed(256, 256, packed.into()).unwrap();
    group.throughput(Throughput::Elements(256 * 256));
    group.bench_function("packed_rgb565_adobe_to_srgb", |b| {
        b.iter(|| converter.convert(black_box(&buffer), &from, &to).unwrap())
    });

    group.finish();
}

fn bench_read_range(c: &mut Criterion) {
    let mut group = c.benchmark_group("read_range");
    let source = BoundedByteSource::new(vec![0u8; 1 << 20]);

    for length in [16i32, 4096, 65536] {
        group.throughput(Throughput::Bytes(length as u64));
        group.bench_with_input(BenchmarkId::new("copy", length), &length, |b, &len| {
            b.iter(|| source.read_range(black_box(1024), black_box(len)).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, bench_relabel, bench_convert, bench_read_range);
criterion_main!(benches);
