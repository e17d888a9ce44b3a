use criterion::{Criterion, black_box};
use spark_stream::{Stream, StreamPool};
use std::{env, time::Duration};

/// 基准：一次典型的“写头部 + 负载 -> 封口 -> 回读”往返。
///
/// # 逻辑解析（How）
/// - `stream_roundtrip_owned`：每轮新分配 1 KiB 流；
/// - `stream_roundtrip_pooled`：经 `StreamPool` 租借，对比复用区域后的分配开销；
/// - `stream_growth_from_borrowed`：从 64 字节栈缓冲起步，逐步写满 4 KiB，覆盖提升与几何扩容路径。
fn write_frame(stream: &mut Stream<'_>, payload: &[u8]) {
    stream.write_u16_be(0xCAB1);
    stream.write_u32_be(payload.len() as u32);
    stream.write_bytes(payload);
    stream.seal_length();
}

fn read_frame(stream: &mut Stream<'_>, sink: &mut [u8]) -> u16 {
    stream.set_position(0);
    let magic = stream.read_u16_be();
    let len = stream.read_u32_be() as usize;
    stream.read_bytes(&mut sink[..len]);
    magic
}

fn bench_stream_roundtrip(c: &mut Criterion) {
    let payload = [7u8; 1000];

    c.bench_function("stream_roundtrip_owned", |b| {
        let mut sink = vec![0u8; payload.len()];
        b.iter(|| {
            let mut stream = Stream::with_capacity(1024).unwrap();
            write_frame(&mut stream, &payload);
            black_box(read_frame(&mut stream, &mut sink))
        });
    });

    let pool = StreamPool::new();
    c.bench_function("stream_roundtrip_pooled", |b| {
        let mut sink = vec![0u8; payload.len()];
        b.iter(|| {
            let mut stream = pool.take(1024).unwrap();
            write_frame(&mut stream, &payload);
            black_box(read_frame(&mut stream, &mut sink))
        });
    });

    c.bench_function("stream_growth_from_borrowed", |b| {
        b.iter(|| {
            let mut backing = [0u8; 64];
            let mut stream = Stream::static_init(&mut backing);
            for i in 0..512u64 {
                stream.ensure_remaining_capacity(8).unwrap();
                stream.write_u64(i);
            }
            black_box(stream.capacity())
        });
    });
}

fn main() {
    let mut quick_mode = false;
    for arg in env::args().skip(1) {
        if arg == "--quick" {
            quick_mode = true;
        }
    }

    let mut criterion = Criterion::default();
    if quick_mode {
        criterion = criterion
            .sample_size(10)
            .warm_up_time(Duration::from_millis(100))
            .measurement_time(Duration::from_millis(250));
    }

    bench_stream_roundtrip(&mut criterion);
    criterion.final_summary();
}
