//! `pool_contract` 集成测试：验证 `StreamPool` 与 `PooledStream` 的租借、回收与统计契约。
//!
//! # 测试目标（Why）
//! - 保障租借、回收、统计等核心流程能在 crate 公开 API 下正确协作；
//! - 以 `RecordingRecycler` 观察回收事件，验证租约与回收器之间的协作协议；
//! - 覆盖配置反序列化，确保部署期参数能按默认值补全。

use std::sync::{Arc, Mutex};

use spark_stream::{
    GrowthPolicy, PooledStream, ReclaimedBuffer, Stream, StreamPool, StreamPoolConfig,
    StreamRecycler,
};

/// 回收事件探针：记录 `(leased_capacity, capacity, had_buffer)`。
#[derive(Default)]
struct RecordingRecycler {
    events: Mutex<Vec<(usize, usize, bool)>>,
}

impl RecordingRecycler {
    fn take_events(&self) -> Vec<(usize, usize, bool)> {
        self.events
            .lock()
            .expect("mutex poisoned")
            .drain(..)
            .collect()
    }
}

impl StreamRecycler for RecordingRecycler {
    fn reclaim(&self, reclaimed: ReclaimedBuffer) {
        let leased = reclaimed.leased_capacity();
        let capacity = reclaimed.capacity();
        let had_buffer = reclaimed.into_buffer().is_some();
        self.events
            .lock()
            .expect("mutex poisoned")
            .push((leased, capacity, had_buffer));
    }
}

#[test]
fn drop_reports_region_to_recycler_once() {
    let recycler = Arc::new(RecordingRecycler::default());
    let stream = Stream::with_capacity(8).expect("构造失败");
    let mut pooled = PooledStream::new(stream, recycler.clone());
    pooled.write_u32_be(7);
    pooled.ensure_capacity(20).expect("扩容失败");
    let grown = pooled.capacity();
    drop(pooled);
    assert_eq!(recycler.take_events(), vec![(8, grown, true)]);
}

#[test]
fn detach_keeps_stream_and_reports_loss() {
    let recycler = Arc::new(RecordingRecycler::default());
    let stream = Stream::with_capacity(4).expect("构造失败");
    let mut pooled = PooledStream::new(stream, recycler.clone());
    pooled.write_u16(0xBEEF);
    let mut stream = pooled.detach();
    assert_eq!(recycler.take_events(), vec![(4, 4, false)]);
    stream.set_position(0);
    assert_eq!(stream.read_u16(), 0xBEEF);
    drop(stream);
    assert!(recycler.take_events().is_empty(), "拆出的流不应再触发回收");
}

#[test]
fn take_returns_full_zeroed_owned_stream() {
    let pool = StreamPool::new();
    {
        let mut first = pool.take(32).expect("租借失败");
        first.fill(0xAA, 32);
    }
    let second = pool.take(16).expect("租借失败");
    assert!(second.is_owned());
    assert_eq!(second.position(), 0);
    assert_eq!(second.length(), second.capacity());
    assert!(second.buffer().iter().all(|&b| b == 0), "复用区域应被清零");
}

#[test]
fn zero_size_uses_default_capacity() {
    let pool = StreamPool::with_config(StreamPoolConfig {
        default_capacity: 128,
        ..StreamPoolConfig::default()
    });
    let stream = pool.take(0).expect("租借失败");
    assert_eq!(stream.capacity(), 128);
}

#[test]
fn stats_track_lease_lifecycle() {
    let pool = StreamPool::new();
    let a = pool.take(64).expect("租借失败");
    let b = pool.take(32).expect("租借失败");
    let stats = pool.statistics();
    assert_eq!(stats.active_leases, 2);
    assert_eq!(stats.allocated_bytes, 96);
    assert_eq!(stats.available_bytes, 0);

    drop(a);
    drop(b);
    let stats = pool.statistics();
    assert_eq!(stats.active_leases, 0);
    assert_eq!(stats.available_bytes, 96);
    assert_eq!(stats.free_buffers, 2);

    assert_eq!(pool.shrink_to_fit(), 96);
    let stats = pool.statistics();
    assert_eq!(stats.allocated_bytes, 0);
    assert_eq!(stats.available_bytes, 0);
    assert_eq!(stats.free_buffers, 0);
}

#[test]
fn full_free_list_discards_returned_regions() {
    let pool = StreamPool::with_config(StreamPoolConfig {
        max_free_buffers: 1,
        ..StreamPoolConfig::default()
    });
    let a = pool.take(8).expect("租借失败");
    let b = pool.take(8).expect("租借失败");
    drop(a);
    drop(b);
    let stats = pool.statistics();
    assert_eq!(stats.free_buffers, 1);
    assert_eq!(stats.discarded_buffers, 1);
    assert_eq!(stats.allocated_bytes, 8);
}

#[test]
fn pooled_streams_follow_configured_growth() {
    let pool = StreamPool::with_config(StreamPoolConfig {
        growth: GrowthPolicy::Fixed,
        ..StreamPoolConfig::default()
    });
    let mut stream = pool.take(4).expect("租借失败");
    assert_eq!(stream.growth_policy(), GrowthPolicy::Fixed);
    assert!(stream.ensure_capacity(8).is_err());
    assert_eq!(stream.capacity(), 4);
}

#[test]
fn pool_is_shareable_across_threads() {
    let pool = StreamPool::new();
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let pool = pool.clone();
            std::thread::spawn(move || {
                let mut stream = pool.take(16).expect("租借失败");
                stream.write_u64_be(i);
                stream.set_position(0);
                stream.read_u64_be()
            })
        })
        .collect();
    for (i, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.join().expect("线程 panic"), i as u64);
    }
    assert_eq!(pool.statistics().active_leases, 0);
}

#[test]
fn config_deserializes_with_defaults() {
    let config: StreamPoolConfig =
        serde_json::from_str(r#"{ "growth": "exact" }"#).expect("反序列化失败");
    assert_eq!(config.growth, GrowthPolicy::Exact);
    assert_eq!(config.default_capacity, StreamPoolConfig::default().default_capacity);
    assert_eq!(config.max_free_buffers, 64);

    let encoded = serde_json::to_string(&GrowthPolicy::Geometric).expect("序列化失败");
    assert_eq!(encoded, r#""geometric""#);
}
