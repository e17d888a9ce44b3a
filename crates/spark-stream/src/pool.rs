use alloc::{sync::Arc, vec::Vec};
use core::{
    ops::{Deref, DerefMut},
    sync::atomic::{AtomicU64, AtomicUsize, Ordering},
};

use spin::Mutex;

use crate::{
    config::StreamPoolConfig,
    error::Result,
    storage,
    stream::Stream,
};

/// `StreamRecycler` 描述流池在租借结束时的回收入口。
///
/// # 设计初衷（Why）
/// - 编解码热路径会反复申请同尺寸的流，回收其底层区域可以显著减少分配次数；
/// - 把回收动作收敛到 [`PooledStream`] 的 `Drop` 中，调用方无需记得归还。
///
/// # 契约定义（What）
/// - 每个 `PooledStream` 恰好触发一次 `reclaim`；
/// - 实现必须线程安全且不得 panic，否则 `Drop` 路径上的 panic 会中止进程。
pub trait StreamRecycler: Send + Sync + 'static {
    fn reclaim(&self, reclaimed: ReclaimedBuffer);
}

/// 一次回收携带的上下文。
///
/// - `leased_capacity`：租出时的容量；
/// - `capacity`：归还时的容量，租借期间扩容会使其大于 `leased_capacity`；
/// - `buffer`：可复用的区域；流被 [`PooledStream::detach`] 拆走时为 `None`。
#[derive(Debug)]
pub struct ReclaimedBuffer {
    leased_capacity: usize,
    capacity: usize,
    buffer: Option<Vec<u8>>,
}

impl ReclaimedBuffer {
    pub fn new(leased_capacity: usize, capacity: usize, buffer: Option<Vec<u8>>) -> Self {
        Self {
            leased_capacity,
            capacity,
            buffer,
        }
    }

    pub fn leased_capacity(&self) -> usize {
        self.leased_capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// 消耗结构并返回可复用的区域，若不存在则为 `None`。
    pub fn into_buffer(self) -> Option<Vec<u8>> {
        self.buffer
    }
}

/// 从池中租出的流，解引用为 [`Stream<'static>`](Stream)。
///
/// # 契约说明（What）
/// - `Drop` 时把底层区域交还给 `recycler`；
/// - [`detach`](Self::detach) 取出流并放弃回收，回收器会收到一次 `buffer == None` 的通知，
///   以便同步租约统计。
pub struct PooledStream {
    stream: Option<Stream<'static>>,
    leased_capacity: usize,
    recycler: Arc<dyn StreamRecycler>,
}

impl PooledStream {
    /// 用给定的流与回收句柄构造租约；租出容量取 `stream.capacity()`。
    pub fn new(stream: Stream<'static>, recycler: Arc<dyn StreamRecycler>) -> Self {
        Self {
            leased_capacity: stream.capacity(),
            stream: Some(stream),
            recycler,
        }
    }

    /// 取出内部流，不再归还区域。
    pub fn detach(mut self) -> Stream<'static> {
        let stream = self.take_stream();
        self.recycler.reclaim(ReclaimedBuffer::new(
            self.leased_capacity,
            stream.capacity(),
            None,
        ));
        stream
    }

    fn take_stream(&mut self) -> Stream<'static> {
        match self.stream.take() {
            Some(stream) => stream,
            None => unreachable!("PooledStream 的流只会在 detach/drop 时取出"),
        }
    }
}

impl Deref for PooledStream {
    type Target = Stream<'static>;

    fn deref(&self) -> &Self::Target {
        match &self.stream {
            Some(stream) => stream,
            None => unreachable!("PooledStream 的流只会在 detach/drop 时取出"),
        }
    }
}

impl DerefMut for PooledStream {
    fn deref_mut(&mut self) -> &mut Self::Target {
        match &mut self.stream {
            Some(stream) => stream,
            None => unreachable!("PooledStream 的流只会在 detach/drop 时取出"),
        }
    }
}

impl Drop for PooledStream {
    fn drop(&mut self) {
        if let Some(stream) = self.stream.take() {
            let capacity = stream.capacity();
            let buffer = stream.free(false);
            self.recycler.reclaim(ReclaimedBuffer::new(
                self.leased_capacity,
                capacity,
                buffer,
            ));
        }
    }
}

impl core::fmt::Debug for PooledStream {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PooledStream")
            .field("stream", &self.stream)
            .field("leased_capacity", &self.leased_capacity)
            .finish_non_exhaustive()
    }
}

/// 流池统计快照。
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PoolStats {
    /// 池分配且仍存活的字节数（租出中 + 自由链表）。
    pub allocated_bytes: usize,
    /// 自由链表中可立即复用的字节数。
    pub available_bytes: usize,
    pub active_leases: usize,
    pub free_buffers: usize,
    /// 因自由链表已满而直接释放的区域数量。
    pub discarded_buffers: u64,
}

/// `StreamPool` 基于自由链表复用流的底层区域。
///
/// # 核心机制（How）
/// - `spin::Mutex<Vec<Vec<u8>>>` 作为自由链表，租借时取第一块长度足够的区域；
/// - `PoolMetrics` 以原子计数维护 `allocated_bytes`、`available_bytes`、`active_leases` 等指标；
/// - 归还时若自由链表已达 `max_free_buffers`，区域直接释放并计入 `discarded_buffers`。
///
/// # 契约说明（What）
/// - 克隆代价为一次 `Arc` 计数，所有克隆共享同一自由链表；
/// - `take` 返回的流：自有存储、内容清零、`position == 0`、`length == capacity`，
///   扩容策略取自 [`StreamPoolConfig::growth`]。
#[derive(Clone)]
pub struct StreamPool {
    inner: Arc<PoolInner>,
}

impl Default for StreamPool {
    fn default() -> Self {
        Self::with_config(StreamPoolConfig::default())
    }
}

impl StreamPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: StreamPoolConfig) -> Self {
        Self {
            inner: Arc::new(PoolInner::new(config)),
        }
    }

    pub fn config(&self) -> &StreamPoolConfig {
        &self.inner.config
    }

    /// 租借至少 `size` 字节的流；`size == 0` 时使用 `default_capacity`。
    ///
    /// # 错误
    /// - 需要新分配且分配失败时返回 [`StreamError::AllocationFailed`](crate::StreamError::AllocationFailed)。
    pub fn take(&self, size: usize) -> Result<PooledStream> {
        let size = if size == 0 {
            self.inner.config.default_capacity
        } else {
            size
        };
        let region = self.inner.acquire_buffer(size)?;
        let stream = Stream::from_vec(region).with_growth_policy(self.inner.config.growth);
        let recycler: Arc<dyn StreamRecycler> = self.inner.clone();
        Ok(PooledStream::new(stream, recycler))
    }

    /// 清空自由链表，返回释放的字节数。
    pub fn shrink_to_fit(&self) -> usize {
        self.inner.shrink_free_list()
    }

    pub fn statistics(&self) -> PoolStats {
        self.inner.snapshot()
    }
}

impl core::fmt::Debug for StreamPool {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("StreamPool")
            .field("config", &self.inner.config)
            .field("stats", &self.inner.snapshot())
            .finish()
    }
}

struct PoolInner {
    config: StreamPoolConfig,
    free_list: Mutex<Vec<Vec<u8>>>,
    metrics: PoolMetrics,
}

impl PoolInner {
    fn new(config: StreamPoolConfig) -> Self {
        Self {
            config,
            free_list: Mutex::new(Vec::new()),
            metrics: PoolMetrics::default(),
        }
    }

    /// 从自由链表或堆上获取一块长度不小于 `min_capacity` 的零值区域。
    fn acquire_buffer(&self, min_capacity: usize) -> Result<Vec<u8>> {
        let reused = {
            let mut list = self.free_list.lock();
            let found = list.iter().position(|region| region.len() >= min_capacity);
            found.map(|index| list.swap_remove(index))
        };

        let region = match reused {
            Some(mut region) => {
                self.metrics.decrease_available(region.len());
                region.fill(0);
                region
            }
            None => {
                let region = storage::allocate_zeroed(min_capacity)?;
                self.metrics.increase_on_new_allocation(region.len());
                region
            }
        };
        self.metrics.increase_active_leases();
        Ok(region)
    }

    fn shrink_free_list(&self) -> usize {
        let mut list = self.free_list.lock();
        let reclaimed: usize = list.iter().map(Vec::len).sum();
        list.clear();
        self.metrics.decrease_available(reclaimed);
        self.metrics.decrease_on_loss(reclaimed);
        reclaimed
    }

    fn snapshot(&self) -> PoolStats {
        let free_buffers = self.free_list.lock().len();
        PoolStats {
            allocated_bytes: self.metrics.allocated_bytes.load(Ordering::Relaxed),
            available_bytes: self.metrics.available_bytes.load(Ordering::Relaxed),
            active_leases: self.metrics.active_leases.load(Ordering::Relaxed),
            free_buffers,
            discarded_buffers: self.metrics.discarded_buffers.load(Ordering::Relaxed),
        }
    }
}

impl StreamRecycler for PoolInner {
    fn reclaim(&self, reclaimed: ReclaimedBuffer) {
        self.metrics.decrease_active_leases();
        let leased = reclaimed.leased_capacity();
        let capacity = reclaimed.capacity();
        if capacity > leased {
            self.metrics.increase_on_new_allocation(capacity - leased);
        }

        let Some(region) = reclaimed.into_buffer() else {
            self.metrics.decrease_on_loss(capacity);
            return;
        };

        let mut list = self.free_list.lock();
        if list.len() < self.config.max_free_buffers {
            self.metrics.increase_available(region.len());
            list.push(region);
        } else {
            drop(list);
            self.metrics.decrease_on_loss(region.len());
            self.metrics.discarded_buffers.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(
                capacity = region.len(),
                max_free_buffers = self.config.max_free_buffers,
                "stream pool free list full, buffer discarded"
            );
        }
    }
}

#[derive(Default)]
struct PoolMetrics {
    allocated_bytes: AtomicUsize,
    available_bytes: AtomicUsize,
    active_leases: AtomicUsize,
    discarded_buffers: AtomicU64,
}

impl PoolMetrics {
    fn increase_on_new_allocation(&self, capacity: usize) {
        self.allocated_bytes.fetch_add(capacity, Ordering::Relaxed);
    }

    fn increase_available(&self, capacity: usize) {
        self.available_bytes.fetch_add(capacity, Ordering::Relaxed);
    }

    fn decrease_available(&self, capacity: usize) {
        saturating_sub(&self.available_bytes, capacity);
    }

    fn decrease_on_loss(&self, capacity: usize) {
        saturating_sub(&self.allocated_bytes, capacity);
    }

    fn increase_active_leases(&self) {
        self.active_leases.fetch_add(1, Ordering::Relaxed);
    }

    fn decrease_active_leases(&self) {
        saturating_sub(&self.active_leases, 1);
    }
}

fn saturating_sub(target: &AtomicUsize, value: usize) {
    let _ = target.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |current| {
        Some(current.saturating_sub(value))
    });
}
