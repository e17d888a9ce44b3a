use alloc::vec::Vec;

use bytes::Bytes;

use crate::{
    config::GrowthPolicy,
    endian::{self, ByteOrder, FixedWidth},
    error::{Result, StreamError},
    storage::{self, Ownership, Storage},
};

/// `Stream` 是面向协议编解码的定长字节流游标。
///
/// # 设计动机（Why）
/// - 协议编码器需要在一块连续内存上按游标顺序写入定宽整数与原始字节，
///   解码器则需要在同一抽象上带边界地回读；`Stream` 为二者提供统一底座。
/// - “已预留”与“已写入有效内容”被刻意解耦：`capacity` 描述可寻址区域，
///   `length` 只在显式 [`seal_length`](Self::seal_length) 时更新。
///
/// # 结构设计（How）
/// - `storage`：借用调用方区域或自有 `Vec<u8>`，见 [`Ownership`]；
/// - `length`：封口长度，读取操作以此为界；
/// - `position`：下一次读写发生的偏移量；
/// - `growth`：容量不足时的扩容策略。
///
/// # 契约说明（What）
/// - 始终满足 `position <= capacity` 与 `length <= capacity`；
/// - 读取（peek/read/get）要求 `position + width <= length`，写入要求 `position + width <= capacity`，
///   违反即 panic，绝不截断或回绕；
/// - 仅 [`ensure_capacity`](Self::ensure_capacity) 系列会改变容量，写入本身不会隐式扩容。
///
/// # 风险提示（Trade-offs）
/// - 写入可以把游标推过 `length`，此时 [`remaining_length`](Self::remaining_length) 饱和为 0，
///   调用方需在写入结束后 `seal_length` 才能读回这些字节。
#[derive(Debug)]
pub struct Stream<'a> {
    storage: Storage<'a>,
    length: usize,
    position: usize,
    growth: GrowthPolicy,
}

impl<'a> Stream<'a> {
    /// 创建流。
    ///
    /// # 参数
    /// - `buffer`：调用方区域；为 `Some` 时借用其前 `size` 字节；
    /// - `size`：容量，同时作为初始 `length`。
    ///
    /// # 错误
    /// - `None` 且 `size == 0`：[`StreamError::EmptyStream`]；
    /// - `size` 超出 `buffer` 长度：[`StreamError::SizeExceedsBuffer`]；
    /// - 分配失败：[`StreamError::AllocationFailed`]。
    ///
    /// # 后置条件
    /// - `capacity == length == size`，`position == 0`。
    pub fn new(buffer: Option<&'a mut [u8]>, size: usize) -> Result<Self> {
        let storage = match buffer {
            Some(region) => {
                let available = region.len();
                if size > available {
                    return Err(StreamError::SizeExceedsBuffer { size, available });
                }
                Storage::Borrowed(&mut region[..size])
            }
            None if size == 0 => return Err(StreamError::EmptyStream),
            None => Storage::Owned(storage::allocate_zeroed(size)?),
        };
        Ok(Self::from_storage(storage))
    }

    /// 在调用方区域上就地绑定一个流，不做任何分配，也不会失败。
    ///
    /// 与 `new(Some(region), region.len())` 行为一致；首次超额扩容时同样会被提升为自有存储。
    pub fn static_init(region: &'a mut [u8]) -> Self {
        Self::from_storage(Storage::Borrowed(region))
    }

    /// 分配 `size` 字节的自有流，等价于 `new(None, size)`。
    pub fn with_capacity(size: usize) -> Result<Self> {
        Self::new(None, size)
    }

    /// 接管 `Vec<u8>` 作为自有存储，`capacity == length == region.len()`。
    pub fn from_vec(region: Vec<u8>) -> Self {
        Self::from_storage(Storage::Owned(region))
    }

    /// 替换扩容策略。
    pub fn with_growth_policy(mut self, growth: GrowthPolicy) -> Self {
        self.growth = growth;
        self
    }

    fn from_storage(storage: Storage<'a>) -> Self {
        let length = storage.capacity();
        Self {
            storage,
            length,
            position: 0,
            growth: GrowthPolicy::default(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.storage.capacity()
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn ownership(&self) -> Ownership {
        self.storage.ownership()
    }

    pub fn is_owned(&self) -> bool {
        self.ownership() == Ownership::Owned
    }

    /// 当前扩容策略；池化流取自 [`StreamPoolConfig::growth`](crate::StreamPoolConfig::growth)。
    pub fn growth_policy(&self) -> GrowthPolicy {
        self.growth
    }

    /// 游标到封口长度之间的可读字节数；游标越过 `length` 时为 0。
    pub fn remaining_length(&self) -> usize {
        self.length.saturating_sub(self.position)
    }

    /// 游标到容量末尾之间的可写字节数。
    pub fn remaining_capacity(&self) -> usize {
        self.capacity() - self.position
    }

    //=== 容量管理 ===//

    /// 确保 `capacity >= target`。
    ///
    /// # 执行逻辑（How）
    /// - 已满足时不做任何事；
    /// - 借用区域会被提升为自有区域，原区域的全部字节按原偏移复制；
    /// - 自有区域原地扩展，只增不减。
    ///
    /// # 错误
    /// - 分配失败或策略为 [`GrowthPolicy::Fixed`] 时返回错误，流保持调用前状态。
    pub fn ensure_capacity(&mut self, target: usize) -> Result<()> {
        self.storage.grow(target, self.growth)
    }

    /// 确保从当前游标起至少还能写入 `additional` 字节。
    pub fn ensure_remaining_capacity(&mut self, additional: usize) -> Result<()> {
        let target = self.position.checked_add(additional).ok_or(
            StreamError::CapacityOverflow {
                position: self.position,
                additional,
            },
        )?;
        self.ensure_capacity(target)
    }

    //=== 游标与长度 ===//

    /// 设置游标。`position > capacity` 属于调用方违约，直接 panic。
    pub fn set_position(&mut self, position: usize) {
        assert!(
            position <= self.capacity(),
            "Stream::set_position 越界：{position} > 容量 {}",
            self.capacity()
        );
        self.position = position;
    }

    /// 直接设置封口长度。`length > capacity` 时 panic。
    pub fn set_length(&mut self, length: usize) {
        assert!(
            length <= self.capacity(),
            "Stream::set_length 越界：{length} > 容量 {}",
            self.capacity()
        );
        self.length = length;
    }

    /// 封口：`length = position`，宣告此前写入的内容均为有效数据。
    pub fn seal_length(&mut self) {
        self.length = self.position;
    }

    /// 游标前移 `n` 字节，不得越过容量。
    pub fn seek(&mut self, n: usize) {
        let target = self.position.checked_add(n);
        match target {
            Some(position) if position <= self.capacity() => self.position = position,
            _ => panic!(
                "Stream::seek 越界：位置 {} 前移 {n} 超出容量 {}",
                self.position,
                self.capacity()
            ),
        }
    }

    /// 游标后退 `n` 字节，不得越过起点。
    pub fn rewind(&mut self, n: usize) {
        assert!(
            n <= self.position,
            "Stream::rewind 越界：位置 {} 无法后退 {n}",
            self.position
        );
        self.position -= n;
    }

    /// 带检查的前移：只允许在封口长度内移动，越界时返回错误而非 panic。
    pub fn safe_seek(&mut self, n: usize) -> Result<()> {
        self.require_length(n)?;
        self.position += n;
        Ok(())
    }

    /// 校验可读字节数是否满足 `needed`。
    pub fn require_length(&self, needed: usize) -> Result<()> {
        let remaining = self.remaining_length();
        if remaining < needed {
            return Err(StreamError::InsufficientLength {
                required: needed,
                remaining,
            });
        }
        Ok(())
    }

    /// 校验可读字节数，不足时输出一条 `warn` 级别的诊断事件并返回 `false`。
    pub fn check_and_log_required_length(&self, needed: usize) -> bool {
        let remaining = self.remaining_length();
        if remaining >= needed {
            return true;
        }
        tracing::warn!(
            needed,
            remaining,
            capacity = self.capacity(),
            position = self.position,
            "stream too short for required length"
        );
        false
    }

    /// 校验可写字节数，不足时输出一条 `warn` 级别的诊断事件并返回 `false`。
    pub fn check_and_log_required_capacity(&self, needed: usize) -> bool {
        let remaining = self.remaining_capacity();
        if remaining >= needed {
            return true;
        }
        tracing::warn!(
            needed,
            remaining,
            capacity = self.capacity(),
            position = self.position,
            "stream capacity too small for required write"
        );
        false
    }

    /// 计算读取 `n` 字节的终点；越过封口长度即 panic。
    #[inline]
    fn readable_end(&self, n: usize, op: &'static str) -> usize {
        match self.position.checked_add(n) {
            Some(end) if end <= self.length => end,
            _ => panic!(
                "Stream::{op} 越界：位置 {} 读取 {n} 字节超出长度 {}",
                self.position, self.length
            ),
        }
    }

    /// 计算写入 `n` 字节的终点；越过容量即 panic。
    #[inline]
    fn writable_end(&self, n: usize, op: &'static str) -> usize {
        match self.position.checked_add(n) {
            Some(end) if end <= self.capacity() => end,
            _ => panic!(
                "Stream::{op} 越界：位置 {} 写入 {n} 字节超出容量 {}",
                self.position,
                self.capacity()
            ),
        }
    }

    //=== 定宽整数 ===//

    /// 按 `order` 读取 `width` 字节的无符号整数，不移动游标。`width` 取值 `1..=8`。
    pub fn peek_uint(&self, width: usize, order: ByteOrder) -> u64 {
        assert!((1..=8).contains(&width), "Stream::peek_uint 宽度非法：{width}");
        let end = self.readable_end(width, "peek_uint");
        endian::decode(&self.storage.as_slice()[self.position..end], order)
    }

    /// 同 [`peek_uint`](Self::peek_uint)，读取后游标前移 `width`。
    pub fn read_uint(&mut self, width: usize, order: ByteOrder) -> u64 {
        let value = self.peek_uint(width, order);
        self.position += width;
        value
    }

    /// 以 `width` 字节按 `order` 写入 `value` 并前移游标；`value` 超出该宽度时 panic。
    pub fn write_uint(&mut self, value: u64, width: usize, order: ByteOrder) {
        assert!((1..=8).contains(&width), "Stream::write_uint 宽度非法：{width}");
        assert!(
            endian::fits_width(value, width),
            "Stream::write_uint 数值 {value:#x} 超出 {width} 字节"
        );
        let start = self.position;
        let end = self.writable_end(width, "write_uint");
        endian::encode(value, order, &mut self.storage.as_mut_slice()[start..end]);
        self.position = end;
    }

    pub fn peek_as<T: FixedWidth>(&self, order: ByteOrder) -> T {
        T::from_bits(self.peek_uint(T::WIDTH, order))
    }

    pub fn read_as<T: FixedWidth>(&mut self, order: ByteOrder) -> T {
        T::from_bits(self.read_uint(T::WIDTH, order))
    }

    pub fn write_as<T: FixedWidth>(&mut self, value: T, order: ByteOrder) {
        self.write_uint(value.to_bits(), T::WIDTH, order);
    }

    //=== 批量操作 ===//

    /// 写入 `n` 个零字节并前移游标。
    pub fn zero(&mut self, n: usize) {
        self.fill(0, n);
    }

    /// 写入 `n` 个 `value` 并前移游标。
    pub fn fill(&mut self, value: u8, n: usize) {
        let start = self.position;
        let end = self.writable_end(n, "fill");
        self.storage.as_mut_slice()[start..end].fill(value);
        self.position = end;
    }

    /// 写入整段字节并前移游标。
    pub fn write_bytes(&mut self, data: &[u8]) {
        let start = self.position;
        let end = self.writable_end(data.len(), "write_bytes");
        self.storage.as_mut_slice()[start..end].copy_from_slice(data);
        self.position = end;
    }

    /// 读满 `out` 并前移游标。
    pub fn read_bytes(&mut self, out: &mut [u8]) {
        self.peek_bytes(out);
        self.position += out.len();
    }

    /// 读满 `out`，不移动游标。
    pub fn peek_bytes(&self, out: &mut [u8]) {
        let end = self.readable_end(out.len(), "peek_bytes");
        out.copy_from_slice(&self.storage.as_slice()[self.position..end]);
    }

    /// 读取 `n` 字节为 [`Bytes`] 并前移游标。
    pub fn copy_to_bytes(&mut self, n: usize) -> Bytes {
        let end = self.readable_end(n, "copy_to_bytes");
        let bytes = Bytes::copy_from_slice(&self.storage.as_slice()[self.position..end]);
        self.position = end;
        bytes
    }

    /// 从 `source` 当前游标复制 `n` 字节到 `dest` 当前游标，两侧游标同时前移 `n`。
    ///
    /// # 契约说明（What）
    /// - `source` 需至少有 `n` 字节可读（以其 `length` 为界），`dest` 需至少有 `n` 字节可写；
    /// - 两侧的 `length` 均不受影响。
    pub fn copy(source: &mut Stream<'_>, dest: &mut Stream<'_>, n: usize) {
        let src_end = source.readable_end(n, "copy");
        let dst_start = dest.position;
        let dst_end = dest.writable_end(n, "copy");
        dest.storage.as_mut_slice()[dst_start..dst_end]
            .copy_from_slice(&source.storage.as_slice()[source.position..src_end]);
        source.position = src_end;
        dest.position = dst_end;
    }

    /// 将整个区域清零；游标与长度保持不变。
    pub fn clear(&mut self) {
        self.storage.as_mut_slice().fill(0);
    }

    //=== 视图 ===//

    /// 整个可寻址区域（`[0, capacity)`）。
    pub fn buffer(&self) -> &[u8] {
        self.storage.as_slice()
    }

    pub fn buffer_mut(&mut self) -> &mut [u8] {
        self.storage.as_mut_slice()
    }

    /// 从游标到容量末尾的区域。
    pub fn pointer(&self) -> &[u8] {
        &self.storage.as_slice()[self.position..]
    }

    /// 已封口的内容（`[0, length)`）。
    pub fn sealed(&self) -> &[u8] {
        &self.storage.as_slice()[..self.length]
    }

    //=== 释放 ===//

    /// 冻结为只读 [`Bytes`]，内容为 `[0, length)`。
    ///
    /// 自有存储直接移交所有权，借用存储则复制一份。
    pub fn freeze(self) -> Bytes {
        let length = self.length;
        match self.storage {
            Storage::Owned(mut region) => {
                region.truncate(length);
                Bytes::from(region)
            }
            Storage::Borrowed(region) => Bytes::copy_from_slice(&region[..length]),
        }
    }

    /// 销毁流。
    ///
    /// # 契约说明（What）
    /// - 自有存储且 `release_buffer == true`：区域随之释放，返回 `None`；
    /// - 自有存储且 `release_buffer == false`：区域被拆出并交还调用方；
    /// - 借用存储：无论参数如何都不会释放调用方内存，返回 `None`。
    pub fn free(self, release_buffer: bool) -> Option<Vec<u8>> {
        let region = self.storage.into_owned();
        if release_buffer { None } else { region }
    }
}
