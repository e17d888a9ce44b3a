//! 字节区域的所有权模型。
//!
//! # 设计动机（Why）
//! - “借用调用方缓冲”与“自行分配”两种模式以和类型 [`Storage`] 表达，
//!   释放行为由模式匹配决定，不存在提升后忘记翻转标志位的可能；
//! - 提升（Promotion）是单向的：`Borrowed` 在首次超额扩容时变为 `Owned`，之后再无回退路径。
//!
//! # 契约说明（What）
//! - 两种模式下整个区域均可寻址，`capacity` 即切片/向量长度；
//! - 自行分配的字节一律零初始化；
//! - 任何失败路径都不修改既有区域。

use alloc::vec::Vec;

use crate::{
    config::GrowthPolicy,
    error::{Result, StreamError},
};

/// 对外可见的所有权模式。
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Ownership {
    /// 区域由调用方提供并保持其所有权，流不会释放它。
    Borrowed,
    /// 区域由流分配，随流一同释放。
    Owned,
}

/// 流背后的字节区域。
#[derive(Debug)]
pub(crate) enum Storage<'a> {
    Borrowed(&'a mut [u8]),
    Owned(Vec<u8>),
}

impl<'a> Storage<'a> {
    pub(crate) fn ownership(&self) -> Ownership {
        match self {
            Storage::Borrowed(_) => Ownership::Borrowed,
            Storage::Owned(_) => Ownership::Owned,
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.as_slice().len()
    }

    pub(crate) fn as_slice(&self) -> &[u8] {
        match self {
            Storage::Borrowed(region) => region,
            Storage::Owned(region) => region.as_slice(),
        }
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [u8] {
        match self {
            Storage::Borrowed(region) => region,
            Storage::Owned(region) => region.as_mut_slice(),
        }
    }

    /// 确保容量不小于 `target`。
    ///
    /// # 执行逻辑（How）
    /// 1. 已满足时直接返回；
    /// 2. 由 `policy` 计算新容量，`Fixed` 策略直接报错；
    /// 3. `Borrowed`：分配新区域、复制整个旧区域并切换为 `Owned`；
    /// 4. `Owned`：`try_reserve_exact` 原地扩展并以零填充新增部分。
    pub(crate) fn grow(&mut self, target: usize, policy: GrowthPolicy) -> Result<()> {
        let current = self.capacity();
        if current >= target {
            return Ok(());
        }
        let new_capacity = policy.next_capacity(current, target).ok_or(
            StreamError::InsufficientCapacity {
                required: target,
                capacity: current,
            },
        )?;

        match self {
            Storage::Borrowed(region) => {
                let mut owned = allocate_zeroed(new_capacity)?;
                owned[..current].copy_from_slice(&region[..]);
                *self = Storage::Owned(owned);
                tracing::debug!(
                    old_capacity = current,
                    new_capacity,
                    "borrowed stream storage promoted to owned"
                );
            }
            Storage::Owned(region) => {
                region
                    .try_reserve_exact(new_capacity - current)
                    .map_err(|_| allocation_failed(new_capacity))?;
                region.resize(new_capacity, 0);
                tracing::trace!(old_capacity = current, new_capacity, "owned stream storage grown");
            }
        }
        Ok(())
    }

    /// 拆出自有区域；借用区域返回 `None`。
    pub(crate) fn into_owned(self) -> Option<Vec<u8>> {
        match self {
            Storage::Borrowed(_) => None,
            Storage::Owned(region) => Some(region),
        }
    }
}

/// 以可失败的方式分配 `size` 个零字节。
pub(crate) fn allocate_zeroed(size: usize) -> Result<Vec<u8>> {
    let mut region = Vec::new();
    region
        .try_reserve_exact(size)
        .map_err(|_| allocation_failed(size))?;
    region.resize(size, 0);
    Ok(region)
}

fn allocation_failed(requested: usize) -> StreamError {
    tracing::warn!(requested, "stream storage allocation failed");
    StreamError::AllocationFailed { requested }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn promotion_copies_whole_borrowed_region() {
        let mut backing = [1u8, 2, 3, 4];
        let mut storage = Storage::Borrowed(&mut backing);
        storage.grow(6, GrowthPolicy::Exact).expect("扩容应成功");
        assert_eq!(storage.ownership(), Ownership::Owned);
        assert_eq!(storage.as_slice(), &[1, 2, 3, 4, 0, 0]);
    }

    #[test]
    fn owned_growth_never_shrinks() {
        let mut storage = Storage::Owned(allocate_zeroed(8).expect("分配失败"));
        storage.grow(4, GrowthPolicy::Exact).expect("无需扩容");
        assert_eq!(storage.capacity(), 8);
        storage.grow(9, GrowthPolicy::Geometric).expect("扩容应成功");
        assert_eq!(storage.capacity(), 16);
    }

    #[test]
    fn fixed_policy_refuses_growth_and_keeps_mode() {
        let mut backing = [0u8; 2];
        let mut storage = Storage::Borrowed(&mut backing);
        let err = storage.grow(3, GrowthPolicy::Fixed).unwrap_err();
        assert_eq!(
            err,
            StreamError::InsufficientCapacity {
                required: 3,
                capacity: 2
            }
        );
        assert_eq!(storage.ownership(), Ownership::Borrowed);
    }

    #[test]
    fn oversized_allocation_reports_failure() {
        let err = allocate_zeroed(usize::MAX).unwrap_err();
        assert_eq!(
            err,
            StreamError::AllocationFailed {
                requested: usize::MAX
            }
        );
    }
}
