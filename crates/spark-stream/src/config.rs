//! 流与流池的配置项。
//!
//! # 模块定位（Why）
//! - `Stream` 的扩容步长、`StreamPool` 的默认容量与自由链表上限都属于部署期可调参数，
//!   统一放在此处并派生 `serde`，便于宿主从 TOML/JSON 配置中加载。
//!
//! # 契约说明（What）
//! - 所有结构均实现 `Default`；反序列化时缺失字段回落到默认值（`#[serde(default)]`）；
//! - 枚举值采用 `snake_case` 序列化，例如 `"geometric"`。

use serde::{Deserialize, Serialize};

/// 扩容策略：决定 `ensure_capacity` 在容量不足时申请多大的新区域。
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrowthPolicy {
    /// 新容量取 `max(2 * capacity, target)`，均摊复制成本。
    #[default]
    Geometric,
    /// 新容量恰好等于目标值。
    Exact,
    /// 禁止扩容，容量不足时返回 [`StreamError::InsufficientCapacity`](crate::StreamError::InsufficientCapacity)。
    Fixed,
}

impl GrowthPolicy {
    /// 计算满足 `target` 的新容量；`Fixed` 策略返回 `None`。
    ///
    /// # 前置条件
    /// - 调用方已确认 `current < target`。
    pub fn next_capacity(self, current: usize, target: usize) -> Option<usize> {
        match self {
            GrowthPolicy::Geometric => Some(current.saturating_mul(2).max(target)),
            GrowthPolicy::Exact => Some(target),
            GrowthPolicy::Fixed => None,
        }
    }
}

/// `StreamPool` 的运行参数。
///
/// - `default_capacity`：`take(0)` 时租借的容量；
/// - `max_free_buffers`：自由链表最多保留的缓冲块数量，超出部分直接释放；
/// - `growth`：租出流使用的扩容策略。
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamPoolConfig {
    pub default_capacity: usize,
    pub max_free_buffers: usize,
    pub growth: GrowthPolicy,
}

impl Default for StreamPoolConfig {
    fn default() -> Self {
        Self {
            default_capacity: 4096,
            max_free_buffers: 64,
            growth: GrowthPolicy::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geometric_growth_doubles_until_target_dominates() {
        assert_eq!(GrowthPolicy::Geometric.next_capacity(16, 20), Some(32));
        assert_eq!(GrowthPolicy::Geometric.next_capacity(16, 100), Some(100));
        assert_eq!(GrowthPolicy::Geometric.next_capacity(0, 1), Some(1));
    }

    #[test]
    fn exact_and_fixed_policies() {
        assert_eq!(GrowthPolicy::Exact.next_capacity(16, 20), Some(20));
        assert_eq!(GrowthPolicy::Fixed.next_capacity(16, 20), None);
    }

    #[test]
    fn geometric_growth_saturates_instead_of_overflowing() {
        assert_eq!(
            GrowthPolicy::Geometric.next_capacity(usize::MAX / 2 + 1, usize::MAX),
            Some(usize::MAX)
        );
    }
}
