//! # error 模块说明
//!
//! ## 角色定位（Why）
//! - 集中定义 `Stream` 与 `StreamPool` 对外暴露的**可恢复**错误：内存耗尽、容量不足、数据不足等；
//! - 游标越界、越过 `length` 读取等属于调用方违约，直接 panic，不在此处建模。
//!
//! ## 设计要求（What）
//! - 所有变体派生 [`thiserror::Error`]，在 `no_std` 下同样可用（`thiserror` 关闭默认特性）；
//! - 变体携带触发时的数值上下文，便于日志与断言直接比对。

use thiserror::Error;

/// `spark-stream` 统一的结果别名。
pub type Result<T, E = StreamError> = core::result::Result<T, E>;

/// 字节流操作的可恢复错误。
///
/// # 契约（What）
/// - 返回错误时，原有 `Stream` 保持调用前的状态，可继续使用；
/// - 所有变体均满足 `Send + Sync + 'static`，并实现 `Clone + Eq` 以便测试断言。
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum StreamError {
    /// 既未提供缓冲也未指定尺寸，无法构造有意义的流。
    #[error("stream requires either a caller buffer or a non-zero size")]
    EmptyStream,

    /// 调用方声明的尺寸超出了实际传入的缓冲。
    #[error("requested size {size} exceeds the supplied buffer of {available} bytes")]
    SizeExceedsBuffer { size: usize, available: usize },

    /// 分配器拒绝了申请。
    #[error("failed to allocate {requested} bytes of stream storage")]
    AllocationFailed { requested: usize },

    /// 目标容量的计算溢出了 `usize`。
    #[error("stream capacity overflow: position {position} + {additional} bytes")]
    CapacityOverflow { position: usize, additional: usize },

    /// 从游标到 `length` 之间的可读字节不足。
    #[error("stream has {remaining} readable bytes but {required} are required")]
    InsufficientLength { required: usize, remaining: usize },

    /// 容量不足且当前增长策略禁止扩容。
    #[error("stream capacity {capacity} cannot grow to {required} under a fixed growth policy")]
    InsufficientCapacity { required: usize, capacity: usize },

    /// 读取到的 UTF-16 序列包含未配对的代理项。
    #[error("invalid UTF-16 sequence at code unit {unit}")]
    InvalidUtf16 { unit: usize },
}
