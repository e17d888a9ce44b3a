#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]

//! `spark-stream` 提供协议编解码共用的字节流游标 [`Stream`] 与流池 [`StreamPool`]。
//!
//! # 模块定位（Why）
//! - 各协议编码器/解码器都需要在连续内存上按游标读写定宽整数与原始字节，
//!   本 crate 把这一底座收敛为单一实体，避免各 codec 各自维护偏移量与字节序逻辑；
//! - 不解释任何协议语义，只负责尺寸、游标与字节序。
//!
//! # 设计概要（How）
//! - `storage`：借用/自有两种所有权以和类型表达，借用区域在首次超额扩容时单向提升为自有区域；
//! - `endian`：字节序定律只实现一次，八种整数类型经 `FixedWidth` 复用；
//! - `stream` + `typed`：游标、长度、容量控制以及 `peek_*`/`read_*`/`get_*`/`write_*` 访问器；
//! - `pool`：以自由链表复用流的底层区域，租约在 `Drop` 时自动归还；
//! - `config`：扩容策略与流池参数，支持 `serde` 反序列化。
//!
//! # 错误与诊断（What）
//! - 内存耗尽等可恢复错误以 [`StreamError`] 返回；游标越界、越过 `length` 读取等违约直接 panic；
//! - 诊断事件经 `tracing` 门面输出，本 crate 不安装任何 Subscriber。
//!
//! ```
//! use spark_stream::Stream;
//!
//! let mut stream = Stream::with_capacity(16).expect("分配失败");
//! stream.write_u16_be(0xCAB1);
//! stream.write_u32(7);
//! stream.seal_length();
//! stream.set_position(0);
//! assert_eq!(stream.read_u16_be(), 0xCAB1);
//! assert_eq!(stream.read_u32(), 7);
//! assert_eq!(stream.remaining_length(), 0);
//! ```

// 存储与流池都建立在堆分配之上，`no_std` 下同样需要 `alloc`。
extern crate alloc;

pub mod config;
pub mod endian;
mod error;
pub mod pool;
mod storage;
mod stream;
mod typed;
mod utf16;

pub use config::{GrowthPolicy, StreamPoolConfig};
pub use endian::{ByteOrder, FixedWidth};
pub use error::{Result, StreamError};
pub use pool::{PoolStats, PooledStream, ReclaimedBuffer, StreamPool, StreamRecycler};
pub use storage::Ownership;
pub use stream::Stream;
pub use utf16::utf16_len;
