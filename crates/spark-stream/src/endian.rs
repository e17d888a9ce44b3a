//! 定宽整数的字节序编解码。
//!
//! # 设计概要（How）
//! - 字节序定律只在 [`encode`]/[`decode`] 中实现一次：小端字节 `i` 为 `(v >> 8i) & 0xFF`，
//!   大端字节 `i` 为 `(v >> 8(w-1-i)) & 0xFF`；
//! - 八种整数类型通过 [`FixedWidth`] 映射到 `u64` 位模式，再交给上述函数处理，
//!   因此新增宽度（例如 24 位）无需复制位运算逻辑。

/// 字节序。`Little` 为流的默认（原生）字节序。
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum ByteOrder {
    #[default]
    Little,
    Big,
}

impl ByteOrder {
    /// 字段内第 `index` 个字节对应的位移量。
    #[inline]
    fn shift(self, index: usize, width: usize) -> usize {
        match self {
            ByteOrder::Little => 8 * index,
            ByteOrder::Big => 8 * (width - 1 - index),
        }
    }
}

mod sealed {
    pub trait Sealed {}
}

/// 可按定宽编码的整数类型。
///
/// - `WIDTH`：编码后的字节数；
/// - `to_bits`：取低 `WIDTH` 字节的位模式（有符号数不做符号扩展）；
/// - `from_bits`：从低 `WIDTH` 字节还原数值，有符号数按补码解释。
pub trait FixedWidth: Copy + sealed::Sealed {
    const WIDTH: usize;

    fn to_bits(self) -> u64;

    fn from_bits(bits: u64) -> Self;
}

macro_rules! impl_fixed_width {
    ($($ty:ty => $unsigned:ty),* $(,)?) => {
        $(
            impl sealed::Sealed for $ty {}

            impl FixedWidth for $ty {
                const WIDTH: usize = core::mem::size_of::<$ty>();

                #[inline]
                fn to_bits(self) -> u64 {
                    self as $unsigned as u64
                }

                #[inline]
                fn from_bits(bits: u64) -> Self {
                    bits as $unsigned as $ty
                }
            }
        )*
    };
}

impl_fixed_width!(
    u8 => u8,
    i8 => u8,
    u16 => u16,
    i16 => u16,
    u32 => u32,
    i32 => u32,
    u64 => u64,
    i64 => u64,
);

/// 将 `bits` 的低 `dst.len()` 字节按 `order` 写入 `dst`。
///
/// # 前置条件
/// - `dst.len()` 位于 `1..=8`。
#[inline]
pub fn encode(bits: u64, order: ByteOrder, dst: &mut [u8]) {
    let width = dst.len();
    debug_assert!((1..=8).contains(&width), "encode 宽度非法：{width}");
    for (index, byte) in dst.iter_mut().enumerate() {
        *byte = (bits >> order.shift(index, width)) as u8;
    }
}

/// `encode` 的逆运算：按 `order` 将 `src` 还原为位模式。
#[inline]
pub fn decode(src: &[u8], order: ByteOrder) -> u64 {
    let width = src.len();
    debug_assert!((1..=8).contains(&width), "decode 宽度非法：{width}");
    src.iter()
        .enumerate()
        .fold(0u64, |acc, (index, &byte)| acc | (u64::from(byte) << order.shift(index, width)))
}

/// 判断 `value` 能否以 `width` 字节无损表示。
#[inline]
pub(crate) fn fits_width(value: u64, width: usize) -> bool {
    width >= 8 || value >> (8 * width) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn little_endian_places_low_byte_first() {
        let mut dst = [0u8; 4];
        encode(0x1234_5678, ByteOrder::Little, &mut dst);
        assert_eq!(dst, [0x78, 0x56, 0x34, 0x12]);
        assert_eq!(decode(&dst, ByteOrder::Little), 0x1234_5678);
    }

    #[test]
    fn big_endian_places_high_byte_first() {
        let mut dst = [0u8; 3];
        encode(0x00AB_CDEF, ByteOrder::Big, &mut dst);
        assert_eq!(dst, [0xAB, 0xCD, 0xEF]);
        assert_eq!(decode(&dst, ByteOrder::Big), 0x00AB_CDEF);
    }

    #[test]
    fn signed_values_roundtrip_through_bits() {
        assert_eq!(i16::from_bits((-2i16).to_bits()), -2);
        assert_eq!((-1i8).to_bits(), 0xFF);
        assert_eq!(i64::from_bits(i64::MIN.to_bits()), i64::MIN);
    }

    #[test]
    fn width_fit_check() {
        assert!(fits_width(0xFF_FFFF, 3));
        assert!(!fits_width(0x100_0000, 3));
        assert!(fits_width(u64::MAX, 8));
    }
}
