//! 按类型命名的定宽访问器。
//!
//! 所有方法均委派给 [`Stream::peek_as`]/[`Stream::read_as`]/[`Stream::write_as`]，
//! 本模块只负责生成调用端惯用的名字：无后缀为小端，`_be` 为大端；
//! `peek_get_*`/`get_*` 分别是 `peek_*`/`read_*` 的表达式风格别名。
//! 单字节类型的 `_be` 版本与小端版本等价，仅为调用端对称而保留。

use crate::{endian::ByteOrder, stream::Stream};

macro_rules! typed_accessors {
    ($(
        $ty:ty => [
            $peek:ident, $peek_be:ident,
            $read:ident, $read_be:ident,
            $peek_get:ident, $peek_get_be:ident,
            $get:ident, $get_be:ident,
            $write:ident, $write_be:ident $(,)?
        ]
    );* $(;)?) => {
        impl Stream<'_> {
            $(
                #[doc = concat!("小端读取 `", stringify!($ty), "`，不移动游标。")]
                #[inline]
                pub fn $peek(&self) -> $ty {
                    self.peek_as::<$ty>(ByteOrder::Little)
                }

                #[doc = concat!("大端读取 `", stringify!($ty), "`，不移动游标。")]
                #[inline]
                pub fn $peek_be(&self) -> $ty {
                    self.peek_as::<$ty>(ByteOrder::Big)
                }

                #[doc = concat!("小端读取 `", stringify!($ty), "` 并前移游标。")]
                #[inline]
                pub fn $read(&mut self) -> $ty {
                    self.read_as::<$ty>(ByteOrder::Little)
                }

                #[doc = concat!("大端读取 `", stringify!($ty), "` 并前移游标。")]
                #[inline]
                pub fn $read_be(&mut self) -> $ty {
                    self.read_as::<$ty>(ByteOrder::Big)
                }

                #[inline]
                pub fn $peek_get(&self) -> $ty {
                    self.$peek()
                }

                #[inline]
                pub fn $peek_get_be(&self) -> $ty {
                    self.$peek_be()
                }

                #[inline]
                pub fn $get(&mut self) -> $ty {
                    self.$read()
                }

                #[inline]
                pub fn $get_be(&mut self) -> $ty {
                    self.$read_be()
                }

                #[doc = concat!("小端写入 `", stringify!($ty), "` 并前移游标；容量不足时 panic。")]
                #[inline]
                pub fn $write(&mut self, value: $ty) {
                    self.write_as::<$ty>(value, ByteOrder::Little)
                }

                #[doc = concat!("大端写入 `", stringify!($ty), "` 并前移游标；容量不足时 panic。")]
                #[inline]
                pub fn $write_be(&mut self, value: $ty) {
                    self.write_as::<$ty>(value, ByteOrder::Big)
                }
            )*
        }
    };
}

typed_accessors! {
    u8 => [
        peek_u8, peek_u8_be, read_u8, read_u8_be, peek_get_u8, peek_get_u8_be,
        get_u8, get_u8_be, write_u8, write_u8_be,
    ];
    i8 => [
        peek_i8, peek_i8_be, read_i8, read_i8_be, peek_get_i8, peek_get_i8_be,
        get_i8, get_i8_be, write_i8, write_i8_be,
    ];
    u16 => [
        peek_u16, peek_u16_be, read_u16, read_u16_be, peek_get_u16, peek_get_u16_be,
        get_u16, get_u16_be, write_u16, write_u16_be,
    ];
    i16 => [
        peek_i16, peek_i16_be, read_i16, read_i16_be, peek_get_i16, peek_get_i16_be,
        get_i16, get_i16_be, write_i16, write_i16_be,
    ];
    u32 => [
        peek_u32, peek_u32_be, read_u32, read_u32_be, peek_get_u32, peek_get_u32_be,
        get_u32, get_u32_be, write_u32, write_u32_be,
    ];
    i32 => [
        peek_i32, peek_i32_be, read_i32, read_i32_be, peek_get_i32, peek_get_i32_be,
        get_i32, get_i32_be, write_i32, write_i32_be,
    ];
    u64 => [
        peek_u64, peek_u64_be, read_u64, read_u64_be, peek_get_u64, peek_get_u64_be,
        get_u64, get_u64_be, write_u64, write_u64_be,
    ];
    i64 => [
        peek_i64, peek_i64_be, read_i64, read_i64_be, peek_get_i64, peek_get_i64_be,
        get_i64, get_i64_be, write_i64, write_i64_be,
    ];
}

const U24_WIDTH: usize = 3;

impl Stream<'_> {
    pub fn peek_u24(&self) -> u32 {
        self.peek_uint(U24_WIDTH, ByteOrder::Little) as u32
    }

    pub fn peek_u24_be(&self) -> u32 {
        self.peek_uint(U24_WIDTH, ByteOrder::Big) as u32
    }

    pub fn read_u24(&mut self) -> u32 {
        self.read_uint(U24_WIDTH, ByteOrder::Little) as u32
    }

    pub fn read_u24_be(&mut self) -> u32 {
        self.read_uint(U24_WIDTH, ByteOrder::Big) as u32
    }

    /// 写入 24 位无符号整数；`value >= 1 << 24` 时 panic。
    pub fn write_u24(&mut self, value: u32) {
        self.write_uint(u64::from(value), U24_WIDTH, ByteOrder::Little)
    }

    pub fn write_u24_be(&mut self, value: u32) {
        self.write_uint(u64::from(value), U24_WIDTH, ByteOrder::Big)
    }

    pub fn seek_u8(&mut self) {
        self.seek(1)
    }

    pub fn seek_u16(&mut self) {
        self.seek(2)
    }

    pub fn seek_u32(&mut self) {
        self.seek(4)
    }

    pub fn seek_u64(&mut self) {
        self.seek(8)
    }

    pub fn rewind_u8(&mut self) {
        self.rewind(1)
    }

    pub fn rewind_u16(&mut self) {
        self.rewind(2)
    }

    pub fn rewind_u32(&mut self) {
        self.rewind(4)
    }

    pub fn rewind_u64(&mut self) {
        self.rewind(8)
    }
}
