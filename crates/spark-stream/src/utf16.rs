//! UTF-16LE 字符串读写。
//!
//! 许多二进制协议以 UTF-16LE 码元承载文本；这里在 `Stream` 上提供对称的写入与读取，
//! 读取端对未配对代理项返回 [`StreamError::InvalidUtf16`]，不做替换字符降级。

use alloc::{string::String, vec::Vec};

use crate::{
    error::{Result, StreamError},
    stream::Stream,
};

/// `text` 编码为 UTF-16 后的码元数量。
pub fn utf16_len(text: &str) -> usize {
    text.encode_utf16().count()
}

impl Stream<'_> {
    /// 以 UTF-16LE 写入 `text`（不含终止符），返回写入的码元数。
    ///
    /// # 前置条件
    /// - 剩余容量不少于 `2 * utf16_len(text)` 字节，否则 panic 且不写入任何字节。
    pub fn write_utf16_str(&mut self, text: &str) -> usize {
        let units = utf16_len(text);
        assert!(
            units.saturating_mul(2) <= self.remaining_capacity(),
            "Stream::write_utf16_str 越界：需要 {} 字节，剩余容量 {}",
            units.saturating_mul(2),
            self.remaining_capacity()
        );
        for unit in text.encode_utf16() {
            self.write_u16(unit);
        }
        units
    }

    /// 读取 `units` 个 UTF-16LE 码元并解码为 `String`。
    ///
    /// # 错误
    /// - 可读字节不足：[`StreamError::InsufficientLength`]；
    /// - 出现未配对代理项：[`StreamError::InvalidUtf16`]。
    ///
    /// 两种错误下游标均保持不动。
    pub fn read_utf16_string(&mut self, units: usize) -> Result<String> {
        self.require_length(units.saturating_mul(2))?;

        let start = self.position();
        let mut code_units = Vec::with_capacity(units);
        for _ in 0..units {
            code_units.push(self.read_u16());
        }

        let mut text = String::with_capacity(units);
        for (index, decoded) in char::decode_utf16(code_units.iter().copied()).enumerate() {
            match decoded {
                Ok(ch) => text.push(ch),
                Err(_) => {
                    self.set_position(start);
                    return Err(StreamError::InvalidUtf16 {
                        unit: invalid_unit_index(&code_units, index),
                    });
                }
            }
        }
        Ok(text)
    }
}

/// `decode_utf16` 以字符计数，这里换算回首个非法码元的下标。
fn invalid_unit_index(units: &[u16], failed_char: usize) -> usize {
    let mut unit = 0;
    for _ in 0..failed_char {
        let is_high = (0xD800..0xDC00).contains(&units[unit]);
        unit += if is_high { 2 } else { 1 };
    }
    unit
}
