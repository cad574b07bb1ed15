//! 词法器状态和字符分类

/// 词法器状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexState {
    /// 列表边界：等待 `(`、`)` 或分隔符
    List,
    /// 参数位置：等待原子
    Atom,
    /// 累积操作符
    Op,
    /// 累积数字
    Num,
    /// 字符字面量内部
    Char,
    /// 字符串字面量内部
    Str,
}

/// 空格、制表符、换行
pub fn is_separator(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\n')
}

/// 操作符字符：ASCII 字母数字和运算符标点
pub fn is_op_char(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || b"+-*/%<>=!&|^~?_".contains(&byte)
}

/// 结束一段连续无效字符的字节
pub fn is_delimiter(byte: u8) -> bool {
    is_separator(byte) || byte == b'(' || byte == b')'
}
