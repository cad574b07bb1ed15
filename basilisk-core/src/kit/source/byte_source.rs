//! 字节源抽象
//!
//! 词法器只通过 `next_byte` / `pushback` 访问输入，文件和标准输入都包装成 [`ReaderSource`]。

use std::io::{self, BufReader, Bytes, Read};

/// 顺序字节源，支持回推
pub trait ByteSource {
    /// 读取下一个字节，流结束时返回 `None`
    fn next_byte(&mut self) -> io::Result<Option<u8>>;

    /// 回推一个字节，下一次 `next_byte` 会先返回它
    fn pushback(&mut self, byte: u8);
}

/// 任意 `Read` 的字节源适配器
pub struct ReaderSource<R: Read> {
    bytes: Bytes<BufReader<R>>,
    /// 回推栈（后进先出）
    pending: Vec<u8>,
}

impl<R: Read> ReaderSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            bytes: BufReader::new(reader).bytes(),
            pending: Vec::new(),
        }
    }
}

impl<R: Read> ByteSource for ReaderSource<R> {
    fn next_byte(&mut self) -> io::Result<Option<u8>> {
        if let Some(byte) = self.pending.pop() {
            return Ok(Some(byte));
        }
        self.bytes.next().transpose()
    }

    fn pushback(&mut self, byte: u8) {
        self.pending.push(byte);
    }
}
