//! 通用工具：字节源与游标、线程安全通道、诊断

pub mod channel;
pub mod diagnostics;
pub mod source;
