//! 词法器与语法器之间的令牌通道

pub mod mutex_stack;

pub use mutex_stack::{ChannelError, MutexStack};

use crate::compiler::token::Token;

/// 词法器（生产者）与语法器（消费者）共享的令牌通道
pub type TokenChannel = MutexStack<Token>;
