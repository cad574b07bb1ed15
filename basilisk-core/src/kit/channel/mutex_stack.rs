use basilisk_config::{ChannelConfig, OverflowPolicy};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use thiserror::Error;

/// 通道可能产生的错误类型
#[derive(Debug, Error, PartialEq)]
pub enum ChannelError {
    /// 尝试向已关闭的通道写入数据
    #[error("Cannot push to closed channel")]
    Closed,

    /// 尝试从已关闭且已读完的通道读取数据
    #[error("Cannot read from drained and closed channel")]
    ClosedAndDrained,

    /// 有界通道已满（Reject 策略）
    #[error("Channel full: {0} unread items")]
    Full(usize),

    /// read_index 已经为 0，无法回退
    #[error("Invalid backup: nothing has been read")]
    InvalidBackup,

    /// 互斥锁被污染（poisoned）
    #[error("Mutex poisoned: {0}")]
    MutexPoisoned(String),
}

/// 线程安全的可增长栈，单生产者单消费者
///
/// 写入只追加，读取通过 `read_index` 前进，因此已读的元素仍然保留，
/// 消费者可以用 [`MutexStack::backup`] 回退一步再读一次。
/// 无界模式下内存上限是一次运行中写入的元素总数。
pub struct MutexStack<T> {
    inner: Mutex<Inner<T>>,
    not_empty: Condvar,
    not_full: Condvar,
    capacity: Option<usize>,
    overflow: OverflowPolicy,
}

/// 内部数据结构，受Mutex保护
struct Inner<T> {
    items: Vec<T>,
    read_index: usize, // 消费者读取位置
    closed: bool,      // 通道关闭标记
}

impl<T> Inner<T> {
    fn unread(&self) -> usize {
        self.items.len() - self.read_index
    }
}

impl<T: Clone> MutexStack<T> {
    /// 创建无界通道，返回Arc指针以便多线程共享
    pub fn new() -> Arc<Self> {
        Self::with_limit(None, OverflowPolicy::Block)
    }

    /// 创建有界通道：未读元素达到 `capacity` 时按 `overflow` 策略处理
    pub fn bounded(capacity: usize, overflow: OverflowPolicy) -> Arc<Self> {
        Self::with_limit(Some(capacity.max(1)), overflow)
    }

    /// 按配置创建
    pub fn from_config(config: &ChannelConfig) -> Arc<Self> {
        match config.capacity {
            Some(capacity) => Self::bounded(capacity, config.overflow),
            None => Self::new(),
        }
    }

    fn with_limit(capacity: Option<usize>, overflow: OverflowPolicy) -> Arc<Self> {
        Arc::new(MutexStack {
            inner: Mutex::new(Inner {
                items: Vec::new(),
                read_index: 0,
                closed: false,
            }),
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
            capacity,
            overflow,
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner<T>>, ChannelError> {
        self.inner
            .lock()
            .map_err(|e| ChannelError::MutexPoisoned(e.to_string()))
    }

    /// 追加一个元素并唤醒消费者
    ///
    /// 无界模式下从不等待；有界模式下满时阻塞（Block）或直接失败（Reject）。
    pub fn push(&self, item: T) -> Result<(), ChannelError> {
        let mut inner = self.lock()?;

        if let Some(capacity) = self.capacity {
            while inner.unread() >= capacity && !inner.closed {
                if self.overflow == OverflowPolicy::Reject {
                    return Err(ChannelError::Full(capacity));
                }
                inner = self
                    .not_full
                    .wait(inner)
                    .map_err(|e| ChannelError::MutexPoisoned(e.to_string()))?;
            }
        }

        if inner.closed {
            return Err(ChannelError::Closed);
        }

        inner.items.push(item);

        // 广播：消费者醒来后会重新检查条件
        self.not_empty.notify_all();
        Ok(())
    }

    /// 读取下一个元素（阻塞式）
    ///
    /// 每次被唤醒都重新检查 `read_index < write_len`，虚假唤醒不会被误认为有数据。
    pub fn next(&self) -> Result<T, ChannelError> {
        let mut inner = self.lock()?;

        while inner.read_index >= inner.items.len() {
            if inner.closed {
                return Err(ChannelError::ClosedAndDrained);
            }
            inner = self
                .not_empty
                .wait(inner)
                .map_err(|e| ChannelError::MutexPoisoned(e.to_string()))?;
        }

        let item = inner.items[inner.read_index].clone();
        inner.read_index += 1;

        if self.capacity.is_some() {
            self.not_full.notify_all();
        }
        Ok(item)
    }

    /// 尝试读取（非阻塞式）：没有未读元素时返回None
    pub fn try_next(&self) -> Result<Option<T>, ChannelError> {
        let mut inner = self.lock()?;
        if inner.read_index >= inner.items.len() {
            return Ok(None);
        }
        let item = inner.items[inner.read_index].clone();
        inner.read_index += 1;
        if self.capacity.is_some() {
            self.not_full.notify_all();
        }
        Ok(Some(item))
    }

    /// 回退一步，下一次 `next` 重新返回上一次读到的元素
    ///
    /// 只能由消费者线程调用。返回新的 read_index。
    pub fn backup(&self) -> Result<usize, ChannelError> {
        let mut inner = self.lock()?;
        if inner.read_index == 0 {
            return Err(ChannelError::InvalidBackup);
        }
        inner.read_index -= 1;
        Ok(inner.read_index)
    }

    /// 清空所有元素（包括已读的），read_index 归零
    pub fn reset(&self) -> Result<(), ChannelError> {
        let mut inner = self.lock()?;
        inner.items.clear();
        inner.read_index = 0;
        self.not_full.notify_all();
        Ok(())
    }

    /// 关闭通道：不再接受新数据，唤醒所有阻塞的线程
    pub fn close(&self) -> Result<(), ChannelError> {
        let mut inner = self.lock()?;
        inner.closed = true;
        self.not_empty.notify_all();
        self.not_full.notify_all();
        Ok(())
    }

    /// 检查通道是否已关闭
    pub fn is_closed(&self) -> Result<bool, ChannelError> {
        Ok(self.lock()?.closed)
    }

    /// 已写入的元素总数（write_len）
    pub fn len(&self) -> Result<usize, ChannelError> {
        Ok(self.lock()?.items.len())
    }

    /// 检查是否没有写入任何元素
    pub fn is_empty(&self) -> Result<bool, ChannelError> {
        Ok(self.len()? == 0)
    }

    /// 当前读取位置
    pub fn read_index(&self) -> Result<usize, ChannelError> {
        Ok(self.lock()?.read_index)
    }

    /// 尚未读取的元素数
    pub fn unread(&self) -> Result<usize, ChannelError> {
        Ok(self.lock()?.unread())
    }

    /// 有界模式的容量
    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }
}
