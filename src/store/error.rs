use thiserror::Error;

pub type Result<T> = std::result::Result<T, StoreError>;

/// 书籍存储相关的错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// 提交的数据不完整或格式不对
    #[error("{0}")]
    Validation(String),

    #[error("Book not found: {0}")]
    NotFound(u64),

    /// 写入失败，已创建的书籍记录会被撤销
    #[error("存储失败: {0}")]
    Storage(String),
}
