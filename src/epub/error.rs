use std::io;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, EpubError>;

/// EPUB解析相关的错误类型
///
/// 结构性错误（容器、包文件、导航文件）会中止整个解析；
/// 单个章节的错误在章节提取阶段被就地转换为占位内容，不会出现在这里。
#[derive(Error, Debug)]
pub enum EpubError {
    #[error("IO错误: {0}")]
    Io(#[from] io::Error),

    #[error("不是有效的zip压缩包: {0}")]
    InvalidArchive(#[from] zip::result::ZipError),

    #[error("缺少容器描述文件 META-INF/container.xml")]
    MissingContainer,

    #[error("container.xml解析错误: {0}")]
    MalformedContainer(String),

    #[error("找不到OPF包文件: {0}")]
    MissingPackage(String),

    #[error("OPF文件解析错误: {0}")]
    MalformedPackage(String),

    #[error("找不到NCX导航文件: {0}")]
    MissingNavigation(String),

    #[error("XML解析错误: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("标题匹配表达式错误: {0}")]
    Pattern(#[from] regex::Error),

    #[error("配置文件错误: {0}")]
    Config(String),
}
