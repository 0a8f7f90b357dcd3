pub mod epub;
pub mod store;

// === 核心API重新导出 ===

/// EPUB解析器（主要接口）
pub use epub::EpubParser;

/// 错误处理
pub use epub::{EpubError, Result};

// === 数据结构 ===

/// 解析结果和章节
pub use epub::{ParsedBook, Section};

/// 提取配置
pub use epub::ExtractConfig;

/// HTML转纯文本
pub use epub::html_to_text;

// === 底层组件（高级用法） ===

pub use epub::{Archive, Container, Manifest, ManifestItem, NavPoint, Ncx, Package, SectionExtractor};

/// 书籍存储
pub use store::{BookStore, MemoryStore, StoreError};

// === 库信息 ===

/// ChapterForge库的版本信息
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// ChapterForge库的描述
pub const DESCRIPTION: &str = "将EPUB电子书拆分为有序纯文本章节";

// === 便捷函数 ===

/// 使用默认配置解析内存中的EPUB文件
///
/// # 参数
/// * `bytes` - EPUB文件的完整内容
///
/// # 返回值
/// * `Result<ParsedBook>` - 书名、作者和按顺序排列的章节
pub fn parse_epub(bytes: impl Into<Vec<u8>>) -> Result<ParsedBook> {
    EpubParser::default().parse(bytes)
}

/// 使用指定配置解析内存中的EPUB文件
pub fn parse_epub_with_config(bytes: impl Into<Vec<u8>>, config: &ExtractConfig) -> Result<ParsedBook> {
    EpubParser::new(config.clone()).parse(bytes)
}

/// 读取并解析EPUB文件
///
/// # 示例
///
/// ```no_run
/// let book = chapterforge::open("book.epub")?;
/// println!("书名: {}", book.title);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn open<P: AsRef<std::path::Path>>(path: P) -> Result<ParsedBook> {
    let bytes = std::fs::read(path)?;
    parse_epub(bytes)
}
