pub mod archive;
pub mod book;
pub mod config;
pub mod container;
pub mod error;
pub mod ncx;
pub mod opf;
pub mod path;
pub mod section;
pub mod text;
mod xml;

#[cfg(test)]
pub(crate) mod test_support;

// 重新导出错误处理
pub use error::{EpubError, Result};

// 重新导出解析流程和结果
pub use book::{BookMeta, EpubParser, ParsedBook, Section, assemble};
pub use config::{DEFAULT_CONFIG_PATH, ExtractConfig};

// 重新导出各解析组件
pub use archive::Archive;
pub use container::Container;
pub use ncx::{NavEntry, NavPoint, Ncx};
pub use opf::{Manifest, ManifestItem, Package, SpineEntry};
pub use section::SectionExtractor;
pub use text::html_to_text;
