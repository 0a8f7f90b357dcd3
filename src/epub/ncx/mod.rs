//! NCX（Navigation Control file for XML）文件解析模块
//!
//! 此模块负责定位并解析EPUB中的NCX导航文件，得到按文档顺序排列的目录条目。

pub mod navigation;
pub mod parser;

pub use navigation::{NavEntry, NavPoint};
pub use parser::Ncx;
