//! OPF（Open Packaging Format）文件解析模块
//!
//! 此模块提供EPUB文件中OPF包文件的解析功能，包括书名、作者、清单和脊柱的提取。

mod manifest;
mod parser;
mod spine;

pub use manifest::{Manifest, ManifestItem, NCX_MEDIA_TYPE};
pub use parser::Package;
pub use spine::SpineEntry;
