//! 提取配置模块
//!
//! 提供章节提取时使用的默认值和开关，支持从YAML文件加载配置。

use crate::epub::error::{EpubError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// 默认配置文件路径
pub const DEFAULT_CONFIG_PATH: &str = "chapterforge.yaml";

/// 章节提取配置
///
/// 文件中缺失的字段使用默认值。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// OPF中没有书名时使用的书名
    pub default_title: String,
    /// OPF中没有作者时使用的作者
    pub default_author: String,
    /// 导航标签为空时的标题前缀，生成如"Section 3"
    pub section_label: String,
    /// 按脊柱提取时找不到标题的章节前缀，生成如"Chapter 2"
    pub chapter_label: String,
    /// 单个章节提取失败时内容的前缀
    pub error_prefix: String,
    /// 提取结果只有标题时，是否在全文中查找标题之后的内容
    pub degenerate_guard: bool,
    /// 导航点没有产生任何章节时，是否按脊柱顺序提取
    pub spine_fallback: bool,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            default_title: "Unknown Title".to_string(),
            default_author: "Unknown Author".to_string(),
            section_label: "Section".to_string(),
            chapter_label: "Chapter".to_string(),
            error_prefix: "Error loading content: ".to_string(),
            degenerate_guard: true,
            spine_fallback: true,
        }
    }
}

impl ExtractConfig {
    /// 从YAML文件加载配置
    ///
    /// # 参数
    /// * `path` - 配置文件路径
    ///
    /// # 返回值
    /// * `Result<Self>` - 文件无法读取或格式错误时返回`Config`错误
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| EpubError::Config(format!("无法读取配置文件: {}", e)))?;

        Self::from_yaml(&content)
    }

    /// 从YAML字符串解析配置
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yml::from_str(content)
            .map_err(|e| EpubError::Config(format!("配置文件格式错误: {}", e)))
    }

    /// 加载配置，文件不存在时使用默认配置
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            log::debug!("配置文件 {} 不存在，使用默认配置", path.as_ref().display());
            Ok(Self::default())
        }
    }

    /// 将配置写入YAML文件
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml_content = serde_yml::to_string(self)
            .map_err(|e| EpubError::Config(format!("序列化配置失败: {}", e)))?;

        let content_with_header = format!(
            "# chapterforge 提取配置文件\n# 定义章节提取时使用的默认值与回退策略\n\n{}",
            yaml_content
        );

        fs::write(path, content_with_header)
            .map_err(|e| EpubError::Config(format!("写入配置文件失败: {}", e)))
    }

    /// 第`number`个（从1开始）未命名导航点的标题
    pub fn section_title(&self, number: usize) -> String {
        format!("{} {}", self.section_label, number)
    }

    /// 第`number`个（从1开始）未命名脊柱章节的标题
    pub fn chapter_title(&self, number: usize) -> String {
        format!("{} {}", self.chapter_label, number)
    }

    /// 章节提取失败时的占位内容
    pub fn error_content(&self, message: &str) -> String {
        format!("{}{}", self.error_prefix, message)
    }
}
