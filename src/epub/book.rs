//! 书籍解析流程
//!
//! 将各个组件串成一次完整的解析：容器 → OPF → NCX → 章节，
//! NCX没有产生章节时回退到脊柱顺序。

use serde::{Deserialize, Serialize};

use crate::epub::archive::Archive;
use crate::epub::config::ExtractConfig;
use crate::epub::container::Container;
use crate::epub::error::Result;
use crate::epub::ncx::Ncx;
use crate::epub::opf::Package;
use crate::epub::section::SectionExtractor;

/// 一个纯文本章节
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// 章节标题，不为空
    pub title: String,
    /// 章节纯文本内容，可能为空
    pub content: String,
    /// 在书中的顺序，唯一且递增
    pub order: usize,
}

impl Section {
    pub fn new(title: String, content: String, order: usize) -> Self {
        Self { title, content, order }
    }
}

/// 解析结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedBook {
    pub title: String,
    pub author: String,
    pub sections: Vec<Section>,
}

/// 书名和作者，缺失时已替换为默认值
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookMeta {
    pub title: String,
    pub author: String,
}

impl BookMeta {
    /// 从OPF中取书名和作者
    pub fn from_package(package: &Package, config: &ExtractConfig) -> Self {
        Self {
            title: package
                .title
                .clone()
                .unwrap_or_else(|| config.default_title.clone()),
            author: package
                .author
                .clone()
                .unwrap_or_else(|| config.default_author.clone()),
        }
    }
}

/// 组装最终结果：导航章节非空时使用导航章节，否则使用脊柱章节
pub fn assemble(meta: BookMeta, nav_sections: Vec<Section>, spine_sections: Vec<Section>) -> ParsedBook {
    let sections = if nav_sections.is_empty() {
        spine_sections
    } else {
        nav_sections
    };

    ParsedBook {
        title: meta.title,
        author: meta.author,
        sections,
    }
}

/// EPUB解析器
///
/// 解析器本身只保存配置；每次调用都创建自己的归档和文件缓存，
/// 因此同一个解析器可以在多个线程中同时使用。
#[derive(Debug, Clone, Default)]
pub struct EpubParser {
    config: ExtractConfig,
}

impl EpubParser {
    pub fn new(config: ExtractConfig) -> Self {
        Self { config }
    }

    /// 解析内存中的EPUB文件
    ///
    /// # 参数
    /// * `bytes` - EPUB文件的完整内容
    ///
    /// # 返回值
    /// * `Result<ParsedBook>` - 容器、OPF、NCX这些结构性步骤失败时返回错误；
    ///   单个章节的问题不会导致失败
    pub fn parse(&self, bytes: impl Into<Vec<u8>>) -> Result<ParsedBook> {
        let mut archive = Archive::open(bytes)?;

        let root_path = Container::resolve(&mut archive)?;
        log::debug!("OPF路径: {}", root_path);

        let package = Package::parse(&mut archive, &root_path)?;
        let meta = BookMeta::from_package(&package, &self.config);

        let extractor = SectionExtractor::new(&self.config);
        let nav_sections = match package.locate_nav() {
            Some(item) => {
                let nav_points = Ncx::parse(&mut archive, package.dir(), item, &self.config)?;
                extractor.from_nav_points(&mut archive, &nav_points)
            }
            None => {
                log::debug!("清单中没有NCX导航文件");
                Vec::new()
            }
        };

        let spine_sections = if nav_sections.is_empty() && self.config.spine_fallback {
            log::debug!("导航没有产生章节，按脊柱顺序提取");
            extractor.from_spine(&mut archive, &package)
        } else {
            Vec::new()
        };

        let book = assemble(meta, nav_sections, spine_sections);
        log::debug!("《{}》解析完成，共 {} 个章节", book.title, book.sections.len());
        Ok(book)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::epub::error::EpubError;
    use crate::epub::test_support::{EpubBuilder, ncx, opf, xhtml};

    const XHTML: &str = "application/xhtml+xml";
    const NCX: &str = "application/x-dtbncx+xml";

    fn scenario_epub() -> Vec<u8> {
        EpubBuilder::standard()
            .file(
                "OEBPS/content.opf",
                &opf("T", "A", &[("ncx", "toc.ncx", NCX), ("ch", "ch.html", XHTML)], &["ch"]),
            )
            .file("OEBPS/toc.ncx", &ncx(&[("Intro", "ch.html#a"), ("Body", "ch.html#b")]))
            .file(
                "OEBPS/ch.html",
                &xhtml("ch", r#"<div id="a">Hello <b>World</b></div><div id="b">Next</div>"#),
            )
            .build()
    }

    fn spine_only_epub() -> Vec<u8> {
        EpubBuilder::standard()
            .file(
                "OEBPS/content.opf",
                &opf(
                    "Spine Book",
                    "Someone",
                    &[("c1", "c1.xhtml", XHTML), ("c2", "c2.xhtml", XHTML)],
                    &["c1", "c2"],
                ),
            )
            .file("OEBPS/c1.xhtml", "<html><body><h1>One</h1><p>first</p></body></html>")
            .file("OEBPS/c2.xhtml", "<html><body><h2>Two</h2><p>second</p></body></html>")
            .build()
    }

    #[test]
    fn test_full_scenario() {
        let book = EpubParser::default().parse(scenario_epub()).unwrap();
        assert_eq!(
            book,
            ParsedBook {
                title: "T".into(),
                author: "A".into(),
                sections: vec![
                    Section::new("Intro".into(), "Hello World".into(), 0),
                    Section::new("Body".into(), "Next".into(), 1),
                ],
            }
        );
    }

    #[test]
    fn test_parse_is_idempotent() {
        let bytes = scenario_epub();
        let parser = EpubParser::default();
        let first = parser.parse(bytes.clone()).unwrap();
        let second = parser.parse(bytes).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_without_ncx_uses_spine() {
        let book = EpubParser::default().parse(spine_only_epub()).unwrap();
        assert_eq!(book.title, "Spine Book");
        assert_eq!(
            book.sections,
            vec![
                Section::new("One".into(), "first".into(), 0),
                Section::new("Two".into(), "second".into(), 1),
            ]
        );
    }

    #[test]
    fn test_spine_fallback_can_be_disabled() {
        let parser = EpubParser::new(ExtractConfig {
            spine_fallback: false,
            ..ExtractConfig::default()
        });
        let book = parser.parse(spine_only_epub()).unwrap();
        assert!(book.sections.is_empty());
    }

    #[test]
    fn test_unreadable_nav_targets_fall_back_to_spine() {
        let bytes = EpubBuilder::standard()
            .file(
                "OEBPS/content.opf",
                &opf("T", "A", &[("ncx", "toc.ncx", NCX), ("c1", "c1.xhtml", XHTML)], &["c1"]),
            )
            .file("OEBPS/toc.ncx", &ncx(&[("Gone", "gone.html")]))
            .file("OEBPS/c1.xhtml", &xhtml("Real", "<p>text</p>"))
            .build();

        let book = EpubParser::default().parse(bytes).unwrap();
        assert_eq!(book.sections.len(), 1);
        assert_eq!(book.sections[0].title, "Real");
    }

    #[test]
    fn test_missing_metadata_uses_defaults() {
        let bytes = EpubBuilder::standard()
            .file(
                "OEBPS/content.opf",
                &opf("  ", "", &[("ncx", "toc.ncx", NCX), ("ch", "ch.html", XHTML)], &["ch"]),
            )
            .file("OEBPS/toc.ncx", &ncx(&[("Only", "ch.html")]))
            .file("OEBPS/ch.html", &xhtml("ch", "<p>body</p>"))
            .build();

        let book = EpubParser::default().parse(bytes).unwrap();
        assert_eq!(book.title, "Unknown Title");
        assert_eq!(book.author, "Unknown Author");
        assert_eq!(book.sections[0].content, "body");
    }

    #[test]
    fn test_missing_container_is_structural() {
        let bytes = EpubBuilder::new()
            .file("OEBPS/content.opf", &opf("T", "A", &[], &[]))
            .build();
        let result = EpubParser::default().parse(bytes);
        assert!(matches!(result, Err(EpubError::MissingContainer)));
    }

    #[test]
    fn test_missing_ncx_file_is_structural() {
        let bytes = EpubBuilder::standard()
            .file(
                "OEBPS/content.opf",
                &opf("T", "A", &[("ncx", "toc.ncx", NCX)], &[]),
            )
            .build();
        let result = EpubParser::default().parse(bytes);
        assert!(matches!(result, Err(EpubError::MissingNavigation(_))));
    }

    #[test]
    fn test_not_a_zip() {
        let result = EpubParser::default().parse(b"definitely not a zip".to_vec());
        assert!(matches!(result, Err(EpubError::InvalidArchive(_))));
    }

    #[test]
    fn test_assemble_prefers_nav_sections() {
        let meta = BookMeta {
            title: "T".into(),
            author: "A".into(),
        };
        let nav = vec![Section::new("N".into(), String::new(), 0)];
        let spine = vec![Section::new("S".into(), String::new(), 0)];

        assert_eq!(assemble(meta.clone(), nav.clone(), spine.clone()).sections, nav);
        assert_eq!(assemble(meta, Vec::new(), spine.clone()).sections, spine);
    }
}
