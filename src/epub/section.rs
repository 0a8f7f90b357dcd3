//! 章节提取模块
//!
//! 根据导航点把共享同一个HTML文件的章节切分开：从锚点元素开始，
//! 沿同级元素向后收集，直到下一个导航点的锚点为止。切分失败时依次回退到
//! 整个body、按标题文本定位；结果只剩标题时再在全文中查找标题之后的内容。
//!
//! 切分只扫描锚点元素的同级元素，不做子树复制或DOM范围提取，
//! 嵌套在其他容器中的正文不会被收集。

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::RegexBuilder;
use scraper::{ElementRef, Html, Selector};

use crate::epub::archive::Archive;
use crate::epub::book::Section;
use crate::epub::config::ExtractConfig;
use crate::epub::error::Result;
use crate::epub::ncx::NavPoint;
use crate::epub::opf::Package;
use crate::epub::text::html_to_text;

static ANY_ELEMENT: Lazy<Selector> = Lazy::new(|| Selector::parse("*").expect("通配选择器"));
static BODY: Lazy<Selector> = Lazy::new(|| Selector::parse("body").expect("body选择器"));

/// 按脊柱提取时查找章节标题的元素，按优先级排列
static HEADINGS: Lazy<Vec<Selector>> = Lazy::new(|| {
    ["title", "h1", "h2"]
        .iter()
        .map(|tag| Selector::parse(tag).expect("标题选择器"))
        .collect()
});

/// 章节提取器
///
/// 只借用配置，不持有任何跨解析的状态。
pub struct SectionExtractor<'a> {
    config: &'a ExtractConfig,
}

impl<'a> SectionExtractor<'a> {
    pub fn new(config: &'a ExtractConfig) -> Self {
        Self { config }
    }

    /// 按导航点提取章节
    ///
    /// 先一次性预读所有导航点引用的文件，再逐个提取。目标文件不存在的导航点
    /// 不产生章节；单个章节提取出错时用错误占位内容代替，不影响其他章节。
    pub fn from_nav_points(&self, archive: &mut Archive, nav_points: &[NavPoint]) -> Vec<Section> {
        let mut seen = HashSet::new();
        let unique_paths: Vec<&str> = nav_points
            .iter()
            .map(|point| point.path.as_str())
            .filter(|path| seen.insert(*path))
            .collect();
        let loaded = archive.warm(unique_paths.iter().copied());
        log::debug!("预读章节文件 {}/{}", loaded, unique_paths.len());

        let outcomes: Vec<(&NavPoint, Result<String>)> = nav_points
            .iter()
            .enumerate()
            .filter_map(|(i, point)| {
                let Some(html) = archive.cached(&point.path) else {
                    log::warn!("找不到章节文件 {}，跳过 \"{}\"", point.path, point.title);
                    return None;
                };
                let next = nav_points.get(i + 1);
                Some((point, self.nav_content(point, next, &html)))
            })
            .collect();

        outcomes
            .into_iter()
            .map(|(point, outcome)| self.section(point.title.clone(), outcome, point.index))
            .collect()
    }

    /// 按脊柱顺序提取章节
    ///
    /// 没有导航文件或导航点没有产生章节时使用。标题取文档中第一个
    /// `title`，其次`h1`、`h2`；正文取该元素之后的同级元素。
    pub fn from_spine(&self, archive: &mut Archive, package: &Package) -> Vec<Section> {
        let mut sections = Vec::new();

        for (i, item) in package.spine_items() {
            let path = package.resolve_href(&item.href);
            let html = match archive.read_text(&path) {
                Ok(Some(html)) => html,
                Ok(None) => {
                    log::warn!("找不到脊柱文件 {}，跳过", path);
                    continue;
                }
                Err(e) => {
                    log::warn!("无法读取脊柱文件 {}: {}，跳过", path, e);
                    continue;
                }
            };

            let fallback_title = self.config.chapter_title(i + 1);
            let section = match self.spine_content(&html, &fallback_title) {
                Ok((title, content)) => Section::new(title, content, i),
                Err(e) => self.section(fallback_title, Err(e), i),
            };
            sections.push(section);
        }

        sections
    }

    fn section(&self, title: String, outcome: Result<String>, order: usize) -> Section {
        match outcome {
            Ok(content) => Section::new(title, content, order),
            Err(e) => {
                log::error!("章节 \"{}\" 提取失败: {}", title, e);
                let content = self.config.error_content(&e.to_string());
                Section::new(title, content, order)
            }
        }
    }

    /// 提取单个导航点的正文文本
    fn nav_content(&self, point: &NavPoint, next: Option<&NavPoint>, html: &str) -> Result<String> {
        let document = Html::parse_document(html);
        let body_html = body_inner_html(&document);

        let mut markup = String::new();
        if let Some(anchor) = point.anchor.as_deref() {
            let next_anchor = next
                .filter(|next| next.same_file(point))
                .and_then(|next| next.anchor.as_deref());
            markup = slice_from_anchor(&document, anchor, next_anchor);
        }

        if markup.is_empty() {
            markup = body_html.clone();
        }

        if markup.is_empty() {
            log::warn!("章节 \"{}\" 没有内容，尝试按标题定位", point.title);
            markup = after_title(&body_html, &point.title)?.unwrap_or_else(|| body_html.clone());
        }

        let text = html_to_text(&markup);
        self.guard_degenerate(text, &point.title, &body_html)
    }

    /// 提取单个脊柱文件的标题和正文文本
    fn spine_content(&self, html: &str, fallback_title: &str) -> Result<(String, String)> {
        let document = Html::parse_document(html);
        let body_html = body_inner_html(&document);

        let heading = HEADINGS
            .iter()
            .find_map(|selector| document.select(selector).next());

        let title = heading
            .map(|element| element.text().collect::<String>().trim().to_string())
            .filter(|title| !title.is_empty())
            .unwrap_or_else(|| fallback_title.to_string());

        let mut text = String::new();
        if let Some(heading) = heading {
            let markup: String = heading
                .next_siblings()
                .filter_map(ElementRef::wrap)
                .map(|element| element.html())
                .collect();
            text = html_to_text(&markup);
        }

        if text.is_empty() {
            text = html_to_text(&body_html);
        }

        let content = self.guard_degenerate(text, &title, &body_html)?;
        Ok((title, content))
    }

    /// 结果只剩标题时，改用全文中标题之后的内容（非空时才采用）
    fn guard_degenerate(&self, text: String, title: &str, body_html: &str) -> Result<String> {
        if !self.config.degenerate_guard || text.trim() != title.trim() {
            return Ok(text);
        }

        log::warn!("章节 \"{}\" 的内容与标题相同，尝试提取标题之后的内容", title);
        if let Some(rest) = after_title(body_html, title)? {
            let alternative = html_to_text(&rest);
            if !alternative.trim().is_empty() {
                return Ok(alternative);
            }
        }
        Ok(text)
    }
}

/// body元素的内部HTML，没有body时为空
fn body_inner_html(document: &Html) -> String {
    document
        .select(&BODY)
        .next()
        .map(|body| body.inner_html())
        .unwrap_or_default()
}

/// 查找id等于`id`的第一个元素
fn find_by_id<'a>(document: &'a Html, id: &str) -> Option<ElementRef<'a>> {
    document
        .select(&ANY_ELEMENT)
        .find(|element| element.value().id() == Some(id))
}

/// 从锚点元素开始拼接同级元素的HTML
///
/// `next_anchor`是同一文件中下一个导航点的锚点；找到对应元素时在它之前停止，
/// 否则一直收集到同级元素末尾。锚点不存在时返回空字符串。
fn slice_from_anchor(document: &Html, anchor: &str, next_anchor: Option<&str>) -> String {
    let Some(start) = find_by_id(document, anchor) else {
        log::warn!("找不到锚点元素 #{}", anchor);
        return String::new();
    };

    let stop = next_anchor
        .and_then(|id| find_by_id(document, id))
        .map(|element| (*element).id());
    if stop == Some((*start).id()) {
        return String::new();
    }

    let mut markup = start.html();
    for sibling in start.next_siblings() {
        if Some(sibling.id()) == stop {
            break;
        }
        if let Some(element) = ElementRef::wrap(sibling) {
            markup.push_str(&element.html());
        }
    }
    markup
}

/// 在标记中不区分大小写地查找标题，返回第一次出现之后的全部内容
fn after_title(markup: &str, title: &str) -> Result<Option<String>> {
    let pattern = RegexBuilder::new(&regex::escape(title))
        .case_insensitive(true)
        .build()?;
    Ok(pattern.find(markup).map(|found| markup[found.end()..].to_string()))
}
