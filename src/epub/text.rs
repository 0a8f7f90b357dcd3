//! HTML转纯文本
//!
//! 章节内容最终以纯文本保存：标签、属性、注释和脚本都被丢弃，
//! 只保留文本节点，再统一整理空白。

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use scraper::node::Node;
use scraper::{ElementRef, Html};

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("空白匹配表达式"));

/// 文本提取时整体跳过的元素
const SKIPPED_ELEMENTS: &[&str] = &[
    "head", "script", "style", "meta", "link", "title", "base", "noscript", "template",
];

/// 将HTML片段转换为纯文本
///
/// 1. 解码五个基本实体（`&lt; &gt; &amp; &quot; &nbsp;`）
/// 2. 去除所有标签，只保留文本内容
/// 3. 连续空白合并为一个空格；包含空行的空白合并为一个换行；`<br>`强制换行；
///    去除首尾空白
///
/// ```
/// use chapterforge::html_to_text;
///
/// assert_eq!(html_to_text("A &amp; B  \n\n  C"), "A & B\nC");
/// assert_eq!(html_to_text("<p>Hello\n   world</p>"), "Hello world");
/// assert_eq!(html_to_text("<p>Hello <b>World</b></p>"), "Hello World");
/// ```
pub fn html_to_text(fragment: &str) -> String {
    if fragment.trim().is_empty() {
        return String::new();
    }

    let decoded = decode_basic_entities(fragment);
    let document = Html::parse_fragment(&decoded);

    // 每个`<br>`开始新的一段
    let mut segments = vec![String::new()];
    collect_text(document.root_element(), &mut segments);

    segments
        .iter()
        .map(|segment| collapse_whitespace(segment))
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// 按`&lt; &gt; &amp; &quot; &nbsp;`的顺序做文本替换
fn decode_basic_entities(html: &str) -> String {
    html.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
        .replace("&quot;", "\"")
        .replace("&nbsp;", " ")
}

/// 递归收集元素下的文本节点
fn collect_text(element: ElementRef, segments: &mut Vec<String>) {
    let tag_name = element.value().name();
    if SKIPPED_ELEMENTS.contains(&tag_name) {
        return;
    }

    for node in element.children() {
        match node.value() {
            Node::Text(text) => {
                if let Some(current) = segments.last_mut() {
                    current.push_str(text);
                }
            }
            Node::Element(_) => {
                if let Some(child_element) = ElementRef::wrap(node) {
                    collect_text(child_element, segments);
                }
            }
            _ => {}
        }
    }

    if tag_name == "br" {
        segments.push(String::new());
    }
}

/// 整理空白：含两个以上换行的空白串变为一个换行，其余空白串变为一个空格
fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_RUN
        .replace_all(text, |caps: &Captures| {
            if caps[0].matches('\n').count() >= 2 { "\n" } else { " " }
        })
        .trim()
        .to_string()
}
