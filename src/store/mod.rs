//! 书籍存储
//!
//! 解析结果（或客户端提交的同结构JSON）保存为一条书籍记录加一组章节记录。
//! 章节在一个批次中写入；批次失败时撤销书籍记录，不留下没有章节的书。

pub mod error;
pub mod memory;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;

use crate::epub::ParsedBook;

/// 未提供文件名时记录的文件名
pub const DEFAULT_FILE_NAME: &str = "unknown.epub";
/// 章节缺少标题时的标题
pub const UNTITLED_SECTION: &str = "Untitled Section";

const MISSING_FIELDS: &str = "Missing required book data: title, author, or sections";
const SECTIONS_NOT_ARRAY: &str = "Sections must be an array";

/// 待写入的章节
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSection {
    pub title: String,
    pub content: String,
    pub order: i64,
}

/// 待写入的书籍
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub file_name: String,
    pub sections: Vec<NewSection>,
}

impl NewBook {
    /// 从客户端提交的JSON构造
    ///
    /// 接受`{ title, author, sections, fileName }`。`title`、`author`、`sections`
    /// 缺失或为空值时返回校验错误；`sections`必须是数组。
    /// 章节中缺失的字段使用默认值：标题"Untitled Section"、内容为空、顺序0。
    pub fn from_json(body: &Value) -> Result<NewBook> {
        let title = present(body.get("title"));
        let author = present(body.get("author"));
        let sections = present(body.get("sections"));

        let (Some(title), Some(author), Some(sections)) = (title, author, sections) else {
            return Err(StoreError::Validation(MISSING_FIELDS.to_string()));
        };
        let Some(sections) = sections.as_array() else {
            return Err(StoreError::Validation(SECTIONS_NOT_ARRAY.to_string()));
        };

        let file_name = present(body.get("fileName"))
            .map(text_of)
            .unwrap_or_else(|| DEFAULT_FILE_NAME.to_string());

        Ok(NewBook {
            title: text_of(title),
            author: text_of(author),
            file_name,
            sections: sections.iter().map(NewSection::from_json).collect(),
        })
    }

    /// 从解析结果构造
    pub fn from_parsed(book: &ParsedBook, file_name: Option<&str>) -> NewBook {
        NewBook {
            title: book.title.clone(),
            author: book.author.clone(),
            file_name: file_name
                .filter(|name| !name.is_empty())
                .unwrap_or(DEFAULT_FILE_NAME)
                .to_string(),
            sections: book
                .sections
                .iter()
                .map(|section| NewSection {
                    title: section.title.clone(),
                    content: section.content.clone(),
                    order: i64::try_from(section.order).unwrap_or(i64::MAX),
                })
                .collect(),
        }
    }
}

impl NewSection {
    fn from_json(section: &Value) -> NewSection {
        NewSection {
            title: present(section.get("title"))
                .map(text_of)
                .unwrap_or_else(|| UNTITLED_SECTION.to_string()),
            content: present(section.get("content")).map(text_of).unwrap_or_default(),
            order: present(section.get("order")).map(order_of).unwrap_or(0),
        }
    }
}

/// 只保留"有值"的字段：null、false、0和空字符串都视为缺失
fn present(value: Option<&Value>) -> Option<&Value> {
    value.filter(|value| match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    })
}

fn text_of(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn order_of(value: &Value) -> i64 {
    match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().map(|n| n as i64))
            .unwrap_or(0),
        Value::String(text) => text.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

/// 已保存的书籍记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookRecord {
    pub id: u64,
    pub title: String,
    pub author: String,
    #[serde(with = "time::serde::rfc3339")]
    pub upload_date: OffsetDateTime,
    pub file_name: String,
}

/// 已保存的章节记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionRecord {
    pub id: u64,
    pub book_id: u64,
    pub title: String,
    pub content: String,
    pub order_num: i64,
}

/// 书籍及其按顺序排列的章节
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredBook {
    #[serde(flatten)]
    pub book: BookRecord,
    pub sections: Vec<SectionRecord>,
}

/// 创建书籍后的回执
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedBook {
    pub id: u64,
    pub title: String,
    pub author: String,
    #[serde(with = "time::serde::rfc3339")]
    pub upload_date: OffsetDateTime,
    pub sections_count: usize,
}

/// 书籍存储接口
pub trait BookStore {
    /// 写入书籍和全部章节
    ///
    /// 章节写入失败时删除刚创建的书籍记录并返回`Storage`错误。
    fn create(&mut self, book: NewBook) -> Result<CreatedBook>;

    /// 按id读取书籍，章节按顺序升序排列
    fn get(&self, id: u64) -> Result<StoredBook>;

    /// 所有书籍，最新上传的在前
    fn list(&self) -> Vec<BookRecord>;

    /// 校验并写入客户端提交的JSON
    fn create_from_json(&mut self, body: &Value) -> Result<CreatedBook> {
        let book = NewBook::from_json(body)?;
        self.create(book)
    }
}
