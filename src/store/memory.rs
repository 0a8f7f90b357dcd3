//! 内存中的书籍存储
//!
//! 两张表：书籍和章节。章节表对（书籍id, 顺序）有唯一约束。

use std::collections::HashSet;

use time::OffsetDateTime;

use crate::store::error::{Result, StoreError};
use crate::store::{BookRecord, BookStore, CreatedBook, NewBook, NewSection, SectionRecord, StoredBook};

#[derive(Debug, Default)]
pub struct MemoryStore {
    books: Vec<BookRecord>,
    sections: Vec<SectionRecord>,
    next_book_id: u64,
    next_section_id: u64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn book_count(&self) -> usize {
        self.books.len()
    }

    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    fn insert_book(&mut self, book: &NewBook) -> BookRecord {
        self.next_book_id += 1;
        let record = BookRecord {
            id: self.next_book_id,
            title: book.title.clone(),
            author: book.author.clone(),
            upload_date: OffsetDateTime::now_utc(),
            file_name: book.file_name.clone(),
        };
        self.books.push(record.clone());
        record
    }

    fn delete_book(&mut self, id: u64) {
        self.books.retain(|book| book.id != id);
    }

    /// 批量插入章节，违反唯一约束时整批都不写入
    fn insert_sections(&mut self, book_id: u64, sections: Vec<NewSection>) -> Result<()> {
        let mut taken: HashSet<i64> = self
            .sections
            .iter()
            .filter(|section| section.book_id == book_id)
            .map(|section| section.order_num)
            .collect();

        for section in &sections {
            if !taken.insert(section.order) {
                return Err(StoreError::Storage(format!(
                    "章节顺序重复: 书籍 {} 中已存在顺序 {}",
                    book_id, section.order
                )));
            }
        }

        for section in sections {
            self.next_section_id += 1;
            self.sections.push(SectionRecord {
                id: self.next_section_id,
                book_id,
                title: section.title,
                content: section.content,
                order_num: section.order,
            });
        }
        Ok(())
    }
}

impl BookStore for MemoryStore {
    fn create(&mut self, book: NewBook) -> Result<CreatedBook> {
        log::info!(
            "保存书籍《{}》({})，共 {} 个章节",
            book.title,
            book.author,
            book.sections.len()
        );

        let record = self.insert_book(&book);
        let sections_count = book.sections.len();

        if let Err(e) = self.insert_sections(record.id, book.sections) {
            log::error!("章节写入失败，撤销书籍 {}: {}", record.id, e);
            self.delete_book(record.id);
            return Err(e);
        }

        Ok(CreatedBook {
            id: record.id,
            title: record.title,
            author: record.author,
            upload_date: record.upload_date,
            sections_count,
        })
    }

    fn get(&self, id: u64) -> Result<StoredBook> {
        let book = self
            .books
            .iter()
            .find(|book| book.id == id)
            .cloned()
            .ok_or(StoreError::NotFound(id))?;

        let mut sections: Vec<SectionRecord> = self
            .sections
            .iter()
            .filter(|section| section.book_id == id)
            .cloned()
            .collect();
        sections.sort_by_key(|section| section.order_num);

        Ok(StoredBook { book, sections })
    }

    fn list(&self) -> Vec<BookRecord> {
        let mut books = self.books.clone();
        books.sort_by(|a, b| b.upload_date.cmp(&a.upload_date).then(b.id.cmp(&a.id)));
        books
    }
}
