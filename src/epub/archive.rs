use std::collections::HashMap;
use std::io::{Cursor, Read};
use std::sync::Arc;
use zip::ZipArchive;
use zip::result::ZipError;

use crate::epub::error::{EpubError, Result};
use crate::epub::path;

/// 一次解析所持有的EPUB压缩包
///
/// 解码后的文本按规范化路径缓存。同一个文件经常被多个导航点引用，
/// 缓存保证每个文件只解压和解码一次。缓存只属于当前解析，不跨调用共享。
pub struct Archive {
    zip: ZipArchive<Cursor<Vec<u8>>>,
    cache: HashMap<String, Arc<str>>,
}

impl Archive {
    /// 从内存中的字节创建归档
    ///
    /// # 参数
    /// * `bytes` - EPUB文件的完整内容
    ///
    /// # 返回值
    /// * `Result<Archive>` - 不是有效zip时返回`InvalidArchive`
    pub fn open(bytes: impl Into<Vec<u8>>) -> Result<Archive> {
        let zip = ZipArchive::new(Cursor::new(bytes.into()))?;
        Ok(Archive {
            zip,
            cache: HashMap::new(),
        })
    }

    /// 归档中是否存在该路径（也会尝试百分号解码后的路径）
    pub fn contains(&self, entry_path: &str) -> bool {
        let normalized = path::normalize(entry_path);
        self.cache.contains_key(&normalized)
            || self.zip.index_for_name(&normalized).is_some()
            || self.zip.index_for_name(&path::percent_decode(&normalized)).is_some()
    }

    /// 读取条目并解码为UTF-8文本
    ///
    /// # 返回值
    /// * `Ok(Some(text))` - 条目存在
    /// * `Ok(None)` - 条目不存在
    /// * `Err(..)` - 条目存在但无法解压
    pub fn read_text(&mut self, entry_path: &str) -> Result<Option<Arc<str>>> {
        let normalized = path::normalize(entry_path);
        if let Some(text) = self.cache.get(&normalized) {
            return Ok(Some(Arc::clone(text)));
        }

        let Some(bytes) = self.read_bytes(&normalized)? else {
            return Ok(None);
        };

        let text: Arc<str> = Arc::from(String::from_utf8_lossy(strip_bom(&bytes)).as_ref());
        self.cache.insert(normalized, Arc::clone(&text));
        Ok(Some(text))
    }

    /// 从缓存中取已经读取过的文本，不访问压缩包
    pub fn cached(&self, entry_path: &str) -> Option<Arc<str>> {
        self.cache.get(&path::normalize(entry_path)).cloned()
    }

    /// 批量预读一组文件
    ///
    /// 无法读取的文件只记录警告并跳过，返回成功载入缓存的文件数量。
    pub fn warm<'a, I>(&mut self, paths: I) -> usize
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut loaded = 0;
        for entry_path in paths {
            match self.read_text(entry_path) {
                Ok(Some(_)) => loaded += 1,
                Ok(None) => log::warn!("归档中不存在文件: {}", entry_path),
                Err(e) => log::warn!("无法读取文件 {}: {}", entry_path, e),
            }
        }
        loaded
    }

    fn read_bytes(&mut self, normalized: &str) -> Result<Option<Vec<u8>>> {
        match self.read_entry(normalized) {
            Err(EpubError::InvalidArchive(ZipError::FileNotFound)) => {}
            other => return other.map(Some),
        }

        // 部分EPUB的href经过百分号编码，而条目名没有
        let decoded = path::percent_decode(normalized);
        if decoded == normalized {
            return Ok(None);
        }
        match self.read_entry(&decoded) {
            Err(EpubError::InvalidArchive(ZipError::FileNotFound)) => Ok(None),
            other => other.map(Some),
        }
    }

    fn read_entry(&mut self, name: &str) -> Result<Vec<u8>> {
        let mut file = self.zip.by_name(name)?;
        let mut buffer = Vec::new();
        file.read_to_end(&mut buffer)?;
        Ok(buffer)
    }
}

/// 去掉UTF-8 BOM
fn strip_bom(data: &[u8]) -> &[u8] {
    data.strip_prefix(&[0xEF_u8, 0xBB, 0xBF][..]).unwrap_or(data)
}
