//! 清单模块
//!
//! 提供EPUB包中文件清单的结构定义。

use std::collections::HashMap;

/// NCX导航文件的媒体类型
pub const NCX_MEDIA_TYPE: &str = "application/x-dtbncx+xml";

/// 清单项信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestItem {
    /// 项目ID
    pub id: String,
    /// 文件路径(相对于OPF文件)
    pub href: String,
    /// 媒体类型
    pub media_type: String,
}

impl ManifestItem {
    /// 创建新的清单项
    pub fn new(id: String, href: String, media_type: String) -> Self {
        Self {
            id,
            href,
            media_type,
        }
    }

    /// 检查是否为NCX导航文件
    pub fn is_ncx(&self) -> bool {
        self.media_type.trim().eq_ignore_ascii_case(NCX_MEDIA_TYPE)
    }
}

/// 按声明顺序保存的清单
///
/// 重复的id会覆盖之前的条目，被覆盖的条目保留原来的位置。
#[derive(Debug, Clone, Default)]
pub struct Manifest {
    items: Vec<ManifestItem>,
    index: HashMap<String, usize>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// 插入清单项，id重复时静默覆盖
    pub fn insert(&mut self, item: ManifestItem) {
        match self.index.get(&item.id) {
            Some(&position) => self.items[position] = item,
            None => {
                self.index.insert(item.id.clone(), self.items.len());
                self.items.push(item);
            }
        }
    }

    /// 根据ID获取清单项
    pub fn get(&self, id: &str) -> Option<&ManifestItem> {
        self.index.get(id).map(|&position| &self.items[position])
    }

    pub fn iter(&self) -> impl Iterator<Item = &ManifestItem> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, href: &str) -> ManifestItem {
        ManifestItem::new(id.to_string(), href.to_string(), "application/xhtml+xml".to_string())
    }

    #[test]
    fn test_duplicate_id_overwrites_in_place() {
        let mut manifest = Manifest::new();
        manifest.insert(item("a", "first.xhtml"));
        manifest.insert(item("b", "b.xhtml"));
        manifest.insert(item("a", "second.xhtml"));

        assert_eq!(manifest.len(), 2);
        assert_eq!(manifest.get("a").unwrap().href, "second.xhtml");
        let order: Vec<&str> = manifest.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(order, ["a", "b"]);
    }

    #[test]
    fn test_is_ncx() {
        let ncx = ManifestItem::new("ncx".into(), "toc.ncx".into(), NCX_MEDIA_TYPE.into());
        assert!(ncx.is_ncx());
        assert!(!item("a", "a.xhtml").is_ncx());
    }
}
