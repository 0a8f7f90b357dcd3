//! OPF解析器模块
//!
//! 提供OPF（Open Packaging Format）文件的XML解析功能。

use crate::epub::archive::Archive;
use crate::epub::error::{EpubError, Result};
use crate::epub::opf::{Manifest, ManifestItem, SpineEntry};
use crate::epub::path;
use crate::epub::xml;
use quick_xml::events::{BytesStart, Event};

/// 需要提取文本的元数据字段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Creator,
}

/// 同一字段的两个候选值：带`dc:`前缀的元素优先，其次是任意本地名匹配的元素
#[derive(Debug, Default)]
struct Candidates {
    prefixed: Option<String>,
    any: Option<String>,
}

impl Candidates {
    fn wants(&self, prefixed: bool) -> bool {
        (prefixed && self.prefixed.is_none()) || self.any.is_none()
    }

    fn offer(&mut self, prefixed: bool, text: String) {
        if prefixed && self.prefixed.is_none() {
            self.prefixed = Some(text.clone());
        }
        if self.any.is_none() {
            self.any = Some(text);
        }
    }

    fn best(self) -> Option<String> {
        let non_blank = |value: String| {
            let trimmed = value.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        };
        self.prefixed.and_then(non_blank).or_else(|| self.any.and_then(non_blank))
    }
}

/// 正在收集文本的元数据元素
struct Capture {
    field: Field,
    prefixed: bool,
    depth: usize,
    text: String,
}

/// OPF文件解析结果
#[derive(Debug, Clone)]
pub struct Package {
    /// OPF文件在归档中的路径
    pub root_path: String,
    /// 书名，缺失时为None
    pub title: Option<String>,
    /// 作者，缺失时为None
    pub author: Option<String>,
    /// 清单项(文件列表)
    pub manifest: Manifest,
    /// 脊柱(阅读顺序)
    pub spine: Vec<SpineEntry>,
    /// 脊柱的toc属性（NCX清单项ID）
    pub spine_toc: Option<String>,
}

impl Package {
    /// 从归档中读取并解析OPF文件
    ///
    /// # 参数
    /// * `archive` - 当前解析的归档
    /// * `root_path` - container.xml给出的OPF路径
    ///
    /// # 返回值
    /// * `Result<Package>` - 文件不存在时返回`MissingPackage`
    pub fn parse(archive: &mut Archive, root_path: &str) -> Result<Package> {
        let content = archive
            .read_text(root_path)?
            .ok_or_else(|| EpubError::MissingPackage(root_path.to_string()))?;
        let package = Self::parse_xml(&content, root_path)?;
        log::debug!(
            "OPF解析完成: {} 个清单项, {} 个脊柱项",
            package.manifest.len(),
            package.spine.len()
        );
        Ok(package)
    }

    /// 解析OPF文件内容
    ///
    /// 书名和作者的查找忽略命名空间声明，按本地名（不区分大小写）匹配，
    /// 以兼容命名空间声明不规范的文件。
    ///
    /// # 参数
    /// * `xml_content` - OPF文件的XML内容
    /// * `root_path` - OPF文件在归档中的路径
    pub fn parse_xml(xml_content: &str, root_path: &str) -> Result<Package> {
        let mut reader = xml::reader(xml_content);

        let mut title = Candidates::default();
        let mut creator = Candidates::default();
        let mut manifest = Manifest::new();
        let mut spine = Vec::new();
        let mut spine_toc = None;

        let mut buf = Vec::new();
        let mut depth = 0usize;
        let mut capture: Option<Capture> = None;

        loop {
            let event = reader
                .read_event_into(&mut buf)
                .map_err(|e| EpubError::MalformedPackage(e.to_string()))?;
            match event {
                Event::Start(ref e) => {
                    depth += 1;
                    if xml::local_name_is(e, "item") {
                        Self::parse_manifest_item(e, &mut manifest)?;
                    } else if xml::local_name_is(e, "itemref") {
                        Self::parse_spine_item(e, &mut spine)?;
                    } else if xml::local_name_is(e, "spine") {
                        spine_toc = Self::package_attribute(e, b"toc")?;
                    } else if capture.is_none() {
                        let prefixed = has_dc_prefix(e);
                        let field = if xml::local_name_is(e, "title") && title.wants(prefixed) {
                            Some(Field::Title)
                        } else if xml::local_name_is(e, "creator") && creator.wants(prefixed) {
                            Some(Field::Creator)
                        } else {
                            None
                        };
                        capture = field.map(|field| Capture {
                            field,
                            prefixed,
                            depth,
                            text: String::new(),
                        });
                    }
                }
                Event::Text(ref e) => {
                    if let Some(capture) = capture.as_mut() {
                        capture.text.push_str(&xml::text(e));
                    }
                }
                Event::CData(ref e) => {
                    if let Some(capture) = capture.as_mut() {
                        capture.text.push_str(&xml::cdata(e));
                    }
                }
                Event::End(_) => {
                    if capture.as_ref().is_some_and(|c| c.depth == depth) {
                        if let Some(done) = capture.take() {
                            match done.field {
                                Field::Title => title.offer(done.prefixed, done.text),
                                Field::Creator => creator.offer(done.prefixed, done.text),
                            }
                        }
                    }
                    depth = depth.saturating_sub(1);
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(Package {
            root_path: root_path.to_string(),
            title: title.best(),
            author: creator.best(),
            manifest,
            spine,
            spine_toc,
        })
    }

    fn package_attribute(e: &BytesStart, name: &[u8]) -> Result<Option<String>> {
        xml::attribute(e, name).map_err(|err| EpubError::MalformedPackage(err.to_string()))
    }

    /// 解析清单项
    ///
    /// 缺少id或href的项被忽略；id重复时后出现的覆盖先出现的。
    fn parse_manifest_item(e: &BytesStart, manifest: &mut Manifest) -> Result<()> {
        let id = Self::package_attribute(e, b"id")?;
        let href = Self::package_attribute(e, b"href")?;
        let media_type = Self::package_attribute(e, b"media-type")?.unwrap_or_default();

        match (id, href) {
            (Some(id), Some(href)) if !id.is_empty() && !href.is_empty() => {
                manifest.insert(ManifestItem::new(id, href, media_type));
            }
            _ => log::warn!("忽略缺少id或href的清单项"),
        }
        Ok(())
    }

    /// 解析脊柱项
    fn parse_spine_item(e: &BytesStart, spine: &mut Vec<SpineEntry>) -> Result<()> {
        if let Some(idref) = Self::package_attribute(e, b"idref")?.filter(|idref| !idref.is_empty()) {
            spine.push(SpineEntry::new(idref));
        }
        Ok(())
    }

    /// OPF文件所在目录，清单中的href都相对于它
    pub fn dir(&self) -> &str {
        path::parent_dir(&self.root_path)
    }

    /// 将清单项的href解析为归档路径
    pub fn resolve_href(&self, href: &str) -> String {
        path::join(self.dir(), &path::percent_decode(href))
    }

    /// 查找NCX导航文件
    ///
    /// 优先使用脊柱toc属性指向的清单项，其次是清单中第一个NCX类型的项。
    /// 返回None表示应改用脊柱顺序提取章节。
    pub fn locate_nav(&self) -> Option<&ManifestItem> {
        self.spine_toc
            .as_deref()
            .and_then(|toc| self.manifest.get(toc))
            .filter(|item| item.is_ncx())
            .or_else(|| self.manifest.iter().find(|item| item.is_ncx()))
    }

    /// 按阅读顺序返回脊柱项及其清单项，引用不存在的脊柱项被跳过
    pub fn spine_items(&self) -> impl Iterator<Item = (usize, &ManifestItem)> {
        self.spine
            .iter()
            .enumerate()
            .filter_map(move |(i, entry)| match self.manifest.get(&entry.idref) {
                Some(item) => Some((i, item)),
                None => {
                    log::warn!("脊柱项引用了不存在的清单项: {}", entry.idref);
                    None
                }
            })
    }
}

/// 元素是否带`dc:`前缀（如`<dc:title>`）
fn has_dc_prefix(e: &BytesStart) -> bool {
    e.name()
        .prefix()
        .is_some_and(|prefix| prefix.as_ref().eq_ignore_ascii_case(b"dc"))
}
