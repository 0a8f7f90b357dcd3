//! NCX解析器模块
//!
//! 提供NCX（Navigation Control file for XML）文件的XML解析功能。

use crate::epub::archive::Archive;
use crate::epub::config::ExtractConfig;
use crate::epub::error::{EpubError, Result};
use crate::epub::ncx::{NavEntry, NavPoint};
use crate::epub::opf::ManifestItem;
use crate::epub::path;
use crate::epub::xml;
use quick_xml::events::Event;

/// 解析过程中的导航点，标签和src都可能缺失
#[derive(Debug, Default)]
struct PendingNavPoint {
    label: Option<String>,
    src: Option<String>,
}

/// 正在收集的navLabel/text文本
struct LabelText {
    owner: usize,
    depth: usize,
    text: String,
}

/// NCX文件解析结果
#[derive(Debug, Clone)]
pub struct Ncx {
    /// NCX文件在归档中的路径
    pub path: String,
    /// 按文档顺序排列的有效导航条目（含嵌套的导航点）
    pub entries: Vec<NavEntry>,
}

impl Ncx {
    /// 读取NCX文件并生成导航点列表
    ///
    /// # 参数
    /// * `archive` - 当前解析的归档
    /// * `package_dir` - OPF文件所在目录
    /// * `item` - NCX清单项
    /// * `config` - 提取配置，提供空标签时的默认标题
    ///
    /// # 返回值
    /// * `Result<Vec<NavPoint>>` - NCX文件不存在时返回`MissingNavigation`
    pub fn parse(
        archive: &mut Archive,
        package_dir: &str,
        item: &ManifestItem,
        config: &ExtractConfig,
    ) -> Result<Vec<NavPoint>> {
        let ncx = Self::load(archive, package_dir, item)?;
        let nav_points = ncx.nav_points(archive, package_dir, config);
        log::debug!("NCX {} 中有 {} 个有效导航点", ncx.path, nav_points.len());
        Ok(nav_points)
    }

    /// 从归档中读取NCX文件
    pub fn load(archive: &mut Archive, package_dir: &str, item: &ManifestItem) -> Result<Ncx> {
        let ncx_path = path::join(package_dir, &path::percent_decode(&item.href));
        let content = archive
            .read_text(&ncx_path)?
            .ok_or_else(|| EpubError::MissingNavigation(ncx_path.clone()))?;
        Ok(Self::parse_xml(&content, &ncx_path))
    }

    /// 解析NCX文件内容
    ///
    /// 收集所有navPoint元素（嵌套的按先序遍历顺序），缺少navLabel/text
    /// 或content/@src的条目被跳过。XML语法错误时保留出错之前已解析的条目。
    ///
    /// # 参数
    /// * `xml_content` - NCX文件的XML内容
    /// * `ncx_path` - NCX文件在归档中的路径
    pub fn parse_xml(xml_content: &str, ncx_path: &str) -> Ncx {
        let mut reader = xml::reader(xml_content);
        let mut buf = Vec::new();

        let mut pending: Vec<PendingNavPoint> = Vec::new();
        let mut open_points: Vec<usize> = Vec::new();
        let mut label_owner: Option<usize> = None;
        let mut label_text: Option<LabelText> = None;
        let mut depth = 0usize;

        loop {
            let event = match reader.read_event_into(&mut buf) {
                Ok(event) => event,
                Err(e) => {
                    log::warn!("NCX文件 {} 解析中断: {}", ncx_path, e);
                    break;
                }
            };
            match event {
                Event::Start(ref e) => {
                    depth += 1;
                    let current = open_points.last().copied();
                    if xml::local_name_is(e, "navPoint") {
                        open_points.push(pending.len());
                        pending.push(PendingNavPoint::default());
                    } else if xml::local_name_is(e, "navLabel") {
                        if label_owner.is_none() {
                            label_owner = current.filter(|&i| pending[i].label.is_none());
                        }
                    } else if xml::local_name_is(e, "text") {
                        if let (Some(owner), None) = (label_owner, label_text.as_ref()) {
                            if pending[owner].label.is_none() {
                                label_text = Some(LabelText {
                                    owner,
                                    depth,
                                    text: String::new(),
                                });
                            }
                        }
                    } else if xml::local_name_is(e, "content") {
                        if let Some(i) = current.filter(|&i| pending[i].src.is_none()) {
                            let src = match xml::attribute(e, b"src") {
                                Ok(src) => src.unwrap_or_default(),
                                Err(err) => {
                                    log::warn!("无法读取content的src属性: {}", err);
                                    String::new()
                                }
                            };
                            pending[i].src = Some(src);
                        }
                    }
                }
                Event::Text(ref e) => {
                    if let Some(label) = label_text.as_mut() {
                        label.text.push_str(&xml::text(e));
                    }
                }
                Event::CData(ref e) => {
                    if let Some(label) = label_text.as_mut() {
                        label.text.push_str(&xml::cdata(e));
                    }
                }
                Event::End(ref e) => {
                    if label_text.as_ref().is_some_and(|label| label.depth == depth) {
                        if let Some(label) = label_text.take() {
                            pending[label.owner].label = Some(label.text.trim().to_string());
                        }
                    }
                    let name = e.local_name();
                    if name.as_ref().eq_ignore_ascii_case(b"navLabel") {
                        label_owner = None;
                    } else if name.as_ref().eq_ignore_ascii_case(b"navPoint") {
                        open_points.pop();
                    }
                    depth = depth.saturating_sub(1);
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        let entries = pending
            .into_iter()
            .filter_map(|point| match (point.label, point.src) {
                (Some(label), Some(src)) if !src.trim().is_empty() => Some(NavEntry {
                    label,
                    src: src.trim().to_string(),
                }),
                _ => {
                    log::warn!("跳过缺少标题或内容引用的导航点");
                    None
                }
            })
            .collect();

        Ncx {
            path: ncx_path.to_string(),
            entries,
        }
    }

    /// 将导航条目解析为归档中的导航点
    ///
    /// src按OPF目录解析；若该路径不存在而相对NCX目录的路径存在，则使用后者。
    pub fn nav_points(&self, archive: &Archive, package_dir: &str, config: &ExtractConfig) -> Vec<NavPoint> {
        let ncx_dir = path::parent_dir(&self.path);
        self.entries
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                let (file, anchor) = path::split_fragment(&entry.src);
                let href = path::percent_decode(file);

                let mut resolved = path::join(package_dir, &href);
                if ncx_dir != package_dir && !archive.contains(&resolved) {
                    let alternative = path::join(ncx_dir, &href);
                    if archive.contains(&alternative) {
                        resolved = alternative;
                    }
                }

                let title = if entry.label.is_empty() {
                    config.section_title(index + 1)
                } else {
                    entry.label.clone()
                };

                NavPoint {
                    title,
                    href,
                    path: resolved,
                    anchor: anchor.map(path::percent_decode),
                    index,
                }
            })
            .collect()
    }
}
