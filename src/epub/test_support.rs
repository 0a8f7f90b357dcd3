//! 测试用的EPUB构造工具
//!
//! 在内存中拼装zip，避免测试依赖磁盘上的样例文件。

use std::io::{Cursor, Write};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

pub const CONTAINER_XML: &str = r#"<?xml version="1.0"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
    <rootfiles>
        <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
    </rootfiles>
</container>"#;

/// 按顺序收集文件，最后生成zip字节
pub struct EpubBuilder {
    files: Vec<(String, Vec<u8>)>,
}

impl EpubBuilder {
    pub fn new() -> Self {
        Self { files: Vec::new() }
    }

    /// 带`mimetype`和标准`container.xml`（指向`OEBPS/content.opf`）
    pub fn standard() -> Self {
        Self::new()
            .file("mimetype", "application/epub+zip")
            .file("META-INF/container.xml", CONTAINER_XML)
    }

    pub fn file(self, name: &str, content: &str) -> Self {
        self.binary(name, content.as_bytes())
    }

    pub fn binary(mut self, name: &str, content: &[u8]) -> Self {
        self.files.push((name.to_string(), content.to_vec()));
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, content) in &self.files {
            zip.start_file(name.as_str(), SimpleFileOptions::default()).unwrap();
            zip.write_all(content).unwrap();
        }
        zip.finish().unwrap().into_inner()
    }
}

/// 生成OPF文件内容
///
/// `items`为（id, href, media-type），`spine`为itemref的idref列表。
pub fn opf(title: &str, creator: &str, items: &[(&str, &str, &str)], spine: &[&str]) -> String {
    let manifest: String = items
        .iter()
        .map(|(id, href, media_type)| {
            format!(r#"<item id="{}" href="{}" media-type="{}"/>"#, id, href, media_type)
        })
        .collect();
    let itemrefs: String = spine
        .iter()
        .map(|idref| format!(r#"<itemref idref="{}"/>"#, idref))
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<package version="2.0" xmlns="http://www.idpf.org/2007/opf" unique-identifier="BookId">
    <metadata xmlns:dc="http://purl.org/dc/elements/1.1/">
        <dc:title>{}</dc:title>
        <dc:creator>{}</dc:creator>
    </metadata>
    <manifest>{}</manifest>
    <spine>{}</spine>
</package>"#,
        title, creator, manifest, itemrefs
    )
}

/// 生成NCX文件内容，`points`为（标题, src）
pub fn ncx(points: &[(&str, &str)]) -> String {
    let nav_points: String = points
        .iter()
        .enumerate()
        .map(|(i, (label, src))| {
            format!(
                r#"<navPoint id="np{0}" playOrder="{0}"><navLabel><text>{1}</text></navLabel><content src="{2}"/></navPoint>"#,
                i + 1,
                label,
                src
            )
        })
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<ncx xmlns="http://www.daisy.org/z3986/2005/ncx/" version="2005-1">
    <docTitle><text>Book</text></docTitle>
    <navMap>{}</navMap>
</ncx>"#,
        nav_points
    )
}

/// 用给定的body内容生成XHTML文档
pub fn xhtml(title: &str, body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<html xmlns="http://www.w3.org/1999/xhtml">
<head><title>{}</title></head>
<body>{}</body>
</html>"#,
        title, body
    )
}
