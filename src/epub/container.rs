use crate::epub::archive::Archive;
use crate::epub::error::{EpubError, Result};
use crate::epub::xml;
use quick_xml::events::Event;

/// 容器描述文件在归档中的固定位置
pub const CONTAINER_PATH: &str = "META-INF/container.xml";

/// Container.xml的解析结果
#[derive(Debug, Clone)]
pub struct Container {
    /// 第一个rootfile的full-path，即OPF包文件路径
    pub root_path: String,
}

impl Container {
    /// 从归档中定位OPF包文件
    ///
    /// # 返回值
    /// * `Result<String>` - OPF文件在归档中的完整路径
    pub fn resolve(archive: &mut Archive) -> Result<String> {
        let content = archive
            .read_text(CONTAINER_PATH)?
            .ok_or(EpubError::MissingContainer)?;
        let container = Self::parse_xml(&content)?;
        log::debug!("OPF包文件路径: {}", container.root_path);
        Ok(container.root_path)
    }

    /// 解析container.xml内容
    ///
    /// 取文档中第一个本地名为`rootfile`的元素，读取其`full-path`属性。
    ///
    /// # 参数
    /// * `xml_content` - container.xml的文件内容
    ///
    /// # 返回值
    /// * `Result<Container>` - 缺少rootfile或full-path时返回`MalformedContainer`
    pub fn parse_xml(xml_content: &str) -> Result<Container> {
        let mut reader = xml::reader(xml_content);
        let mut buf = Vec::new();

        loop {
            let event = reader
                .read_event_into(&mut buf)
                .map_err(|e| EpubError::MalformedContainer(e.to_string()))?;
            match event {
                Event::Start(ref e) if e.local_name().as_ref() == b"rootfile" => {
                    let full_path = xml::attribute(e, b"full-path")
                        .map_err(|e| EpubError::MalformedContainer(e.to_string()))?
                        .filter(|path| !path.trim().is_empty())
                        .ok_or_else(|| {
                            EpubError::MalformedContainer("rootfile缺少full-path属性".to_string())
                        })?;
                    return Ok(Container {
                        root_path: full_path.trim().to_string(),
                    });
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Err(EpubError::MalformedContainer(
            "没有找到任何rootfile条目".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::epub::test_support::{CONTAINER_XML, EpubBuilder};

    #[test]
    fn test_parse_container_xml() {
        let container = Container::parse_xml(CONTAINER_XML).unwrap();
        assert_eq!(container.root_path, "OEBPS/content.opf");
    }

    #[test]
    fn test_first_rootfile_wins() {
        let container_xml = r#"<?xml version="1.0"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
    <rootfiles>
        <rootfile full-path="content.opf" media-type="application/oebps-package+xml"/>
        <rootfile full-path="other.opf" media-type="application/oebps-package+xml"/>
    </rootfiles>
</container>"#;

        let container = Container::parse_xml(container_xml).unwrap();
        assert_eq!(container.root_path, "content.opf");
    }

    #[test]
    fn test_missing_full_path() {
        let container_xml = r#"<container><rootfiles><rootfile media-type="application/oebps-package+xml"/></rootfiles></container>"#;
        let result = Container::parse_xml(container_xml);
        assert!(matches!(result, Err(EpubError::MalformedContainer(_))));
    }

    #[test]
    fn test_missing_rootfile() {
        let result = Container::parse_xml("<container><rootfiles/></container>");
        assert!(matches!(result, Err(EpubError::MalformedContainer(_))));
    }

    #[test]
    fn test_resolve_missing_container() {
        let bytes = EpubBuilder::new().file("mimetype", "application/epub+zip").build();
        let mut archive = Archive::open(bytes).unwrap();
        assert!(matches!(
            Container::resolve(&mut archive),
            Err(EpubError::MissingContainer)
        ));
    }

    #[test]
    fn test_resolve_from_archive() {
        let bytes = EpubBuilder::standard().build();
        let mut archive = Archive::open(bytes).unwrap();
        assert_eq!(Container::resolve(&mut archive).unwrap(), "OEBPS/content.opf");
    }
}
