//! quick-xml读取辅助函数
//!
//! container.xml、OPF和NCX的解析共用同一套宽松的读取配置。

use crate::epub::error::{EpubError, Result};
use quick_xml::events::{BytesCData, BytesStart, BytesText};
use quick_xml::reader::Reader;

/// 创建宽松配置的XML读取器
///
/// 空元素被展开为开始/结束两个事件，结束标签名不做匹配校验，
/// 文本保持原样（由调用方决定是否去除首尾空白）。
pub(crate) fn reader(xml_content: &str) -> Reader<&[u8]> {
    let mut reader = Reader::from_str(xml_content);
    reader.config_mut().trim_text(false);
    reader.config_mut().expand_empty_elements = true;
    reader.config_mut().check_end_names = false;
    reader
}

/// 读取元素上本地名为`name`的属性值
pub(crate) fn attribute(e: &BytesStart, name: &[u8]) -> Result<Option<String>> {
    for attr_result in e.attributes() {
        let attr = attr_result.map_err(|err| EpubError::Xml(quick_xml::Error::InvalidAttr(err)))?;
        if attr.key.local_name().as_ref() == name {
            let value = match attr.unescape_value() {
                Ok(value) => value.into_owned(),
                Err(_) => String::from_utf8_lossy(&attr.value).into_owned(),
            };
            return Ok(Some(value));
        }
    }
    Ok(None)
}

/// 解码文本节点
///
/// XML中未声明的实体（如`&nbsp;`）无法转义时保留原文。
pub(crate) fn text(e: &BytesText) -> String {
    match e.unescape() {
        Ok(text) => text.into_owned(),
        Err(_) => String::from_utf8_lossy(e.as_ref()).into_owned(),
    }
}

/// 解码CDATA节点
pub(crate) fn cdata(e: &BytesCData) -> String {
    String::from_utf8_lossy(e.as_ref()).into_owned()
}

/// 元素本地名是否与`name`相同（忽略命名空间前缀和大小写）
pub(crate) fn local_name_is(e: &BytesStart, name: &str) -> bool {
    e.local_name().as_ref().eq_ignore_ascii_case(name.as_bytes())
}
