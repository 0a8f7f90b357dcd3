//! NCX导航元素数据结构定义

/// NCX中的一个导航条目（未解析路径）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavEntry {
    /// navLabel/text的文本，已去除首尾空白，可能为空
    pub label: String,
    /// content元素的src属性，非空
    pub src: String,
}

/// 导航点：一个目录条目及其在归档中的目标位置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavPoint {
    /// 章节标题
    pub title: String,
    /// src中`#`之前的部分（已百分号解码）
    pub href: String,
    /// 解析后的归档路径
    pub path: String,
    /// src中`#`之后的锚点
    pub anchor: Option<String>,
    /// 在有效导航点中的文档顺序
    pub index: usize,
}

impl NavPoint {
    /// 两个导航点是否指向同一个文件
    pub fn same_file(&self, other: &NavPoint) -> bool {
        self.path == other.path
    }
}
