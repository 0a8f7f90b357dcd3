//! 归档内路径处理
//!
//! EPUB内部的引用都是相对于引用方文件所在目录的URL路径，
//! 这里统一处理目录截取、相对路径拼接以及百分号解码。

use percent_encoding::percent_decode_str;

/// 返回路径所在目录（不含结尾的`/`）
///
/// 位于归档根目录的文件返回空字符串。
pub fn parent_dir(path: &str) -> &str {
    match path.rfind('/') {
        Some(pos) => &path[..pos],
        None => "",
    }
}

/// 将`href`解析为相对于`base_dir`的归档路径
///
/// 以`/`开头的`href`视为相对于归档根目录。
pub fn join(base_dir: &str, href: &str) -> String {
    if let Some(absolute) = href.strip_prefix('/') {
        return normalize(absolute);
    }
    if base_dir.is_empty() {
        normalize(href)
    } else {
        normalize(&format!("{}/{}", base_dir, href))
    }
}

/// 规范化路径：去掉空段和`.`，并消解`..`
pub fn normalize(path: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }
    parts.join("/")
}

/// 百分号解码，非法的UTF-8序列按替换字符处理
pub fn percent_decode(value: &str) -> String {
    percent_decode_str(value).decode_utf8_lossy().into_owned()
}

/// 将`src`按第一个`#`拆分为（文件路径，锚点）
///
/// 空锚点（如`chapter.html#`）视为没有锚点。
pub fn split_fragment(src: &str) -> (&str, Option<&str>) {
    match src.split_once('#') {
        Some((file, anchor)) if !anchor.is_empty() => (file, Some(anchor)),
        Some((file, _)) => (file, None),
        None => (src, None),
    }
}
