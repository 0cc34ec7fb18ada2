//! CSS压缩工具
//! 去除注释、换行与制表符，并折叠连续空白

use once_cell::sync::Lazy;
use regex::Regex;

// 非贪婪匹配，支持跨行注释
static COMMENT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)/\*.*?\*/").unwrap());
static LINE_BREAK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\r\n\t]").unwrap());
// 仅ASCII空白；NBSP 等Unicode空白原样保留
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?-u:\s)+").unwrap());

/// CSS压缩器
pub struct CssMinifier;

impl CssMinifier {
    /// 压缩CSS文本，结果满足 minify(minify(x)) == minify(x)
    pub fn minify(css: &str) -> String {
        let mut current = Self::single_pass(css);
        // 删除注释或换行可能拼出新的 /* */，重复直到不动点
        loop {
            let next = Self::single_pass(&current);
            if next == current {
                return current;
            }
            current = next;
        }
    }

    fn single_pass(css: &str) -> String {
        let without_comments = COMMENT_RE.replace_all(css, "");
        let single_line = LINE_BREAK_RE.replace_all(&without_comments, "");
        WHITESPACE_RE
            .replace_all(&single_line, " ")
            .trim_matches(|c: char| c.is_ascii_whitespace() || c == '\0' || c == '\x0B')
            .to_string()
    }
}
