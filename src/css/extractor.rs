//! 关键CSS规则提取器
//! 基于正则的词法启发式：匹配 `<选择器><非}字符>{<非}字符>}`，不是CSS解析器。
//! 不处理嵌套花括号（例如 @media 内的规则块），该限制是行为约定的一部分。

use regex::Regex;
use tracing::debug;

use crate::config::ExtractionMode;
use crate::error::CssResult;

/// 单个关键选择器及其规则块正则
#[derive(Debug, Clone)]
struct SelectorPattern {
    selector: String,
    rule_regex: Regex,
}

/// 预编译的关键选择器集合（保持配置顺序）
#[derive(Debug, Clone)]
pub struct CriticalSelectors {
    patterns: Vec<SelectorPattern>,
}

impl CriticalSelectors {
    /// 编译选择器列表，空白选择器忽略
    pub fn compile(selectors: &[String]) -> CssResult<Self> {
        let mut patterns = Vec::with_capacity(selectors.len());
        for selector in selectors.iter().filter(|s| !s.trim().is_empty()) {
            let rule_regex = Regex::new(&format!(r"{}[^}}]*\{{[^}}]*\}}", regex::escape(selector)))?;
            patterns.push(SelectorPattern {
                selector: selector.clone(),
                rule_regex,
            });
        }
        debug!("Compiled {} critical selector patterns", patterns.len());
        Ok(Self { patterns })
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// 按选择器顺序、再按出现顺序收集所有匹配的规则块，不去重
    pub fn extract_critical(&self, css: &str) -> Vec<String> {
        self.patterns
            .iter()
            .flat_map(|pattern| {
                pattern
                    .rule_regex
                    .find_iter(css)
                    .map(|m| m.as_str().to_string())
            })
            .collect()
    }

    /// 正文是否包含任一关键选择器（纯子串判断，不限定于规则块）
    pub fn contains_any(&self, css: &str) -> bool {
        self.patterns.iter().any(|p| css.contains(p.selector.as_str()))
    }

    /// 非关键样式表的输出片段；空字符串表示无贡献
    pub fn select_critical(&self, css: &str, mode: ExtractionMode) -> String {
        if mode == ExtractionMode::WholeSheetOnHit && self.contains_any(css) {
            return css.to_string();
        }
        self.extract_critical(css).concat()
    }
}

/// 一次性提取（内部编译选择器）
pub fn extract_critical(css: &str, selectors: &[String]) -> CssResult<Vec<String>> {
    Ok(CriticalSelectors::compile(selectors)?.extract_critical(css))
}
