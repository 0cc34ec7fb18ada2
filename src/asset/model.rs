//! 样式资源数据模型
//! 描述宿主资源注册表中的样式表，核心逻辑只读

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use serde::{Deserialize, Serialize};

/// 已注册样式表描述
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StylesheetDescriptor {
    pub handle: String,
    pub source_url: Option<String>,
    #[serde(default)]
    pub dependencies: BTreeSet<String>,
}

impl StylesheetDescriptor {
    pub fn new(handle: impl Into<String>, source_url: Option<&str>) -> Self {
        Self {
            handle: handle.into(),
            source_url: source_url.map(str::to_string),
            dependencies: BTreeSet::new(),
        }
    }

    pub fn with_dependencies<I, S>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies.extend(deps.into_iter().map(Into::into));
        self
    }
}

impl fmt::Display for StylesheetDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source_url {
            Some(src) => write!(f, "{} ({})", self.handle, src),
            None => write!(f, "{}", self.handle),
        }
    }
}

/// 当前主题的主样式表及其声明的依赖
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeInfo {
    pub stylesheet_handle: String,
    #[serde(default)]
    pub dependencies: BTreeSet<String>,
}

impl ThemeInfo {
    pub fn new(stylesheet_handle: impl Into<String>) -> Self {
        Self {
            stylesheet_handle: stylesheet_handle.into(),
            dependencies: BTreeSet::new(),
        }
    }

    /// handle是主题样式本身或其依赖
    pub fn owns(&self, handle: &str) -> bool {
        self.stylesheet_handle == handle || self.dependencies.contains(handle)
    }
}

/// 宿主资源注册表（外部协作者）
pub trait AssetRegistry: Send + Sync {
    /// 当前响应已注册的全部样式表
    fn registered_styles(&self) -> &HashMap<String, StylesheetDescriptor>;
    /// 当前响应排队输出的样式表handle（保持入队顺序）
    fn queued_styles(&self) -> &[String];
    /// 当前主题信息
    fn theme(&self) -> Option<&ThemeInfo>;
}

/// 自持数据的资源注册表
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StyleRegistry {
    registered: HashMap<String, StylesheetDescriptor>,
    queue: Vec<String>,
    theme: Option<ThemeInfo>,
}

impl StyleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册样式表，同名handle以后注册者为准
    pub fn register(&mut self, descriptor: StylesheetDescriptor) -> &mut Self {
        self.registered.insert(descriptor.handle.clone(), descriptor);
        self
    }

    /// 入队（重复入队忽略）
    pub fn enqueue(&mut self, handle: impl Into<String>) -> &mut Self {
        let handle = handle.into();
        if !self.queue.contains(&handle) {
            self.queue.push(handle);
        }
        self
    }

    /// 注册并入队
    pub fn add(&mut self, descriptor: StylesheetDescriptor) -> &mut Self {
        let handle = descriptor.handle.clone();
        self.register(descriptor).enqueue(handle)
    }

    pub fn set_theme(&mut self, theme: ThemeInfo) -> &mut Self {
        self.theme = Some(theme);
        self
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl AssetRegistry for StyleRegistry {
    fn registered_styles(&self) -> &HashMap<String, StylesheetDescriptor> {
        &self.registered
    }

    fn queued_styles(&self) -> &[String] {
        &self.queue
    }

    fn theme(&self) -> Option<&ThemeInfo> {
        self.theme.as_ref()
    }
}
