use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tempfile::TempDir;

use crate::step::StepList;

/// 模板引用解析：注册名 → 文件路径。
///
/// 未注册的引用按文件路径原样返回；无法解码的文件会在定位阶段
/// 以 InvalidTemplate 报出，这里不做存在性检查。
#[derive(Debug, Clone, Default)]
pub struct TemplateStore {
    entries: HashMap<String, PathBuf>,
}

impl TemplateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册一个命名模板。重名覆盖旧条目。
    #[allow(dead_code)]
    pub fn insert(&mut self, name: impl Into<String>, path: impl Into<PathBuf>) {
        self.entries.insert(name.into(), path.into());
    }

    /// 把引用解析为路径。
    pub fn resolve(&self, reference: &str) -> PathBuf {
        self.entries
            .get(reference)
            .cloned()
            .unwrap_or_else(|| PathBuf::from(reference))
    }
}

/// 一次自动化会话拥有的资源：临时目录、模板注册表与步骤列表。
///
/// 临时目录随会话一起丢弃时确定性删除（所有退出路径一致），
/// 不依赖任何延迟回收机制。
pub struct Session {
    temp_dir: TempDir,
    pub templates: TemplateStore,
    pub steps: StepList,
}

impl Session {
    pub fn new() -> Result<Self> {
        let temp_dir = tempfile::Builder::new()
            .prefix("gui-automation-")
            .tempdir()
            .context("创建会话临时目录失败")?;
        Ok(Self {
            temp_dir,
            templates: TemplateStore::new(),
            steps: StepList::new(),
        })
    }

    /// 会话临时目录。
    #[allow(dead_code)]
    pub fn temp_path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// 把上传的模板字节写入临时目录并注册为 `name`。
    #[allow(dead_code)]
    pub fn register_template(&mut self, name: &str, bytes: &[u8]) -> Result<PathBuf> {
        let path = self.temp_dir.path().join(name);
        fs::write(&path, bytes).with_context(|| format!("写入模板 {name} 失败"))?;
        self.templates.insert(name, &path);
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::{Session, TemplateStore};
    use std::path::PathBuf;

    #[test]
    fn resolve_prefers_registered_names() {
        let mut store = TemplateStore::new();
        store.insert("button", "/tmp/stored/button.png");
        assert_eq!(
            store.resolve("button"),
            PathBuf::from("/tmp/stored/button.png")
        );
        assert_eq!(
            store.resolve("other/path.png"),
            PathBuf::from("other/path.png")
        );
    }

    #[test]
    fn registered_template_lands_in_the_session_temp_dir() {
        let mut session = Session::new().unwrap();
        let path = session.register_template("upload.png", b"bytes").unwrap();
        assert!(path.starts_with(session.temp_path()));
        assert_eq!(std::fs::read(&path).unwrap(), b"bytes");
        assert_eq!(session.templates.resolve("upload.png"), path);
    }

    #[test]
    fn temp_dir_is_removed_when_the_session_drops() {
        let session = Session::new().unwrap();
        let temp_path = session.temp_path().to_path_buf();
        assert!(temp_path.exists());
        drop(session);
        assert!(!temp_path.exists());
    }
}
