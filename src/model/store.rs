//! Whole-layout persistence. Loading replaces the model, saving writes all of
//! it; there is no merging.

use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use ron::ser::PrettyConfig;
use tracing::debug;

use super::layout::DesktopLayout;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("layout file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("layout file {} is malformed: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },
    #[error("cannot serialize layout: {0}")]
    Serialize(#[from] ron::Error),
}

pub trait LayoutStore {
    fn load(&self) -> Result<Option<DesktopLayout>, StoreError>;
    fn save(&self, layout: &DesktopLayout) -> Result<(), StoreError>;
}

pub struct RonFileStore {
    path: PathBuf,
}

impl RonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self { Self { path: path.into() } }

    pub fn path(&self) -> &Path { &self.path }
}

pub fn parse_layout(text: &str, path: &Path) -> Result<DesktopLayout, StoreError> {
    ron::from_str(text).map_err(|source| StoreError::Parse { path: path.to_path_buf(), source })
}

pub fn read_layout(path: &Path) -> Result<DesktopLayout, StoreError> {
    let text = std::fs::read_to_string(path)
        .map_err(|source| StoreError::Io { path: path.to_path_buf(), source })?;
    parse_layout(&text, path)
}

impl LayoutStore for RonFileStore {
    fn load(&self) -> Result<Option<DesktopLayout>, StoreError> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no saved layout");
            return Ok(None);
        }
        read_layout(&self.path).map(Some)
    }

    fn save(&self, layout: &DesktopLayout) -> Result<(), StoreError> {
        let text = ron::ser::to_string_pretty(layout, PrettyConfig::default())?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|source| StoreError::Io { path: parent.to_path_buf(), source })?;
        }
        std::fs::write(&self.path, text)
            .map_err(|source| StoreError::Io { path: self.path.clone(), source })?;
        debug!(path = %self.path.display(), windows = layout.len(), "layout saved");
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryStore {
    layout: Mutex<Option<DesktopLayout>>,
}

impl MemoryStore {
    pub fn new(layout: Option<DesktopLayout>) -> Self { Self { layout: Mutex::new(layout) } }
}

impl LayoutStore for MemoryStore {
    fn load(&self) -> Result<Option<DesktopLayout>, StoreError> { Ok(self.layout.lock().clone()) }

    fn save(&self, layout: &DesktopLayout) -> Result<(), StoreError> {
        *self.layout.lock() = Some(layout.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::window_info::{ToolWindowAnchor, ToolWindowType, WindowInfo};
    use crate::sys::geometry::Rect;

    fn sample() -> DesktopLayout {
        let mut floating = WindowInfo::new("Find", ToolWindowAnchor::Bottom)
            .with_type(ToolWindowType::Floating)
            .with_order(0);
        floating.floating_bounds = Some(Rect::new(100, 100, 640, 480));
        DesktopLayout::from_infos([
            WindowInfo::new("Project", ToolWindowAnchor::Left).with_order(0).with_visible(true),
            floating,
        ])
    }

    #[test]
    fn missing_file_loads_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = RonFileStore::new(dir.path().join("layout.ron"));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = RonFileStore::new(dir.path().join("nested").join("layout.ron"));
        store.save(&sample()).unwrap();
        assert_eq!(store.load().unwrap(), Some(sample()));
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("layout.ron");
        std::fs::write(&path, "(windows: [oops").unwrap();
        let err = RonFileStore::new(&path).load().unwrap_err();
        assert!(matches!(err, StoreError::Parse { .. }));
        assert!(err.to_string().starts_with(&format!("layout file {} is malformed", path.display())));
    }

    #[test]
    fn unreadable_path_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        // a directory cannot be read as a layout
        let err = read_layout(dir.path()).unwrap_err();
        assert!(matches!(err, StoreError::Io { .. }));
        assert!(err.to_string().contains(&dir.path().display().to_string()));
    }

    #[test]
    fn memory_store_keeps_last_save() {
        let store = MemoryStore::default();
        assert!(store.load().unwrap().is_none());
        store.save(&sample()).unwrap();
        assert_eq!(store.load().unwrap().map(|l| l.len()), Some(2));
    }
}
