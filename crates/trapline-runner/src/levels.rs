use std::path::{Path, PathBuf};

use trapline_platformer::level::{LevelError, LevelLayout, LevelSource};

/// Level files in a directory, served in file-name order.
///
/// Files are parsed on demand so an edited level is picked up on the next
/// restart. A file that fails to load is reported and treated as missing.
#[derive(Debug, Clone, Default)]
pub struct DirectoryLevels {
    paths: Vec<PathBuf>,
}

impl DirectoryLevels {
    pub fn scan(dir: &Path) -> Result<Self, LevelError> {
        let entries =
            std::fs::read_dir(dir).map_err(|e| LevelError::Io(format!("{}: {e}", dir.display())))?;
        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                matches!(
                    path.extension().and_then(|e| e.to_str()),
                    Some("toml" | "json")
                )
            })
            .collect();
        paths.sort();
        if paths.is_empty() {
            return Err(LevelError::Empty);
        }
        tracing::info!(dir = %dir.display(), count = paths.len(), "level directory scanned");
        Ok(Self { paths })
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

impl LevelSource for DirectoryLevels {
    fn layout(&self, index: usize) -> Option<LevelLayout> {
        let path = self.paths.get(index)?;
        match LevelLayout::load(path) {
            Ok(mut layout) => {
                if layout.name.is_empty() {
                    layout.name = path
                        .file_stem()
                        .and_then(|s| s.to_str())
                        .unwrap_or("unnamed")
                        .to_string();
                }
                Some(layout)
            },
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to load level");
                None
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("trapline-levels-{name}-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    const ONE_BLOCK: &str = r#"
        [[object]]
        kind = "block"
        x = 0.0
        y = 704.0
    "#;

    #[test]
    fn files_are_served_in_name_order() {
        let dir = scratch_dir("order");
        std::fs::write(dir.join("02-second.toml"), ONE_BLOCK).unwrap();
        std::fs::write(dir.join("01-first.toml"), ONE_BLOCK).unwrap();
        std::fs::write(dir.join("notes.txt"), "not a level").unwrap();

        let levels = DirectoryLevels::scan(&dir).unwrap();
        assert_eq!(levels.len(), 2);
        assert_eq!(levels.layout(0).unwrap().name, "01-first");
        assert_eq!(levels.layout(1).unwrap().name, "02-second");
        assert!(levels.layout(2).is_none());
    }

    #[test]
    fn broken_file_reads_as_missing() {
        let dir = scratch_dir("broken");
        std::fs::write(dir.join("01.toml"), "[[object]]\nkind = 7").unwrap();
        let levels = DirectoryLevels::scan(&dir).unwrap();
        assert!(levels.layout(0).is_none());
    }

    #[test]
    fn empty_directory_is_an_error() {
        let dir = scratch_dir("empty");
        assert!(matches!(DirectoryLevels::scan(&dir), Err(LevelError::Empty)));
    }
}
