use std::path::{Component, Path, PathBuf};

/// Scratch directory for a single test under the cargo target directory.
#[derive(Debug, Clone)]
pub struct TestFs {
    root: PathBuf,
}

#[allow(unused)]
impl TestFs {
    /// Creates an empty directory for `path`, removing leftovers of an
    /// earlier run.
    pub fn new(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let mut root = PathBuf::from(env!("CARGO_TARGET_TMPDIR"))
            .join("dllfwd")
            .join("testout");
        root.push(normalize(path.as_ref()));

        match std::fs::remove_dir_all(&root) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => return Err(e),
            _ => (),
        }

        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn create_dir(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        std::fs::create_dir_all(self.join_path(path))
    }

    pub fn read_to_string(&self, path: impl AsRef<Path>) -> std::io::Result<String> {
        std::fs::read_to_string(self.join_path(path))
    }

    pub fn exists(&self, path: impl AsRef<Path>) -> bool {
        self.join_path(path).exists()
    }

    pub fn join_path(&self, path: impl AsRef<Path>) -> PathBuf {
        self.root.join(normalize(path.as_ref()))
    }
}

fn normalize(path: impl AsRef<Path>) -> PathBuf {
    let mut normalized = PathBuf::new();

    for component in path.as_ref().components() {
        match component {
            Component::ParentDir => {
                if !normalized.pop() {
                    panic!("path normalization traversed outside of root");
                }
            }
            Component::Normal(p) => {
                normalized.push(p);
            }
            _ => continue,
        }
    }

    normalized
}
