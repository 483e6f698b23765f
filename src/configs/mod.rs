use std::env;
use std::io;
use std::path::{Path, PathBuf};

pub mod schema;
pub mod settings;
pub mod storage;

pub use schema::SchemaManager;
pub use settings::{Auth, Database, Settings};
pub use storage::Storage;

/// Resolve a relative path against the working directory, falling back to the
/// crate root so bundled files are still found when launched from elsewhere.
pub fn normalize_path(path: &str) -> io::Result<PathBuf> {
    let raw = Path::new(path);

    if raw.is_absolute() {
        return Ok(raw.to_path_buf());
    }

    let from_cwd = env::current_dir()?.join(raw);
    if from_cwd.exists() {
        return Ok(from_cwd);
    }

    Ok(Path::new(env!("CARGO_MANIFEST_DIR")).join(raw))
}
