use std::fs::File;
use std::io::Write;
use std::path::Path;

const DEFAULT_ENV: &str = r#"
DATABASE_PATH="rocketpool.db"
SERVER_HOST=0.0.0.0
SERVER_PORT=8080
TEMPLATE_DIR="templates"
RUST_LOG=info
"#;

/// Writes a default `.env` into `dir` unless one is already there.
/// Returns whether a file was created.
pub fn setup_env(dir: &Path) -> std::io::Result<bool> {
    let env_path = dir.join(".env");
    if env_path.exists() {
        return Ok(false);
    }
    let mut file = File::create(&env_path)?;
    file.write_all(DEFAULT_ENV.as_bytes())?;
    Ok(true)
}
