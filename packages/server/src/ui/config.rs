//! Server configuration.

use std::path::PathBuf;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_STATIC_DIR: &str = "static";
pub const DEFAULT_FILES_DIR: &str = "server_files";

/// Settings the server is started with.
///
/// The binary fills this from command-line flags and environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to bind to (`0` picks an ephemeral port).
    pub port: u16,
    /// Directory holding `index.html` and the `/static/` assets.
    pub static_dir: PathBuf,
    /// Directory uploaded files are written to and served from under `/files/`.
    pub files_dir: PathBuf,
    /// Base URL used when building download links, without a trailing slash.
    pub public_url: String,
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// `http://localhost:<port>`
    pub fn default_public_url(port: u16) -> String {
        format!("http://localhost:{}", port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
            files_dir: PathBuf::from(DEFAULT_FILES_DIR),
            public_url: Self::default_public_url(DEFAULT_PORT),
        }
    }
}
