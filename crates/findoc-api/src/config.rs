use std::env;
use std::path::PathBuf;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub listen_addr: String,
    /// Directory uploads are written to for the duration of one request.
    pub upload_dir: PathBuf,
    /// Directory analysis records are persisted under.
    pub output_dir: PathBuf,
}

impl AppConfig {
    const DEFAULT_LISTEN_ADDR: &'static str = "0.0.0.0:8000";
    const DEFAULT_UPLOAD_DIR: &'static str = "data";
    const DEFAULT_OUTPUT_DIR: &'static str = "outputs";

    pub fn from_env() -> Self {
        let listen_addr = env::var("FINDOC_LISTEN_ADDR")
            .unwrap_or_else(|_| Self::DEFAULT_LISTEN_ADDR.to_string());

        let upload_dir = env::var("FINDOC_UPLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(Self::DEFAULT_UPLOAD_DIR));

        let output_dir = env::var("FINDOC_OUTPUT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(Self::DEFAULT_OUTPUT_DIR));

        Self {
            listen_addr,
            upload_dir,
            output_dir,
        }
    }
}
