use anyhow::{bail, Result};
use log::{error, info, warn};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Name of the file that points the default data directory somewhere else
const REDIRECT_FILE_NAME: &str = ".daybook_redirect";

/// CsvConnection manages the data directory and one CSV file per collection
#[derive(Clone, Debug)]
pub struct CsvConnection {
    base_directory: PathBuf,
}

impl CsvConnection {
    /// Create a new CSV connection with a base directory
    pub fn new<P: AsRef<Path>>(base_directory: P) -> Result<Self> {
        let base_path = base_directory.as_ref().to_path_buf();

        if !base_path.exists() {
            fs::create_dir_all(&base_path)?;
            info!("Created data directory: {}", base_path.display());
        }

        Ok(Self { base_directory: base_path })
    }

    /// Open the given directory, following a redirect file if one is present
    pub fn open<P: AsRef<Path>>(data_directory: P) -> Result<Self> {
        let data_directory = data_directory.as_ref().to_path_buf();
        Self::new(Self::resolve_redirect(&data_directory))
    }

    /// Default data directory: `~/Documents/Daybook`
    pub fn default_data_directory() -> PathBuf {
        dirs::document_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("Daybook")
    }

    fn resolve_redirect(data_directory: &Path) -> PathBuf {
        let redirect_file = data_directory.join(REDIRECT_FILE_NAME);
        if !redirect_file.exists() {
            return data_directory.to_path_buf();
        }

        match fs::read_to_string(&redirect_file) {
            Ok(redirected_path) => {
                let redirected_path = redirected_path.trim();
                let path = PathBuf::from(redirected_path);
                if path.exists() {
                    info!("Found redirect file, using data directory: {}", path.display());
                    path
                } else {
                    warn!(
                        "Redirect file points to non-existent directory: {}. Using default.",
                        redirected_path
                    );
                    data_directory.to_path_buf()
                }
            }
            Err(e) => {
                error!("Failed to read redirect file: {}. Using default directory.", e);
                data_directory.to_path_buf()
            }
        }
    }

    /// Get the base directory path
    pub fn base_directory(&self) -> &Path {
        &self.base_directory
    }

    /// Path of the CSV file backing a collection
    pub fn collection_file_path(&self, collection: &str) -> Result<PathBuf> {
        let valid = !collection.is_empty()
            && collection
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            bail!("Invalid collection name: {:?}", collection);
        }
        Ok(self.base_directory.join(format!("{}.csv", collection)))
    }

    /// Ensure a collection file exists with its header row
    pub fn ensure_collection_file_exists(&self, collection: &str) -> Result<PathBuf> {
        let file_path = self.collection_file_path(collection)?;
        if !self.base_directory.exists() {
            fs::create_dir_all(&self.base_directory)?;
        }
        // create_new never truncates a file another writer put in place
        match OpenOptions::new().write(true).create_new(true).open(&file_path) {
            Ok(mut file) => {
                file.write_all(b"key,fields\n")?;
                info!("Created collection file: {}", file_path.display());
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {}
            Err(e) => return Err(e.into()),
        }
        Ok(file_path)
    }
}
