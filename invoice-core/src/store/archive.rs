use std::fs;
use std::io;
use std::path::PathBuf;

use crate::error::Result;

/// Durable storage for rendered invoice files.
pub trait DocumentArchive {
    /// Store `bytes` for `invoice_number`, replacing any previous file, and
    /// return the URL it can be fetched from.
    fn put(&self, invoice_number: &str, bytes: &[u8]) -> Result<String>;

    /// Drop the file stored for `invoice_number`. Removing a file that is
    /// not there succeeds.
    fn remove(&self, invoice_number: &str) -> Result<()>;
}

/// Archive on the local filesystem, laid out as
/// `<root>/invoices/invoice_<number>.pdf`.
#[derive(Debug, Clone)]
pub struct FsArchive {
    root: PathBuf,
    /// Prefix for returned URLs, e.g. `https://files.example.com`. When
    /// unset, `file://` URLs are returned.
    public_base_url: Option<String>,
}

impl FsArchive {
    pub fn new<P: Into<PathBuf>>(root: P, public_base_url: Option<String>) -> Self {
        FsArchive {
            root: root.into(),
            public_base_url: public_base_url.map(|u| u.trim_end_matches('/').to_string()),
        }
    }

    fn relative_path(invoice_number: &str) -> String {
        format!("invoices/invoice_{invoice_number}.pdf")
    }

    /// Where the file for `invoice_number` is (or would be) stored.
    pub fn path_for(&self, invoice_number: &str) -> PathBuf {
        self.root.join(Self::relative_path(invoice_number))
    }
}

impl DocumentArchive for FsArchive {
    fn put(&self, invoice_number: &str, bytes: &[u8]) -> Result<String> {
        let path = self.path_for(invoice_number);
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(&path, bytes)?;
        log::debug!("archived {} bytes to {}", bytes.len(), path.display());

        let url = match &self.public_base_url {
            Some(base) => format!("{}/{}", base, Self::relative_path(invoice_number)),
            None => {
                let absolute = fs::canonicalize(&path)?;
                format!("file://{}", absolute.display())
            }
        };
        Ok(url)
    }

    fn remove(&self, invoice_number: &str) -> Result<()> {
        let path = self.path_for(invoice_number);
        match fs::remove_file(&path) {
            Ok(()) => {
                log::debug!("removed {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_under_invoices_dir_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let archive = FsArchive::new(dir.path(), Some("https://cdn.example.com/".to_string()));

        let url = archive.put("0000042", b"first").unwrap();
        assert_eq!(url, "https://cdn.example.com/invoices/invoice_0000042.pdf");

        archive.put("0000042", b"second").unwrap();
        let stored = fs::read(dir.path().join("invoices/invoice_0000042.pdf")).unwrap();
        assert_eq!(stored, b"second");
    }

    #[test]
    fn file_url_without_base() {
        let dir = tempfile::tempdir().unwrap();
        let archive = FsArchive::new(dir.path(), None);
        let url = archive.put("0000001", b"%PDF").unwrap();
        assert!(url.starts_with("file://"));
        assert!(url.ends_with("/invoices/invoice_0000001.pdf"));
    }

    #[test]
    fn remove_deletes_file_and_tolerates_absence() {
        let dir = tempfile::tempdir().unwrap();
        let archive = FsArchive::new(dir.path(), None);
        archive.put("0000007", b"%PDF").unwrap();
        assert!(archive.path_for("0000007").exists());

        archive.remove("0000007").unwrap();
        assert!(!archive.path_for("0000007").exists());
        archive.remove("0000007").unwrap();
    }
}
