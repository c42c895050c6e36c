use crate::ConnectError;
use rumqttc::TlsConfiguration;
use std::path::{Path, PathBuf};

/// PEM files used for mutual TLS with the broker.
#[derive(Debug, Clone)]
pub struct CredentialBundle {
    pub root_ca: PathBuf,
    pub private_key: PathBuf,
    pub client_certificate: PathBuf,
}

impl CredentialBundle {
    /// Reads the three files and builds the client's TLS configuration.
    pub fn load(&self) -> Result<TlsConfiguration, ConnectError> {
        let ca = read(&self.root_ca)?;
        let key = read(&self.private_key)?;
        let cert = read(&self.client_certificate)?;

        Ok(TlsConfiguration::Simple {
            ca,
            alpn: None,
            client_auth: Some((cert, key)),
        })
    }
}

fn read(path: &Path) -> Result<Vec<u8>, ConnectError> {
    std::fs::read(path).map_err(|source| ConnectError::Credentials {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn bundle_in(dir: &TempDir) -> CredentialBundle {
        CredentialBundle {
            root_ca: dir.path().join("root-CA.pem"),
            private_key: dir.path().join("private.pem.key"),
            client_certificate: dir.path().join("certificate.pem.crt"),
        }
    }

    #[test]
    fn test_load_reads_all_three_files() {
        let dir = TempDir::new().unwrap();
        let bundle = bundle_in(&dir);
        fs::write(&bundle.root_ca, b"ca").unwrap();
        fs::write(&bundle.private_key, b"key").unwrap();
        fs::write(&bundle.client_certificate, b"cert").unwrap();

        match bundle.load().unwrap() {
            TlsConfiguration::Simple {
                ca, client_auth, ..
            } => {
                assert_eq!(ca, b"ca");
                assert_eq!(client_auth, Some((b"cert".to_vec(), b"key".to_vec())));
            }
            _ => panic!("expected a simple TLS configuration"),
        }
    }

    #[test]
    fn test_missing_file_names_the_path() {
        let dir = TempDir::new().unwrap();
        let bundle = bundle_in(&dir);
        fs::write(&bundle.root_ca, b"ca").unwrap();

        match bundle.load() {
            Err(ConnectError::Credentials { path, .. }) => assert_eq!(path, bundle.private_key),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("expected the missing key file to fail"),
        }
    }
}
