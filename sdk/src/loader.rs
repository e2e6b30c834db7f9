// Copyright 2025 Adobe. All rights reserved.
// This file is licensed to you under the Apache License,
// Version 2.0 (http://www.apache.org/licenses/LICENSE-2.0)
// or the MIT license (http://opensource.org/licenses/MIT),
// at your option.

// Unless required by applicable law or agreed to in writing,
// this software is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR REPRESENTATIONS OF ANY KIND, either express or
// implied. See the LICENSE-MIT and LICENSE-APACHE files for the
// specific language governing permissions and limitations under
// each license.

//! Fetching container bytes from a file path or URL.

use std::{io, path::PathBuf};

use async_trait::async_trait;
use log::debug;
use url::Url;

/// Transport failures while loading a container.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The remote host could not be reached.
    #[error("cannot connect: {0}")]
    Connection(String),

    #[error("\"{uri}\" was not found")]
    NotFound { uri: String },

    /// The server answered with a non-success status other than 404.
    #[error("\"{uri}\" returned status {status}")]
    Status { uri: String, status: u16 },

    /// The location's scheme has no loader, or is not in the allowed list.
    #[error("unsupported protocol: {0}")]
    UnsupportedProtocol(String),

    #[error(transparent)]
    Io(#[from] io::Error),

    /// An error occured in the underlying transport.
    #[error("an error occurred while loading: {0}")]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

#[async_trait]
pub trait ByteLoader: Send + Sync {
    /// Resolve `location` to the bytes it names.
    async fn load(&self, location: &str) -> Result<Vec<u8>, LoadError>;
}

/// Loads local files given as a path or a `file://` URL.
#[derive(Clone, Copy, Debug, Default)]
pub struct FileLoader;

impl FileLoader {
    fn path_of(location: &str) -> Result<PathBuf, LoadError> {
        if location.starts_with("file:") {
            let url = Url::parse(location).map_err(|e| LoadError::Other(Box::new(e)))?;
            url.to_file_path().map_err(|_| {
                LoadError::UnsupportedProtocol(format!("{location} is not a local file"))
            })
        } else {
            Ok(PathBuf::from(location))
        }
    }
}

#[async_trait]
impl ByteLoader for FileLoader {
    async fn load(&self, location: &str) -> Result<Vec<u8>, LoadError> {
        let path = Self::path_of(location)?;
        tokio::fs::read(&path).await.map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => LoadError::NotFound {
                uri: location.to_owned(),
            },
            _ => LoadError::Io(e),
        })
    }
}

#[cfg(feature = "http_reqwest")]
pub use http_impl::HttpLoader;

#[cfg(feature = "http_reqwest")]
mod http_impl {
    use async_trait::async_trait;

    use super::{ByteLoader, LoadError};

    /// Loads `http` and `https` URLs with a [`reqwest::Client`].
    #[derive(Clone, Debug, Default)]
    pub struct HttpLoader {
        client: reqwest::Client,
    }

    impl HttpLoader {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_client(client: reqwest::Client) -> Self {
            Self { client }
        }
    }

    impl From<reqwest::Error> for LoadError {
        fn from(value: reqwest::Error) -> Self {
            if value.is_connect() || value.is_timeout() {
                Self::Connection(value.to_string())
            } else {
                Self::Other(Box::new(value))
            }
        }
    }

    #[async_trait]
    impl ByteLoader for HttpLoader {
        async fn load(&self, location: &str) -> Result<Vec<u8>, LoadError> {
            let response = self.client.get(location).send().await?;

            let status = response.status();
            if status == reqwest::StatusCode::NOT_FOUND {
                return Err(LoadError::NotFound {
                    uri: location.to_owned(),
                });
            }
            if !status.is_success() {
                return Err(LoadError::Status {
                    uri: location.to_owned(),
                    status: status.as_u16(),
                });
            }

            Ok(response.bytes().await?.to_vec())
        }
    }
}

/// Dispatches on the location's scheme to the file or HTTP loader.
///
/// Locations that do not parse as an absolute URL are treated as file paths.
/// Single letter schemes are taken to be Windows drive letters.
#[derive(Clone, Debug)]
pub struct DefaultLoader {
    allowed_schemes: Vec<String>,
    file: FileLoader,
    #[cfg(feature = "http_reqwest")]
    http: HttpLoader,
}

impl DefaultLoader {
    pub fn new<I, S>(allowed_schemes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            allowed_schemes: allowed_schemes
                .into_iter()
                .map(|s| s.as_ref().trim().to_ascii_lowercase())
                .collect(),
            file: FileLoader,
            #[cfg(feature = "http_reqwest")]
            http: HttpLoader::new(),
        }
    }

    fn scheme_of(location: &str) -> String {
        match Url::parse(location) {
            Ok(url) if url.scheme().len() > 1 => url.scheme().to_owned(),
            _ => "file".to_owned(),
        }
    }

    pub fn is_allowed(&self, scheme: &str) -> bool {
        self.allowed_schemes.iter().any(|s| s == scheme)
    }
}

impl Default for DefaultLoader {
    fn default() -> Self {
        Self::new(["file", "http", "https"])
    }
}

#[async_trait]
impl ByteLoader for DefaultLoader {
    async fn load(&self, location: &str) -> Result<Vec<u8>, LoadError> {
        let scheme = Self::scheme_of(location);
        if !self.is_allowed(&scheme) {
            return Err(LoadError::UnsupportedProtocol(scheme));
        }
        debug!("loading {location} ({scheme})");

        match scheme.as_str() {
            "file" => self.file.load(location).await,
            #[cfg(feature = "http_reqwest")]
            "http" | "https" => self.http.load(location).await,
            _ => Err(LoadError::UnsupportedProtocol(scheme)),
        }
    }
}
