use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{FloorError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    Http,
    Https,
    File,
}

impl Scheme {
    pub fn as_str(self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
            Scheme::File => "file",
        }
    }
}

/// A validated reference to a source image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    scheme: Scheme,
    /// Everything after `scheme://`
    rest: String,
}

fn invalid(raw: &str, why: &str) -> FloorError {
    FloorError::InputValidation(format!("'{}' is not a valid locator: {}", raw, why))
}

fn valid_host(host: &str) -> bool {
    let (name, port) = match host.rsplit_once(':') {
        Some((name, port)) => (name, Some(port)),
        None => (host, None),
    };
    if let Some(port) = port {
        if port.is_empty() || port.parse::<u16>().is_err() {
            return false;
        }
    }
    !name.is_empty()
        && !name.starts_with('.')
        && !name.ends_with('.')
        && !name.contains("..")
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.')
}

impl Locator {
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.is_empty() {
            return Err(invalid(raw, "empty"));
        }
        if raw.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(invalid(raw, "contains whitespace or control characters"));
        }

        let (scheme, rest) = raw
            .split_once("://")
            .ok_or_else(|| invalid(raw, "missing scheme"))?;
        let scheme = match scheme.to_ascii_lowercase().as_str() {
            "http" => Scheme::Http,
            "https" => Scheme::Https,
            "file" => Scheme::File,
            other => return Err(invalid(raw, &format!("unsupported scheme '{}'", other))),
        };

        match scheme {
            Scheme::Http | Scheme::Https => {
                let host = rest.split(['/', '?', '#']).next().unwrap_or_default();
                // Userinfo is not accepted
                if host.contains('@') || !valid_host(host) {
                    return Err(invalid(raw, "missing or malformed host"));
                }
            }
            Scheme::File => {
                if !rest.starts_with('/') || rest.len() < 2 {
                    return Err(invalid(raw, "file locators need an absolute path"));
                }
            }
        }

        Ok(Self {
            scheme,
            rest: rest.to_string(),
        })
    }

    /// Build a `file://` locator from a local path, made absolute against
    /// the current directory.
    pub fn from_path(path: &Path) -> Result<Self> {
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()
                .map_err(|e| FloorError::InputValidation(format!("cannot resolve {}: {}", path.display(), e)))?
                .join(path)
        };
        let text = absolute.to_str().ok_or_else(|| {
            FloorError::InputValidation(format!("path is not UTF-8: {}", absolute.display()))
        })?;
        Self::parse(&format!("file://{}", text))
    }

    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    /// Local path for `file://` locators
    pub fn file_path(&self) -> Option<PathBuf> {
        match self.scheme {
            Scheme::File => Some(PathBuf::from(&self.rest)),
            _ => None,
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.scheme.as_str(), self.rest)
    }
}
