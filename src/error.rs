// SPDX-License-Identifier: MPL-2.0
use thiserror::Error;

use crate::auth::AuthError;
use crate::i18n::CatalogError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config Error: {0}")]
    Config(String),

    #[error("Catalog Error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Auth Error: {0}")]
    Auth(#[from] AuthError),
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Error::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_io_error_produces_io_variant() {
        let io_error = std::io::Error::other("boom");
        let err: Error = io_error.into();
        match err {
            Error::Io(inner) => assert!(inner.to_string().contains("boom")),
            _ => panic!("expected Io variant"),
        }
    }

    #[test]
    fn config_error_formats_properly() {
        let err = Error::Config("bad field".into());
        assert_eq!(format!("{}", err), "Config Error: bad field");
    }

    #[test]
    fn toml_parse_error_maps_to_config() {
        let parse = toml::from_str::<toml::Table>("not = valid = toml").unwrap_err();
        let err: Error = parse.into();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn auth_error_is_wrapped() {
        let err: Error = AuthError::InvalidCredentials.into();
        assert!(format!("{}", err).starts_with("Auth Error:"));
    }
}
