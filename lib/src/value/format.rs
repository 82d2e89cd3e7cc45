use std::path::Path;

use crate::error::{Chainable, ErrorDetail, Result};
use crate::value::Value;

/// A structured data format records can be written in.
pub trait Format: Sized {
    /// The data format's error type.
    type Error: serde::de::Error + ErrorDetail + 'static;

    /// File extensions, without the leading `.`, handled by this format.
    const EXTENSIONS: &'static [&'static str];

    /// Parses `string` as the data format `Self` as a `T` or returns an error
    /// if the `string` is an invalid `T`.
    fn from_str<T: serde::de::DeserializeOwned>(string: &str) -> Result<T, Self::Error>;

    /// Reads the file at `path` and parses it as a `T`.
    fn read<T: serde::de::DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T> {
        let path = path.as_ref();
        let string = std::fs::read_to_string(path).chain_with(|| error! {
            "failed to read file",
            "path" => path.display(),
        })?;

        Ok(Self::from_str(&string)?)
    }
}

macro_rules! impl_format {
    ($name:ident [$($ext:literal),+] : $func:expr, $E:ty) => (
        #[derive(Debug, Default, Clone, Copy)]
        pub struct $name;

        impl Format for $name {
            type Error = $E;

            const EXTENSIONS: &'static [&'static str] = &[$($ext),+];

            fn from_str<T: serde::de::DeserializeOwned>(s: &str) -> Result<T, $E> {
                $func(s)
            }
        }
    );
}

impl_format!(Yaml ["yml", "yaml"]: serde_yaml::from_str, serde_yaml::Error);
impl_format!(Json ["json"]: serde_json::from_str, serde_json::Error);
impl_format!(Toml ["toml"]: toml::from_str, toml::de::Error);

/// The format a file is written in, as determined by its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Yaml,
    Json,
    Toml,
}

impl FileFormat {
    /// Returns the format handling files with extension `ext`, if any.
    ///
    /// ```rust
    /// use lexicon::value::FileFormat;
    ///
    /// assert_eq!(FileFormat::from_ext("yml"), Some(FileFormat::Yaml));
    /// assert_eq!(FileFormat::from_ext("toml"), Some(FileFormat::Toml));
    /// assert_eq!(FileFormat::from_ext("md"), None);
    /// ```
    pub fn from_ext(ext: &str) -> Option<FileFormat> {
        if Yaml::EXTENSIONS.contains(&ext) {
            Some(FileFormat::Yaml)
        } else if Json::EXTENSIONS.contains(&ext) {
            Some(FileFormat::Json)
        } else if Toml::EXTENSIONS.contains(&ext) {
            Some(FileFormat::Toml)
        } else {
            None
        }
    }

    pub fn read<P: AsRef<Path>>(self, path: P) -> Result<Value> {
        match self {
            FileFormat::Yaml => Yaml::read(path),
            FileFormat::Json => Json::read(path),
            FileFormat::Toml => Toml::read(path),
        }
    }
}
