//! Conversion options
//!
//! The source convention and the output dialect are independent axes. Both
//! deserialize from host config files and parse from short names.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error_msg::ConvertError;

/// How the input delimits blocks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceConvention {
    /// Python-style: a trailing `:` opens a block, dedent closes it
    #[default]
    #[serde(alias = "python")]
    Indentation,
    /// Java-style: `{` opens, `}` closes
    #[serde(alias = "java")]
    Braces,
}

/// Target pseudocode spelling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// IB style: `loop i from 0 to 4`, `END IF`
    #[serde(alias = "dialectA")]
    Ib,
    /// Cambridge/IGCSE style: `FOR i ← 0 TO 4`, `NEXT i`, `ENDIF`
    #[default]
    #[serde(alias = "dialectB", alias = "igcse")]
    Cambridge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    pub convention: SourceConvention,
    pub dialect: Dialect,
}

impl ParseOptions {
    pub fn new(convention: SourceConvention, dialect: Dialect) -> Self {
        ParseOptions { convention, dialect }
    }
}

impl FromStr for SourceConvention {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "indentation" | "python" | "py" => Ok(SourceConvention::Indentation),
            "braces" | "java" => Ok(SourceConvention::Braces),
            _ => Err(ConvertError::UnknownConvention(s.trim().to_string())),
        }
    }
}

impl FromStr for Dialect {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ib" | "dialecta" => Ok(Dialect::Ib),
            "cambridge" | "igcse" | "dialectb" => Ok(Dialect::Cambridge),
            _ => Err(ConvertError::UnknownDialect(s.trim().to_string())),
        }
    }
}

/// Parses `<convention>:<dialect>`, e.g. `python:ib` or `java:cambridge`.
impl FromStr for ParseOptions {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (convention, dialect) = s
            .split_once(':')
            .ok_or_else(|| ConvertError::InvalidOptions(s.to_string()))?;
        Ok(ParseOptions {
            convention: convention.parse()?,
            dialect: dialect.parse()?,
        })
    }
}

impl fmt::Display for SourceConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceConvention::Indentation => write!(f, "indentation"),
            SourceConvention::Braces => write!(f, "braces"),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dialect::Ib => write!(f, "ib"),
            Dialect::Cambridge => write!(f, "cambridge"),
        }
    }
}

impl fmt::Display for ParseOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.convention, self.dialect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_aliases() {
        assert_eq!("python".parse::<SourceConvention>(), Ok(SourceConvention::Indentation));
        assert_eq!("Java".parse::<SourceConvention>(), Ok(SourceConvention::Braces));
        assert_eq!("dialectA".parse::<Dialect>(), Ok(Dialect::Ib));
        assert_eq!("IGCSE".parse::<Dialect>(), Ok(Dialect::Cambridge));
    }

    #[test]
    fn test_unknown_names_are_errors() {
        assert_eq!(
            "cobol".parse::<SourceConvention>(),
            Err(ConvertError::UnknownConvention("cobol".to_string()))
        );
        assert!(matches!("pascal".parse::<Dialect>(), Err(ConvertError::UnknownDialect(_))));
        assert!(matches!("python".parse::<ParseOptions>(), Err(ConvertError::InvalidOptions(_))));
    }

    #[test]
    fn test_options_pair_roundtrip() {
        let opts: ParseOptions = "java:ib".parse().unwrap();
        assert_eq!(opts, ParseOptions::new(SourceConvention::Braces, Dialect::Ib));
        assert_eq!(opts.to_string(), "braces:ib");
    }

    #[test]
    fn test_default_is_python_to_cambridge() {
        let opts = ParseOptions::default();
        assert_eq!(opts.convention, SourceConvention::Indentation);
        assert_eq!(opts.dialect, Dialect::Cambridge);
    }

    #[test]
    fn test_deserialize_with_aliases() {
        let opts: ParseOptions =
            serde_json::from_str(r#"{"convention":"java","dialect":"dialectA"}"#).unwrap();
        assert_eq!(opts, ParseOptions::new(SourceConvention::Braces, Dialect::Ib));

        let partial: ParseOptions = serde_json::from_str(r#"{"dialect":"igcse"}"#).unwrap();
        assert_eq!(partial.convention, SourceConvention::Indentation);
        assert_eq!(partial.dialect, Dialect::Cambridge);
    }
}
