use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{P2Error, Result};
use crate::metadata::namespace::{OSGI_ARCH, OSGI_OS, OSGI_WS};
use crate::metadata::SelectionContext;

/// An `os/ws/arch` triple the build produces artifacts for
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetEnvironment {
    pub os: String,
    pub ws: String,
    pub arch: String,
}

impl TargetEnvironment {
    pub fn new(os: impl Into<String>, ws: impl Into<String>, arch: impl Into<String>) -> Self {
        Self {
            os: os.into(),
            ws: ws.into(),
            arch: arch.into(),
        }
    }

    /// Parse `linux/gtk/x86_64`
    pub fn parse(text: &str) -> Result<Self> {
        let parts: Vec<&str> = text.trim().split('/').map(str::trim).collect();
        match parts.as_slice() {
            [os, ws, arch] if !os.is_empty() && !ws.is_empty() && !arch.is_empty() => {
                Ok(Self::new(*os, *ws, *arch))
            }
            _ => Err(P2Error::Config(format!(
                "invalid target environment \"{}\", expected os/ws/arch",
                text
            ))),
        }
    }

    /// Selection context with `osgi.os`, `osgi.ws` and `osgi.arch`
    pub fn to_context(&self) -> SelectionContext {
        SelectionContext::new()
            .with(OSGI_OS, self.os.clone())
            .with(OSGI_WS, self.ws.clone())
            .with(OSGI_ARCH, self.arch.clone())
    }
}

impl fmt::Display for TargetEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.os, self.ws, self.arch)
    }
}

impl FromStr for TargetEnvironment {
    type Err = P2Error;

    fn from_str(s: &str) -> Result<Self> {
        TargetEnvironment::parse(s)
    }
}

impl Serialize for TargetEnvironment {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TargetEnvironment {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        TargetEnvironment::parse(&text).map_err(serde::de::Error::custom)
    }
}
