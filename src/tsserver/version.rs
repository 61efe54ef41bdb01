//! tsserver API versions and the features they gate.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::ClassifyError;

/// A `major.minor.patch` version, ignoring any pre-release suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ApiVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl ApiVersion {
    /// First version that answers `encodedSemanticClassifications-full`.
    pub const MIN_SEMANTIC_TOKENS: ApiVersion = ApiVersion::new(3, 7, 0);

    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    pub fn supports_semantic_tokens(&self) -> bool {
        *self >= Self::MIN_SEMANTIC_TOKENS
    }
}

impl Ord for ApiVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.major, self.minor, self.patch).cmp(&(other.major, other.minor, other.patch))
    }
}

impl PartialOrd for ApiVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for ApiVersion {
    type Err = ClassifyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let core = s.trim().split(['-', '+']).next().unwrap_or_default();
        let mut parts = core.split('.');
        let mut next = |name: &str| -> Result<u32, ClassifyError> {
            match parts.next() {
                None | Some("") if name != "major" => Ok(0),
                Some(part) => part.parse().map_err(|_| {
                    ClassifyError::config(format!("Invalid {} component in version {:?}", name, s))
                }),
                None => Err(ClassifyError::config(format!("Empty version {:?}", s))),
            }
        };
        let major = next("major")?;
        let minor = next("minor")?;
        let patch = next("patch")?;
        Ok(Self::new(major, minor, patch))
    }
}
