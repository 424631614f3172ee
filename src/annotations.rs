//! Annotation keys recognised on workloads and the compatibility switch that
//! enables the legacy scheme.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Domain served by the workload's own address.
pub const INTERNAL_HOSTNAME_KEY: &str = "external-dns.alpha.kubernetes.io/internal-hostname";

/// Domain served by the addresses of the workload's node.
pub const HOSTNAME_KEY: &str = "external-dns.alpha.kubernetes.io/hostname";

/// Legacy equivalent of [`INTERNAL_HOSTNAME_KEY`].
pub const LEGACY_INTERNAL_HOSTNAME_KEY: &str = "dns.alpha.kubernetes.io/internal";

/// Legacy equivalent of [`HOSTNAME_KEY`].
pub const LEGACY_HOSTNAME_KEY: &str = "dns.alpha.kubernetes.io/external";

/// Compatibility value that turns on the legacy annotation overlay.
pub const KOPS_DNS_CONTROLLER: &str = "kops-dns-controller";

/// A pair of annotation keys: one mapping to the workload address, one to
/// the node addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnnotationKeys {
    /// Key whose value is a domain resolved to the workload address.
    pub internal_hostname: &'static str,
    /// Key whose value is a domain resolved to the node addresses.
    pub hostname: &'static str,
}

/// Keys always consulted.
pub const PRIMARY: AnnotationKeys = AnnotationKeys {
    internal_hostname: INTERNAL_HOSTNAME_KEY,
    hostname: HOSTNAME_KEY,
};

/// Keys consulted only under [`Compatibility::KopsDnsController`].
pub const LEGACY: AnnotationKeys = AnnotationKeys {
    internal_hostname: LEGACY_INTERNAL_HOSTNAME_KEY,
    hostname: LEGACY_HOSTNAME_KEY,
};

/// Compatibility mode of the source.
///
/// Parsed leniently: only the exact string `kops-dns-controller` selects the
/// legacy overlay, any other value (including empty) disables it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Compatibility {
    /// Only the primary annotation keys are honoured.
    #[default]
    None,
    /// The legacy keys are honoured on top of the primary ones.
    KopsDnsController,
}

impl Compatibility {
    /// Annotation key pairs to consult, primary first.
    pub fn key_sets(&self) -> &'static [AnnotationKeys] {
        match self {
            Compatibility::None => &[PRIMARY],
            Compatibility::KopsDnsController => &[PRIMARY, LEGACY],
        }
    }

    /// String form used in configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            Compatibility::None => "",
            Compatibility::KopsDnsController => KOPS_DNS_CONTROLLER,
        }
    }
}

impl From<&str> for Compatibility {
    fn from(value: &str) -> Self {
        if value == KOPS_DNS_CONTROLLER {
            Compatibility::KopsDnsController
        } else {
            Compatibility::None
        }
    }
}

impl From<String> for Compatibility {
    fn from(value: String) -> Self {
        Compatibility::from(value.as_str())
    }
}

impl From<Compatibility> for String {
    fn from(value: Compatibility) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for Compatibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Compatibility::None => f.write_str("none"),
            Compatibility::KopsDnsController => f.write_str(KOPS_DNS_CONTROLLER),
        }
    }
}
