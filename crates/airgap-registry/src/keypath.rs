//! BIP-32 derivation paths (crypto-keypath) and key fingerprints.

use std::{fmt, str::FromStr};

use airgap_proto::{
    DecodeError, Result,
    cbor::{self, MapBuilder, MapView, Value},
};
use bitcoin::bip32::{self, ChildNumber, DerivationPath};
use serde::{Deserialize, Serialize};

use crate::tags::keypath_keys;

/// Key fingerprint: the first four bytes of HASH160 of a public key, read as
/// a big-endian integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Fingerprint(pub u32);

impl Fingerprint {
    /// Big-endian bytes.
    pub const fn to_bytes(self) -> [u8; 4] {
        self.0.to_be_bytes()
    }
}

impl From<u32> for Fingerprint {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x}", self.0)
    }
}

impl FromStr for Fingerprint {
    type Err = DecodeError;

    /// Exactly eight hex digits, big-endian.
    fn from_str(s: &str) -> Result<Self> {
        let mut bytes = [0u8; 4];
        hex::decode_to_slice(s, &mut bytes)
            .map_err(|err| DecodeError::InvalidHex(format!("fingerprint {s:?}: {err}")))?;
        Ok(Self(u32::from_be_bytes(bytes)))
    }
}

/// One step of a derivation path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathComponent {
    /// A concrete child, normal or hardened
    Child(ChildNumber),
    /// Any child (`*`), optionally hardened (`*'`)
    Wildcard {
        /// Hardened derivation
        hardened: bool,
    },
}

impl PathComponent {
    /// Hardened child `index`.
    ///
    /// # Errors
    ///
    /// [`DecodeError::InvalidPath`] if `index` is 2^31 or above.
    pub fn hardened(index: u32) -> Result<Self> {
        ChildNumber::from_hardened_idx(index).map(Self::Child).map_err(invalid_index)
    }

    /// Normal child `index`.
    ///
    /// # Errors
    ///
    /// [`DecodeError::InvalidPath`] if `index` is 2^31 or above.
    pub fn normal(index: u32) -> Result<Self> {
        ChildNumber::from_normal_idx(index).map(Self::Child).map_err(invalid_index)
    }

    /// Any normal child.
    pub const fn wildcard() -> Self {
        Self::Wildcard { hardened: false }
    }

    /// Child index without the hardened bit, `None` for a wildcard.
    pub fn index(&self) -> Option<u32> {
        match self {
            Self::Child(ChildNumber::Normal { index } | ChildNumber::Hardened { index }) => Some(*index),
            Self::Wildcard { .. } => None,
        }
    }

    /// Whether this step uses hardened derivation.
    pub fn is_hardened(&self) -> bool {
        match self {
            Self::Child(child) => child.is_hardened(),
            Self::Wildcard { hardened } => *hardened,
        }
    }

    fn from_parts(index: Option<u32>, hardened: bool) -> Result<Self> {
        match (index, hardened) {
            (None, hardened) => Ok(Self::Wildcard { hardened }),
            (Some(index), true) => Self::hardened(index),
            (Some(index), false) => Self::normal(index),
        }
    }
}

fn invalid_index(err: bip32::Error) -> DecodeError {
    DecodeError::InvalidPath(err.to_string())
}

impl From<ChildNumber> for PathComponent {
    fn from(child: ChildNumber) -> Self {
        Self::Child(child)
    }
}

impl TryFrom<PathComponent> for ChildNumber {
    type Error = DecodeError;

    fn try_from(component: PathComponent) -> Result<Self> {
        match component {
            PathComponent::Child(child) => Ok(child),
            PathComponent::Wildcard { .. } => {
                Err(DecodeError::InvalidPath("wildcard has no child number".into()))
            },
        }
    }
}

impl fmt::Display for PathComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Child(child) => write!(f, "{child}"),
            Self::Wildcard { hardened: false } => f.write_str("*"),
            Self::Wildcard { hardened: true } => f.write_str("*'"),
        }
    }
}

impl FromStr for PathComponent {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self> {
        let (body, hardened) = match s.strip_suffix(['\'', 'h', 'H']) {
            Some(body) => (body, true),
            None => (s, false),
        };

        if body == "*" {
            return Ok(Self::Wildcard { hardened });
        }
        // `u32::from_str` accepts a leading `+`
        if body.is_empty() || !body.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DecodeError::InvalidPath(format!("invalid component {s:?}")));
        }
        let index: u32 = body
            .parse()
            .map_err(|_| DecodeError::InvalidPath(format!("index out of range in {s:?}")))?;
        Self::from_parts(Some(index), hardened)
    }
}

/// Derivation path with optional origin metadata.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct KeyPath {
    /// Steps from the source key
    pub components: Vec<PathComponent>,
    /// Fingerprint of the key the path starts from
    pub source_fingerprint: Option<Fingerprint>,
    /// Number of derivations from the master key
    pub depth: Option<u8>,
}

impl KeyPath {
    /// Path from `components` without origin metadata.
    pub fn new(components: Vec<PathComponent>) -> Self {
        Self { components, source_fingerprint: None, depth: None }
    }

    /// Attach the source key fingerprint.
    #[must_use]
    pub fn with_source_fingerprint(mut self, fingerprint: Fingerprint) -> Self {
        self.source_fingerprint = Some(fingerprint);
        self
    }

    /// Attach the depth.
    #[must_use]
    pub fn with_depth(mut self, depth: u8) -> Self {
        self.depth = Some(depth);
        self
    }

    /// Untagged CBOR map.
    pub fn to_cbor(&self) -> Value {
        let components = self
            .components
            .iter()
            .flat_map(|component| {
                let index = component.index().map_or_else(|| Value::Array(Vec::new()), cbor::uint);
                [index, Value::Bool(component.is_hardened())]
            })
            .collect();

        MapBuilder::new()
            .insert(keypath_keys::COMPONENTS, Value::Array(components))
            .insert_opt(keypath_keys::SOURCE_FINGERPRINT, self.source_fingerprint.map(|fp| cbor::uint(fp.0)))
            .insert_opt(keypath_keys::DEPTH, self.depth.map(cbor::uint))
            .build()
    }

    /// Parse an untagged CBOR map.
    pub fn from_cbor(value: &Value) -> Result<Self> {
        let map = MapView::new(value)?;

        let items = cbor::as_array(map.required(keypath_keys::COMPONENTS, "components")?)?;
        if items.len() % 2 != 0 {
            return Err(DecodeError::InvalidLength(format!(
                "components: {} items is not index/hardened pairs",
                items.len()
            )));
        }

        let components = items
            .chunks_exact(2)
            .map(|pair| {
                let index = match &pair[0] {
                    Value::Array(range) if range.is_empty() => None,
                    other => Some(cbor::as_u32(other)?),
                };
                PathComponent::from_parts(index, cbor::as_bool(&pair[1])?)
            })
            .collect::<Result<_>>()?;

        let source_fingerprint = map
            .get(keypath_keys::SOURCE_FINGERPRINT)
            .map(|v| cbor::as_u32(v).map(Fingerprint))
            .transpose()?;
        let depth = map
            .get(keypath_keys::DEPTH)
            .map(|v| {
                u8::try_from(cbor::as_u64(v)?)
                    .map_err(|_| DecodeError::UnexpectedType { expected: "depth below 256" })
            })
            .transpose()?;

        Ok(Self { components, source_fingerprint, depth })
    }

    /// Concrete BIP-32 path for deriving a key.
    ///
    /// # Errors
    ///
    /// [`DecodeError::InvalidPath`] if the path contains a wildcard.
    pub fn to_derivation_path(&self) -> Result<DerivationPath> {
        let children = self
            .components
            .iter()
            .map(|component| ChildNumber::try_from(*component))
            .collect::<Result<Vec<_>>>()?;
        Ok(DerivationPath::from(children))
    }
}

impl From<&DerivationPath> for KeyPath {
    fn from(path: &DerivationPath) -> Self {
        Self::new(path.into_iter().copied().map(PathComponent::Child).collect())
    }
}

impl fmt::Display for KeyPath {
    /// `m/44'/60'/0'/0/0`. Origin metadata is not part of the text form.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("m")?;
        for component in &self.components {
            write!(f, "/{component}")?;
        }
        Ok(())
    }
}

impl FromStr for KeyPath {
    type Err = DecodeError;

    /// Accepts `m/44'/60'/0'/0/0`, `44h/60h/0h` and bare `m`.
    fn from_str(s: &str) -> Result<Self> {
        let rest = match s.strip_prefix(['m', 'M']) {
            Some("") => return Ok(Self::default()),
            Some(rest) => rest
                .strip_prefix('/')
                .ok_or_else(|| DecodeError::InvalidPath(format!("expected '/' after 'm' in {s:?}")))?,
            None => s,
        };

        let components = rest.split('/').map(str::parse).collect::<Result<_>>()?;
        Ok(Self::new(components))
    }
}
