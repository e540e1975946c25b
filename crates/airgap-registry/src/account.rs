//! Watch-only accounts (crypto-account).
//!
//! An account is a master fingerprint plus a list of output descriptors, each
//! wrapping one [`HdKey`]. The keys are for watching, not deriving, so chain
//! codes are stripped on the way in and never written out.

use airgap_proto::{
    DecodeError, Result,
    cbor::{self, MapBuilder, MapView, Value},
};

use crate::{
    hdkey::HdKey,
    keypath::Fingerprint,
    registry_type::RegistryType,
    schema::Capabilities,
    tags::{self, account_keys},
};

/// Script wrapper around a key in an output descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScriptExpression {
    /// `sh(...)`
    ScriptHash,
    /// `wsh(...)`
    WitnessScriptHash,
    /// `pk(...)`
    PublicKey,
    /// `pkh(...)`
    PublicKeyHash,
    /// `wpkh(...)`
    WitnessPublicKeyHash,
    /// `combo(...)`
    Combo,
    /// `raw(...)`
    RawScript,
    /// `tr(...)`
    Taproot,
    /// `cosigner(...)`
    Cosigner,
}

impl ScriptExpression {
    /// CBOR tag.
    pub const fn tag(self) -> u64 {
        match self {
            Self::ScriptHash => tags::SCRIPT_HASH,
            Self::WitnessScriptHash => tags::WITNESS_SCRIPT_HASH,
            Self::PublicKey => tags::PUBLIC_KEY,
            Self::PublicKeyHash => tags::PUBLIC_KEY_HASH,
            Self::WitnessPublicKeyHash => tags::WITNESS_PUBLIC_KEY_HASH,
            Self::Combo => tags::COMBO,
            Self::RawScript => tags::RAW_SCRIPT,
            Self::Taproot => tags::TAPROOT,
            Self::Cosigner => tags::COSIGNER,
        }
    }

    /// Expression for `tag`.
    ///
    /// # Errors
    ///
    /// [`DecodeError::InvalidEnum`] for unknown tags and for the multisig
    /// expressions, which wrap more than one key.
    pub fn from_tag(tag: u64) -> Result<Self> {
        Ok(match tag {
            tags::SCRIPT_HASH => Self::ScriptHash,
            tags::WITNESS_SCRIPT_HASH => Self::WitnessScriptHash,
            tags::PUBLIC_KEY => Self::PublicKey,
            tags::PUBLIC_KEY_HASH => Self::PublicKeyHash,
            tags::WITNESS_PUBLIC_KEY_HASH => Self::WitnessPublicKeyHash,
            tags::COMBO => Self::Combo,
            tags::RAW_SCRIPT => Self::RawScript,
            tags::TAPROOT => Self::Taproot,
            tags::COSIGNER => Self::Cosigner,
            other => return Err(DecodeError::InvalidEnum(other)),
        })
    }
}

/// One output descriptor: zero or more script wrappers around a key.
///
/// `script` lists wrappers outermost first, so `sh(wpkh(key))` is
/// `[ScriptHash, WitnessPublicKeyHash]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OutputDescriptor {
    /// Script wrappers, outermost first
    pub script: Vec<ScriptExpression>,
    /// Wrapped key
    pub key: HdKey,
}

impl OutputDescriptor {
    /// Descriptor for `key` wrapped in `script`.
    pub fn new(script: Vec<ScriptExpression>, key: HdKey) -> Self {
        Self { script, key }
    }

    fn to_tagged(&self, capabilities: Capabilities) -> Value {
        let key = HdKey { chain_code: None, ..self.key.clone() };
        let inner = self
            .script
            .iter()
            .rev()
            .fold(cbor::tagged(tags::HDKEY, key.to_cbor_with(capabilities)), |inner, expression| {
                cbor::tagged(expression.tag(), inner)
            });
        cbor::tagged(tags::OUTPUT, inner)
    }

    fn from_tagged(value: &Value) -> Result<Self> {
        let mut current = cbor::untag(value, tags::OUTPUT, "crypto-output")?;
        let mut script = Vec::new();

        loop {
            match current.as_tag() {
                Some((tags::HDKEY, inner)) => {
                    let key = HdKey::from_cbor(inner)?.without_chain_code();
                    return Ok(Self { script, key });
                },
                Some((tag, inner)) => {
                    script.push(ScriptExpression::from_tag(tag)?);
                    current = inner;
                },
                None => return Err(DecodeError::UnexpectedType { expected: "crypto-hdkey" }),
            }
        }
    }
}

/// A master fingerprint and the account keys derived from it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Account {
    master_fingerprint: Fingerprint,
    descriptors: Vec<OutputDescriptor>,
}

impl Account {
    /// Account over `descriptors`. Chain codes are dropped.
    pub fn new(master_fingerprint: Fingerprint, descriptors: Vec<OutputDescriptor>) -> Self {
        let descriptors = descriptors
            .into_iter()
            .map(|OutputDescriptor { script, key }| OutputDescriptor { script, key: key.without_chain_code() })
            .collect();
        Self { master_fingerprint, descriptors }
    }

    /// Fingerprint of the master key.
    pub fn master_fingerprint(&self) -> Fingerprint {
        self.master_fingerprint
    }

    /// Output descriptors in wire order.
    pub fn descriptors(&self) -> &[OutputDescriptor] {
        &self.descriptors
    }

    /// Every account key, in wire order, none carrying a chain code.
    pub fn hd_keys(&self) -> impl Iterator<Item = &HdKey> {
        self.descriptors.iter().map(|descriptor| &descriptor.key)
    }
}

impl RegistryType for Account {
    const TAG: u64 = tags::ACCOUNT;
    const UR_TYPE: &'static str = "crypto-account";

    fn to_cbor_with(&self, capabilities: Capabilities) -> Value {
        let descriptors =
            self.descriptors.iter().map(|descriptor| descriptor.to_tagged(capabilities)).collect();

        MapBuilder::new()
            .insert(account_keys::MASTER_FINGERPRINT, cbor::uint(self.master_fingerprint.0))
            .insert(account_keys::OUTPUT_DESCRIPTORS, Value::Array(descriptors))
            .build()
    }

    fn from_cbor(value: &Value) -> Result<Self> {
        let map = MapView::new(value)?;

        let master_fingerprint = Fingerprint(cbor::as_u32(
            map.required(account_keys::MASTER_FINGERPRINT, "master-fingerprint")?,
        )?);
        let descriptors = cbor::as_array(map.required(account_keys::OUTPUT_DESCRIPTORS, "output-descriptors")?)?
            .iter()
            .map(OutputDescriptor::from_tagged)
            .collect::<Result<_>>()?;

        Ok(Self { master_fingerprint, descriptors })
    }
}

#[cfg(test)]
mod tests {
    use hex_literal::hex;

    use super::*;

    fn key() -> HdKey {
        HdKey {
            chain_code: Some([7; 32]),
            ..HdKey::from_key_data(hex!("02fef03a2bd3de113f1dc1cdb1e69aa4d935dc3458d542d796f5827abbb1a58b5e"))
        }
    }

    #[test]
    fn chain_code_is_never_written() {
        let descriptor = OutputDescriptor { script: vec![], key: key() };
        let account = Account { master_fingerprint: Fingerprint(1), descriptors: vec![descriptor] };

        let decoded = Account::from_bytes(&account.to_bytes().unwrap()).unwrap();
        assert!(decoded.hd_keys().all(|key| key.chain_code.is_none()));
    }

    #[test]
    fn chain_code_is_stripped_on_decode() {
        let with_chain_code = cbor::tagged(
            tags::OUTPUT,
            cbor::tagged(tags::PUBLIC_KEY_HASH, cbor::tagged(tags::HDKEY, key().to_cbor())),
        );
        let value = MapBuilder::new()
            .insert(account_keys::MASTER_FINGERPRINT, cbor::uint(1u32))
            .insert(account_keys::OUTPUT_DESCRIPTORS, Value::Array(vec![with_chain_code]))
            .build();

        let account = Account::from_cbor(&value).unwrap();
        assert_eq!(account.descriptors()[0].script, vec![ScriptExpression::PublicKeyHash]);
        assert_eq!(account.descriptors()[0].key.chain_code, None);
    }

    #[test]
    fn nested_scripts_keep_their_order() {
        let account = Account::new(Fingerprint(9), vec![OutputDescriptor::new(
            vec![ScriptExpression::ScriptHash, ScriptExpression::WitnessPublicKeyHash],
            key(),
        )]);

        let value = account.to_cbor();
        let map = MapView::new(&value).unwrap();
        let descriptor = &cbor::as_array(map.get(account_keys::OUTPUT_DESCRIPTORS).unwrap()).unwrap()[0];
        let sh = cbor::untag(descriptor, tags::OUTPUT, "output").unwrap();
        let wpkh = cbor::untag(sh, tags::SCRIPT_HASH, "sh").unwrap();
        assert!(cbor::untag(wpkh, tags::WITNESS_PUBLIC_KEY_HASH, "wpkh").is_ok());

        assert_eq!(Account::from_cbor(&value).unwrap(), account);
    }

    #[test]
    fn multisig_expressions_are_rejected() {
        let multisig = cbor::tagged(
            tags::OUTPUT,
            cbor::tagged(tags::MULTISIG, cbor::tagged(tags::HDKEY, key().to_cbor())),
        );
        let value = MapBuilder::new()
            .insert(account_keys::MASTER_FINGERPRINT, cbor::uint(1u32))
            .insert(account_keys::OUTPUT_DESCRIPTORS, Value::Array(vec![multisig]))
            .build();
        assert_eq!(Account::from_cbor(&value), Err(DecodeError::InvalidEnum(tags::MULTISIG)));
    }

    #[test]
    fn missing_fields_are_named() {
        let value = MapBuilder::new().insert(account_keys::MASTER_FINGERPRINT, cbor::uint(1u32)).build();
        assert_eq!(Account::from_cbor(&value), Err(DecodeError::MissingField("output-descriptors")));

        let value = MapBuilder::new().insert(account_keys::OUTPUT_DESCRIPTORS, Value::Array(vec![])).build();
        assert_eq!(Account::from_cbor(&value), Err(DecodeError::MissingField("master-fingerprint")));
    }
}
