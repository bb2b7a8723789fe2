// Copyright 2025 Fondazione LINKS

// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at

//     http://www.apache.org/licenses/LICENSE-2.0

// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.


use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    bbsplus::{
        ciphersuites::BbsCiphersuite,
        keys::{BBSplusPublicKey, BBSplusSecretKey},
    },
    errors::Error,
    keys::pair::KeyPair,
    schemes::algorithms::BBSplus,
};

pub const KEY_TYPE: &str = "Bls12381G2Key2020";
/// Multicodec prefix of a `bls12_381-g2-pub` key
const BLS12381G2_MULTICODEC: [u8; 2] = [0xeb, 0x01];

/// A BLS12-381 G2 key pair with a stable identifier.
///
/// The identifier is a pure function of the public key and of the controller, so two key pairs
/// loaded from the same key material always share it. A key published under another URL keeps
/// that URL as its verification method; it is not part of the key's identity and is not compared.
#[derive(Clone, Eq, Debug)]
pub struct Bls12381G2KeyPair {
    id: String,
    controller: Option<String>,
    public_key: BBSplusPublicKey,
    private_key: Option<BBSplusSecretKey>,
    verification_method: Option<String>,
}

impl PartialEq for Bls12381G2KeyPair {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.controller == other.controller
            && self.public_key == other.public_key
            && self.private_key == other.private_key
    }
}

/// JSON form of a [`Bls12381G2KeyPair`].
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyDocument {
    pub id: String,
    #[serde(rename = "type")]
    pub key_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub controller: Option<String>,
    pub public_key_hex: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key_hex: Option<String>,
}

impl Bls12381G2KeyPair {
    /// Deterministic key pair from a seed of at least 32 bytes.
    pub fn generate_from_seed<CS: BbsCiphersuite>(seed: &[u8], controller: Option<&str>) -> Result<Self, Error> {
        let (sk, pk) = KeyPair::<BBSplus<CS>>::generate(seed, None, None)?.into_parts();
        Ok(Self::build(pk, Some(sk), controller))
    }

    pub fn generate<CS: BbsCiphersuite>(controller: Option<&str>) -> Result<Self, Error> {
        let (sk, pk) = KeyPair::<BBSplus<CS>>::random()?.into_parts();
        Ok(Self::build(pk, Some(sk), controller))
    }

    /// Assembles a key pair, checking that `public_key` matches `private_key` when both are present.
    pub fn from_keys(
        public_key: BBSplusPublicKey,
        private_key: Option<BBSplusSecretKey>,
        controller: Option<&str>,
    ) -> Result<Self, Error> {
        if let Some(sk) = &private_key {
            if sk.public_key() != public_key {
                return Err(Error::InvalidKeyMaterial("public key does not match private key".to_owned()));
            }
        }
        Ok(Self::build(public_key, private_key, controller))
    }

    fn build(public_key: BBSplusPublicKey, private_key: Option<BBSplusSecretKey>, controller: Option<&str>) -> Self {
        let fingerprint = fingerprint(&public_key);
        let id = match controller {
            Some(c) => format!("{}#{}", c, fingerprint),
            None => format!("did:key:{}#{}", fingerprint, fingerprint),
        };
        Self {
            id,
            controller: controller.map(str::to_owned),
            public_key,
            private_key,
            verification_method: None,
        }
    }

    /// Publishes the key under `verification_method` instead of its identifier.
    pub fn with_verification_method(mut self, verification_method: impl Into<String>) -> Self {
        let verification_method = verification_method.into();
        self.verification_method = (verification_method != self.id).then_some(verification_method);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// URL the key is published under, used as the default `verificationMethod` of proofs.
    pub fn verification_method(&self) -> &str {
        self.verification_method.as_deref().unwrap_or(&self.id)
    }

    pub fn controller(&self) -> Option<&str> {
        self.controller.as_deref()
    }

    pub fn public_key(&self) -> &BBSplusPublicKey {
        &self.public_key
    }

    pub fn private_key(&self) -> Option<&BBSplusSecretKey> {
        self.private_key.as_ref()
    }

    /// Multibase (base16, `f`) encoding of the multicodec prefixed public key.
    pub fn fingerprint(&self) -> String {
        fingerprint(&self.public_key)
    }

    /// Drops the private key.
    pub fn to_public(&self) -> Self {
        Self {
            private_key: None,
            ..self.clone()
        }
    }

    /// `pk (96 bytes) || sk (32 bytes)`, or just `pk` for a public key pair.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = self.public_key.to_bytes().to_vec();
        if let Some(sk) = &self.private_key {
            bytes.extend_from_slice(&sk.to_bytes());
        }
        bytes
    }

    pub fn from_bytes(bytes: &[u8], controller: Option<&str>) -> Result<Self, Error> {
        match bytes.len() {
            BBSplusPublicKey::LENGTH => Self::from_keys(BBSplusPublicKey::from_bytes(bytes)?, None, controller),
            len if len == BBSplusPublicKey::LENGTH + BBSplusSecretKey::LENGTH => {
                let (pk, sk) = bytes.split_at(BBSplusPublicKey::LENGTH);
                Self::from_keys(BBSplusPublicKey::from_bytes(pk)?, Some(BBSplusSecretKey::from_bytes(sk)?), controller)
            }
            len => Err(Error::InvalidKeyMaterial(format!("unexpected key pair length {}", len))),
        }
    }

    pub fn to_document(&self) -> KeyDocument {
        KeyDocument {
            id: self.verification_method().to_owned(),
            key_type: KEY_TYPE.to_owned(),
            controller: self.controller.clone(),
            public_key_hex: self.public_key.encode(),
            private_key_hex: self.private_key.as_ref().map(BBSplusSecretKey::encode),
        }
    }

    /// Key document without the private key, as published for verifiers.
    pub fn to_public_document(&self) -> KeyDocument {
        KeyDocument {
            private_key_hex: None,
            ..self.to_document()
        }
    }

    /// Loads a key document. The document `id` becomes the verification method.
    pub fn from_document(document: &KeyDocument) -> Result<Self, Error> {
        if document.key_type != KEY_TYPE {
            return Err(Error::InvalidKeyMaterial(format!("unsupported key type {}", document.key_type)));
        }

        let public_key = BBSplusPublicKey::from_hex(&document.public_key_hex)?;
        let private_key = document.private_key_hex.as_deref().map(BBSplusSecretKey::from_hex).transpose()?;

        Ok(Self::from_keys(public_key, private_key, document.controller.as_deref())?.with_verification_method(&document.id))
    }

    pub fn from_value(value: &Value) -> Result<Self, Error> {
        let document: KeyDocument =
            serde_json::from_value(value.clone()).map_err(|e| Error::InvalidKeyMaterial(e.to_string()))?;
        Self::from_document(&document)
    }
}

fn fingerprint(public_key: &BBSplusPublicKey) -> String {
    let mut prefixed = BLS12381G2_MULTICODEC.to_vec();
    prefixed.extend_from_slice(&public_key.to_bytes());
    format!("f{}", hex::encode(prefixed))
}

#[cfg(test)]
mod tests {
    use super::Bls12381G2KeyPair;
    use crate::{bbsplus::ciphersuites::Bls12381Sha256, errors::Error};

    const SEED: &[u8] = b"this-IS-just-an-Test-IKM-to-generate-$e(r@#t-key";

    #[test]
    fn identifiers_are_stable() {
        let k1 = Bls12381G2KeyPair::generate_from_seed::<Bls12381Sha256>(SEED, Some("did:example:489398593")).unwrap();
        let k2 = Bls12381G2KeyPair::generate_from_seed::<Bls12381Sha256>(SEED, Some("did:example:489398593")).unwrap();
        assert_eq!(k1.id(), k2.id());
        assert!(k1.id().starts_with("did:example:489398593#feb01"));

        let anonymous = Bls12381G2KeyPair::generate_from_seed::<Bls12381Sha256>(SEED, None).unwrap();
        assert_eq!(anonymous.id(), format!("did:key:{}#{}", k1.fingerprint(), k1.fingerprint()));
    }

    #[test]
    fn bytes_roundtrip() {
        let key_pair = Bls12381G2KeyPair::generate::<Bls12381Sha256>(None).unwrap();
        let bytes = key_pair.to_bytes();
        assert_eq!(bytes.len(), 128);
        assert_eq!(Bls12381G2KeyPair::from_bytes(&bytes, None).unwrap(), key_pair);

        let public = Bls12381G2KeyPair::from_bytes(&bytes[..96], None).unwrap();
        assert_eq!(public, key_pair.to_public());
    }

    #[test]
    fn mismatched_halves_are_rejected() {
        let a = Bls12381G2KeyPair::generate::<Bls12381Sha256>(None).unwrap();
        let b = Bls12381G2KeyPair::generate::<Bls12381Sha256>(None).unwrap();
        let mut bytes = a.public_key().to_bytes().to_vec();
        bytes.extend_from_slice(&b.private_key().unwrap().to_bytes());
        assert!(matches!(Bls12381G2KeyPair::from_bytes(&bytes, None), Err(Error::InvalidKeyMaterial(_))));
    }

    #[test]
    fn public_document_has_no_private_key() {
        let key_pair = Bls12381G2KeyPair::generate_from_seed::<Bls12381Sha256>(SEED, Some("did:example:1")).unwrap();
        let public = serde_json::to_value(key_pair.to_public_document()).unwrap();
        assert!(public.get("privateKeyHex").is_none());
        assert_eq!(public["type"], "Bls12381G2Key2020");

        let full = serde_json::to_value(key_pair.to_document()).unwrap();
        assert_eq!(Bls12381G2KeyPair::from_value(&full).unwrap(), key_pair);
    }

    #[test]
    fn published_keys_keep_their_identity() {
        let key_pair = Bls12381G2KeyPair::generate_from_seed::<Bls12381Sha256>(SEED, Some("did:example:489398593")).unwrap();
        let published = key_pair.clone().with_verification_method("did:example:489398593#test");
        assert_eq!(published.verification_method(), "did:example:489398593#test");
        assert_eq!(published.id(), key_pair.id());

        let document = published.to_document();
        assert_eq!(document.id, "did:example:489398593#test");
        let loaded = Bls12381G2KeyPair::from_document(&document).unwrap();
        assert_eq!(loaded.verification_method(), "did:example:489398593#test");
        assert_eq!(loaded, key_pair);

        let restored = Bls12381G2KeyPair::from_bytes(&loaded.to_bytes(), loaded.controller()).unwrap();
        assert_eq!(restored, loaded);
        assert_eq!(restored.id(), loaded.id());
        assert_eq!(restored.verification_method(), key_pair.id());
    }
}
