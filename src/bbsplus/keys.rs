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

use core::fmt;

use bls12_381_plus::{G2Affine, G2Projective, Scalar};
use elliptic_curve::group::Curve;
use ff::Field;
use serde::{Deserialize, Serialize};

use super::ciphersuites::BbsCiphersuite;
use crate::{
    errors::Error,
    keys::{
        pair::KeyPair,
        traits::{PrivateKey, PublicKey},
    },
    schemes::algorithms::BBSplus,
    utils::util::{
        bbsplus_utils::{hash_to_scalar, i2osp},
        generate_random_secret,
    },
};

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct BBSplusPublicKey(pub G2Projective);

impl BBSplusPublicKey {
    pub const LENGTH: usize = G2Affine::COMPRESSED_BYTES;

    pub fn to_bytes(&self) -> [u8; G2Affine::COMPRESSED_BYTES] {
        self.0.to_affine().to_compressed()
    }

    pub fn encode(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// Parses a compressed G2 point, rejecting the identity.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        let bytes: [u8; G2Affine::COMPRESSED_BYTES] = bytes
            .try_into()
            .map_err(|_| Error::InvalidKeyMaterial(format!("public key must be {} bytes", Self::LENGTH)))?;
        let point = Option::<G2Affine>::from(G2Affine::from_compressed(&bytes))
            .ok_or_else(|| Error::InvalidKeyMaterial("public key is not a valid G2 point".to_owned()))?;
        if bool::from(point.is_identity()) {
            return Err(Error::InvalidKeyMaterial("public key is the identity".to_owned()));
        }
        Ok(Self(G2Projective::from(point)))
    }

    pub fn from_hex(hex: &str) -> Result<Self, Error> {
        let bytes = hex::decode(hex).map_err(|e| Error::InvalidKeyMaterial(e.to_string()))?;
        Self::from_bytes(&bytes)
    }
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BBSplusSecretKey(pub Scalar);

impl fmt::Debug for BBSplusSecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BBSplusSecretKey(..)")
    }
}

impl BBSplusSecretKey {
    pub const LENGTH: usize = Scalar::BYTES;

    //in BE order
    pub fn to_bytes(&self) -> [u8; Scalar::BYTES] {
        self.0.to_be_bytes()
    }

    pub fn encode(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// Parses a big-endian scalar, rejecting zero and values outside the field.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        let bytes: [u8; Scalar::BYTES] = bytes
            .try_into()
            .map_err(|_| Error::InvalidKeyMaterial(format!("private key must be {} bytes", Self::LENGTH)))?;
        let s = Option::<Scalar>::from(Scalar::from_be_bytes(&bytes))
            .ok_or_else(|| Error::InvalidKeyMaterial("private key is not a canonical scalar".to_owned()))?;
        if bool::from(s.is_zero()) {
            return Err(Error::InvalidKeyMaterial("private key is zero".to_owned()));
        }
        Ok(Self(s))
    }

    pub fn from_hex(hex: &str) -> Result<Self, Error> {
        let bytes = hex::decode(hex).map_err(|e| Error::InvalidKeyMaterial(e.to_string()))?;
        Self::from_bytes(&bytes)
    }

    /// <https://www.ietf.org/archive/id/draft-irtf-cfrg-bbs-signatures-06.html#name-public-key>
    pub fn public_key(&self) -> BBSplusPublicKey {
        BBSplusPublicKey(sk_to_pk(self.0))
    }
}

impl PublicKey for BBSplusPublicKey {
    type Output = [u8; G2Affine::COMPRESSED_BYTES];

    fn to_bytes(&self) -> Self::Output {
        self.to_bytes()
    }

    fn encode(&self) -> String {
        self.encode()
    }
}

impl PrivateKey for BBSplusSecretKey {
    type Output = [u8; Scalar::BYTES];

    fn to_bytes(&self) -> Self::Output {
        self.to_bytes()
    }

    fn encode(&self) -> String {
        self.encode()
    }
}

impl<CS: BbsCiphersuite> KeyPair<BBSplus<CS>> {
    /// Deterministic key generation from `key_material` (at least [`BbsCiphersuite::IKM_LEN`] bytes).
    pub fn generate(key_material: &[u8], key_info: Option<&[u8]>, key_dst: Option<&[u8]>) -> Result<Self, Error> {
        let sk = key_gen::<CS>(key_material, key_info, key_dst)?;
        let pk = sk_to_pk(sk);

        Ok(Self::new(BBSplusPublicKey(pk), BBSplusSecretKey(sk)))
    }

    /// Key generation from fresh random key material.
    pub fn random() -> Result<Self, Error> {
        let key_material = generate_random_secret(CS::IKM_LEN);
        Self::generate(&key_material, None, None)
    }
}

/// <https://www.ietf.org/archive/id/draft-irtf-cfrg-bbs-signatures-06.html#name-secret-key> -> SK = KeyGen(key_material, key_info, key_dst)
///
/// # Description
/// This operation generates a secret key (SK) deterministically from a secret octet string (key_material)
///
/// # Inputs:
/// * `key_material` (REQUIRED), a secret octet string.
/// * `key_info` (OPTIONAL), an octet string. Defaults to an empty string if not supplied.
/// * `key_dst` (OPTIONAL), an octet string representing the domain separation tag.
///   Defaults to the octet string ciphersuite_id || "KEYGEN_DST_" if not supplied.
pub(crate) fn key_gen<CS: BbsCiphersuite>(key_material: &[u8], key_info: Option<&[u8]>, key_dst: Option<&[u8]>) -> Result<Scalar, Error> {
    if key_material.len() < CS::IKM_LEN {
        return Err(Error::KeyGenError(format!("length(key_material) < {}", CS::IKM_LEN)));
    }

    let key_info = key_info.unwrap_or(&[]);
    if key_info.len() > 65535 {
        return Err(Error::KeyGenError("length(key_info) > 65535".to_owned()));
    }

    let key_dst_default = CS::keygen_dst();
    let key_dst = key_dst.unwrap_or(&key_dst_default);

    // derive_input = key_material || I2OSP(length(key_info), 2) || key_info
    let derive_input = [key_material, i2osp(key_info.len(), 2).as_slice(), key_info].concat();

    let sk = hash_to_scalar::<CS>(&derive_input, key_dst)?;
    if bool::from(sk.is_zero()) {
        return Err(Error::KeyGenError("SK == 0".to_owned()));
    }
    Ok(sk)
}

/// W = SK * BP2
pub(crate) fn sk_to_pk(sk: Scalar) -> G2Projective {
    G2Projective::GENERATOR * sk
}
