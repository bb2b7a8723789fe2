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


use std::collections::BTreeMap;
use std::fmt;

use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::Error;

/// Linked-data proof types produced and consumed by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProofType {
    /// BBS signature over the full canonical statement set.
    BbsBlsSignature2020,
    /// Zero-knowledge proof of knowledge of a `BbsBlsSignature2020`, disclosing a subset of the statements.
    BbsBlsSignatureProof2020,
}

impl ProofType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProofType::BbsBlsSignature2020 => "BbsBlsSignature2020",
            ProofType::BbsBlsSignatureProof2020 => "BbsBlsSignatureProof2020",
        }
    }
}

impl fmt::Display for ProofType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The purpose of a proof, i.e. the verification relationship the controller must grant to the key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProofPurpose {
    #[default]
    AssertionMethod,
    Authentication,
}

impl ProofPurpose {
    /// Name of the verification relationship in a controller document.
    pub fn term(&self) -> &'static str {
        match self {
            ProofPurpose::AssertionMethod => "assertionMethod",
            ProofPurpose::Authentication => "authentication",
        }
    }
}

impl fmt::Display for ProofPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.term())
    }
}

/// Current UTC time, truncated to seconds.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(0)
}

/// The proof fields bound into a BBS signature as its header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProofOptions {
    pub created: DateTime<Utc>,
    pub verification_method: String,
    pub proof_purpose: ProofPurpose,
}

impl ProofOptions {
    /// Serialized options, with keys in lexicographic order. Derived proofs bind the same header
    /// as the signature they are derived from, so the type is always `BbsBlsSignature2020`.
    ///
    /// `created` keeps its full sub-second precision.
    pub fn to_header(&self) -> Result<Vec<u8>, Error> {
        let mut options: BTreeMap<&str, &str> = BTreeMap::new();
        let created = self.created.to_rfc3339_opts(SecondsFormat::AutoSi, true);
        options.insert("created", &created);
        options.insert("proofPurpose", self.proof_purpose.term());
        options.insert("type", ProofType::BbsBlsSignature2020.as_str());
        options.insert("verificationMethod", &self.verification_method);

        Ok(serde_json::to_vec(&options)?)
    }
}

/// A `BbsBlsSignature2020` proof.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedProof {
    #[serde(rename = "type")]
    pub proof_type: ProofType,
    pub created: DateTime<Utc>,
    pub verification_method: String,
    pub proof_purpose: ProofPurpose,
    /// Base64 encoded signature, `A || e`
    pub signature_value: String,
}

impl SignedProof {
    pub fn options(&self) -> ProofOptions {
        ProofOptions {
            created: self.created,
            verification_method: self.verification_method.clone(),
            proof_purpose: self.proof_purpose,
        }
    }

    pub fn signature_bytes(&self) -> Result<Vec<u8>, Error> {
        Ok(STANDARD.decode(&self.signature_value)?)
    }
}

/// A `BbsBlsSignatureProof2020` proof.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedProof {
    #[serde(rename = "type")]
    pub proof_type: ProofType,
    pub created: DateTime<Utc>,
    pub verification_method: String,
    pub proof_purpose: ProofPurpose,
    /// Base64 encoded presentation nonce
    pub nonce: String,
    /// Base64 encoded [`DerivedProofValue`]
    pub proof_value: String,
}

impl DerivedProof {
    pub fn options(&self) -> ProofOptions {
        ProofOptions {
            created: self.created,
            verification_method: self.verification_method.clone(),
            proof_purpose: self.proof_purpose,
        }
    }

    pub fn nonce_bytes(&self) -> Result<Vec<u8>, Error> {
        Ok(STANDARD.decode(&self.nonce)?)
    }

    pub fn proof_value(&self) -> Result<DerivedProofValue, Error> {
        DerivedProofValue::from_bytes(&STANDARD.decode(&self.proof_value)?)
    }
}

/// Payload of a derived proof: `u16 total || u16 R || R x u16 revealed index || BBS proof`, big-endian.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedProofValue {
    pub total: usize,
    pub revealed: Vec<usize>,
    pub proof: Vec<u8>,
}

impl DerivedProofValue {
    pub fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        let to_u16 = |v: usize| -> Result<[u8; 2], Error> {
            u16::try_from(v)
                .map(u16::to_be_bytes)
                .map_err(|_| Error::ProofGenError(format!("{} does not fit in two bytes", v)))
        };

        let mut bytes = Vec::with_capacity(4 + 2 * self.revealed.len() + self.proof.len());
        bytes.extend_from_slice(&to_u16(self.total)?);
        bytes.extend_from_slice(&to_u16(self.revealed.len())?);
        for i in &self.revealed {
            bytes.extend_from_slice(&to_u16(*i)?);
        }
        bytes.extend_from_slice(&self.proof);
        Ok(bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        let read_u16 = |offset: usize| -> Result<usize, Error> {
            bytes
                .get(offset..offset + 2)
                .map(|b| u16::from_be_bytes([b[0], b[1]]) as usize)
                .ok_or_else(|| Error::DeserializationError("truncated proof value".to_owned()))
        };

        let total = read_u16(0)?;
        let count = read_u16(2)?;
        let revealed = (0..count).map(|i| read_u16(4 + 2 * i)).collect::<Result<Vec<_>, _>>()?;
        let proof = bytes[4 + 2 * count..].to_vec();

        Ok(Self { total, revealed, proof })
    }

    pub fn encode(&self) -> Result<String, Error> {
        Ok(STANDARD.encode(self.to_bytes()?))
    }
}

/// A proof embedded in a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Proof {
    Signed(SignedProof),
    Derived(DerivedProof),
}

impl Proof {
    /// Parses a proof object, dispatching on its `type`.
    pub fn from_value(value: &Value) -> Result<Self, Error> {
        let proof_type = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::DeserializationError("proof without type".to_owned()))?;

        match proof_type {
            "BbsBlsSignature2020" => Ok(Proof::Signed(serde_json::from_value(value.clone())?)),
            "BbsBlsSignatureProof2020" => Ok(Proof::Derived(serde_json::from_value(value.clone())?)),
            other => Err(Error::UnsupportedProofType(other.to_owned())),
        }
    }

    pub fn to_value(&self) -> Result<Value, Error> {
        Ok(match self {
            Proof::Signed(p) => serde_json::to_value(p)?,
            Proof::Derived(p) => serde_json::to_value(p)?,
        })
    }

    pub fn verification_method(&self) -> &str {
        match self {
            Proof::Signed(p) => &p.verification_method,
            Proof::Derived(p) => &p.verification_method,
        }
    }

    pub fn proof_purpose(&self) -> ProofPurpose {
        match self {
            Proof::Signed(p) => p.proof_purpose,
            Proof::Derived(p) => p.proof_purpose,
        }
    }
}
