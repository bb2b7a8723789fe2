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


//! Document level operations: proofs embedded in JSON documents under `proof`.

use serde_json::Value;

use super::{
    canonicalize::{skolemize, Canonicalizer},
    derive::{BbsBlsSignatureProof2020, DeriveOptions},
    frame::{DisclosureFrame, RevealFrame},
    keypair::Bls12381G2KeyPair,
    loader::DocumentLoader,
    proof::{Proof, ProofPurpose, ProofType, SignedProof},
    suite::{BbsBlsSignature2020, SignOptions, VerificationResult},
};
use crate::{bbsplus::ciphersuites::BbsCiphersuite, errors::Error};

pub const PROOF_KEY: &str = "proof";

/// Verification outcome of one embedded proof.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ProofVerification {
    pub proof_type: ProofType,
    pub verification_method: String,
    pub result: VerificationResult,
}

/// Verification outcome of a document: verified when every embedded BBS proof is.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct DocumentVerification {
    pub verified: bool,
    pub results: Vec<ProofVerification>,
}

/// Returns the document without its proofs, and the proofs in document order.
pub fn split_proofs(document: &Value) -> Result<(Value, Vec<Value>), Error> {
    let mut stripped = document
        .as_object()
        .cloned()
        .ok_or_else(|| Error::InvalidDocument("document must be a JSON object".to_owned()))?;

    let proofs = match stripped.remove(PROOF_KEY) {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(proofs)) => proofs,
        Some(proof) => vec![proof],
    };
    Ok((Value::Object(stripped), proofs))
}

/// Appends `proof` to the proofs of `document`.
pub fn attach_proof(document: &mut Value, proof: Value) -> Result<(), Error> {
    let object = document
        .as_object_mut()
        .ok_or_else(|| Error::InvalidDocument("document must be a JSON object".to_owned()))?;

    let proofs = match object.remove(PROOF_KEY) {
        None | Some(Value::Null) => proof,
        Some(Value::Array(mut proofs)) => {
            proofs.push(proof);
            Value::Array(proofs)
        }
        Some(existing) => Value::Array(vec![existing, proof]),
    };
    object.insert(PROOF_KEY.to_owned(), proofs);
    Ok(())
}

/// Removes the proof at `index`, leaving every other proof untouched.
pub fn remove_proof(document: &Value, index: usize) -> Result<Value, Error> {
    let (mut stripped, mut proofs) = split_proofs(document)?;
    if index >= proofs.len() {
        return Err(Error::MissingProof);
    }
    proofs.remove(index);
    for proof in proofs {
        attach_proof(&mut stripped, proof)?;
    }
    Ok(stripped)
}

/// Loads the key document published at `verification_method`.
pub fn resolve_key(verification_method: &str, loader: &dyn DocumentLoader) -> Result<Bls12381G2KeyPair, Error> {
    let remote = loader.load(verification_method)?;
    Bls12381G2KeyPair::from_value(&remote.document)
}

/// Signs `document` with `key_pair` and appends the proof. Existing proofs are not signed over.
pub fn sign_document<CS: BbsCiphersuite>(
    document: &Value,
    key_pair: &Bls12381G2KeyPair,
    options: &SignOptions,
    canonicalizer: &dyn Canonicalizer,
    loader: &dyn DocumentLoader,
) -> Result<Value, Error> {
    let (stripped, _) = split_proofs(document)?;
    let statements = canonicalizer.canonicalize(&stripped, loader)?;

    let proof = BbsBlsSignature2020::<CS>::new().sign_with_options(&statements, key_pair, options)?;

    let mut signed = document.clone();
    attach_proof(&mut signed, serde_json::to_value(&proof)?)?;
    Ok(signed)
}

/// Verifies every proof of `document` for `purpose`.
///
/// The document is canonicalized once, with all proofs stripped, and each proof is checked against
/// that statement set on its own. Proofs of other suites are left unchecked and not reported.
/// Keys and controller documents are resolved through `loader`.
pub fn verify_document<CS: BbsCiphersuite>(
    document: &Value,
    purpose: ProofPurpose,
    canonicalizer: &dyn Canonicalizer,
    loader: &dyn DocumentLoader,
) -> Result<DocumentVerification, Error> {
    let (stripped, proofs) = split_proofs(document)?;
    if proofs.is_empty() {
        return Err(Error::MissingProof);
    }

    let statements = canonicalizer.canonicalize(&stripped, loader)?;

    let mut results = Vec::with_capacity(proofs.len());
    for proof in bbs_proofs(&proofs) {
        let proof = proof?;
        let verification_method = proof.verification_method().to_owned();
        let key = resolve_key(&verification_method, loader)?;

        let result = match check_purpose(&proof, &key, purpose, loader)? {
            Some(mismatch) => VerificationResult::failure(mismatch),
            None => match &proof {
                Proof::Signed(p) => BbsBlsSignature2020::<CS>::new().verify(&statements, p, key.public_key())?,
                Proof::Derived(p) => BbsBlsSignatureProof2020::<CS>::new().verify(&statements, p, key.public_key())?,
            },
        };

        let proof_type = match proof {
            Proof::Signed(_) => ProofType::BbsBlsSignature2020,
            Proof::Derived(_) => ProofType::BbsBlsSignatureProof2020,
        };
        results.push(ProofVerification {
            proof_type,
            verification_method,
            result,
        });
    }

    if results.is_empty() {
        return Err(Error::MissingProof);
    }

    Ok(DocumentVerification {
        verified: results.iter().all(|r| r.result.verified),
        results,
    })
}

/// Returns the mismatch when the proof purpose is not granted to the key by its controller.
///
/// The controller check is skipped when the loader cannot resolve the controller document.
fn check_purpose(
    proof: &Proof,
    key: &Bls12381G2KeyPair,
    purpose: ProofPurpose,
    loader: &dyn DocumentLoader,
) -> Result<Option<Error>, Error> {
    if proof.proof_purpose() != purpose {
        return Ok(Some(Error::PurposeMismatch(format!(
            "expected {}, proof has {}",
            purpose,
            proof.proof_purpose()
        ))));
    }

    let Some(controller) = key.controller() else {
        return Ok(None);
    };
    let controller_document = match loader.load(controller) {
        Ok(remote) => remote.document,
        Err(Error::ContextNotFound(_)) => {
            log::debug!("controller {} not resolvable, skipping purpose check", controller);
            return Ok(None);
        }
        Err(e) => return Err(e),
    };

    let verification_method = proof.verification_method();
    let granted = match controller_document.get(purpose.term()) {
        Some(Value::Array(methods)) => methods.iter().any(|m| refers_to(m, verification_method)),
        Some(method) => refers_to(method, verification_method),
        None => false,
    };

    if granted {
        Ok(None)
    } else {
        Ok(Some(Error::PurposeMismatch(format!(
            "{} is not listed under {} by {}",
            verification_method,
            purpose.term(),
            controller
        ))))
    }
}

fn refers_to(method: &Value, verification_method: &str) -> bool {
    match method {
        Value::String(id) => id == verification_method,
        Value::Object(m) => m.get("id").and_then(Value::as_str) == Some(verification_method),
        _ => false,
    }
}

/// Parses the proofs handled by this suite. Proofs of other suites are skipped.
fn bbs_proofs(proofs: &[Value]) -> impl Iterator<Item = Result<Proof, Error>> + '_ {
    proofs.iter().filter_map(|value| match Proof::from_value(value) {
        Err(Error::UnsupportedProofType(other)) => {
            log::debug!("skipping {} proof", other);
            None
        }
        parsed => Some(parsed),
    })
}

fn select_signed_proof(proofs: &[Value], verification_method: Option<&str>) -> Result<SignedProof, Error> {
    for proof in bbs_proofs(proofs) {
        if let Proof::Signed(proof) = proof? {
            if verification_method.map_or(true, |vm| vm == proof.verification_method) {
                return Ok(proof);
            }
        }
    }
    Err(Error::MissingProof)
}

/// Derives a selectively disclosed document from a signed `document`.
///
/// Blank nodes are skolemized first so that the revealed document canonicalizes to a subset of the
/// signed statements. The revealed document carries a single `BbsBlsSignatureProof2020`.
pub fn derive_document<CS: BbsCiphersuite>(
    document: &Value,
    reveal: &RevealFrame,
    options: &DeriveOptions,
    canonicalizer: &dyn Canonicalizer,
    loader: &dyn DocumentLoader,
) -> Result<Value, Error> {
    let (stripped, proofs) = split_proofs(document)?;
    let signed = select_signed_proof(&proofs, options.verification_method.as_deref())?;
    let key = resolve_key(&signed.verification_method, loader)?;

    let skolemized = skolemize(&stripped)?;
    let statements = canonicalizer.canonicalize(&skolemized, loader)?;

    let mut revealed_document = reveal.apply(&skolemized)?;
    let revealed_statements = canonicalizer.canonicalize(&revealed_document, loader)?;

    let indexes = revealed_statements
        .iter()
        .map(|s| {
            statements
                .position(s)
                .ok_or_else(|| Error::FrameMismatch(format!("statement not in the signed document: {}", s)))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let derived = BbsBlsSignatureProof2020::<CS>::new().derive(
        &statements,
        &signed,
        &DisclosureFrame::new(indexes),
        key.public_key(),
        options,
    )?;

    attach_proof(&mut revealed_document, serde_json::to_value(&derived)?)?;
    Ok(revealed_document)
}
