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


use core::marker::PhantomData;

use base64::{engine::general_purpose::STANDARD, Engine};

use super::{
    canonicalize::CanonicalStatementSet,
    frame::DisclosureFrame,
    proof::{DerivedProof, DerivedProofValue, ProofType, SignedProof},
    suite::VerificationResult,
};
use crate::{
    bbsplus::{ciphersuites::BbsCiphersuite, keys::BBSplusPublicKey},
    errors::Error,
    schemes::{algorithms::BBSplus, generics::PoKSignature},
    utils::util::generate_random_secret,
};

/// Length of the nonce generated for a derivation when the caller supplies none
pub const NONCE_LEN: usize = 32;

#[derive(Clone, Debug, Default)]
pub struct DeriveOptions {
    /// Presentation nonce, e.g. a verifier challenge. Random when absent.
    pub nonce: Option<Vec<u8>>,
    /// Verification method of the signature to derive from, when a document carries several
    pub verification_method: Option<String>,
}

/// The `BbsBlsSignatureProof2020` suite: selective disclosure of the statements signed by a
/// `BbsBlsSignature2020` proof.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct BbsBlsSignatureProof2020<CS: BbsCiphersuite> {
    _ciphersuite: PhantomData<CS>,
}

impl<CS: BbsCiphersuite> Default for BbsBlsSignatureProof2020<CS> {
    fn default() -> Self {
        Self::new()
    }
}

impl<CS: BbsCiphersuite> BbsBlsSignatureProof2020<CS> {
    pub fn new() -> Self {
        Self { _ciphersuite: PhantomData }
    }

    /// Derives a proof revealing the statements selected by `frame`.
    ///
    /// The derived proof carries the statement count, the revealed indexes and a freshly randomized
    /// proof of knowledge of the signature. Neither the signature nor the hidden statements can be
    /// recovered from it.
    pub fn derive(
        &self,
        statements: &CanonicalStatementSet,
        proof: &SignedProof,
        frame: &DisclosureFrame,
        public_key: &BBSplusPublicKey,
        options: &DeriveOptions,
    ) -> Result<DerivedProof, Error> {
        if proof.proof_type != ProofType::BbsBlsSignature2020 {
            return Err(Error::UnsupportedProofType(proof.proof_type.to_string()));
        }
        if statements.is_empty() {
            return Err(Error::EmptyInput);
        }

        let (revealed, hidden) = frame.partition(statements.len())?;
        let signature = proof.signature_bytes()?;
        let header = proof.options().to_header()?;
        let nonce = options.nonce.clone().unwrap_or_else(|| generate_random_secret(NONCE_LEN));
        let messages = statements.to_messages();

        let pok = PoKSignature::<BBSplus<CS>>::proof_gen(
            public_key,
            &signature,
            Some(&header),
            Some(&nonce),
            Some(&messages),
            Some(&revealed),
        )?;
        log::debug!("derived proof revealing {} of {} statements ({} hidden)", revealed.len(), statements.len(), hidden.len());

        let value = DerivedProofValue {
            total: statements.len(),
            revealed,
            proof: pok.to_bytes(),
        };

        Ok(DerivedProof {
            proof_type: ProofType::BbsBlsSignatureProof2020,
            created: proof.created,
            verification_method: proof.verification_method.clone(),
            proof_purpose: proof.proof_purpose,
            nonce: STANDARD.encode(&nonce),
            proof_value: value.encode()?,
        })
    }

    /// Verifies a derived proof against the revealed statements.
    ///
    /// Freshness of the nonce is left to the caller, see [`DerivedProof::nonce_bytes`].
    pub fn verify(&self, revealed: &CanonicalStatementSet, proof: &DerivedProof, public_key: &BBSplusPublicKey) -> Result<VerificationResult, Error> {
        if proof.proof_type != ProofType::BbsBlsSignatureProof2020 {
            return Err(Error::UnsupportedProofType(proof.proof_type.to_string()));
        }

        let value = proof.proof_value()?;
        let nonce = proof.nonce_bytes()?;
        let pok = PoKSignature::<BBSplus<CS>>::from_bytes(&value.proof)?;

        if value.revealed.len() != revealed.len() {
            return Ok(VerificationResult::failure(Error::PoKSVerificationError(format!(
                "proof reveals {} statements, got {}",
                value.revealed.len(),
                revealed.len()
            ))));
        }
        if value.total != value.revealed.len() + pok.to_bbsplus_proof().undisclosed_count() {
            return Ok(VerificationResult::failure(Error::PoKSVerificationError(
                "statement count does not match the proof".to_owned(),
            )));
        }
        if value.revealed.windows(2).any(|w| w[0] >= w[1]) {
            return Ok(VerificationResult::failure(Error::PoKSVerificationError(
                "revealed indexes are not strictly ascending".to_owned(),
            )));
        }

        let header = proof.options().to_header()?;
        let messages = revealed.to_messages();

        let result = VerificationResult::from(pok.proof_verify(
            public_key,
            Some(&messages),
            Some(&value.revealed),
            Some(&header),
            Some(&nonce),
        ));
        log::debug!("derived proof by {} verified: {}", proof.verification_method, result.verified);
        Ok(result)
    }
}
