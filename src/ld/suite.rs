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
use chrono::{DateTime, Utc};

use super::{
    canonicalize::CanonicalStatementSet,
    keypair::Bls12381G2KeyPair,
    proof::{now, ProofOptions, ProofPurpose, ProofType, SignedProof},
};
use crate::{
    bbsplus::{ciphersuites::BbsCiphersuite, keys::BBSplusPublicKey},
    errors::Error,
    schemes::{algorithms::BBSplus, generics::Signature},
};

/// Outcome of a verification. A proof that does not verify is a result, not an error.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct VerificationResult {
    pub verified: bool,
    pub error: Option<Error>,
}

impl VerificationResult {
    pub fn success() -> Self {
        Self { verified: true, error: None }
    }

    pub fn failure(error: Error) -> Self {
        Self {
            verified: false,
            error: Some(error),
        }
    }
}

impl From<Result<(), Error>> for VerificationResult {
    fn from(result: Result<(), Error>) -> Self {
        match result {
            Ok(()) => Self::success(),
            Err(e) => Self::failure(e),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct SignOptions {
    pub purpose: ProofPurpose,
    /// Defaults to now
    pub created: Option<DateTime<Utc>>,
    /// Defaults to the key pair's verification method
    pub verification_method: Option<String>,
}

/// The `BbsBlsSignature2020` suite: one BBS signature over every statement of a canonical set,
/// with the proof options bound as the signature header.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct BbsBlsSignature2020<CS: BbsCiphersuite> {
    _ciphersuite: PhantomData<CS>,
}

impl<CS: BbsCiphersuite> Default for BbsBlsSignature2020<CS> {
    fn default() -> Self {
        Self::new()
    }
}

impl<CS: BbsCiphersuite> BbsBlsSignature2020<CS> {
    pub fn new() -> Self {
        Self { _ciphersuite: PhantomData }
    }

    pub fn sign(&self, statements: &CanonicalStatementSet, key_pair: &Bls12381G2KeyPair, purpose: ProofPurpose) -> Result<SignedProof, Error> {
        self.sign_with_options(
            statements,
            key_pair,
            &SignOptions {
                purpose,
                ..Default::default()
            },
        )
    }

    /// Signs `statements`. An empty set yields a valid signature over the proof options alone.
    pub fn sign_with_options(
        &self,
        statements: &CanonicalStatementSet,
        key_pair: &Bls12381G2KeyPair,
        options: &SignOptions,
    ) -> Result<SignedProof, Error> {
        let sk = key_pair
            .private_key()
            .ok_or_else(|| Error::InvalidKeyMaterial("key pair has no private key".to_owned()))?;

        let proof_options = ProofOptions {
            created: options.created.unwrap_or_else(now),
            verification_method: options.verification_method.clone().unwrap_or_else(|| key_pair.verification_method().to_owned()),
            proof_purpose: options.purpose,
        };
        let header = proof_options.to_header()?;
        let messages = statements.to_messages();

        let signature = Signature::<BBSplus<CS>>::sign(Some(&messages), sk, key_pair.public_key(), Some(&header))?;
        log::debug!("signed {} statements for {}", messages.len(), proof_options.verification_method);

        Ok(SignedProof {
            proof_type: ProofType::BbsBlsSignature2020,
            created: proof_options.created,
            verification_method: proof_options.verification_method,
            proof_purpose: proof_options.proof_purpose,
            signature_value: STANDARD.encode(signature.to_bytes()),
        })
    }

    /// Verifies `proof` over `statements`.
    ///
    /// Returns `Err` only when the proof itself is malformed; a signature that does not match yields
    /// `verified: false`.
    pub fn verify(&self, statements: &CanonicalStatementSet, proof: &SignedProof, public_key: &BBSplusPublicKey) -> Result<VerificationResult, Error> {
        if proof.proof_type != ProofType::BbsBlsSignature2020 {
            return Err(Error::UnsupportedProofType(proof.proof_type.to_string()));
        }

        let signature = Signature::<BBSplus<CS>>::from_bytes(&proof.signature_bytes()?)?;
        let header = proof.options().to_header()?;
        let messages = statements.to_messages();

        let result = VerificationResult::from(signature.verify(public_key, Some(&messages), Some(&header)));
        log::debug!("signature by {} verified: {}", proof.verification_method, result.verified);
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::{BbsBlsSignature2020, SignOptions, VerificationResult};
    use crate::{
        bbsplus::ciphersuites::{Bls12381Sha256, Bls12381Shake256},
        errors::Error,
        ld::{canonicalize::CanonicalStatementSet, keypair::Bls12381G2KeyPair, proof::ProofPurpose},
    };

    fn statements() -> CanonicalStatementSet {
        CanonicalStatementSet::from_statements([
            "<did:example:a> <https://example.org/vocab#name> \"Alice\" .",
            "<did:example:a> <https://example.org/vocab#age> \"42\" .",
        ])
    }

    #[test]
    fn sign_then_verify() {
        let suite = BbsBlsSignature2020::<Bls12381Shake256>::new();
        let key_pair = Bls12381G2KeyPair::generate::<Bls12381Shake256>(Some("did:example:a")).unwrap();

        let proof = suite.sign(&statements(), &key_pair, ProofPurpose::AssertionMethod).unwrap();
        assert_eq!(suite.verify(&statements(), &proof, key_pair.public_key()).unwrap(), VerificationResult::success());

        let other = Bls12381G2KeyPair::generate::<Bls12381Shake256>(None).unwrap();
        assert!(!suite.verify(&statements(), &proof, other.public_key()).unwrap().verified);
    }

    #[test]
    fn empty_statement_set_is_signed() {
        let suite = BbsBlsSignature2020::<Bls12381Sha256>::new();
        let key_pair = Bls12381G2KeyPair::generate::<Bls12381Sha256>(None).unwrap();
        let empty = CanonicalStatementSet::default();

        let proof = suite.sign(&empty, &key_pair, ProofPurpose::AssertionMethod).unwrap();
        assert!(suite.verify(&empty, &proof, key_pair.public_key()).unwrap().verified);
        assert!(!suite.verify(&statements(), &proof, key_pair.public_key()).unwrap().verified);
    }

    #[test]
    fn public_only_key_cannot_sign() {
        let suite = BbsBlsSignature2020::<Bls12381Sha256>::new();
        let key_pair = Bls12381G2KeyPair::generate::<Bls12381Sha256>(None).unwrap().to_public();
        assert!(matches!(
            suite.sign(&statements(), &key_pair, ProofPurpose::AssertionMethod),
            Err(Error::InvalidKeyMaterial(_))
        ));
    }

    #[test]
    fn malformed_signature_value_fails_fast() {
        let suite = BbsBlsSignature2020::<Bls12381Sha256>::new();
        let key_pair = Bls12381G2KeyPair::generate::<Bls12381Sha256>(None).unwrap();
        let mut proof = suite.sign(&statements(), &key_pair, ProofPurpose::AssertionMethod).unwrap();

        proof.signature_value = "not base64!".to_owned();
        assert!(suite.verify(&statements(), &proof, key_pair.public_key()).is_err());

        proof.signature_value = "AAAA".to_owned();
        assert!(suite.verify(&statements(), &proof, key_pair.public_key()).is_err());
    }

    #[test]
    fn subsecond_created_is_bound() {
        let suite = BbsBlsSignature2020::<Bls12381Sha256>::new();
        let key_pair = Bls12381G2KeyPair::generate::<Bls12381Sha256>(None).unwrap();
        let options = SignOptions {
            created: Some(Utc.with_ymd_and_hms(2026, 3, 4, 5, 6, 0).unwrap() + Duration::milliseconds(123)),
            ..Default::default()
        };

        let mut proof = suite.sign_with_options(&statements(), &key_pair, &options).unwrap();
        assert!(suite.verify(&statements(), &proof, key_pair.public_key()).unwrap().verified);

        let restored: super::SignedProof = serde_json::from_value(serde_json::to_value(&proof).unwrap()).unwrap();
        assert!(suite.verify(&statements(), &restored, key_pair.public_key()).unwrap().verified);

        proof.created = proof.created + Duration::milliseconds(876);
        assert!(!suite.verify(&statements(), &proof, key_pair.public_key()).unwrap().verified);
    }
}
