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


#[cfg(feature = "bbsplus")]
#[cfg(test)]
mod ld_suite_tests {

    use std::fs;

    use serde_json::{json, Value};
    use zkryptium_ld::{
        bbsplus::ciphersuites::Bls12381Sha256,
        errors::Error,
        ld::{
            derive_document,
            document::{remove_proof, split_proofs},
            sign_document, verify_document, BbsBlsSignature2020, BbsBlsSignatureProof2020, Bls12381G2KeyPair,
            CanonicalStatementSet, Canonicalizer, DeriveOptions, DerivedProof, DisclosureFrame, DocumentLoader,
            ProofPurpose, ProofType, RevealFrame, SignOptions, StatementCanonicalizer, StaticDocumentLoader,
        },
    };

    const CONTROLLER: &str = "did:example:489398593";
    const KEY_ID: &str = "did:example:489398593#test";
    const SEED: &[u8] = b"this-IS-just-an-Test-IKM-to-generate-$e(r@#t-key";

    fn fixture(name: &str) -> Value {
        let data = fs::read_to_string(format!("./fixture_data/ld/{}", name)).expect("Unable to read file");
        serde_json::from_str(&data).expect("Unable to parse")
    }

    fn issuer_key() -> Bls12381G2KeyPair {
        Bls12381G2KeyPair::generate_from_seed::<Bls12381Sha256>(SEED, Some(CONTROLLER))
            .unwrap()
            .with_verification_method(KEY_ID)
    }

    fn loader(keys: &[&Bls12381G2KeyPair]) -> StaticDocumentLoader {
        let mut loader = StaticDocumentLoader::new()
            .with_document("https://www.w3.org/2018/credentials/v1", fixture("credentials_v1.json"))
            .with_document("https://w3id.org/citizenship/v1", fixture("citizenship_v1.json"))
            .with_document("https://w3id.org/security/bbs/v1", fixture("bbs_v1.json"))
            .with_document(CONTROLLER, fixture("controller_document.json"));
        for key in keys {
            loader.insert(key.verification_method(), serde_json::to_value(key.to_public_document()).unwrap());
        }
        loader
    }

    fn sign(document: &Value, key: &Bls12381G2KeyPair, loader: &StaticDocumentLoader) -> Value {
        sign_document::<Bls12381Sha256>(document, key, &SignOptions::default(), &StatementCanonicalizer, loader).unwrap()
    }

    fn verify(document: &Value, loader: &StaticDocumentLoader) -> bool {
        verify_document::<Bls12381Sha256>(document, ProofPurpose::AssertionMethod, &StatementCanonicalizer, loader)
            .unwrap()
            .verified
    }

    #[test]
    fn sign_and_verify_credential() {
        let key = issuer_key();
        let loader = loader(&[&key]);

        let signed = sign(&fixture("input_document.json"), &key, &loader);
        assert_eq!(signed["proof"]["type"], "BbsBlsSignature2020");
        assert_eq!(signed["proof"]["verificationMethod"], KEY_ID);

        let result =
            verify_document::<Bls12381Sha256>(&signed, ProofPurpose::AssertionMethod, &StatementCanonicalizer, &loader).unwrap();
        assert!(result.verified);
        assert_eq!(result.results.len(), 1);
        assert_eq!(result.results[0].proof_type, ProofType::BbsBlsSignature2020);
    }

    #[test]
    fn multi_signed_credential_verifies_every_proof() {
        let key = issuer_key();
        let loader = loader(&[&key]);

        let signed = sign(&fixture("input_document.json"), &key, &loader);
        let multi_signed = sign(&signed, &key, &loader);
        assert_eq!(multi_signed["proof"].as_array().unwrap().len(), 2);

        let result =
            verify_document::<Bls12381Sha256>(&multi_signed, ProofPurpose::AssertionMethod, &StatementCanonicalizer, &loader)
                .unwrap();
        assert!(result.verified);
        assert!(result.results.iter().all(|r| r.result.verified));
    }

    #[test]
    fn proofs_of_other_suites_are_skipped() {
        let key = issuer_key();
        let loader = loader(&[&key]);

        let mut document = fixture("input_document.json");
        document["proof"] = json!({
            "type": "Ed25519Signature2020",
            "created": "2026-01-01T00:00:00Z",
            "verificationMethod": "did:example:other#key-1",
            "proofPurpose": "assertionMethod",
            "proofValue": "z3FXQjecWufY46yg5abdVZsXqLhxhueuSoZgNSARiKBk"
        });
        let signed = sign(&document, &key, &loader);
        assert_eq!(signed["proof"].as_array().unwrap().len(), 2);

        let result =
            verify_document::<Bls12381Sha256>(&signed, ProofPurpose::AssertionMethod, &StatementCanonicalizer, &loader).unwrap();
        assert!(result.verified);
        assert_eq!(result.results.len(), 1);
        assert_eq!(result.results[0].verification_method, KEY_ID);

        let frame = RevealFrame::new(fixture("reveal_frame.json")).unwrap();
        let derived =
            derive_document::<Bls12381Sha256>(&signed, &frame, &DeriveOptions::default(), &StatementCanonicalizer, &loader)
                .unwrap();
        assert!(verify(&derived, &loader));

        assert_eq!(
            verify_document::<Bls12381Sha256>(&document, ProofPurpose::AssertionMethod, &StatementCanonicalizer, &loader),
            Err(Error::MissingProof)
        );
    }

    #[test]
    fn mutated_document_does_not_verify() {
        let key = issuer_key();
        let loader = loader(&[&key]);

        let mut signed = sign(&fixture("input_document.json"), &key, &loader);
        signed["credentialSubject"]["givenName"] = json!("JOHM");

        let result =
            verify_document::<Bls12381Sha256>(&signed, ProofPurpose::AssertionMethod, &StatementCanonicalizer, &loader).unwrap();
        assert!(!result.verified);
        assert_eq!(result.results[0].result.error, Some(Error::SignatureVerificationError));
    }

    #[test]
    fn five_statements_two_keys() {
        let k1 = issuer_key();
        let k2 = Bls12381G2KeyPair::generate::<Bls12381Sha256>(None).unwrap();
        let loader = loader(&[&k1, &k2]);

        let document = fixture("five_statements.json");
        let statements = StatementCanonicalizer.canonicalize(&document, &loader).unwrap();
        assert_eq!(statements.len(), 5);

        let signed = sign(&sign(&document, &k1, &loader), &k2, &loader);
        let result =
            verify_document::<Bls12381Sha256>(&signed, ProofPurpose::AssertionMethod, &StatementCanonicalizer, &loader).unwrap();
        assert!(result.verified);
        assert_eq!(result.results[0].verification_method, k1.verification_method());
        assert_eq!(result.results[1].verification_method, k2.verification_method());

        let without_k1 = remove_proof(&signed, 0).unwrap();
        let result =
            verify_document::<Bls12381Sha256>(&without_k1, ProofPurpose::AssertionMethod, &StatementCanonicalizer, &loader)
                .unwrap();
        assert!(result.verified);
        assert_eq!(result.results.len(), 1);
        assert_eq!(result.results[0].verification_method, k2.verification_method());

        let without_k2 = remove_proof(&signed, 1).unwrap();
        assert!(verify(&without_k2, &loader));
    }

    #[test]
    fn statement_level_signatures_are_independent() {
        let k1 = issuer_key();
        let k2 = Bls12381G2KeyPair::generate::<Bls12381Sha256>(None).unwrap();
        let suite = BbsBlsSignature2020::<Bls12381Sha256>::new();
        let statements = StatementCanonicalizer
            .canonicalize(&fixture("five_statements.json"), &loader(&[]))
            .unwrap();

        let p1 = suite.sign(&statements, &k1, ProofPurpose::AssertionMethod).unwrap();
        let p2 = suite.sign(&statements, &k2, ProofPurpose::AssertionMethod).unwrap();

        assert!(suite.verify(&statements, &p1, k1.public_key()).unwrap().verified);
        assert!(suite.verify(&statements, &p2, k2.public_key()).unwrap().verified);
        assert!(!suite.verify(&statements, &p1, k2.public_key()).unwrap().verified);

        let mut flipped = statements.as_slice().to_vec();
        let mut bytes = flipped[2].clone().into_bytes();
        bytes[0] ^= 0x01;
        flipped[2] = String::from_utf8(bytes).unwrap();
        let mutated = CanonicalStatementSet::from_statements(flipped);
        assert!(!suite.verify(&mutated, &p2, k2.public_key()).unwrap().verified);
    }

    #[test]
    fn derive_and_verify_credential() {
        let key = issuer_key();
        let loader = loader(&[&key]);

        let signed = sign(&sign(&fixture("input_document.json"), &key, &loader), &key, &loader);
        let frame = RevealFrame::new(fixture("reveal_frame.json")).unwrap();

        let derived =
            derive_document::<Bls12381Sha256>(&signed, &frame, &DeriveOptions::default(), &StatementCanonicalizer, &loader)
                .unwrap();

        assert_eq!(derived["proof"]["type"], "BbsBlsSignatureProof2020");
        assert_eq!(derived["credentialSubject"]["givenName"], "JOHN");
        assert!(derived["credentialSubject"].get("lprNumber").is_none());

        let result =
            verify_document::<Bls12381Sha256>(&derived, ProofPurpose::AssertionMethod, &StatementCanonicalizer, &loader).unwrap();
        assert!(result.verified);
        assert_eq!(result.results[0].proof_type, ProofType::BbsBlsSignatureProof2020);
    }

    #[test]
    fn hidden_statements_never_appear_in_derived_output() {
        let key = issuer_key();
        let loader = loader(&[&key]);
        let document = fixture("input_document.json");

        let signed = sign(&document, &key, &loader);
        let frame = RevealFrame::new(fixture("reveal_frame.json")).unwrap();
        let derived =
            derive_document::<Bls12381Sha256>(&signed, &frame, &DeriveOptions::default(), &StatementCanonicalizer, &loader)
                .unwrap();

        let all = StatementCanonicalizer.canonicalize(&document, &loader).unwrap();
        let (revealed_document, _) = split_proofs(&derived).unwrap();
        let revealed = StatementCanonicalizer.canonicalize(&revealed_document, &loader).unwrap();
        assert!(revealed.len() < all.len());

        let serialized = derived.to_string();
        for hidden in all.iter().filter(|s| revealed.position(s).is_none()) {
            assert!(!serialized.contains(hidden));
        }
        for value in ["999-999-999", "Bahamas", "1958-07-17", "iVBORw0KGgokJggg=="] {
            assert!(!serialized.contains(value), "{} leaked", value);
        }
    }

    #[test]
    fn derivations_are_unlinkable() {
        let key = issuer_key();
        let loader = loader(&[&key]);
        let signed = sign(&fixture("input_document.json"), &key, &loader);
        let frame = RevealFrame::new(fixture("reveal_frame.json")).unwrap();
        let options = DeriveOptions {
            nonce: Some(b"same nonce".to_vec()),
            ..Default::default()
        };

        let a = derive_document::<Bls12381Sha256>(&signed, &frame, &options, &StatementCanonicalizer, &loader).unwrap();
        let b = derive_document::<Bls12381Sha256>(&signed, &frame, &options, &StatementCanonicalizer, &loader).unwrap();

        assert_eq!(a["proof"]["nonce"], b["proof"]["nonce"]);
        assert_ne!(a["proof"]["proofValue"], b["proof"]["proofValue"]);
        assert!(verify(&a, &loader));
        assert!(verify(&b, &loader));
    }

    #[test]
    fn tampered_derived_document_does_not_verify() {
        let key = issuer_key();
        let loader = loader(&[&key]);
        let signed = sign(&fixture("input_document.json"), &key, &loader);
        let frame = RevealFrame::new(fixture("reveal_frame.json")).unwrap();

        let mut derived =
            derive_document::<Bls12381Sha256>(&signed, &frame, &DeriveOptions::default(), &StatementCanonicalizer, &loader)
                .unwrap();
        derived["credentialSubject"]["gender"] = json!("Female");
        assert!(!verify(&derived, &loader));
    }

    #[test]
    fn derived_proof_needs_the_signer_key() {
        let key = issuer_key();
        let other = Bls12381G2KeyPair::generate::<Bls12381Sha256>(None).unwrap();
        let statements = StatementCanonicalizer
            .canonicalize(&fixture("five_statements.json"), &loader(&[]))
            .unwrap();

        let signed = BbsBlsSignature2020::<Bls12381Sha256>::new()
            .sign(&statements, &key, ProofPurpose::AssertionMethod)
            .unwrap();
        let suite = BbsBlsSignatureProof2020::<Bls12381Sha256>::new();
        let frame = DisclosureFrame::new([0, 1]);
        let derived: DerivedProof = suite
            .derive(&statements, &signed, &frame, key.public_key(), &DeriveOptions::default())
            .unwrap();

        let revealed = statements.select(&frame.revealed_indexes()).unwrap();
        assert!(suite.verify(&revealed, &derived, key.public_key()).unwrap().verified);
        assert!(!suite.verify(&revealed, &derived, other.public_key()).unwrap().verified);
    }

    #[test]
    fn blank_node_subjects_survive_derivation() {
        let key = issuer_key();
        let loader = loader(&[&key]);
        let mut document = fixture("input_document.json");
        document["credentialSubject"].as_object_mut().unwrap().remove("id");

        let signed = sign(&document, &key, &loader);
        assert!(verify(&signed, &loader));

        let frame = RevealFrame::new(fixture("reveal_frame.json")).unwrap();
        let derived =
            derive_document::<Bls12381Sha256>(&signed, &frame, &DeriveOptions::default(), &StatementCanonicalizer, &loader)
                .unwrap();
        assert_eq!(derived["credentialSubject"]["id"], "urn:bnid:_:c14n0");
        assert!(verify(&derived, &loader));
    }

    #[test]
    fn purpose_must_be_granted_by_controller() {
        let key = issuer_key();
        let loader = loader(&[&key]);
        let signed = sign(&fixture("input_document.json"), &key, &loader);

        let result =
            verify_document::<Bls12381Sha256>(&signed, ProofPurpose::Authentication, &StatementCanonicalizer, &loader).unwrap();
        assert!(!result.verified);
        assert!(matches!(result.results[0].result.error, Some(Error::PurposeMismatch(_))));

        let options = SignOptions {
            purpose: ProofPurpose::Authentication,
            ..Default::default()
        };
        let authenticated =
            sign_document::<Bls12381Sha256>(&fixture("input_document.json"), &key, &options, &StatementCanonicalizer, &loader)
                .unwrap();
        let result =
            verify_document::<Bls12381Sha256>(&authenticated, ProofPurpose::Authentication, &StatementCanonicalizer, &loader)
                .unwrap();
        assert!(!result.verified);
        assert!(matches!(result.results[0].result.error, Some(Error::PurposeMismatch(_))));
    }

    #[test]
    fn resolution_failures_are_errors() {
        let key = issuer_key();
        let full = loader(&[&key]);
        let signed = sign(&fixture("input_document.json"), &key, &full);

        let no_key = loader(&[]);
        assert_eq!(
            verify_document::<Bls12381Sha256>(&signed, ProofPurpose::AssertionMethod, &StatementCanonicalizer, &no_key),
            Err(Error::ContextNotFound(KEY_ID.to_owned()))
        );

        let no_context = StaticDocumentLoader::new().with_document(KEY_ID, full.load(KEY_ID).unwrap().document);
        assert_eq!(
            verify_document::<Bls12381Sha256>(&signed, ProofPurpose::AssertionMethod, &StatementCanonicalizer, &no_context),
            Err(Error::ContextNotFound("https://www.w3.org/2018/credentials/v1".to_owned()))
        );

        assert_eq!(
            verify_document::<Bls12381Sha256>(
                &fixture("input_document.json"),
                ProofPurpose::AssertionMethod,
                &StatementCanonicalizer,
                &full
            ),
            Err(Error::MissingProof)
        );
    }

    #[test]
    fn frame_must_match_document() {
        let key = issuer_key();
        let loader = loader(&[&key]);
        let signed = sign(&fixture("input_document.json"), &key, &loader);
        let frame = RevealFrame::new(json!({"type": "Passport"})).unwrap();

        assert!(matches!(
            derive_document::<Bls12381Sha256>(&signed, &frame, &DeriveOptions::default(), &StatementCanonicalizer, &loader),
            Err(Error::FrameMismatch(_))
        ));
    }
}
