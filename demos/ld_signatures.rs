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
mod ld_example {
    use std::fs;

    use serde_json::Value;
    use zkryptium_ld::{
        bbsplus::ciphersuites::BbsCiphersuite,
        errors::Error,
        ld::{
            derive_document, sign_document, verify_document, Bls12381G2KeyPair, DeriveOptions, ProofPurpose, RevealFrame,
            SignOptions, StatementCanonicalizer, StaticDocumentLoader,
        },
    };

    const CONTROLLER: &str = "did:example:489398593";
    const KEY_ID: &str = "did:example:489398593#test";

    fn fixture(name: &str) -> Result<Value, Error> {
        let path = format!("./fixture_data/ld/{}", name);
        let data = fs::read_to_string(&path).map_err(|e| Error::InvalidDocument(format!("{}: {}", path, e)))?;
        Ok(serde_json::from_str(&data)?)
    }

    fn pretty(document: &Value) -> String {
        serde_json::to_string_pretty(document).unwrap_or_default()
    }

    pub(crate) fn ld_main<CS: BbsCiphersuite>() -> Result<(), Error> {
        log::info!("Keypair Generation");
        let generated = match std::env::var("KEY_SEED") {
            Ok(seed) => Bls12381G2KeyPair::generate_from_seed::<CS>(seed.as_bytes(), Some(CONTROLLER))?,
            Err(_) => Bls12381G2KeyPair::generate::<CS>(Some(CONTROLLER))?,
        };
        let key_pair = generated.with_verification_method(KEY_ID);
        log::info!("Key: {}", pretty(&serde_json::to_value(key_pair.to_public_document())?));

        let loader = StaticDocumentLoader::new()
            .with_document(KEY_ID, serde_json::to_value(key_pair.to_public_document())?)
            .with_document(CONTROLLER, fixture("controller_document.json")?)
            .with_document("https://www.w3.org/2018/credentials/v1", fixture("credentials_v1.json")?)
            .with_document("https://w3id.org/citizenship/v1", fixture("citizenship_v1.json")?)
            .with_document("https://w3id.org/security/bbs/v1", fixture("bbs_v1.json")?);

        let input_document = fixture("input_document.json")?;
        log::info!("Input document\n{}", pretty(&input_document));

        let signed = sign_document::<CS>(&input_document, &key_pair, &SignOptions::default(), &StatementCanonicalizer, &loader)?;
        log::info!("Input document with proof\n{}", pretty(&signed));

        let multi_signed = sign_document::<CS>(&signed, &key_pair, &SignOptions::default(), &StatementCanonicalizer, &loader)?;
        log::info!("Input document with multiple proofs\n{}", pretty(&multi_signed));

        let verified = verify_document::<CS>(&multi_signed, ProofPurpose::AssertionMethod, &StatementCanonicalizer, &loader)?;
        log::info!("Verify the signed proofs: {}", verified.verified);
        for r in &verified.results {
            log::info!("  {} ({}): {:?}", r.verification_method, r.proof_type, r.result);
        }

        let reveal = RevealFrame::new(fixture("reveal_frame.json")?)?;
        let derived = derive_document::<CS>(&multi_signed, &reveal, &DeriveOptions::default(), &StatementCanonicalizer, &loader)?;
        log::info!("Derived Proof Result\n{}", pretty(&derived));

        let derived_verified = verify_document::<CS>(&derived, ProofPurpose::AssertionMethod, &StatementCanonicalizer, &loader)?;
        log::info!("Derived Proof Verification result: {}", derived_verified.verified);

        if verified.verified && derived_verified.verified {
            Ok(())
        } else {
            Err(Error::SignatureVerificationError)
        }
    }
}

#[cfg(feature = "bbsplus")]
fn main() {
    use crate::ld_example::ld_main;
    use std::env;
    use zkryptium_ld::bbsplus::ciphersuites::{Bls12381Sha256, Bls12381Shake256};

    dotenvy::dotenv().ok();
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let cipher_suite = args
        .get(1)
        .cloned()
        .or_else(|| env::var("CIPHERSUITE").ok())
        .unwrap_or_else(|| "BLS12-381-SHA-256".to_owned());

    let result = match cipher_suite.as_str() {
        "BLS12-381-SHA-256" => {
            log::info!("Ciphersuite: BLS12-381-SHA-256");
            ld_main::<Bls12381Sha256>()
        }
        "BLS12-381-SHAKE-256" => {
            log::info!("Ciphersuite: BLS12-381-SHAKE-256");
            ld_main::<Bls12381Shake256>()
        }
        _ => {
            println!(
                "Usage: {} <cipher_suite>
                Ciphersuites:
                    - BLS12-381-SHA-256
                    - BLS12-381-SHAKE-256",
                args[0]
            );
            return;
        }
    };

    if let Err(e) = result {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(not(feature = "bbsplus"))]
fn main() {}
