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


//! Linked-data proofs with BBS signatures.
//!
//! A document is canonicalized into a sorted set of statements, one BBS message per statement.
//! [`suite::BbsBlsSignature2020`] signs the whole set, binding the proof options as the signature
//! header. [`derive::BbsBlsSignatureProof2020`] turns such a signature into a zero-knowledge proof
//! that reveals only the statements selected by a frame. [`document`] embeds both kinds of proof
//! into JSON documents, with any number of independent signatures per document.
//!
//! Contexts and key documents are resolved through an injected [`loader::DocumentLoader`].

/// Canonical statement sets and the built-in canonicalizer
pub mod canonicalize;
/// Selective disclosure proofs
pub mod derive;
/// Document level sign, verify and derive
pub mod document;
/// Disclosure and reveal frames
pub mod frame;
/// Key pairs and key documents
pub mod keypair;
/// Document loaders
pub mod loader;
/// Proof objects
pub mod proof;
/// Signature suite
pub mod suite;

pub use canonicalize::{CanonicalStatementSet, Canonicalizer, StatementCanonicalizer};
pub use derive::{BbsBlsSignatureProof2020, DeriveOptions};
pub use document::{derive_document, sign_document, verify_document, DocumentVerification};
pub use frame::{DisclosureFrame, RevealFrame};
pub use keypair::Bls12381G2KeyPair;
pub use loader::{DocumentLoader, StaticDocumentLoader};
pub use proof::{DerivedProof, ProofPurpose, ProofType, SignedProof};
pub use suite::{BbsBlsSignature2020, SignOptions, VerificationResult};
