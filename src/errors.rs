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


use thiserror::Error;

#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("Invalid key material: {0}")]
    InvalidKeyMaterial(String),
    #[error("Error during keypair generation: {0}")]
    KeyGenError(String),
    #[error("Empty statement set")]
    EmptyInput,
    #[error("Disclosure frame does not match the document: {0}")]
    FrameMismatch(String),
    #[error("Context not found: {0}")]
    ContextNotFound(String),
    #[error("Invalid document: {0}")]
    InvalidDocument(String),
    #[error("Error during deserialization: {0}")]
    DeserializationError(String),
    #[error("Unsupported proof type: {0}")]
    UnsupportedProofType(String),
    #[error("Document has no proof")]
    MissingProof,
    #[error("Proof purpose mismatch: {0}")]
    PurposeMismatch(String),
    #[error("Not enough Generators")]
    NotEnoughGenerators,
    #[error("Error during hash to scalar computation")]
    HashToScalarError,
    #[error("Error during computation of a Signature: {0}")]
    SignatureGenerationError(String),
    /// [More Info](https://datatracker.ietf.org/doc/html/draft-irtf-cfrg-bbs-signatures-06#name-coresign) in the `Note` at the end
    #[error("A == Identity_G1")]
    G1IdentityError,
    #[error("Not a valid Signature")]
    InvalidSignature,
    #[error("Signature is not valid")]
    SignatureVerificationError,
    #[error("Error during computation of a Proof of Knowledge of a Signature: {0}")]
    ProofGenError(String),
    #[error("Invalid Proof of Knowledge of a Signature")]
    InvalidProofOfKnowledgeSignature,
    #[error("Proof of Knowledge of a Signature verification failed: {0}")]
    PoKSVerificationError(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::DeserializationError(e.to_string())
    }
}

impl From<base64::DecodeError> for Error {
    fn from(e: base64::DecodeError) -> Self {
        Error::DeserializationError(e.to_string())
    }
}
