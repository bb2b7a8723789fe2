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


//! Linked-data proofs backed by BBS signatures over BLS12-381.
//!
//! The crate is layered in two parts:
//! - [`bbsplus`]: the BBS signature scheme ([draft-irtf-cfrg-bbs-signatures-06](https://www.ietf.org/archive/id/draft-irtf-cfrg-bbs-signatures-06.html)),
//!   with multi-message signatures and zero-knowledge proofs of knowledge of a signature.
//! - [`ld`]: the `BbsBlsSignature2020` and `BbsBlsSignatureProof2020` linked-data suites, which sign canonical
//!   statement sets, embed proofs into JSON documents and derive selectively disclosed documents.
//!
//! # Usage
//! ```toml
//! zkryptium-ld = { version = "0.1", features = ["bbsplus"] }
//! ```

#![allow(non_snake_case)]

/// Error types
pub mod errors;
/// Key pairs and key traits
pub mod keys;
/// Signature schemes
pub mod schemes;
/// Utilities
pub mod utils;

#[cfg(feature = "bbsplus")]
pub mod bbsplus;
#[cfg(feature = "bbsplus")]
pub mod ld;
