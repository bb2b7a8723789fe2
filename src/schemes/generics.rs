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

use super::algorithms::Scheme;

/// A signature over an ordered list of messages.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Signature<S: Scheme>(pub(crate) S::Sig);

/// A zero-knowledge proof of knowledge of a [`Signature`], disclosing a subset of the signed messages.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct PoKSignature<S: Scheme>(pub(crate) S::PoK);
