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

use core::fmt::Debug;
use core::marker::PhantomData;

use crate::keys::traits::{PrivateKey, PublicKey};

#[cfg(feature = "bbsplus")]
use crate::bbsplus::{
    ciphersuites::{BbsCiphersuite, Bls12381Sha256, Bls12381Shake256},
    keys::{BBSplusPublicKey, BBSplusSecretKey},
    proof::BBSplusPoKSignature,
    signature::BBSplusSignature,
};

/// BBS+ over BLS12-381, parametrised by ciphersuite.
#[cfg(feature = "bbsplus")]
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct BBSplus<CS: BbsCiphersuite>(PhantomData<CS>);

#[cfg(feature = "bbsplus")]
pub type BbsBls12381Sha256 = BBSplus<Bls12381Sha256>;
#[cfg(feature = "bbsplus")]
pub type BbsBls12381Shake256 = BBSplus<Bls12381Shake256>;

pub trait Scheme: Eq + Clone + Debug + Send + Sync + 'static {
    type Ciphersuite;
    type PrivKey: PrivateKey + Clone + Eq + Debug;
    type PubKey: PublicKey + Clone + Eq + Debug;
    type Sig: Clone + Eq + Debug + Send + Sync;
    type PoK: Clone + Eq + Debug + Send + Sync;
}

#[cfg(feature = "bbsplus")]
impl<CS: BbsCiphersuite> Scheme for BBSplus<CS> {
    type Ciphersuite = CS;
    type PrivKey = BBSplusSecretKey;
    type PubKey = BBSplusPublicKey;
    type Sig = BBSplusSignature;
    type PoK = BBSplusPoKSignature;
}
