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

use bls12_381_plus::G1Projective;
use elliptic_curve::group::Curve;
use elliptic_curve::hash2curve::{ExpandMsg, Expander};
use serde::ser::{SerializeStruct, Serializer};
use serde::Serialize;

use super::ciphersuites::BbsCiphersuite;
use crate::errors::Error;
use crate::utils::util::bbsplus_utils::i2osp;

/// The base point `P1`, the domain generator `Q1` and one generator per signed message.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Generators {
    pub g1_base_point: G1Projective,
    pub q1: G1Projective,
    pub message_generators: Vec<G1Projective>,
}

impl Serialize for Generators {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let result: Vec<String> = self
            .message_generators
            .iter()
            .map(|item| hex::encode(item.to_affine().to_compressed()))
            .collect();

        let mut state = serializer.serialize_struct("Generators", 3)?;
        state.serialize_field("P1", &hex::encode(self.g1_base_point.to_affine().to_compressed()))?;
        state.serialize_field("Q1", &hex::encode(self.q1.to_affine().to_compressed()))?;
        state.serialize_field("MsgGenerators", &result)?;
        state.end()
    }
}

impl Generators {
    /// Creates `count` generators (`Q1` plus `count - 1` message generators) and the base point.
    ///
    /// # Inputs:
    /// * `count` (REQUIRED), number of generators, i.e. number of messages + 1.
    /// * `api_id` (OPTIONAL), an octet string. If not supplied, it defaults to the empty string.
    pub fn create<CS: BbsCiphersuite>(count: usize, api_id: Option<&[u8]>) -> Result<Generators, Error> {
        if count == 0 {
            return Err(Error::NotEnoughGenerators);
        }
        let api_id = api_id.unwrap_or(b"");

        let base_point = create_generators::<CS>(1, &[api_id, CS::GENERATOR_SEED_BP].concat(), api_id)?[0];
        let values = create_generators::<CS>(count, &[api_id, CS::GENERATOR_SEED].concat(), api_id)?;

        Ok(Generators {
            g1_base_point: base_point,
            q1: values[0],
            message_generators: values[1..].to_vec(),
        })
    }
}

/// <https://www.ietf.org/archive/id/draft-irtf-cfrg-bbs-signatures-06.html#name-generators-calculation>
///
/// # Description
/// Deterministically derives `count` points of G1 from `generator_seed`
fn create_generators<CS: BbsCiphersuite>(count: usize, generator_seed: &[u8], api_id: &[u8]) -> Result<Vec<G1Projective>, Error> {
    let seed_dst = [api_id, CS::GENERATOR_SEED_DST].concat();
    let generator_dst = [api_id, CS::GENERATOR_DST].concat();

    let mut v = vec![0u8; CS::EXPAND_LEN];
    CS::Expander::expand_message(&[generator_seed], &[seed_dst.as_slice()], CS::EXPAND_LEN)
        .map_err(|_| Error::NotEnoughGenerators)?
        .fill_bytes(&mut v);

    let mut generators = Vec::with_capacity(count);
    for i in 1..=count {
        let input = [v.as_slice(), i2osp(i, 8).as_slice()].concat();
        let mut buffer = vec![0u8; CS::EXPAND_LEN];
        CS::Expander::expand_message(&[input.as_slice()], &[seed_dst.as_slice()], CS::EXPAND_LEN)
            .map_err(|_| Error::NotEnoughGenerators)?
            .fill_bytes(&mut buffer);
        v = buffer;
        generators.push(G1Projective::hash::<CS::Expander>(&v, &generator_dst));
    }

    Ok(generators)
}
