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
use bls12_381_plus::Scalar;
#[cfg(feature = "bbsplus")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "bbsplus")]
use crate::{
    bbsplus::ciphersuites::BbsCiphersuite,
    errors::Error,
    utils::util::bbsplus_utils::hash_to_scalar,
};

/// A signed message mapped to a scalar of the BLS12-381 scalar field.
#[cfg(feature = "bbsplus")]
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct BBSplusMessage {
    pub value: Scalar,
}

#[cfg(feature = "bbsplus")]
impl BBSplusMessage {
    pub fn new(msg: Scalar) -> Self {
        Self { value: msg }
    }

    /// <https://www.ietf.org/archive/id/draft-irtf-cfrg-bbs-signatures-06.html#name-map-to-scalar>
    ///
    /// # Inputs:
    /// * `data` (REQUIRED), an octet string.
    /// * `api_id` (REQUIRED), the API identifier prepended to the `MAP_MSG_TO_SCALAR_AS_HASH_` tag.
    pub fn map_message_to_scalar_as_hash<CS: BbsCiphersuite>(data: &[u8], api_id: &[u8]) -> Result<Self, Error> {
        let dst = [api_id, CS::MAP_MSG_SCALAR].concat();
        Ok(Self::new(hash_to_scalar::<CS>(data, &dst)?))
    }

    /// Maps every message to a scalar, preserving order.
    pub fn messages_to_scalar<CS: BbsCiphersuite>(messages: &[Vec<u8>], api_id: &[u8]) -> Result<Vec<Self>, Error> {
        messages
            .iter()
            .map(|m| Self::map_message_to_scalar_as_hash::<CS>(m, api_id))
            .collect()
    }

    pub fn to_bytes_be(&self) -> [u8; 32] {
        self.value.to_be_bytes()
    }
}

#[cfg(all(test, feature = "bbsplus"))]
mod tests {
    use super::BBSplusMessage;
    use crate::bbsplus::ciphersuites::{BbsCiphersuite, Bls12381Sha256, Bls12381Shake256};

    #[test]
    fn mapping_is_deterministic_and_suite_separated() {
        let a = BBSplusMessage::map_message_to_scalar_as_hash::<Bls12381Sha256>(b"msg", Bls12381Sha256::API_ID).unwrap();
        let b = BBSplusMessage::map_message_to_scalar_as_hash::<Bls12381Sha256>(b"msg", Bls12381Sha256::API_ID).unwrap();
        let c = BBSplusMessage::map_message_to_scalar_as_hash::<Bls12381Shake256>(b"msg", Bls12381Shake256::API_ID).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
