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

use rand::RngCore;

/// Returns the indexes in `0..length` that are not listed in `indexes`, in ascending order.
pub fn get_remaining_indexes(length: usize, indexes: &[usize]) -> Vec<usize> {
    (0..length).filter(|i| !indexes.contains(i)).collect()
}

/// Generates `len` random bytes (e.g. a verifier nonce).
pub fn generate_random_secret(len: usize) -> Vec<u8> {
    let mut rng = rand::thread_rng();
    let mut secret = vec![0u8; len];
    rng.fill_bytes(&mut secret);
    secret
}

#[cfg(feature = "bbsplus")]
pub mod bbsplus_utils {
    use bls12_381_plus::{G1Projective, Scalar};
    use elliptic_curve::{group::Curve, hash2curve::{ExpandMsg, Expander}};
    use ff::Field;

    use crate::{
        bbsplus::{ciphersuites::BbsCiphersuite, generators::Generators, keys::BBSplusPublicKey},
        errors::Error,
        utils::message::BBSplusMessage,
    };

    /// <https://www.ietf.org/archive/id/draft-irtf-cfrg-bbs-signatures-06.html#name-hash-to-scalar>
    ///
    /// # Description
    /// Hashes an arbitrary octet string to a scalar value in the multiplicative group of integers mod r
    ///
    /// # Inputs:
    /// * `msg_octets` (REQUIRED), an octet string. The message to be hashed.
    /// * `dst` (REQUIRED), an octet string representing a domain separation tag.
    ///
    /// # Output:
    /// * a [`Scalar`] or [`Error`].
    pub fn hash_to_scalar<CS: BbsCiphersuite>(msg_octets: &[u8], dst: &[u8]) -> Result<Scalar, Error> {
        if dst.len() > 255 {
            return Err(Error::HashToScalarError);
        }

        let mut uniform_bytes = [0u8; 48];
        CS::Expander::expand_message(&[msg_octets], &[dst], uniform_bytes.len())
            .map_err(|_| Error::HashToScalarError)?
            .fill_bytes(&mut uniform_bytes);

        Ok(Scalar::from_okm(&uniform_bytes))
    }

    /// Integer to Octet Stream primitive (big-endian), `len` bytes wide.
    pub fn i2osp(x: usize, len: usize) -> Vec<u8> {
        let bytes = (x as u64).to_be_bytes();
        if len >= bytes.len() {
            let mut out = vec![0u8; len - bytes.len()];
            out.extend_from_slice(&bytes);
            out
        } else {
            bytes[bytes.len() - len..].to_vec()
        }
    }

    /// <https://www.ietf.org/archive/id/draft-irtf-cfrg-bbs-signatures-06.html#name-domain-calculation>
    ///
    /// # Description
    /// Computes the domain value, binding the public key, the generators and the header to every signature and proof.
    ///
    /// # Inputs:
    /// * `pk` (REQUIRED), the signer public key.
    /// * `generators` (REQUIRED), Q1 followed by the L message generators.
    /// * `header` (OPTIONAL), an octet string. If not supplied, it defaults to the empty string.
    /// * `api_id` (OPTIONAL), an octet string. If not supplied, it defaults to the empty string.
    pub(crate) fn calculate_domain<CS: BbsCiphersuite>(
        pk: &BBSplusPublicKey,
        generators: &Generators,
        header: Option<&[u8]>,
        api_id: Option<&[u8]>,
    ) -> Result<Scalar, Error> {
        let header = header.unwrap_or(b"");
        let api_id = api_id.unwrap_or(b"");
        let domain_dst = [api_id, CS::H2S].concat();

        let L = generators.message_generators.len();

        let mut dom_input: Vec<u8> = Vec::new();
        dom_input.extend_from_slice(&pk.to_bytes());
        dom_input.extend_from_slice(&i2osp(L, 8));
        dom_input.extend_from_slice(&generators.q1.to_affine().to_compressed());
        generators
            .message_generators
            .iter()
            .for_each(|h| dom_input.extend_from_slice(&h.to_affine().to_compressed()));
        dom_input.extend_from_slice(&i2osp(api_id.len(), 8));
        dom_input.extend_from_slice(api_id);
        dom_input.extend_from_slice(&i2osp(header.len(), 8));
        dom_input.extend_from_slice(header);

        hash_to_scalar::<CS>(&dom_input, &domain_dst)
    }

    /// `B = P1 + Q1 * domain + H_1 * msg_1 + ... + H_L * msg_L`
    pub(crate) fn compute_b(generators: &Generators, domain: Scalar, messages: &[BBSplusMessage]) -> G1Projective {
        let mut B = generators.g1_base_point + generators.q1 * domain;
        for (h, m) in generators.message_generators.iter().zip(messages) {
            B += h * m.value;
        }
        B
    }

    pub fn get_messages(messages: &[BBSplusMessage], indexes: &[usize]) -> Vec<BBSplusMessage> {
        indexes.iter().filter_map(|&i| messages.get(i).copied()).collect()
    }

    pub fn get_messages_vec(messages: &[Vec<u8>], indexes: &[usize]) -> Vec<Vec<u8>> {
        indexes.iter().filter_map(|&i| messages.get(i).cloned()).collect()
    }

    /// Returns a random non-zero scalar
    pub fn get_random() -> Scalar {
        let mut rng = rand::thread_rng();
        loop {
            let s = Scalar::random(&mut rng);
            if !bool::from(s.is_zero()) {
                return s;
            }
        }
    }

    /// <https://www.ietf.org/archive/id/draft-irtf-cfrg-bbs-signatures-06.html#name-random-scalars>
    pub fn calculate_random_scalars(count: usize) -> Vec<Scalar> {
        (0..count).map(|_| get_random()).collect()
    }

    pub trait ScalarExt {
        fn to_bytes_be(&self) -> [u8; 32];
        fn from_bytes_be(bytes: &[u8; 32]) -> Result<Scalar, Error>;
    }

    impl ScalarExt for Scalar {
        fn to_bytes_be(&self) -> [u8; 32] {
            self.to_be_bytes()
        }

        fn from_bytes_be(bytes: &[u8; 32]) -> Result<Scalar, Error> {
            Option::<Scalar>::from(Scalar::from_be_bytes(bytes))
                .ok_or_else(|| Error::DeserializationError("scalar out of range".to_owned()))
        }
    }
}
