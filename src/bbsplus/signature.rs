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

use bls12_381_plus::{multi_miller_loop, G1Affine, G1Projective, G2Prepared, G2Projective, Scalar};
use elliptic_curve::group::Curve;
use ff::Field;
use group::Group;

use super::{
    ciphersuites::BbsCiphersuite,
    generators::Generators,
    keys::{BBSplusPublicKey, BBSplusSecretKey},
};
use crate::{
    errors::Error,
    schemes::{algorithms::BBSplus, generics::Signature},
    utils::{
        message::BBSplusMessage,
        util::bbsplus_utils::{calculate_domain, compute_b, hash_to_scalar, ScalarExt},
    },
};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct BBSplusSignature {
    pub a: G1Projective,
    pub e: Scalar,
}

impl BBSplusSignature {
    pub const SIGNATURE_LENGTH: usize = 80;

    /// `A (48 bytes, compressed) || e (32 bytes, big-endian)`
    pub fn to_bytes(&self) -> [u8; Self::SIGNATURE_LENGTH] {
        let mut bytes = [0u8; Self::SIGNATURE_LENGTH];
        bytes[0..48].copy_from_slice(&self.a.to_affine().to_compressed());
        bytes[48..80].copy_from_slice(&self.e.to_bytes_be());
        bytes
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self, Error> {
        if data.len() != Self::SIGNATURE_LENGTH {
            return Err(Error::DeserializationError(format!(
                "signature must be {} bytes, got {}",
                Self::SIGNATURE_LENGTH,
                data.len()
            )));
        }

        let mut a_bytes = [0u8; 48];
        a_bytes.copy_from_slice(&data[0..48]);
        let a = Option::<G1Affine>::from(G1Affine::from_compressed(&a_bytes))
            .map(G1Projective::from)
            .ok_or_else(|| Error::DeserializationError("signature point is not in G1".to_owned()))?;
        if bool::from(a.is_identity()) {
            return Err(Error::InvalidSignature);
        }

        let mut e_bytes = [0u8; 32];
        e_bytes.copy_from_slice(&data[48..80]);
        let e = Scalar::from_bytes_be(&e_bytes)?;

        Ok(Self { a, e })
    }
}

impl<CS: BbsCiphersuite> Signature<BBSplus<CS>> {
    pub fn a(&self) -> G1Projective {
        self.0.a
    }

    pub fn e(&self) -> Scalar {
        self.0.e
    }

    /// <https://www.ietf.org/archive/id/draft-irtf-cfrg-bbs-signatures-06.html#name-signature-generation-sign>
    ///
    /// # Description
    /// Produces a signature over a `header` and a vector of messages. A missing or empty vector of messages
    /// yields a valid signature over the header alone.
    ///
    /// # Inputs:
    /// * `messages` (OPTIONAL), a vector of octet strings.
    /// * `sk` (REQUIRED), the signer secret key.
    /// * `pk` (REQUIRED), the public key corresponding to `sk`.
    /// * `header` (OPTIONAL), an octet string containing context and application specific information.
    pub fn sign(messages: Option<&[Vec<u8>]>, sk: &BBSplusSecretKey, pk: &BBSplusPublicKey, header: Option<&[u8]>) -> Result<Self, Error> {
        let messages = messages.unwrap_or(&[]);
        let message_scalars = BBSplusMessage::messages_to_scalar::<CS>(messages, CS::API_ID)?;
        let generators = Generators::create::<CS>(messages.len() + 1, Some(CS::API_ID))?;
        let signature = core_sign::<CS>(sk, pk, &generators, header, &message_scalars, Some(CS::API_ID))?;

        Ok(Self(signature))
    }

    /// <https://www.ietf.org/archive/id/draft-irtf-cfrg-bbs-signatures-06.html#name-signature-verification-veri>
    pub fn verify(&self, pk: &BBSplusPublicKey, messages: Option<&[Vec<u8>]>, header: Option<&[u8]>) -> Result<(), Error> {
        let messages = messages.unwrap_or(&[]);
        let message_scalars = BBSplusMessage::messages_to_scalar::<CS>(messages, CS::API_ID)?;
        let generators = Generators::create::<CS>(messages.len() + 1, Some(CS::API_ID))?;

        core_verify::<CS>(pk, &self.0, &message_scalars, &generators, header, Some(CS::API_ID))
    }

    pub fn bbsplus_signature(&self) -> &BBSplusSignature {
        &self.0
    }

    pub fn to_bytes(&self) -> [u8; BBSplusSignature::SIGNATURE_LENGTH] {
        self.0.to_bytes()
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self, Error> {
        Ok(Self(BBSplusSignature::from_bytes(data)?))
    }
}

pub(crate) fn core_sign<CS: BbsCiphersuite>(
    sk: &BBSplusSecretKey,
    pk: &BBSplusPublicKey,
    generators: &Generators,
    header: Option<&[u8]>,
    messages: &[BBSplusMessage],
    api_id: Option<&[u8]>,
) -> Result<BBSplusSignature, Error> {
    let L = messages.len();

    if generators.message_generators.len() != L {
        return Err(Error::NotEnoughGenerators);
    }

    let api_id = api_id.unwrap_or(b"");
    let signature_dst = [api_id, CS::H2S].concat();

    let domain = calculate_domain::<CS>(pk, generators, header, Some(api_id))?;

    // e = hash_to_scalar(serialize((SK, msg_1, ..., msg_L, domain)), signature_dst)
    let mut e_input: Vec<u8> = Vec::with_capacity(32 * (L + 2));
    e_input.extend_from_slice(&sk.0.to_bytes_be());
    messages.iter().for_each(|m| e_input.extend_from_slice(&m.to_bytes_be()));
    e_input.extend_from_slice(&domain.to_bytes_be());

    let e = hash_to_scalar::<CS>(&e_input, &signature_dst)?;

    let B = compute_b(generators, domain, messages);

    // A = B * (1 / (SK + e))
    let inverse = Option::<Scalar>::from((sk.0 + e).invert())
        .ok_or_else(|| Error::SignatureGenerationError("SK + e is not invertible".to_owned()))?;
    let A = B * inverse;

    if bool::from(A.is_identity()) {
        return Err(Error::G1IdentityError);
    }

    log::trace!("signed {} messages", L);
    Ok(BBSplusSignature { a: A, e })
}

pub(crate) fn core_verify<CS: BbsCiphersuite>(
    pk: &BBSplusPublicKey,
    signature: &BBSplusSignature,
    messages: &[BBSplusMessage],
    generators: &Generators,
    header: Option<&[u8]>,
    api_id: Option<&[u8]>,
) -> Result<(), Error> {
    let L = messages.len();

    if generators.message_generators.len() != L {
        return Err(Error::NotEnoughGenerators);
    }

    let domain = calculate_domain::<CS>(pk, generators, header, api_id)?;

    let B = compute_b(generators, domain, messages);

    // h(A, W + BP2 * e) * h(B, -BP2) == Identity_GT
    let BP2 = G2Projective::GENERATOR;
    let A2 = pk.0 + BP2 * signature.e;

    let term1 = (&signature.a.to_affine(), &G2Prepared::from(A2.to_affine()));
    let term2 = (&B.to_affine(), &G2Prepared::from(-BP2.to_affine()));

    let pairing = multi_miller_loop(&[term1, term2]).final_exponentiation();

    if bool::from(pairing.is_identity()) {
        Ok(())
    } else {
        Err(Error::SignatureVerificationError)
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        bbsplus::ciphersuites::{Bls12381Sha256, Bls12381Shake256, BbsCiphersuite},
        keys::pair::KeyPair,
        schemes::{algorithms::BBSplus, generics::Signature},
    };

    fn sign_and_verify<CS: BbsCiphersuite>() {
        let keypair = KeyPair::<BBSplus<CS>>::random().unwrap();
        let messages: Vec<Vec<u8>> = vec![b"first".to_vec(), b"second".to_vec(), b"third".to_vec()];
        let header = b"header";

        let signature = Signature::<BBSplus<CS>>::sign(Some(&messages), keypair.private_key(), keypair.public_key(), Some(header)).unwrap();
        assert!(signature.verify(keypair.public_key(), Some(&messages), Some(header)).is_ok());

        let restored = Signature::<BBSplus<CS>>::from_bytes(&signature.to_bytes()).unwrap();
        assert_eq!(restored, signature);

        let mut tampered = messages.clone();
        tampered[1] = b"SECOND".to_vec();
        assert!(signature.verify(keypair.public_key(), Some(&tampered), Some(header)).is_err());
        assert!(signature.verify(keypair.public_key(), Some(&messages), Some(b"other")).is_err());
    }

    #[test]
    fn sign_verify_sha256() {
        sign_and_verify::<Bls12381Sha256>();
    }

    #[test]
    fn sign_verify_shake256() {
        sign_and_verify::<Bls12381Shake256>();
    }

    #[test]
    fn zero_message_signature_verifies() {
        let keypair = KeyPair::<BBSplus<Bls12381Sha256>>::random().unwrap();
        let signature = Signature::<BBSplus<Bls12381Sha256>>::sign(None, keypair.private_key(), keypair.public_key(), Some(b"h")).unwrap();
        assert!(signature.verify(keypair.public_key(), None, Some(b"h")).is_ok());
        assert!(signature.verify(keypair.public_key(), Some(&[b"extra".to_vec()]), Some(b"h")).is_err());
    }

    #[test]
    fn truncated_signature_is_rejected() {
        assert!(Signature::<BBSplus<Bls12381Sha256>>::from_bytes(&[0u8; 79]).is_err());
    }
}
