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

use super::{ciphersuites::BbsCiphersuite, generators::Generators, keys::BBSplusPublicKey, signature::BBSplusSignature};
use crate::{
    errors::Error,
    schemes::{algorithms::BBSplus, generics::PoKSignature},
    utils::{
        message::BBSplusMessage,
        util::{
            bbsplus_utils::{calculate_domain, calculate_random_scalars, compute_b, get_messages, hash_to_scalar, i2osp, ScalarExt},
            get_remaining_indexes,
        },
    },
};

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct BBSplusPoKSignature {
    Abar: G1Projective,
    Bbar: G1Projective,
    D: G1Projective,
    e_cap: Scalar,
    r1_cap: Scalar,
    r3_cap: Scalar,
    m_cap: Vec<Scalar>,
    challenge: Scalar,
}

impl BBSplusPoKSignature {
    /// Length of a proof disclosing every message
    pub const MIN_LENGTH: usize = 3 * 48 + 4 * 32;

    /// Number of undisclosed messages
    pub fn undisclosed_count(&self) -> usize {
        self.m_cap.len()
    }

    /// `Abar || Bbar || D || e^ || r1^ || r3^ || m^_1 || ... || m^_U || c`
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes: Vec<u8> = Vec::with_capacity(Self::MIN_LENGTH + 32 * self.m_cap.len());

        bytes.extend_from_slice(&self.Abar.to_affine().to_compressed());
        bytes.extend_from_slice(&self.Bbar.to_affine().to_compressed());
        bytes.extend_from_slice(&self.D.to_affine().to_compressed());
        bytes.extend_from_slice(&self.e_cap.to_bytes_be());
        bytes.extend_from_slice(&self.r1_cap.to_bytes_be());
        bytes.extend_from_slice(&self.r3_cap.to_bytes_be());
        self.m_cap.iter().for_each(|v| bytes.extend_from_slice(&v.to_bytes_be()));
        bytes.extend_from_slice(&self.challenge.to_bytes_be());
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() < Self::MIN_LENGTH || (bytes.len() - 3 * 48) % 32 != 0 {
            return Err(Error::InvalidProofOfKnowledgeSignature);
        }

        let parse_g1 = |slice: &[u8]| -> Result<G1Projective, Error> {
            let mut buf = [0u8; 48];
            buf.copy_from_slice(slice);
            let point = Option::<G1Affine>::from(G1Affine::from_compressed(&buf)).ok_or(Error::InvalidProofOfKnowledgeSignature)?;
            Ok(G1Projective::from(point))
        };

        let Abar = parse_g1(&bytes[0..48])?;
        let Bbar = parse_g1(&bytes[48..96])?;
        let D = parse_g1(&bytes[96..144])?;

        let mut scalars: Vec<Scalar> = Vec::new();
        for chunk in bytes[144..].chunks_exact(32) {
            let mut buf = [0u8; 32];
            buf.copy_from_slice(chunk);
            scalars.push(Scalar::from_bytes_be(&buf).map_err(|_| Error::InvalidProofOfKnowledgeSignature)?);
        }

        // at least e^, r1^, r3^ and the challenge are present, even if every message is disclosed
        let challenge = scalars.pop().ok_or(Error::InvalidProofOfKnowledgeSignature)?;
        let m_cap = scalars.split_off(3);
        let (e_cap, r1_cap, r3_cap) = (scalars[0], scalars[1], scalars[2]);

        Ok(Self { Abar, Bbar, D, e_cap, r1_cap, r3_cap, m_cap, challenge })
    }
}

impl<CS: BbsCiphersuite> PoKSignature<BBSplus<CS>> {
    /// <https://www.ietf.org/archive/id/draft-irtf-cfrg-bbs-signatures-06.html#name-proof-generation-proofgen>
    ///
    /// # Description
    /// Computes a zero-knowledge proof of knowledge of a signature, while disclosing only the messages at `disclosed_indexes`.
    /// Fresh random scalars are drawn on every call, so two proofs over the same inputs are unlinkable.
    ///
    /// # Inputs:
    /// * `pk` (REQUIRED), the signer public key.
    /// * `signature` (REQUIRED), an octet string of the form outputted by [`BBSplusSignature::to_bytes`].
    /// * `header` (OPTIONAL), an octet string containing context and application specific information.
    /// * `ph` (OPTIONAL), the presentation header, e.g. a verifier nonce.
    /// * `messages` (OPTIONAL), every signed message.
    /// * `disclosed_indexes` (OPTIONAL), indexes of the messages to disclose.
    pub fn proof_gen(
        pk: &BBSplusPublicKey,
        signature: &[u8],
        header: Option<&[u8]>,
        ph: Option<&[u8]>,
        messages: Option<&[Vec<u8>]>,
        disclosed_indexes: Option<&[usize]>,
    ) -> Result<Self, Error> {
        let messages = messages.unwrap_or(&[]);
        let disclosed_indexes = disclosed_indexes.unwrap_or(&[]);

        let signature = BBSplusSignature::from_bytes(signature)?;
        let message_scalars = BBSplusMessage::messages_to_scalar::<CS>(messages, CS::API_ID)?;
        let generators = Generators::create::<CS>(messages.len() + 1, Some(CS::API_ID))?;

        let proof = core_proof_gen::<CS>(pk, &signature, &generators, &message_scalars, disclosed_indexes, header, ph, Some(CS::API_ID))?;

        Ok(Self(proof))
    }

    /// <https://www.ietf.org/archive/id/draft-irtf-cfrg-bbs-signatures-06.html#name-proof-verification-proofver>
    pub fn proof_verify(
        &self,
        pk: &BBSplusPublicKey,
        disclosed_messages: Option<&[Vec<u8>]>,
        disclosed_indexes: Option<&[usize]>,
        header: Option<&[u8]>,
        ph: Option<&[u8]>,
    ) -> Result<(), Error> {
        let disclosed_messages = disclosed_messages.unwrap_or(&[]);
        let mut disclosed_indexes = disclosed_indexes.unwrap_or(&[]).to_vec();
        disclosed_indexes.sort_unstable();
        disclosed_indexes.dedup();

        let U = self.0.m_cap.len();
        let R = disclosed_indexes.len();

        let disclosed_message_scalars = BBSplusMessage::messages_to_scalar::<CS>(disclosed_messages, CS::API_ID)?;
        let generators = Generators::create::<CS>(U + R + 1, Some(CS::API_ID))?;

        core_proof_verify::<CS>(pk, &self.0, &generators, header, ph, &disclosed_message_scalars, &disclosed_indexes, Some(CS::API_ID))
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.0.to_bytes()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        Ok(Self(BBSplusPoKSignature::from_bytes(bytes)?))
    }

    pub fn to_bbsplus_proof(&self) -> &BBSplusPoKSignature {
        &self.0
    }
}

#[allow(clippy::too_many_arguments)]
fn core_proof_gen<CS: BbsCiphersuite>(
    pk: &BBSplusPublicKey,
    signature: &BBSplusSignature,
    generators: &Generators,
    messages: &[BBSplusMessage],
    disclosed_indexes: &[usize],
    header: Option<&[u8]>,
    ph: Option<&[u8]>,
    api_id: Option<&[u8]>,
) -> Result<BBSplusPoKSignature, Error> {
    let L = messages.len();
    let mut disclosed_indexes = disclosed_indexes.to_vec();
    disclosed_indexes.sort_unstable();
    disclosed_indexes.dedup();

    let R = disclosed_indexes.len();
    if R > L {
        return Err(Error::ProofGenError("R > L".to_owned()));
    }
    let U = L - R;

    if let Some(invalid_index) = disclosed_indexes.iter().find(|&&i| i >= L) {
        return Err(Error::ProofGenError(format!("Invalid disclosed index: {}", invalid_index)));
    }

    let undisclosed_indexes = get_remaining_indexes(L, &disclosed_indexes);

    let disclosed_messages = get_messages(messages, &disclosed_indexes);
    let undisclosed_messages = get_messages(messages, &undisclosed_indexes);

    let random_scalars = calculate_random_scalars(5 + U);

    let init_res = proof_init::<CS>(pk, signature, generators, &random_scalars, header, messages, &undisclosed_indexes, api_id)?;

    let challenge = proof_challenge_calculate::<CS>(&init_res, &disclosed_indexes, &disclosed_messages, ph, api_id)?;

    proof_finalize(&init_res, challenge, signature.e, &random_scalars, &undisclosed_messages)
}

struct ProofInitResult {
    Abar: G1Projective,
    Bbar: G1Projective,
    D: G1Projective,
    T1: G1Projective,
    T2: G1Projective,
    domain: Scalar,
}

#[allow(clippy::too_many_arguments)]
fn proof_init<CS: BbsCiphersuite>(
    pk: &BBSplusPublicKey,
    signature: &BBSplusSignature,
    generators: &Generators,
    random_scalars: &[Scalar],
    header: Option<&[u8]>,
    messages: &[BBSplusMessage],
    undisclosed_indexes: &[usize],
    api_id: Option<&[u8]>,
) -> Result<ProofInitResult, Error> {
    let L = messages.len();
    let U = undisclosed_indexes.len();

    if random_scalars.len() != 5 + U {
        return Err(Error::ProofGenError("Random scalars not valid".to_owned()));
    }

    if generators.message_generators.len() != L {
        return Err(Error::NotEnoughGenerators);
    }

    let domain = calculate_domain::<CS>(pk, generators, header, api_id)?;

    let B = compute_b(generators, domain, messages);

    let r1 = random_scalars[0];
    let r2 = random_scalars[1];
    let e_tilde = random_scalars[2];
    let r1_tilde = random_scalars[3];
    let r3_tilde = random_scalars[4];
    let m_tilde = &random_scalars[5..(5 + U)];

    let D = B * r2;
    let Abar = signature.a * (r1 * r2);
    let Bbar = D * r1 - Abar * signature.e;

    let T1 = Abar * e_tilde + D * r1_tilde;
    let mut T2 = D * r3_tilde;
    for (idx, m) in undisclosed_indexes.iter().zip(m_tilde) {
        T2 += generators.message_generators[*idx] * m;
    }

    Ok(ProofInitResult { Abar, Bbar, D, T1, T2, domain })
}

fn proof_challenge_calculate<CS: BbsCiphersuite>(
    init_res: &ProofInitResult,
    disclosed_indexes: &[usize],
    disclosed_messages: &[BBSplusMessage],
    ph: Option<&[u8]>,
    api_id: Option<&[u8]>,
) -> Result<Scalar, Error> {
    let R = disclosed_indexes.len();

    if disclosed_messages.len() != R {
        return Err(Error::ProofGenError(
            "Number of disclosed indexes different from number of disclosed messages".to_owned(),
        ));
    }

    let api_id = api_id.unwrap_or(b"");
    let challenge_dst = [api_id, CS::H2S].concat();
    let ph = ph.unwrap_or(b"");

    // c_arr = (R, i1, msg_i1, ..., iR, msg_iR, Abar, Bbar, D, T1, T2, domain)
    let mut c_arr: Vec<u8> = Vec::new();
    c_arr.extend_from_slice(&i2osp(R, 8));
    for (i, m) in disclosed_indexes.iter().zip(disclosed_messages) {
        c_arr.extend_from_slice(&i2osp(*i, 8));
        c_arr.extend_from_slice(&m.to_bytes_be());
    }
    c_arr.extend_from_slice(&init_res.Abar.to_affine().to_compressed());
    c_arr.extend_from_slice(&init_res.Bbar.to_affine().to_compressed());
    c_arr.extend_from_slice(&init_res.D.to_affine().to_compressed());
    c_arr.extend_from_slice(&init_res.T1.to_affine().to_compressed());
    c_arr.extend_from_slice(&init_res.T2.to_affine().to_compressed());
    c_arr.extend_from_slice(&init_res.domain.to_bytes_be());
    c_arr.extend_from_slice(&i2osp(ph.len(), 8));
    c_arr.extend_from_slice(ph);

    hash_to_scalar::<CS>(&c_arr, &challenge_dst)
}

fn proof_finalize(
    init_res: &ProofInitResult,
    challenge: Scalar,
    e: Scalar,
    random_scalars: &[Scalar],
    undisclosed_messages: &[BBSplusMessage],
) -> Result<BBSplusPoKSignature, Error> {
    let U = undisclosed_messages.len();

    let r1 = random_scalars[0];
    let r2 = random_scalars[1];
    let e_tilde = random_scalars[2];
    let r1_tilde = random_scalars[3];
    let r3_tilde = random_scalars[4];
    let m_tilde = &random_scalars[5..(5 + U)];

    let r3 = Option::<Scalar>::from(r2.invert()).ok_or_else(|| Error::ProofGenError("Invert scalar failed".to_owned()))?;

    let e_cap = e_tilde + e * challenge;
    let r1_cap = r1_tilde - r1 * challenge;
    let r3_cap = r3_tilde - r3 * challenge;
    let m_cap: Vec<Scalar> = m_tilde
        .iter()
        .zip(undisclosed_messages)
        .map(|(m_t, m)| m_t + m.value * challenge)
        .collect();

    Ok(BBSplusPoKSignature {
        Abar: init_res.Abar,
        Bbar: init_res.Bbar,
        D: init_res.D,
        e_cap,
        r1_cap,
        r3_cap,
        m_cap,
        challenge,
    })
}

#[allow(clippy::too_many_arguments)]
fn core_proof_verify<CS: BbsCiphersuite>(
    pk: &BBSplusPublicKey,
    proof: &BBSplusPoKSignature,
    generators: &Generators,
    header: Option<&[u8]>,
    ph: Option<&[u8]>,
    disclosed_messages: &[BBSplusMessage],
    disclosed_indexes: &[usize],
    api_id: Option<&[u8]>,
) -> Result<(), Error> {
    if bool::from(proof.Abar.is_identity()) {
        return Err(Error::PoKSVerificationError("Abar == Identity_G1".to_owned()));
    }

    let init_res = proof_verify_init::<CS>(pk, proof, generators, header, disclosed_messages, disclosed_indexes, api_id)?;

    let challenge = proof_challenge_calculate::<CS>(&init_res, disclosed_indexes, disclosed_messages, ph, api_id)?;

    if proof.challenge != challenge {
        return Err(Error::PoKSVerificationError("invalid challenge".to_owned()));
    }

    // h(Abar, W) * h(Bbar, -BP2) == Identity_GT
    let BP2 = G2Projective::GENERATOR;

    let term1 = (&proof.Abar.to_affine(), &G2Prepared::from(pk.0.to_affine()));
    let term2 = (&proof.Bbar.to_affine(), &G2Prepared::from(-BP2.to_affine()));

    let pairing = multi_miller_loop(&[term1, term2]).final_exponentiation();

    if bool::from(pairing.is_identity()) {
        Ok(())
    } else {
        Err(Error::PoKSVerificationError("Invalid Proof".to_owned()))
    }
}

fn proof_verify_init<CS: BbsCiphersuite>(
    pk: &BBSplusPublicKey,
    proof: &BBSplusPoKSignature,
    generators: &Generators,
    header: Option<&[u8]>,
    disclosed_messages: &[BBSplusMessage],
    disclosed_indexes: &[usize],
    api_id: Option<&[u8]>,
) -> Result<ProofInitResult, Error> {
    let U = proof.m_cap.len();
    let R = disclosed_indexes.len();
    let L = U + R;

    if disclosed_indexes.iter().any(|&i| i >= L) {
        return Err(Error::PoKSVerificationError("Invalid disclosed indexes".to_owned()));
    }

    if disclosed_messages.len() != R {
        return Err(Error::PoKSVerificationError("len messages != len indexes".to_owned()));
    }

    if generators.message_generators.len() != L {
        return Err(Error::NotEnoughGenerators);
    }

    let undisclosed_indexes = get_remaining_indexes(L, disclosed_indexes);

    let domain = calculate_domain::<CS>(pk, generators, header, api_id)?;

    let T1 = proof.Bbar * proof.challenge + proof.Abar * proof.e_cap + proof.D * proof.r1_cap;

    let mut Bv = generators.g1_base_point + generators.q1 * domain;
    for (i, m) in disclosed_indexes.iter().zip(disclosed_messages) {
        Bv += generators.message_generators[*i] * m.value;
    }

    let mut T2 = Bv * proof.challenge + proof.D * proof.r3_cap;
    for (j, m_cap) in undisclosed_indexes.iter().zip(&proof.m_cap) {
        T2 += generators.message_generators[*j] * m_cap;
    }

    Ok(ProofInitResult { Abar: proof.Abar, Bbar: proof.Bbar, D: proof.D, T1, T2, domain })
}

#[cfg(test)]
mod tests {
    use crate::{
        bbsplus::ciphersuites::{BbsCiphersuite, Bls12381Sha256, Bls12381Shake256},
        keys::pair::KeyPair,
        schemes::{
            algorithms::BBSplus,
            generics::{PoKSignature, Signature},
        },
        utils::util::bbsplus_utils::get_messages_vec,
    };

    fn messages() -> Vec<Vec<u8>> {
        (0..5).map(|i| format!("message-{}", i).into_bytes()).collect()
    }

    fn proof_roundtrip<CS: BbsCiphersuite>() {
        let keypair = KeyPair::<BBSplus<CS>>::random().unwrap();
        let messages = messages();
        let header = b"header";
        let ph = b"nonce";
        let disclosed = [0usize, 3];

        let signature = Signature::<BBSplus<CS>>::sign(Some(&messages), keypair.private_key(), keypair.public_key(), Some(header)).unwrap();

        let proof = PoKSignature::<BBSplus<CS>>::proof_gen(
            keypair.public_key(),
            &signature.to_bytes(),
            Some(header),
            Some(ph),
            Some(&messages),
            Some(&disclosed),
        )
        .unwrap();

        let disclosed_messages = get_messages_vec(&messages, &disclosed);
        let restored = PoKSignature::<BBSplus<CS>>::from_bytes(&proof.to_bytes()).unwrap();
        assert_eq!(restored, proof);
        assert_eq!(restored.to_bbsplus_proof().undisclosed_count(), 3);

        assert!(restored
            .proof_verify(keypair.public_key(), Some(&disclosed_messages), Some(&disclosed), Some(header), Some(ph))
            .is_ok());
        assert!(restored
            .proof_verify(keypair.public_key(), Some(&disclosed_messages), Some(&disclosed), Some(header), Some(b"other"))
            .is_err());
        assert!(restored
            .proof_verify(keypair.public_key(), Some(&disclosed_messages), Some(&[0, 4]), Some(header), Some(ph))
            .is_err());
    }

    #[test]
    fn proof_sha256() {
        proof_roundtrip::<Bls12381Sha256>();
    }

    #[test]
    fn proof_shake256() {
        proof_roundtrip::<Bls12381Shake256>();
    }

    #[test]
    fn proofs_are_randomized() {
        let keypair = KeyPair::<BBSplus<Bls12381Sha256>>::random().unwrap();
        let messages = messages();
        let signature = Signature::<BBSplus<Bls12381Sha256>>::sign(Some(&messages), keypair.private_key(), keypair.public_key(), None).unwrap();

        let gen = || {
            PoKSignature::<BBSplus<Bls12381Sha256>>::proof_gen(keypair.public_key(), &signature.to_bytes(), None, None, Some(&messages), Some(&[1]))
                .unwrap()
                .to_bytes()
        };
        assert_ne!(gen(), gen());
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let keypair = KeyPair::<BBSplus<Bls12381Sha256>>::random().unwrap();
        let messages = messages();
        let signature = Signature::<BBSplus<Bls12381Sha256>>::sign(Some(&messages), keypair.private_key(), keypair.public_key(), None).unwrap();
        assert!(PoKSignature::<BBSplus<Bls12381Sha256>>::proof_gen(
            keypair.public_key(),
            &signature.to_bytes(),
            None,
            None,
            Some(&messages),
            Some(&[5])
        )
        .is_err());
    }
}
