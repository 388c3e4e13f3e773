//! Cognito SRP password verifier (`USER_SRP_AUTH`).
//!
//! Implements the client side of the challenge-response login protocol:
//! an ephemeral key pair proves password knowledge without transmitting the
//! password. The group is the 3072-bit MODP prime (RFC 3526 group 15) with
//! generator 2, as used by Cognito.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use hmac::{Hmac, Mac};
use num_bigint::{BigInt, Sign};
use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};

type HmacSha256 = Hmac<Sha256>;

/// RFC 3526 group 15 modulus (3072-bit).
const N_HEX: &str = concat!(
    "FFFFFFFFFFFFFFFFC90FDAA22168C234C4C6628B80DC1CD129024E088A67CC74",
    "020BBEA63B139B22514A08798E3404DDEF9519B3CD3A431B302B0A6DF25F1437",
    "4FE1356D6D51C245E485B576625E7EC6F44C42E9A637ED6B0BFF5CB6F406B7ED",
    "EE386BFB5A899FA5AE9F24117C4B1FE649286651ECE45B3DC2007CB8A163BF05",
    "98DA48361C55D39A69163FA8FD24CF5F83655D23DCA3AD961C62F356208552BB",
    "9ED529077096966D670C354E4ABC9804F1746C08CA18217C32905E462E36CE3B",
    "E39E772C180E86039B2783A2EC07A28FB5C55DF06F4C52C9DE2BCBF695581718",
    "3995497CEA956AE515D2261898FA051015728E5A8AAAC42DAD33170D04507A33",
    "A85521ABDF1CBA64ECFB850458DBEF0A8AEA71575D060C7DB3970F85A6E1E4C7",
    "ABF5AE8CDB0933D71E8C94E04A25619DCEE3D2261AD2EE6BF12FFA06D98A0864",
    "D87602733EC86A64521F2B18177B200CBBE117577A615D6C770988C0BAD946E2",
    "08E24FA074E5AB3143DB5BFCE0FD108E4B82D120A93AD2CAFFFFFFFFFFFFFFFF",
);

const G_HEX: &str = "2";

/// Info string for the derived-key HKDF step (fixed by the protocol).
const DERIVED_KEY_INFO: &[u8] = b"Caldera Derived Key";

/// Client half of the SRP exchange for one login attempt.
pub(crate) struct SrpClient {
    big_n: BigInt,
    g: BigInt,
    k: BigInt,
    small_a: BigInt,
    large_a: BigInt,
    pool_name: String,
}

impl SrpClient {
    /// Create a client with a fresh random ephemeral key.
    ///
    /// `user_pool_id` has the form `{region}_{pool_name}`.
    pub fn new(user_pool_id: &str) -> Result<Self> {
        let mut seed = [0u8; 128];
        rand::rng().fill_bytes(&mut seed);
        Self::with_ephemeral(user_pool_id, BigInt::from_bytes_be(Sign::Plus, &seed))
    }

    /// Create a client with a caller-supplied ephemeral value (deterministic).
    fn with_ephemeral(user_pool_id: &str, seed: BigInt) -> Result<Self> {
        let pool_name = user_pool_id
            .split('_')
            .nth(1)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                Error::Config(format!(
                    "invalid user pool id '{}' (expected '{{region}}_{{name}}')",
                    user_pool_id
                ))
            })?
            .to_string();

        let big_n = hex_to_int(N_HEX)?;
        let g = hex_to_int(G_HEX)?;
        // k = H(N || g), both padded.
        let k = hex_to_int(&hex_hash(&format!("00{}0{}", N_HEX, G_HEX))?)?;

        let small_a = seed % &big_n;
        let large_a = g.modpow(&small_a, &big_n);
        if (&large_a % &big_n) == BigInt::from(0) {
            return Err(Error::AuthenticationFailed(
                "unsafe SRP client value (A mod N == 0)".into(),
            ));
        }

        Ok(Self {
            big_n,
            g,
            k,
            small_a,
            large_a,
            pool_name,
        })
    }

    /// Hex encoding of the public ephemeral `A`, sent as `SRP_A`.
    pub fn a_hex(&self) -> String {
        to_hex(&self.large_a)
    }

    /// Compute the base64 `PASSWORD_CLAIM_SIGNATURE` for the
    /// `PASSWORD_VERIFIER` challenge.
    pub fn password_claim_signature(
        &self,
        user_id_for_srp: &str,
        password: &str,
        srp_b_hex: &str,
        salt_hex: &str,
        secret_block_b64: &str,
        timestamp: &str,
    ) -> Result<String> {
        let srp_b = hex_to_int(srp_b_hex)?;
        if (&srp_b % &self.big_n) == BigInt::from(0) {
            return Err(Error::AuthenticationFailed(
                "server rejected: B mod N == 0".into(),
            ));
        }

        // u = H(A || B)
        let u = hex_to_int(&hex_hash(&format!(
            "{}{}",
            pad_hex(&to_hex(&self.large_a)),
            pad_hex(&to_hex(&srp_b))
        ))?)?;
        if u == BigInt::from(0) {
            return Err(Error::AuthenticationFailed(
                "server rejected: H(A, B) == 0".into(),
            ));
        }

        // x = H(salt || H(pool_name + user_id + ":" + password))
        let username_password =
            format!("{}{}:{}", self.pool_name, user_id_for_srp, password);
        let username_password_hash = sha256_hex(username_password.as_bytes());
        let x = hex_to_int(&hex_hash(&format!(
            "{}{}",
            pad_hex(salt_hex),
            username_password_hash
        ))?)?;

        // s = (B - k * g^x) ^ (a + u*x) mod N
        let g_pow_x = self.g.modpow(&x, &self.big_n);
        let mut base = (&srp_b - &self.k * g_pow_x) % &self.big_n;
        if base.sign() == Sign::Minus {
            base += &self.big_n;
        }
        let exponent = &self.small_a + &u * &x;
        let s = base.modpow(&exponent, &self.big_n);

        let ikm = hex::decode(pad_hex(&to_hex(&s)))
            .map_err(|e| Error::Decode(format!("shared secret: {}", e)))?;
        let hkdf_salt = hex::decode(pad_hex(&to_hex(&u)))
            .map_err(|e| Error::Decode(format!("scrambling parameter: {}", e)))?;
        let key = derive_key(&ikm, &hkdf_salt)?;

        let secret_block = BASE64
            .decode(secret_block_b64)
            .map_err(|e| Error::Decode(format!("SECRET_BLOCK: {}", e)))?;

        let mut msg =
            Vec::with_capacity(self.pool_name.len() + user_id_for_srp.len() + secret_block.len() + timestamp.len());
        msg.extend_from_slice(self.pool_name.as_bytes());
        msg.extend_from_slice(user_id_for_srp.as_bytes());
        msg.extend_from_slice(&secret_block);
        msg.extend_from_slice(timestamp.as_bytes());

        let mut mac = HmacSha256::new_from_slice(&key)
            .map_err(|_| Error::AuthenticationFailed("invalid HMAC key length".into()))?;
        mac.update(&msg);
        Ok(BASE64.encode(mac.finalize().into_bytes()))
    }
}

/// Two-step HKDF yielding the 16-byte password authentication key.
fn derive_key(ikm: &[u8], salt: &[u8]) -> Result<[u8; 16]> {
    let mut extract = HmacSha256::new_from_slice(salt)
        .map_err(|_| Error::AuthenticationFailed("invalid HKDF salt length".into()))?;
    extract.update(ikm);
    let prk = extract.finalize().into_bytes();

    let mut expand = HmacSha256::new_from_slice(&prk)
        .map_err(|_| Error::AuthenticationFailed("invalid HKDF key length".into()))?;
    expand.update(DERIVED_KEY_INFO);
    expand.update(&[1u8]);
    let okm = expand.finalize().into_bytes();

    let mut key = [0u8; 16];
    key.copy_from_slice(&okm[..16]);
    Ok(key)
}

/// Timestamp format required by the password claim, e.g.
/// `Tue Mar 5 07:09:02 UTC 2024` (day of month not zero-padded).
pub(crate) fn srp_timestamp(now: chrono::DateTime<chrono::Utc>) -> String {
    now.format("%a %b %-d %H:%M:%S UTC %Y").to_string()
}

fn to_hex(value: &BigInt) -> String {
    value.to_str_radix(16)
}

fn hex_to_int(hex_str: &str) -> Result<BigInt> {
    BigInt::parse_bytes(hex_str.as_bytes(), 16)
        .ok_or_else(|| Error::Decode(format!("invalid hex integer: '{}'", hex_str)))
}

/// Even-length hex with a leading `00` when the top bit is set, so the byte
/// representation is never interpreted as negative.
fn pad_hex(hex_str: &str) -> String {
    if hex_str.len() % 2 == 1 {
        format!("0{}", hex_str)
    } else if matches!(
        hex_str.chars().next(),
        Some('8'..='9' | 'a'..='f' | 'A'..='F')
    ) {
        format!("00{}", hex_str)
    } else {
        hex_str.to_string()
    }
}

fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// SHA-256 over the bytes denoted by a hex string, as a 64-char hex digest.
fn hex_hash(hex_str: &str) -> Result<String> {
    let bytes =
        hex::decode(hex_str).map_err(|e| Error::Decode(format!("invalid hex input: {}", e)))?;
    Ok(sha256_hex(&bytes))
}
