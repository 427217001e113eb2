//! RSA keypair lifecycle and JWKS publication.
//!
//! Load order: base64-encoded PEMs from configuration, then PEM files
//! in the configured key directory, then generate a fresh keypair and
//! persist both files (private key restricted to owner read/write).
//! The `kid` is fixed for the process lifetime — the core does not
//! rotate keys, and callers must not bake the kid into anything
//! persisted beyond the JWT header, since that's what makes rotation
//! (if ever added) possible without a migration.

use std::fs;
use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use rsa::pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey, EncodeRsaPrivateKey, EncodeRsaPublicKey};
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};
use serde::Serialize;

const KID: &str = "oauth-provider-key-1";
const KEY_BITS: usize = 2048;

#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    #[error("failed to decode configured PEM: {0}")]
    Decode(String),
    #[error("failed to read key file {0}: {1}")]
    Io(PathBuf, std::io::Error),
    #[error("failed to generate RSA keypair: {0}")]
    Generate(String),
}

pub struct KeyManager {
    private_key: RsaPrivateKey,
    public_key: RsaPublicKey,
}

#[derive(Debug, Serialize)]
pub struct Jwk {
    pub kty: &'static str,
    #[serde(rename = "use")]
    pub use_: &'static str,
    pub alg: &'static str,
    pub kid: &'static str,
    pub n: String,
    pub e: String,
}

#[derive(Debug, Serialize)]
pub struct Jwks {
    pub keys: Vec<Jwk>,
}

impl KeyManager {
    pub fn kid() -> &'static str {
        KID
    }

    /// Loads a keypair per the configured precedence, generating and
    /// persisting one if none is available.
    pub fn load_or_generate(
        private_pem_b64: Option<&str>,
        public_pem_b64: Option<&str>,
        keys_dir: &str,
    ) -> Result<Self, KeyError> {
        if let (Some(priv_b64), Some(pub_b64)) = (private_pem_b64, public_pem_b64) {
            return Self::from_base64_pems(priv_b64, pub_b64);
        }

        let dir = Path::new(keys_dir);
        let private_path = dir.join("private.pem");
        let public_path = dir.join("public.pem");

        if private_path.exists() && public_path.exists() {
            return Self::from_pem_files(&private_path, &public_path);
        }

        Self::generate_and_persist(&private_path, &public_path)
    }

    fn from_base64_pems(priv_b64: &str, pub_b64: &str) -> Result<Self, KeyError> {
        let priv_pem = STANDARD
            .decode(priv_b64.trim())
            .map_err(|e| KeyError::Decode(e.to_string()))?;
        let pub_pem = STANDARD
            .decode(pub_b64.trim())
            .map_err(|e| KeyError::Decode(e.to_string()))?;
        let priv_pem = String::from_utf8(priv_pem).map_err(|e| KeyError::Decode(e.to_string()))?;
        let pub_pem = String::from_utf8(pub_pem).map_err(|e| KeyError::Decode(e.to_string()))?;

        let private_key = RsaPrivateKey::from_pkcs1_pem(&priv_pem)
            .map_err(|e| KeyError::Decode(e.to_string()))?;
        let public_key =
            RsaPublicKey::from_pkcs1_pem(&pub_pem).map_err(|e| KeyError::Decode(e.to_string()))?;

        Ok(Self {
            private_key,
            public_key,
        })
    }

    fn from_pem_files(private_path: &Path, public_path: &Path) -> Result<Self, KeyError> {
        let priv_pem = fs::read_to_string(private_path)
            .map_err(|e| KeyError::Io(private_path.to_path_buf(), e))?;
        let pub_pem = fs::read_to_string(public_path)
            .map_err(|e| KeyError::Io(public_path.to_path_buf(), e))?;

        let private_key = RsaPrivateKey::from_pkcs1_pem(&priv_pem)
            .map_err(|e| KeyError::Decode(e.to_string()))?;
        let public_key =
            RsaPublicKey::from_pkcs1_pem(&pub_pem).map_err(|e| KeyError::Decode(e.to_string()))?;

        Ok(Self {
            private_key,
            public_key,
        })
    }

    fn generate_and_persist(private_path: &Path, public_path: &Path) -> Result<Self, KeyError> {
        let mut rng = rsa::rand_core::OsRng;
        let private_key = RsaPrivateKey::new(&mut rng, KEY_BITS)
            .map_err(|e| KeyError::Generate(e.to_string()))?;
        let public_key = RsaPublicKey::from(&private_key);

        if let Some(parent) = private_path.parent() {
            fs::create_dir_all(parent).map_err(|e| KeyError::Io(parent.to_path_buf(), e))?;
        }

        let priv_pem = private_key
            .to_pkcs1_pem(rsa::pkcs1::LineEnding::LF)
            .map_err(|e| KeyError::Generate(e.to_string()))?;
        let pub_pem = public_key
            .to_pkcs1_pem(rsa::pkcs1::LineEnding::LF)
            .map_err(|e| KeyError::Generate(e.to_string()))?;

        fs::write(private_path, priv_pem.as_bytes())
            .map_err(|e| KeyError::Io(private_path.to_path_buf(), e))?;
        fs::write(public_path, pub_pem.as_bytes())
            .map_err(|e| KeyError::Io(public_path.to_path_buf(), e))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = fs::Permissions::from_mode(0o600);
            fs::set_permissions(private_path, perms)
                .map_err(|e| KeyError::Io(private_path.to_path_buf(), e))?;
        }

        tracing::info!(dir = %private_path.display(), "generated fresh RSA keypair");

        Ok(Self {
            private_key,
            public_key,
        })
    }

    pub fn private_key_pem(&self) -> Result<String, KeyError> {
        self.private_key
            .to_pkcs1_pem(rsa::pkcs1::LineEnding::LF)
            .map(|z| z.to_string())
            .map_err(|e| KeyError::Generate(e.to_string()))
    }

    pub fn jwks(&self) -> Jwks {
        Jwks {
            keys: vec![Jwk {
                kty: "RSA",
                use_: "sig",
                alg: "RS256",
                kid: KID,
                n: int_to_base64url(&self.public_key.n().to_bytes_be()),
                e: int_to_base64url(&self.public_key.e().to_bytes_be()),
            }],
        }
    }
}

fn int_to_base64url(be_bytes: &[u8]) -> String {
    let trimmed: &[u8] = {
        let mut idx = 0;
        while idx < be_bytes.len() - 1 && be_bytes[idx] == 0 {
            idx += 1;
        }
        &be_bytes[idx..]
    };
    URL_SAFE_NO_PAD.encode(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
    use serde::{Deserialize, Serialize};

    fn generate_in(dir: &Path) -> KeyManager {
        KeyManager::generate_and_persist(&dir.join("private.pem"), &dir.join("public.pem"))
            .expect("keygen")
    }

    #[derive(Serialize, Deserialize)]
    struct Claims {
        sub: String,
        exp: usize,
    }

    #[test]
    fn generated_key_round_trips_through_jwks() {
        let tmp = std::env::temp_dir().join(format!("ns-auth-test-keys-{}", uuid::Uuid::new_v4()));
        let mgr = generate_in(&tmp);

        let jwks = mgr.jwks();
        assert_eq!(jwks.keys.len(), 1);
        assert_eq!(jwks.keys[0].kid, "oauth-provider-key-1");

        let priv_pem = mgr.private_key_pem().unwrap();
        let mut header = Header::new(Algorithm::RS256);
        header.kid = Some(KID.to_string());
        let token = encode(
            &header,
            &Claims {
                sub: "user-1".into(),
                exp: (chrono::Utc::now().timestamp() + 3600) as usize,
            },
            &EncodingKey::from_rsa_pem(priv_pem.as_bytes()).unwrap(),
        )
        .unwrap();

        let n = URL_SAFE_NO_PAD.decode(&jwks.keys[0].n).unwrap();
        let e = URL_SAFE_NO_PAD.decode(&jwks.keys[0].e).unwrap();
        let decoding_key = DecodingKey::from_rsa_raw_components(&n, &e);
        let mut validation = Validation::new(Algorithm::RS256);
        validation.validate_exp = true;
        let decoded = decode::<Claims>(&token, &decoding_key, &validation).unwrap();
        assert_eq!(decoded.claims.sub, "user-1");

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn fixed_kid_is_stable() {
        assert_eq!(KeyManager::kid(), "oauth-provider-key-1");
    }
}
