// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Test keystores, generated on demand so no binary key material is checked in.
//
// Compiled for this crate's own tests and, behind the `fixtures` feature, for
// other crates' tests. Panics on failure: this is test support code.
//
// RSA key pairs are expensive to generate, so each is created once per process
// and shared. Keystores are cheap and built fresh for every call, in the
// format `openssl pkcs12 -export` writes by default: PBES2 with AES-256-CBC
// and a SHA-256 MAC.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::OnceLock;
use std::time::Duration;

use der::Encode;
use p12_keystore::{EncryptionAlgorithm, KeyStore, KeyStoreEntry, MacAlgorithm, PrivateKeyChain};
use ring::rand::SystemRandom;
use ring::signature::{ECDSA_P256_SHA256_ASN1_SIGNING, EcdsaKeyPair};
use rsa::pkcs8::EncodePrivateKey;
use rsa::{RsaPrivateKey, pkcs1v15};
use sha2::Sha256;
use x509_cert::Certificate;
use x509_cert::builder::{Builder, CertificateBuilder, Profile};
use x509_cert::name::Name;
use x509_cert::serial_number::SerialNumber;
use x509_cert::spki::SubjectPublicKeyInfoOwned;
use x509_cert::time::Validity;

/// Common name of the generated signer certificate.
pub const SUBJECT_CN: &str = "Docseal Test Signer";

/// Serial number of the generated signer certificate.
pub const SERIAL: u32 = 42;

/// Common name of the unrelated certificate used for chains and mismatches.
pub const CA_CN: &str = "Docseal Test CA";

const CA_SERIAL: u32 = 7;
const RSA_BITS: usize = 1024;
const FRIENDLY_NAME: &str = "docseal";
const LOCAL_KEY_ID: &[u8] = b"docseal-signer";

struct RsaMaterial {
    key: RsaPrivateKey,
    certificate: Certificate,
}

fn rsa_material() -> &'static RsaMaterial {
    static MATERIAL: OnceLock<RsaMaterial> = OnceLock::new();
    MATERIAL.get_or_init(|| RsaMaterial::generate(SUBJECT_CN, SERIAL))
}

fn ca_material() -> &'static RsaMaterial {
    static MATERIAL: OnceLock<RsaMaterial> = OnceLock::new();
    MATERIAL.get_or_init(|| RsaMaterial::generate(CA_CN, CA_SERIAL))
}

impl RsaMaterial {
    fn generate(common_name: &str, serial: u32) -> Self {
        let key = RsaPrivateKey::new(&mut rand::thread_rng(), RSA_BITS)
            .expect("RSA key generation failed");
        let certificate = self_signed(&key, common_name, serial);
        Self { key, certificate }
    }

    fn key_der(&self) -> Vec<u8> {
        self.key
            .to_pkcs8_der()
            .expect("PKCS#8 encoding failed")
            .as_bytes()
            .to_vec()
    }
}

/// Self-signed certificate for `key`, valid for a year from now.
fn self_signed(key: &RsaPrivateKey, common_name: &str, serial: u32) -> Certificate {
    let signer = pkcs1v15::SigningKey::<Sha256>::new(key.clone());
    let spki = SubjectPublicKeyInfoOwned::from_key(key.to_public_key())
        .expect("public key encoding failed");
    let subject = Name::from_str(&format!("CN={common_name},O=Docseal")).expect("subject name");
    let validity = Validity::from_now(Duration::from_secs(365 * 24 * 60 * 60)).expect("validity");

    CertificateBuilder::new(
        Profile::Root,
        SerialNumber::from(serial),
        validity,
        subject,
        spki,
        &signer,
    )
    .expect("certificate builder")
    .build::<pkcs1v15::Signature>()
    .expect("certificate signing failed")
}

/// Pack one private key and its certificate chain, leaf first.
fn pack(key_der: &[u8], chain: &[&Certificate], passphrase: &str) -> Vec<u8> {
    let chain: Vec<p12_keystore::Certificate> = chain
        .iter()
        .map(|cert| {
            let der = cert.to_der().expect("certificate encoding failed");
            p12_keystore::Certificate::from_der(&der).expect("certificate rejected")
        })
        .collect();

    let mut store = KeyStore::new();
    store.add_entry(
        FRIENDLY_NAME,
        KeyStoreEntry::PrivateKeyChain(PrivateKeyChain::new(key_der, LOCAL_KEY_ID, chain)),
    );
    store
        .writer(passphrase)
        .encryption_algorithm(EncryptionAlgorithm::PbeWithHmacSha256AndAes256)
        .mac_algorithm(MacAlgorithm::HmacSha256)
        .write()
        .expect("PKCS#12 assembly failed")
}

/// The certificate embedded in every RSA keystore from this module.
pub fn rsa_certificate() -> &'static Certificate {
    &rsa_material().certificate
}

/// The DER-encoded PKCS#8 form of the shared RSA key.
pub fn rsa_key_der() -> Vec<u8> {
    rsa_material().key_der()
}

/// A PKCS#12 container with the shared RSA key and its certificate.
pub fn rsa_keystore(passphrase: &str) -> Vec<u8> {
    pack(&rsa_key_der(), &[rsa_certificate()], passphrase)
}

/// The RSA keystore with an unrelated certificate appended to the chain.
pub fn chained_rsa_keystore(passphrase: &str) -> Vec<u8> {
    pack(
        &rsa_key_der(),
        &[rsa_certificate(), &ca_material().certificate],
        passphrase,
    )
}

/// The shared RSA key packed with a certificate for a different key.
pub fn mismatched_rsa_keystore(passphrase: &str) -> Vec<u8> {
    pack(&rsa_key_der(), &[&ca_material().certificate], passphrase)
}

/// Certificate for a key other than the shared RSA key.
pub fn unrelated_certificate() -> &'static Certificate {
    &ca_material().certificate
}

/// A PKCS#12 container whose private key is ECDSA P-256.
///
/// The certificate is the RSA one; the mismatch does not matter because the
/// key type is rejected before the certificate is used.
pub fn ecdsa_keystore(passphrase: &str) -> Vec<u8> {
    let rng = SystemRandom::new();
    let pkcs8 = EcdsaKeyPair::generate_pkcs8(&ECDSA_P256_SHA256_ASN1_SIGNING, &rng)
        .expect("ECDSA key generation failed");
    pack(pkcs8.as_ref(), &[rsa_certificate()], passphrase)
}

/// Write an RSA keystore to `dir/cert.p12` and return its path.
pub fn write_rsa_keystore(dir: &Path, passphrase: &str) -> PathBuf {
    let path = dir.join("cert.p12");
    std::fs::write(&path, rsa_keystore(passphrase)).expect("keystore write failed");
    path
}

/// Write an ECDSA keystore to `dir/ecdsa.p12` and return its path.
pub fn write_ecdsa_keystore(dir: &Path, passphrase: &str) -> PathBuf {
    let path = dir.join("ecdsa.p12");
    std::fs::write(&path, ecdsa_keystore(passphrase)).expect("keystore write failed");
    path
}
