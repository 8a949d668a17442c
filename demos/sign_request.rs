// demos/sign_request.rs

use chrono::Utc;
use p256::ecdsa::{signature::Verifier, Signature};
use secrecy::Secret;
use sigv4a_sign::{date_stamp, Signer, SigningConfig, ALGORITHM};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("SigV4a Signing Example");

    // 1. Setup signer (in a real client the secret comes from a credential provider)
    let mut config = SigningConfig::new(
        Secret::new("wJalrXUtnFEMI/K7MDENG/bPxRfiCYEXAMPLEKEY".to_string()),
        "s3",
    );
    config.region_set = "us-east-1,us-west-2".to_string();
    let signer = Signer::new(config);

    // 2. Build a string to sign (normally produced by the HTTP auth layer)
    let now = Utc::now();
    let date = date_stamp(now);
    let ctx = signer.context(&date)?;
    let string_to_sign = format!(
        "{}\n{}\n{}\n{}",
        ALGORITHM,
        now.format("%Y%m%dT%H%M%SZ"),
        ctx.credential_scope(),
        "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
    );
    println!("String to sign:\n{}", string_to_sign);

    // 3. Sign
    let signature = signer.sign_hex(&date, string_to_sign.as_bytes())?;
    println!("\nSignature: {}", signature);

    // 4. Check the signature against the derived public key
    let key_pair = signer.key_pair(&date)?;
    let der = hex::decode(&signature)?;
    let parsed = Signature::from_der(&der)?;
    match key_pair.verifying_key().verify(string_to_sign.as_bytes(), &parsed) {
        Ok(()) => println!("Signature verifies under the derived public key"),
        Err(e) => println!("Verification failed: {}", e),
    }

    Ok(())
}
