//! Command-line driver: key generation, file encryption, file decryption.

use std::env;
use std::fs;
use std::process;

use ggh::serialize::{
    format_ciphertext, format_private_key, format_public_key, parse_ciphertext,
    parse_private_key, parse_public_key,
};
use ggh::{
    generate_keypair, BasisOptions, DecodingStrategy, Decryptor, Encryptor, GghError,
    Perturbation, Result,
};

const USAGE: &str = "Usage:
  ggh gen-keys <dim> <publicKeyFile> <secretKeyFile>
  ggh encrypt  <publicKeyFile> <plainTextFile> <cipherTextFile> [--perturb]
  ggh decrypt  <secretKeyFile> <cipherTextFile> <decipherTextFile> [--rounding]";

fn main() {
    let args: Vec<String> = env::args().skip(1).collect();
    match run(&args) {
        Ok(()) => {}
        Err(e) => {
            eprintln!("ggh: {e}");
            process::exit(1);
        }
    }
}

fn usage() -> GghError {
    eprintln!("{USAGE}");
    GghError::Parse("missing or invalid arguments".into())
}

fn run(args: &[String]) -> Result<()> {
    match args.first().map(String::as_str) {
        Some("gen-keys") => gen_keys(&args[1..]),
        Some("encrypt") => encrypt(&args[1..]),
        Some("decrypt") => decrypt(&args[1..]),
        _ => Err(usage()),
    }
}

fn gen_keys(args: &[String]) -> Result<()> {
    let [dim, public_path, secret_path] = args else {
        return Err(usage());
    };
    let dim: usize = dim
        .parse()
        .map_err(|_| GghError::Parse(format!("invalid dimension `{dim}`")))?;

    let mut rng = rand::thread_rng();
    let (public, private) = generate_keypair(dim, &BasisOptions::default(), &mut rng)?;

    println!("Writing GGH public key to {public_path} ...");
    fs::write(public_path, format_public_key(&public))?;
    println!("Writing GGH secret key to {secret_path} ...");
    fs::write(secret_path, format_private_key(&private))?;
    Ok(())
}

fn encrypt(args: &[String]) -> Result<()> {
    let (paths, perturb) = split_flag(args, "--perturb");
    let [key_path, plain_path, cipher_path] = paths.as_slice() else {
        return Err(usage());
    };

    let public = parse_public_key(&fs::read_to_string(key_path)?)?;
    let plain = fs::read(plain_path)?;

    let perturbation = if perturb {
        Perturbation::Ternary
    } else {
        Perturbation::Disabled
    };
    let encryptor = Encryptor::new(public, perturbation);
    let mut rng = rand::thread_rng();
    let units = encryptor.encrypt_bytes(&plain, &mut rng)?;

    fs::write(cipher_path, format_ciphertext(&units))?;
    Ok(())
}

fn decrypt(args: &[String]) -> Result<()> {
    let (paths, rounding) = split_flag(args, "--rounding");
    let [key_path, cipher_path, plain_path] = paths.as_slice() else {
        return Err(usage());
    };

    let private = parse_private_key(&fs::read_to_string(key_path)?)?;
    let units = parse_ciphertext(&fs::read_to_string(cipher_path)?, private.dim())?;

    let strategy = if rounding {
        DecodingStrategy::Rounding
    } else {
        DecodingStrategy::NearestPlane
    };
    let decryptor = Decryptor::new(private, strategy);
    let plain = decryptor.decrypt_bytes(&units)?;

    fs::write(plain_path, plain)?;
    Ok(())
}

fn split_flag(args: &[String], flag: &str) -> (Vec<String>, bool) {
    let mut found = false;
    let rest = args
        .iter()
        .filter(|a| {
            if a.as_str() == flag {
                found = true;
                false
            } else {
                true
            }
        })
        .cloned()
        .collect();
    (rest, found)
}
