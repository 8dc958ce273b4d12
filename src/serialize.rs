//! Textual key and ciphertext formats.
//!
//! Vectors are bracket-delimited, space-separated radix-10 integers
//! (`[390 390 390]`); matrices are bracketed row lists with one row per
//! line. Key files start with the dimension on its own line: the public key
//! file carries the public basis, the secret key file the private basis
//! followed by the unimodular mask. A ciphertext stream is one vector per
//! plaintext unit, read until exhausted.
//!
//! Parsing is strict: a malformed file never yields a partial key.

use std::fmt::Write as _;
use std::str::FromStr;

use num_bigint::BigInt;
use num_traits::ToPrimitive;

use crate::error::{GghError, Result};
use crate::keygen::{PrivateKey, PublicKey};
use crate::matrix::Matrix;

pub fn format_vector(v: &[BigInt]) -> String {
    let mut out = String::from("[");
    for (i, e) in v.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        let _ = write!(out, "{e}");
    }
    out.push(']');
    out
}

pub fn format_matrix(m: &Matrix) -> String {
    let mut out = String::from("[");
    for i in 0..m.rows() {
        out.push_str(&format_vector(m.row(i)));
        out.push('\n');
    }
    out.push(']');
    out
}

pub fn format_public_key(key: &PublicKey) -> String {
    format!("{}\n{}\n", key.dim(), format_matrix(key.basis()))
}

pub fn format_private_key(key: &PrivateKey) -> String {
    format!(
        "{}\n{}\n{}\n",
        key.dim(),
        format_matrix(key.basis()),
        format_matrix(key.mask())
    )
}

pub fn format_ciphertext(units: &[Vec<BigInt>]) -> String {
    let mut out = String::new();
    for unit in units {
        out.push_str(&format_vector(unit));
        out.push('\n');
    }
    out
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Token {
    Open,
    Close,
    Int(BigInt),
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Open => f.write_str("`[`"),
            Token::Close => f.write_str("`]`"),
            Token::Int(v) => write!(f, "`{v}`"),
        }
    }
}

fn lex(input: &str) -> Result<Vec<(Token, usize)>> {
    let mut tokens = Vec::new();
    let mut line = 1;
    let mut chars = input.chars().peekable();
    while let Some(&c) = chars.peek() {
        match c {
            '\n' => {
                line += 1;
                chars.next();
            }
            c if c.is_whitespace() => {
                chars.next();
            }
            '[' => {
                tokens.push((Token::Open, line));
                chars.next();
            }
            ']' => {
                tokens.push((Token::Close, line));
                chars.next();
            }
            '-' | '0'..='9' => {
                let mut lit = String::new();
                while let Some(&c) = chars.peek() {
                    if c == '-' || c.is_ascii_digit() {
                        lit.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let value = BigInt::from_str(&lit).map_err(|_| {
                    GghError::Parse(format!("line {line}: invalid integer `{lit}`"))
                })?;
                tokens.push((Token::Int(value), line));
            }
            other => {
                return Err(GghError::Parse(format!(
                    "line {line}: unexpected character `{other}`"
                )));
            }
        }
    }
    Ok(tokens)
}

/// Upper bound on the dimension a key file may declare. The file is
/// untrusted input; the bound keeps a hostile header from driving huge
/// allocations before the body is ever checked.
const MAX_DIMENSION: usize = 4096;

struct Parser {
    tokens: Vec<(Token, usize)>,
    pos: usize,
}

impl Parser {
    fn new(input: &str) -> Result<Self> {
        Ok(Self {
            tokens: lex(input)?,
            pos: 0,
        })
    }

    fn peek(&self) -> Option<&(Token, usize)> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self, what: &str) -> Result<(Token, usize)> {
        let item = self
            .tokens
            .get(self.pos)
            .cloned()
            .ok_or_else(|| GghError::Parse(format!("unexpected end of input: expected {what}")))?;
        self.pos += 1;
        Ok(item)
    }

    fn expect(&mut self, token: Token, what: &str) -> Result<()> {
        let (found, line) = self.next(what)?;
        if found != token {
            return Err(GghError::Parse(format!(
                "line {line}: expected {what}, found {found}"
            )));
        }
        Ok(())
    }

    fn integer(&mut self, what: &str) -> Result<BigInt> {
        match self.next(what)? {
            (Token::Int(v), _) => Ok(v),
            (found, line) => Err(GghError::Parse(format!(
                "line {line}: expected {what}, found {found}"
            ))),
        }
    }

    fn dimension(&mut self) -> Result<usize> {
        let value = self.integer("the dimension")?;
        value
            .to_usize()
            .filter(|&d| d > 0 && d <= MAX_DIMENSION)
            .ok_or_else(|| {
                GghError::Parse(format!(
                    "invalid dimension `{value}` (expected 1..={MAX_DIMENSION})"
                ))
            })
    }

    fn vector(&mut self, len: usize, what: &str) -> Result<Vec<BigInt>> {
        self.expect(Token::Open, &format!("`[` opening {what}"))?;
        let mut out = Vec::with_capacity(len);
        loop {
            match self.next(&format!("an entry of {what}"))? {
                (Token::Int(v), _) => out.push(v),
                (Token::Close, line) => {
                    if out.len() != len {
                        return Err(GghError::Parse(format!(
                            "line {line}: {what} has {} entries, expected {len}",
                            out.len()
                        )));
                    }
                    return Ok(out);
                }
                (found, line) => {
                    return Err(GghError::Parse(format!(
                        "line {line}: expected an entry of {what}, found {found}"
                    )));
                }
            }
        }
    }

    fn matrix(&mut self, dim: usize, what: &str) -> Result<Matrix> {
        self.expect(Token::Open, &format!("`[` opening {what}"))?;
        let mut rows = Vec::with_capacity(dim);
        for i in 0..dim {
            rows.push(self.vector(dim, &format!("row {i} of {what}"))?);
        }
        match self.next(&format!("`]` closing {what}"))? {
            (Token::Close, _) => Matrix::from_rows(rows),
            (found, line) => Err(GghError::Parse(format!(
                "line {line}: {what} has more than {dim} rows (found {found})"
            ))),
        }
    }

    fn finish(&self, what: &str) -> Result<()> {
        if let Some((found, line)) = self.peek() {
            return Err(GghError::Parse(format!(
                "line {line}: trailing {found} after {what}"
            )));
        }
        Ok(())
    }
}

pub fn parse_public_key(input: &str) -> Result<PublicKey> {
    let mut p = Parser::new(input)?;
    let dim = p.dimension()?;
    let basis = p.matrix(dim, "the public basis")?;
    p.finish("the public key")?;
    PublicKey::new(dim, basis)
}

pub fn parse_private_key(input: &str) -> Result<PrivateKey> {
    let mut p = Parser::new(input)?;
    let dim = p.dimension()?;
    let basis = p.matrix(dim, "the private basis")?;
    let mask = p.matrix(dim, "the unimodular mask")?;
    p.finish("the secret key")?;
    PrivateKey::new(dim, basis, mask)
}

/// Parses a ciphertext stream: length-`dim` vectors until the input is
/// exhausted.
pub fn parse_ciphertext(input: &str, dim: usize) -> Result<Vec<Vec<BigInt>>> {
    let mut p = Parser::new(input)?;
    let mut units = Vec::new();
    while p.peek().is_some() {
        units.push(p.vector(dim, &format!("ciphertext unit {}", units.len()))?);
    }
    Ok(units)
}
