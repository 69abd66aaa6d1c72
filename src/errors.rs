//! Error types for the KERI library

use thiserror::Error;

/// Error types for the KERI library
#[derive(Error, Debug)]
pub enum Error {
    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("parsing error: {0}")]
    Parsing(String),

    #[error("crypto error: {0}")]
    Crypto(String),

    #[error("general error: {0}")]
    Other(String),
}

/// Result type for KERI operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the Coder/Matter layer (derivation-code tables,
/// qb64/qb2 framing, and the primitives built on top of it).
///
/// Corresponds to the error kinds named in the material-coding taxonomy:
/// `InvalidCode`/`UnsupportedCodeError` (invalid or unknown derivation code),
/// `InvalidKeyLength`/`InvalidSignatureLength` (raw size disagrees with what
/// the code declares), `Shortage`/`ShortageError` (truncated material,
/// recoverable by feeding more bytes), `EmptyMaterial`/`EmptyMaterialError`
/// (constructed with neither raw nor qb64/qb2).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MatterError {
    #[error("empty material: {0}")]
    EmptyMaterial(String),
    #[error("empty material: {0}")]
    EmptyMaterialError(String),

    #[error("invalid derivation code: {0}")]
    InvalidCode(String),

    #[error("unsupported derivation code: {0}")]
    UnsupportedCodeError(String),

    #[error("invalid code size: {0}")]
    InvalidCodeSize(String),
    #[error("invalid code size: {0}")]
    InvalidCodeSizeError(String),

    #[error("invalid soft part: {0}")]
    InvalidSoft(String),
    #[error("invalid soft part: {0}")]
    InvalidSoftError(String),

    #[error("invalid variable-sized index: {0}")]
    InvalidVarIndex(String),
    #[error("invalid variable-sized index: {0}")]
    InvalidVarIndexError(String),

    #[error("invalid variable raw size: {0}")]
    InvalidVarRawSize(String),

    #[error("raw material error: {0}")]
    RawMaterial(String),
    #[error("raw material error: {0}")]
    RawMaterialError(String),

    #[error("soft material error: {0}")]
    SoftMaterial(String),
    #[error("soft material error: {0}")]
    SoftMaterialError(String),

    #[error("material is short: {0}")]
    Shortage(String),
    #[error("material is short: {0}")]
    ShortageError(String),

    #[error("need more data: {0}")]
    NeedMoreDataError(String),

    #[error("cold start error: {0}")]
    ColdStartError(String),

    #[error("unexpected derivation code: {0}")]
    UnexpectedCode(String),
    #[error("unexpected derivation code: {0}")]
    UnexpectedCodeError(String),

    #[error("unexpected count code: {0}")]
    UnexpectedCountCode(String),
    #[error("unexpected count code: {0}")]
    UnexpectedCountCodeError(String),

    #[error("unexpected operation code: {0}")]
    UnexpectedOpCode(String),
    #[error("unexpected operation code: {0}")]
    UnexpectedOpCodeError(String),

    #[error("conversion error: {0}")]
    Conversion(String),
    #[error("conversion error: {0}")]
    ConversionError(String),

    #[error("encoding error: {0}")]
    EncodingError(String),

    #[error("invalid base64")]
    InvalidBase64,

    #[error("invalid base64 sextet at index {0}")]
    InvalidBase64Index(usize),

    #[error("invalid format")]
    InvalidFormat,

    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("invalid signature length: expected {expected}, got {actual}")]
    InvalidSignatureLength { expected: usize, actual: usize },

    #[error("verification error: {0}")]
    VerificationError(String),

    #[error("secp256k1 error: {0}")]
    Secp256k1Error(String),

    #[error("secp256r1 error: {0}")]
    Secp256r1Error(String),

    #[error("cryptographic error: {0}")]
    CryptoError(String),

    #[error("type error: {0}")]
    TypeError(String),

    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("value error: {0}")]
    ValueError(String),
}

/// Result type for Matter/Coder operations
pub type MatterResult<T> = std::result::Result<T, MatterError>;
