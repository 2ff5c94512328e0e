// Webhook ingestion: signature checks, hook classification, decoding and processing

pub mod hook;
pub mod mapper;
pub mod processor;
pub mod signature;

pub use hook::{ClassificationError, Hook, HookBase, HookType, classify};
pub use mapper::{DecodeError, decode_and_map};
pub use processor::{EventProcessor, ProcessingError};
pub use signature::{
    DEFAULT_TOLERANCE, SIGNATURE_HEADER, SignatureContext, VerificationError, sign_payload,
    verify_signature,
};
