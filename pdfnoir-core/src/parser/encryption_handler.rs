//! Encryption detection
//!
//! Recoloring never needs to read decrypted content: text and fonts pass
//! through untouched, and only content-stream color operators are rewritten.
//! Encrypted input is therefore rejected up front rather than partially
//! supported.

use super::objects::PdfDictionary;

/// Returns true if the trailer dictionary declares an `/Encrypt` entry.
pub fn detect_encryption(trailer_dict: &PdfDictionary) -> bool {
    trailer_dict.get("Encrypt").is_some()
}
