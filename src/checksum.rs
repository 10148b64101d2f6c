//! Adblock Plus checksum header validation.
//!
//! List files may carry a `! Checksum: <digest>` header declaring an MD5
//! digest (base64, unpadded) of the canonicalized body. The digest
//! algorithm is fixed to MD5 - the Adblock Plus convention that real-world
//! lists stamp their headers with. A declared value that cannot be an MD5
//! digest at all is reported as unverifiable rather than silently accepted.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use md5::{Digest, Md5};
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, warn};

use crate::error::PipelineError;

/// Matches the checksum header line, case-insensitively, capturing the
/// declared digest.
static CHECKSUM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?mi)^[ \t]*![ \t]*checksum[ \t:-]+([A-Za-z0-9+/=]+).*\n?")
        .expect("checksum regex is valid")
});

/// Length of an unpadded base64 MD5 digest: 16 bytes encode to 22 chars.
const MD5_B64_LEN: usize = 22;

/// Validate the checksum header of `content`, if one is present.
///
/// Returns `Ok(true)` when a checksum was present and matched, `Ok(false)`
/// when no checksum header exists (checksum is optional, the content is
/// treated as unchecked). A mismatching or unverifiable declared value is
/// a hard failure for this source only.
pub fn validate(content: &str, name: &str) -> Result<bool, PipelineError> {
    let Some(caps) = CHECKSUM_RE.captures(content) else {
        debug!("No checksum header in {name}, treating as unchecked");
        return Ok(false);
    };

    let declared = caps
        .get(1)
        .map(|m| m.as_str().trim_end_matches('='))
        .unwrap_or_default()
        .to_string();

    if declared.len() != MD5_B64_LEN {
        warn!("Declared checksum in {name} cannot be an MD5 digest: {declared:?}");
        return Err(PipelineError::UnverifiableChecksum {
            name: name.to_string(),
            declared,
        });
    }

    // Strip exactly the matched header line; everything else is the body.
    let header = caps.get(0).expect("capture 0 always present");
    let mut body = String::with_capacity(content.len());
    body.push_str(&content[..header.start()]);
    body.push_str(&content[header.end()..]);

    let computed = compute(&body);
    if computed == declared {
        debug!("Checksum valid for {name}");
        Ok(true)
    } else {
        Err(PipelineError::Integrity {
            name: name.to_string(),
            declared,
            computed,
        })
    }
}

/// Compute the checksum of a body (content without its checksum header):
/// MD5 of the canonical form, base64-encoded without padding.
pub fn compute(body: &str) -> String {
    let digest = Md5::digest(canonicalize(body).as_bytes());
    let encoded = STANDARD.encode(digest);
    encoded.trim_end_matches('=').to_string()
}

/// Canonical body form per the Adblock Plus checksum rules: carriage
/// returns removed, exactly one trailing newline.
fn canonicalize(body: &str) -> String {
    let mut s = body.replace('\r', "");
    while s.ends_with('\n') {
        s.pop();
    }
    s.push('\n');
    s
}
