use std::io::{self, Read};

/// Gzip magic bytes (RFC 1952).
const GZIP_MAGIC: [u8; 2] = [0x1F, 0x8B];

pub fn is_gzip(data: &[u8]) -> bool {
    matches!(data, [0x1F, 0x8B, ..])
}

/// Peek at the first bytes of a reader. Short or empty input is not gzip.
pub fn detect_gzip<R: Read>(reader: &mut R) -> io::Result<bool> {
    let mut header = [0u8; GZIP_MAGIC.len()];
    let mut filled = 0;
    while filled < header.len() {
        match reader.read(&mut header[filled..]) {
            Ok(0) => return Ok(false),
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(is_gzip(&header))
}
