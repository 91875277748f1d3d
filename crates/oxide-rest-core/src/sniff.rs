//! Binary content negotiation by magic-number sniffing.

use crate::response::{ResponseDescriptor, OCTET_STREAM};

/// Number of leading bytes inspected.
pub const SNIFF_LEN: usize = 64;

/// A file signature: `magic` at `offset`, after an optional container
/// `prefix` at offset zero.
struct Signature {
    prefix: &'static [u8],
    offset: usize,
    magic: &'static [u8],
    mime: &'static str,
}

const fn at(offset: usize, magic: &'static [u8], mime: &'static str) -> Signature {
    Signature {
        prefix: b"",
        offset,
        magic,
        mime,
    }
}

/// A RIFF container identified by its form type.
const fn riff(form: &'static [u8], mime: &'static str) -> Signature {
    Signature {
        prefix: b"RIFF",
        offset: 8,
        magic: form,
        mime,
    }
}

// More specific signatures come first where prefixes overlap.
static SIGNATURES: &[Signature] = &[
    // images
    at(0, b"GIF87a", "image/gif"),
    at(0, b"GIF89a", "image/gif"),
    at(0, b"\x89PNG\r\n\x1a\n", "image/png"),
    at(0, b"\xFF\xD8\xFF", "image/jpeg"),
    riff(b"WEBP", "image/webp"),
    at(0, b"BM", "image/bmp"),
    at(0, b"\x00\x00\x01\x00", "image/x-icon"),
    at(0, b"II*\x00", "image/tiff"),
    at(0, b"MM\x00*", "image/tiff"),
    at(0, b"8BPS", "image/vnd.adobe.photoshop"),
    // documents and archives
    at(0, b"%PDF-", "application/pdf"),
    at(0, b"PK\x03\x04", "application/zip"),
    at(0, b"PK\x05\x06", "application/zip"),
    at(0, b"PK\x07\x08", "application/zip"),
    at(0, b"\x1F\x8B\x08", "application/gzip"),
    at(0, b"BZh", "application/x-bzip2"),
    at(0, b"\xFD7zXZ\x00", "application/x-xz"),
    at(0, b"7z\xBC\xAF\x27\x1C", "application/x-7z-compressed"),
    at(0, b"Rar!\x1A\x07", "application/x-rar-compressed"),
    // audio
    at(0, b"ID3", "audio/mpeg"),
    at(0, b"\xFF\xFB", "audio/mpeg"),
    at(0, b"\xFF\xF3", "audio/mpeg"),
    at(0, b"\xFF\xF2", "audio/mpeg"),
    at(0, b"OggS", "audio/ogg"),
    at(0, b"fLaC", "audio/x-flac"),
    riff(b"WAVE", "audio/vnd.wave"),
    // video
    at(4, b"ftypqt  ", "video/quicktime"),
    at(4, b"ftyp", "video/mp4"),
    at(0, b"\x1A\x45\xDF\xA3", "video/x-matroska"),
    // other
    at(0, b"\x00asm", "application/wasm"),
    at(0, b"SQLite format 3\x00", "application/x-sqlite3"),
    at(0, b"wOFF", "font/woff"),
    at(0, b"wOF2", "font/woff2"),
    at(0, b"OTTO", "font/otf"),
    at(0, b"\x00\x01\x00\x00\x00", "font/ttf"),
    at(0, b"\x7FELF", "application/x-elf"),
    at(0, b"MZ", "application/x-msdownload"),
];

impl Signature {
    fn matches(&self, head: &[u8]) -> bool {
        head.starts_with(self.prefix)
            && head
                .get(self.offset..self.offset + self.magic.len())
                .is_some_and(|window| window == self.magic)
    }
}

/// Returns the MIME type of `bytes`, if a known signature matches.
#[must_use]
pub fn sniff(bytes: &[u8]) -> Option<&'static str> {
    let head = &bytes[..bytes.len().min(SNIFF_LEN)];
    let mime = SIGNATURES.iter().find(|s| s.matches(head))?.mime;
    // Matroska and WebM share a magic number; the doctype tells them apart.
    if mime == "video/x-matroska" && head.windows(4).any(|w| w == b"webm") {
        return Some("video/webm");
    }
    Some(mime)
}

/// Returns the MIME type of `bytes`, falling back to
/// `application/octet-stream`.
#[must_use]
pub fn content_type(bytes: &[u8]) -> &'static str {
    sniff(bytes).unwrap_or(OCTET_STREAM)
}

/// Wraps raw column bytes in a response typed by their content.
#[must_use]
pub fn negotiate(bytes: Vec<u8>) -> ResponseDescriptor {
    let content_type = content_type(&bytes);
    ResponseDescriptor::bytes(content_type, bytes)
}
