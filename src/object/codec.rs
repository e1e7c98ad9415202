use std::io::{Read, Write};
use std::path::PathBuf;

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;

use crate::error::{Error, Result};
use crate::hash::ObjectId;
use crate::object::{Object, ObjectKind};
use crate::types::{EntryMode, Tree, TreeEntry};

/// build the canonical frame for a payload: `kind SP length NUL payload`
pub fn encode_frame(kind: ObjectKind, payload: &[u8]) -> Vec<u8> {
    let header = format!("{} {}", kind.as_str(), payload.len());
    let mut frame = Vec::with_capacity(header.len() + 1 + payload.len());
    frame.extend_from_slice(header.as_bytes());
    frame.push(0);
    frame.extend_from_slice(payload);
    frame
}

/// split a frame back into its kind and payload, validating the declared length
pub fn decode_frame(frame: &[u8]) -> Result<(ObjectKind, &[u8])> {
    let nul = frame
        .iter()
        .position(|&b| b == 0)
        .ok_or_else(|| Error::Format("frame header missing NUL terminator".to_string()))?;
    let header = std::str::from_utf8(&frame[..nul])
        .map_err(|_| Error::Format("frame header is not utf-8".to_string()))?;
    let (kind, length) = header
        .split_once(' ')
        .ok_or_else(|| Error::Format(format!("malformed frame header: {}", header)))?;

    let kind: ObjectKind = kind.parse()?;
    let length: usize = length
        .parse()
        .map_err(|_| Error::Format(format!("bad length in frame header: {}", header)))?;

    let payload = &frame[nul + 1..];
    if payload.len() != length {
        return Err(Error::Format(format!(
            "declared length {} does not match payload length {}",
            length,
            payload.len()
        )));
    }

    Ok((kind, payload))
}

/// deflate a frame for storage (zlib header included, maximum compression)
pub fn compress(frame: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(frame).map_err(zlib_err)?;
    encoder.finish().map_err(zlib_err)
}

/// inflate stored bytes back into a frame
pub fn decompress(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = ZlibDecoder::new(bytes);
    let mut frame = Vec::new();
    decoder.read_to_end(&mut frame).map_err(zlib_err)?;
    Ok(frame)
}

fn zlib_err(e: std::io::Error) -> Error {
    Error::Io {
        path: PathBuf::from("<zlib>"),
        source: e,
    }
}

/// encode an object's payload bytes
pub fn encode_payload(object: &Object) -> std::borrow::Cow<'_, [u8]> {
    match object {
        Object::Blob(content) => std::borrow::Cow::Borrowed(content),
        Object::Tree(tree) => std::borrow::Cow::Owned(encode_tree(tree)),
    }
}

/// decode a payload under a known kind
pub fn decode_payload(kind: ObjectKind, payload: &[u8]) -> Result<Object> {
    match kind {
        ObjectKind::Blob => Ok(Object::Blob(payload.to_vec())),
        ObjectKind::Tree => Ok(Object::Tree(decode_tree(payload)?)),
    }
}

/// canonical tree payload: per entry `octal-mode SP name NUL raw-20-byte-hash`,
/// entries already in canonical order inside the `Tree`
fn encode_tree(tree: &Tree) -> Vec<u8> {
    let mut out = Vec::new();
    for entry in tree.entries() {
        out.extend_from_slice(entry.mode.as_octal().as_bytes());
        out.push(b' ');
        out.extend_from_slice(entry.name.as_bytes());
        out.push(0);
        out.extend_from_slice(entry.hash.as_bytes());
    }
    out
}

fn decode_tree(mut payload: &[u8]) -> Result<Tree> {
    let mut entries = Vec::new();
    while !payload.is_empty() {
        let sp = payload
            .iter()
            .position(|&b| b == b' ')
            .ok_or_else(|| Error::Format("tree entry missing mode terminator".to_string()))?;
        let mode = std::str::from_utf8(&payload[..sp])
            .map_err(|_| Error::Format("tree entry mode is not utf-8".to_string()))?;
        let mode = EntryMode::from_octal(mode)?;

        let rest = &payload[sp + 1..];
        let nul = rest
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| Error::Format("tree entry missing name terminator".to_string()))?;
        let name = std::str::from_utf8(&rest[..nul])
            .map_err(|_| Error::Format("tree entry name is not utf-8".to_string()))?
            .to_string();

        let after = &rest[nul + 1..];
        if after.len() < 20 {
            return Err(Error::Format(format!(
                "truncated hash in tree entry: {}",
                name
            )));
        }
        let mut raw = [0u8; 20];
        raw.copy_from_slice(&after[..20]);
        entries.push(TreeEntry::new(name, mode, ObjectId::from_bytes(raw)));

        payload = &after[20..];
    }
    Tree::new(entries)
}
