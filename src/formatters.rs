use chrono::{TimeZone, Utc};
use tiny_keccak::{Hasher, Keccak};

// Helpers that turn raw column values into the HTML fragments the table
// widget drops straight into its cells.

/// Payloads longer than this are shown as a preview with a copy button.
const PAYLOAD_PREVIEW_THRESHOLD: usize = 4;

/// Characters of the checksummed address shown before the ellipsis, `0x` included.
const SHORT_ADDRESS_CHARS: usize = 8;

fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    let mut out = [0u8; 32];
    hasher.update(data);
    hasher.finalize(&mut out);
    out
}

/// Length of an execution-layer address.
const ADDRESS_BYTES: usize = 20;

/// Fits a stored blob to an address: longer input keeps its last 20 bytes,
/// shorter input is left-padded with zeros.
fn to_address(bytes: &[u8]) -> [u8; ADDRESS_BYTES] {
    let mut addr = [0u8; ADDRESS_BYTES];
    let tail = &bytes[bytes.len().saturating_sub(ADDRESS_BYTES)..];
    addr[ADDRESS_BYTES - tail.len()..].copy_from_slice(tail);
    addr
}

/// EIP-55 mixed-case checksum encoding, `0x`-prefixed.
pub fn to_checksum_address(addr: &[u8]) -> String {
    let lower = hex::encode(to_address(addr));
    let hash = keccak256(lower.as_bytes());

    let mut out = String::with_capacity(lower.len() + 2);
    out.push_str("0x");
    for (i, c) in lower.chars().enumerate() {
        let nibble = if i % 2 == 0 {
            hash[i / 2] >> 4
        } else {
            hash[i / 2] & 0x0f
        };
        if c.is_ascii_alphabetic() && nibble >= 8 {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Shortened, checksummed address linking to its address page.
pub fn format_eth1_address(addr: &[u8]) -> String {
    let checksummed = to_checksum_address(addr);
    let short: String = checksummed.chars().take(SHORT_ADDRESS_CHARS).collect();
    format!(
        r#"<a href="/address/0x{}" class="text-monospace">{}…</a>"#,
        hex::encode(to_address(addr)),
        short
    )
}

/// Link to a validator, labelled with its name when it has one.
///
/// The link prefers the validator index and falls back to the pubkey for
/// validators the beacon chain has not indexed yet.
pub fn format_validator_with_name(pubkey: &[u8], index: Option<i64>, name: &str) -> String {
    let link = match index {
        Some(index) => index.to_string(),
        None => format!("0x{}", hex::encode(pubkey)),
    };
    let label = if !name.is_empty() {
        format!(r#"<span class="text-truncate">{}</span>"#, escape_html(name))
    } else if let Some(index) = index {
        index.to_string()
    } else {
        let head = &pubkey[..pubkey.len().min(4)];
        format!("0x{}…", hex::encode(head))
    };
    format!(r#"<i class="fas fa-male mr-2"></i><a href="/validator/{link}">{label}</a>"#)
}

/// Converts a Unix timestamp into a span the frontend localises; the title
/// carries the RFC 3339 form for hover.
pub fn format_timestamp(ts: i64) -> String {
    // Create a `DateTime<Utc>` object from the timestamp.
    let datetime = Utc.timestamp_opt(ts, 0).single();

    if let Some(dt) = datetime {
        format!(
            r#"<span class="timestamp" title="{}" data-toggle="tooltip" data-placement="top" data-timestamp="{}"></span>"#,
            dt.to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            ts
        )
    } else {
        // Fallback for invalid timestamps.
        "Invalid Timestamp".to_string()
    }
}

/// Hex for short payloads; a `head…tail` preview with a copy-to-clipboard
/// button carrying the full value for anything longer.
pub fn format_payload(payload: &[u8]) -> String {
    if payload.len() <= PAYLOAD_PREVIEW_THRESHOLD {
        return hex::encode(payload);
    }
    format!(
        r#"<span>{}…{}</span><i class="fa fa-copy text-muted ml-2 p-1" role="button" data-toggle="tooltip" title="Copy to clipboard" data-clipboard-text="{}"></i>"#,
        hex::encode(&payload[..2]),
        hex::encode(&payload[payload.len() - 2..]),
        hex::encode(payload)
    )
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&#34;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
