/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io::Write;

use log::debug;

/// Longest label value that will be emitted; longer values are cut before
/// escaping.
pub(crate) const MAX_LABEL_VALUE_LEN: usize = 2048;

/// Append `s` as the inside of a JSON string, escaping the quote, the
/// backslash and all control characters.
pub(crate) fn push_json_escaped(buf: &mut Vec<u8>, s: &str) {
    for c in s.chars() {
        match c {
            '"' => buf.extend_from_slice(b"\\\""),
            '\\' => buf.extend_from_slice(b"\\\\"),
            '\n' => buf.extend_from_slice(b"\\n"),
            '\r' => buf.extend_from_slice(b"\\r"),
            '\t' => buf.extend_from_slice(b"\\t"),
            c if (c as u32) < 0x20 => {
                let _ = write!(buf, "\\u{:04x}", c as u32);
            }
            c => {
                let mut utf8 = [0u8; 4];
                buf.extend_from_slice(c.encode_utf8(&mut utf8).as_bytes());
            }
        }
    }
}

/// Append a label value, truncated to [`MAX_LABEL_VALUE_LEN`] bytes before
/// escaping.
pub(crate) fn push_sanitized_label_value(buf: &mut Vec<u8>, value: &str) {
    let cut = truncate_str(value, MAX_LABEL_VALUE_LEN);
    if cut.len() < value.len() {
        debug!(
            "label value truncated from {} to {} bytes",
            value.len(),
            cut.len()
        );
    }
    push_json_escaped(buf, cut);
}

fn truncate_str(s: &str, max_len: usize) -> &str {
    if s.len() <= max_len {
        return s;
    }
    let mut end = max_len;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
