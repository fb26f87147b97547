use std::ops::Range;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct LiteralError {
    pub message: String,
    /// Byte range within the provided literal text.
    pub span: Range<usize>,
}

fn err(message: impl Into<String>, span: Range<usize>) -> LiteralError {
    LiteralError {
        message: message.into(),
        span,
    }
}

/// Unescape the value of a signature annotation.
///
/// Accepts the raw constant-pool text or a quoted literal (`"fun f(): String?"`). Supports the
/// Java escapes (`\b \t \n \f \r \" \' \\`, octal), `\uXXXX` and Kotlin's `\$`.
pub fn unescape_signature_literal(text: &str) -> Result<String, LiteralError> {
    let (start, end) = if text.len() >= 2 && text.starts_with('"') && text.ends_with('"') {
        (1, text.len() - 1)
    } else {
        (0, text.len())
    };

    let bytes = text.as_bytes();
    let mut out = String::with_capacity(end - start);
    let mut idx = start;
    while idx < end {
        if bytes[idx] == b'\\' {
            idx = unescape_escape(text, idx, end, &mut out)?;
        } else {
            let ch = text[idx..end].chars().next().unwrap_or('\u{FFFD}');
            out.push(ch);
            idx += ch.len_utf8();
        }
    }
    Ok(out)
}

fn unescape_escape(
    text: &str,
    idx: usize,
    end: usize,
    out: &mut String,
) -> Result<usize, LiteralError> {
    let bytes = text.as_bytes();
    debug_assert_eq!(bytes[idx], b'\\');
    if idx + 1 >= end {
        return Err(err("Unterminated escape sequence", idx..end));
    }

    let simple = match bytes[idx + 1] {
        b'b' => Some('\u{0008}'),
        b't' => Some('\t'),
        b'n' => Some('\n'),
        b'f' => Some('\u{000C}'),
        b'r' => Some('\r'),
        b'"' => Some('"'),
        b'\'' => Some('\''),
        b'\\' => Some('\\'),
        b'$' => Some('$'),
        _ => None,
    };
    if let Some(ch) = simple {
        out.push(ch);
        return Ok(idx + 2);
    }

    match bytes[idx + 1] {
        b'u' => {
            // `\uuuu0041` is legal Java; any number of `u`s may follow the backslash.
            let mut hex_start = idx + 1;
            while hex_start < end && bytes[hex_start] == b'u' {
                hex_start += 1;
            }
            let hex_end = hex_start + 4;
            if hex_end > end {
                return Err(err("Incomplete unicode escape", idx..end));
            }
            if !bytes[hex_start..hex_end].iter().all(u8::is_ascii_hexdigit) {
                return Err(err("Invalid unicode escape", idx..hex_end));
            }
            let hex = &text[hex_start..hex_end];
            let value = u32::from_str_radix(hex, 16)
                .map_err(|_| err(format!("Invalid unicode escape `\\u{hex}`"), idx..hex_end))?;
            let ch = char::from_u32(value).ok_or_else(|| {
                err(
                    format!("Unicode escape `\\u{hex}` is not a scalar value"),
                    idx..hex_end,
                )
            })?;
            out.push(ch);
            Ok(hex_end)
        }
        b'0'..=b'7' => {
            let first = bytes[idx + 1];
            let max_digits = if first <= b'3' { 3 } else { 2 };
            let mut value: u32 = 0;
            let mut cursor = idx + 1;
            while cursor < end && cursor < idx + 1 + max_digits {
                match bytes[cursor] {
                    digit @ b'0'..=b'7' => {
                        value = value * 8 + u32::from(digit - b'0');
                        cursor += 1;
                    }
                    _ => break,
                }
            }
            out.push(char::from_u32(value).unwrap_or('\u{FFFD}'));
            Ok(cursor)
        }
        _ => {
            let ch = text[idx + 1..end].chars().next().unwrap_or('\u{FFFD}');
            Err(err(
                format!("Invalid escape sequence `\\{ch}`"),
                idx..idx + 1 + ch.len_utf8(),
            ))
        }
    }
}
