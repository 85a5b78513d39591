/// Decode the small entity set result rows actually use.
///
/// Named: `&amp;`, `&lt;`, `&gt;`, `&quot;`, `&apos;`, `&nbsp;`. Numeric entities
/// decode only when semicolon-terminated and a valid scalar value. Anything
/// else is left untouched.
pub fn decode_entities(s: &str) -> String {
    const NAMED: &[(&str, char)] = &[
        ("&amp;", '&'),
        ("&lt;", '<'),
        ("&gt;", '>'),
        ("&quot;", '"'),
        ("&apos;", '\''),
        ("&nbsp;", '\u{00A0}'),
    ];
    // 0x10FFFF needs 6 hex digits, 1114111 needs 7 decimal ones.
    const MAX_HEX_DIGITS: usize = 6;
    const MAX_DEC_DIGITS: usize = 7;

    let Some(first) = memchr::memchr(b'&', s.as_bytes()) else {
        return s.to_string();
    };

    let mut out = String::with_capacity(s.len());
    out.push_str(&s[..first]);
    let mut rest = &s[first..];

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];

        if let Some((entity, ch)) = NAMED.iter().find(|(e, _)| rest.starts_with(e)) {
            out.push(*ch);
            rest = &rest[entity.len()..];
            continue;
        }

        let numeric = if let Some(hex) = rest
            .strip_prefix("&#x")
            .or_else(|| rest.strip_prefix("&#X"))
        {
            numeric_entity(hex, MAX_HEX_DIGITS, 16).map(|(ch, len)| (ch, len + 3))
        } else if let Some(dec) = rest.strip_prefix("&#") {
            numeric_entity(dec, MAX_DEC_DIGITS, 10).map(|(ch, len)| (ch, len + 2))
        } else {
            None
        };

        match numeric {
            Some((ch, consumed)) => {
                out.push(ch);
                rest = &rest[consumed..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Parses `digits;` and returns the char plus the consumed byte count.
fn numeric_entity(s: &str, max_digits: usize, radix: u32) -> Option<(char, usize)> {
    let end = s.find(';')?;
    let digits = &s[..end];
    if digits.is_empty() || digits.len() > max_digits {
        return None;
    }
    if !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }
    let ch = u32::from_str_radix(digits, radix).ok().and_then(char::from_u32)?;
    Some((ch, end + 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_named_and_numeric_entities() {
        assert_eq!(decode_entities("Tom &amp; Jerry"), "Tom & Jerry");
        assert_eq!(decode_entities("&lt;b&gt;"), "<b>");
        assert_eq!(decode_entities("caf&#233; &#x1F600;"), "café 😀");
    }

    #[test]
    fn leaves_malformed_sequences_alone() {
        assert_eq!(decode_entities("AT&T"), "AT&T");
        assert_eq!(decode_entities("&#xZZ;"), "&#xZZ;");
        assert_eq!(decode_entities("&#12345678;"), "&#12345678;");
        assert_eq!(decode_entities("&#55296;"), "&#55296;");
        assert_eq!(decode_entities("dangling &"), "dangling &");
    }
}
