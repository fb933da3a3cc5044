/// ANSI escape stripping for raw log lines.
///
/// Node processes started under a TTY color their level field
/// (`\x1b[31mERROR\x1b[0m`), which would otherwise break the header grammar.
/// Stripping happens on raw bytes, before UTF-8 decoding.

use std::borrow::Cow;

const ESC: u8 = 0x1b;
const BEL: u8 = 0x07;

/// Remove CSI (`ESC [ ... final`), OSC (`ESC ] ... BEL|ESC \`) and two-byte
/// Fe sequences.
///
/// Returns `Cow::Borrowed` when the line contains no ESC byte.
pub fn strip_ansi_codes(input: &[u8]) -> Cow<'_, [u8]> {
    if !input.contains(&ESC) {
        return Cow::Borrowed(input);
    }

    let mut output = Vec::with_capacity(input.len());
    let mut i = 0;

    while i < input.len() {
        if input[i] != ESC {
            output.push(input[i]);
            i += 1;
            continue;
        }

        // lone trailing ESC
        let Some(&next) = input.get(i + 1) else {
            break;
        };

        match next {
            b'[' => {
                i += 2;
                while i < input.len() {
                    let b = input[i];
                    i += 1;
                    if (0x40..=0x7E).contains(&b) {
                        break;
                    }
                }
            }
            b']' => {
                i += 2;
                while i < input.len() {
                    if input[i] == BEL {
                        i += 1;
                        break;
                    }
                    if input[i] == ESC && input.get(i + 1) == Some(&b'\\') {
                        i += 2;
                        break;
                    }
                    i += 1;
                }
            }
            0x40..=0x5F => i += 2,
            _ => {
                // not an escape we know; keep the byte
                output.push(input[i]);
                i += 1;
            }
        }
    }

    Cow::Owned(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_line_is_borrowed() {
        let input = b"2020-01-01 00:00:00,000 | INFO | svc | loc | ok";
        assert!(matches!(strip_ansi_codes(input), Cow::Borrowed(_)));
    }

    #[test]
    fn test_strip_colored_level() {
        let input = b"2020-01-01 00:00:00,000 | \x1b[31mERROR\x1b[0m | svc | loc | boom";
        let output = strip_ansi_codes(input);
        assert_eq!(output.as_ref(), b"2020-01-01 00:00:00,000 | ERROR | svc | loc | boom");
    }

    #[test]
    fn test_strip_bold_and_dim() {
        let input = b"\x1b[1m\x1b[2mTraceback\x1b[0m (most recent call last):";
        assert_eq!(strip_ansi_codes(input).as_ref(), b"Traceback (most recent call last):");
    }

    #[test]
    fn test_strip_osc_hyperlink() {
        let input = b"\x1b]8;;https://example.com\x07ValueError\x1b]8;;\x1b\\: boom";
        assert_eq!(strip_ansi_codes(input).as_ref(), b"ValueError: boom");
    }

    #[test]
    fn test_only_escape_sequences() {
        assert_eq!(strip_ansi_codes(b"\x1b[0m\x1b[32m").as_ref(), b"");
    }

    #[test]
    fn test_trailing_lone_escape() {
        assert_eq!(strip_ansi_codes(b"True      : 6/6\x1b").as_ref(), b"True      : 6/6");
    }
}
