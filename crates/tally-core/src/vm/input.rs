// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Whitespace-delimited token reading for `INPUT`.

use std::io::{self, BufRead};

/// Reads the next whitespace-delimited token from `reader`.
///
/// Leading whitespace, newlines included, is skipped. The single delimiter
/// after the token is consumed; nothing past it is. Returns `None` at end of
/// input.
pub(crate) fn read_token<R: BufRead + ?Sized>(reader: &mut R) -> io::Result<Option<String>> {
    let mut token = Vec::new();

    loop {
        let buf = match reader.fill_buf() {
            Ok(buf) => buf,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        };
        if buf.is_empty() {
            break;
        }

        let mut used = 0;
        let mut complete = false;
        for &byte in buf {
            used += 1;
            if byte.is_ascii_whitespace() {
                if !token.is_empty() {
                    complete = true;
                    break;
                }
            } else {
                token.push(byte);
            }
        }
        reader.consume(used);

        if complete {
            break;
        }
    }

    if token.is_empty() {
        Ok(None)
    } else {
        Ok(Some(String::from_utf8_lossy(&token).into_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufReader, Cursor, Read};

    #[test]
    fn test_tokens_on_one_line() {
        let mut input = Cursor::new("3 4.5\n");
        assert_eq!(read_token(&mut input).unwrap().as_deref(), Some("3"));
        assert_eq!(read_token(&mut input).unwrap().as_deref(), Some("4.5"));
        assert_eq!(read_token(&mut input).unwrap(), None);
    }

    #[test]
    fn test_skips_blank_lines() {
        let mut input = Cursor::new("\n\n   \t 7\r\n");
        assert_eq!(read_token(&mut input).unwrap().as_deref(), Some("7"));
    }

    #[test]
    fn test_token_at_end_without_newline() {
        let mut input = Cursor::new("42");
        assert_eq!(read_token(&mut input).unwrap().as_deref(), Some("42"));
        assert_eq!(read_token(&mut input).unwrap(), None);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(read_token(&mut Cursor::new("")).unwrap(), None);
        assert_eq!(read_token(&mut Cursor::new(" \n ")).unwrap(), None);
    }

    #[test]
    fn test_token_split_across_buffer_refills() {
        // A one-byte buffer forces every byte through a separate fill_buf
        let mut input = BufReader::with_capacity(1, Cursor::new("123 456"));
        assert_eq!(read_token(&mut input).unwrap().as_deref(), Some("123"));
        assert_eq!(read_token(&mut input).unwrap().as_deref(), Some("456"));
    }

    #[test]
    fn test_does_not_consume_past_delimiter() {
        let mut input = Cursor::new("1\nrest");
        read_token(&mut input).unwrap();
        let mut rest = String::new();
        input.read_to_string(&mut rest).unwrap();
        assert_eq!(rest, "rest");
    }
}
