//! Object-level syntax parsing.
//!
//! Builds [`Object`] values from the token stream. Stream data is handled
//! here as well: streams only ever occur as the body of an indirect object,
//! so `parse_object` stays purely token-driven and `parse_indirect_object`
//! deals with raw data extents.

use super::lexer::{Lexer, Token};
use super::{ParseError, ParseOptions, ParseResult};
use crate::objects::{Dictionary, Object, ObjectId, Stream};

/// Maximum nesting of arrays and dictionaries
const MAX_PARSE_DEPTH: usize = 100;

/// Resolves the `/Length` of a stream when it is an indirect reference.
pub type LengthResolver<'r> = dyn Fn(ObjectId) -> Option<i64> + 'r;

/// Parse a single object at the current lexer position.
pub fn parse_object(lexer: &mut Lexer<'_>, options: &ParseOptions) -> ParseResult<Object> {
    parse_object_at_depth(lexer, options, 0)
}

fn parse_object_at_depth(
    lexer: &mut Lexer<'_>,
    options: &ParseOptions,
    depth: usize,
) -> ParseResult<Object> {
    if depth > MAX_PARSE_DEPTH {
        return Err(ParseError::SyntaxError {
            position: lexer.position(),
            message: "object nesting too deep".to_string(),
        });
    }

    let token = lexer.next_token()?;
    match token {
        Token::Null => Ok(Object::Null),
        Token::Boolean(b) => Ok(Object::Boolean(b)),
        Token::Real(r) => Ok(Object::Real(r)),
        Token::String(s) => Ok(Object::String(s)),
        Token::Name(n) => Ok(Object::Name(n)),
        Token::Integer(i) => parse_integer_or_reference(lexer, i),
        Token::ArrayStart => parse_array(lexer, options, depth),
        Token::DictStart => parse_dictionary(lexer, options, depth).map(Object::Dictionary),
        other => Err(ParseError::UnexpectedToken {
            expected: "object".to_string(),
            found: other.describe(),
        }),
    }
}

/// Distinguish a plain integer from the `N G R` reference form.
fn parse_integer_or_reference(lexer: &mut Lexer<'_>, first: i64) -> ParseResult<Object> {
    if first < 0 || first > u32::MAX as i64 {
        return Ok(Object::Integer(first));
    }

    let second = lexer.next_token()?;
    if let Token::Integer(gen) = second {
        if (0..=u16::MAX as i64).contains(&gen) {
            let third = lexer.next_token()?;
            if third == Token::Ref {
                return Ok(Object::Reference(ObjectId::new(first as u32, gen as u16)));
            }
            lexer.push_token(third);
        }
    }
    lexer.push_token(second);
    Ok(Object::Integer(first))
}

fn parse_array(
    lexer: &mut Lexer<'_>,
    options: &ParseOptions,
    depth: usize,
) -> ParseResult<Object> {
    let mut items = Vec::new();
    loop {
        let token = lexer.next_token()?;
        match token {
            Token::ArrayEnd => return Ok(Object::Array(items)),
            Token::Eof => {
                return Err(ParseError::SyntaxError {
                    position: lexer.position(),
                    message: "unterminated array".to_string(),
                })
            }
            other => {
                lexer.push_token(other);
                items.push(parse_object_at_depth(lexer, options, depth + 1)?);
            }
        }
    }
}

fn parse_dictionary(
    lexer: &mut Lexer<'_>,
    options: &ParseOptions,
    depth: usize,
) -> ParseResult<Dictionary> {
    let mut dict = Dictionary::new();
    loop {
        let token = lexer.next_token()?;
        match token {
            Token::DictEnd => return Ok(dict),
            Token::Name(key) => {
                let value = parse_object_at_depth(lexer, options, depth + 1)?;
                dict.set(key, value);
            }
            Token::Eof => {
                return Err(ParseError::SyntaxError {
                    position: lexer.position(),
                    message: "unterminated dictionary".to_string(),
                })
            }
            other if options.lenient_syntax => {
                // Stray non-name entry; swallow one object and continue
                lexer.push_token(other);
                let _ = parse_object_at_depth(lexer, options, depth + 1)?;
            }
            other => {
                return Err(ParseError::UnexpectedToken {
                    expected: "name or '>>'".to_string(),
                    found: other.describe(),
                })
            }
        }
    }
}

/// Parse an `N G obj ... endobj` block at the current lexer position.
///
/// Returns the object's id as written in the file. With `expected` given,
/// strict mode fails on a mismatch while lenient mode keeps the actual id.
pub fn parse_indirect_object(
    lexer: &mut Lexer<'_>,
    options: &ParseOptions,
    expected: Option<ObjectId>,
    resolve_length: Option<&LengthResolver<'_>>,
) -> ParseResult<(ObjectId, Object)> {
    let id = parse_object_header(lexer)?;
    if let Some(expected) = expected {
        if id != expected && !options.lenient_syntax {
            return Err(ParseError::SyntaxError {
                position: lexer.position(),
                message: format!("found object {id} where {expected} was expected"),
            });
        }
    }

    let body = match lexer.peek_token()? {
        Token::EndObj => Object::Null,
        _ => parse_object(lexer, options)?,
    };

    let next = lexer.next_token()?;
    let object = match next {
        Token::Stream => {
            let dict = match body {
                Object::Dictionary(dict) => dict,
                _ => {
                    return Err(ParseError::SyntaxError {
                        position: lexer.position(),
                        message: "stream keyword without a dictionary".to_string(),
                    })
                }
            };
            let stream = read_stream(lexer, options, dict, resolve_length)?;
            expect_endobj(lexer, options)?;
            Object::Stream(stream)
        }
        Token::EndObj => body,
        other if options.lenient_syntax => {
            // Missing endobj; leave the stray token for the caller
            lexer.push_token(other);
            body
        }
        other => {
            return Err(ParseError::UnexpectedToken {
                expected: "'endobj'".to_string(),
                found: other.describe(),
            })
        }
    };

    Ok((id, object))
}

fn parse_object_header(lexer: &mut Lexer<'_>) -> ParseResult<ObjectId> {
    let number = match lexer.next_token()? {
        Token::Integer(n) if (0..=u32::MAX as i64).contains(&n) => n as u32,
        other => {
            return Err(ParseError::UnexpectedToken {
                expected: "object number".to_string(),
                found: other.describe(),
            })
        }
    };
    let generation = match lexer.next_token()? {
        Token::Integer(g) if (0..=u16::MAX as i64).contains(&g) => g as u16,
        other => {
            return Err(ParseError::UnexpectedToken {
                expected: "generation number".to_string(),
                found: other.describe(),
            })
        }
    };
    lexer.expect_token(Token::Obj)?;
    Ok(ObjectId::new(number, generation))
}

/// Read stream data following the `stream` keyword.
///
/// The extent comes from `/Length` when it is usable, otherwise from
/// scanning for the `endstream` keyword. A declared length that does not
/// land on `endstream` is an error in strict mode and falls back to the
/// scan in lenient mode.
fn read_stream(
    lexer: &mut Lexer<'_>,
    options: &ParseOptions,
    dict: Dictionary,
    resolve_length: Option<&LengthResolver<'_>>,
) -> ParseResult<Stream> {
    lexer.skip_stream_eol();
    let data_start = lexer.position();

    let declared = match dict.get("Length") {
        Some(Object::Integer(n)) if *n >= 0 => Some(*n as usize),
        Some(Object::Reference(id)) => resolve_length
            .and_then(|resolve| resolve(*id))
            .filter(|n| *n >= 0)
            .map(|n| n as usize),
        _ => None,
    };

    let data_end = match declared {
        Some(length) if endstream_follows(lexer, data_start + length) => data_start + length,
        Some(_) if !options.lenient_syntax => {
            return Err(ParseError::SyntaxError {
                position: data_start,
                message: "stream data does not end at declared /Length".to_string(),
            })
        }
        None if !options.lenient_syntax && !dict.contains_key("Length") => {
            return Err(ParseError::MissingKey("Length".to_string()))
        }
        _ => scan_for_endstream(lexer, data_start)?,
    };

    let data = lexer.data()[data_start..data_end].to_vec();
    lexer.set_position(data_end);
    skip_to_endstream(lexer)?;
    Ok(Stream::with_dictionary(dict, data))
}

fn endstream_follows(lexer: &Lexer<'_>, at: usize) -> bool {
    if at > lexer.data().len() {
        return false;
    }
    let mut probe = Lexer::new_at(lexer.data(), at);
    matches!(probe.next_token(), Ok(Token::EndStream))
}

fn scan_for_endstream(lexer: &Lexer<'_>, data_start: usize) -> ParseResult<usize> {
    let found = lexer
        .find_from(b"endstream", data_start)
        .ok_or_else(|| ParseError::SyntaxError {
            position: data_start,
            message: "unterminated stream".to_string(),
        })?;
    // One EOL belongs to the keyword, not the data
    let data = &lexer.data()[data_start..found];
    let trimmed = if data.ends_with(b"\r\n") {
        2
    } else if data.ends_with(b"\n") || data.ends_with(b"\r") {
        1
    } else {
        0
    };
    Ok(found - trimmed)
}

fn skip_to_endstream(lexer: &mut Lexer<'_>) -> ParseResult<()> {
    match lexer.next_token() {
        Ok(Token::EndStream) => Ok(()),
        Ok(other) => Err(ParseError::UnexpectedToken {
            expected: "'endstream'".to_string(),
            found: other.describe(),
        }),
        Err(err) => Err(err),
    }
}

fn expect_endobj(lexer: &mut Lexer<'_>, options: &ParseOptions) -> ParseResult<()> {
    match lexer.next_token() {
        Ok(Token::EndObj) => Ok(()),
        Ok(other) if options.lenient_syntax => {
            lexer.push_token(other);
            Ok(())
        }
        Ok(other) => Err(ParseError::UnexpectedToken {
            expected: "'endobj'".to_string(),
            found: other.describe(),
        }),
        Err(err) if options.lenient_syntax => {
            let _ = err;
            Ok(())
        }
        Err(err) => Err(err),
    }
}
