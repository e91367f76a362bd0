//! Resolution of `%message{...}` references in template strings.
//!
//! External configuration embeds references to message metadata (and a
//! fixed set of intrinsic pseudo-keys) in plain strings, e.g.
//! `"queue/%message{channel}"`. The resolver substitutes them in a single
//! left-to-right pass; a substituted value is never re-scanned, so values
//! containing token syntax cannot inject further expansion.
//!
//! The grammar is a public contract: `%message{<metadata-key>}` looks up a
//! metadata value case-insensitively, while `%message{%uniqueId}`,
//! `%message{%size}`, and `%message{%payload}` reference the envelope's id,
//! payload length, and decoded payload text.

use crate::message::domain::Message;
use crate::message::error::MessageError;
use tracing::trace;

/// The token-open marker, character by character for the state machine.
const TOKEN_OPEN: [char; 9] = ['%', 'm', 'e', 's', 's', 'a', 'g', 'e', '{'];
/// The token-open marker as literal text.
const TOKEN_OPEN_STR: &str = "%message{";
/// The token-close marker.
const TOKEN_CLOSE: char = '}';

/// Intrinsic pseudo-key for the envelope id.
const PSEUDO_UNIQUE_ID: &str = "%uniqueId";
/// Intrinsic pseudo-key for the payload length in bytes.
const PSEUDO_SIZE: &str = "%size";
/// Intrinsic pseudo-key for the decoded payload text.
const PSEUDO_PAYLOAD: &str = "%payload";

/// Resolves metadata-reference tokens embedded in configuration strings
/// against a message's metadata.
///
/// In lenient mode (the default) an unresolved reference passes through
/// with its original token text preserved verbatim; in strict mode it
/// fails with [`MessageError::UnresolvedReference`].
///
/// # Examples
///
/// ```
/// use dunnage::message::services::factory::MessageFactory;
/// use dunnage::message::services::resolver::ExpressionResolver;
///
/// let factory = MessageFactory::new();
/// let mut message = factory.new_message();
/// message.add_metadata("Key1", "A");
///
/// let resolver = ExpressionResolver::lenient();
/// let resolved = resolver
///     .resolve(&message, "value=%message{key1}")
///     .expect("well-formed template");
/// assert_eq!(resolved, "value=A");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExpressionResolver {
    strict: bool,
}

/// Parser states for the single-pass scan.
#[derive(Debug)]
enum State {
    /// Copying literal text.
    Scan,
    /// Partially matched token-open marker starting at `start`.
    TokenOpen { start: usize, matched: usize },
    /// Inside a reference token opened at `start`.
    KeyCapture { start: usize, key: String },
}

impl ExpressionResolver {
    /// Creates a lenient resolver: unresolved references pass through
    /// verbatim.
    #[must_use]
    pub const fn lenient() -> Self {
        Self { strict: false }
    }

    /// Creates a strict resolver: unresolved references fail.
    #[must_use]
    pub const fn strict() -> Self {
        Self { strict: true }
    }

    /// Returns `true` if this resolver fails on unresolved references.
    #[must_use]
    pub const fn is_strict(self) -> bool {
        self.strict
    }

    /// Substitutes `%message{...}` references in `template` with values
    /// from `message`.
    ///
    /// Resolution is a single left-to-right pass; substituted values are
    /// not re-scanned for tokens.
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::MalformedExpression`] when a token is
    /// opened but never closed, nests another opener, or references an
    /// empty key, and [`MessageError::UnresolvedReference`] in strict mode
    /// when a referenced key is absent.
    pub fn resolve(self, message: &Message, template: &str) -> Result<String, MessageError> {
        let mut out = String::with_capacity(template.len());
        let mut state = State::Scan;
        let mut chars = template.char_indices();
        let mut replay: Option<(usize, char)> = None;

        loop {
            let Some((index, character)) = replay.take().or_else(|| chars.next()) else {
                break;
            };
            state = match state {
                State::Scan => scan(&mut out, index, character),
                State::TokenOpen { start, matched } => {
                    let (next_state, unmatched) = advance_open(&mut out, start, matched, character);
                    replay = unmatched.map(|c| (index, c));
                    next_state
                }
                State::KeyCapture { start, key } => {
                    self.capture(&mut out, message, start, key, character)?
                }
            };
        }

        match state {
            State::Scan => Ok(out),
            State::TokenOpen { matched, .. } => {
                // A partial marker at end of input is ordinary literal text.
                flush_partial_marker(&mut out, matched);
                Ok(out)
            }
            State::KeyCapture { start, .. } => Err(MessageError::malformed_expression(
                start,
                "reference opened but never closed",
            )),
        }
    }

    fn capture(
        self,
        out: &mut String,
        message: &Message,
        start: usize,
        mut key: String,
        character: char,
    ) -> Result<State, MessageError> {
        if character == TOKEN_CLOSE {
            self.substitute(out, message, start, &key)?;
            return Ok(State::Scan);
        }
        key.push(character);
        if key_contains_opener(&key) {
            return Err(MessageError::malformed_expression(
                start,
                "nested reference opener inside a token",
            ));
        }
        Ok(State::KeyCapture { start, key })
    }

    fn substitute(
        self,
        out: &mut String,
        message: &Message,
        start: usize,
        key: &str,
    ) -> Result<(), MessageError> {
        if key.is_empty() {
            return Err(MessageError::malformed_expression(
                start,
                "empty metadata reference",
            ));
        }
        match reference_value(message, key) {
            Some(value) => out.push_str(&value),
            None if self.strict => {
                return Err(MessageError::UnresolvedReference(key.to_owned()));
            }
            None => {
                trace!(key, "unresolved metadata reference passed through");
                out.push_str(TOKEN_OPEN_STR);
                out.push_str(key);
                out.push(TOKEN_CLOSE);
            }
        }
        Ok(())
    }
}

fn scan(out: &mut String, start: usize, character: char) -> State {
    if character == '%' {
        State::TokenOpen { start, matched: 1 }
    } else {
        out.push(character);
        State::Scan
    }
}

/// Advances a partial token-open match by one character. On a mismatch the
/// consumed prefix is flushed as literal text and the character is handed
/// back for re-processing in scan state.
fn advance_open(
    out: &mut String,
    start: usize,
    matched: usize,
    character: char,
) -> (State, Option<char>) {
    if TOKEN_OPEN.get(matched).copied() == Some(character) {
        let now_matched = matched + 1;
        if now_matched == TOKEN_OPEN.len() {
            (
                State::KeyCapture {
                    start,
                    key: String::new(),
                },
                None,
            )
        } else {
            (
                State::TokenOpen {
                    start,
                    matched: now_matched,
                },
                None,
            )
        }
    } else {
        flush_partial_marker(out, matched);
        (State::Scan, Some(character))
    }
}

fn flush_partial_marker(out: &mut String, matched: usize) {
    for marker in TOKEN_OPEN.iter().take(matched) {
        out.push(*marker);
    }
}

fn key_contains_opener(key: &str) -> bool {
    key.contains(TOKEN_OPEN_STR)
}

/// Looks up a reference key: pseudo-keys address intrinsic envelope fields,
/// everything else is a case-insensitive metadata lookup.
fn reference_value(message: &Message, key: &str) -> Option<String> {
    if key.starts_with('%') {
        return match key {
            PSEUDO_UNIQUE_ID => Some(message.id().to_string()),
            PSEUDO_SIZE => Some(message.payload().len().to_string()),
            PSEUDO_PAYLOAD => Some(message.content()),
            // Unknown pseudo-keys follow the missing-reference path so
            // intrinsics can be added without breaking old templates.
            _ => None,
        };
    }
    message.metadata_value(key).map(ToOwned::to_owned)
}
