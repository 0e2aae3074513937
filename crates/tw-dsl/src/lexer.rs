use logos::Logos;
use std::ops::Range;

/// Internal logos token for choice markup.
///
/// Bracket and arrow glyphs each have ASCII and full-width/Unicode forms.
/// A lone `-` or `=` is ordinary text; logos prefers the longer arrow match.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
enum RawToken {
    #[token("[")]
    #[token("【")]
    Open,

    #[token("]")]
    #[token("】")]
    Close,

    #[token("->")]
    #[token("=>")]
    #[token("→")]
    Arrow,

    #[regex(r"[^\[\]【】→=\-]+")]
    #[regex(r"[=\-]")]
    Text,
}

/// A choice link found on a line: `[label -> target]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceToken {
    /// Trimmed text between the open bracket and the arrow.
    pub label: String,
    /// Trimmed text between the arrow and the close bracket.
    pub target: String,
    /// Byte range of the whole link within the line.
    pub span: Range<usize>,
}

/// Finds every choice link on a line, left to right.
///
/// The label runs from an open bracket to the first arrow after it, the
/// target from that arrow to the next close bracket. Matching resumes after
/// the close bracket. An open bracket without an arrow and a later close
/// bracket yields nothing.
pub fn scan_choices(line: &str) -> Vec<ChoiceToken> {
    let tokens: Vec<(RawToken, Range<usize>)> = RawToken::lexer(line)
        .spanned()
        .map(|(token, span)| (token.unwrap_or(RawToken::Text), span))
        .collect();

    let mut found = Vec::new();
    let mut from = 0;
    while let Some(open) = position_from(&tokens, from, RawToken::Open) {
        let Some(arrow) = position_from(&tokens, open + 1, RawToken::Arrow) else {
            break;
        };
        let Some(close) = position_from(&tokens, arrow + 1, RawToken::Close) else {
            break;
        };
        let (open_span, arrow_span, close_span) =
            (&tokens[open].1, &tokens[arrow].1, &tokens[close].1);
        found.push(ChoiceToken {
            label: line[open_span.end..arrow_span.start].trim().to_string(),
            target: line[arrow_span.end..close_span.start].trim().to_string(),
            span: open_span.start..close_span.end,
        });
        from = close + 1;
    }
    found
}

fn position_from(tokens: &[(RawToken, Range<usize>)], from: usize, kind: RawToken) -> Option<usize> {
    tokens
        .get(from..)?
        .iter()
        .position(|(t, _)| *t == kind)
        .map(|i| i + from)
}

/// Returns the text after the `METADATA:` prefix, if the line has one.
///
/// The keyword is case-insensitive and may be followed by whitespace before
/// the colon.
pub fn metadata_body(line: &str) -> Option<&str> {
    const KEYWORD: &str = "METADATA";
    let keyword = line.get(..KEYWORD.len())?;
    if !keyword.eq_ignore_ascii_case(KEYWORD) {
        return None;
    }
    line[KEYWORD.len()..].trim_start().strip_prefix(':')
}

/// One comma-separated entry of a metadata line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataItem<'a> {
    /// `icon=<glyph>`.
    Icon(&'a str),
    /// `color=<value>`, not yet validated.
    Color(&'a str),
    /// A `key=value` pair with a key other than `icon` or `color`.
    Unknown {
        /// The key as written.
        key: &'a str,
        /// The value as written.
        value: &'a str,
    },
    /// An entry without `=` or with an empty key or value.
    Malformed(&'a str),
}

/// Splits a metadata body into its entries.
///
/// Keys are case-insensitive; keys and values are trimmed. Empty entries
/// (e.g. from a trailing comma) are skipped.
pub fn parse_metadata(body: &str) -> Vec<MetadataItem<'_>> {
    body.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let Some((key, value)) = entry.split_once('=') else {
                return MetadataItem::Malformed(entry);
            };
            let (key, value) = (key.trim(), value.trim());
            if key.is_empty() || value.is_empty() {
                MetadataItem::Malformed(entry)
            } else if key.eq_ignore_ascii_case("icon") {
                MetadataItem::Icon(value)
            } else if key.eq_ignore_ascii_case("color") {
                MetadataItem::Color(value)
            } else {
                MetadataItem::Unknown { key, value }
            }
        })
        .collect()
}
