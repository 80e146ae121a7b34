//! Reader for the OpenStep property-list dialect Xcode uses in `project.pbxproj`.

use std::ops::Range;

use crate::error::PbxprojError;

/// A string value together with the bytes it occupies in the source text.
/// The span includes the surrounding quotes of a quoted string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlistString {
    pub value: String,
    pub span: Range<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    String(PlistString),
    Data(Vec<u8>),
    Array(Vec<Value>),
    Dict(Dict),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(&s.value),
            _ => None,
        }
    }

    pub fn as_plist_string(&self) -> Option<&PlistString> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&Dict> {
        match self {
            Value::Dict(d) => Some(d),
            _ => None,
        }
    }
}

/// Dictionary preserving source order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dict {
    entries: Vec<(PlistString, Value)>,
}

impl Dict {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(k, _)| k.value == key)
            .map(|(_, v)| v)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn get_dict(&self, key: &str) -> Option<&Dict> {
        self.get(key).and_then(Value::as_dict)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.value.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Parses a complete property list document
pub fn parse(source: &str) -> Result<Value, PbxprojError> {
    let mut parser = Parser {
        src: source,
        bytes: source.as_bytes(),
        pos: 0,
    };
    parser.skip_trivia()?;
    let value = parser.parse_value()?;
    parser.skip_trivia()?;
    if parser.pos < parser.bytes.len() {
        return Err(parser.error("unexpected content after top-level value"));
    }
    Ok(value)
}

fn is_unquoted_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'_' | b'$' | b'+' | b'/' | b':' | b'.' | b'-')
}

struct Parser<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn error(&self, message: &str) -> PbxprojError {
        let consumed = &self.src[..self.pos.min(self.src.len())];
        let line = consumed.matches('\n').count() + 1;
        let column = consumed
            .rfind('\n')
            .map(|nl| consumed.len() - nl)
            .unwrap_or(consumed.len() + 1);
        PbxprojError::Syntax {
            line,
            column,
            message: message.to_string(),
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn starts_with(&self, pat: &str) -> bool {
        self.bytes[self.pos..].starts_with(pat.as_bytes())
    }

    fn skip_trivia(&mut self) -> Result<(), PbxprojError> {
        loop {
            match self.peek() {
                Some(b) if b.is_ascii_whitespace() => self.pos += 1,
                Some(b'/') if self.starts_with("//") => {
                    while let Some(b) = self.peek() {
                        if b == b'\n' {
                            break;
                        }
                        self.pos += 1;
                    }
                }
                Some(b'/') if self.starts_with("/*") => {
                    match self.src[self.pos + 2..].find("*/") {
                        Some(end) => self.pos += 2 + end + 2,
                        None => return Err(self.error("unterminated comment")),
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn expect(&mut self, byte: u8) -> Result<(), PbxprojError> {
        if self.peek() == Some(byte) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error(&format!("expected '{}'", byte as char)))
        }
    }

    fn parse_value(&mut self) -> Result<Value, PbxprojError> {
        match self.peek() {
            Some(b'{') => self.parse_dict().map(Value::Dict),
            Some(b'(') => self.parse_array().map(Value::Array),
            Some(b'<') => self.parse_data().map(Value::Data),
            Some(_) => self.parse_string().map(Value::String),
            None => Err(self.error("unexpected end of input")),
        }
    }

    fn parse_dict(&mut self) -> Result<Dict, PbxprojError> {
        self.expect(b'{')?;
        let mut entries = Vec::new();
        loop {
            self.skip_trivia()?;
            if self.peek() == Some(b'}') {
                self.pos += 1;
                return Ok(Dict { entries });
            }
            let key = self.parse_string()?;
            self.skip_trivia()?;
            self.expect(b'=')?;
            self.skip_trivia()?;
            let value = self.parse_value()?;
            self.skip_trivia()?;
            self.expect(b';')?;
            entries.push((key, value));
        }
    }

    fn parse_array(&mut self) -> Result<Vec<Value>, PbxprojError> {
        self.expect(b'(')?;
        let mut items = Vec::new();
        loop {
            self.skip_trivia()?;
            if self.peek() == Some(b')') {
                self.pos += 1;
                return Ok(items);
            }
            items.push(self.parse_value()?);
            self.skip_trivia()?;
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b')') => {}
                _ => return Err(self.error("expected ',' or ')'")),
            }
        }
    }

    fn parse_data(&mut self) -> Result<Vec<u8>, PbxprojError> {
        self.expect(b'<')?;
        let start = self.pos;
        let end = match self.src[start..].find('>') {
            Some(offset) => start + offset,
            None => return Err(self.error("unterminated data")),
        };
        let digits: Vec<u8> = self.bytes[start..end]
            .iter()
            .copied()
            .filter(|b| !b.is_ascii_whitespace())
            .collect();
        if digits.len() % 2 != 0 {
            return Err(self.error("odd number of hex digits in data"));
        }
        let mut data = Vec::with_capacity(digits.len() / 2);
        for pair in digits.chunks(2) {
            let text = std::str::from_utf8(pair).map_err(|_| self.error("invalid data"))?;
            let byte = u8::from_str_radix(text, 16).map_err(|_| self.error("invalid hex digit in data"))?;
            data.push(byte);
        }
        self.pos = end + 1;
        Ok(data)
    }

    fn parse_string(&mut self) -> Result<PlistString, PbxprojError> {
        match self.peek() {
            Some(b'"') => self.parse_quoted(),
            Some(b) if is_unquoted_char(b) => {
                let start = self.pos;
                while self.peek().is_some_and(is_unquoted_char) {
                    self.pos += 1;
                }
                Ok(PlistString {
                    value: self.src[start..self.pos].to_string(),
                    span: start..self.pos,
                })
            }
            Some(_) => Err(self.error("unexpected character")),
            None => Err(self.error("unexpected end of input")),
        }
    }

    fn parse_quoted(&mut self) -> Result<PlistString, PbxprojError> {
        let start = self.pos;
        self.expect(b'"')?;
        let mut value = String::new();
        let src = self.src;
        let mut chars = src[self.pos..].char_indices();
        while let Some((offset, c)) = chars.next() {
            match c {
                '"' => {
                    self.pos += offset + 1;
                    return Ok(PlistString {
                        value,
                        span: start..self.pos,
                    });
                }
                '\\' => {
                    let Some((_, escaped)) = chars.next() else {
                        break;
                    };
                    match escaped {
                        'n' => value.push('\n'),
                        't' => value.push('\t'),
                        'r' => value.push('\r'),
                        '0' => value.push('\0'),
                        'U' => {
                            let hex: String = chars.by_ref().take(4).map(|(_, h)| h).collect();
                            let decoded = u32::from_str_radix(&hex, 16)
                                .ok()
                                .and_then(char::from_u32);
                            match decoded {
                                Some(ch) => value.push(ch),
                                None => {
                                    self.pos += offset;
                                    return Err(self.error("invalid \\U escape"));
                                }
                            }
                        }
                        other => value.push(other),
                    }
                }
                other => value.push(other),
            }
        }
        Err(self.error("unterminated string"))
    }
}

/// Renders `value` the way it must appear in the file
pub fn quote(value: &str) -> String {
    if !value.is_empty()
        && value
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'$' | b'/' | b'.'))
    {
        return value.to_string();
    }

    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_structures_with_comments() {
        let src = r#"// !$*UTF8*$!
{
	archiveVersion = 1;
	objects = {
/* Begin PBXProject section */
		AA /* Project object */ = {
			isa = PBXProject;
			targets = (
				BB /* Demo */,
				CC,
			);
		};
	};
	name = "Demo App";
}
"#;
        let root = parse(src).expect("parse");
        let root = root.as_dict().expect("dict");
        assert_eq!(root.get_str("archiveVersion"), Some("1"));
        assert_eq!(root.get_str("name"), Some("Demo App"));
        let project = root.get_dict("objects").and_then(|o| o.get_dict("AA")).expect("AA");
        let targets: Vec<&str> = project
            .get("targets")
            .and_then(Value::as_array)
            .expect("targets")
            .iter()
            .filter_map(Value::as_str)
            .collect();
        assert_eq!(targets, vec!["BB", "CC"]);
    }

    #[test]
    fn string_spans_cover_source_text() {
        let src = r#"{ a = "x y"; b = com.acme.Demo; }"#;
        let root = parse(src).expect("parse");
        let root = root.as_dict().expect("dict");
        let a = root.get("a").and_then(Value::as_plist_string).expect("a");
        assert_eq!(&src[a.span.clone()], "\"x y\"");
        let b = root.get("b").and_then(Value::as_plist_string).expect("b");
        assert_eq!(&src[b.span.clone()], "com.acme.Demo");
    }

    #[test]
    fn decodes_escapes() {
        let src = r#"{ a = "line\nnext \"q\" \\ \U00e9"; }"#;
        let root = parse(src).expect("parse");
        assert_eq!(
            root.as_dict().and_then(|d| d.get_str("a")),
            Some("line\nnext \"q\" \\ é")
        );
    }

    #[test]
    fn parses_data_values() {
        let root = parse("{ d = <0fA1 ff>; }").expect("parse");
        assert_eq!(
            root.as_dict().and_then(|d| d.get("d")),
            Some(&Value::Data(vec![0x0f, 0xa1, 0xff]))
        );
    }

    #[test]
    fn reports_position_of_syntax_errors() {
        let err = parse("{\n  a = b\n}").expect_err("missing semicolon");
        match err {
            PbxprojError::Syntax { line, .. } => assert_eq!(line, 3),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn rejects_unterminated_input() {
        assert!(parse("{ a = \"open").is_err());
        assert!(parse("{ a = b; /* open").is_err());
        assert!(parse("").is_err());
        assert!(parse("{ } trailing").is_err());
    }

    #[test]
    fn quotes_only_when_needed() {
        assert_eq!(quote("com.acme.Demo"), "com.acme.Demo");
        assert_eq!(quote("com.acme.My-Ext"), "\"com.acme.My-Ext\"");
        assert_eq!(quote("a b"), "\"a b\"");
        assert_eq!(quote(""), "\"\"");
        assert_eq!(quote("say \"hi\""), "\"say \\\"hi\\\"\"");
    }
}
