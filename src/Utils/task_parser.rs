/// parse document with structure like
/// ```text
/// title1
///   key1: value1, value2
///   key2: value3
/// title2
///   key3: value4
/// ```
/// into HashMap<String, HashMap<String, Option<Vec<Value>>>>. Every key sits on its own line,
/// so a value may contain spaces (`expr: x^2 - 4, sin(x)`). Values are separated by commas.
/// Lines starting with //, #, % or ; are comments.
/// With a template every expected title and key is present in the result, missing ones as None.
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::{alpha1, alphanumeric1, line_ending, multispace0, space0},
    combinator::{eof, map, map_res, recognize},
    multi::{many0, many1, separated_list0},
    sequence::{delimited, pair, separated_pair},
};
use std::collections::HashMap;
use std::fmt::Display;

pub type DocumentMap = HashMap<String, SectionMap>;
pub type SectionMap = HashMap<String, Option<Vec<Value>>>;

/// enum to represent different value types:
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Float(f64),
    Integer(i64),
    Boolean(bool),
}

impl Value {
    pub fn as_string(&self) -> Option<&String> {
        if let Value::String(s) = self {
            Some(s)
        } else {
            None
        }
    }

    /// integers are widened
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        if let Value::Integer(i) = self {
            Some(*i)
        } else {
            None
        }
    }

    pub fn as_boolean(&self) -> Option<bool> {
        if let Value::Boolean(b) = self {
            Some(*b)
        } else {
            None
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::String(_) => "string",
            Value::Float(_) => "float",
            Value::Integer(_) => "integer",
            Value::Boolean(_) => "boolean",
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::String(s) => write!(f, "{}", s),
            Value::Float(val) => write!(f, "{}", val),
            Value::Integer(val) => write!(f, "{}", val),
            Value::Boolean(val) => write!(f, "{}", val),
        }
    }
}

fn identifier(input: &str) -> IResult<&str, String> {
    let parser = recognize(pair(
        alt((alpha1, tag("_"))),
        many0(alt((alphanumeric1, tag("_")))),
    ));
    let mut parser = map(parser, String::from);
    parser.parse(input)
}

/// Parses a title, alone on its line
pub(crate) fn parse_title(input: &str) -> IResult<&str, String> {
    let (input, title) = identifier(input)?;
    let (input, _) = pair(space0, line_ending).parse(input)?;
    Ok((input, title))
}

/// Parses a key (word characters without spaces)
pub(crate) fn parse_key(input: &str) -> IResult<&str, String> {
    identifier(input)
}

pub(crate) fn parse_value(input: &str) -> IResult<&str, Value> {
    // everything up to a comma or the end of the line
    let value_parser = take_while1(|c: char| !matches!(c, ',' | '\n' | '\r' | ';'));
    let mut value_parser = map_res(value_parser, |s: &str| -> Result<Value, String> {
        let s = s.trim();
        if s.is_empty() {
            return Err("empty value".to_string());
        }
        // Try parsing as different types in order
        if let Ok(val) = s.parse::<i64>() {
            Ok(Value::Integer(val))
        } else if let Ok(val) = s.parse::<f64>() {
            Ok(Value::Float(val))
        } else if let Ok(val) = s.parse::<bool>() {
            Ok(Value::Boolean(val))
        } else {
            Ok(Value::String(s.to_string()))
        }
    });
    value_parser.parse(input)
}

pub(crate) fn parse_value_list(input: &str) -> IResult<&str, Vec<Value>> {
    let separator_coma = delimited(space0, tag(","), space0);
    let mut value_parser = separated_list0(separator_coma, parse_value);
    value_parser.parse(input)
}

/// Parses a key-value pair where value is a list
pub(crate) fn parse_key_value_pair(input: &str) -> IResult<&str, (String, Vec<Value>)> {
    let colon_separator = delimited(space0, tag(":"), space0);
    let mut parser = separated_pair(parse_key, colon_separator, parse_value_list);
    parser.parse(input)
}

/// Parses a section with a title and one key-value pair per line
pub(crate) fn parse_section(input: &str) -> IResult<&str, (String, HashMap<String, Vec<Value>>)> {
    let (input, _) = multispace0(input)?;
    let (input, title) = parse_title(input)?;

    let line = delimited(
        multispace0,
        parse_key_value_pair,
        pair(space0, alt((line_ending, eof))),
    );
    let (input, pairs) = many1(line).parse(input)?;

    let mut section_map = HashMap::new();
    for (key, values) in pairs {
        section_map.insert(key, values);
    }
    Ok((input, (title, section_map)))
}

/// Filters out comment lines (starting with //, #, %, or ;) and blank lines
pub fn filter_comments(input: &str) -> String {
    input
        .lines()
        .filter(|line| {
            let trimmed = line.trim();
            !trimmed.starts_with("//")
                && !trimmed.starts_with('#')
                && !trimmed.starts_with('%')
                && !trimmed.starts_with(';')
                && !trimmed.is_empty()
        })
        .map(|line| format!("{}\n", line))
        .collect()
}

/// Parses the sections of a comment-free document. A title met twice has its keys merged.
pub fn parse_document(input: &str) -> IResult<&str, DocumentMap> {
    let (input, sections) = many1(parse_section).parse(input)?;
    let (input, _) = multispace0(input)?;

    let mut result: DocumentMap = HashMap::new();
    for (title, section_map) in sections {
        let title_map = result.entry(title).or_default();
        for (key, values) in section_map {
            title_map.insert(key, Some(values));
        }
    }
    Ok((input, result))
}

/// Strips comments, parses the whole document and merges the template into the result.
pub fn parse_document_as(input: &str, template: Option<&DocumentMap>) -> Result<DocumentMap, String> {
    let filtered = filter_comments(input);
    let mut parsed = match parse_document(&filtered) {
        Ok((remaining, parsed)) => {
            if !remaining.trim().is_empty() {
                return Err(format!(
                    "Failed to parse entire document. Remaining: '{}'",
                    remaining.trim()
                ));
            }
            parsed
        }
        Err(e) => return Err(format!("Parsing error: {:?}", e)),
    };
    if let Some(template) = template {
        for (title, keys_map) in template {
            let section_map = parsed.entry(title.clone()).or_default();
            for key in keys_map.keys() {
                section_map.entry(key.clone()).or_insert(None);
            }
        }
    }
    Ok(parsed)
}

/// Values of `title.key` exactly as written (trimmed), without the typing of [`parse_value`].
/// Meant for a document already accepted by [`parse_document_as`].
pub fn raw_values(input: &str, title: &str, key: &str) -> Vec<String> {
    let filtered = filter_comments(input);
    let mut current: Option<String> = None;
    let mut values = Vec::new();
    for line in filtered.lines() {
        let line = line.trim();
        if let Ok(("", name)) = identifier(line) {
            current = Some(name);
            continue;
        }
        let colon_separator = delimited(space0, tag(":"), space0);
        if let Ok((rest, (name, _))) = pair(parse_key, colon_separator).parse(line) {
            if current.as_deref() == Some(title) && name == key {
                // a repeated key replaces the earlier values, as in parse_document
                values = rest
                    .split(',')
                    .map(|value| value.trim().to_string())
                    .filter(|value| !value.is_empty())
                    .collect();
            }
        }
    }
    values
}

/// Builds a template from `(title, keys)` pairs.
pub fn template_from(sections: &[(&str, &[&str])]) -> DocumentMap {
    sections
        .iter()
        .map(|(title, keys)| {
            let keys = keys.iter().map(|key| (key.to_string(), None)).collect();
            (title.to_string(), keys)
        })
        .collect()
}
