//! # CDL Grammar
//!
//! nom-based parser for the CDL definition-file surface. Parsing happens
//! in two stages: the combinators below produce a raw item stream, and
//! [`assemble`] turns it into a validated [`DefinitionFile`], rejecting
//! duplicate names, unknown type keywords, undeclared dimension
//! references, and attribute lines bound to undeclared variables.

use std::path::Path;

use nom::{
    branch::alt,
    bytes::complete::{tag, tag_no_case, take_until, take_while},
    character::complete::{alpha1, alphanumeric1, char, digit1, multispace1, none_of, one_of},
    combinator::{eof, map, opt, recognize, value, verify},
    error::{context, VerboseError, VerboseErrorKind},
    multi::{many0, separated_list1},
    sequence::{delimited, pair, preceded, tuple},
    Finish, IResult,
};

use tsi_core::{AttrValue, DefinitionFile, Dimension, DimensionSize, VarType, Variable};

use crate::error::ParseError;

type PResult<'a, T> = IResult<&'a str, T, VerboseError<&'a str>>;

/// A variable declaration before type-keyword resolution.
#[derive(Debug)]
struct RawDecl {
    type_keyword: String,
    name: String,
    shape: Vec<String>,
}

/// One line of the variables section, in source order.
#[derive(Debug)]
enum VarItem {
    Decl(RawDecl),
    Attr {
        owner: String,
        key: String,
        value: AttrValue,
    },
}

/// The raw parse result, before structural validation.
#[derive(Debug)]
struct RawFile {
    name: String,
    globals: Vec<(String, AttrValue)>,
    dimensions: Vec<(String, DimensionSize)>,
    items: Vec<VarItem>,
}

/// Parse a definition from CDL source text.
pub fn parse_definition(input: &str) -> Result<DefinitionFile, ParseError> {
    match file_internal(input).finish() {
        Ok((_, raw)) => assemble(raw),
        Err(e) => Err(syntax_error(input, e)),
    }
}

/// Parse a definition from a CDL file on disk.
pub fn parse_definition_file(path: &Path) -> Result<DefinitionFile, ParseError> {
    let source = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ParseError::FileNotFound {
                path: path.display().to_string(),
            }
        } else {
            ParseError::Io(e)
        }
    })?;

    parse_definition(&source)
}

/// Whitespace and `//` comments, possibly empty.
fn sp(input: &str) -> PResult<'_, &str> {
    recognize(many0(alt((
        multispace1,
        preceded(tag("//"), take_while(|c| c != '\n')),
    ))))(input)
}

/// Whitespace and comments, at least one character.
fn sp1(input: &str) -> PResult<'_, &str> {
    verify(sp, |s: &&str| !s.is_empty())(input)
}

/// An identifier: letter or underscore, then letters, digits, underscores.
fn identifier(input: &str) -> PResult<'_, String> {
    map(
        recognize(pair(
            alt((alpha1, tag("_"))),
            many0(alt((alphanumeric1, tag("_")))),
        )),
        str::to_string,
    )(input)
}

/// A double-quoted string literal with backslash escapes.
fn string_literal(input: &str) -> PResult<'_, String> {
    delimited(
        char('"'),
        map(
            many0(alt((
                value('\n', tag("\\n")),
                value('\t', tag("\\t")),
                value('"', tag("\\\"")),
                value('\\', tag("\\\\")),
                none_of("\"\\"),
            ))),
            |chars| chars.into_iter().collect(),
        ),
        char('"'),
    )(input)
}

/// A numeric literal: integer or floating-point, with optional sign,
/// exponent, and an ignored CDL width suffix (`0.0f`, `3s`).
fn number(input: &str) -> PResult<'_, AttrValue> {
    let (input, token) = recognize(tuple((
        opt(one_of("+-")),
        alt((
            recognize(tuple((digit1, opt(pair(char('.'), opt(digit1)))))),
            recognize(pair(char('.'), digit1)),
        )),
        opt(tuple((one_of("eE"), opt(one_of("+-")), digit1))),
    )))(input)?;
    let (input, _) = opt(one_of("fFdDsSlLbBuU"))(input)?;

    let attr = if token.contains(['.', 'e', 'E']) {
        AttrValue::Float(token.parse::<f64>().unwrap_or(f64::NAN))
    } else {
        match token.parse::<i64>() {
            Ok(i) => AttrValue::Int(i),
            // Out of i64 range; widen to float.
            Err(_) => AttrValue::Float(token.parse::<f64>().unwrap_or(f64::NAN)),
        }
    };
    Ok((input, attr))
}

/// An attribute value: a string literal, a number, or a comma-separated
/// numeric list.
fn attr_value(input: &str) -> PResult<'_, AttrValue> {
    context(
        "attribute value",
        alt((
            map(string_literal, AttrValue::Text),
            map(
                separated_list1(tuple((sp, char(','), sp)), number),
                |mut values| {
                    if values.len() == 1 {
                        values.remove(0)
                    } else {
                        AttrValue::List(values)
                    }
                },
            ),
        )),
    )(input)
}

/// A global attribute line: `:key = value ;`
fn global_attr(input: &str) -> PResult<'_, (String, AttrValue)> {
    let (input, _) = char(':')(input)?;
    let (input, key) = context("global attribute", identifier)(input)?;
    let (input, _) = sp(input)?;
    let (input, _) = char('=')(input)?;
    let (input, _) = sp(input)?;
    let (input, value) = attr_value(input)?;
    let (input, _) = sp(input)?;
    let (input, _) = char(';')(input)?;
    Ok((input, (key, value)))
}

/// A dimension size: `UNLIMITED`, the `_` placeholder, or a decimal count.
fn dimension_size(input: &str) -> PResult<'_, DimensionSize> {
    context(
        "dimension size",
        alt((
            value(DimensionSize::Unlimited, tag_no_case("UNLIMITED")),
            value(DimensionSize::Unlimited, tag("_")),
            map(digit1, |digits: &str| {
                DimensionSize::Fixed(digits.parse::<u64>().unwrap_or(u64::MAX))
            }),
        )),
    )(input)
}

/// A dimension entry: `name = size ;`
fn dimension_entry(input: &str) -> PResult<'_, (String, DimensionSize)> {
    let (input, name) = identifier(input)?;
    let (input, _) = sp(input)?;
    let (input, _) = char('=')(input)?;
    let (input, _) = sp(input)?;
    let (input, size) = dimension_size(input)?;
    let (input, _) = sp(input)?;
    let (input, _) = char(';')(input)?;
    Ok((input, (name, size)))
}

/// A variable declaration: `type name(dim, ...) ;` or `type name ;`
fn var_decl(input: &str) -> PResult<'_, VarItem> {
    let (input, type_keyword) = identifier(input)?;
    let (input, _) = sp1(input)?;
    let (input, name) = identifier(input)?;
    let (input, shape) = opt(delimited(
        pair(char('('), sp),
        separated_list1(tuple((sp, char(','), sp)), identifier),
        pair(sp, char(')')),
    ))(input)?;
    let (input, _) = sp(input)?;
    let (input, _) = char(';')(input)?;
    Ok((
        input,
        VarItem::Decl(RawDecl {
            type_keyword,
            name,
            shape: shape.unwrap_or_default(),
        }),
    ))
}

/// A variable attribute line: `owner:key = value ;`
fn var_attr(input: &str) -> PResult<'_, VarItem> {
    let (input, owner) = identifier(input)?;
    let (input, _) = char(':')(input)?;
    let (input, key) = identifier(input)?;
    let (input, _) = sp(input)?;
    let (input, _) = char('=')(input)?;
    let (input, _) = sp(input)?;
    let (input, value) = attr_value(input)?;
    let (input, _) = sp(input)?;
    let (input, _) = char(';')(input)?;
    Ok((input, VarItem::Attr { owner, key, value }))
}

/// The complete file: header, global attributes, sections, closing brace.
fn file_internal(input: &str) -> PResult<'_, RawFile> {
    let (input, _) = sp(input)?;
    let (input, _) = context("definition header", tag("netcdf"))(input)?;
    let (input, _) = sp1(input)?;
    let (input, name) = context("definition name", identifier)(input)?;
    let (input, _) = sp(input)?;
    let (input, _) = char('{')(input)?;

    let (input, globals) = many0(preceded(sp, global_attr))(input)?;

    let (input, dimensions) = map(
        opt(preceded(
            preceded(sp, tag("dimensions:")),
            many0(preceded(sp, dimension_entry)),
        )),
        Option::unwrap_or_default,
    )(input)?;

    let (input, items) = map(
        opt(preceded(
            preceded(sp, tag("variables:")),
            many0(preceded(sp, alt((var_attr, var_decl)))),
        )),
        Option::unwrap_or_default,
    )(input)?;

    // A data section may follow in hand-written files; its contents are
    // not part of the definition and are skipped up to the closing brace.
    let (input, _) = opt(preceded(
        preceded(sp, tag("data:")),
        take_until("}"),
    ))(input)?;

    let (input, _) = sp(input)?;
    let (input, _) = context("closing brace", char('}'))(input)?;
    let (input, _) = sp(input)?;
    let (input, _) = eof(input)?;

    Ok((
        input,
        RawFile {
            name,
            globals,
            dimensions,
            items,
        },
    ))
}

/// Turn the raw item stream into a validated [`DefinitionFile`].
fn assemble(raw: RawFile) -> Result<DefinitionFile, ParseError> {
    let mut global_attributes: Vec<(String, AttrValue)> = Vec::new();
    for (key, value) in raw.globals {
        if global_attributes.iter().any(|(k, _)| *k == key) {
            return Err(ParseError::DuplicateAttribute {
                owner: raw.name,
                key,
            });
        }
        global_attributes.push((key, value));
    }

    let mut dimensions: Vec<Dimension> = Vec::new();
    for (name, size) in raw.dimensions {
        if dimensions.iter().any(|d| d.name == name) {
            return Err(ParseError::DuplicateDimension { name });
        }
        if size == DimensionSize::Fixed(0) {
            return Err(ParseError::InvalidDimensionSize { name });
        }
        dimensions.push(Dimension { name, size });
    }

    let mut variables: Vec<Variable> = Vec::new();
    for item in raw.items {
        match item {
            VarItem::Decl(decl) => {
                if variables.iter().any(|v| v.name == decl.name) {
                    return Err(ParseError::DuplicateVariable { name: decl.name });
                }
                let var_type = VarType::from_keyword(&decl.type_keyword).ok_or_else(|| {
                    ParseError::UnknownType {
                        variable: decl.name.clone(),
                        keyword: decl.type_keyword.clone(),
                    }
                })?;
                for dim in &decl.shape {
                    if !dimensions.iter().any(|d| d.name == *dim) {
                        return Err(ParseError::UndeclaredDimension {
                            variable: decl.name.clone(),
                            dimension: dim.clone(),
                        });
                    }
                }
                variables.push(Variable {
                    name: decl.name,
                    var_type,
                    shape: decl.shape,
                    attributes: Vec::new(),
                });
            }
            VarItem::Attr { owner, key, value } => {
                let variable = variables
                    .iter_mut()
                    .find(|v| v.name == owner)
                    .ok_or_else(|| ParseError::UndeclaredVariable {
                        variable: owner.clone(),
                        key: key.clone(),
                    })?;
                if variable.attributes.iter().any(|(k, _)| *k == key) {
                    return Err(ParseError::DuplicateAttribute { owner, key });
                }
                variable.attributes.push((key, value));
            }
        }
    }

    Ok(DefinitionFile {
        name: raw.name,
        global_attributes,
        dimensions,
        variables,
    })
}

/// Convert a nom error into a located [`ParseError::Syntax`].
fn syntax_error(source: &str, err: VerboseError<&str>) -> ParseError {
    let (rest, message) = match err.errors.first() {
        Some((rest, _)) => {
            let label = err.errors.iter().rev().find_map(|(_, kind)| match kind {
                VerboseErrorKind::Context(c) => Some(*c),
                _ => None,
            });
            let message = match label {
                Some(c) => format!("expected {c}"),
                None => "malformed definition".to_string(),
            };
            (*rest, message)
        }
        None => (source, "malformed definition".to_string()),
    };
    let (line, column) = locate(source, rest);
    ParseError::Syntax {
        line,
        column,
        message,
    }
}

/// 1-based line and column of the start of `rest` within `source`.
fn locate(source: &str, rest: &str) -> (usize, usize) {
    let offset = source.len().saturating_sub(rest.len());
    let consumed = &source[..offset.min(source.len())];
    let line = consumed.matches('\n').count() + 1;
    let column = match consumed.rfind('\n') {
        Some(pos) => offset - pos,
        None => offset + 1,
    };
    (line, column)
}
