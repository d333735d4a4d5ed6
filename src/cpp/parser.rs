use super::token::{render, Token};
use super::ParsedDeclaration;
use crate::classify::EntityKind;
use crate::error::ParseError;

type ParseResult<T> = Result<T, ParseError>;

fn unexpected(tok: Option<&Token>, context: &str) -> ParseError {
    match tok {
        Some(t) => ParseError::new(format!("unexpected '{}' {}", t, context)),
        None => ParseError::new(format!("unexpected end of declaration {}", context)),
    }
}

/// Index just past the bracket group opened at `open`. Nested groups of any
/// bracket kind are skipped; angle brackets only count when `open` is `<`.
fn skip_group(tokens: &[Token], open: usize) -> ParseResult<usize> {
    let (opener, closer) = match tokens[open].text() {
        "(" => ("(", ")"),
        "[" => ("[", "]"),
        "{" => ("{", "}"),
        "<" => ("<", ">"),
        other => return Err(ParseError::new(format!("'{}' does not open a group", other))),
    };
    let mut depth = 0usize;
    let mut i = open;
    while i < tokens.len() {
        let t = &tokens[i];
        if t.is(opener) {
            depth += 1;
        } else if t.is(closer) {
            depth -= 1;
            if depth == 0 {
                return Ok(i + 1);
            }
        } else if opener == "<" && matches!(t.text(), "(" | "[" | "{") {
            i = skip_group(tokens, i)?;
            continue;
        }
        i += 1;
    }
    Err(ParseError::new(format!("expected '{}' to close '{}'", closer, opener)))
}

/// Leading `template<...>` prefixes, rendered, and the index after them.
fn template_prefixes(tokens: &[Token]) -> ParseResult<(Vec<String>, usize)> {
    let mut prefixes = Vec::new();
    let mut i = 0;
    while tokens.get(i).is_some_and(|t| t.is("template")) {
        if !tokens.get(i + 1).is_some_and(|t| t.is("<")) {
            return Err(unexpected(tokens.get(i + 1), "after 'template', expected '<'"));
        }
        let end = skip_group(tokens, i + 1)?;
        prefixes.push(format!("template<{}>", render(&tokens[i + 2..end - 1])));
        i = end;
    }
    Ok((prefixes, i))
}

/// Split on top-level commas.
fn split_list(tokens: &[Token]) -> ParseResult<Vec<&[Token]>> {
    let mut items = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i < tokens.len() {
        match tokens[i].text() {
            "(" | "[" | "{" | "<" => {
                i = skip_group(tokens, i)?;
                continue;
            }
            "," => {
                items.push(&tokens[start..i]);
                start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }
    items.push(&tokens[start..]);
    Ok(items)
}

/// Tokens allowed in a type outside any bracket group.
fn check_type_tokens(tokens: &[Token], context: &str) -> ParseResult<()> {
    let mut i = 0;
    while i < tokens.len() {
        let t = &tokens[i];
        match t.text() {
            "<" | "(" | "[" => i = skip_group(tokens, i)?,
            "::" | "*" | "&" | "&&" | "..." => i += 1,
            _ if t.is_ident() => i += 1,
            _ => return Err(unexpected(Some(t), context)),
        }
    }
    Ok(())
}

/// Start index of the (possibly qualified) name ending at `end`.
fn qualified_name_start(tokens: &[Token], end: usize) -> usize {
    let mut s = end;
    if s > 0 && tokens[s - 1].is("~") {
        s -= 1;
    }
    while s >= 2 && tokens[s - 1].is("::") {
        let before = &tokens[s - 2];
        if before.is_ident() {
            s -= 2;
        } else if before.is(">") {
            // walk back over template arguments of a qualifier
            let mut depth = 0usize;
            let mut j = s - 2;
            loop {
                if tokens[j].is(">") {
                    depth += 1;
                } else if tokens[j].is("<") {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                if j == 0 {
                    return s;
                }
                j -= 1;
            }
            if j == 0 || !tokens[j - 1].is_ident() {
                return s;
            }
            s = j - 1;
        } else {
            break;
        }
    }
    if s == 1 && tokens[0].is("::") {
        s = 0;
    }
    s
}

/// Where the parameter list starts and where the name starts, plus the
/// canonical name text.
struct NameSpan {
    start: usize,
    name: String,
    params_open: usize,
}

fn find_function_name(tokens: &[Token]) -> ParseResult<NameSpan> {
    let mut i = 0;
    while i < tokens.len() {
        let t = &tokens[i];
        if t.is("operator") {
            let mut k = i + 1;
            if tokens.get(k).is_some_and(|t| t.is("("))
                && tokens.get(k + 1).is_some_and(|t| t.is(")"))
            {
                k += 2;
            }
            while k < tokens.len() && !tokens[k].is("(") {
                k += 1;
            }
            if k == i + 1 || k >= tokens.len() {
                return Err(ParseError::new("expected operator symbol and parameter list"));
            }
            let mut name = String::from("operator");
            let mut prev_word = true;
            for op in &tokens[i + 1..k] {
                if prev_word && op.is_word() {
                    name.push(' ');
                }
                name.push_str(op.text());
                prev_word = op.is_word();
            }
            let start = qualified_name_start(tokens, i);
            let qualifier = render(&tokens[start..i]);
            return Ok(NameSpan {
                start,
                name: qualifier + &name,
                params_open: k,
            });
        }
        match t.text() {
            "<" | "[" => {
                i = skip_group(tokens, i)?;
                continue;
            }
            "(" => {
                if i == 0 {
                    return Err(ParseError::new("expected function name before '('"));
                }
                if !tokens[i - 1].is_ident() {
                    return Err(unexpected(
                        Some(&tokens[i - 1]),
                        "before parameter list, expected identifier",
                    ));
                }
                let start = qualified_name_start(tokens, i - 1);
                return Ok(NameSpan {
                    start,
                    name: render(&tokens[start..i]),
                    params_open: i,
                });
            }
            _ => i += 1,
        }
    }
    Err(ParseError::new("expected function parameter list"))
}

/// Qualifiers after `)`, and the trailing return type if any.
fn function_suffix(tokens: &[Token]) -> ParseResult<(Vec<Token>, Vec<Token>)> {
    let mut suffix = Vec::new();
    let mut i = 0;
    while i < tokens.len() {
        let t = &tokens[i];
        match t.text() {
            "const" | "volatile" | "override" | "final" | "&" | "&&" => {
                suffix.push(t.clone());
                i += 1;
            }
            "noexcept" | "throw" => {
                suffix.push(t.clone());
                i += 1;
                if tokens.get(i).is_some_and(|t| t.is("(")) {
                    let end = skip_group(tokens, i)?;
                    suffix.extend_from_slice(&tokens[i..end]);
                    i = end;
                } else if t.is("throw") {
                    return Err(unexpected(tokens.get(i), "after 'throw', expected '('"));
                }
            }
            "=" => {
                match tokens.get(i + 1) {
                    Some(v) if v.is("0") || v.is("default") || v.is("delete") => {
                        suffix.extend_from_slice(&tokens[i..i + 2]);
                    }
                    other => return Err(unexpected(other, "after '=' in function declaration")),
                }
                i += 2;
            }
            "->" => {
                let trailing = &tokens[i + 1..];
                if trailing.is_empty() {
                    return Err(ParseError::new("expected trailing return type after '->'"));
                }
                check_type_tokens(trailing, "in trailing return type")?;
                return Ok((suffix, trailing.to_vec()));
            }
            _ => return Err(unexpected(Some(t), "after parameter list")),
        }
    }
    Ok((suffix, Vec::new()))
}

pub(super) fn parse_function(tokens: &[Token]) -> ParseResult<ParsedDeclaration> {
    if tokens.is_empty() {
        return Err(ParseError::new("expected declaration, got nothing"));
    }
    let (templates, body_start) = template_prefixes(tokens)?;
    let body = &tokens[body_start..];

    let span = find_function_name(body)?;

    let mut marker_start = span.start;
    while marker_start > 0 && matches!(body[marker_start - 1].text(), "*" | "&" | "&&") {
        marker_start -= 1;
    }
    let specifiers = &body[..marker_start];
    check_type_tokens(specifiers, "in return type")?;

    let params_end = skip_group(body, span.params_open)?;
    let param_tokens = &body[span.params_open + 1..params_end - 1];
    let mut params = Vec::new();
    if !param_tokens.is_empty() {
        for param in split_list(param_tokens)? {
            if param.is_empty() {
                return Err(ParseError::new("expected parameter between ','"));
            }
            params.push(render(param));
        }
    }

    let (suffix, trailing) = function_suffix(&body[params_end..])?;

    let markers: String = body[marker_start..span.start]
        .iter()
        .map(Token::text)
        .collect();
    let mut declarator = format!("{}{}({})", markers, span.name, params.join(", "));
    if !suffix.is_empty() {
        declarator.push(' ');
        declarator.push_str(&render(&suffix));
    }
    if !trailing.is_empty() {
        declarator.push_str(" -> ");
        declarator.push_str(&render(&trailing));
    }

    Ok(ParsedDeclaration {
        kind: EntityKind::Function,
        templates,
        specifiers: render(specifiers),
        declarator,
    })
}

const ACCESS: &[&str] = &["public", "protected", "private", "virtual"];

pub(super) fn parse_class(tokens: &[Token]) -> ParseResult<ParsedDeclaration> {
    let (templates, body_start) = template_prefixes(tokens)?;
    let body = &tokens[body_start..];

    let mut i = 0;
    if body.first().is_some_and(|t| t.is("::")) {
        i += 1;
    }
    loop {
        match body.get(i) {
            Some(t) if t.is_ident() && !ACCESS.contains(&t.text()) => i += 1,
            other => return Err(unexpected(other, "in class name, expected identifier")),
        }
        if body.get(i).is_some_and(|t| t.is("<")) {
            i = skip_group(body, i)?;
        }
        if body.get(i).is_some_and(|t| t.is("::")) {
            i += 1;
        } else {
            break;
        }
    }
    let mut declarator = render(&body[..i]);

    if body.get(i).is_some_and(|t| t.is("final")) {
        declarator.push_str(" final");
        i += 1;
    }

    if body.get(i).is_some_and(|t| t.is(":")) {
        let bases_tokens = &body[i + 1..];
        if bases_tokens.is_empty() {
            return Err(ParseError::new("expected base class after ':'"));
        }
        let mut bases = Vec::new();
        for base in split_list(bases_tokens)? {
            let name_at = base
                .iter()
                .position(|t| !ACCESS.contains(&t.text()))
                .ok_or_else(|| ParseError::new("expected base class name"))?;
            check_type_tokens(&base[name_at..], "in base class")?;
            bases.push(render(base));
        }
        declarator.push_str(" : ");
        declarator.push_str(&bases.join(", "));
    } else if let Some(t) = body.get(i) {
        return Err(unexpected(Some(t), "in class declaration"));
    }

    Ok(ParsedDeclaration {
        kind: EntityKind::Class,
        templates,
        specifiers: String::new(),
        declarator,
    })
}
