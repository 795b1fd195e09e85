//! Regex tokenizer and lexical styler for Python-like sources.

use super::RunProducer;
use crate::model::StyleRun;
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

// -- Token patterns -----------------------------------------------------------

// Leftmost-first alternation: earlier groups win at the same offset.
static RE_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r#"(?P<triple>[rRbBuUfF]{0,2}(?:"""(?s:.*?)"""|'''(?s:.*?)'''|"""(?s:.*)|'''(?s:.*)))"#,
        r#"|(?P<string>[rRbBuUfF]{0,2}(?:"(?:[^"\\\n]|\\(?s:.))*"?|'(?:[^'\\\n]|\\(?s:.))*'?))"#,
        r"|(?P<comment>#[^\n]*)",
        r"|(?P<decorator>@[\w--\d][\w.]*)",
        r"|(?P<number>0[xXoObB][0-9a-fA-F_]+|\d[\d_]*(?:\.[\d_]*)?(?:[eE][+-]?\d+)?[jJ]?|\.\d[\d_]*(?:[eE][+-]?\d+)?[jJ]?)",
        r"|(?P<name>[\w--\d]\w*)",
        r"|(?P<operator>[-+*/%=<>!&|^~]+)",
    ))
    .unwrap()
});

const KEYWORDS: &[&str] = &[
    "and", "as", "assert", "async", "await", "break", "class", "continue", "def", "del", "elif",
    "else", "except", "exec", "finally", "for", "from", "global", "if", "import", "in", "is",
    "lambda", "nonlocal", "not", "or", "pass", "print", "raise", "return", "try", "while", "with",
    "yield",
];

const CONSTANTS: &[&str] = &["None", "True", "False", "NotImplemented", "Ellipsis"];

const BUILTINS: &[&str] = &[
    "abs", "all", "any", "bool", "bytes", "callable", "chr", "dict", "dir", "enumerate", "filter",
    "float", "format", "frozenset", "getattr", "hasattr", "hash", "id", "input", "int",
    "isinstance", "issubclass", "iter", "len", "list", "map", "max", "min", "next", "object",
    "open", "ord", "pow", "range", "repr", "reversed", "round", "set", "setattr", "sorted", "str",
    "sum", "super", "tuple", "type", "zip", "self", "cls",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    TripleString,
    String,
    Comment,
    Decorator,
    Number,
    Name,
    Operator,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
}

impl Token {
    pub fn text<'s>(&self, source: &'s str) -> &'s str {
        &source[self.start..self.end]
    }
}

/// Split `source` into styled tokens. Whitespace and delimiters are skipped.
pub fn tokenize(source: &str) -> Vec<Token> {
    let groups = [
        ("triple", TokenKind::TripleString),
        ("string", TokenKind::String),
        ("comment", TokenKind::Comment),
        ("decorator", TokenKind::Decorator),
        ("number", TokenKind::Number),
        ("name", TokenKind::Name),
        ("operator", TokenKind::Operator),
    ];
    RE_TOKEN
        .captures_iter(source)
        .filter_map(|caps| {
            groups.iter().find_map(|(group, kind)| {
                caps.name(group).map(|m| Token {
                    kind: *kind,
                    start: m.start(),
                    end: m.end(),
                })
            })
        })
        .collect()
}

pub fn is_keyword(name: &str) -> bool {
    KEYWORDS.contains(&name)
}

pub fn is_constant(name: &str) -> bool {
    CONSTANTS.contains(&name)
}

/// Only whitespace between the start of the line and `offset`.
pub fn starts_line(source: &str, offset: usize) -> bool {
    let line_start = source[..offset].rfind('\n').map_or(0, |i| i + 1);
    source[line_start..offset].chars().all(|c| c == ' ' || c == '\t')
}

/// Lexical highlighting as style runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct LexicalStyler;

impl LexicalStyler {
    fn class_for(&self, source: &str, token: &Token, previous: Option<&str>) -> &'static str {
        match token.kind {
            TokenKind::TripleString if starts_line(source, token.start) => "doc-string",
            TokenKind::TripleString | TokenKind::String => "string",
            TokenKind::Comment => "comment",
            TokenKind::Decorator => "decorator",
            TokenKind::Number => "number",
            TokenKind::Operator => "operator",
            TokenKind::Name => {
                let text = token.text(source);
                if is_keyword(text) {
                    "keyword"
                } else if is_constant(text) {
                    "constant"
                } else if previous == Some("def") {
                    "function"
                } else if previous == Some("class") {
                    "type-name"
                } else if BUILTINS.contains(&text) {
                    "builtin"
                } else {
                    "identifier"
                }
            }
        }
    }
}

impl RunProducer for LexicalStyler {
    fn name(&self) -> &str {
        "styler"
    }

    fn runs(&self, _path: &Path, source: &str) -> Vec<StyleRun> {
        let mut runs = Vec::new();
        let mut previous: Option<&str> = None;
        for token in tokenize(source) {
            let class = self.class_for(source, &token, previous);
            runs.push(StyleRun::styled(token.start, token.end, class));
            previous = match token.kind {
                TokenKind::Name => Some(token.text(source)),
                _ => None,
            };
        }
        runs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RunKind;

    fn classes(source: &str) -> Vec<(String, String)> {
        LexicalStyler
            .runs(Path::new("t.py"), source)
            .into_iter()
            .map(|run| match run.kind {
                RunKind::Style(class) => (source[run.start..run.end].to_string(), class),
                other => panic!("unexpected kind {:?}", other),
            })
            .collect()
    }

    fn has(got: &[(String, String)], text: &str, class: &str) -> bool {
        got.iter().any(|(t, c)| t == text && c == class)
    }

    #[test]
    fn assignment() {
        let got = classes("x=1");
        assert_eq!(got.len(), 3);
        assert!(has(&got, "x", "identifier"));
        assert!(has(&got, "=", "operator"));
        assert!(has(&got, "1", "number"));
    }

    #[test]
    fn def_and_class_names() {
        let got = classes("class Foo(object):\n    def bar(self): pass\n");
        assert!(has(&got, "class", "keyword"));
        assert!(has(&got, "Foo", "type-name"));
        assert!(has(&got, "object", "builtin"));
        assert!(has(&got, "bar", "function"));
        assert!(has(&got, "pass", "keyword"));
    }

    #[test]
    fn docstring_versus_string() {
        let got = classes("def f():\n    \"\"\"Doc.\"\"\"\n    return '''x'''\n");
        assert!(has(&got, "\"\"\"Doc.\"\"\"", "doc-string"));
        assert!(has(&got, "'''x'''", "string"));
    }

    #[test]
    fn comments_hide_code() {
        let got = classes("# def not_a_def():\nNone");
        assert_eq!(got.len(), 2);
        assert!(has(&got, "# def not_a_def():", "comment"));
        assert!(has(&got, "None", "constant"));
    }

    #[test]
    fn strings_with_escapes_and_prefixes() {
        let got = classes(r#"s = r"a\"b" + b'c'"#);
        assert!(has(&got, r#"r"a\"b""#, "string"));
        assert!(has(&got, "b'c'", "string"));
    }

    #[test]
    fn unterminated_triple_string_runs_to_eof() {
        let source = "x = \"\"\"open\nstill open";
        let tokens = tokenize(source);
        let last = tokens.last().unwrap();
        assert_eq!(last.kind, TokenKind::TripleString);
        assert_eq!(last.end, source.len());
    }

    #[test]
    fn decorators_and_numbers() {
        let got = classes("@app.route\nx = 0x1F + 3.5e-2 + 2j");
        assert!(has(&got, "@app.route", "decorator"));
        assert!(has(&got, "0x1F", "number"));
        assert!(has(&got, "3.5e-2", "number"));
        assert!(has(&got, "2j", "number"));
    }

    #[test]
    fn unicode_identifiers_keep_char_boundaries() {
        let source = "naïve = 'é'";
        for run in LexicalStyler.runs(Path::new("t.py"), source) {
            assert!(run.validate(source).is_ok());
        }
    }
}
