use regex::Regex;
use srcview::providers::{DeclarationLinker, DeclarationOutline, LexicalStyler, SourceIndex};
use srcview::render::{render_body, RenderContext};
use srcview::{
    compose, BatchDriver, Composition, LinkTarget, NestingPolicy, PageAssembler, RunProducer,
    StyleRun,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tempfile::TempDir;

static RE_LINENO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<span class="lineno" id="line-\d+">\d+</span> "#).unwrap());
static RE_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());
static RE_TAG_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<(/?)([a-z]+)[^>]*>").unwrap());

const TRICKY: &[&str] = &[
    "",
    "\n",
    "x=1",
    "a\n\n\nb",
    "if a < b and c > d: s = \"q\" + 'r' & x\n",
    "def f():\n    \"\"\"Doc <b>\"\"\"\n    return 'é' # naïve\n",
    "class A:\n    def m(self): return A().m()\n\nLIMIT = 3 << 1\n",
    "s = \"\"\"unterminated\n<tag> &amp;\n",
    "\r\nwindows\r\nlines\r\n",
];

/// Remove line numbers and markup, then undo entity escaping.
fn strip(html: &str) -> String {
    let text = RE_LINENO.replace_all(html, "");
    let text = RE_TAG.replace_all(&text, "");
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

fn assert_balanced(html: &str) {
    let mut stack: Vec<String> = Vec::new();
    for caps in RE_TAG_NAME.captures_iter(html) {
        if caps[1].is_empty() {
            stack.push(caps[2].to_string());
        } else {
            assert_eq!(
                stack.pop().as_deref(),
                Some(&caps[2]),
                "crossed or stray close tag in {}",
                html
            );
        }
    }
    assert!(stack.is_empty(), "unclosed {:?} in {}", stack, html);
}

fn assert_tiles(composition: &Composition, len: usize) {
    let mut pos = 0;
    for span in &composition.spans {
        assert_eq!(span.start, pos);
        assert!(span.end > span.start);
        pos = span.end;
    }
    assert_eq!(pos, len);
}

/// Deterministic pseudo-random runs, overlapping every which way.
fn scrambled_runs(source: &str, seed: u64, count: usize) -> Vec<StyleRun> {
    let boundaries: Vec<usize> = source
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(source.len()))
        .collect();
    let mut state = seed;
    let mut next = |bound: usize| {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        ((state >> 33) as usize) % bound
    };

    let classes = ["keyword", "string", "comment", "identifier"];
    let mut runs = Vec::new();
    for n in 0..count {
        let a = boundaries[next(boundaries.len())];
        let b = boundaries[next(boundaries.len())];
        let (start, end) = (a.min(b), a.max(b));
        let run = match n % 5 {
            0 => StyleRun::link(
                start,
                end,
                LinkTarget::new("/out/other.py.html", Some(format!("t-{}", n))),
            ),
            1 => StyleRun::anchor(start, end, format!("a-{}", n)),
            _ => StyleRun::styled(start, end, classes[next(classes.len())]),
        };
        runs.push(run.with_tooltip("x < y & \"z\"\n"));
    }
    runs
}

fn render(source: &str, runs: &[StyleRun], policy: NestingPolicy) -> String {
    let composition = compose(source, runs, policy).unwrap();
    assert_tiles(&composition, source.len());
    render_body(source, &composition, &RenderContext::new("/out/this.py.html"))
}

#[test]
fn scrambled_runs_render_well_formed_and_faithful() {
    for source in TRICKY {
        for seed in 0..20 {
            let runs = scrambled_runs(source, seed, 12);
            for policy in [NestingPolicy::LinksInnermost, NestingPolicy::LinksOutermost] {
                let html = render(source, &runs, policy);
                assert_balanced(&html);
                assert_eq!(strip(&html), *source, "seed {}", seed);
            }
        }
    }
}

#[test]
fn real_producers_render_well_formed_and_faithful() {
    let mut index = SourceIndex::default();
    for (n, source) in TRICKY.iter().enumerate() {
        index.add_file(PathBuf::from(format!("/proj/f{}.py", n)), source);
    }
    let linker = DeclarationLinker::new(&index, PageAssembler::new("/proj", "/out"));

    for (n, source) in TRICKY.iter().enumerate() {
        let path = PathBuf::from(format!("/proj/f{}.py", n));
        let mut runs = LexicalStyler.runs(&path, source);
        runs.extend(linker.runs(&path, source));
        let html = render(source, &runs, NestingPolicy::default());
        assert_balanced(&html);
        assert_eq!(strip(&html), *source);
    }
}

#[test]
fn special_characters_never_appear_raw_in_text() {
    for source in TRICKY {
        let runs = LexicalStyler.runs(Path::new("/proj/t.py"), source);
        let html = render(source, &runs, NestingPolicy::default());
        let text = RE_TAG.replace_all(&html, "");
        for raw in ['<', '>', '"', '\''] {
            assert!(!text.contains(raw), "raw {:?} in {:?}", raw, text);
        }
    }
}

#[test]
fn identifier_operator_number_scenario() {
    let source = "x=1";
    let runs = vec![
        StyleRun::styled(0, 1, "identifier"),
        StyleRun::styled(1, 2, "operator"),
        StyleRun::styled(2, 3, "number"),
    ];
    assert_eq!(
        render(source, &runs, NestingPolicy::default()),
        "<span class=\"lineno\" id=\"line-1\">1</span> <span class=\"identifier\">x</span><span class=\"operator\">=</span><span class=\"number\">1</span>"
    );
}

#[test]
fn link_nests_inside_keyword() {
    let source = "abcdefghij";
    let runs = vec![
        StyleRun::styled(0, 10, "keyword"),
        StyleRun::link(5, 8, LinkTarget::new("/out/pkg/b.py.html", None)),
    ];
    let composition = compose(source, &runs, NestingPolicy::default()).unwrap();
    let ranges: Vec<(usize, usize, usize)> = composition
        .spans
        .iter()
        .map(|s| (s.start, s.end, s.active.len()))
        .collect();
    assert_eq!(ranges, vec![(0, 5, 1), (5, 8, 2), (8, 10, 1)]);

    let html = render_body(source, &composition, &RenderContext::new("/out/this.py.html"));
    assert!(html.ends_with(
        "<span class=\"keyword\">abcde<a href=\"pkg/b.py.html\">fgh</a>ij</span>"
    ));
}

#[test]
fn empty_file_page() {
    let assembler = PageAssembler::new("/proj", "/out");
    let composition = compose("", &[], NestingPolicy::default()).unwrap();
    let body = render_body("", &composition, &RenderContext::new("/out/empty.py.html"));
    let page = assembler
        .assemble(Path::new("/proj/empty.py"), &body, "")
        .unwrap();
    assert!(page
        .html
        .contains("<pre><span class=\"lineno\" id=\"line-1\">1</span> </pre>"));
}

#[test]
fn batch_continues_past_file_deleted_after_indexing() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("proj");
    fs::create_dir_all(&root).unwrap();
    fs::write(root.join("a.py"), "def a():\n    return b()\n").unwrap();
    fs::write(root.join("b.py"), "def b():\n    return 1\n").unwrap();

    let index = SourceIndex::build(&[&root]).unwrap();
    fs::remove_file(root.join("b.py")).unwrap();

    let root = root.canonicalize().unwrap();
    let out = dir.path().join("out");
    let pages = PageAssembler::new(&root, &out);
    let linker = DeclarationLinker::new(&index, pages.clone());
    let outline = DeclarationOutline::new(&index);
    let report = BatchDriver::new(&index, &outline, pages)
        .producer(&LexicalStyler)
        .producer(&linker)
        .run()
        .unwrap();

    assert_eq!(report.written, 1);
    assert_eq!(report.failed, 1);
    let html = fs::read_to_string(out.join("a.py.html")).unwrap();
    assert!(html.contains("href=\"b.py.html#decl-b-1\""));
    assert!(!out.join("b.py.html").exists());
}

#[test]
fn declaration_named_line_keeps_line_ids_unique() {
    let source = "def line():\n    pass\n";
    let path = PathBuf::from("/proj/lines.py");
    let mut index = SourceIndex::default();
    index.add_file(path.clone(), source);
    let linker = DeclarationLinker::new(&index, PageAssembler::new("/proj", "/out"));

    let mut runs = LexicalStyler.runs(&path, source);
    runs.extend(linker.runs(&path, source));
    let html = render(source, &runs, NestingPolicy::default());

    assert_eq!(html.matches("id=\"line-1\"").count(), 1);
    assert!(html.contains("<span id=\"decl-line-1\">line</span>"));
}
