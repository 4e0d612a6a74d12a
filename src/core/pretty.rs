//! Canonical HTML layout.
//!
//! This is a comparison aid, not a parser: markup is split into tags, text,
//! comments and raw-text elements, then laid out one block element per line
//! with inline content collapsed onto a single line. Formatting never fails
//! and formatting already-formatted output returns it unchanged.

/// Elements whose content flows within a line of text
const INLINE: &[&str] = &[
    "a", "abbr", "b", "bdi", "bdo", "br", "button", "cite", "code", "data", "del", "dfn", "em",
    "i", "img", "input", "ins", "kbd", "label", "mark", "q", "s", "samp", "select", "small",
    "span", "strong", "sub", "sup", "time", "u", "var", "wbr",
];

/// Elements that never have a closing tag
const VOID: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

/// Elements whose content is not markup
const RAW_TEXT: &[&str] = &["pre", "textarea", "script", "style"];

/// Raw-text elements whose whitespace is significant
const VERBATIM: &[&str] = &["pre", "textarea"];

/// Elements implicitly closed by a sibling of the same name
const AUTO_CLOSE: &[&str] = &["li", "p", "option", "tr", "td", "th", "dt", "dd"];

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Text(String),
    Open { name: String, tag: String, self_closing: bool },
    Close { name: String, tag: String },
    /// Comments, doctypes and processing instructions
    Markup(String),
    Raw { name: String, open: String, content: String, close: String },
}

/// Reformat `input` into a stable layout indented by `indent` spaces per level.
pub fn format_html(input: &str, indent: usize) -> String {
    let mut formatter = Formatter::new(indent);
    for token in tokenize(input) {
        formatter.push(token);
    }
    formatter.finish()
}

fn tokenize(input: &str) -> Vec<Token> {
    let bytes = input.as_bytes();
    let mut tokens = Vec::new();
    let mut text_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'<' {
            i += 1;
            continue;
        }
        match read_markup(input, i) {
            Some((token, end)) => {
                if text_start < i {
                    tokens.push(Token::Text(input[text_start..i].to_string()));
                }
                tokens.push(token);
                i = end;
                text_start = end;
            }
            // A stray '<' is ordinary text
            None => i += 1,
        }
    }

    if text_start < input.len() {
        tokens.push(Token::Text(input[text_start..].to_string()));
    }
    tokens
}

/// Read the markup construct starting at `start` (which holds a '<').
fn read_markup(input: &str, start: usize) -> Option<(Token, usize)> {
    let rest = &input[start..];

    if rest.starts_with("<!--") {
        return Some(match rest[4..].find("-->") {
            Some(pos) => {
                let end = start + 4 + pos + 3;
                (Token::Markup(input[start..end].to_string()), end)
            }
            // Unterminated at EOF: trailing whitespace would grow on every pass
            None => (Token::Markup(rest.trim_end().to_string()), input.len()),
        });
    }

    let mut chars = rest[1..].chars();
    match chars.next()? {
        '!' | '?' => {
            let end = find_tag_end(input, start)?;
            Some((Token::Markup(normalize_tag(&input[start..end])), end))
        }
        '/' => {
            if !chars.next()?.is_ascii_alphabetic() {
                return None;
            }
            let end = find_tag_end(input, start)?;
            let tag = normalize_tag(&input[start..end]);
            let name = tag_name(&tag[2..]);
            Some((Token::Close { name, tag }, end))
        }
        c if c.is_ascii_alphabetic() => {
            let end = find_tag_end(input, start)?;
            let tag = normalize_tag(&input[start..end]);
            let name = tag_name(&tag[1..]);
            let self_closing = tag.ends_with("/>");

            if RAW_TEXT.contains(&name.as_str()) && !self_closing {
                let (content, close, raw_end) = read_raw_text(input, end, &name);
                return Some((Token::Raw { name, open: tag, content, close }, raw_end));
            }
            Some((Token::Open { name, tag, self_closing }, end))
        }
        _ => None,
    }
}

/// Index just past the '>' closing the tag at `start`, honoring quoted
/// attribute values.
fn find_tag_end(input: &str, start: usize) -> Option<usize> {
    let mut quote: Option<char> = None;
    let mut last_significant = '<';

    for (offset, c) in input[start + 1..].char_indices() {
        match quote {
            Some(q) => {
                if c == q {
                    quote = None;
                    last_significant = c;
                }
            }
            None => {
                if c == '>' {
                    return Some(start + 1 + offset + 1);
                }
                if (c == '"' || c == '\'') && last_significant == '=' {
                    quote = Some(c);
                }
                if !c.is_whitespace() {
                    last_significant = c;
                }
            }
        }
    }
    None
}

/// Everything up to the matching close tag, the close tag, and the index after it.
fn read_raw_text(input: &str, from: usize, name: &str) -> (String, String, usize) {
    // ASCII lowercasing keeps byte offsets aligned with `input`
    let lower = input[from..].to_ascii_lowercase();
    let needle = format!("</{}", name);

    match lower.find(&needle) {
        Some(pos) => {
            let close_start = from + pos;
            let close_end = input[close_start..]
                .find('>')
                .map(|q| close_start + q + 1)
                .unwrap_or(input.len());
            (
                input[from..close_start].to_string(),
                normalize_tag(&input[close_start..close_end]),
                close_end,
            )
        }
        None => (input[from..].trim_end().to_string(), String::new(), input.len()),
    }
}

/// Collapse whitespace outside quoted values and drop it before the final `>`.
fn normalize_tag(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut quote: Option<char> = None;
    let mut pending_space = false;

    for c in raw.chars() {
        if let Some(q) = quote {
            out.push(c);
            if c == q {
                quote = None;
            }
            continue;
        }
        if c.is_whitespace() {
            pending_space = true;
            continue;
        }
        if pending_space {
            out.push(' ');
            pending_space = false;
        }
        if (c == '"' || c == '\'') && out.trim_end().ends_with('=') {
            quote = Some(c);
        }
        out.push(c);
    }

    // `<br / >` needs both rules, so repeat until neither applies
    loop {
        let len = out.len();
        if out.ends_with(" />") {
            out.replace_range(len - 3..len, "/>");
        } else if out.ends_with(" >") {
            out.replace_range(len - 2..len, ">");
        } else {
            return out;
        }
    }
}

fn tag_name(after_bracket: &str) -> String {
    after_bracket
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | ':' | '_'))
        .collect::<String>()
        .to_ascii_lowercase()
}

fn is_inline(name: &str) -> bool {
    INLINE.contains(&name)
}

struct Formatter {
    indent: usize,
    lines: Vec<String>,
    /// Inline content accumulated for the current line
    line: String,
    pending_space: bool,
    /// Open block elements
    stack: Vec<String>,
}

impl Formatter {
    fn new(indent: usize) -> Self {
        Self {
            indent,
            lines: Vec::new(),
            line: String::new(),
            pending_space: false,
            stack: Vec::new(),
        }
    }

    fn push(&mut self, token: Token) {
        match token {
            Token::Text(text) => self.push_words(&text),
            Token::Open { name, tag, self_closing } => {
                if is_inline(&name) {
                    self.push_fragment(&tag);
                    return;
                }
                self.flush();
                if AUTO_CLOSE.contains(&name.as_str()) && self.stack.last() == Some(&name) {
                    self.stack.pop();
                }
                self.emit(self.stack.len(), &tag);
                if !self_closing && !VOID.contains(&name.as_str()) {
                    self.stack.push(name);
                }
            }
            Token::Close { name, tag } => {
                if is_inline(&name) {
                    self.push_fragment(&tag);
                    return;
                }
                self.flush();
                if let Some(pos) = self.stack.iter().rposition(|open| *open == name) {
                    self.stack.truncate(pos);
                }
                self.emit(self.stack.len(), &tag);
            }
            Token::Markup(markup) => {
                self.flush();
                self.emit(self.stack.len(), &markup);
            }
            Token::Raw { name, open, content, close } => {
                self.flush();
                let depth = self.stack.len();
                if VERBATIM.contains(&name.as_str()) {
                    self.emit(depth, &format!("{}{}{}", open, content, close));
                    return;
                }
                self.emit(depth, &open);
                for line in content.lines().map(str::trim).filter(|l| !l.is_empty()) {
                    self.emit(depth + 1, line);
                }
                if !close.is_empty() {
                    self.emit(depth, &close);
                }
            }
        }
    }

    fn push_words(&mut self, text: &str) {
        for c in text.chars() {
            if c.is_whitespace() {
                self.pending_space = !self.line.is_empty();
                continue;
            }
            if self.pending_space {
                self.line.push(' ');
                self.pending_space = false;
            }
            self.line.push(c);
        }
    }

    fn push_fragment(&mut self, fragment: &str) {
        if self.pending_space {
            self.line.push(' ');
            self.pending_space = false;
        }
        self.line.push_str(fragment);
    }

    fn flush(&mut self) {
        if !self.line.is_empty() {
            let line = std::mem::take(&mut self.line);
            self.emit(self.stack.len(), &line);
        }
        self.pending_space = false;
    }

    fn emit(&mut self, depth: usize, content: &str) {
        self.lines
            .push(format!("{}{}", " ".repeat(depth * self.indent), content));
    }

    fn finish(mut self) -> String {
        self.flush();
        if self.lines.is_empty() {
            return String::new();
        }
        let mut out = self.lines.join("\n");
        out.push('\n');
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocks_are_indented_by_depth() {
        let html = "<html><body><div class=\"a\"><p>Hello <b>world</b></p></div></body></html>";
        let expected = "\
<html>
  <body>
    <div class=\"a\">
      <p>
        Hello <b>world</b>
      </p>
    </div>
  </body>
</html>
";
        assert_eq!(format_html(html, 2), expected);
    }

    #[test]
    fn test_whitespace_only_differences_vanish() {
        let compact = "<ul><li>One</li><li>Two  <a href=\"x\">link</a></li></ul>";
        let loose = "<ul>\n    <li>\n One\n</li>\n\t<li>Two\n<a   href=\"x\" >link</a>\n</li>\n</ul>\n\n";
        assert_eq!(format_html(compact, 2), format_html(loose, 2));
    }

    #[test]
    fn test_formatting_is_idempotent() {
        let html = r#"<!DOCTYPE html>
<html><head><meta charset="utf-8"><title>Docs</title>
<style>
   body { margin: 0; }
      h1 { color: red; }
</style></head>
<body><!-- generated --><h1 id='top'>API   <code>Foo</code></h1>
<pre>  keep
    this   spacing</pre>
<ul><li>first<li>second</ul><p>a < b and <br/> done</p>
<script>var x = "<div>";</script>
<custom-element data-x="1"   data-y='a b'></custom-element></body></html>"#;
        let once = format_html(html, 2);
        let twice = format_html(&once, 2);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_spaced_self_closing_tags_settle_in_one_pass() {
        let once = format_html("<div / ><br / >", 2);
        assert_eq!(once, "<div/>\n<br/>\n");
        assert_eq!(format_html(&once, 2), once);
    }

    #[test]
    fn test_unterminated_raw_content_is_stable() {
        for html in [
            "<!--",
            "<p>x</p><!-- dangling  \n",
            "<pre>  a\n  b\n\n",
            "<div><script>\n  var a = 1;\n",
            "<style>",
        ] {
            let once = format_html(html, 2);
            assert_eq!(format_html(&once, 2), once, "input {:?}", html);
        }
        assert_eq!(format_html("<!--", 2), "<!--\n");
    }

    #[test]
    fn test_preformatted_content_is_verbatim() {
        let html = "<div><pre>  a\n    b  </pre></div>";
        let out = format_html(html, 2);
        assert!(out.contains("  <pre>  a\n    b  </pre>"));
    }

    #[test]
    fn test_script_content_is_not_parsed_as_markup() {
        let html = "<script>\n  if (a < b) { document.write('<p>'); }\n</script>";
        let out = format_html(html, 4);
        assert_eq!(
            out,
            "<script>\n    if (a < b) { document.write('<p>'); }\n</script>\n"
        );
    }

    #[test]
    fn test_sibling_list_items_close_implicitly() {
        let out = format_html("<ul><li>a<li>b</ul>", 2);
        assert_eq!(out, "<ul>\n  <li>\n    a\n  <li>\n    b\n</ul>\n");
    }

    #[test]
    fn test_void_elements_do_not_indent() {
        let out = format_html("<head><meta charset=\"utf-8\"><link rel=\"x\"></head>", 2);
        assert_eq!(
            out,
            "<head>\n  <meta charset=\"utf-8\">\n  <link rel=\"x\">\n</head>\n"
        );
    }

    #[test]
    fn test_attribute_values_keep_their_spacing() {
        let out = format_html("<div  title=\"a   b\"   data-x = 'c  d' >x</div>", 2);
        assert!(out.starts_with("<div title=\"a   b\" data-x = 'c  d'>\n"));
    }

    #[test]
    fn test_unbalanced_markup_is_best_effort() {
        let out = format_html("</div><p>text<p>more", 2);
        assert_eq!(out, "</div>\n<p>\n  text\n<p>\n  more\n");
        assert_eq!(format_html("", 2), "");
        assert_eq!(format_html("  plain   text ", 2), "plain text\n");
    }
}
