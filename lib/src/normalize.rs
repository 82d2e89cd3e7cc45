//! Reshaping of free-form `documentation` text into Markdown.
//!
//! Documentation fields are written by hand, often as a single YAML line with
//! escaped `\n` sequences, and mix prose with `$`/`$$` delimited math and
//! list markup. [`normalize()`] turns such a field into well-formed Markdown:
//!
//!   1. Escaped `\n` sequences become line breaks, then `\r\n` becomes `\n`.
//!   2. Surrounding whitespace is trimmed.
//!   3. The text is split into paragraphs at blank lines, and each paragraph
//!      is [classified](classify) as a [`Block`].
//!   4. Paragraphs are rejoined with exactly one blank line between them.
//!   5. Display math (`$$`) is given a blank line before its opening line and
//!      after its closing line.
//!
//! Normalizing is idempotent: normalizing normalized text changes nothing.

use std::borrow::Cow;

use memchr::memmem;

/// The shape of a paragraph, decided by [`classify()`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Block {
    /// Contains a `$$` display math delimiter.
    BlockMath,
    /// Contains two or more `$` inline math delimiters.
    InlineMath,
    /// Some line starts with a `-`, `*`, or `+` bullet.
    UnorderedList,
    /// Some line starts with digits followed by a `.`.
    NumberedList,
    Plain,
}

/// TeX control words that begin with `n`. Inside math, `\` followed by one of
/// these is markup, not an escaped newline.
const TEX_N_WORDS: &[&str] = &[
    "nabla", "natural", "ncong", "ne", "nearrow", "neg", "neq", "newcommand",
    "newline", "nexists", "ngeq", "ngtr", "ni", "nleftarrow", "nleq", "nless",
    "nmid", "noindent", "nolimits", "normalsize", "not", "nparallel",
    "nrightarrow", "nsim", "nsubseteq", "nsupseteq", "nu", "nwarrow",
];

/// Classifies one paragraph. Checks run in order; the first match wins.
///
/// ```rust
/// use lexicon::normalize::{classify, Block};
///
/// assert_eq!(classify("$$\nx^2\n$$"), Block::BlockMath);
/// assert_eq!(classify("where $x$ is"), Block::InlineMath);
/// assert_eq!(classify("- one\n- two"), Block::UnorderedList);
/// assert_eq!(classify("1. one\n2. two"), Block::NumberedList);
/// assert_eq!(classify("costs $5"), Block::Plain);
/// ```
pub fn classify(paragraph: &str) -> Block {
    let bytes = paragraph.as_bytes();
    if memmem::find(bytes, b"$$").is_some() {
        Block::BlockMath
    } else if memchr::memchr_iter(b'$', bytes).count() >= 2 {
        Block::InlineMath
    } else if paragraph.lines().any(is_bullet_item) {
        Block::UnorderedList
    } else if paragraph.lines().any(is_numbered_item) {
        Block::NumberedList
    } else {
        Block::Plain
    }
}

impl Block {
    /// Appends `paragraph`, shaped as this kind of block, to `out`.
    fn render(self, paragraph: &str, out: &mut String) {
        // Every kind keeps its bytes and line breaks; display math spacing is
        // a separate pass over the whole text.
        match self {
            Block::BlockMath
            | Block::InlineMath
            | Block::UnorderedList
            | Block::NumberedList
            | Block::Plain => out.push_str(paragraph),
        }
    }
}

fn is_bullet_item(line: &str) -> bool {
    let line = line.trim_start();
    match line.as_bytes() {
        [b'-' | b'*' | b'+'] => true,
        [b'-' | b'*' | b'+', b' ' | b'\t', ..] => true,
        _ => false,
    }
}

fn is_numbered_item(line: &str) -> bool {
    let line = line.trim_start();
    let digits = line.bytes().take_while(|b| b.is_ascii_digit()).count();
    digits > 0 && line.as_bytes().get(digits) == Some(&b'.')
}

/// Splits `text` into paragraphs: maximal runs of lines that aren't blank.
/// Each paragraph is a slice of `text` with its interior line breaks intact.
pub fn paragraphs(text: &str) -> Vec<&str> {
    let mut paragraphs = vec![];
    let (mut start, mut end, mut offset) = (None, 0, 0);
    for line in text.split('\n') {
        let line_end = offset + line.len();
        if line.trim().is_empty() {
            if let Some(start) = start.take() {
                paragraphs.push(&text[start..end]);
            }
        } else {
            start.get_or_insert(offset);
            end = line_end;
        }

        offset = line_end + 1;
    }

    if let Some(start) = start {
        paragraphs.push(&text[start..end]);
    }

    paragraphs
}

/// The classified paragraphs of `text`.
pub fn blocks(text: &str) -> Vec<(Block, &str)> {
    paragraphs(text).into_iter()
        .map(|p| (classify(p), p))
        .collect()
}

/// Normalizes a documentation field into Markdown. See the [module
/// docs](self) for the steps taken.
pub fn normalize(input: &str) -> String {
    // Folding after unescaping catches a `\r` followed by an escaped `\n`.
    let text = unescape_newlines(input);
    let text = match text.contains('\r') {
        true => Cow::Owned(text.replace("\r\n", "\n")),
        false => text,
    };

    let blocks = blocks(text.trim());

    let mut output = String::with_capacity(text.len());
    for (i, (block, paragraph)) in blocks.iter().enumerate() {
        if i != 0 {
            output.push_str("\n\n");
        }

        block.render(paragraph, &mut output);
    }

    if blocks.iter().any(|(block, _)| *block == Block::BlockMath) {
        output = space_display_math(&output);
    }

    output
}

/// Replaces escaped `\n` sequences with line breaks, leaving TeX control words
/// like `\nabla` inside math alone.
fn unescape_newlines(input: &str) -> Cow<'_, str> {
    let bytes = input.as_bytes();
    if memmem::find(bytes, b"\\n").is_none() {
        return Cow::Borrowed(input);
    }

    let mut output = String::with_capacity(input.len());
    let (mut display, mut inline) = (false, false);
    let (mut copied, mut i) = (0, 0);
    while let Some(k) = memchr::memchr2(b'\\', b'$', &bytes[i..]).map(|k| i + k) {
        match (bytes[k], bytes.get(k + 1)) {
            (b'\\', Some(b'n')) => {
                let word_len = bytes[(k + 1)..].iter()
                    .take_while(|b| b.is_ascii_alphabetic())
                    .count();

                let word = &input[(k + 1)..(k + 1 + word_len)];
                if (display || inline) && TEX_N_WORDS.contains(&word) {
                    i = k + 1 + word_len;
                } else {
                    output.push_str(&input[copied..k]);
                    output.push('\n');
                    copied = k + 2;
                    i = k + 2;
                }
            }
            (b'\\', Some(_)) => i = k + 2,
            (b'\\', None) => i = k + 1,
            (_, Some(b'$')) => {
                if !inline {
                    display = !display;
                }

                i = k + 2;
            }
            _ => {
                if !display {
                    inline = !inline;
                }

                i = k + 1;
            }
        }
    }

    output.push_str(&input[copied..]);
    Cow::Owned(output)
}

/// Ensures a blank line precedes every line opening display math and follows
/// every line closing it.
fn space_display_math(text: &str) -> String {
    let mut lines: Vec<&str> = Vec::with_capacity(text.len() / 32);
    let (mut in_display, mut after_close) = (false, false);
    for line in text.split('\n') {
        let opens = !in_display && line.trim_start().starts_with("$$");
        let follows_text = lines.last().map_or(false, |prev| !prev.trim().is_empty());
        if (opens || after_close) && follows_text && !line.trim().is_empty() {
            lines.push("");
        }

        if memmem::find_iter(line.as_bytes(), b"$$").count() % 2 == 1 {
            in_display = !in_display;
        }

        after_close = !in_display && line.trim_end().ends_with("$$");
        lines.push(line);
    }

    lines.join("\n")
}
