//! `---` delimited metadata block scanner.
//!
//! A block opens on a line that holds only `---` and closes on the next such
//! line. Blocks pair up through the whole document, so a stray `---` pair in
//! the body is also taken as a block and removed with the rest.

/// Source split into its metadata blocks and the remaining body.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SplitDocument<'a> {
    /// Block contents, delimiters excluded, in document order
    pub blocks: Vec<&'a str>,
    /// Source with every block (delimiters included) removed
    pub body: String,
}

impl SplitDocument<'_> {
    /// The block that carries the post metadata.
    pub fn metadata(&self) -> Option<&str> {
        self.blocks.first().copied()
    }
}

#[derive(Clone, Copy)]
enum ScanState {
    /// Outside any block
    Body,
    /// Inside a block opened at `open`, content starting at `content`
    Block { open: usize, content: usize },
}

/// Check if a line is a block delimiter (`---`, trailing whitespace allowed).
#[inline]
fn is_delimiter(line: &str) -> bool {
    line.trim_end() == "---"
}

/// Split `source` into metadata blocks and body text.
///
/// An opener without a matching closer is ordinary body text.
pub fn split_blocks(source: &str) -> SplitDocument<'_> {
    let mut blocks = Vec::new();
    let mut body = String::with_capacity(source.len());
    let mut state = ScanState::Body;
    let mut copied = 0;
    let mut offset = 0;

    for line in source.split_inclusive('\n') {
        let start = offset;
        offset += line.len();

        if !is_delimiter(line) {
            continue;
        }

        state = match state {
            ScanState::Body => ScanState::Block {
                open: start,
                content: offset,
            },
            ScanState::Block { open, content } => {
                blocks.push(&source[content..start]);
                body.push_str(&source[copied..open]);
                copied = offset;
                ScanState::Body
            }
        };
    }

    body.push_str(&source[copied..]);
    SplitDocument { blocks, body }
}
