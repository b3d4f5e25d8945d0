//! Chunked text embedding.
//!
//! Turns a block of text into a [`ChunkPlan`]: shell commands that, run in
//! order on the target machine, append the text line by line to a file.
//! Each command has to stay under the interpreter's practical command-line
//! length, so long lines are split into chunks sized from the destination
//! path length:
//!
//! ```text
//! max_chunk = COMMAND_LINE_LIMIT - COMMAND_HEADROOM - chars(path)
//! ```
//!
//! All chunks of a line but the last are appended without a line break
//! (`<nul set /p=…`); the last one is appended with `echo(`, which ends the
//! line with CRLF and never reads its argument as `on`, `off` or `/?`.
//! Blank lines use `echo.`.
//!
//! Chunks are never placed inside double quotes: a caret is literal there, so
//! the escapes only work in unquoted text. A `"` in the content is escaped
//! too, which keeps the interpreter from entering quoted mode.
//!
//! The codec never touches the filesystem. Callers insert the commands via
//! [`crate::command::target`].

use crate::command;
use crate::document::Element;

/// Practical safe length of one command line.
pub const COMMAND_LINE_LIMIT: usize = 256;
/// Room reserved for the invocation, redirection and quoting around a chunk.
pub const COMMAND_HEADROOM: usize = 64;

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="utf-8"?>"#;

/// Characters the interpreter treats specially outside quotes.
const SHELL_METACHARACTERS: [char; 7] = ['^', '&', '<', '>', '|', '%', '"'];

/// Ordered commands rebuilding one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkPlan {
    path: String,
    commands: Vec<String>,
}

impl ChunkPlan {
    /// Destination path on the target machine.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn commands(&self) -> &[String] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

}

impl IntoIterator for ChunkPlan {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.commands.into_iter()
    }
}

/// Chunk size budget for `path`. Never below 1, so the codec stays total
/// for absurdly long paths.
pub fn max_chunk(path: &str) -> usize {
    COMMAND_LINE_LIMIT
        .saturating_sub(COMMAND_HEADROOM)
        .saturating_sub(path.chars().count())
        .max(1)
}

/// Prefix every shell metacharacter with a caret.
pub fn escape_shell(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if SHELL_METACHARACTERS.contains(&c) {
            escaped.push('^');
        }
        escaped.push(c);
    }
    escaped
}

/// Plan the commands that write `text` to `path`.
///
/// Lines end at `\r\n` or `\n`. Every line in the result file ends with
/// CRLF, including the last one. Whitespace-only lines come out empty.
pub fn write_to_file(path: &str, text: &str) -> ChunkPlan {
    let budget = max_chunk(path);
    let mut commands = Vec::new();

    for line in text.lines() {
        if line.trim().is_empty() {
            commands.push(command::shell(&format!(r#">>"{path}" echo."#)));
            continue;
        }

        let chars: Vec<char> = line.chars().collect();
        let mut chunks = chars.chunks(budget).peekable();
        while let Some(chunk) = chunks.next() {
            let chunk: String = chunk.iter().collect();
            let chunk = escape_shell(&chunk);
            let body = if chunks.peek().is_some() {
                format!(r#">>"{path}" <nul set /p={chunk}"#)
            } else {
                format!(r#">>"{path}" echo({chunk}"#)
            };
            commands.push(command::shell(&body));
        }
    }

    ChunkPlan {
        path: path.to_string(),
        commands,
    }
}

/// Plan the commands that write an XML document to `path`.
///
/// The element is serialized canonically and prefixed with an XML
/// declaration so consumers on the target treat the file as XML.
pub fn embed_document(path: &str, document: &Element) -> ChunkPlan {
    let mut text = String::from(XML_DECLARATION);
    text.push_str("\r\n");
    text.push_str(&document.to_canonical_string());
    write_to_file(path, &text)
}
