//! Loading XBRL documents into an element tree

use crate::{Error, Result};
#[cfg(feature = "mmap")]
use memmap2::Mmap;
use roxmltree::{Node, ParsingOptions};
use std::borrow::Cow;
use std::path::{Path, PathBuf};

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

enum Buffer {
    Owned(Vec<u8>),
    #[cfg(feature = "mmap")]
    Mapped(Mmap),
}

impl Buffer {
    fn bytes(&self) -> &[u8] {
        match self {
            Buffer::Owned(bytes) => bytes.as_slice(),
            #[cfg(feature = "mmap")]
            Buffer::Mapped(map) => &map[..],
        }
    }
}

/// A document read fully into memory, ready to be parsed into a tree.
pub struct Source {
    path: PathBuf,
    buffer: Buffer,
}

impl Source {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let buffer = read_buffer(&path).map_err(|source| Error::Io {
            path: path.clone(),
            source,
        })?;
        tracing::debug!(path = %path.display(), bytes = buffer.bytes().len(), "loaded document");
        Ok(Self { path, buffer })
    }

    /// Wrap in-memory content; `path` is only used in error messages.
    pub fn from_bytes(path: impl Into<PathBuf>, bytes: Vec<u8>) -> Self {
        Self {
            path: path.into(),
            buffer: Buffer::Owned(bytes),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn text(&self) -> Result<&str> {
        let data = self.buffer.bytes();
        let data = data.strip_prefix(UTF8_BOM).unwrap_or(data);
        std::str::from_utf8(data).map_err(|_| Error::Encoding {
            path: self.path.clone(),
        })
    }

    pub fn parse(&self) -> Result<roxmltree::Document<'_>> {
        let options = ParsingOptions {
            allow_dtd: true,
            ..ParsingOptions::default()
        };
        roxmltree::Document::parse_with_options(self.text()?, options).map_err(|source| {
            Error::Xml {
                path: self.path.clone(),
                source,
            }
        })
    }
}

#[cfg(not(feature = "mmap"))]
fn read_buffer(path: &Path) -> std::io::Result<Buffer> {
    std::fs::read(path).map(Buffer::Owned)
}

#[cfg(feature = "mmap")]
fn read_buffer(path: &Path) -> std::io::Result<Buffer> {
    let file = std::fs::File::open(path)?;
    if file.metadata()?.len() == 0 {
        // zero-length files cannot be mapped
        return Ok(Buffer::Owned(Vec::new()));
    }
    // Safety: the map is read-only and dropped with the Source
    let map = unsafe { Mmap::map(&file)? };
    Ok(Buffer::Mapped(map))
}

/// Tag in `{namespace}local` form, or the bare local name when the
/// element has no namespace.
pub fn clark_tag(node: Node<'_, '_>) -> String {
    let tag = node.tag_name();
    match tag.namespace() {
        Some(ns) => format!("{{{}}}{}", ns, tag.name()),
        None => tag.name().to_string(),
    }
}

/// Text directly inside `node`, before its first child element.
/// Comments and processing instructions are skipped, and the text runs
/// around them are joined.
pub fn own_text<'a>(node: Node<'a, '_>) -> Option<Cow<'a, str>> {
    let mut runs = node
        .children()
        .take_while(|child| !child.is_element())
        .filter(Node::is_text)
        .filter_map(|child| child.text());

    let first = runs.next()?;
    let Some(second) = runs.next() else {
        return Some(Cow::Borrowed(first));
    };
    let mut text = String::from(first);
    text.push_str(second);
    runs.for_each(|run| text.push_str(run));
    Some(Cow::Owned(text))
}

/// `own_text` trimmed; `None` when the text is absent.
pub fn trimmed_text<'a>(node: Node<'a, '_>) -> Option<Cow<'a, str>> {
    own_text(node).map(|text| match text {
        Cow::Borrowed(text) => Cow::Borrowed(text.trim()),
        Cow::Owned(text) => Cow::Owned(text.trim().to_string()),
    })
}
