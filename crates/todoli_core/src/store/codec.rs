//! XML codec for list files.
//!
//! # Responsibility
//! - Serialize an ordered task sequence into the `tasks`/`task` XML shape.
//! - Parse any well-formed document of that shape back into tasks.
//!
//! # Invariants
//! - Element order is task order; attribute order is not significant.
//! - Output is UTF-8, tab-indented, with an XML declaration.
//! - Whitespace between elements is ignored on input.
//! - A `task` element without `title` or `description` is rejected.

use crate::model::task::{Task, TaskValidationError};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const ROOT_ELEMENT: &str = "tasks";
pub const TASK_ELEMENT: &str = "task";
pub const TITLE_ATTRIBUTE: &str = "title";
pub const DESCRIPTION_ATTRIBUTE: &str = "description";

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

pub type CodecResult<T> = Result<T, CodecError>;

/// Errors raised while encoding or decoding a list document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Input bytes are not valid UTF-8.
    Encoding(String),
    /// Structure could not be parsed or written.
    Xml(String),
    /// Document has no root element.
    MissingRoot,
    /// Root element has an unexpected name.
    UnexpectedRoot(String),
    /// Content continues after the root element was closed.
    TrailingContent,
    /// Task element at `position` lacks a required attribute.
    MissingAttribute {
        attribute: &'static str,
        position: usize,
    },
    /// Task element at `position` carries values that fail task validation.
    InvalidTask {
        position: usize,
        source: TaskValidationError,
    },
}

impl Display for CodecError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Encoding(message) => write!(f, "list file is not valid UTF-8: {message}"),
            Self::Xml(message) => write!(f, "malformed list document: {message}"),
            Self::MissingRoot => write!(f, "list document has no `{ROOT_ELEMENT}` element"),
            Self::UnexpectedRoot(name) => {
                write!(f, "expected root element `{ROOT_ELEMENT}`, found `{name}`")
            }
            Self::TrailingContent => write!(f, "unexpected content after `{ROOT_ELEMENT}`"),
            Self::MissingAttribute {
                attribute,
                position,
            } => write!(f, "task #{position} is missing attribute `{attribute}`"),
            Self::InvalidTask { position, source } => write!(f, "task #{position}: {source}"),
        }
    }
}

impl Error for CodecError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidTask { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<quick_xml::Error> for CodecError {
    fn from(value: quick_xml::Error) -> Self {
        Self::Xml(value.to_string())
    }
}

impl From<std::io::Error> for CodecError {
    fn from(value: std::io::Error) -> Self {
        Self::Xml(value.to_string())
    }
}

/// Serializes tasks into an indented XML document.
pub fn encode_tasks(tasks: &[Task]) -> CodecResult<Vec<u8>> {
    let mut writer = Writer::new_with_indent(Vec::new(), b'\t', 1);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
    writer.write_event(Event::Start(BytesStart::new(ROOT_ELEMENT)))?;
    for task in tasks {
        let mut element = BytesStart::new(TASK_ELEMENT);
        element.push_attribute((TITLE_ATTRIBUTE, task.title()));
        element.push_attribute((DESCRIPTION_ATTRIBUTE, task.description()));
        writer.write_event(Event::Empty(element))?;
    }
    writer.write_event(Event::End(BytesEnd::new(ROOT_ELEMENT)))?;

    let mut bytes = writer.into_inner();
    bytes.push(b'\n');
    Ok(bytes)
}

/// Parses a list document into tasks, preserving element order.
///
/// # Errors
/// - [`CodecError::Encoding`] for non UTF-8 input.
/// - [`CodecError::Xml`], [`CodecError::MissingRoot`], [`CodecError::UnexpectedRoot`]
///   and [`CodecError::TrailingContent`] for structural problems.
/// - [`CodecError::MissingAttribute`] / [`CodecError::InvalidTask`] for bad task elements.
pub fn decode_tasks(bytes: &[u8]) -> CodecResult<Vec<Task>> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let text = std::str::from_utf8(bytes).map_err(|err| CodecError::Encoding(err.to_string()))?;

    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut tasks = Vec::new();
    let mut depth = 0usize;
    let mut root_seen = false;

    loop {
        match reader.read_event()? {
            Event::Start(element) => {
                open_element(&element, depth, &mut root_seen, &mut tasks)?;
                depth += 1;
            }
            Event::Empty(element) => {
                open_element(&element, depth, &mut root_seen, &mut tasks)?;
            }
            Event::End(_) => {
                depth = depth.saturating_sub(1);
            }
            // Whitespace never reaches here because of `trim_text`.
            Event::Text(_) | Event::CData(_) if depth == 0 => {
                return Err(if root_seen {
                    CodecError::TrailingContent
                } else {
                    CodecError::Xml(format!("text before `{ROOT_ELEMENT}` element"))
                });
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !root_seen {
        return Err(CodecError::MissingRoot);
    }
    if depth != 0 {
        return Err(CodecError::Xml(format!(
            "document ended inside `{ROOT_ELEMENT}`"
        )));
    }

    Ok(tasks)
}

fn open_element(
    element: &BytesStart<'_>,
    depth: usize,
    root_seen: &mut bool,
    tasks: &mut Vec<Task>,
) -> CodecResult<()> {
    let name = element.name();
    if depth == 0 {
        if *root_seen {
            return Err(CodecError::TrailingContent);
        }
        if name.as_ref() != ROOT_ELEMENT.as_bytes() {
            return Err(CodecError::UnexpectedRoot(
                String::from_utf8_lossy(name.as_ref()).into_owned(),
            ));
        }
        *root_seen = true;
        return Ok(());
    }

    // Only direct children of the root are tasks.
    if depth == 1 && name.as_ref() == TASK_ELEMENT.as_bytes() {
        tasks.push(read_task(element, tasks.len())?);
    }
    Ok(())
}

fn read_task(element: &BytesStart<'_>, position: usize) -> CodecResult<Task> {
    let mut title = None;
    let mut description = None;

    for attribute in element.attributes() {
        let attribute = attribute.map_err(|err| CodecError::Xml(err.to_string()))?;
        let value = attribute
            .unescape_value()
            .map_err(|err| CodecError::Xml(err.to_string()))?
            .into_owned();
        match attribute.key.as_ref() {
            key if key == TITLE_ATTRIBUTE.as_bytes() => title = Some(value),
            key if key == DESCRIPTION_ATTRIBUTE.as_bytes() => description = Some(value),
            _ => {}
        }
    }

    let title = title.ok_or(CodecError::MissingAttribute {
        attribute: TITLE_ATTRIBUTE,
        position,
    })?;
    let description = description.ok_or(CodecError::MissingAttribute {
        attribute: DESCRIPTION_ATTRIBUTE,
        position,
    })?;

    Task::new(title, description).map_err(|source| CodecError::InvalidTask { position, source })
}
