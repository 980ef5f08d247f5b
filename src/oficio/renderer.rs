//! DOCX rendering.
//!
//! A `.docx` is a zip package; the text we care about lives in
//! `word/document.xml` and the header/footer parts. Each record gets a fresh
//! package built from the template bytes, so nothing leaks between records.
//!
//! Word freely splits a paragraph's text over several runs (spell-check marks,
//! revision ids, formatting changes), which can cut a `{{token}}` in pieces.
//! Substitution therefore works on the joined text of the paragraph and writes
//! the result back into its first text node.

use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};

use log::debug;
use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use thiserror::Error;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipArchive, ZipWriter};

use super::validation::ValidatedRecord;

pub const TOKEN_OFFICE_NUMBER: &str = "{{numero_oficio}}";
pub const TOKEN_MUNICIPALITY: &str = "{{prefeito_municipio}}";
pub const TOKEN_AMOUNT: &str = "{{valor}}";

const MAIN_DOCUMENT_PART: &str = "word/document.xml";
const PARAGRAPH: &[u8] = b"w:p";
const TEXT: &[u8] = b"w:t";

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to read template {path}: {source}")]
    TemplateIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("template is not a valid DOCX package: {0}")]
    Package(#[from] zip::result::ZipError),
    #[error("template has no word/document.xml part")]
    MissingDocumentPart,
    #[error("malformed document XML: {0}")]
    Xml(String),
    #[error("I/O error while rendering: {0}")]
    Io(#[from] std::io::Error),
}

fn xml_error(err: impl std::fmt::Display) -> RenderError {
    RenderError::Xml(err.to_string())
}

/// The model document, held as raw package bytes.
#[derive(Debug, Clone)]
pub struct Template {
    bytes: Vec<u8>,
}

impl Template {
    pub fn load(path: &Path) -> Result<Self, RenderError> {
        let bytes = std::fs::read(path).map_err(|source| RenderError::TemplateIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_bytes(bytes)
    }

    /// Accepts any zip package that has a main document part.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, RenderError> {
        {
            let mut archive = ZipArchive::new(Cursor::new(bytes.as_slice()))?;
            if archive.by_name(MAIN_DOCUMENT_PART).is_err() {
                return Err(RenderError::MissingDocumentPart);
            }
        }
        Ok(Self { bytes })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// Token/value pairs, applied in order.
#[derive(Debug, Clone)]
pub struct Substitutions {
    pairs: Vec<(&'static str, String)>,
}

impl Substitutions {
    pub fn for_record(record: &ValidatedRecord) -> Self {
        Self {
            pairs: vec![
                (TOKEN_OFFICE_NUMBER, record.office_number.to_string()),
                (TOKEN_MUNICIPALITY, record.municipality_name.clone()),
                (TOKEN_AMOUNT, record.formatted_amount.clone()),
            ],
        }
    }

    pub fn matches(&self, text: &str) -> bool {
        self.pairs.iter().any(|(token, _)| text.contains(token))
    }

    pub fn apply(&self, text: &str) -> String {
        self.pairs
            .iter()
            .fold(text.to_string(), |acc, (token, value)| acc.replace(token, value))
    }
}

pub struct DocumentRenderer<'a> {
    template: &'a Template,
}

impl<'a> DocumentRenderer<'a> {
    pub fn new(template: &'a Template) -> Self {
        Self { template }
    }

    /// Build a new package for `record`. Parts without text are copied raw.
    pub fn render(&self, record: &ValidatedRecord) -> Result<Vec<u8>, RenderError> {
        let substitutions = Substitutions::for_record(record);
        let mut archive = ZipArchive::new(Cursor::new(self.template.bytes()))?;
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(DateTime::default());

        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            let name = file.name().to_string();

            if is_text_part(&name) {
                let mut xml = Vec::new();
                file.read_to_end(&mut xml)?;
                let patched = substitute_paragraphs(&xml, &substitutions)?;
                debug!("Patched part {} for row {}", name, record.row);
                zip.start_file(name, options)?;
                zip.write_all(&patched)?;
            } else {
                zip.raw_copy_file(file)?;
            }
        }

        Ok(zip.finish()?.into_inner())
    }
}

fn is_text_part(name: &str) -> bool {
    name == MAIN_DOCUMENT_PART
        || ((name.starts_with("word/header") || name.starts_with("word/footer"))
            && name.ends_with(".xml"))
}

struct TextNode {
    /// Index of the `<w:t>` start tag.
    start: usize,
    /// Index of its text content.
    text: usize,
}

#[derive(Default)]
struct ParagraphBuffer {
    events: Vec<Event<'static>>,
    text_nodes: Vec<TextNode>,
    open_text: Option<usize>,
}

impl ParagraphBuffer {
    fn finish(self, substitutions: &Substitutions) -> Result<Vec<Event<'static>>, RenderError> {
        let ParagraphBuffer {
            mut events,
            text_nodes,
            ..
        } = self;

        let mut joined = String::new();
        for node in &text_nodes {
            if let Event::Text(text) = &events[node.text] {
                joined.push_str(&text.unescape().map_err(xml_error)?);
            }
        }

        if !substitutions.matches(&joined) {
            return Ok(events);
        }

        let replaced = substitutions.apply(&joined);
        for (i, node) in text_nodes.iter().enumerate() {
            let content = if i == 0 { replaced.as_str() } else { "" };
            events[node.text] = Event::Text(BytesText::new(content).into_owned());
        }
        if let Some(first) = text_nodes.first() {
            events[first.start] = preserve_space(&events[first.start]);
        }

        Ok(events)
    }
}

/// Leading/trailing spaces in the merged text must survive, so the text node
/// that receives it gets `xml:space="preserve"`.
fn preserve_space(event: &Event<'static>) -> Event<'static> {
    match event {
        Event::Start(start) => {
            let mut tag = BytesStart::new("w:t");
            for attr in start.attributes().with_checks(false).flatten() {
                if attr.key.as_ref() != b"xml:space" {
                    tag.push_attribute(attr);
                }
            }
            tag.push_attribute(("xml:space", "preserve"));
            Event::Start(tag)
        }
        other => other.clone(),
    }
}

fn emit(
    stack: &mut [ParagraphBuffer],
    writer: &mut Writer<Vec<u8>>,
    event: Event<'static>,
) -> Result<(), RenderError> {
    match stack.last_mut() {
        Some(paragraph) => {
            paragraph.events.push(event);
            Ok(())
        }
        None => writer.write_event(event).map_err(xml_error),
    }
}

/// Replace tokens in every `<w:p>` of a WordprocessingML part.
///
/// Paragraphs without a token are written back untouched. Nested paragraphs
/// (text boxes) are handled on their own and do not contribute to the text
/// of the paragraph that contains them.
pub fn substitute_paragraphs(
    xml: &[u8],
    substitutions: &Substitutions,
) -> Result<Vec<u8>, RenderError> {
    let mut reader = Reader::from_reader(xml);
    let mut writer = Writer::new(Vec::new());
    let mut stack: Vec<ParagraphBuffer> = Vec::new();
    let mut buf = Vec::new();

    loop {
        let event = reader.read_event_into(&mut buf).map_err(xml_error)?.into_owned();
        buf.clear();

        match event {
            Event::Eof => break,
            Event::Start(ref e) if e.name().as_ref() == PARAGRAPH => {
                stack.push(ParagraphBuffer::default());
                emit(&mut stack, &mut writer, event)?;
            }
            Event::End(ref e) if e.name().as_ref() == PARAGRAPH => match stack.pop() {
                Some(mut paragraph) => {
                    paragraph.events.push(event);
                    for event in paragraph.finish(substitutions)? {
                        emit(&mut stack, &mut writer, event)?;
                    }
                }
                None => emit(&mut stack, &mut writer, event)?,
            },
            Event::Start(ref e) if e.name().as_ref() == TEXT => {
                if let Some(paragraph) = stack.last_mut() {
                    paragraph.open_text = Some(paragraph.events.len());
                }
                emit(&mut stack, &mut writer, event)?;
            }
            Event::End(ref e) if e.name().as_ref() == TEXT => {
                if let Some(paragraph) = stack.last_mut() {
                    paragraph.open_text = None;
                }
                emit(&mut stack, &mut writer, event)?;
            }
            Event::Text(_) => {
                if let Some(paragraph) = stack.last_mut() {
                    if let Some(start) = paragraph.open_text {
                        let text = paragraph.events.len();
                        paragraph.text_nodes.push(TextNode { start, text });
                    }
                }
                emit(&mut stack, &mut writer, event)?;
            }
            _ => emit(&mut stack, &mut writer, event)?,
        }
    }

    // Unclosed paragraphs: flush as read.
    for paragraph in stack.drain(..) {
        for event in paragraph.events {
            writer.write_event(event).map_err(xml_error)?;
        }
    }

    Ok(writer.into_inner())
}
