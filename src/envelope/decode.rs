//! Envelope decoding.
//!
//! # Responsibilities
//! - Locate `soap:Envelope`, `soap:Header` and `soap:Body` by qualified name
//! - Classify the single Body child as a Fault or as application content
//! - Decode captured fragments into caller-supplied target types
//!
//! # Design Decisions
//! - Scanning is separate from typed decoding so the dispatcher can bind the
//!   header and the body to different targets from one pass over the input
//! - Fragments are re-serialized from the token stream, so element prefixes
//!   declared on ancestors do not need to be resolved by serde
//! - Decoding stops at the closing Body element

use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::reader::NsReader;
use quick_xml::Writer;
use serde::de::DeserializeOwned;

use super::{Body, Envelope, EnvelopeError, Fault, SOAP_ENV_NS};

/// The Body child found by [`RawEnvelope::scan`].
#[derive(Clone, Debug, PartialEq)]
pub enum RawBody {
    Empty,
    Fault(Fault),
    /// The serialized child element, root tag included.
    Content(Vec<u8>),
}

/// A structurally validated envelope whose header and body content have not
/// yet been bound to any type. The default is an envelope with no header and
/// an empty body.
#[derive(Clone, Debug, PartialEq)]
pub struct RawEnvelope {
    header: Option<Vec<u8>>,
    body: RawBody,
}

impl Default for RawEnvelope {
    fn default() -> Self {
        Self {
            header: None,
            body: RawBody::Empty,
        }
    }
}

impl RawEnvelope {
    /// Scans a document for the SOAP envelope structure.
    pub fn scan(document: &[u8]) -> Result<Self, EnvelopeError> {
        let mut reader = NsReader::from_reader(document);

        // 1. Root must be soap:Envelope
        loop {
            let (ns, event) = reader.read_resolved_event()?;
            let soap = in_soap_ns(&ns);
            match event {
                Event::Start(e) if soap && e.local_name().as_ref() == b"Envelope" => break,
                Event::Empty(e) if soap && e.local_name().as_ref() == b"Envelope" => {
                    return Err(EnvelopeError::MissingBody);
                }
                Event::Start(e) | Event::Empty(e) => {
                    return Err(EnvelopeError::UnexpectedRoot(qualified_name(&e)));
                }
                Event::Eof => return Err(EnvelopeError::MissingEnvelope),
                _ => {}
            }
        }

        // 2. Envelope children: optional Header, then Body
        let mut header = None;
        loop {
            let (ns, event) = reader.read_resolved_event()?;
            let soap = in_soap_ns(&ns);
            match event {
                Event::Start(e) => {
                    let is_header = soap && e.local_name().as_ref() == b"Header";
                    let is_body = soap && e.local_name().as_ref() == b"Body";
                    if is_body {
                        let body = scan_body(&mut reader)?;
                        return Ok(Self { header, body });
                    }
                    let fragment = capture(&mut reader, e)?;
                    if is_header {
                        header = Some(fragment);
                    }
                }
                Event::Empty(e) => {
                    if soap && e.local_name().as_ref() == b"Body" {
                        return Ok(Self {
                            header,
                            body: RawBody::Empty,
                        });
                    }
                    if soap && e.local_name().as_ref() == b"Header" {
                        header = Some(capture_empty(e)?);
                    }
                }
                Event::End(_) => return Err(EnvelopeError::MissingBody),
                Event::Eof => return Err(EnvelopeError::Truncated("Envelope".into())),
                _ => {}
            }
        }
    }

    /// The serialized `soap:Header` element, if the envelope had one.
    pub fn header_fragment(&self) -> Option<&[u8]> {
        self.header.as_deref()
    }

    pub fn body(&self) -> &RawBody {
        &self.body
    }

    /// Binds the scanned envelope to typed targets.
    ///
    /// `header` and `content` are placeholders: a header is only decoded when
    /// a header target is given, and an empty body leaves the content
    /// placeholder in place. A Fault child replaces the content target.
    pub fn into_envelope<H, C>(
        self,
        header: Option<H>,
        content: Option<C>,
    ) -> Result<Envelope<H, C>, EnvelopeError>
    where
        H: DeserializeOwned,
        C: DeserializeOwned,
    {
        let content = content.ok_or(EnvelopeError::InvalidContentTarget)?;

        let header = match (header, self.header) {
            (Some(_), Some(fragment)) => Some(from_fragment(&fragment)?),
            (target, _) => target,
        };

        let body = match self.body {
            RawBody::Empty => Body::Content(content),
            RawBody::Fault(fault) => Body::Fault(fault),
            RawBody::Content(fragment) => Body::Content(from_fragment(&fragment)?),
        };

        Ok(Envelope { header, body })
    }
}

/// Decodes a complete SOAP document.
///
/// `content` is the placeholder for the expected body payload and must be
/// supplied; `header` is only decoded when a placeholder is given.
pub fn decode_envelope<H, C>(
    document: &[u8],
    header: Option<H>,
    content: Option<C>,
) -> Result<Envelope<H, C>, EnvelopeError>
where
    H: DeserializeOwned,
    C: DeserializeOwned,
{
    if content.is_none() {
        return Err(EnvelopeError::InvalidContentTarget);
    }
    RawEnvelope::scan(document)?.into_envelope(header, content)
}

/// Deserializes a captured element into `T`.
pub(crate) fn from_fragment<T: DeserializeOwned>(fragment: &[u8]) -> Result<T, EnvelopeError> {
    Ok(quick_xml::de::from_reader(fragment)?)
}

fn in_soap_ns(ns: &ResolveResult<'_>) -> bool {
    matches!(ns, ResolveResult::Bound(Namespace(uri)) if *uri == SOAP_ENV_NS.as_bytes())
}

fn qualified_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.name().as_ref()).into_owned()
}

fn scan_body(reader: &mut NsReader<&[u8]>) -> Result<RawBody, EnvelopeError> {
    let mut body = RawBody::Empty;
    let mut consumed = false;

    loop {
        let (ns, event) = reader.read_resolved_event()?;
        let soap = in_soap_ns(&ns);
        match event {
            Event::Start(e) => {
                if consumed {
                    return Err(EnvelopeError::MultipleBodyElements);
                }
                body = if soap && e.local_name().as_ref() == b"Fault" {
                    RawBody::Fault(read_fault(reader)?)
                } else {
                    RawBody::Content(capture(reader, e)?)
                };
                consumed = true;
            }
            Event::Empty(e) => {
                if consumed {
                    return Err(EnvelopeError::MultipleBodyElements);
                }
                body = if soap && e.local_name().as_ref() == b"Fault" {
                    RawBody::Fault(Fault::default())
                } else {
                    RawBody::Content(capture_empty(e)?)
                };
                consumed = true;
            }
            Event::End(_) => return Ok(body),
            Event::Eof => return Err(EnvelopeError::Truncated("Body".into())),
            _ => {}
        }
    }
}

/// Reads the children of an open `soap:Fault` up to its closing tag.
fn read_fault(reader: &mut NsReader<&[u8]>) -> Result<Fault, EnvelopeError> {
    let mut fault = Fault::default();

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let markup = capture_inner(reader, &qualified_name(&e))?;
                match e.local_name().as_ref() {
                    b"faultcode" => fault.code = text_of(&markup)?,
                    b"faultstring" => fault.message = text_of(&markup)?,
                    b"faultactor" => fault.actor = text_of(&markup)?,
                    b"detail" => fault.detail = markup.trim().to_string(),
                    _ => {}
                }
            }
            Event::End(_) => return Ok(fault),
            Event::Eof => return Err(EnvelopeError::Truncated("Fault".into())),
            _ => {}
        }
    }
}

fn text_of(markup: &str) -> Result<String, EnvelopeError> {
    Ok(unescape(markup.trim())?.into_owned())
}

/// Re-serializes an element whose start tag was just read.
fn capture<'i>(
    reader: &mut NsReader<&'i [u8]>,
    start: BytesStart<'i>,
) -> Result<Vec<u8>, EnvelopeError> {
    let name = qualified_name(&start);
    let mut writer = Writer::new(Vec::new());
    writer.write_event(Event::Start(start))?;

    let mut depth = 1usize;
    while depth > 0 {
        let event = reader.read_event()?;
        match &event {
            Event::Start(_) => depth += 1,
            Event::End(_) => depth -= 1,
            Event::Eof => return Err(EnvelopeError::Truncated(name)),
            _ => {}
        }
        writer.write_event(event)?;
    }

    Ok(writer.into_inner())
}

fn capture_empty(start: BytesStart<'_>) -> Result<Vec<u8>, EnvelopeError> {
    let mut writer = Writer::new(Vec::new());
    writer.write_event(Event::Empty(start))?;
    Ok(writer.into_inner())
}

/// Re-serializes the content of an open element, excluding its own tags.
fn capture_inner(reader: &mut NsReader<&[u8]>, name: &str) -> Result<String, EnvelopeError> {
    let mut writer = Writer::new(Vec::new());
    let mut depth = 0usize;

    loop {
        let event = reader.read_event()?;
        match &event {
            Event::Start(_) => depth += 1,
            Event::End(_) if depth == 0 => break,
            Event::End(_) => depth -= 1,
            Event::Eof => return Err(EnvelopeError::Truncated(name.to_string())),
            _ => {}
        }
        writer.write_event(event)?;
    }

    Ok(String::from_utf8_lossy(&writer.into_inner()).into_owned())
}
