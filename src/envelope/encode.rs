//! Envelope encoding.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use serde::ser::{self, Impossible};
use serde::Serialize;

use super::{Body, Envelope, EnvelopeError, Fault, SOAP_ENV_NS};

const SOAP_ENVELOPE: &str = "soap:Envelope";
const SOAP_HEADER: &str = "soap:Header";
const SOAP_BODY: &str = "soap:Body";
const SOAP_FAULT: &str = "soap:Fault";

/// Serializes the envelope as a complete XML document.
///
/// The header value's fields become the children of `soap:Header`; the body
/// content is written as the single child of `soap:Body`, named after its
/// serde type name. Content that serializes as unit or `None` leaves the
/// body empty. Content without an element name of its own (strings,
/// numbers, sequences) cannot be encoded here; see
/// [`encode_envelope_with_root`].
pub fn encode_envelope<H, C>(envelope: &Envelope<H, C>) -> Result<Vec<u8>, EnvelopeError>
where
    H: Serialize,
    C: Serialize,
{
    encode(envelope, None)
}

/// Like [`encode_envelope`], but content without an element name of its own
/// is wrapped in an element named `content_root`.
pub fn encode_envelope_with_root<H, C>(
    envelope: &Envelope<H, C>,
    content_root: &str,
) -> Result<Vec<u8>, EnvelopeError>
where
    H: Serialize,
    C: Serialize,
{
    encode(envelope, Some(content_root))
}

fn encode<H, C>(envelope: &Envelope<H, C>, content_root: Option<&str>) -> Result<Vec<u8>, EnvelopeError>
where
    H: Serialize,
    C: Serialize,
{
    let mut writer = Writer::new(Vec::new());

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
    writer.write_event(Event::Start(
        BytesStart::new(SOAP_ENVELOPE).with_attributes([("xmlns:soap", SOAP_ENV_NS)]),
    ))?;

    if let Some(header) = &envelope.header {
        let xml = quick_xml::se::to_string_with_root(SOAP_HEADER, header)?;
        writer.get_mut().extend_from_slice(xml.as_bytes());
    }

    writer.write_event(Event::Start(BytesStart::new(SOAP_BODY)))?;
    match &envelope.body {
        Body::Empty => {}
        Body::Fault(fault) => write_fault(&mut writer, fault)?,
        Body::Content(content) => {
            let xml = match (content_shape(content), content_root) {
                (ContentShape::Absent, _) => String::new(),
                (ContentShape::Bare, Some(root)) => {
                    quick_xml::se::to_string_with_root(root, content)?
                }
                _ => quick_xml::se::to_string(content)?,
            };
            writer.get_mut().extend_from_slice(xml.as_bytes());
        }
    }
    writer.write_event(Event::End(BytesEnd::new(SOAP_BODY)))?;

    writer.write_event(Event::End(BytesEnd::new(SOAP_ENVELOPE)))?;

    Ok(writer.into_inner())
}

fn write_fault(writer: &mut Writer<Vec<u8>>, fault: &Fault) -> Result<(), EnvelopeError> {
    writer.write_event(Event::Start(BytesStart::new(SOAP_FAULT)))?;

    let fields = [
        ("faultcode", BytesText::new(&fault.code)),
        ("faultstring", BytesText::new(&fault.message)),
        ("faultactor", BytesText::new(&fault.actor)),
        // already markup
        ("detail", BytesText::from_escaped(fault.detail.as_str())),
    ];
    for (name, value) in fields {
        if value.is_empty() {
            continue;
        }
        writer.write_event(Event::Start(BytesStart::new(name)))?;
        writer.write_event(Event::Text(value))?;
        writer.write_event(Event::End(BytesEnd::new(name)))?;
    }

    writer.write_event(Event::End(BytesEnd::new(SOAP_FAULT)))?;
    Ok(())
}

/// How a body content value maps onto an XML element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ContentShape {
    /// `()` or `None`: nothing is written.
    Absent,
    /// A struct, written under its serde name.
    Named,
    /// Anything else; needs a root element supplied by the caller.
    Bare,
}

fn content_shape<T: Serialize>(value: &T) -> ContentShape {
    match value.serialize(ShapeCheck) {
        Ok(shape) => shape,
        Err(Classified(shape)) => shape,
    }
}

/// Serializer that only classifies the outermost value. Compound values stop
/// it early through the error channel.
struct ShapeCheck;

#[derive(Debug)]
struct Classified(ContentShape);

impl std::fmt::Display for Classified {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "classified as {:?}", self.0)
    }
}

impl std::error::Error for Classified {}

impl ser::Error for Classified {
    fn custom<T: std::fmt::Display>(_msg: T) -> Self {
        Classified(ContentShape::Bare)
    }
}

type Stop = Impossible<ContentShape, Classified>;

impl ser::Serializer for ShapeCheck {
    type Ok = ContentShape;
    type Error = Classified;
    type SerializeSeq = Stop;
    type SerializeTuple = Stop;
    type SerializeTupleStruct = Stop;
    type SerializeTupleVariant = Stop;
    type SerializeMap = Stop;
    type SerializeStruct = Stop;
    type SerializeStructVariant = Stop;

    fn serialize_unit(self) -> Result<ContentShape, Classified> {
        Ok(ContentShape::Absent)
    }

    fn serialize_none(self) -> Result<ContentShape, Classified> {
        Ok(ContentShape::Absent)
    }

    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<ContentShape, Classified> {
        value.serialize(self)
    }

    fn serialize_bool(self, _v: bool) -> Result<ContentShape, Classified> {
        Ok(ContentShape::Bare)
    }

    fn serialize_i8(self, _v: i8) -> Result<ContentShape, Classified> {
        Ok(ContentShape::Bare)
    }

    fn serialize_i16(self, _v: i16) -> Result<ContentShape, Classified> {
        Ok(ContentShape::Bare)
    }

    fn serialize_i32(self, _v: i32) -> Result<ContentShape, Classified> {
        Ok(ContentShape::Bare)
    }

    fn serialize_i64(self, _v: i64) -> Result<ContentShape, Classified> {
        Ok(ContentShape::Bare)
    }

    fn serialize_u8(self, _v: u8) -> Result<ContentShape, Classified> {
        Ok(ContentShape::Bare)
    }

    fn serialize_u16(self, _v: u16) -> Result<ContentShape, Classified> {
        Ok(ContentShape::Bare)
    }

    fn serialize_u32(self, _v: u32) -> Result<ContentShape, Classified> {
        Ok(ContentShape::Bare)
    }

    fn serialize_u64(self, _v: u64) -> Result<ContentShape, Classified> {
        Ok(ContentShape::Bare)
    }

    fn serialize_f32(self, _v: f32) -> Result<ContentShape, Classified> {
        Ok(ContentShape::Bare)
    }

    fn serialize_f64(self, _v: f64) -> Result<ContentShape, Classified> {
        Ok(ContentShape::Bare)
    }

    fn serialize_char(self, _v: char) -> Result<ContentShape, Classified> {
        Ok(ContentShape::Bare)
    }

    fn serialize_str(self, _v: &str) -> Result<ContentShape, Classified> {
        Ok(ContentShape::Bare)
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<ContentShape, Classified> {
        Ok(ContentShape::Bare)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<ContentShape, Classified> {
        Ok(ContentShape::Named)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
    ) -> Result<ContentShape, Classified> {
        Ok(ContentShape::Bare)
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        _value: &T,
    ) -> Result<ContentShape, Classified> {
        Ok(ContentShape::Bare)
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<ContentShape, Classified> {
        Ok(ContentShape::Bare)
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Stop, Classified> {
        Err(Classified(ContentShape::Bare))
    }

    fn serialize_tuple(self, _len: usize) -> Result<Stop, Classified> {
        Err(Classified(ContentShape::Bare))
    }

    fn serialize_tuple_struct(self, _name: &'static str, _len: usize) -> Result<Stop, Classified> {
        Err(Classified(ContentShape::Bare))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Stop, Classified> {
        Err(Classified(ContentShape::Bare))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Stop, Classified> {
        Err(Classified(ContentShape::Bare))
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Stop, Classified> {
        Err(Classified(ContentShape::Named))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Stop, Classified> {
        Err(Classified(ContentShape::Bare))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::{decode_envelope, RawBody, RawEnvelope};
    use serde::Deserialize;

    #[derive(Debug, Default, Deserialize, Serialize, PartialEq)]
    #[serde(rename = "putDataBySqhResponse", default)]
    struct PutDataBySqhResponse {
        #[serde(rename = "putDataBySqhResult")]
        result: String,
    }

    #[derive(Debug, Default, Deserialize, Serialize, PartialEq)]
    #[serde(default)]
    struct Session {
        id: String,
    }

    #[test]
    fn test_encode_content() {
        let envelope: Envelope<(), _> = Envelope::new(Body::Content(PutDataBySqhResponse {
            result: "123".into(),
        }));

        let xml = String::from_utf8(encode_envelope(&envelope).unwrap()).unwrap();

        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="utf-8"?>"#));
        assert!(xml.contains(
            r#"<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">"#
        ));
        assert!(xml.contains(
            "<soap:Body><putDataBySqhResponse><putDataBySqhResult>123</putDataBySqhResult></putDataBySqhResponse></soap:Body>"
        ));
        assert!(!xml.contains("soap:Header"));
        assert!(!xml.contains("soap:Fault"));
    }

    #[test]
    fn test_encode_empty_body() {
        let envelope: Envelope = Envelope::new(Body::Empty);
        let xml = String::from_utf8(encode_envelope(&envelope).unwrap()).unwrap();
        assert!(xml.ends_with("<soap:Body></soap:Body></soap:Envelope>"));
    }

    #[test]
    fn test_unit_and_none_content_leave_body_empty() {
        let xml = encode_envelope(&Envelope::<(), ()>::new(Body::Content(()))).unwrap();
        assert!(String::from_utf8(xml).unwrap().ends_with("<soap:Body></soap:Body></soap:Envelope>"));

        let none: Option<PutDataBySqhResponse> = None;
        let xml = encode_envelope(&Envelope::<(), _>::new(Body::Content(none))).unwrap();
        assert!(String::from_utf8(xml).unwrap().ends_with("<soap:Body></soap:Body></soap:Envelope>"));

        assert_eq!(content_shape(&PutDataBySqhResponse::default()), ContentShape::Named);
        assert_eq!(content_shape(&Some(PutDataBySqhResponse::default())), ContentShape::Named);
        assert_eq!(content_shape(&"text"), ContentShape::Bare);
        assert_eq!(content_shape(&vec![1, 2]), ContentShape::Bare);
    }

    #[test]
    fn test_bare_content_wrapped_in_root() {
        let envelope: Envelope<(), u32> = Envelope::new(Body::Content(5));
        let xml = String::from_utf8(encode_envelope_with_root(&envelope, "CountResponse").unwrap())
            .unwrap();
        assert!(xml.contains("<soap:Body><CountResponse>5</CountResponse></soap:Body>"));

        // structs keep their own name
        let envelope: Envelope<(), _> = Envelope::new(Body::Content(PutDataBySqhResponse {
            result: "123".into(),
        }));
        let xml = String::from_utf8(encode_envelope_with_root(&envelope, "Ignored").unwrap())
            .unwrap();
        assert!(xml.contains("<soap:Body><putDataBySqhResponse>"));
        assert!(!xml.contains("Ignored"));
    }

    #[test]
    fn test_encode_fault_omits_empty_fields() {
        let envelope: Envelope = Envelope::new(Body::Fault(Fault::client("bad <input>")));
        let xml = String::from_utf8(encode_envelope(&envelope).unwrap()).unwrap();

        assert!(xml.contains(
            "<soap:Fault><faultcode>soap:Client</faultcode><faultstring>bad &lt;input&gt;</faultstring></soap:Fault>"
        ));
        assert!(!xml.contains("faultactor"));
        assert!(!xml.contains("detail"));
    }

    #[test]
    fn test_fault_survives_decode() {
        let fault = Fault::server("disk full").with_actor("urn:store").with_detail("quota");
        let xml = encode_envelope(&Envelope::<(), ()>::new(Body::Fault(fault.clone()))).unwrap();

        let raw = RawEnvelope::scan(&xml).unwrap();
        assert_eq!(raw.body(), &RawBody::Fault(fault));
    }

    #[test]
    fn test_element_detail_survives_decode_and_encode() {
        let inbound = br#"<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/"><soap:Body><soap:Fault><faultcode>soap:Server</faultcode><faultstring>quota</faultstring><detail><code>17</code><reason>a &amp; b</reason></detail></soap:Fault></soap:Body></soap:Envelope>"#;

        let RawBody::Fault(fault) = RawEnvelope::scan(inbound).unwrap().body().clone() else {
            panic!("expected a fault body");
        };
        assert_eq!(fault.detail, "<code>17</code><reason>a &amp; b</reason>");

        let xml = encode_envelope(&Envelope::<(), ()>::new(Body::Fault(fault.clone()))).unwrap();
        assert!(String::from_utf8(xml.clone())
            .unwrap()
            .contains("<detail><code>17</code><reason>a &amp; b</reason></detail>"));

        assert_eq!(RawEnvelope::scan(&xml).unwrap().body(), &RawBody::Fault(fault));
    }

    #[test]
    fn test_text_detail_stays_escaped() {
        let fault = Fault::client("bad").with_detail_text("1 < 2");
        let xml = encode_envelope(&Envelope::<(), ()>::new(Body::Fault(fault.clone()))).unwrap();
        assert!(String::from_utf8(xml.clone())
            .unwrap()
            .contains("<detail>1 &lt; 2</detail>"));
        assert_eq!(RawEnvelope::scan(&xml).unwrap().body(), &RawBody::Fault(fault));
    }

    #[test]
    fn test_decoded_content_encodes_to_same_element() {
        let element = "<putDataBySqhResponse><putDataBySqhResult>123</putDataBySqhResult></putDataBySqhResponse>";
        let inbound = format!(
            r#"<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/"><soap:Body>{element}</soap:Body></soap:Envelope>"#
        );

        let decoded: Envelope<(), PutDataBySqhResponse> = decode_envelope(
            inbound.as_bytes(),
            None,
            Some(PutDataBySqhResponse::default()),
        )
        .unwrap();
        assert_eq!(
            decoded.body,
            Body::Content(PutDataBySqhResponse {
                result: "123".into()
            })
        );

        let xml = String::from_utf8(encode_envelope(&decoded).unwrap()).unwrap();
        assert!(xml.contains(&format!("<soap:Body>{element}</soap:Body>")));
    }

    #[test]
    fn test_header_and_content_decode_back() {
        let envelope = Envelope::new(Body::Content(PutDataBySqhResponse {
            result: "ok".into(),
        }))
        .with_header(Session { id: "s-1".into() });

        let xml = encode_envelope(&envelope).unwrap();
        let decoded: Envelope<Session, PutDataBySqhResponse> = decode_envelope(
            &xml,
            Some(Session::default()),
            Some(PutDataBySqhResponse::default()),
        )
        .unwrap();

        assert_eq!(decoded, envelope);
    }
}
