//! SOAP 1.1 envelope codec
//!
//! Only what the two operations need: find the operation element inside
//! `Body`, pull its arguments by local name, and wrap results or faults in a
//! response envelope. Namespace prefixes on the request are ignored.

use quick_xml::escape::escape;
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::trainer::{NewTrainer, TrainerId};
use crate::SOAP_TARGET_NAMESPACE;

/// SOAP 1.1 envelope namespace
pub const SOAP_ENV_NAMESPACE: &str = "http://schemas.xmlsoap.org/soap/envelope/";

const XML_DECLARATION: &str = "<?xml version='1.0' encoding='UTF-8'?>";

// =============================================================================
// Requests
// =============================================================================

/// A decoded RPC call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SoapRequest {
    GetTrainer { id: TrainerId },
    PostTrainer(NewTrainer),
}

impl SoapRequest {
    /// Operation name as it appears on the wire.
    pub fn operation(&self) -> &'static str {
        match self {
            Self::GetTrainer { .. } => "GetTrainer",
            Self::PostTrainer(_) => "PostTrainer",
        }
    }

    /// Decode a request envelope.
    pub fn decode(xml: &str) -> Result<Self, EnvelopeError> {
        let root = parse_document(xml)?;
        if root.name != "Envelope" {
            return Err(EnvelopeError::Malformed(format!(
                "expected Envelope, found {}",
                root.name
            )));
        }
        let body = root
            .child("Body")
            .ok_or_else(|| EnvelopeError::Malformed("missing Body".to_string()))?;
        let call = body
            .children
            .first()
            .ok_or_else(|| EnvelopeError::Malformed("empty Body".to_string()))?;

        match call.name.as_str() {
            "GetTrainer" => {
                let id = call
                    .child("id")
                    .and_then(Element::value)
                    .ok_or_else(|| EnvelopeError::BadArgument("id is required".to_string()))?;
                let id = id
                    .parse()
                    .map_err(|_| EnvelopeError::BadArgument(format!("id is not an integer: {id}")))?;
                Ok(Self::GetTrainer { id })
            }
            "PostTrainer" => {
                let name = call
                    .child("name")
                    .and_then(Element::value)
                    .unwrap_or_default()
                    .to_string();
                let age = match call.child("age").and_then(Element::value) {
                    Some(age) => Some(age.parse().map_err(|_| {
                        EnvelopeError::BadArgument(format!("age is not an integer: {age}"))
                    })?),
                    None => None,
                };
                let items = call
                    .child("pokemons")
                    .or_else(|| call.child("items"))
                    .map(|list| {
                        // Blank and nil items stay in place as "" so validation
                        // rejects them instead of silently dropping them.
                        list.children
                            .iter()
                            .map(|c| c.value().unwrap_or_default().to_string())
                            .collect()
                    })
                    .unwrap_or_default();

                Ok(Self::PostTrainer(NewTrainer { name, age, items }))
            }
            other => Err(EnvelopeError::UnknownOperation(other.to_string())),
        }
    }
}

// =============================================================================
// Responses
// =============================================================================

/// Encode the `GetTrainer` result as a string array.
pub fn encode_get_trainer_response(lines: &[String]) -> String {
    let mut result = String::new();
    for line in lines {
        result.push_str("<tns:string>");
        result.push_str(&escape(line.as_str()));
        result.push_str("</tns:string>");
    }
    wrap_body(&format!(
        "<tns:GetTrainerResponse><tns:GetTrainerResult>{result}</tns:GetTrainerResult></tns:GetTrainerResponse>"
    ))
}

/// Encode the `PostTrainer` result.
pub fn encode_post_trainer_response(message: &str) -> String {
    wrap_body(&format!(
        "<tns:PostTrainerResponse><tns:PostTrainerResult>{}</tns:PostTrainerResult></tns:PostTrainerResponse>",
        escape(message)
    ))
}

/// Who a fault is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultCode {
    Client,
    Server,
}

impl FaultCode {
    fn as_str(self) -> &'static str {
        match self {
            Self::Client => "soap11env:Client",
            Self::Server => "soap11env:Server",
        }
    }
}

/// Encode a SOAP fault.
pub fn encode_fault(code: FaultCode, message: &str) -> String {
    wrap_body(&format!(
        "<soap11env:Fault><faultcode>{}</faultcode><faultstring>{}</faultstring></soap11env:Fault>",
        code.as_str(),
        escape(message)
    ))
}

fn wrap_body(inner: &str) -> String {
    format!(
        "{XML_DECLARATION}<soap11env:Envelope xmlns:soap11env=\"{SOAP_ENV_NAMESPACE}\" \
         xmlns:tns=\"{SOAP_TARGET_NAMESPACE}\"><soap11env:Body>{inner}</soap11env:Body></soap11env:Envelope>"
    )
}

// =============================================================================
// Element tree
// =============================================================================

/// Minimal element tree keyed by local name.
#[derive(Debug, Default)]
struct Element {
    name: String,
    text: String,
    /// Set for empty tags and `xsi:nil="true"`
    nil: bool,
    children: Vec<Element>,
}

impl Element {
    fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Trimmed text content, `None` for nil or blank elements.
    fn value(&self) -> Option<&str> {
        let text = self.text.trim();
        if self.nil || text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

fn local_name(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).into_owned()
}

fn is_nil(start: &quick_xml::events::BytesStart<'_>) -> bool {
    start.attributes().flatten().any(|attr| {
        attr.key.local_name().as_ref() == b"nil" && matches!(attr.value.as_ref(), b"true" | b"1")
    })
}

fn parse_document(xml: &str) -> Result<Element, EnvelopeError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(false);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event()? {
            Event::Start(start) => stack.push(Element {
                name: local_name(start.local_name().as_ref()),
                nil: is_nil(&start),
                ..Element::default()
            }),
            Event::Empty(start) => {
                let element = Element {
                    name: local_name(start.local_name().as_ref()),
                    nil: true,
                    ..Element::default()
                };
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None => root = Some(element),
                }
            }
            Event::Text(text) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&text.unescape()?);
                }
            }
            Event::CData(data) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(&data.into_inner()));
                }
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| EnvelopeError::Malformed("unbalanced end tag".to_string()))?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None => root = Some(element),
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(EnvelopeError::Malformed("unexpected end of document".to_string()));
    }
    root.ok_or_else(|| EnvelopeError::Malformed("empty document".to_string()))
}

// =============================================================================
// Errors
// =============================================================================

/// Request envelopes that cannot be turned into a call. All are client faults.
#[derive(Debug, thiserror::Error)]
pub enum EnvelopeError {
    #[error("invalid xml: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("malformed envelope: {0}")]
    Malformed(String),

    #[error("unknown operation: {0}")]
    UnknownOperation(String),

    #[error("bad argument: {0}")]
    BadArgument(String),
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const GET_TRAINER: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/" xmlns:tns="trainer.soap.api">
  <soapenv:Header/>
  <soapenv:Body>
    <tns:GetTrainer>
      <tns:id>3</tns:id>
    </tns:GetTrainer>
  </soapenv:Body>
</soapenv:Envelope>"#;

    const POST_TRAINER: &str = r#"<soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/" xmlns:tns="trainer.soap.api">
  <soapenv:Body>
    <tns:PostTrainer>
      <tns:name>Ash &amp; Pikachu</tns:name>
      <tns:age>10</tns:age>
      <tns:pokemons>
        <tns:string>Pikachu</tns:string>
        <tns:string><![CDATA[Mr. Mime]]></tns:string>
      </tns:pokemons>
    </tns:PostTrainer>
  </soapenv:Body>
</soapenv:Envelope>"#;

    #[test]
    fn test_decode_get_trainer() {
        assert_eq!(
            SoapRequest::decode(GET_TRAINER).unwrap(),
            SoapRequest::GetTrainer { id: 3 }
        );
    }

    #[test]
    fn test_decode_post_trainer() {
        let request = SoapRequest::decode(POST_TRAINER).unwrap();
        assert_eq!(request.operation(), "PostTrainer");
        assert_eq!(
            request,
            SoapRequest::PostTrainer(
                NewTrainer::new("Ash & Pikachu")
                    .with_age(10)
                    .with_items(["Pikachu", "Mr. Mime"])
            )
        );
    }

    #[test]
    fn test_decode_nil_age_and_missing_items() {
        let xml = r#"<e:Envelope xmlns:e="http://schemas.xmlsoap.org/soap/envelope/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
  <e:Body><PostTrainer><name>Misty</name><age xsi:nil="true"></age></PostTrainer></e:Body>
</e:Envelope>"#;
        assert_eq!(
            SoapRequest::decode(xml).unwrap(),
            SoapRequest::PostTrainer(NewTrainer::new("Misty"))
        );
    }

    #[test]
    fn test_decode_trims_pretty_printed_items() {
        let xml = r#"<e:Envelope xmlns:e="http://schemas.xmlsoap.org/soap/envelope/">
  <e:Body>
    <PostTrainer>
      <name>
        Brock
      </name>
      <pokemons>
        <string>
          Onix
        </string>
        <string/>
      </pokemons>
    </PostTrainer>
  </e:Body>
</e:Envelope>"#;
        assert_eq!(
            SoapRequest::decode(xml).unwrap(),
            SoapRequest::PostTrainer(NewTrainer::new("Brock").with_items(["Onix", ""]))
        );
    }

    #[test]
    fn test_decode_errors() {
        assert!(matches!(
            SoapRequest::decode("<Envelope><Body/></Envelope>"),
            Err(EnvelopeError::Malformed(_))
        ));
        assert!(matches!(
            SoapRequest::decode("<Envelope><Body><DeleteTrainer/></Body></Envelope>"),
            Err(EnvelopeError::UnknownOperation(op)) if op == "DeleteTrainer"
        ));
        assert!(matches!(
            SoapRequest::decode("<Envelope><Body><GetTrainer><id>abc</id></GetTrainer></Body></Envelope>"),
            Err(EnvelopeError::BadArgument(_))
        ));
        assert!(matches!(
            SoapRequest::decode("<Envelope><Body><GetTrainer></GetTrainer></Body></Envelope>"),
            Err(EnvelopeError::BadArgument(_))
        ));
        assert!(SoapRequest::decode("<Envelope><Body>").is_err());
    }

    #[test]
    fn test_encode_escapes_text() {
        let xml = encode_get_trainer_response(&["Name: <Team Rocket>".to_string()]);
        assert!(xml.contains("<tns:string>Name: &lt;Team Rocket&gt;</tns:string>"));
        assert!(xml.contains(SOAP_TARGET_NAMESPACE));

        let fault = encode_fault(FaultCode::Server, "storage unavailable");
        assert!(fault.contains("<faultcode>soap11env:Server</faultcode>"));
    }
}
