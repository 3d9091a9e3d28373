//! CAS 2+ service response parsing
//!
//! A `serviceValidate` body looks like:
//!
//! ```text
//! <cas:serviceResponse xmlns:cas="http://www.yale.edu/tp/cas">
//!   <cas:authenticationSuccess>
//!     <cas:user>bob</cas:user>
//!     <cas:attributes>
//!       <cas:role>admin</cas:role>
//!       <cas:role>user</cas:role>
//!     </cas:attributes>
//!   </cas:authenticationSuccess>
//! </cas:serviceResponse>
//! ```
//!
//! or carries an `authenticationFailure` element with a `code` attribute.
//! Elements are matched on their local name, so the namespace prefix is not
//! significant.

use crate::error::{CasError, Result};
use crate::response::{Attributes, AuthenticationResponse};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// Minimal element tree built from the response document
#[derive(Debug, Default)]
struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    text: String,
    children: Vec<Element>,
}

impl Element {
    fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|child| child.name == name)
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Elements of `authenticationSuccess` that are not user attributes
const RESERVED_SUCCESS_ELEMENTS: &[&str] = &["user", "attributes", "proxyGrantingTicket", "proxies"];

/// Parse a `serviceValidate` response body.
///
/// An `authenticationFailure` document is returned as
/// [`CasError::AuthenticationFailure`]; anything that is neither success nor
/// failure is a [`CasError::Parse`].
pub fn parse_service_response(body: &str) -> Result<AuthenticationResponse> {
    let root = parse_document(body)?;
    if root.name != "serviceResponse" {
        return Err(CasError::Parse(format!(
            "unexpected root element <{}>",
            root.name
        )));
    }

    let outcome = root
        .children
        .first()
        .ok_or_else(|| CasError::Parse("empty serviceResponse".to_string()))?;

    match outcome.name.as_str() {
        "authenticationSuccess" => parse_success(outcome),
        "authenticationFailure" => Err(CasError::AuthenticationFailure {
            code: outcome.attribute("code").unwrap_or_default().to_string(),
            description: outcome.text.trim().to_string(),
        }),
        other => Err(CasError::Parse(format!(
            "unexpected element <{}> in serviceResponse",
            other
        ))),
    }
}

fn parse_success(success: &Element) -> Result<AuthenticationResponse> {
    let user = success
        .child("user")
        .map(|user| user.text.trim())
        .filter(|user| !user.is_empty())
        .ok_or_else(|| CasError::Parse("authenticationSuccess without user".to_string()))?;

    let mut attributes = Attributes::new();
    if let Some(block) = success.child("attributes") {
        for entry in &block.children {
            fold_attribute(&mut attributes, entry);
        }
    }

    // Some servers put attributes directly under authenticationSuccess
    for entry in success
        .children
        .iter()
        .filter(|child| !RESERVED_SUCCESS_ELEMENTS.contains(&child.name.as_str()))
    {
        fold_attribute(&mut attributes, entry);
    }

    Ok(AuthenticationResponse::new(user).with_attributes(attributes))
}

/// Add one attribute element, either `<cas:name>value</cas:name>` or
/// `<cas:attribute name="name" value="value"/>`.
fn fold_attribute(attributes: &mut Attributes, entry: &Element) {
    if entry.name == "attribute" {
        if let Some(name) = entry.attribute("name") {
            let value = entry
                .attribute("value")
                .map(str::to_string)
                .unwrap_or_else(|| entry.text.trim().to_string());
            attributes.add(name, value);
            return;
        }
    }

    attributes.add(entry.name.clone(), entry.text.trim());
}

fn parse_document(body: &str) -> Result<Element> {
    let mut reader = Reader::from_str(body);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event()? {
            Event::Start(start) => stack.push(element(&start)?),
            Event::Empty(start) => attach(&mut stack, &mut root, element(&start)?)?,
            Event::End(_) => {
                let finished = stack
                    .pop()
                    .ok_or_else(|| CasError::Parse("unbalanced closing tag".to_string()))?;
                attach(&mut stack, &mut root, finished)?;
            }
            Event::Text(text) => {
                if let Some(current) = stack.last_mut() {
                    let text = text
                        .unescape()
                        .map_err(|e| CasError::Parse(format!("bad text content: {}", e)))?;
                    current.text.push_str(&text);
                }
            }
            Event::CData(data) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(&data));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(CasError::Parse("unexpected end of document".to_string()));
    }

    root.ok_or_else(|| CasError::Parse("empty document".to_string()))
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, finished: Element) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(finished),
        None if root.is_none() => *root = Some(finished),
        None => return Err(CasError::Parse("multiple root elements".to_string())),
    }
    Ok(())
}

fn element(start: &BytesStart<'_>) -> Result<Element> {
    let name = utf8(start.local_name().as_ref())?;

    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| CasError::Parse(format!("bad attribute: {}", e)))?;
        let key = utf8(attr.key.local_name().as_ref())?;
        let value = attr
            .unescape_value()
            .map_err(|e| CasError::Parse(format!("bad attribute value: {}", e)))?;
        attributes.push((key, value.into_owned()));
    }

    Ok(Element {
        name,
        attributes,
        ..Element::default()
    })
}

fn utf8(bytes: &[u8]) -> Result<String> {
    std::str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(|e| CasError::Parse(format!("invalid UTF-8 in element name: {}", e)))
}
