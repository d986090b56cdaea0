//! XML to nested-value conversion.
//!
//! The mapping follows the common XML-to-map convention:
//! - the document becomes `{root_name: content}`
//! - an element with neither attributes nor child elements is its text
//! - attributes are stored under `-name`
//! - text mixed with attributes or children is stored under `#text`
//! - repeated sibling elements collapse into a list
//!
//! All leaf values are strings; no type casting is attempted.

use super::position_at;
use crate::document::value::NestedValue;
use crate::error::SyntaxError;
use indexmap::IndexMap;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

struct Element {
    name: String,
    entries: IndexMap<String, NestedValue>,
    text: String,
}

impl Element {
    fn open(start: &BytesStart<'_>, source: &str, offset: usize) -> Result<Self, SyntaxError> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let mut entries = IndexMap::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| SyntaxError::at(e.to_string(), position_at(source, offset)))?;
            let key = format!("-{}", String::from_utf8_lossy(attr.key.as_ref()));
            let value = attr
                .unescape_value()
                .map_err(|e| SyntaxError::at(e.to_string(), position_at(source, offset)))?;
            entries.insert(key, NestedValue::String(value.into_owned()));
        }
        Ok(Self {
            name,
            entries,
            text: String::new(),
        })
    }

    fn close(self) -> (String, NestedValue) {
        let text = self.text.trim();
        if self.entries.is_empty() {
            return (self.name, NestedValue::String(text.to_string()));
        }
        let mut entries = self.entries;
        if !text.is_empty() {
            entries.insert("#text".to_string(), NestedValue::String(text.to_string()));
        }
        (self.name, NestedValue::Map(entries))
    }

    fn add_child(&mut self, name: String, value: NestedValue) {
        match self.entries.get_mut(&name) {
            None => {
                self.entries.insert(name, value);
            }
            Some(NestedValue::List(items)) => items.push(value),
            Some(existing) => {
                let first = std::mem::replace(existing, NestedValue::Null);
                *existing = NestedValue::List(vec![first, value]);
            }
        }
    }
}

/// Parses an XML document into a nested value.
pub fn parse_xml(source: &str) -> Result<NestedValue, SyntaxError> {
    let mut reader = Reader::from_str(source);
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<(String, NestedValue)> = None;

    loop {
        let offset = reader.buffer_position() as usize;
        let finished = match reader.read_event() {
            Ok(Event::Start(e)) => {
                stack.push(Element::open(&e, source, offset)?);
                None
            }
            Ok(Event::Empty(e)) => Some(Element::open(&e, source, offset)?),
            Ok(Event::End(_)) => match stack.pop() {
                Some(element) => Some(element),
                None => {
                    return Err(SyntaxError::at(
                        "unexpected closing tag",
                        position_at(source, offset),
                    ))
                }
            },
            Ok(Event::Text(e)) => {
                let text = e
                    .unescape()
                    .map_err(|err| SyntaxError::at(err.to_string(), position_at(source, offset)))?;
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&text);
                }
                None
            }
            Ok(Event::CData(e)) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&String::from_utf8_lossy(e.as_ref()));
                }
                None
            }
            Ok(Event::Eof) => break,
            // declarations, comments, processing instructions, doctype
            Ok(_) => None,
            Err(e) => {
                let at = reader.error_position() as usize;
                return Err(SyntaxError::at(e.to_string(), position_at(source, at)));
            }
        };

        if let Some(element) = finished {
            let (name, value) = element.close();
            match stack.last_mut() {
                Some(parent) => parent.add_child(name, value),
                None if root.is_some() => {
                    return Err(SyntaxError::at(
                        "multiple root elements",
                        position_at(source, offset),
                    ))
                }
                None => root = Some((name, value)),
            }
        }
    }

    if let Some(open) = stack.last() {
        return Err(SyntaxError::new(format!(
            "unexpected end of input, <{}> is not closed",
            open.name
        )));
    }

    let (name, value) = root.ok_or_else(|| SyntaxError::new("no root element"))?;
    let mut document = IndexMap::new();
    document.insert(name, value);
    Ok(NestedValue::Map(document))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &str) -> NestedValue {
        NestedValue::String(v.to_string())
    }

    #[test]
    fn test_text_only_element_is_string() {
        let value = parse_xml("<?xml version=\"1.0\"?>\n<name>demo</name>").unwrap();
        assert_eq!(value.as_map().unwrap()["name"], s("demo"));
    }

    #[test]
    fn test_attributes_and_text() {
        let value = parse_xml(r#"<server port="80" tls="off">main</server>"#).unwrap();
        let server = value.as_map().unwrap()["server"].as_map().unwrap();
        assert_eq!(server["-port"], s("80"));
        assert_eq!(server["-tls"], s("off"));
        assert_eq!(server["#text"], s("main"));
    }

    #[test]
    fn test_repeated_siblings_become_list() {
        let src = "<hosts>\n  <host>a</host>\n  <host>b</host>\n  <host>c</host>\n  <owner>x</owner>\n</hosts>";
        let value = parse_xml(src).unwrap();
        let hosts = value.as_map().unwrap()["hosts"].as_map().unwrap();
        assert_eq!(hosts["host"], NestedValue::List(vec![s("a"), s("b"), s("c")]));
        assert_eq!(hosts["owner"], s("x"));
        assert!(!hosts.contains_key("#text"));
    }

    #[test]
    fn test_empty_element_and_escapes() {
        let value = parse_xml(r#"<a><b/><c>1 &lt; 2</c><d><![CDATA[<raw>]]></d></a>"#).unwrap();
        let a = value.as_map().unwrap()["a"].as_map().unwrap();
        assert_eq!(a["b"], s(""));
        assert_eq!(a["c"], s("1 < 2"));
        assert_eq!(a["d"], s("<raw>"));
    }

    #[test]
    fn test_mismatched_tags_fail() {
        assert!(parse_xml("<a><b></a>").is_err());
    }

    #[test]
    fn test_unclosed_element_fails() {
        assert!(parse_xml("<a><b>text</b>").is_err());
    }

    #[test]
    fn test_empty_document_fails() {
        assert!(parse_xml("  ").is_err());
    }
}
