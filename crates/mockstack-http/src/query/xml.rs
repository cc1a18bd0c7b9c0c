//! XML serialization for `awsQuery` responses.
//!
//! Successful responses are wrapped in the standard envelope:
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <GetRoleResponse xmlns="https://iam.amazonaws.com/doc/2010-05-08/">
//!   <GetRoleResult>...</GetRoleResult>
//!   <ResponseMetadata><RequestId>...</RequestId></ResponseMetadata>
//! </GetRoleResponse>
//! ```
//!
//! The `<{Action}Result>` element is omitted for actions without output.
//! Booleans are lowercase and timestamps are ISO 8601 with milliseconds.

use std::io::{self, Write};

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesText, Event};

/// Errors raised while writing XML.
#[derive(Debug, thiserror::Error)]
pub enum XmlError {
    /// An I/O error from the underlying writer.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Types that write themselves as child elements of an XML context.
///
/// Uses `io::Result` because `quick_xml::Writer` closures require it.
pub trait XmlSerialize {
    /// Write this value's members into `writer`.
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()>;
}

impl XmlSerialize for () {
    fn serialize_xml<W: Write>(&self, _writer: &mut Writer<W>) -> io::Result<()> {
        Ok(())
    }
}

fn write_declaration<W: Write>(writer: &mut Writer<W>) -> io::Result<()> {
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
}

fn write_response_metadata<W: Write>(writer: &mut Writer<W>, request_id: &str) -> io::Result<()> {
    writer
        .create_element("ResponseMetadata")
        .write_inner_content(|w| write_text_element(w, "RequestId", request_id))?;
    Ok(())
}

/// Build a complete `<{Action}Response>` document with a `<{Action}Result>` body.
pub fn to_query_response<T: XmlSerialize>(
    action: &str,
    namespace: &str,
    output: &T,
    request_id: &str,
) -> Result<Vec<u8>, XmlError> {
    let mut buf = Vec::with_capacity(512);
    let mut writer = Writer::new(&mut buf);
    write_declaration(&mut writer)?;

    let result_tag = format!("{action}Result");
    writer
        .create_element(format!("{action}Response"))
        .with_attribute(("xmlns", namespace))
        .write_inner_content(|w| {
            w.create_element(result_tag.as_str())
                .write_inner_content(|w| output.serialize_xml(w))?;
            write_response_metadata(w, request_id)
        })?;

    Ok(buf)
}

/// Build a `<{Action}Response>` document for an action without output.
pub fn to_empty_query_response(
    action: &str,
    namespace: &str,
    request_id: &str,
) -> Result<Vec<u8>, XmlError> {
    let mut buf = Vec::with_capacity(256);
    let mut writer = Writer::new(&mut buf);
    write_declaration(&mut writer)?;

    writer
        .create_element(format!("{action}Response"))
        .with_attribute(("xmlns", namespace))
        .write_inner_content(|w| write_response_metadata(w, request_id))?;

    Ok(buf)
}

/// Format an `awsQuery` error document.
///
/// ```xml
/// <ErrorResponse xmlns="...">
///   <Error><Type>Sender</Type><Code>NoSuchEntity</Code><Message>...</Message></Error>
///   <RequestId>...</RequestId>
/// </ErrorResponse>
/// ```
#[must_use]
pub fn error_to_xml(
    fault: &str,
    code: &str,
    message: &str,
    namespace: &str,
    request_id: &str,
) -> Vec<u8> {
    let mut buf = Vec::with_capacity(256);
    if let Err(e) = write_error_xml(&mut buf, fault, code, message, namespace, request_id) {
        tracing::error!(error = %e, "failed to serialize error XML");
        buf.clear();
    }
    buf
}

fn write_error_xml(
    buf: &mut Vec<u8>,
    fault: &str,
    code: &str,
    message: &str,
    namespace: &str,
    request_id: &str,
) -> io::Result<()> {
    let mut writer = Writer::new(buf);
    write_declaration(&mut writer)?;

    writer
        .create_element("ErrorResponse")
        .with_attribute(("xmlns", namespace))
        .write_inner_content(|w| {
            w.create_element("Error").write_inner_content(|w| {
                write_text_element(w, "Type", fault)?;
                write_text_element(w, "Code", code)?;
                write_text_element(w, "Message", message)
            })?;
            write_text_element(w, "RequestId", request_id)
        })?;

    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers for XmlSerialize implementations
// ---------------------------------------------------------------------------

/// Write `<tag>text</tag>`.
pub fn write_text_element<W: Write>(writer: &mut Writer<W>, tag: &str, text: &str) -> io::Result<()> {
    writer
        .create_element(tag)
        .write_text_content(BytesText::new(text))?;
    Ok(())
}

/// Write `<tag>text</tag>` only if the value is `Some`.
pub fn write_optional_text<W: Write>(
    writer: &mut Writer<W>,
    tag: &str,
    value: Option<&str>,
) -> io::Result<()> {
    if let Some(v) = value {
        write_text_element(writer, tag, v)?;
    }
    Ok(())
}

/// Write `<tag>true|false</tag>`.
pub fn write_bool<W: Write>(writer: &mut Writer<W>, tag: &str, value: bool) -> io::Result<()> {
    write_text_element(writer, tag, if value { "true" } else { "false" })
}

/// Write `<tag>n</tag>` for any integer.
pub fn write_number<W: Write, N: std::fmt::Display>(
    writer: &mut Writer<W>,
    tag: &str,
    value: N,
) -> io::Result<()> {
    write_text_element(writer, tag, &value.to_string())
}

/// Write `<tag>n</tag>` only if the value is `Some`.
pub fn write_optional_number<W: Write, N: std::fmt::Display>(
    writer: &mut Writer<W>,
    tag: &str,
    value: Option<N>,
) -> io::Result<()> {
    if let Some(v) = value {
        write_number(writer, tag, v)?;
    }
    Ok(())
}

/// Write `<tag>iso8601</tag>`.
pub fn write_timestamp<W: Write>(
    writer: &mut Writer<W>,
    tag: &str,
    value: &chrono::DateTime<chrono::Utc>,
) -> io::Result<()> {
    write_text_element(writer, tag, &format_timestamp(value))
}

/// Write `<tag><member>..</member>...</tag>`, each member produced by `f`.
pub fn write_member_list<W, T, F>(
    writer: &mut Writer<W>,
    tag: &str,
    items: &[T],
    mut f: F,
) -> io::Result<()>
where
    W: Write,
    F: FnMut(&mut Writer<W>, &T) -> io::Result<()>,
{
    writer.create_element(tag).write_inner_content(|w| {
        for item in items {
            w.create_element("member")
                .write_inner_content(|w| f(w, item))?;
        }
        Ok(())
    })?;
    Ok(())
}

/// Write `<tag><member>text</member>...</tag>`.
pub fn write_string_list<W: Write>(
    writer: &mut Writer<W>,
    tag: &str,
    items: &[String],
) -> io::Result<()> {
    writer.create_element(tag).write_inner_content(|w| {
        for item in items {
            write_text_element(w, "member", item)?;
        }
        Ok(())
    })?;
    Ok(())
}

/// Format a timestamp as ISO 8601 with milliseconds and a `Z` suffix.
#[must_use]
pub fn format_timestamp(dt: &chrono::DateTime<chrono::Utc>) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Role {
        name: &'static str,
        tags: Vec<(&'static str, &'static str)>,
    }

    impl XmlSerialize for Role {
        fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
            writer.create_element("Role").write_inner_content(|w| {
                write_text_element(w, "RoleName", self.name)?;
                write_optional_text(w, "Description", None)?;
                write_bool(w, "Truncated", false)?;
                write_member_list(w, "Tags", &self.tags, |w, (k, v)| {
                    write_text_element(w, "Key", k)?;
                    write_text_element(w, "Value", v)
                })
            })?;
            Ok(())
        }
    }

    fn text(bytes: &[u8]) -> &str {
        std::str::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_should_wrap_result_in_response_envelope() {
        let role = Role {
            name: "admin",
            tags: vec![("env", "dev")],
        };
        let xml = to_query_response("GetRole", "urn:test", &role, "req-1").unwrap();
        let xml = text(&xml);
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains("<GetRoleResponse xmlns=\"urn:test\"><GetRoleResult><Role>"));
        assert!(xml.contains("<RoleName>admin</RoleName>"));
        assert!(!xml.contains("Description"));
        assert!(xml.contains("<Truncated>false</Truncated>"));
        assert!(xml.contains("<Tags><member><Key>env</Key><Value>dev</Value></member></Tags>"));
        assert!(xml.contains(
            "</GetRoleResult><ResponseMetadata><RequestId>req-1</RequestId></ResponseMetadata>"
        ));
    }

    #[test]
    fn test_should_omit_result_for_void_actions() {
        let xml = to_empty_query_response("DeleteRole", "urn:test", "req-2").unwrap();
        let xml = text(&xml);
        assert!(!xml.contains("DeleteRoleResult"));
        assert!(xml.contains("<DeleteRoleResponse xmlns=\"urn:test\"><ResponseMetadata>"));
    }

    #[test]
    fn test_should_format_error_envelope_with_escaping() {
        let xml = error_to_xml("Sender", "NoSuchEntity", "Role <r> & co", "urn:test", "req-3");
        let xml = text(&xml);
        assert!(xml.contains("<ErrorResponse xmlns=\"urn:test\"><Error><Type>Sender</Type>"));
        assert!(xml.contains("<Code>NoSuchEntity</Code>"));
        assert!(xml.contains("<Message>Role &lt;r&gt; &amp; co</Message>"));
        assert!(xml.contains("</Error><RequestId>req-3</RequestId></ErrorResponse>"));
    }

    #[test]
    fn test_should_format_timestamps_with_millis() {
        let dt = chrono::DateTime::parse_from_rfc3339("2024-01-02T03:04:05Z")
            .unwrap()
            .with_timezone(&chrono::Utc);
        assert_eq!(format_timestamp(&dt), "2024-01-02T03:04:05.000Z");
    }
}
