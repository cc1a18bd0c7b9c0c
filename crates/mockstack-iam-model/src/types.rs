//! IAM entity shapes and their XML form.
//!
//! Each entity writes its members only; the enclosing element (`<Role>`,
//! `<member>`) is written by the output that contains it.

use std::io::{self, Write};

use chrono::{DateTime, Utc};
use mockstack_http::query::xml::{
    XmlSerialize, write_bool, write_member_list, write_number, write_optional_text,
    write_text_element, write_timestamp,
};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use quick_xml::Writer;

/// Characters left unescaped in returned policy documents.
const DOCUMENT_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// URL-encode a policy document the way IAM returns it.
#[must_use]
pub fn encode_document(document: &str) -> String {
    utf8_percent_encode(document, DOCUMENT_ENCODE_SET).to_string()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub key: String,
    pub value: String,
}

impl XmlSerialize for Tag {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        write_text_element(writer, "Key", &self.key)?;
        write_text_element(writer, "Value", &self.value)
    }
}

/// `<Tags><member>..</member></Tags>`, omitted when empty.
pub(crate) fn write_tags<W: Write>(writer: &mut Writer<W>, tags: &[Tag]) -> io::Result<()> {
    if tags.is_empty() {
        return Ok(());
    }
    write_member_list(writer, "Tags", tags, |w, t| t.serialize_xml(w))
}

/// Write `<tag>` containing `value`'s members.
pub(crate) fn write_nested<W: Write, T: XmlSerialize>(
    writer: &mut Writer<W>,
    tag: &str,
    value: &T,
) -> io::Result<()> {
    writer
        .create_element(tag)
        .write_inner_content(|w| value.serialize_xml(w))?;
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    pub path: String,
    pub role_name: String,
    pub role_id: String,
    pub arn: String,
    pub create_date: DateTime<Utc>,
    /// Raw JSON; encoded on output.
    pub assume_role_policy_document: String,
    pub description: Option<String>,
    pub max_session_duration: i32,
    pub tags: Vec<Tag>,
}

impl XmlSerialize for Role {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        write_text_element(writer, "Path", &self.path)?;
        write_text_element(writer, "RoleName", &self.role_name)?;
        write_text_element(writer, "RoleId", &self.role_id)?;
        write_text_element(writer, "Arn", &self.arn)?;
        write_timestamp(writer, "CreateDate", &self.create_date)?;
        write_text_element(
            writer,
            "AssumeRolePolicyDocument",
            &encode_document(&self.assume_role_policy_document),
        )?;
        write_optional_text(writer, "Description", self.description.as_deref())?;
        write_number(writer, "MaxSessionDuration", self.max_session_duration)?;
        write_tags(writer, &self.tags)
    }
}

/// A customer managed policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Policy {
    pub policy_name: String,
    pub policy_id: String,
    pub arn: String,
    pub path: String,
    pub default_version_id: String,
    pub attachment_count: i32,
    pub description: Option<String>,
    pub create_date: DateTime<Utc>,
    pub update_date: DateTime<Utc>,
    pub tags: Vec<Tag>,
}

impl XmlSerialize for Policy {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        write_text_element(writer, "PolicyName", &self.policy_name)?;
        write_text_element(writer, "PolicyId", &self.policy_id)?;
        write_text_element(writer, "Arn", &self.arn)?;
        write_text_element(writer, "Path", &self.path)?;
        write_text_element(writer, "DefaultVersionId", &self.default_version_id)?;
        write_number(writer, "AttachmentCount", self.attachment_count)?;
        write_number(writer, "PermissionsBoundaryUsageCount", 0)?;
        write_bool(writer, "IsAttachable", true)?;
        write_optional_text(writer, "Description", self.description.as_deref())?;
        write_timestamp(writer, "CreateDate", &self.create_date)?;
        write_timestamp(writer, "UpdateDate", &self.update_date)?;
        write_tags(writer, &self.tags)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyVersion {
    /// Raw JSON; `None` where the action does not return documents.
    pub document: Option<String>,
    pub version_id: String,
    pub is_default_version: bool,
    pub create_date: DateTime<Utc>,
}

impl XmlSerialize for PolicyVersion {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        if let Some(doc) = &self.document {
            write_text_element(writer, "Document", &encode_document(doc))?;
        }
        write_text_element(writer, "VersionId", &self.version_id)?;
        write_bool(writer, "IsDefaultVersion", self.is_default_version)?;
        write_timestamp(writer, "CreateDate", &self.create_date)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachedPolicy {
    pub policy_name: String,
    pub policy_arn: String,
}

impl XmlSerialize for AttachedPolicy {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        write_text_element(writer, "PolicyName", &self.policy_name)?;
        write_text_element(writer, "PolicyArn", &self.policy_arn)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub path: String,
    pub user_name: String,
    pub user_id: String,
    pub arn: String,
    pub create_date: DateTime<Utc>,
    pub tags: Vec<Tag>,
}

impl XmlSerialize for User {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        write_text_element(writer, "Path", &self.path)?;
        write_text_element(writer, "UserName", &self.user_name)?;
        write_text_element(writer, "UserId", &self.user_id)?;
        write_text_element(writer, "Arn", &self.arn)?;
        write_timestamp(writer, "CreateDate", &self.create_date)?;
        write_tags(writer, &self.tags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render<T: XmlSerialize>(value: &T) -> String {
        let mut buf = Vec::new();
        let mut writer = Writer::new(&mut buf);
        value.serialize_xml(&mut writer).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_should_url_encode_documents() {
        assert_eq!(
            encode_document(r#"{"Version":"2012-10-17"}"#),
            "%7B%22Version%22%3A%222012-10-17%22%7D"
        );
    }

    #[test]
    fn test_should_render_role_members() {
        let role = Role {
            path: "/".to_owned(),
            role_name: "app".to_owned(),
            role_id: "AROAEXAMPLE".to_owned(),
            arn: "arn:aws:iam::000000000000:role/app".to_owned(),
            create_date: DateTime::from_timestamp(0, 0).unwrap(),
            assume_role_policy_document: "{}".to_owned(),
            description: None,
            max_session_duration: 3600,
            tags: vec![],
        };
        let xml = render(&role);
        assert!(xml.starts_with("<Path>/</Path><RoleName>app</RoleName>"));
        assert!(xml.contains("<CreateDate>1970-01-01T00:00:00.000Z</CreateDate>"));
        assert!(xml.contains("<AssumeRolePolicyDocument>%7B%7D</AssumeRolePolicyDocument>"));
        assert!(!xml.contains("Tags"));
        assert!(!xml.contains("Description"));
    }

    #[test]
    fn test_should_omit_document_in_version_listings() {
        let version = PolicyVersion {
            document: None,
            version_id: "v2".to_owned(),
            is_default_version: true,
            create_date: DateTime::from_timestamp(0, 0).unwrap(),
        };
        let xml = render(&version);
        assert!(!xml.contains("Document"));
        assert!(xml.contains("<IsDefaultVersion>true</IsDefaultVersion>"));
    }
}
