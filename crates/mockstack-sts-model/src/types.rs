//! STS shapes shared by several outputs.

use std::io::{self, Write};

use chrono::{DateTime, Utc};
use mockstack_http::query::xml::{XmlSerialize, write_text_element, write_timestamp};
use quick_xml::Writer;

/// Temporary security credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: String,
    pub expiration: DateTime<Utc>,
}

impl XmlSerialize for Credentials {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        write_text_element(writer, "AccessKeyId", &self.access_key_id)?;
        write_text_element(writer, "SecretAccessKey", &self.secret_access_key)?;
        write_text_element(writer, "SessionToken", &self.session_token)?;
        write_timestamp(writer, "Expiration", &self.expiration)
    }
}

/// The `assumed-role` principal a session acts as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssumedRoleUser {
    /// `<RoleId>:<RoleSessionName>`.
    pub assumed_role_id: String,
    pub arn: String,
}

impl XmlSerialize for AssumedRoleUser {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        write_text_element(writer, "AssumedRoleId", &self.assumed_role_id)?;
        write_text_element(writer, "Arn", &self.arn)
    }
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
