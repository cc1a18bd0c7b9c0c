//! STS operation outputs.

use std::io::{self, Write};

use mockstack_http::query::xml::{
    XmlSerialize, write_optional_number, write_optional_text, write_text_element,
};
use quick_xml::Writer;

use crate::types::{AssumedRoleUser, Credentials, write_nested};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetCallerIdentityOutput {
    pub user_id: String,
    pub account: String,
    pub arn: String,
}

impl XmlSerialize for GetCallerIdentityOutput {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        write_text_element(writer, "UserId", &self.user_id)?;
        write_text_element(writer, "Account", &self.account)?;
        write_text_element(writer, "Arn", &self.arn)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssumeRoleOutput {
    pub credentials: Credentials,
    pub assumed_role_user: AssumedRoleUser,
    /// Percentage of the session policy size limit used.
    pub packed_policy_size: Option<i32>,
    pub source_identity: Option<String>,
}

impl XmlSerialize for AssumeRoleOutput {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        write_nested(writer, "Credentials", &self.credentials)?;
        write_nested(writer, "AssumedRoleUser", &self.assumed_role_user)?;
        write_optional_number(writer, "PackedPolicySize", self.packed_policy_size)?;
        write_optional_text(writer, "SourceIdentity", self.source_identity.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssumeRoleWithWebIdentityOutput {
    pub credentials: Credentials,
    pub subject_from_web_identity_token: String,
    pub assumed_role_user: AssumedRoleUser,
    pub packed_policy_size: Option<i32>,
    pub provider: Option<String>,
    pub audience: Option<String>,
}

impl XmlSerialize for AssumeRoleWithWebIdentityOutput {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        write_nested(writer, "Credentials", &self.credentials)?;
        write_text_element(
            writer,
            "SubjectFromWebIdentityToken",
            &self.subject_from_web_identity_token,
        )?;
        write_nested(writer, "AssumedRoleUser", &self.assumed_role_user)?;
        write_optional_number(writer, "PackedPolicySize", self.packed_policy_size)?;
        write_optional_text(writer, "Provider", self.provider.as_deref())?;
        write_optional_text(writer, "Audience", self.audience.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetSessionTokenOutput {
    pub credentials: Credentials,
}

impl XmlSerialize for GetSessionTokenOutput {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        write_nested(writer, "Credentials", &self.credentials)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetAccessKeyInfoOutput {
    pub account: String,
}

impl XmlSerialize for GetAccessKeyInfoOutput {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        write_text_element(writer, "Account", &self.account)
    }
}
