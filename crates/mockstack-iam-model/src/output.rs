//! IAM operation outputs and their `<{Action}Result>` contents.

use std::io::{self, Write};

use mockstack_http::query::xml::{
    XmlSerialize, write_bool, write_member_list, write_optional_text, write_string_list,
    write_text_element,
};
use quick_xml::Writer;

use crate::types::{
    AttachedPolicy, Policy, PolicyVersion, Role, Tag, User, encode_document, write_nested,
};

/// `<IsTruncated>` plus `<Marker>` when more results remain.
fn write_truncation<W: Write>(writer: &mut Writer<W>, marker: Option<&str>) -> io::Result<()> {
    write_bool(writer, "IsTruncated", marker.is_some())?;
    write_optional_text(writer, "Marker", marker)
}

/// Declare a paginated output whose items are written as `<List><member>..</member></List>`.
macro_rules! list_output {
    ($(#[$meta:meta])* $name:ident, $field:ident: $item:ty => $tag:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Eq)]
        pub struct $name {
            pub $field: Vec<$item>,
            /// Index of the next page; `Some` means the listing is truncated.
            pub marker: Option<String>,
        }

        impl XmlSerialize for $name {
            fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
                write_member_list(writer, $tag, &self.$field, |w, item| item.serialize_xml(w))?;
                write_truncation(writer, self.marker.as_deref())
            }
        }
    };
}

/// `CreateRole` / `GetRole`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleOutput {
    pub role: Role,
}

impl XmlSerialize for RoleOutput {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        write_nested(writer, "Role", &self.role)
    }
}

list_output!(ListRolesOutput, roles: Role => "Roles");

/// `UpdateRole` returns an empty result element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateRoleOutput;

impl XmlSerialize for UpdateRoleOutput {
    fn serialize_xml<W: Write>(&self, _writer: &mut Writer<W>) -> io::Result<()> {
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetRolePolicyOutput {
    pub role_name: String,
    pub policy_name: String,
    /// Raw JSON; encoded on output.
    pub policy_document: String,
}

impl XmlSerialize for GetRolePolicyOutput {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        write_text_element(writer, "RoleName", &self.role_name)?;
        write_text_element(writer, "PolicyName", &self.policy_name)?;
        write_text_element(
            writer,
            "PolicyDocument",
            &encode_document(&self.policy_document),
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListRolePoliciesOutput {
    pub policy_names: Vec<String>,
    pub marker: Option<String>,
}

impl XmlSerialize for ListRolePoliciesOutput {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        write_string_list(writer, "PolicyNames", &self.policy_names)?;
        write_truncation(writer, self.marker.as_deref())
    }
}

/// `CreatePolicy` / `GetPolicy`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyOutput {
    pub policy: Policy,
}

impl XmlSerialize for PolicyOutput {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        write_nested(writer, "Policy", &self.policy)
    }
}

list_output!(ListPoliciesOutput, policies: Policy => "Policies");

/// `CreatePolicyVersion` / `GetPolicyVersion`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyVersionOutput {
    pub policy_version: PolicyVersion,
}

impl XmlSerialize for PolicyVersionOutput {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        write_nested(writer, "PolicyVersion", &self.policy_version)
    }
}

list_output!(ListPolicyVersionsOutput, versions: PolicyVersion => "Versions");

list_output!(
    ListAttachedRolePoliciesOutput,
    attached_policies: AttachedPolicy => "AttachedPolicies"
);

list_output!(ListRoleTagsOutput, tags: Tag => "Tags");

/// `CreateUser` / `GetUser`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserOutput {
    pub user: User,
}

impl XmlSerialize for UserOutput {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        write_nested(writer, "User", &self.user)
    }
}

list_output!(ListUsersOutput, users: User => "Users");

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
    fn test_should_mark_truncated_listing() {
        let out = ListRolePoliciesOutput {
            policy_names: vec!["a".to_owned(), "b".to_owned()],
            marker: Some("2".to_owned()),
        };
        assert_eq!(
            render(&out),
            "<PolicyNames><member>a</member><member>b</member></PolicyNames>\
             <IsTruncated>true</IsTruncated><Marker>2</Marker>"
        );
    }

    #[test]
    fn test_should_write_empty_list_untruncated() {
        let xml = render(&ListRoleTagsOutput::default());
        assert_eq!(xml, "<Tags></Tags><IsTruncated>false</IsTruncated>");
    }

    #[test]
    fn test_should_encode_inline_policy_document() {
        let out = GetRolePolicyOutput {
            role_name: "r".to_owned(),
            policy_name: "p".to_owned(),
            policy_document: "{\"a\": 1}".to_owned(),
        };
        assert!(render(&out).contains("<PolicyDocument>%7B%22a%22%3A%201%7D</PolicyDocument>"));
    }
}
