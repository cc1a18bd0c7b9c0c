//! IAM users. Users carry no credentials; they exist so that identity
//! lookups by name succeed.

use chrono::{DateTime, Utc};
use mockstack_core::{TagSet, ids};
use mockstack_iam_model::IamError;
use mockstack_iam_model::input::{CreateUserInput, GetUserInput, ListUsersInput, UserNameInput};
use mockstack_iam_model::output::{ListUsersOutput, UserOutput};
use mockstack_iam_model::types::User;
use tracing::info;

use super::{MockStackIam, page};
use crate::state::{UserRecord, keys};
use crate::validate::{MAX_TAGS, path_matches, resolve_path, validate_user_name};

impl MockStackIam {
    /// The identity `GetUser` describes when no `UserName` is given: the
    /// account root.
    fn caller_identity(&self) -> User {
        User {
            path: "/".to_owned(),
            user_name: "root".to_owned(),
            user_id: self.config.account_id.to_string(),
            arn: format!("arn:aws:iam::{}:root", self.config.account_id),
            create_date: DateTime::<Utc>::default(),
            tags: Vec::new(),
        }
    }

    /// Handle `CreateUser`.
    pub fn handle_create_user(&self, input: CreateUserInput) -> Result<UserOutput, IamError> {
        validate_user_name(&input.user_name)?;
        let path = resolve_path(input.path)?;
        if input.tags.len() > MAX_TAGS {
            return Err(IamError::limit_exceeded(format!(
                "The number of tags has reached the maximum limit of {MAX_TAGS}."
            )));
        }
        let record = UserRecord {
            user: User {
                arn: self.entity_arn("user", &path, &input.user_name),
                path,
                user_name: input.user_name.clone(),
                user_id: ids::aws_unique_id("AIDA"),
                create_date: Utc::now(),
                tags: Vec::new(),
            },
            tags: input.tags.into_iter().map(|t| (t.key, t.value)).collect::<TagSet>(),
        };
        self.state
            .users
            .insert_new(keys::user(&input.user_name), record.clone())
            .map_err(|_| {
                IamError::already_exists(format!(
                    "User with name {} already exists.",
                    input.user_name
                ))
            })?;
        info!(user_name = %input.user_name, "created user");
        Ok(UserOutput {
            user: record.describe(),
        })
    }

    /// Handle `GetUser`.
    pub fn handle_get_user(&self, input: GetUserInput) -> Result<UserOutput, IamError> {
        let user = match input.user_name {
            None => self.caller_identity(),
            Some(name) => self
                .state
                .users
                .find(&keys::user(&name))
                .ok_or_else(|| IamError::user_not_found(&name))?
                .describe(),
        };
        Ok(UserOutput { user })
    }

    /// Handle `DeleteUser`.
    pub fn handle_delete_user(&self, input: UserNameInput) -> Result<(), IamError> {
        self.state
            .users
            .delete(&keys::user(&input.user_name))
            .ok_or_else(|| IamError::user_not_found(&input.user_name))?;
        info!(user_name = %input.user_name, "deleted user");
        Ok(())
    }

    /// Handle `ListUsers`.
    pub fn handle_list_users(&self, input: ListUsersInput) -> Result<ListUsersOutput, IamError> {
        let users: Vec<User> = self
            .state
            .users
            .list_values(keys::USER_PREFIX)
            .iter()
            .filter(|r| path_matches(&r.user.path, input.path_prefix.as_deref()))
            .map(UserRecord::describe)
            .collect();
        let page = page(users, &input.paging)?;
        Ok(ListUsersOutput {
            users: page.items,
            marker: page.next_token,
        })
    }
}
