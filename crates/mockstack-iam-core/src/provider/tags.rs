//! Role tagging.

use mockstack_iam_model::IamError;
use mockstack_iam_model::input::{ListForRoleInput, TagRoleInput, UntagRoleInput};
use mockstack_iam_model::output::ListRoleTagsOutput;

use super::{MockStackIam, page};
use crate::state::{keys, to_tags};
use crate::validate::MAX_TAGS;

impl MockStackIam {
    /// Merge tags; a key that is already present takes the new value.
    pub fn handle_tag_role(&self, input: TagRoleInput) -> Result<(), IamError> {
        self.require_role(&input.role_name)?;
        self.state
            .roles
            .try_update(&keys::role(&input.role_name), |record| {
                record
                    .tags
                    .merge(input.tags.into_iter().map(|t| (t.key, t.value)));
                if record.tags.len() > MAX_TAGS {
                    return Err(IamError::limit_exceeded(format!(
                        "The number of tags has reached the maximum limit of {MAX_TAGS}."
                    )));
                }
                Ok(())
            })
    }

    /// Handle `UntagRole`.
    pub fn handle_untag_role(&self, input: UntagRoleInput) -> Result<(), IamError> {
        self.require_role(&input.role_name)?;
        self.state
            .roles
            .try_update(&keys::role(&input.role_name), |record| {
                record.tags.remove_keys(input.tag_keys);
                Ok(())
            })
    }

    /// Handle `ListRoleTags`.
    pub fn handle_list_role_tags(
        &self,
        input: ListForRoleInput,
    ) -> Result<ListRoleTagsOutput, IamError> {
        let record = self.require_role(&input.role_name)?;
        let page = page(to_tags(&record.tags), &input.paging)?;
        Ok(ListRoleTagsOutput {
            tags: page.items,
            marker: page.next_token,
        })
    }
}
