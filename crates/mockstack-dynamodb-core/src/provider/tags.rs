//! TagResource, UntagResource, ListTagsOfResource.

use mockstack_core::pagination::paginate_by_index;
use mockstack_dynamodb_model::DynamoDBError;
use mockstack_dynamodb_model::input::{ListTagsOfResourceInput, TagResourceInput, UntagResourceInput};
use mockstack_dynamodb_model::output::{EmptyOutput, ListTagsOfResourceOutput};
use mockstack_dynamodb_model::types::Tag;
use tracing::debug;

use super::MockStackDynamoDB;
use crate::validate::table_name_from_arn;

const MAX_TAGS_PER_RESOURCE: usize = 50;
const TAGS_PAGE_SIZE: usize = 100;

impl MockStackDynamoDB {
    /// Handle `TagResource`.
    pub fn handle_tag_resource(
        &self,
        input: TagResourceInput,
    ) -> Result<EmptyOutput, DynamoDBError> {
        let table_name = table_name_from_arn(&input.resource_arn)?;
        for tag in &input.tags {
            validate_tag(tag)?;
        }
        let count = input.tags.len();
        self.update_table_record(&table_name, |t| {
            t.tags
                .merge(input.tags.into_iter().map(|tag| (tag.key, tag.value)));
            if t.tags.len() > MAX_TAGS_PER_RESOURCE {
                return Err(DynamoDBError::validation(format!(
                    "One or more parameter values were invalid: The number of tags exceeds the \
                     limit of {MAX_TAGS_PER_RESOURCE}"
                )));
            }
            Ok(())
        })?;
        debug!(resource_arn = %input.resource_arn, count, "tagged resource");
        Ok(EmptyOutput {})
    }

    /// Handle `UntagResource`. Unknown keys are ignored.
    pub fn handle_untag_resource(
        &self,
        input: UntagResourceInput,
    ) -> Result<EmptyOutput, DynamoDBError> {
        let table_name = table_name_from_arn(&input.resource_arn)?;
        self.update_table_record(&table_name, |t| {
            t.tags.remove_keys(&input.tag_keys);
            Ok(())
        })?;
        debug!(resource_arn = %input.resource_arn, "untagged resource");
        Ok(EmptyOutput {})
    }

    /// Handle `ListTagsOfResource`.
    pub fn handle_list_tags_of_resource(
        &self,
        input: ListTagsOfResourceInput,
    ) -> Result<ListTagsOfResourceOutput, DynamoDBError> {
        let table_name = table_name_from_arn(&input.resource_arn)?;
        let table = self.require_table(&table_name)?;
        let tags: Vec<Tag> = table
            .tags
            .iter()
            .map(|(key, value)| Tag {
                key: key.to_owned(),
                value: value.to_owned(),
            })
            .collect();
        let page = paginate_by_index(tags, input.next_token.as_deref(), TAGS_PAGE_SIZE)
            .map_err(|e| DynamoDBError::validation(e.to_string()))?;
        Ok(ListTagsOfResourceOutput {
            tags: page.items,
            next_token: page.next_token,
        })
    }
}

fn validate_tag(tag: &Tag) -> Result<(), DynamoDBError> {
    if tag.key.is_empty() || tag.key.chars().count() > 128 {
        return Err(DynamoDBError::validation(format!(
            "1 validation error detected: Value '{}' at 'tags.member.key' failed to satisfy \
             constraint: Member must have length between 1 and 128",
            tag.key
        )));
    }
    if tag.value.chars().count() > 256 {
        return Err(DynamoDBError::validation(
            "1 validation error detected: Value at 'tags.member.value' failed to satisfy \
             constraint: Member must have length less than or equal to 256",
        ));
    }
    if tag.key.starts_with("aws:") {
        return Err(DynamoDBError::validation(
            "One or more parameter values were invalid: Tag keys starting with 'aws:' are reserved",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use mockstack_dynamodb_model::DynamoDBErrorCode;

    use super::*;
    use crate::provider::test_util::provider_with_table;

    const ARN: &str = "arn:aws:dynamodb:us-east-1:000000000000:table/T";

    fn tag(key: &str, value: &str) -> Tag {
        Tag {
            key: key.to_owned(),
            value: value.to_owned(),
        }
    }

    fn list(p: &MockStackDynamoDB) -> Vec<Tag> {
        p.handle_list_tags_of_resource(ListTagsOfResourceInput {
            resource_arn: ARN.to_owned(),
            next_token: None,
        })
        .unwrap()
        .tags
    }

    #[test]
    fn test_should_merge_tags_overriding_values() {
        let p = provider_with_table("T");
        p.handle_tag_resource(TagResourceInput {
            resource_arn: ARN.to_owned(),
            tags: vec![tag("a", "1"), tag("b", "2")],
        })
        .unwrap();
        p.handle_tag_resource(TagResourceInput {
            resource_arn: ARN.to_owned(),
            tags: vec![tag("b", "3"), tag("c", "4")],
        })
        .unwrap();
        assert_eq!(list(&p), vec![tag("a", "1"), tag("b", "3"), tag("c", "4")]);
    }

    #[test]
    fn test_should_untag_exactly_given_keys() {
        let p = provider_with_table("T");
        p.handle_tag_resource(TagResourceInput {
            resource_arn: ARN.to_owned(),
            tags: vec![tag("a", "1"), tag("b", "2")],
        })
        .unwrap();
        p.handle_untag_resource(UntagResourceInput {
            resource_arn: ARN.to_owned(),
            tag_keys: vec!["a".to_owned(), "missing".to_owned()],
        })
        .unwrap();
        assert_eq!(list(&p), vec![tag("b", "2")]);
    }

    #[test]
    fn test_should_reject_tagging_missing_table() {
        let p = provider_with_table("Other");
        let err = p
            .handle_tag_resource(TagResourceInput {
                resource_arn: ARN.to_owned(),
                tags: vec![tag("a", "1")],
            })
            .unwrap_err();
        assert_eq!(err.code, DynamoDBErrorCode::ResourceNotFoundException);
    }

    #[test]
    fn test_should_reject_reserved_and_oversized_tags() {
        let p = provider_with_table("T");
        for bad in [tag("aws:owner", "x"), tag("", "x"), tag(&"k".repeat(129), "x")] {
            let err = p
                .handle_tag_resource(TagResourceInput {
                    resource_arn: ARN.to_owned(),
                    tags: vec![bad],
                })
                .unwrap_err();
            assert_eq!(err.code, DynamoDBErrorCode::ValidationException);
        }
    }

    #[test]
    fn test_should_reject_invalid_next_token() {
        let p = provider_with_table("T");
        let err = p
            .handle_list_tags_of_resource(ListTagsOfResourceInput {
                resource_arn: ARN.to_owned(),
                next_token: Some("abc".to_owned()),
            })
            .unwrap_err();
        assert_eq!(err.code, DynamoDBErrorCode::ValidationException);
    }
}
