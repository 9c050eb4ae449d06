use termsync_model::UpdateBehavior;

/// Placeholder name that designates the site collection group.
pub const SITE_COLLECTION_GROUP_SENTINEL: &str = "{sitecollectiontermgroupname}";

/// Configuration for the provisioner.
#[derive(Debug, Clone)]
pub struct ProvisionConfig {
    /// Behavior for groups whose model does not specify one.
    pub default_update_behavior: UpdateBehavior,
    /// Group name that resolves to the site collection group.
    pub site_collection_group_sentinel: String,
    /// Separator between child Ids in a persisted sort order.
    pub sort_order_delimiter: char,
}

impl Default for ProvisionConfig {
    fn default() -> Self {
        Self {
            default_update_behavior: UpdateBehavior::AddOnly,
            site_collection_group_sentinel: SITE_COLLECTION_GROUP_SENTINEL.to_string(),
            sort_order_delimiter: ':',
        }
    }
}

impl ProvisionConfig {
    /// Config whose groups default to [`UpdateBehavior::Overwrite`].
    pub fn overwrite() -> Self {
        Self {
            default_update_behavior: UpdateBehavior::Overwrite,
            ..Default::default()
        }
    }

    pub fn is_site_collection_sentinel(&self, name: &str) -> bool {
        name.trim()
            .eq_ignore_ascii_case(&self.site_collection_group_sentinel)
    }
}
