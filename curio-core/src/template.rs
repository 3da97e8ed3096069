use crate::id::CollectionId;
use serde::{Deserialize, Serialize};

/// Standard display keys every collection carries
pub const KEY_NAME: &str = "name";
pub const KEY_DESCRIPTION: &str = "description";
pub const KEY_IMAGE_URL: &str = "image_url";
pub const KEY_PROJECT_URL: &str = "project_url";

/// The fixed standard key set, in registration order
pub const STANDARD_KEYS: [&str; 4] = [KEY_NAME, KEY_DESCRIPTION, KEY_IMAGE_URL, KEY_PROJECT_URL];

/// A mapping from attribute name to a rendering template string,
/// registered once at initialization and handed to the external
/// rendering collaborator.
///
/// Template strings use `{key}` placeholders, e.g. `ipfs://{image_url}`.
/// The mapping is immutable after creation; a version bump exists for
/// the renderer's cache invalidation but no documented workflow
/// exercises it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayTemplate {
    collection: CollectionId,
    version: u32,
    entries: Vec<(String, String)>,
}

impl DisplayTemplate {
    /// Build a template for a collection from an ordered key → template
    /// mapping. Starts at version 1.
    pub fn new(collection: CollectionId, entries: Vec<(String, String)>) -> Self {
        Self {
            collection,
            version: 1,
            entries,
        }
    }

    pub fn collection(&self) -> &CollectionId {
        &self.collection
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    /// Get the template string registered for a key
    pub fn template_for(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Registered keys, in registration order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Bump the template version for the external renderer
    pub fn bump_version(&mut self) {
        self.version += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collection() -> CollectionId {
        CollectionId::try_derive("template-test").expect("derivation")
    }

    #[test]
    fn test_template_lookup_and_order() {
        let template = DisplayTemplate::new(
            collection(),
            vec![
                (KEY_NAME.to_string(), "{name}".to_string()),
                (KEY_IMAGE_URL.to_string(), "ipfs://{image_url}".to_string()),
            ],
        );
        assert_eq!(template.template_for(KEY_IMAGE_URL), Some("ipfs://{image_url}"));
        assert_eq!(template.template_for(KEY_PROJECT_URL), None);
        let keys: Vec<_> = template.keys().collect();
        assert_eq!(keys, vec![KEY_NAME, KEY_IMAGE_URL]);
    }

    #[test]
    fn test_version_starts_at_one_and_bumps() {
        let mut template = DisplayTemplate::new(collection(), vec![]);
        assert_eq!(template.version(), 1);
        template.bump_version();
        assert_eq!(template.version(), 2);
    }
}
