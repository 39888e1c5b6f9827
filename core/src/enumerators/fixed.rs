use async_trait::async_trait;
use scopr_common::enumeration::ResourceEnumerator;

/// Yields a caller-supplied list of resource strings verbatim.
#[derive(Debug, Clone, Default)]
pub struct FixedResources {
    resources: Vec<String>,
}

impl FixedResources {
    pub fn new(resources: Vec<String>) -> Self {
        Self { resources }
    }
}

#[async_trait]
impl ResourceEnumerator for FixedResources {
    async fn list_resources(&self) -> anyhow::Result<Vec<String>> {
        Ok(self.resources.clone())
    }
}
