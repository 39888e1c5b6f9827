//! Concrete [`ResourceEnumerator`] implementations.
//!
//! * [`FixedResources`]: a list supplied up front by the operator.
//! * [`TcpSweep`]: hosts in an address set that accept connections on the
//!   instrument port.
//! * [`ChainedResources`]: several enumerators queried in order.

use async_trait::async_trait;
use scopr_common::enumeration::ResourceEnumerator;

mod fixed;
mod sweep;

pub use fixed::FixedResources;
pub use sweep::TcpSweep;

/// Concatenates the output of several enumerators, preserving their order.
/// Any failing member fails the whole enumeration.
#[derive(Default)]
pub struct ChainedResources {
    sources: Vec<Box<dyn ResourceEnumerator>>,
}

impl ChainedResources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, source: Box<dyn ResourceEnumerator>) {
        self.sources.push(source);
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

#[async_trait]
impl ResourceEnumerator for ChainedResources {
    async fn list_resources(&self) -> anyhow::Result<Vec<String>> {
        let mut resources = Vec::new();
        for source in &self.sources {
            resources.extend(source.list_resources().await?);
        }
        Ok(resources)
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;

    struct Failing;

    #[async_trait]
    impl ResourceEnumerator for Failing {
        async fn list_resources(&self) -> anyhow::Result<Vec<String>> {
            anyhow::bail!("no backend")
        }
    }

    #[tokio::test]
    async fn chained_sources_keep_their_order() {
        let mut chain = ChainedResources::new();
        chain.push(Box::new(FixedResources::new(vec!["b".into(), "a".into()])));
        chain.push(Box::new(FixedResources::new(vec!["c".into()])));

        assert_eq!(chain.list_resources().await.unwrap(), vec!["b", "a", "c"]);
    }

    #[tokio::test]
    async fn one_failing_source_fails_the_chain() {
        let mut chain = ChainedResources::new();
        chain.push(Box::new(FixedResources::new(vec!["a".into()])));
        chain.push(Box::new(Failing));

        assert!(chain.list_resources().await.is_err());
    }
}
