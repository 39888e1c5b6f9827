use async_trait::async_trait;

/// Supplies candidate resource identifiers for a discovery scan.
///
/// Implementations may return identifiers in any syntax; discovery decides
/// which of them are reachable. A failure here aborts the whole scan.
#[async_trait]
pub trait ResourceEnumerator: Send + Sync {
    async fn list_resources(&self) -> anyhow::Result<Vec<String>>;
}
