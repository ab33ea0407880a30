use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait ControlPlane: Send + Sync {
    /// Raw worker identity (`<id>@<host>`) mapped to the capability
    /// identifiers (`<category>.<name>`) that worker has registered.
    async fn registered(&self) -> Result<HashMap<String, Vec<String>>>;
}
