/// Convenience result type used across Placard.
pub type PlacardResult<T> = Result<T, PlacardError>;

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum PlacardError {
    /// Malformed poster instance options (invalid size, dpr, target).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Malformed element configuration data.
    #[error("element error: {0}")]
    Element(String),

    /// A `relative_to` chain that loops back onto an element being resolved.
    #[error("relative positioning cycle at element '{0}'")]
    Cycle(String),

    /// Image or font fetch/decode failure from a loader collaborator.
    #[error("resource load error: {0}")]
    ResourceLoad(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PlacardError {
    /// Build a [`PlacardError::Configuration`] value.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Build a [`PlacardError::Element`] value.
    pub fn element(msg: impl Into<String>) -> Self {
        Self::Element(msg.into())
    }

    /// Build a [`PlacardError::ResourceLoad`] value.
    pub fn resource_load(msg: impl Into<String>) -> Self {
        Self::ResourceLoad(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
