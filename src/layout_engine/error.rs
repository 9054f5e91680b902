#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("tool window {0:?} is not registered")]
    NotRegistered(String),
    #[error("tool window {0:?} is already registered")]
    AlreadyRegistered(String),
    #[error("tool window {id:?} cannot take order {order}: {reason}")]
    ConflictingOrder { id: String, order: i32, reason: String },
    #[error("an initial layout cannot be applied after {0} windows were registered")]
    AlreadyInitialized(usize),
}
