use thiserror::Error;

use super::AnimatorValueKind;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnimatorError {
    #[error("Animator has no parameter named `{name}`")]
    UnknownParameter { name: String },

    #[error("Animator parameter `{name}` is {expected:?}, can not be set to {found:?}")]
    KindMismatch {
        name: String,
        expected: AnimatorValueKind,
        found: AnimatorValueKind,
    },
}
