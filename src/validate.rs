// Small shared gates and helpers for authoring forms.

use crate::{
    error::ValidationError,
    models::{LearningOutcome, Module, Objective, Resource, Topic},
};

/// Anything carrying a client-computed `order` field.
pub trait Ordered {
    fn order(&self) -> i32;
}

macro_rules! ordered {
    ($($t:ty),*) => {
        $(impl Ordered for $t {
            fn order(&self) -> i32 {
                self.order
            }
        })*
    };
}

ordered!(LearningOutcome, Module, Topic, Objective, Resource);

/// `1` for an empty list, otherwise `max(order) + 1`. Gaps are never filled.
pub fn next_order<T: Ordered>(items: &[T]) -> i32 {
    items.iter().map(Ordered::order).max().map_or(1, |m| m + 1)
}

pub fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

pub fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if is_blank(value) {
        return Err(ValidationError::Required(field));
    }
    Ok(())
}

/// Blank form text goes over the wire as `null`.
pub fn non_blank(value: &str) -> Option<String> {
    if is_blank(value) {
        None
    } else {
        Some(value.to_owned())
    }
}
