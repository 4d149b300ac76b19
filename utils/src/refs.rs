//! A reference that is either borrowed or owned via an `Arc`, so a single
//! writer type can be constructed from either without forcing callers to
//! hold an `Arc` when a plain borrow would do.

use std::ops::Deref;
use std::sync::Arc;

pub enum Refs<'a, T> {
    Borrowed(&'a T),
    Arc(Arc<T>),
}

impl<T> Deref for Refs<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        match self {
            Refs::Borrowed(r) => r,
            Refs::Arc(r) => r,
        }
    }
}

impl<'a, T> From<&'a T> for Refs<'a, T> {
    fn from(r: &'a T) -> Self {
        Refs::Borrowed(r)
    }
}

impl<T> From<Arc<T>> for Refs<'_, T> {
    fn from(r: Arc<T>) -> Self {
        Refs::Arc(r)
    }
}
