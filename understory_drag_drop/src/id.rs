// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Opaque string identifiers for drags and drop targets.
//!
//! Both are cheap to clone (reference counted) and compare by content. Uniqueness is the
//! registrant's responsibility; nothing here validates it.

use alloc::rc::Rc;
use alloc::string::String;
use core::borrow::Borrow;
use core::fmt;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(Rc<str>);

        impl $name {
            /// Create an identifier from any string-like value.
            #[must_use]
            pub fn new(id: impl AsRef<str>) -> Self {
                Self(Rc::from(id.as_ref()))
            }

            /// The identifier text.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({:?})", stringify!($name), &*self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(Rc::from(id))
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(Rc::from(id))
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                &*self.0 == other
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                &*self.0 == *other
            }
        }
    };
}

string_id! {
    /// Identifies the element being dragged for the duration of one gesture.
    DragId
}

string_id! {
    /// Identifies a registered drop target.
    DropTargetId
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::format;
    use hashbrown::HashSet;

    #[test]
    fn ids_compare_by_content() {
        let a = DropTargetId::from("a");
        let b = DropTargetId::new(String::from("a"));
        assert_eq!(a, b);
        assert_eq!(a, "a");
        assert_ne!(a, DropTargetId::from("b"));
    }

    #[test]
    fn set_lookup_by_str() {
        let mut set = HashSet::new();
        set.insert(DropTargetId::from("left"));
        assert!(set.contains("left"));
        assert!(!set.contains("right"));
    }

    #[test]
    fn display_and_debug() {
        let id = DragId::from("card-7");
        assert_eq!(format!("{id}"), "card-7");
        assert_eq!(format!("{id:?}"), "DragId(\"card-7\")");
    }
}
