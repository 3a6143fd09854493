//! Dictionary types shared by the unit tests.

use alloc::rc::Rc;
use alloc::string::String;
use core::cell::Cell;
use core::hash::{BuildHasherDefault, Hash, Hasher};

use crate::{DictType, Hashed};

/// A deterministic hasher, so bucket placement is the same on every run.
pub(crate) type Fnv = Hashed<BuildHasherDefault<fnv::FnvHasher>>;

/// Sends every key to bucket 0.
#[derive(Clone, Default)]
pub(crate) struct Collide {
    refuse_growth: bool,
}

impl Collide {
    pub(crate) fn refusing_growth() -> Self {
        Collide {
            refuse_growth: true,
        }
    }
}

impl<V> DictType<u32, V> for Collide {
    fn hash(&self, _: &u32) -> u64 {
        0
    }

    fn key_eq(&self, a: &u32, b: &u32) -> bool {
        a == b
    }

    fn expand_allowed(&self, _: usize, _: f64) -> bool {
        !self.refuse_growth
    }
}

/// Uses the key itself as its hash, so a key's bucket is `key & mask`.
#[derive(Clone, Copy, Default)]
pub(crate) struct Identity;

impl<V> DictType<u32, V> for Identity {
    fn hash(&self, key: &u32) -> u64 {
        u64::from(*key)
    }

    fn key_eq(&self, a: &u32, b: &u32) -> bool {
        a == b
    }
}

/// Case-insensitive string keys that upper-cases keys and doubles values on the way in, and
/// counts what it is asked to destroy.
///
/// Clones share their counters.
#[derive(Clone, Default)]
pub(crate) struct Counting {
    keys: Rc<Cell<usize>>,
    values: Rc<Cell<usize>>,
}

impl Counting {
    pub(crate) fn keys_destroyed(&self) -> usize {
        self.keys.get()
    }

    pub(crate) fn values_destroyed(&self) -> usize {
        self.values.get()
    }
}

impl DictType<String, i32> for Counting {
    fn hash(&self, key: &String) -> u64 {
        let mut h = fnv::FnvHasher::default();
        for b in key.bytes() {
            b.to_ascii_uppercase().hash(&mut h);
        }
        h.finish()
    }

    fn key_eq(&self, a: &String, b: &String) -> bool {
        a.eq_ignore_ascii_case(b)
    }

    fn dup_key(&self, key: String) -> String {
        key.to_ascii_uppercase()
    }

    fn dup_value(&self, value: i32) -> i32 {
        value * 2
    }

    fn destroy_key(&self, _: String) {
        self.keys.set(self.keys.get() + 1);
    }

    fn destroy_value(&self, _: i32) {
        self.values.set(self.values.get() + 1);
    }
}
