#[cfg(not(feature = "std"))]
use alloc::collections::{BTreeMap, BTreeSet};
#[cfg(not(feature = "std"))]
use alloc::string::String;
#[cfg(feature = "std")]
use std::collections::{HashMap, HashSet};

use crate::FeedKey;

#[cfg(feature = "std")]
pub(crate) type FeedMap<V> = HashMap<FeedKey, V>;
#[cfg(not(feature = "std"))]
pub(crate) type FeedMap<V> = BTreeMap<FeedKey, V>;

#[cfg(feature = "std")]
pub(crate) type IdSet = HashSet<String>;
#[cfg(not(feature = "std"))]
pub(crate) type IdSet = BTreeSet<String>;
