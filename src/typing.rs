//! Wire-level type identifiers.
//!
//! Type ids are the fully qualified class names used by the JVM side of the
//! format, so payloads stay interchangeable with other readers of the same data.

/// Key holding the concrete type id of an object.
pub const TYPE_PROPERTY: &str = "@class";

/// Wrapper name written for ordered lists.
pub const ARRAY_LIST: &str = "java.util.ArrayList";

/// Wrapper name written for sorted maps.
pub const TREE_MAP: &str = "java.util.TreeMap";

/// Wrapper name written for read-only sets.
pub const UNMODIFIABLE_SET: &str = "java.util.Collections$UnmodifiableSet";

const SEQUENCE_TYPES: &[&str] = &[
    ARRAY_LIST,
    UNMODIFIABLE_SET,
    "java.util.LinkedList",
    "java.util.Arrays$ArrayList",
    "java.util.Collections$EmptyList",
    "java.util.Collections$SingletonList",
    "java.util.Collections$UnmodifiableList",
    "java.util.Collections$UnmodifiableRandomAccessList",
    "java.util.Collections$EmptySet",
    "java.util.Collections$SingletonSet",
    "java.util.HashSet",
    "java.util.LinkedHashSet",
    "java.util.TreeSet",
];

const MAP_TYPES: &[&str] = &[
    TREE_MAP,
    "java.util.HashMap",
    "java.util.LinkedHashMap",
    "java.util.Collections$EmptyMap",
    "java.util.Collections$SingletonMap",
    "java.util.Collections$UnmodifiableMap",
];

/// Returns true if `type_id` names a collection readable as a sequence.
pub fn is_sequence_type(type_id: &str) -> bool {
    SEQUENCE_TYPES.contains(&type_id)
}

/// Returns true if `type_id` names a collection readable as a map.
pub fn is_map_type(type_id: &str) -> bool {
    MAP_TYPES.contains(&type_id)
}
