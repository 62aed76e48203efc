//! Pre-declared entity metadata.
//!
//! Each persisted entity type declares its table name, ordered column
//! descriptors and primary-key descriptor as `'static` data (no runtime
//! reflection). A [`MetadataRegistry`] validates all declarations once at
//! process start; a declaration that fails validation is fatal, and the
//! registry is read-only afterwards, so lookups need no locking.

use std::collections::HashMap;

use tasklane_types::error::MetadataError;

/// Store-side column type, used to pick the binding form for values and
/// membership-list elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreType {
    Text,
    Integer,
    Real,
    Boolean,
    Uuid,
    Timestamp,
    Json,
}

/// How the primary key of an entity is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyGeneration {
    /// The application assigns the key (UUID v7) before insert.
    ClientGenerated,
    /// The store assigns the key (integer row id) during insert.
    StoreGenerated,
}

/// One column of an entity table, mapped to exactly one entity property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnDescriptor {
    /// Column name in the store.
    pub name: &'static str,
    /// Name of the entity property this column is populated from.
    pub property: &'static str,
    pub store_type: StoreType,
    /// Whether the generic list search matches against this column.
    pub searchable: bool,
}

impl ColumnDescriptor {
    pub const fn new(name: &'static str, property: &'static str, store_type: StoreType) -> Self {
        Self {
            name,
            property,
            store_type,
            searchable: false,
        }
    }

    pub const fn searchable(mut self) -> Self {
        self.searchable = true;
        self
    }
}

/// Primary-key descriptor. Exactly one column per entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyDescriptor {
    pub column: &'static str,
    pub store_type: StoreType,
    pub generation: KeyGeneration,
}

/// Immutable description of one entity type's mapping to the store.
///
/// Built once per entity type as `'static` data, shared read-only by every
/// provider instance for that type.
#[derive(Debug, Clone, Copy)]
pub struct EntityMetadata {
    pub table: &'static str,
    /// Ordered column descriptors; order matches `Entity::column_values`.
    pub columns: &'static [ColumnDescriptor],
    pub key: KeyDescriptor,
}

impl EntityMetadata {
    /// Look up a column by store name.
    pub fn column(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Columns the generic list search matches against.
    pub fn searchable_columns(&self) -> impl Iterator<Item = &ColumnDescriptor> {
        self.columns.iter().filter(|c| c.searchable)
    }

    /// All columns except the primary key, in declaration order.
    pub fn non_key_columns(&self) -> impl Iterator<Item = &ColumnDescriptor> {
        self.columns.iter().filter(|c| c.name != self.key.column)
    }

    /// Validate internal consistency of this declaration.
    pub fn validate(&self) -> Result<(), MetadataError> {
        if self.table.is_empty() {
            return Err(MetadataError::EmptyTableName);
        }
        for (i, col) in self.columns.iter().enumerate() {
            if self.columns[..i].iter().any(|c| c.name == col.name) {
                return Err(MetadataError::DuplicateColumn {
                    table: self.table.to_string(),
                    column: col.name.to_string(),
                });
            }
        }
        let Some(key_col) = self.column(self.key.column) else {
            return Err(MetadataError::MissingKeyColumn {
                table: self.table.to_string(),
                column: self.key.column.to_string(),
            });
        };
        if key_col.store_type != self.key.store_type {
            return Err(MetadataError::KeyTypeMismatch {
                table: self.table.to_string(),
                column: self.key.column.to_string(),
            });
        }
        if self.key.generation == KeyGeneration::StoreGenerated
            && self.key.store_type != StoreType::Integer
        {
            return Err(MetadataError::NonIntegerGeneratedKey {
                table: self.table.to_string(),
                column: self.key.column.to_string(),
            });
        }
        Ok(())
    }
}

/// Write-once-at-startup lookup table of entity metadata, keyed by table name.
///
/// Built during process initialization; any registration error must abort
/// startup. After construction the registry is immutable, so concurrent
/// reads are lock-free.
#[derive(Debug, Default)]
pub struct MetadataRegistry {
    by_table: HashMap<&'static str, &'static EntityMetadata>,
}

impl MetadataRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and register one entity declaration.
    pub fn register(&mut self, meta: &'static EntityMetadata) -> Result<(), MetadataError> {
        meta.validate()?;
        if self.by_table.contains_key(meta.table) {
            return Err(MetadataError::DuplicateTable(meta.table.to_string()));
        }
        self.by_table.insert(meta.table, meta);
        Ok(())
    }

    /// O(1) lookup by table name.
    pub fn get(&self, table: &str) -> Option<&'static EntityMetadata> {
        self.by_table.get(table).copied()
    }

    pub fn len(&self) -> usize {
        self.by_table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_table.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static GOOD: EntityMetadata = EntityMetadata {
        table: "things",
        columns: &[
            ColumnDescriptor::new("id", "id", StoreType::Uuid),
            ColumnDescriptor::new("name", "name", StoreType::Text).searchable(),
        ],
        key: KeyDescriptor {
            column: "id",
            store_type: StoreType::Uuid,
            generation: KeyGeneration::ClientGenerated,
        },
    };

    static MISSING_KEY: EntityMetadata = EntityMetadata {
        table: "orphans",
        columns: &[ColumnDescriptor::new("name", "name", StoreType::Text)],
        key: KeyDescriptor {
            column: "id",
            store_type: StoreType::Uuid,
            generation: KeyGeneration::ClientGenerated,
        },
    };

    static TEXT_GENERATED_KEY: EntityMetadata = EntityMetadata {
        table: "bad_keys",
        columns: &[ColumnDescriptor::new("id", "id", StoreType::Text)],
        key: KeyDescriptor {
            column: "id",
            store_type: StoreType::Text,
            generation: KeyGeneration::StoreGenerated,
        },
    };

    #[test]
    fn test_register_and_lookup() {
        let mut registry = MetadataRegistry::new();
        registry.register(&GOOD).unwrap();
        let meta = registry.get("things").unwrap();
        assert_eq!(meta.key.column, "id");
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn test_duplicate_table_rejected() {
        let mut registry = MetadataRegistry::new();
        registry.register(&GOOD).unwrap();
        assert!(matches!(
            registry.register(&GOOD),
            Err(MetadataError::DuplicateTable(_))
        ));
    }

    #[test]
    fn test_missing_key_column_rejected() {
        let mut registry = MetadataRegistry::new();
        assert!(matches!(
            registry.register(&MISSING_KEY),
            Err(MetadataError::MissingKeyColumn { .. })
        ));
    }

    #[test]
    fn test_store_generated_key_must_be_integer() {
        assert!(matches!(
            TEXT_GENERATED_KEY.validate(),
            Err(MetadataError::NonIntegerGeneratedKey { .. })
        ));
    }

    #[test]
    fn test_searchable_and_non_key_columns() {
        let searchable: Vec<_> = GOOD.searchable_columns().map(|c| c.name).collect();
        assert_eq!(searchable, vec!["name"]);
        let non_key: Vec<_> = GOOD.non_key_columns().map(|c| c.name).collect();
        assert_eq!(non_key, vec!["name"]);
    }
}
