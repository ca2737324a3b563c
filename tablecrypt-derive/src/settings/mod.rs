mod builder;
use self::builder::SettingsBuilder;
use itertools::Itertools;
use proc_macro2::Ident;
use syn::DeriveInput;

#[derive(Clone, Copy, PartialEq, Eq)]
pub(crate) enum AttributeMode {
    Plaintext,
    Encrypted,
    /// Never stored; rebuilt with `Default` (like serde).
    Skipped,
}

pub(crate) struct FieldSettings {
    pub(crate) ident: Ident,
    /// The stored property name.
    pub(crate) name: String,
    pub(crate) mode: AttributeMode,
}

pub(crate) struct Settings {
    ident: Ident,
    partition_key_field: Ident,
    row_key_field: Ident,
    fields: Vec<FieldSettings>,
}

impl Settings {
    pub(crate) fn builder(input: &DeriveInput) -> SettingsBuilder {
        SettingsBuilder::new(input)
    }

    pub(crate) fn ident(&self) -> &Ident {
        &self.ident
    }

    pub(crate) fn partition_key_field(&self) -> &Ident {
        &self.partition_key_field
    }

    pub(crate) fn row_key_field(&self) -> &Ident {
        &self.row_key_field
    }

    /// Fields stored as properties, encrypted or not.
    pub(crate) fn stored_fields(&self) -> impl Iterator<Item = &FieldSettings> {
        self.fields
            .iter()
            .filter(|f| f.mode != AttributeMode::Skipped)
    }

    pub(crate) fn skipped_fields(&self) -> impl Iterator<Item = &FieldSettings> {
        self.fields
            .iter()
            .filter(|f| f.mode == AttributeMode::Skipped)
    }

    /// Stored names of the encrypted fields, sorted.
    pub(crate) fn encrypted_properties(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|f| f.mode == AttributeMode::Encrypted)
            .map(|f| f.name.as_str())
            .sorted()
            .collect()
    }
}
