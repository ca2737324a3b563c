use super::{AttributeMode, FieldSettings, Settings};
use proc_macro2::Ident;
use syn::{Data, DeriveInput, Fields, LitStr};

const RESERVED_PROPERTY_NAMES: &[&str] = &[
    "_ClientEncryptionMetadata1",
    "_ClientEncryptionMetadata2",
    "PartitionKey",
    "RowKey",
    "Timestamp",
];

pub(crate) struct SettingsBuilder {
    ident: Ident,
    partition_key_field: Option<Ident>,
    row_key_field: Option<Ident>,
    fields: Vec<FieldSettings>,
}

impl SettingsBuilder {
    pub(crate) fn new(input: &DeriveInput) -> Self {
        Self {
            ident: input.ident.clone(),
            partition_key_field: None,
            row_key_field: None,
            fields: Vec::new(),
        }
    }

    pub(crate) fn field_attributes(
        mut self,
        DeriveInput { data, ident, .. }: &DeriveInput,
    ) -> Result<Self, syn::Error> {
        // Only support structs with named fields
        let Data::Struct(data_struct) = data else {
            return Err(syn::Error::new_spanned(
                ident,
                "TableEntity can only be derived for structs",
            ));
        };

        let Fields::Named(fields_named) = &data_struct.fields else {
            return Err(syn::Error::new_spanned(
                ident,
                "TableEntity can only be derived for structs with named fields",
            ));
        };

        for field in &fields_named.named {
            let field_ident = field.ident.clone().ok_or_else(|| {
                syn::Error::new_spanned(field, "internal error: identifier was not Some")
            })?;
            let field_name = field_ident.to_string();

            let mut is_partition_key = false;
            let mut is_row_key = false;
            let mut encrypt = false;
            let mut skip = false;
            let mut rename: Option<String> = None;

            // Parse the meta for the field
            for attr in &field.attrs {
                if attr.path().is_ident("partition_key") {
                    is_partition_key = true;
                }

                if attr.path().is_ident("row_key") {
                    is_row_key = true;
                }

                if attr.path().is_ident("tablecrypt") {
                    attr.parse_nested_meta(|meta| {
                        let directive = meta.path.get_ident().map(|i| i.to_string());
                        match directive.as_deref() {
                            Some("encrypt") => {
                                encrypt = true;
                                Ok(())
                            }
                            Some("skip") => {
                                // Don't even store this field
                                skip = true;
                                Ok(())
                            }
                            Some("rename") => {
                                let value = meta.value()?;
                                rename = Some(value.parse::<LitStr>()?.value());
                                Ok(())
                            }
                            _ => Err(meta.error("unsupported field attribute")),
                        }
                    })?;
                }
            }

            if is_partition_key && is_row_key {
                return Err(syn::Error::new_spanned(
                    &field_ident,
                    format!("field '{field_name}' cannot be both the partition key and the row key"),
                ));
            }

            if is_partition_key || is_row_key {
                if encrypt || skip || rename.is_some() {
                    return Err(syn::Error::new_spanned(
                        &field_ident,
                        format!("key field '{field_name}' is never encrypted and cannot be skipped or renamed"),
                    ));
                }

                if is_partition_key {
                    Self::set_key(&mut self.partition_key_field, &field_ident, "partition key")?;
                } else {
                    Self::set_key(&mut self.row_key_field, &field_ident, "row key")?;
                }

                continue;
            }

            if encrypt && skip {
                return Err(syn::Error::new_spanned(
                    &field_ident,
                    format!("field '{field_name}' cannot be both encrypted and skipped"),
                ));
            }

            let name = rename.unwrap_or(field_name);

            if RESERVED_PROPERTY_NAMES.contains(&name.as_str()) {
                return Err(syn::Error::new_spanned(
                    &field_ident,
                    format!("Invalid property name '{name}': name is reserved for internal use"),
                ));
            }

            if self.fields.iter().any(|f| f.name == name) {
                return Err(syn::Error::new_spanned(
                    &field_ident,
                    format!("property name '{name}' is used by more than one field"),
                ));
            }

            let mode = match (encrypt, skip) {
                (true, _) => AttributeMode::Encrypted,
                (_, true) => AttributeMode::Skipped,
                _ => AttributeMode::Plaintext,
            };

            self.fields.push(FieldSettings {
                ident: field_ident,
                name,
                mode,
            });
        }

        Ok(self)
    }

    fn set_key(slot: &mut Option<Ident>, field: &Ident, kind: &str) -> Result<(), syn::Error> {
        if let Some(existing) = slot {
            return Err(syn::Error::new_spanned(
                field,
                format!("{kind} was already specified to be '{existing}'"),
            ));
        }

        *slot = Some(field.clone());
        Ok(())
    }

    pub(crate) fn build(self) -> Result<Settings, syn::Error> {
        let SettingsBuilder {
            ident,
            partition_key_field,
            row_key_field,
            fields,
        } = self;

        let partition_key_field = partition_key_field.ok_or_else(|| {
            syn::Error::new_spanned(&ident, "Missing required attribute: #[partition_key]")
        })?;

        let row_key_field = row_key_field.ok_or_else(|| {
            syn::Error::new_spanned(&ident, "Missing required attribute: #[row_key]")
        })?;

        Ok(Settings {
            ident,
            partition_key_field,
            row_key_field,
            fields,
        })
    }
}
