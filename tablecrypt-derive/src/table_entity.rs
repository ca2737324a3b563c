use crate::settings::Settings;
use proc_macro2::TokenStream;
use quote::quote;
use syn::DeriveInput;

pub(crate) fn derive_table_entity(input: DeriveInput) -> Result<TokenStream, syn::Error> {
    let settings = Settings::builder(&input).field_attributes(&input)?.build()?;

    let ident = settings.ident();
    let partition_key = settings.partition_key_field();
    let row_key = settings.row_key_field();
    let encrypted_properties = settings.encrypted_properties();

    let into_entity_impl = settings.stored_fields().map(|field| {
        let field_ident = &field.ident;
        let name = &field.name;

        quote! {
            entity.insert(#name, self.#field_ident);
        }
    });

    let from_entity_impl = settings
        .stored_fields()
        .map(|field| {
            let field_ident = &field.ident;
            let name = &field.name;

            quote! {
                #field_ident: properties.take_or_default(#name)?
            }
        })
        .chain(settings.skipped_fields().map(|field| {
            let field_ident = &field.ident;

            quote! {
                #field_ident: Default::default()
            }
        }));

    let expanded = quote! {
        #[automatically_derived]
        impl ::tablecrypt::traits::TableEntity for #ident {
            fn partition_key(&self) -> String {
                ::std::string::ToString::to_string(&self.#partition_key)
            }

            fn row_key(&self) -> String {
                ::std::string::ToString::to_string(&self.#row_key)
            }

            fn encrypted_properties() -> &'static [&'static str] {
                &[#(#encrypted_properties,)*]
            }

            #[allow(unused_mut)]
            fn into_entity(self) -> Result<::tablecrypt::entity::Entity, ::tablecrypt::traits::WriteConversionError> {
                let mut entity = ::tablecrypt::entity::Entity::new(self.#partition_key, self.#row_key);

                #(#into_entity_impl)*

                Ok(entity)
            }

            #[allow(unused_mut, clippy::needless_question_mark)]
            fn from_entity(entity: ::tablecrypt::entity::Entity) -> Result<Self, ::tablecrypt::traits::ReadConversionError> {
                let (partition_key, row_key, mut properties) = entity.into_key_parts();

                Ok(Self {
                    #partition_key: partition_key,
                    #row_key: row_key,
                    #(#from_entity_impl,)*
                })
            }
        }
    };

    Ok(expanded)
}
